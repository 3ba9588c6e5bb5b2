// src/sema/builtin.rs
//
// Leaf prototypes of the host environment.
//
// Every leaf declares only its direct parent; `Checker::check_parent` walks
// the chain one link at a time. The table below is the whole hierarchy:
//
//   BigInt -> Int -> Number
//   HTMLCanvasElement | HTMLImageElement | HTMLInputElement | HTMLLinkElement
//       -> HTMLElement -> Element -> Node -> EventTarget
//   Document | Window | Worker -> EventTarget

/// Non-generic built-in prototypes.
///
/// The discriminant order is load-bearing: `TypeId::builtin` reserves one
/// arena slot per variant in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinType {
    String,
    Number,
    Int,
    BigInt,
    Boolean,
    Date,
    Error,
    RegExp,
    EventTarget,
    Node,
    Element,
    HTMLElement,
    HTMLCanvasElement,
    HTMLImageElement,
    HTMLInputElement,
    HTMLLinkElement,
    CSSStyleDeclaration,
    Document,
    Window,
    Worker,
    MessagePort,
    WebGLRenderingContext,
    WebGLProgram,
    WebGLShader,
    WebGLBuffer,
    WebGLTexture,
    GLEnum,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 27] = [
        BuiltinType::String,
        BuiltinType::Number,
        BuiltinType::Int,
        BuiltinType::BigInt,
        BuiltinType::Boolean,
        BuiltinType::Date,
        BuiltinType::Error,
        BuiltinType::RegExp,
        BuiltinType::EventTarget,
        BuiltinType::Node,
        BuiltinType::Element,
        BuiltinType::HTMLElement,
        BuiltinType::HTMLCanvasElement,
        BuiltinType::HTMLImageElement,
        BuiltinType::HTMLInputElement,
        BuiltinType::HTMLLinkElement,
        BuiltinType::CSSStyleDeclaration,
        BuiltinType::Document,
        BuiltinType::Window,
        BuiltinType::Worker,
        BuiltinType::MessagePort,
        BuiltinType::WebGLRenderingContext,
        BuiltinType::WebGLProgram,
        BuiltinType::WebGLShader,
        BuiltinType::WebGLBuffer,
        BuiltinType::WebGLTexture,
        BuiltinType::GLEnum,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::String => "String",
            BuiltinType::Number => "Number",
            BuiltinType::Int => "Int",
            BuiltinType::BigInt => "BigInt",
            BuiltinType::Boolean => "Boolean",
            BuiltinType::Date => "Date",
            BuiltinType::Error => "Error",
            BuiltinType::RegExp => "RegExp",
            BuiltinType::EventTarget => "EventTarget",
            BuiltinType::Node => "Node",
            BuiltinType::Element => "Element",
            BuiltinType::HTMLElement => "HTMLElement",
            BuiltinType::HTMLCanvasElement => "HTMLCanvasElement",
            BuiltinType::HTMLImageElement => "HTMLImageElement",
            BuiltinType::HTMLInputElement => "HTMLInputElement",
            BuiltinType::HTMLLinkElement => "HTMLLinkElement",
            BuiltinType::CSSStyleDeclaration => "CSSStyleDeclaration",
            BuiltinType::Document => "Document",
            BuiltinType::Window => "Window",
            BuiltinType::Worker => "Worker",
            BuiltinType::MessagePort => "MessagePort",
            BuiltinType::WebGLRenderingContext => "WebGLRenderingContext",
            BuiltinType::WebGLProgram => "WebGLProgram",
            BuiltinType::WebGLShader => "WebGLShader",
            BuiltinType::WebGLBuffer => "WebGLBuffer",
            BuiltinType::WebGLTexture => "WebGLTexture",
            BuiltinType::GLEnum => "GLEnum",
        }
    }

    pub fn from_name(name: &str) -> Option<BuiltinType> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// Direct parent in the prototype chain, `None` for roots.
    pub fn parent(self) -> Option<BuiltinType> {
        match self {
            BuiltinType::Int => Some(BuiltinType::Number),
            BuiltinType::BigInt => Some(BuiltinType::Int),
            BuiltinType::Node => Some(BuiltinType::EventTarget),
            BuiltinType::Element => Some(BuiltinType::Node),
            BuiltinType::HTMLElement => Some(BuiltinType::Element),
            BuiltinType::HTMLCanvasElement
            | BuiltinType::HTMLImageElement
            | BuiltinType::HTMLInputElement
            | BuiltinType::HTMLLinkElement => Some(BuiltinType::HTMLElement),
            BuiltinType::Document | BuiltinType::Window | BuiltinType::Worker => {
                Some(BuiltinType::EventTarget)
            }
            _ => None,
        }
    }

    /// Safe to serialize across a worker or RPC boundary.
    pub fn is_universal(self) -> bool {
        matches!(
            self,
            BuiltinType::String
                | BuiltinType::Number
                | BuiltinType::Int
                | BuiltinType::BigInt
                | BuiltinType::Boolean
                | BuiltinType::Date
                | BuiltinType::Error
        )
    }

    /// Host types the program can't `new` (the environment hands them out).
    pub fn is_unconstructable(self) -> bool {
        matches!(
            self,
            BuiltinType::EventTarget
                | BuiltinType::Node
                | BuiltinType::Element
                | BuiltinType::HTMLElement
                | BuiltinType::HTMLCanvasElement
                | BuiltinType::HTMLInputElement
                | BuiltinType::HTMLLinkElement
                | BuiltinType::CSSStyleDeclaration
                | BuiltinType::Document
                | BuiltinType::Window
                | BuiltinType::MessagePort
                | BuiltinType::WebGLRenderingContext
                | BuiltinType::WebGLProgram
                | BuiltinType::WebGLShader
                | BuiltinType::WebGLBuffer
                | BuiltinType::WebGLTexture
                | BuiltinType::GLEnum
        )
    }
}

impl std::fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_discriminant_order() {
        for (i, b) in BuiltinType::ALL.iter().enumerate() {
            assert_eq!(*b as usize, i, "{} out of order", b);
        }
    }

    #[test]
    fn names_round_trip() {
        for b in BuiltinType::ALL {
            assert_eq!(BuiltinType::from_name(b.name()), Some(b));
        }
        assert_eq!(BuiltinType::from_name("Array"), None);
    }

    #[test]
    fn chains_terminate_at_a_root() {
        for b in BuiltinType::ALL {
            let mut current = b;
            let mut steps = 0;
            while let Some(p) = current.parent() {
                current = p;
                steps += 1;
                assert!(steps < BuiltinType::COUNT, "cycle through {}", b);
            }
        }
    }

    #[test]
    fn canvas_element_reaches_event_target() {
        let mut chain = vec![];
        let mut current = Some(BuiltinType::HTMLCanvasElement);
        while let Some(b) = current {
            chain.push(b.name());
            current = b.parent();
        }
        assert_eq!(
            chain,
            [
                "HTMLCanvasElement",
                "HTMLElement",
                "Element",
                "Node",
                "EventTarget"
            ]
        );
    }

    #[test]
    fn host_types_are_not_universal() {
        assert!(BuiltinType::Date.is_universal());
        assert!(!BuiltinType::Window.is_universal());
        assert!(!BuiltinType::HTMLElement.is_universal());
        assert!(!BuiltinType::WebGLProgram.is_universal());
    }
}

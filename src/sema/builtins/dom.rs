// src/sema/builtins/dom.rs
//
// Browser host prototypes: the EventTarget tree, Document, Window, workers
// and WebGL. None of these are universal.

use crate::sema::builtin::BuiltinType;
use crate::sema::checker::Checker;
use crate::sema::function::{CustomReturn, Signature};
use crate::sema::type_arena::{EventKind, TypeArena, TypeId, TypedArrayKind};
use crate::sema::value::Literal;

use super::{Slot, callback, custom, function, literal_string, method};

const S: TypeId = TypeId::STRING;
const I: TypeId = TypeId::INT;
const N: TypeId = TypeId::NUMBER;
const B: TypeId = TypeId::BOOLEAN;
const ANY: TypeId = TypeId::ANY;

const fn host(b: BuiltinType) -> TypeId {
    TypeId::builtin(b)
}

const NODE: TypeId = host(BuiltinType::Node);
const HTML_ELEMENT: TypeId = host(BuiltinType::HTMLElement);
const STYLE: TypeId = host(BuiltinType::CSSStyleDeclaration);
const GL_ENUM: TypeId = host(BuiltinType::GLEnum);
const PROGRAM: TypeId = host(BuiltinType::WebGLProgram);
const SHADER: TypeId = host(BuiltinType::WebGLShader);
const BUFFER: TypeId = host(BuiltinType::WebGLBuffer);
const TEXTURE: TypeId = host(BuiltinType::WebGLTexture);

pub(super) fn member(checker: &mut Checker, b: BuiltinType, key: &str) -> Option<Slot> {
    match b {
        BuiltinType::EventTarget => event_target_member(&mut checker.arena, key),
        BuiltinType::Node => node_member(&mut checker.arena, key),
        BuiltinType::Element => element_member(&mut checker.arena, key),
        BuiltinType::HTMLElement => html_element_member(&mut checker.arena, key),
        BuiltinType::HTMLCanvasElement => canvas_member(&mut checker.arena, key),
        BuiltinType::HTMLImageElement => image_member(&mut checker.arena, key),
        BuiltinType::HTMLInputElement => input_member(&mut checker.arena, key),
        BuiltinType::HTMLLinkElement => match key {
            "href" | "download" | "rel" => Some(Slot::read_write(S)),
            _ => None,
        },
        BuiltinType::CSSStyleDeclaration => style_member(&mut checker.arena, key),
        BuiltinType::Document => document_member(&mut checker.arena, key),
        BuiltinType::Window => window_member(&mut checker.arena, key),
        BuiltinType::Worker | BuiltinType::MessagePort => port_member(&mut checker.arena, b, key),
        BuiltinType::WebGLRenderingContext => webgl_member(checker, key),
        _ => None,
    }
}

// ============================================================================
// EventTarget tree
// ============================================================================

/// Event names whose listeners receive a specialised event.
const LISTENER_EVENTS: &[(&str, EventKind)] = &[
    ("click", EventKind::MouseEvent),
    ("dblclick", EventKind::MouseEvent),
    ("mousedown", EventKind::MouseEvent),
    ("mousemove", EventKind::MouseEvent),
    ("mouseup", EventKind::MouseEvent),
    ("keydown", EventKind::KeyboardEvent),
    ("keyup", EventKind::KeyboardEvent),
    ("message", EventKind::MessageEvent),
];

fn event_target_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let ty = match key {
        "addEventListener" | "removeEventListener" => {
            let mut overloads = Vec::with_capacity(LISTENER_EVENTS.len() + 1);
            for (name, kind) in LISTENER_EVENTS {
                let name = literal_string(arena, name);
                let event = arena.event(*kind, None);
                let listener = callback(arena, [event]);
                overloads.push(Signature::void([name, listener]));
            }
            // Catch-all, must stay last.
            let event = arena.event(EventKind::Event, None);
            let listener = callback(arena, [event]);
            overloads.push(Signature::void([S, listener]));
            function(arena, overloads)
        }
        "dispatchEvent" => {
            let event = arena.event(EventKind::Event, None);
            function(arena, [Signature::returning([event], B)])
        }
        _ => return None,
    };
    Some(Slot::read(ty))
}

fn node_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let ty = match key {
        "appendChild" | "removeChild" => method(arena, [Signature::returning([NODE], NODE)]),
        "contains" => function(arena, [Signature::returning([NODE], B)]),
        "firstChild" | "lastChild" | "parentNode" => NODE,
        "insertBefore" | "replaceChild" => method(arena, [Signature::returning([NODE, NODE], NODE)]),
        "normalize" => callback(arena, []),
        "textContent" => return Some(Slot::read_write(S)),
        _ => return None,
    };
    Some(Slot::read(ty))
}

fn element_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let slot = match key {
        "className" | "id" | "innerHTML" => Slot::read_write(S),
        "tagName" => Slot::read(S),
        "scrollLeft" | "scrollTop" => Slot::read_write(N),
        "scrollWidth" | "scrollHeight" | "clientLeft" | "clientWidth" | "clientTop" | "clientHeight" => {
            Slot::read(N)
        }
        "getAttribute" => Slot::read(function(arena, [Signature::returning([S], S)])),
        "hasAttribute" => Slot::read(function(arena, [Signature::returning([S], B)])),
        "removeAttribute" => Slot::read(callback(arena, [S])),
        "setAttribute" => Slot::read(callback(arena, [S, S])),
        "scrollTo" => Slot::read(callback(arena, [N, N])),
        "scrollIntoView" => {
            let options = arena.config_object([
                ("behavior".to_string(), S),
                ("block".to_string(), S),
                ("inline".to_string(), S),
            ]);
            Slot::read(function(
                arena,
                [Signature::void([]), Signature::void([B]), Signature::void([options])],
            ))
        }
        _ => return None,
    };
    Some(slot)
}

fn html_element_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let ty = match key {
        "blur" | "click" | "focus" => callback(arena, []),
        "offsetWidth" | "offsetHeight" => I,
        "style" => STYLE,
        "parentElement" => HTML_ELEMENT,
        "querySelector" => function(arena, [Signature::returning([S], HTML_ELEMENT)]),
        "hidden" => return Some(Slot::read_write(B)),
        _ => return None,
    };
    Some(Slot::read(ty))
}

fn canvas_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let slot = match key {
        "width" | "height" => Slot::read_write(I),
        "getContext" => {
            let webgl = literal_string(arena, "webgl");
            let options = arena.config_object(
                [
                    "alpha",
                    "antialias",
                    "depth",
                    "desynchronized",
                    "failIfMajorPerformanceCaveat",
                    "premultipliedAlpha",
                    "preserveDrawingBuffer",
                    "stencil",
                ]
                .into_iter()
                .map(|k| (k.to_string(), B))
                .chain([("powerPreference".to_string(), S)]),
            );
            let context = host(BuiltinType::WebGLRenderingContext);
            Slot::read(function(
                arena,
                [
                    Signature::returning([webgl], context),
                    Signature::returning([webgl, options], context),
                ],
            ))
        }
        "toDataURL" => Slot::read(function(
            arena,
            [
                Signature::returning([], S),
                Signature::returning([S], S),
                Signature::returning([S, N], S),
            ],
        )),
        _ => return None,
    };
    Some(slot)
}

fn image_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let slot = match key {
        "width" | "height" => Slot::read_write(I),
        "src" => Slot::write(S),
        "onload" => Slot::write(callback(arena, [])),
        "complete" => Slot::read(B),
        _ => return None,
    };
    Some(slot)
}

fn input_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let slot = match key {
        "checked" => Slot::read_write(B),
        "value" => Slot::read_write(S),
        "selectionStart" | "selectionEnd" => Slot::read_write(I),
        "checkValidity" => Slot::read(function(arena, [Signature::returning([], B)])),
        "select" => Slot::read(callback(arena, [])),
        "setCustomValidity" => Slot::read(callback(arena, [S])),
        _ => return None,
    };
    Some(slot)
}

fn style_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let slot = match key {
        "display" | "height" | "width" | "top" | "bottom" | "left" | "right" | "position" => {
            Slot::read_write(S)
        }
        "fontSize" => Slot::read(S),
        "getPropertyValue" => Slot::read(function(arena, [Signature::returning([S], S)])),
        "removeProperty" => Slot::read(method(arena, [Signature::returning([S], S)])),
        "setProperty" => Slot::read(function(
            arena,
            [Signature::void([S, S]), Signature::void([S, S, S])],
        )),
        _ => return None,
    };
    Some(slot)
}

// ============================================================================
// Document and Window
// ============================================================================

/// Tag names `createElement` narrows on.
const ELEMENT_TAGS: &[(&str, BuiltinType)] = &[
    ("a", BuiltinType::HTMLLinkElement),
    ("canvas", BuiltinType::HTMLCanvasElement),
    ("img", BuiltinType::HTMLImageElement),
    ("input", BuiltinType::HTMLInputElement),
];

fn document_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let slot = match key {
        "activeElement" | "body" | "documentElement" => Slot::read(HTML_ELEMENT),
        "cookie" | "title" => Slot::read_write(S),
        "referrer" | "visibilityState" => Slot::read(S),
        "hidden" => Slot::read(B),
        "createElement" => {
            let mut overloads: Vec<Signature> = ELEMENT_TAGS
                .iter()
                .map(|(tag, element)| Signature::returning([literal_string(arena, tag)], host(*element)))
                .collect();
            // Catch-all, must stay last: the first matching overload wins.
            overloads.push(Signature::returning([S], HTML_ELEMENT));
            Slot::read(function(arena, overloads))
        }
        "execCommand" => Slot::read(callback(arena, [S])),
        "getElementById" | "querySelector" => {
            Slot::read(function(arena, [Signature::returning([S], HTML_ELEMENT)]))
        }
        _ => return None,
    };
    Some(slot)
}

fn window_member(arena: &mut TypeArena, key: &str) -> Option<Slot> {
    let ty = match key {
        "atob" | "btoa" => function(arena, [Signature::returning([S], S)]),
        "blur" | "close" | "focus" => callback(arena, []),
        "devicePixelRatio" | "innerHeight" | "innerWidth" | "scrollX" | "scrollY" => N,
        "document" => host(BuiltinType::Document),
        "getComputedStyle" => function(arena, [Signature::returning([HTML_ELEMENT], STYLE)]),
        "requestAnimationFrame" => {
            let frame = callback(arena, [N]);
            function(arena, [Signature::returning([frame], I)])
        }
        "scrollTo" => callback(arena, [N, N]),
        "setInterval" | "setTimeout" => {
            let handler = callback(arena, []);
            function(
                arena,
                [Signature::returning([handler], I), Signature::returning([handler, I], I)],
            )
        }
        "clearInterval" | "clearTimeout" => callback(arena, [I]),
        _ => return None,
    };
    Some(Slot::read(ty))
}

// ============================================================================
// Workers
// ============================================================================

fn port_member(arena: &mut TypeArena, b: BuiltinType, key: &str) -> Option<Slot> {
    let slot = match key {
        "postMessage" => Slot::read(custom(arena, [Signature::void([ANY])], CustomReturn::PostMessage)),
        "onmessage" | "onmessageerror" => {
            let event = arena.event(EventKind::MessageEvent, None);
            Slot::write(callback(arena, [event]))
        }
        "terminate" if b == BuiltinType::Worker => Slot::read(callback(arena, [])),
        "close" | "start" if b == BuiltinType::MessagePort => Slot::read(callback(arena, [])),
        _ => return None,
    };
    Some(slot)
}

// ============================================================================
// WebGL
// ============================================================================

/// Constants that keep their name in the type (`GLEnum<"TEXTURE_2D">`), so
/// overloads can select on them.
const NAMED_ENUMS: &[&str] = &[
    "ACTIVE_ATTRIBUTES",
    "ACTIVE_UNIFORMS",
    "ALPHA",
    "ALWAYS",
    "ARRAY_BUFFER",
    "BLEND",
    "COMPILE_STATUS",
    "CULL_FACE",
    "DEPTH_TEST",
    "DYNAMIC_DRAW",
    "ELEMENT_ARRAY_BUFFER",
    "EQUAL",
    "FLOAT",
    "FRAGMENT_SHADER",
    "LEQUAL",
    "LESS",
    "LINES",
    "LINE_LOOP",
    "LINE_STRIP",
    "LINK_STATUS",
    "MAX_FRAGMENT_UNIFORM_VECTORS",
    "MAX_TEXTURE_IMAGE_UNITS",
    "MAX_VERTEX_UNIFORM_VECTORS",
    "NEVER",
    "NO_ERROR",
    "ONE",
    "ONE_MINUS_SRC_ALPHA",
    "POINTS",
    "RGB",
    "RGBA",
    "SCISSOR_TEST",
    "SRC_ALPHA",
    "STATIC_DRAW",
    "STREAM_DRAW",
    "TEXTURE_2D",
    "TEXTURE_MAG_FILTER",
    "TEXTURE_MIN_FILTER",
    "TEXTURE_WRAP_S",
    "TEXTURE_WRAP_T",
    "TRIANGLES",
    "TRIANGLE_FAN",
    "TRIANGLE_STRIP",
    "UNSIGNED_BYTE",
    "UNSIGNED_INT",
    "UNSIGNED_SHORT",
    "VALIDATE_STATUS",
    "VERTEX_SHADER",
    "ZERO",
];

/// Constants passed as plain integers (bit masks, filter and wrap modes,
/// texture units).
fn is_int_constant(key: &str) -> bool {
    matches!(
        key,
        "CLAMP_TO_EDGE"
            | "COLOR_BUFFER_BIT"
            | "DEPTH_BUFFER_BIT"
            | "LINEAR"
            | "MIRRORED_REPEAT"
            | "NEAREST"
            | "REPEAT"
    ) || key
        .strip_prefix("TEXTURE")
        .and_then(|n| n.parse::<u8>().ok())
        .is_some_and(|n| n < 16)
}

fn gl_enum(arena: &mut TypeArena, name: &str) -> TypeId {
    arena.literal(GL_ENUM, Literal::String(name.to_string()))
}

fn webgl_member(checker: &mut Checker, key: &str) -> Option<Slot> {
    if NAMED_ENUMS.contains(&key) {
        return Some(Slot::read(gl_enum(&mut checker.arena, key)));
    }
    if is_int_constant(key) {
        return Some(Slot::read(I));
    }
    let image_source = checker.well_known.canvas_image_source;
    let arena = &mut checker.arena;
    let e = GL_ENUM;
    let ty = match key {
        "activeTexture" | "clear" | "enableVertexAttribArray" => callback(arena, [I]),
        "attachShader" => callback(arena, [PROGRAM, SHADER]),
        "bindBuffer" => callback(arena, [e, BUFFER]),
        "bindTexture" => callback(arena, [e, TEXTURE]),
        "blendFunc" => callback(arena, [e, e]),
        "blendFuncSeparate" => callback(arena, [e, e, e, e]),
        "bufferData" => {
            let data = arena.typed_array(TypedArrayKind::Generic);
            callback(arena, [e, data, e])
        }
        "compileShader" => callback(arena, [SHADER]),
        "createBuffer" => function(arena, [Signature::returning([], BUFFER)]),
        "createProgram" => function(arena, [Signature::returning([], PROGRAM)]),
        "createShader" => function(arena, [Signature::returning([e], SHADER)]),
        "createTexture" => function(arena, [Signature::returning([], TEXTURE)]),
        "depthFunc" | "disable" | "enable" => callback(arena, [e]),
        "drawArrays" => callback(arena, [e, I, I]),
        "drawElements" => callback(arena, [e, I, e, I]),
        "getAttribLocation" | "getUniformLocation" => {
            function(arena, [Signature::returning([PROGRAM, S], I)])
        }
        "getError" => function(arena, [Signature::returning([], e)]),
        "getParameter" => {
            let fragment = gl_enum(arena, "MAX_FRAGMENT_UNIFORM_VECTORS");
            let vertex = gl_enum(arena, "MAX_VERTEX_UNIFORM_VECTORS");
            let floats = arena.typed_array(TypedArrayKind::Float32);
            function(
                arena,
                [
                    Signature::returning([fragment], I),
                    Signature::returning([vertex], I),
                    Signature::returning([e], floats),
                ],
            )
        }
        "getProgramInfoLog" => function(arena, [Signature::returning([PROGRAM], S)]),
        "getProgramParameter" => function(arena, [Signature::returning([PROGRAM, e], B)]),
        "getShaderInfoLog" => function(arena, [Signature::returning([SHADER], S)]),
        "getShaderParameter" => function(arena, [Signature::returning([SHADER, e], B)]),
        "linkProgram" | "useProgram" | "validateProgram" => callback(arena, [PROGRAM]),
        "scissor" | "viewport" | "clearColor" => callback(arena, [N, N, N, N]),
        "shaderSource" => callback(arena, [SHADER, S]),
        "texParameterf" => callback(arena, [e, e, N]),
        "texParameteri" => callback(arena, [e, e, I]),
        "texImage2D" => {
            let pixels = arena.typed_array(TypedArrayKind::Generic);
            function(
                arena,
                [
                    Signature::void([e, I, e, I, I, I, e, e, pixels]),
                    Signature::void([e, I, e, e, e, image_source]),
                ],
            )
        }
        "uniform1f" => callback(arena, [I, N]),
        "uniform2f" => callback(arena, [I, N, N]),
        "uniform3f" => callback(arena, [I, N, N, N]),
        "uniform4f" => callback(arena, [I, N, N, N, N]),
        "uniform1i" => callback(arena, [I, I]),
        "uniform2i" => callback(arena, [I, I, I]),
        "uniform3i" => callback(arena, [I, I, I, I]),
        "uniform4i" => callback(arena, [I, I, I, I, I]),
        "uniform1fv" | "uniform2fv" | "uniform3fv" | "uniform4fv" => {
            let values = arena.array(Some(N));
            callback(arena, [I, values])
        }
        "uniform1iv" | "uniform2iv" | "uniform3iv" | "uniform4iv" => {
            let values = arena.array(Some(I));
            callback(arena, [I, values])
        }
        "uniformMatrix2fv" | "uniformMatrix3fv" | "uniformMatrix4fv" => {
            let values = arena.array(Some(N));
            callback(arena, [I, B, values])
        }
        "vertexAttribPointer" => callback(arena, [I, I, e, B, I, I]),
        _ => return None,
    };
    Some(Slot::read(ty))
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::errors::CheckError;
    use crate::sema::builtin::BuiltinType;
    use crate::sema::checker::Checker;
    use crate::sema::function::{FunctionType, Signature};
    use crate::sema::type_arena::{EventKind, TypeId};
    use crate::sema::value::Value;

    fn ctx() -> Context {
        Context::dummy()
    }

    fn host(b: BuiltinType) -> Value {
        Value::new(TypeId::builtin(b), &ctx())
    }

    fn call(checker: &mut Checker, receiver: &Value, key: &str, args: &[Value]) -> Option<Value> {
        let f = checker.get_member(receiver, key, &ctx()).unwrap();
        checker.eval_function(&f, args, false, &ctx()).unwrap()
    }

    #[test]
    fn create_element_narrows_on_literal_tags() {
        let mut checker = Checker::default();
        let document = host(BuiltinType::Document);
        let canvas = call(&mut checker, &document, "createElement", &[Value::literal_string("canvas", &ctx())]);
        assert_eq!(checker.display(canvas.unwrap().type_id()), "HTMLCanvasElement");
        let link = call(&mut checker, &document, "createElement", &[Value::literal_string("a", &ctx())]);
        assert_eq!(checker.display(link.unwrap().type_id()), "HTMLLinkElement");
        let div = call(&mut checker, &document, "createElement", &[Value::literal_string("div", &ctx())]);
        assert_eq!(checker.display(div.unwrap().type_id()), "HTMLElement");
        let dynamic = call(&mut checker, &document, "createElement", &[Value::new(TypeId::STRING, &ctx())]);
        assert_eq!(checker.display(dynamic.unwrap().type_id()), "HTMLElement");
    }

    #[test]
    fn listeners_receive_specialised_events() {
        let mut checker = Checker::default();
        let canvas = TypeId::builtin(BuiltinType::HTMLCanvasElement);
        let target = Value::new(canvas, &ctx());
        let listen = checker.get_member(&target, "addEventListener", &ctx()).unwrap();

        let mouse = checker.arena_mut().event(EventKind::MouseEvent, Some(canvas));
        let on_click = checker.arena_mut().function(FunctionType::new([Signature::void([mouse])]));
        let args = [Value::literal_string("click", &ctx()), Value::new(on_click, &ctx())];
        assert!(checker.eval_function(&listen, &args, true, &ctx()).is_ok());

        let on_text = checker
            .arena_mut()
            .function(FunctionType::new([Signature::void([TypeId::STRING])]));
        let args = [Value::literal_string("click", &ctx()), Value::new(on_text, &ctx())];
        let err = checker.eval_function(&listen, &args, true, &ctx()).unwrap_err();
        assert!(matches!(err.error, CheckError::NoMatchingOverload { .. }));
    }

    #[test]
    fn image_handlers_are_setter_only() {
        let mut checker = Checker::default();
        let image = host(BuiltinType::HTMLImageElement);
        let err = checker.get_member(&image, "onload", &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "HTMLImageElement.onload is a setter only");

        let handler = checker.arena_mut().function(FunctionType::new([Signature::void([])]));
        assert!(checker
            .set_member(&image, "onload", &Value::new(handler, &ctx()), &ctx())
            .is_ok());
        assert!(checker
            .set_member(&image, "src", &Value::literal_string("a.png", &ctx()), &ctx())
            .is_ok());
    }

    #[test]
    fn worker_messages_are_setter_only_callbacks() {
        let mut checker = Checker::default();
        let worker = host(BuiltinType::Worker);
        let message = checker.arena_mut().event(EventKind::MessageEvent, None);
        let handler = checker.arena_mut().function(FunctionType::new([Signature::void([message])]));
        assert!(checker
            .set_member(&worker, "onmessage", &Value::new(handler, &ctx()), &ctx())
            .is_ok());
        let wrong = checker
            .arena_mut()
            .function(FunctionType::new([Signature::void([TypeId::INT])]));
        assert!(checker
            .set_member(&worker, "onmessage", &Value::new(wrong, &ctx()), &ctx())
            .is_err());
        assert!(checker.get_member(&worker, "onmessage", &ctx()).is_err());
    }

    #[test]
    fn style_members() {
        let mut checker = Checker::default();
        let canvas = host(BuiltinType::HTMLCanvasElement);
        let style = checker.get_member(&canvas, "style", &ctx()).unwrap();
        assert!(checker
            .set_member(&style, "display", &Value::literal_string("none", &ctx()), &ctx())
            .is_ok());
        let err = checker
            .set_member(&style, "fontSize", &Value::literal_string("12px", &ctx()), &ctx())
            .unwrap_err();
        assert_eq!(err.to_string(), "CSSStyleDeclaration.fontSize not setable");
        assert!(checker.get_member(&style, "color", &ctx()).is_err());
    }

    #[test]
    fn gl_constants_select_overloads() {
        let mut checker = Checker::default();
        let gl = host(BuiltinType::WebGLRenderingContext);
        let vertex = checker.get_member(&gl, "MAX_VERTEX_UNIFORM_VECTORS", &ctx()).unwrap();
        assert_eq!(vertex.literal_string_value(), Some("MAX_VERTEX_UNIFORM_VECTORS"));
        let count = call(&mut checker, &gl, "getParameter", &[vertex]).unwrap();
        assert_eq!(count.type_id(), TypeId::INT);

        let texture = checker.get_member(&gl, "TEXTURE_2D", &ctx()).unwrap();
        let floats = call(&mut checker, &gl, "getParameter", &[texture.clone()]).unwrap();
        assert_eq!(checker.display(floats.type_id()), "Float32Array");

        let min = checker.get_member(&gl, "TEXTURE_MIN_FILTER", &ctx()).unwrap();
        let linear = checker.get_member(&gl, "LINEAR", &ctx()).unwrap();
        assert_eq!(linear.type_id(), TypeId::INT);
        assert!(call(&mut checker, &gl, "texParameteri", &[texture, min, linear]).is_none());
    }

    #[test]
    fn tex_image_accepts_canvas_image_sources() {
        let mut checker = Checker::default();
        let gl = host(BuiltinType::WebGLRenderingContext);
        let f = checker.get_member(&gl, "texImage2D", &ctx()).unwrap();
        let e = checker.get_member(&gl, "RGBA", &ctx()).unwrap();
        let target = checker.get_member(&gl, "TEXTURE_2D", &ctx()).unwrap();
        let level = Value::literal_int(0, &ctx());
        let args = |source: Value| {
            vec![target.clone(), level.clone(), e.clone(), e.clone(), e.clone(), source]
        };
        let image = host(BuiltinType::HTMLImageElement);
        assert!(checker.eval_function(&f, &args(image), false, &ctx()).is_ok());
        let input = host(BuiltinType::HTMLInputElement);
        assert!(checker.eval_function(&f, &args(input), false, &ctx()).is_err());
    }

    #[test]
    fn window_document() {
        let mut checker = Checker::default();
        let window = host(BuiltinType::Window);
        let document = checker.get_member(&window, "document", &ctx()).unwrap();
        let body = checker.get_member(&document, "body", &ctx()).unwrap();
        // `appendChild` is declared on Node, three links above HTMLElement.
        let append = checker.get_member(&body, "appendChild", &ctx()).unwrap();
        let canvas = host(BuiltinType::HTMLCanvasElement);
        let out = checker.eval_function(&append, &[canvas], true, &ctx()).unwrap();
        assert!(out.is_none());
    }
}

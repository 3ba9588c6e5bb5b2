// src/sema/builtins/interfaces.rs
//
// Host-defined structural interfaces.

use crate::sema::builtin::BuiltinType;
use crate::sema::conformance::{InterfaceDef, Requirement};
use crate::sema::function::Signature;
use crate::sema::type_arena::{TypeArena, TypeId, TypedArrayKind};

use super::{callback, function};

/// Interfaces every checker knows about, registered at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnown {
    /// `HTMLCanvasElement` or `HTMLImageElement`.
    pub canvas_image_source: TypeId,
    /// File handle API a WebAssembly module expects from its host.
    pub webassembly_fs: TypeId,
}

impl WellKnown {
    pub fn register(arena: &mut TypeArena) -> Self {
        let (_, canvas_image_source) = arena.add_interface(InterfaceDef {
            name: "CanvasImageSource".to_string(),
            requirement: Requirement::OneOf(vec![
                TypeId::builtin(BuiltinType::HTMLCanvasElement),
                TypeId::builtin(BuiltinType::HTMLImageElement),
            ]),
            extends: Vec::new(),
            is_rpc: false,
        });

        let (i, s) = (TypeId::INT, TypeId::STRING);
        let bytes = arena.typed_array(TypedArrayKind::Uint8);
        let getters = vec![
            ("close".to_string(), callback(arena, [i])),
            ("create".to_string(), function(arena, [Signature::returning([s], i)])),
            ("exists".to_string(), function(arena, [Signature::returning([s], TypeId::BOOLEAN)])),
            ("open".to_string(), function(arena, [Signature::returning([s], i)])),
            ("read".to_string(), function(arena, [Signature::returning([i, i], bytes)])),
            ("seek".to_string(), callback(arena, [i, i])),
            ("size".to_string(), function(arena, [Signature::returning([i], i)])),
            ("tell".to_string(), function(arena, [Signature::returning([i], i)])),
            ("write".to_string(), callback(arena, [i, bytes])),
        ];
        let (_, webassembly_fs) = arena.add_interface(InterfaceDef {
            name: "WebAssemblyFS".to_string(),
            requirement: Requirement::Members {
                getters,
                setters: Vec::new(),
            },
            extends: Vec::new(),
            is_rpc: false,
        });

        Self {
            canvas_image_source,
            webassembly_fs,
        }
    }
}

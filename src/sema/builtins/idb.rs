// src/sema/builtins/idb.rs

use crate::sema::checker::Checker;
use crate::sema::type_arena::{EventKind, TypeId};

use super::{Slot, callback};

/// `IDBRequest<content>`: `result` reads the content, the handlers can only
/// be assigned.
pub(super) fn member(checker: &mut Checker, content: Option<TypeId>, key: &str) -> Option<Slot> {
    let arena = &mut checker.arena;
    let slot = match key {
        "result" => Slot::read(content.unwrap_or(TypeId::ANY)),
        "readyState" => Slot::read(TypeId::STRING),
        "onerror" | "onsuccess" => {
            let request = arena.request(None);
            let event = arena.event(EventKind::Event, Some(request));
            Slot::write(callback(arena, [event]))
        }
        _ => return None,
    };
    Some(slot)
}

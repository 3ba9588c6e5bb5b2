// src/sema/builtins/events.rs
//
// `Event<target>` and its specialisations. Each kind answers only its own
// keys; the rest are found by walking to the parent kind.

use crate::sema::checker::Checker;
use crate::sema::function::Signature;
use crate::sema::type_arena::{EventKind, TypeId};

use super::{Slot, callback, function};

const S: TypeId = TypeId::STRING;
const I: TypeId = TypeId::INT;
const N: TypeId = TypeId::NUMBER;
const B: TypeId = TypeId::BOOLEAN;

pub(super) fn member(checker: &mut Checker, kind: EventKind, target: Option<TypeId>, key: &str) -> Option<Slot> {
    let arena = &mut checker.arena;
    let ty = match (kind, key) {
        // A targetless event yields an unconstrained target.
        (EventKind::Event, "target" | "currentTarget") => target.unwrap_or(TypeId::ANY),
        (EventKind::Event, "type") => S,
        (EventKind::Event, "bubbles" | "cancelable" | "defaultPrevented") => B,
        (EventKind::Event, "timeStamp") => N,
        (EventKind::Event, "preventDefault" | "stopPropagation" | "stopImmediatePropagation") => {
            callback(arena, [])
        }
        (EventKind::UIEvent, "detail") => I,
        (EventKind::MouseEvent, "clientX" | "clientY" | "offsetX" | "offsetY" | "pageX" | "pageY" | "screenX" | "screenY") => N,
        (EventKind::MouseEvent, "button" | "buttons") => I,
        (EventKind::MouseEvent | EventKind::KeyboardEvent, "altKey" | "ctrlKey" | "metaKey" | "shiftKey") => B,
        (EventKind::KeyboardEvent, "key" | "code") => S,
        (EventKind::KeyboardEvent, "repeat") => B,
        (EventKind::KeyboardEvent, "getModifierState") => function(arena, [Signature::returning([S], B)]),
        (EventKind::MessageEvent, "data") => TypeId::ANY,
        (EventKind::MessageEvent, "origin" | "lastEventId") => S,
        _ => return None,
    };
    Some(Slot::read(ty))
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::sema::builtin::BuiltinType;
    use crate::sema::checker::Checker;
    use crate::sema::type_arena::{EventKind, TypeId};
    use crate::sema::value::Value;

    #[test]
    fn specialised_events_inherit_event_members() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let canvas = TypeId::builtin(BuiltinType::HTMLCanvasElement);
        let key = checker.arena_mut().event(EventKind::KeyboardEvent, Some(canvas));
        let key = Value::new(key, &ctx);

        assert_eq!(checker.get_member(&key, "key", &ctx).unwrap().type_id(), TypeId::STRING);
        assert_eq!(checker.get_member(&key, "shiftKey", &ctx).unwrap().type_id(), TypeId::BOOLEAN);
        // Two links up: KeyboardEvent -> UIEvent -> Event.
        assert_eq!(checker.get_member(&key, "target", &ctx).unwrap().type_id(), canvas);
        assert_eq!(checker.get_member(&key, "detail", &ctx).unwrap().type_id(), TypeId::INT);
        assert!(checker.get_member(&key, "clientX", &ctx).is_err());
    }

    #[test]
    fn targetless_events_have_any_target() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let message = checker.arena_mut().event(EventKind::MessageEvent, None);
        let message = Value::new(message, &ctx);
        assert!(checker.get_member(&message, "target", &ctx).unwrap().is_any());
        assert!(checker.get_member(&message, "data", &ctx).unwrap().is_any());
        assert!(checker
            .set_member(&message, "data", &Value::literal_int(1, &ctx), &ctx)
            .is_err());
    }
}

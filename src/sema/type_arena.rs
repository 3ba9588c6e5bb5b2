// src/sema/type_arena.rs
//
// Interned type universe using TypeId handles for O(1) equality.
//
// - TypeId: u32 handle to an interned type (Copy, trivial Eq/Hash)
// - TypeKind: closed enum of every type shape the checker knows
// - TypeArena: per-compilation storage with structural deduplication
//
// Because construction goes through the intern map, two containers with the
// same shape and held types get the same TypeId. Reflexivity of `check`
// falls out of that: `Array<Int>` is one id no matter who built it.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::context::Context;
use crate::sema::builtin::BuiltinType;
use crate::sema::class::ClassType;
use crate::sema::conformance::{InterfaceDef, InterfaceId};
use crate::sema::declared::{ClassDef, ClassDefId};
use crate::sema::function::FunctionType;
use crate::sema::value::{Literal, Value};

/// Handle to an interned type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    // ========================================================================
    // Reserved TypeIds
    // `TypeArena::new()` interns `any` at 0 and every BuiltinType after it,
    // in discriminant order.
    // ========================================================================

    pub const ANY: TypeId = TypeId(0);

    pub const STRING: TypeId = TypeId::builtin(BuiltinType::String);
    pub const NUMBER: TypeId = TypeId::builtin(BuiltinType::Number);
    pub const INT: TypeId = TypeId::builtin(BuiltinType::Int);
    pub const BOOLEAN: TypeId = TypeId::builtin(BuiltinType::Boolean);

    /// First non-reserved TypeId index (for dynamic types)
    pub const FIRST_DYNAMIC: u32 = 1 + BuiltinType::COUNT as u32;

    pub const fn builtin(b: BuiltinType) -> TypeId {
        TypeId(1 + b as u32)
    }

    /// Get the raw index (for debugging)
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_any(self) -> bool {
        self == Self::ANY
    }

    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

pub type TypeIdVec = SmallVec<[TypeId; 4]>;

/// What a `Promise` resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseContent {
    /// Unconstrained.
    Any,
    /// Resolves without a value; only accepts other void promises.
    Void,
    Of(TypeId),
}

/// Specialised event prototypes; all fall back to `Event<target>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Event,
    UIEvent,
    MouseEvent,
    KeyboardEvent,
    MessageEvent,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Event => "Event",
            EventKind::UIEvent => "UIEvent",
            EventKind::MouseEvent => "MouseEvent",
            EventKind::KeyboardEvent => "KeyboardEvent",
            EventKind::MessageEvent => "MessageEvent",
        }
    }

    pub fn parent(self) -> Option<EventKind> {
        match self {
            EventKind::Event => None,
            EventKind::UIEvent | EventKind::MessageEvent => Some(EventKind::Event),
            EventKind::MouseEvent | EventKind::KeyboardEvent => Some(EventKind::UIEvent),
        }
    }

    pub fn from_name(name: &str) -> Option<EventKind> {
        [
            EventKind::Event,
            EventKind::UIEvent,
            EventKind::MouseEvent,
            EventKind::KeyboardEvent,
            EventKind::MessageEvent,
        ]
        .into_iter()
        .find(|k| k.name() == name)
    }
}

/// Typed array flavours. `Generic` is the abstract `TypedArray`, which
/// accepts every concrete flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
    Generic,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl TypedArrayKind {
    pub const ALL: [TypedArrayKind; 9] = [
        TypedArrayKind::Generic,
        TypedArrayKind::Int8,
        TypedArrayKind::Uint8,
        TypedArrayKind::Int16,
        TypedArrayKind::Uint16,
        TypedArrayKind::Int32,
        TypedArrayKind::Uint32,
        TypedArrayKind::Float32,
        TypedArrayKind::Float64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TypedArrayKind::Generic => "TypedArray",
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
        }
    }

    pub fn from_name(name: &str) -> Option<TypedArrayKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Element width in bits, 0 for the generic kind.
    pub fn bits(self) -> u32 {
        match self {
            TypedArrayKind::Generic => 0,
            TypedArrayKind::Int8 | TypedArrayKind::Uint8 => 8,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 16,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 32,
            TypedArrayKind::Float64 => 64,
        }
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            TypedArrayKind::Uint8 | TypedArrayKind::Uint16 | TypedArrayKind::Uint32
        )
    }

    /// Element type: `Int` for integer flavours, `Number` otherwise.
    pub fn element(self) -> TypeId {
        match self {
            TypedArrayKind::Generic | TypedArrayKind::Float32 | TypedArrayKind::Float64 => {
                TypeId::NUMBER
            }
            _ => TypeId::INT,
        }
    }
}

/// Object literal type.
///
/// `members` is sorted by key. An object with neither members nor `common`
/// is the unconstrained `Object`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    pub members: Option<Vec<(String, TypeId)>>,
    /// Map-like objects: every value has this type.
    pub common: Option<TypeId>,
    /// Option bags: an actual may supply any subset of the members.
    pub is_config: bool,
}

impl ObjectShape {
    pub fn member(&self, key: &str) -> Option<TypeId> {
        let members = self.members.as_ref()?;
        members
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|i| members[i].1)
    }

    pub fn has_members(&self) -> bool {
        self.members.as_ref().is_some_and(|m| !m.is_empty())
    }
}

/// The canonical type representation.
///
/// Held slots use `None` for "unconstrained"; `TypeArena` normalises a held
/// `any` to `None` so there is exactly one spelling of `Array<any>`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeKind {
    Any,
    Builtin(BuiltinType),
    Literal {
        base: TypeId,
        value: Literal,
    },

    // Generic containers
    Array(Option<TypeId>),
    Set(Option<TypeId>),
    Map {
        key: Option<TypeId>,
        item: Option<TypeId>,
    },
    Promise(PromiseContent),
    Tuple(Option<TypeIdVec>),
    TypedArray(TypedArrayKind),
    Request(Option<TypeId>),
    Event {
        kind: EventKind,
        target: Option<TypeId>,
    },
    Object(Box<ObjectShape>),

    // Callables
    Function(Box<FunctionType>),
    Class(Box<ClassType>),

    // Structural contracts and user prototypes
    Interface(InterfaceId),
    Declared(ClassDefId),
}

impl TypeKind {
    /// Prototypes have a parent link and instance members; interfaces,
    /// callables and `any` do not.
    pub fn is_prototype(&self) -> bool {
        !matches!(
            self,
            TypeKind::Any
                | TypeKind::Literal { .. }
                | TypeKind::Function(_)
                | TypeKind::Class(_)
                | TypeKind::Interface(_)
        )
    }
}

/// Per-compilation type arena with automatic interning/deduplication.
pub struct TypeArena {
    /// Interned types, indexed by TypeId
    types: Vec<TypeKind>,
    /// Deduplication map
    intern_map: HashMap<TypeKind, TypeId>,
    /// Structural interface definitions, indexed by InterfaceId
    interfaces: Vec<InterfaceDef>,
    /// User-declared prototypes, indexed by ClassDefId
    classes: Vec<ClassDef>,
    /// Named types (builtins, interfaces, declared classes)
    names: HashMap<String, TypeId>,
}

impl std::fmt::Debug for TypeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeArena")
            .field("types_count", &self.types.len())
            .field("interfaces", &self.interfaces.len())
            .field("classes", &self.classes.len())
            .finish_non_exhaustive()
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    /// Create an arena with `any` and every builtin pre-interned.
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::new(),
            intern_map: HashMap::new(),
            interfaces: Vec::new(),
            classes: Vec::new(),
            names: HashMap::new(),
        };

        let any = arena.intern(TypeKind::Any);
        debug_assert_eq!(any, TypeId::ANY);
        arena.names.insert("any".to_string(), any);

        for b in BuiltinType::ALL {
            let id = arena.intern(TypeKind::Builtin(b));
            debug_assert_eq!(id, TypeId::builtin(b));
            arena.names.insert(b.name().to_string(), id);
        }

        arena
    }

    /// Intern a type, returning existing TypeId if already interned
    fn intern(&mut self, ty: TypeKind) -> TypeId {
        let next_id = TypeId(self.types.len() as u32);
        *self.intern_map.entry(ty.clone()).or_insert_with(|| {
            self.types.push(ty);
            next_id
        })
    }

    /// Get the TypeKind for a TypeId
    pub fn get(&self, id: TypeId) -> &TypeKind {
        &self.types[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ========================================================================
    // Held-slot normalisation
    // ========================================================================

    /// Literal types widen to their base.
    pub fn widen(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeKind::Literal { base, .. } => *base,
            _ => id,
        }
    }

    /// Normalise a held slot: widen literals, `any` becomes unconstrained.
    pub fn held(&self, slot: Option<TypeId>) -> Option<TypeId> {
        slot.map(|id| self.widen(id)).filter(|id| !id.is_any())
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn any(&self) -> TypeId {
        TypeId::ANY
    }

    pub fn builtin(&self, b: BuiltinType) -> TypeId {
        TypeId::builtin(b)
    }

    /// `base` pinned to one constant. A literal base is widened first.
    pub fn literal(&mut self, base: TypeId, value: Literal) -> TypeId {
        let base = self.widen(base);
        self.intern(TypeKind::Literal { base, value })
    }

    pub fn array(&mut self, content: Option<TypeId>) -> TypeId {
        let content = self.held(content);
        self.intern(TypeKind::Array(content))
    }

    pub fn set(&mut self, content: Option<TypeId>) -> TypeId {
        let content = self.held(content);
        self.intern(TypeKind::Set(content))
    }

    pub fn map(&mut self, key: Option<TypeId>, item: Option<TypeId>) -> TypeId {
        let key = self.held(key);
        let item = self.held(item);
        self.intern(TypeKind::Map { key, item })
    }

    pub fn promise(&mut self, content: Option<TypeId>) -> TypeId {
        let content = match self.held(content) {
            Some(id) => PromiseContent::Of(id),
            None => PromiseContent::Any,
        };
        self.intern(TypeKind::Promise(content))
    }

    pub fn void_promise(&mut self) -> TypeId {
        self.intern(TypeKind::Promise(PromiseContent::Void))
    }

    /// Tuple elements are widened but `any` elements stay in place (a
    /// position is never dropped). An empty list is the unconstrained tuple.
    pub fn tuple(&mut self, elements: Option<impl IntoIterator<Item = TypeId>>) -> TypeId {
        let elements: Option<TypeIdVec> = elements
            .map(|items| items.into_iter().map(|id| self.widen(id)).collect::<TypeIdVec>())
            .filter(|items| !items.is_empty());
        self.intern(TypeKind::Tuple(elements))
    }

    pub fn typed_array(&mut self, kind: TypedArrayKind) -> TypeId {
        self.intern(TypeKind::TypedArray(kind))
    }

    pub fn request(&mut self, content: Option<TypeId>) -> TypeId {
        let content = self.held(content);
        self.intern(TypeKind::Request(content))
    }

    pub fn event(&mut self, kind: EventKind, target: Option<TypeId>) -> TypeId {
        let target = self.held(target);
        self.intern(TypeKind::Event { kind, target })
    }

    /// Object with named members. Later duplicates of a key win.
    pub fn object(&mut self, members: impl IntoIterator<Item = (String, TypeId)>) -> TypeId {
        let shape = ObjectShape {
            members: Some(self.sorted_members(members)),
            common: None,
            is_config: false,
        };
        self.intern(TypeKind::Object(Box::new(shape)))
    }

    /// Map-like object whose values all have type `common`.
    pub fn map_like_object(&mut self, common: Option<TypeId>) -> TypeId {
        let shape = ObjectShape {
            members: None,
            common: self.held(common),
            is_config: false,
        };
        self.intern(TypeKind::Object(Box::new(shape)))
    }

    /// Option bag: actuals may supply any subset of `options`.
    pub fn config_object(&mut self, options: impl IntoIterator<Item = (String, TypeId)>) -> TypeId {
        let shape = ObjectShape {
            members: Some(self.sorted_members(options)),
            common: None,
            is_config: true,
        };
        self.intern(TypeKind::Object(Box::new(shape)))
    }

    fn sorted_members(
        &self,
        members: impl IntoIterator<Item = (String, TypeId)>,
    ) -> Vec<(String, TypeId)> {
        let map: BTreeMap<String, TypeId> = members
            .into_iter()
            .map(|(k, v)| (k, self.widen(v)))
            .collect();
        map.into_iter().collect()
    }

    pub fn function(&mut self, function: FunctionType) -> TypeId {
        self.intern(TypeKind::Function(Box::new(function)))
    }

    pub fn class(&mut self, class: ClassType) -> TypeId {
        self.intern(TypeKind::Class(Box::new(class)))
    }

    pub fn interface(&mut self, id: InterfaceId) -> TypeId {
        self.intern(TypeKind::Interface(id))
    }

    pub fn declared(&mut self, id: ClassDefId) -> TypeId {
        self.intern(TypeKind::Declared(id))
    }

    // ========================================================================
    // Definitions and names
    // ========================================================================

    /// Store an interface definition and name it. Returns the interned
    /// `Interface` type.
    pub fn add_interface(&mut self, def: InterfaceDef) -> (InterfaceId, TypeId) {
        let id = InterfaceId::new(self.interfaces.len() as u32);
        let name = def.name.clone();
        self.interfaces.push(def);
        let ty = self.interface(id);
        self.names.insert(name, ty);
        (id, ty)
    }

    pub fn interface_def(&self, id: InterfaceId) -> &InterfaceDef {
        &self.interfaces[id.index()]
    }

    /// Store a class definition and name it. Returns the interned
    /// `Declared` type.
    pub fn add_class(&mut self, def: ClassDef) -> (ClassDefId, TypeId) {
        let id = ClassDefId::new(self.classes.len() as u32);
        let name = def.name.clone();
        self.classes.push(def);
        let ty = self.declared(id);
        self.names.insert(name, ty);
        (id, ty)
    }

    pub fn class_def(&self, id: ClassDefId) -> &ClassDef {
        &self.classes[id.index()]
    }

    pub fn lookup_name(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        self.names.contains_key(name)
            || EventKind::from_name(name).is_some()
            || TypedArrayKind::from_name(name).is_some()
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// A value of type `id`, splitting literal types into base + payload.
    pub fn value(&self, id: TypeId, ctx: &Context) -> Value {
        match self.get(id) {
            TypeKind::Literal { base, value } => Value::with_literal(*base, value.clone(), ctx),
            _ => Value::new(id, ctx),
        }
    }

    /// The type a value denotes, interning a literal type if it has one.
    pub fn value_type(&mut self, value: &Value) -> TypeId {
        match value.literal() {
            Some(lit) => self.literal(value.type_id(), lit.clone()),
            None => value.type_id(),
        }
    }

    // ========================================================================
    // Display
    // ========================================================================

    fn display_slot(&self, slot: Option<TypeId>) -> String {
        match slot {
            Some(id) => self.display(id),
            None => "any".to_string(),
        }
    }

    fn display_list(&self, ids: &[TypeId]) -> String {
        ids.iter()
            .map(|id| self.display(*id))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// User-facing name, e.g. `Array<Int>`, `Promise<void>`, `{a:String}`.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeKind::Any => "any".to_string(),
            TypeKind::Builtin(b) => b.name().to_string(),
            TypeKind::Literal { base, value } => format!("{}<{}>", self.display(*base), value),
            TypeKind::Array(None) => "Array".to_string(),
            TypeKind::Array(Some(c)) => format!("Array<{}>", self.display(*c)),
            TypeKind::Set(None) => "Set".to_string(),
            TypeKind::Set(Some(c)) => format!("Set<{}>", self.display(*c)),
            TypeKind::Map {
                key: None,
                item: None,
            } => "Map".to_string(),
            TypeKind::Map { key, item } => format!(
                "Map<{},{}>",
                self.display_slot(*key),
                self.display_slot(*item)
            ),
            TypeKind::Promise(PromiseContent::Any) => "Promise".to_string(),
            TypeKind::Promise(PromiseContent::Void) => "Promise<void>".to_string(),
            TypeKind::Promise(PromiseContent::Of(c)) => format!("Promise<{}>", self.display(*c)),
            TypeKind::Tuple(None) => "Tuple".to_string(),
            TypeKind::Tuple(Some(items)) => format!("Tuple<{}>", self.display_list(items)),
            TypeKind::TypedArray(kind) => kind.name().to_string(),
            TypeKind::Request(None) => "IDBRequest".to_string(),
            TypeKind::Request(Some(c)) => format!("IDBRequest<{}>", self.display(*c)),
            TypeKind::Event { kind, target: None } => kind.name().to_string(),
            TypeKind::Event {
                kind,
                target: Some(t),
            } => format!("{}<{}>", kind.name(), self.display(*t)),
            TypeKind::Object(shape) => self.display_object(shape),
            TypeKind::Function(f) => self.display_function(f),
            TypeKind::Class(c) => match c.target_type() {
                Some(t) => format!("class<{}>", self.display(t)),
                None => "class".to_string(),
            },
            TypeKind::Interface(i) => self.interface_def(*i).name.clone(),
            TypeKind::Declared(c) => self.class_def(*c).name.clone(),
        }
    }

    fn display_object(&self, shape: &ObjectShape) -> String {
        match (&shape.members, shape.common) {
            (Some(members), _) if !members.is_empty() => {
                let body = members
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k, self.display(*v)))
                    .collect::<Vec<_>>()
                    .join(",");
                if shape.is_config {
                    format!("Config{{{}}}", body)
                } else {
                    format!("{{{}}}", body)
                }
            }
            (_, Some(common)) => format!("Object<{}>", self.display(common)),
            _ => "Object".to_string(),
        }
    }

    fn display_function(&self, f: &FunctionType) -> String {
        match f.overloads() {
            [] if f.is_generic() => "function".to_string(),
            [single] => {
                let mut parts: Vec<String> = single.params.iter().map(|p| self.display(*p)).collect();
                parts.push(self.display_return(single.ret));
                format!("function<{}>", parts.join(","))
            }
            many => format!("function<{} overloads>", many.len()),
        }
    }

    pub fn display_return(&self, ret: Option<TypeId>) -> String {
        match ret {
            Some(id) => self.display(id),
            None => "void".to_string(),
        }
    }

    /// `(A,B)` rendering of an argument list.
    pub fn display_args(&self, args: &[TypeId]) -> String {
        format!("({})", self.display_list(args))
    }
}

// src/sema/value.rs
//
// Type-level handles passed through checking.
//
// A `Value` is not a runtime value: it names a type, optionally pins it to
// one compile-time constant, and remembers where it was written.

use std::fmt;

use crate::context::Context;
use crate::sema::type_arena::TypeId;

/// Compile-time constant payload. At most one per value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A type handle with an optional literal payload and a source context.
///
/// `ty` never refers to a `TypeKind::Literal`; `TypeArena::value` splits
/// interned literal types into base type + payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    ty: TypeId,
    literal: Option<Literal>,
    ctx: Context,
}

impl Value {
    /// Any instance of `ty`.
    pub fn new(ty: TypeId, ctx: &Context) -> Self {
        Self {
            ty,
            literal: None,
            ctx: ctx.clone(),
        }
    }

    /// Exactly `literal`, an instance of `base`.
    pub fn with_literal(base: TypeId, literal: Literal, ctx: &Context) -> Self {
        Self {
            ty: base,
            literal: Some(literal),
            ctx: ctx.clone(),
        }
    }

    pub fn any(ctx: &Context) -> Self {
        Self::new(TypeId::ANY, ctx)
    }

    pub fn literal_string(s: impl Into<String>, ctx: &Context) -> Self {
        Self::with_literal(TypeId::STRING, Literal::String(s.into()), ctx)
    }

    pub fn literal_int(i: i64, ctx: &Context) -> Self {
        Self::with_literal(TypeId::INT, Literal::Int(i), ctx)
    }

    pub fn literal_bool(b: bool, ctx: &Context) -> Self {
        Self::with_literal(TypeId::BOOLEAN, Literal::Bool(b), ctx)
    }

    /// The type this value is an instance of (the base type for literals).
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    pub fn literal(&self) -> Option<&Literal> {
        self.literal.as_ref()
    }

    pub fn is_literal(&self) -> bool {
        self.literal.is_some()
    }

    pub fn is_any(&self) -> bool {
        self.ty.is_any()
    }

    pub fn literal_string_value(&self) -> Option<&str> {
        match &self.literal {
            Some(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn literal_int_value(&self) -> Option<i64> {
        match self.literal {
            Some(Literal::Int(i)) => Some(i),
            _ => None,
        }
    }

    pub fn literal_bool_value(&self) -> Option<bool> {
        match self.literal {
            Some(Literal::Bool(b)) => Some(b),
            _ => None,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Same type, attributed to `ctx`.
    pub fn with_context(&self, ctx: &Context) -> Self {
        Self {
            ty: self.ty,
            literal: self.literal.clone(),
            ctx: ctx.clone(),
        }
    }

    /// Widen a literal to its base type (required before storing in a
    /// mutable slot or a container).
    pub fn remove_literalness(&self) -> Self {
        Self::new(self.ty, &self.ctx)
    }
}

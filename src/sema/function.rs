// src/sema/function.rs
//
// Function values and overload resolution.
//
// A function type is an ordered overload list. Resolution is first-match:
// the order of overloads is part of the type (a catch-all goes last on
// purpose) and is never re-ranked.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::checker::Checker;
use crate::sema::type_arena::{TypeId, TypeIdVec, TypeKind};
use crate::sema::value::Value;

/// One call signature. `ret == None` means the call produces no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: TypeIdVec,
    pub ret: Option<TypeId>,
}

impl Signature {
    pub fn new(params: impl IntoIterator<Item = TypeId>, ret: Option<TypeId>) -> Self {
        Self {
            params: params.into_iter().collect(),
            ret,
        }
    }

    pub fn void(params: impl IntoIterator<Item = TypeId>) -> Self {
        Self::new(params, None)
    }

    pub fn returning(params: impl IntoIterator<Item = TypeId>, ret: TypeId) -> Self {
        Self::new(params, Some(ret))
    }

    pub fn is_void(&self) -> bool {
        self.ret.is_none()
    }
}

/// Return types computed from the actual arguments.
///
/// Built-in rules are dispatched in `builtins::eval_custom_return`; `User`
/// indexes a callback registered with `Checker::register_custom_return`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomReturn {
    /// `Array.map(cb)`: `Array<cb.return>`.
    ArrayMap,
    /// `Array.from(iterable)`: `Array<iterable.getof>`.
    ArrayFrom,
    /// `Promise.all(Array<Promise<T>>)`: `Promise<Array<T>>`.
    PromiseAll,
    /// `Object.assign(a, b)`: members of `a` overwritten by `b`.
    ObjectAssign,
    /// `postMessage(v)`: `v` must be universal.
    PostMessage,
    /// `tuple[i]`: literal indices are range-checked and pick the element.
    TupleGetIndex(TypeId),
    /// `tuple[i] = v`
    TupleSetIndex(TypeId),
    /// `object[k]`: literal keys pick the member.
    ObjectGetIndex(TypeId),
    /// `object[k] = v`
    ObjectSetIndex(TypeId),
    User(u32),
}

/// Callback behind `CustomReturn::User`.
pub type CustomReturnFn =
    Arc<dyn Fn(&mut Checker, &[Value], &Context) -> Result<Option<Value>, TypeError> + Send + Sync>;

/// A function value's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    /// `None` is the generic function: callable with anything.
    overloads: Option<SmallVec<[Signature; 2]>>,
    /// Calls with an implicit receiver produce no value (`arr.push(x)`).
    pub method_like: bool,
    /// Computes the result instead of using the matched overload's `ret`.
    pub custom: Option<CustomReturn>,
}

impl FunctionType {
    pub fn generic() -> Self {
        Self {
            overloads: None,
            method_like: false,
            custom: None,
        }
    }

    pub fn new(overloads: impl IntoIterator<Item = Signature>) -> Self {
        Self {
            overloads: Some(overloads.into_iter().collect()),
            method_like: false,
            custom: None,
        }
    }

    /// Overloads only constrain the parameters; `rule` computes the result.
    pub fn custom(overloads: impl IntoIterator<Item = Signature>, rule: CustomReturn) -> Self {
        Self {
            custom: Some(rule),
            ..Self::new(overloads)
        }
    }

    pub fn method_like(mut self) -> Self {
        self.method_like = true;
        self
    }

    pub fn is_generic(&self) -> bool {
        self.overloads.is_none()
    }

    pub fn overloads(&self) -> &[Signature] {
        self.overloads.as_deref().unwrap_or(&[])
    }

    fn param_lists(&self) -> Vec<TypeIdVec> {
        self.overloads().iter().map(|s| s.params.clone()).collect()
    }
}

impl fmt::Display for CustomReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomReturn::ArrayMap => write!(f, "Array.map"),
            CustomReturn::ArrayFrom => write!(f, "Array.from"),
            CustomReturn::PromiseAll => write!(f, "Promise.all"),
            CustomReturn::ObjectAssign => write!(f, "Object.assign"),
            CustomReturn::PostMessage => write!(f, "postMessage"),
            CustomReturn::TupleGetIndex(_) | CustomReturn::ObjectGetIndex(_) => write!(f, ".getindex"),
            CustomReturn::TupleSetIndex(_) | CustomReturn::ObjectSetIndex(_) => write!(f, ".setindex"),
            CustomReturn::User(i) => write!(f, "user#{}", i),
        }
    }
}

impl Checker {
    /// Arity must match exactly and each parameter must accept its argument.
    /// Errors are attributed to the offending argument.
    pub(crate) fn check_overload(
        &mut self,
        params: &[TypeId],
        args: &[Value],
        ctx: &Context,
    ) -> Result<(), TypeError> {
        if params.len() != args.len() {
            return Err(TypeError::new(
                CheckError::ArgumentCount {
                    expected: params.len(),
                    found: args.len(),
                },
                ctx,
            ));
        }
        for (param, arg) in params.iter().zip(args) {
            let actual = self.arena.value_type(arg);
            self.check(*param, actual, arg.context())?;
        }
        Ok(())
    }

    /// Index of the first parameter list accepting `args`.
    ///
    /// A single candidate reports its own failure; otherwise the error lists
    /// the whole candidate set.
    pub(crate) fn check_any_overload(
        &mut self,
        callee: TypeId,
        candidates: &[TypeIdVec],
        args: &[Value],
        ctx: &Context,
    ) -> Result<usize, TypeError> {
        if let [only] = candidates {
            self.check_overload(only, args, ctx)?;
            return Ok(0);
        }
        for (i, params) in candidates.iter().enumerate() {
            if self.check_overload(params, args, ctx).is_ok() {
                return Ok(i);
            }
        }
        Err(self.no_matching_overload(callee, candidates, args, ctx))
    }

    fn no_matching_overload(
        &mut self,
        callee: TypeId,
        candidates: &[TypeIdVec],
        args: &[Value],
        ctx: &Context,
    ) -> TypeError {
        let arg_types: Vec<TypeId> = args.iter().map(|a| self.arena.value_type(a)).collect();
        let candidates = candidates
            .iter()
            .map(|params| self.arena.display_args(params))
            .collect::<Vec<_>>()
            .join(", ");
        TypeError::new(
            CheckError::NoMatchingOverload {
                callee: self.arena.display(callee),
                arguments: self.arena.display_args(&arg_types),
                candidates,
            },
            ctx,
        )
    }

    /// Every expected overload must be matched by some actual overload.
    /// Parameters and return slots compare in the same direction as `check`;
    /// a void return only matches a void return.
    pub(crate) fn check_all_overloads(
        &mut self,
        expected: &[Signature],
        actual: &[Signature],
        ctx: &Context,
    ) -> Result<(), TypeError> {
        if expected.len() > actual.len() {
            return Err(TypeError::new(
                CheckError::MissingOverloads {
                    expected: expected.len(),
                    found: actual.len(),
                },
                ctx,
            ));
        }
        // A lone candidate reports its own failure.
        let single = actual.len() == 1;

        for (i, want) in expected.iter().enumerate() {
            let mut found = false;
            for have in actual {
                match self.compare_signature(want, have, ctx) {
                    Ok(()) => {
                        found = true;
                        break;
                    }
                    Err(e) if single => return Err(e),
                    Err(_) => {}
                }
            }
            if !found {
                return Err(TypeError::new(CheckError::MissingOverload { index: i }, ctx));
            }
        }
        Ok(())
    }

    fn compare_signature(
        &mut self,
        want: &Signature,
        have: &Signature,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        if want.params.len() != have.params.len() {
            return Err(TypeError::new(
                CheckError::ArgumentCount {
                    expected: want.params.len(),
                    found: have.params.len(),
                },
                ctx,
            ));
        }
        for (w, h) in want.params.iter().zip(&have.params) {
            self.check(*w, *h, ctx)?;
        }
        match (want.ret, have.ret) {
            (None, None) => Ok(()),
            (None, Some(found)) => Err(TypeError::new(
                CheckError::ExpectedVoid {
                    found: self.arena.display(found),
                },
                ctx,
            )),
            (Some(expected), None) => Err(TypeError::new(
                CheckError::UnexpectedVoid {
                    expected: self.arena.display(expected),
                },
                ctx,
            )),
            (Some(w), Some(h)) => self.check(w, h, ctx),
        }
    }

    /// Function-to-function compatibility. `expected_ty` and `actual_ty`
    /// are the interned ids of the two function types, for messages.
    pub(crate) fn check_function(
        &mut self,
        (expected_ty, expected): (TypeId, &FunctionType),
        (actual_ty, actual): (TypeId, &FunctionType),
        ctx: &Context,
    ) -> Result<(), TypeError> {
        // An untyped slot takes any function; a typed slot needs signatures.
        if expected.is_generic() {
            return Ok(());
        }
        if actual.is_generic() {
            return Err(self
                .mismatch(expected_ty, actual_ty, ctx)
                .with_note("function is generic"));
        }
        self.check_all_overloads(expected.overloads(), actual.overloads(), ctx)
    }

    /// Resolve a call of `callee` with `args`.
    ///
    /// `Ok(None)` means the call produces no value. With `prefer_method`
    /// (implicit receiver) void overloads are tried first, otherwise
    /// value-returning ones; after that every overload in declared order.
    #[tracing::instrument(skip(self, callee, args, ctx), fields(callee = %self.arena.display(callee.type_id())))]
    pub fn eval_function(
        &mut self,
        callee: &Value,
        args: &[Value],
        prefer_method: bool,
        ctx: &Context,
    ) -> Result<Option<Value>, TypeError> {
        let callee_ty = callee.type_id();
        let function = match self.arena.get(callee_ty) {
            TypeKind::Any => return Ok(Some(Value::any(ctx))),
            TypeKind::Function(f) => (**f).clone(),
            TypeKind::Class(_) => {
                return Err(TypeError::new(
                    CheckError::NotCallable {
                        type_name: self.arena.display(callee_ty),
                    },
                    ctx,
                )
                .with_note("classes are instantiated with `new`"));
            }
            _ => {
                return Err(TypeError::new(
                    CheckError::NotCallable {
                        type_name: self.arena.display(callee_ty),
                    },
                    ctx,
                ));
            }
        };

        let result = if let Some(rule) = function.custom {
            if !function.is_generic() {
                self.check_any_overload(callee_ty, &function.param_lists(), args, ctx)?;
            }
            tracing::debug!(%rule, "custom return");
            self.eval_custom_return(rule, args, ctx)?
        } else if function.is_generic() {
            if prefer_method {
                None
            } else {
                Some(Value::any(ctx))
            }
        } else {
            let index = self.resolve_overload(callee_ty, &function, args, prefer_method, ctx)?;
            tracing::debug!(index, "selected overload");
            function.overloads()[index]
                .ret
                .map(|ret| self.arena.value(ret, ctx))
        };

        if function.method_like && prefer_method {
            return Ok(None);
        }
        Ok(result)
    }

    fn resolve_overload(
        &mut self,
        callee: TypeId,
        function: &FunctionType,
        args: &[Value],
        prefer_method: bool,
        ctx: &Context,
    ) -> Result<usize, TypeError> {
        let overloads = function.overloads();
        let single = overloads.len() == 1;

        for (i, sig) in overloads.iter().enumerate() {
            if sig.is_void() != prefer_method {
                continue;
            }
            match self.check_overload(&sig.params, args, ctx) {
                Ok(()) => return Ok(i),
                Err(e) if single => return Err(e),
                Err(_) => {}
            }
        }
        for (i, sig) in overloads.iter().enumerate() {
            match self.check_overload(&sig.params, args, ctx) {
                Ok(()) => return Ok(i),
                Err(e) if single => return Err(e),
                Err(_) => {}
            }
        }
        Err(self.no_matching_overload(callee, &function.param_lists(), args, ctx))
    }

    /// `.argN` and `.return` of a function value (first overload that has
    /// the slot).
    pub(crate) fn function_member(
        &mut self,
        function: &FunctionType,
        owner: TypeId,
        key: &str,
        ctx: &Context,
    ) -> Result<Value, TypeError> {
        if function.is_generic() {
            return Ok(Value::any(ctx));
        }
        if key == ".return" {
            let Some(first) = function.overloads().first() else {
                return Err(self.missing_member(owner, key, ctx));
            };
            return match first.ret {
                Some(ret) => Ok(self.arena.value(ret, ctx)),
                None => Err(TypeError::new(
                    CheckError::UnexpectedVoid {
                        expected: "a return value".to_string(),
                    },
                    ctx,
                )),
            };
        }
        if let Some(index) = key.strip_prefix(".arg").and_then(|n| n.parse::<usize>().ok()) {
            if let Some(sig) = function.overloads().iter().find(|s| s.params.len() > index) {
                return Ok(self.arena.value(sig.params[index], ctx));
            }
        }
        Err(self.missing_member(owner, key, ctx))
    }

    /// Plug in a return rule computed by caller code.
    pub fn register_custom_return(&mut self, rule: CustomReturnFn) -> CustomReturn {
        let index = self.custom_returns.len() as u32;
        self.custom_returns.push(rule);
        CustomReturn::User(index)
    }

    pub(crate) fn eval_user_return(
        &mut self,
        index: u32,
        args: &[Value],
        ctx: &Context,
    ) -> Result<Option<Value>, TypeError> {
        let Some(rule) = self.custom_returns.get(index as usize).cloned() else {
            panic!("custom return rule #{} was never registered", index);
        };
        rule(self, args, ctx)
    }
}

//! Lambda calling convention.
//!
//! `call` binds arguments to a lambda's signature and runs its body:
//! spreadable arguments are expanded first, the arity is checked, fixed
//! arguments are type-checked against their parameters, the variadic tail
//! is packed into one typed array, and the produced value is checked
//! against the declared return type.
//!
//! Bytecode bodies are executed through [`BodyRunner`], implemented by the
//! interpreter, so this module never touches the program counter.

use smallvec::SmallVec;
use tern_types::{can_assign, LambdaType, NoTypes, Type, TypeResolver};
use tracing::debug;

use crate::environment::{Ident, LocalScope, Scope, ScopeKind, SymbolFlags};
use crate::errors::{invalid_argument_type, missing_arguments, wrong_return_type};
use crate::value::{LambdaBody, LambdaValue};
use crate::{EvalResult, Value};

/// Arguments after spread expansion; most calls take a handful.
pub type Args = SmallVec<[Value; 4]>;

/// Executes bytecode lambda bodies.
pub trait BodyRunner {
    /// Run the body whose `block-begin` sits at `offset`, inside `scope`.
    ///
    /// Yields the value of a `return`, or `None` when the body falls off
    /// its end.
    fn run_body(&mut self, offset: usize, scope: LocalScope<Scope>) -> EvalResult<Option<Value>>;
}

/// Call `lambda` with `args`.
#[tracing::instrument(level = "debug", skip_all, fields(arity = lambda.signature().arity()))]
pub fn call(lambda: &LambdaValue, args: &[Value], runner: &mut dyn BodyRunner) -> EvalResult {
    let signature = lambda.signature();
    let resolver: &dyn TypeResolver = match lambda.captured() {
        Some(scope) => scope,
        None => &NoTypes,
    };

    let args = expand_spreads(args);
    check_arity(signature, args.len())?;
    let bound = bind_arguments(signature, args, resolver)?;

    let produced = match lambda.body() {
        LambdaBody::Native(f) => Some(f.call(&bound)?),
        LambdaBody::Bytecode { offset } => {
            let parent = match lambda.captured() {
                Some(scope) => scope.clone(),
                None => LocalScope::root(),
            };
            let scope = parent.child(ScopeKind::Lambda);
            let tail = signature.variadic.then(|| signature.arity().saturating_sub(1));
            for (i, (param, value)) in signature.params.iter().zip(bound).enumerate() {
                let ty = if Some(i) == tail {
                    Type::array(param.ty.clone())
                } else {
                    param.ty.clone()
                };
                scope.declare(Ident::Named(param.name), SymbolFlags::empty(), ty, value)?;
            }
            runner.run_body(*offset, scope)?
        }
    };

    let value = produced.unwrap_or(Value::Nil);
    value.adopt_type(&signature.ret);
    let found = value.type_of();
    if can_assign(&signature.ret, &found, resolver).is_err() {
        return Err(wrong_return_type(&signature.ret, &found));
    }
    debug!(%found, "returned");
    Ok(value)
}

/// Replace every spreadable argument by its elements.
fn expand_spreads(args: &[Value]) -> Args {
    let mut expanded = Args::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::Spreadable(inner) => match inner.elements() {
                Some(items) => expanded.extend(items),
                None => expanded.push((**inner).clone()),
            },
            other => expanded.push(other.clone()),
        }
    }
    expanded
}

fn check_arity(signature: &LambdaType, got: usize) -> EvalResult<()> {
    let fixed = signature.fixed_params().len();
    let ok = if signature.variadic {
        got >= fixed
    } else {
        got == fixed
    };
    if ok {
        Ok(())
    } else {
        Err(missing_arguments(fixed, got))
    }
}

/// Type-check fixed arguments and pack the variadic tail.
fn bind_arguments(
    signature: &LambdaType,
    mut args: Args,
    resolver: &dyn TypeResolver,
) -> EvalResult<Args> {
    let fixed = signature.fixed_params();
    let tail: Vec<Value> = if signature.variadic {
        args.drain(fixed.len()..).collect()
    } else {
        Vec::new()
    };

    for (param, value) in fixed.iter().zip(&args) {
        value.adopt_type(&param.ty);
        let found = value.type_of();
        if can_assign(&param.ty, &found, resolver).is_err() {
            return Err(invalid_argument_type(param.name, &param.ty, &found));
        }
    }

    if let Some(param) = signature.variadic_param() {
        let packed = Value::typed_array(param.ty.clone(), Vec::with_capacity(tail.len()));
        if let Value::Array(array) = &packed {
            for value in tail {
                let found = value.type_of();
                array
                    .append(value, resolver)
                    .map_err(|_| invalid_argument_type(param.name, &param.ty, &found))?;
            }
        }
        args.push(packed);
    }
    Ok(args)
}

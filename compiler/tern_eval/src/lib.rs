//! Tern Eval - bytecode interpreter for the Tern runtime.
//!
//! # Architecture
//!
//! - `Value`: closed sum of runtime values with auto-narrowed numerics
//! - `Scope` / `LocalScope`: parent-linked lexical scopes holding typed
//!   symbols and the operand mailbox
//! - `eval_binary` / `eval_unary`: operator evaluation mirroring
//!   `tern_types::check_binary`
//! - `call`: the lambda calling convention (arity, variadic packing,
//!   argument and return type checks)
//! - `Interpreter`: decodes and executes a bytecode program
//! - `Emitter`: assembles bytecode in the layout the interpreter reads
//!
//! Type decisions are delegated to `tern_types`, so a value stored by the
//! interpreter satisfies the same reconciliation the static checker ran.

mod builtins;
mod emit;
mod environment;
pub mod errors;
pub mod interpreter;
mod lambda;
mod operators;
mod value;

pub use builtins::{Builtin, BuiltinRegistry};
pub use emit::{BlockMark, EmitError, Emitter, JumpMark, Operand};
pub use environment::{Ident, LocalScope, Mailbox, Scope, ScopeKind, Symbol, SymbolFlags};
pub use errors::{EvalError, EvalErrorKind, EvalResult, Location};
pub use interpreter::{Interpreter, InterpreterBuilder, InterpreterConfig};
pub use lambda::{call, Args, BodyRunner};
pub use operators::{eval_binary, eval_unary};
pub use value::{
    ArrayValue, ComplexValue, FloatValue, Heap, IntValue, LambdaBody, LambdaValue, NativeFn,
    StructValue, UnionValue, Value,
};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Call once at startup. Respects the `RUST_LOG` environment variable:
/// - `RUST_LOG=tern_eval=debug` - block entry/exit, lambda calls, jumps
/// - `RUST_LOG=tern_eval=trace` - every decoded instruction and binding
/// - `RUST_LOG=tern_types=trace` - reconciliation mismatches
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests;

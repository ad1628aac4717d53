//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use tern_ir::SharedInterner;

use super::Interpreter;
use crate::builtins::BuiltinRegistry;
use crate::EvalResult;

/// Runtime limits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Maximum nesting of lambda calls, or `None` for unlimited.
    pub max_call_depth: Option<usize>,
}

impl Default for InterpreterConfig {
    /// Unlimited on native targets, where `stacker` grows the stack; 200 on
    /// WASM.
    fn default() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self {
                max_call_depth: Some(200),
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self {
                max_call_depth: None,
            }
        }
    }
}

/// Builder for creating Interpreter instances.
///
/// The host supplies the program, and optionally the interner its names
/// were interned with, the builtin registry, and runtime limits.
pub struct InterpreterBuilder {
    code: Vec<u8>,
    interner: Option<SharedInterner>,
    builtins: Option<BuiltinRegistry>,
    config: InterpreterConfig,
}

impl InterpreterBuilder {
    pub fn new(code: Vec<u8>) -> Self {
        Self {
            code,
            interner: None,
            builtins: None,
            config: InterpreterConfig::default(),
        }
    }

    /// Share the host's interner so builtin names and decoded names agree.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    /// Builtins declared in the root scope before execution.
    #[must_use]
    pub fn builtins(mut self, builtins: BuiltinRegistry) -> Self {
        self.builtins = Some(builtins);
        self
    }

    #[must_use]
    pub fn config(mut self, config: InterpreterConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = Some(depth);
        self
    }

    /// Build the interpreter, declaring the builtins in its root scope.
    pub fn build(self) -> EvalResult<Interpreter> {
        Interpreter::with_parts(
            self.code,
            self.builtins.unwrap_or_default(),
            self.interner.unwrap_or_default(),
            self.config,
        )
    }
}

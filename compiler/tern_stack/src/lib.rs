//! Stack growth guard for the recursive parts of the Tern runtime.
//!
//! Type reconciliation recurses through nested type descriptors, and the
//! interpreter recurses once per nested block and once per lambda call. A
//! recursive `factorial(10_000)` or a deeply nested array type would blow the
//! default thread stack, so those entry points run through
//! [`ensure_sufficient_stack`].
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: plain passthrough.

/// Remaining stack below which a new segment is allocated.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_blocks_do_not_overflow() {
        fn enter_block(depth: u32) -> u32 {
            ensure_sufficient_stack(|| if depth == 0 { 0 } else { enter_block(depth - 1) + 1 })
        }

        assert_eq!(enter_block(200_000), 200_000);
    }

    #[test]
    fn passes_results_through() {
        let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("wrong types"));
        assert_eq!(result, Err("wrong types"));
    }
}

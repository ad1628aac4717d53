//! Tern Types - type descriptors and the reconciliation engine.
//!
//! # Architecture
//!
//! - [`Type`]: closed sum of type descriptors mirroring every runtime value
//!   variant, plus `untyped` (not yet fixed) and `reference`/`alias`
//!   (resolved through a [`TypeResolver`])
//! - [`reconcile`]: the single recursive algorithm behind assignability
//!   ([`can_assign`]), equality ([`equal`]) and inference ([`infer`])
//! - [`check_binary`] / [`check_unary`]: static operator typing, mirrored at
//!   runtime by the evaluator's operators
//! - [`decode_type`] / [`encode_type`]: the bytecode representation
//!
//! The static checker and the interpreter both go through this crate, so a
//! program that checks is a program whose runtime assignments succeed.

mod codec;
mod error;
mod format;
mod ops;
mod reconcile;
mod resolver;
mod ty;

pub use codec::{decode_type, encode_type};
pub use error::TypeError;
pub use ops::{check_binary, check_unary, Category};
pub use reconcile::{can_assign, equal, infer, reconcile, Mode};
pub use resolver::{NoTypes, TypeResolver};
pub use ty::{Attribute, Kind, LambdaType, Param, StructType, Subtype, Type};

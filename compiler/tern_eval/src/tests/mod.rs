//! Test modules for the operator and calling-convention implementations.

mod unary_operators_tests;

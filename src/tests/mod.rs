//! # Integration tests that require a look inside the crate.
//!
//! Convention for function names:
//!
//! * `fn problem()`: the variables and their domains
//! * `fn system()`: the problem with its constraints, before presolving
//! * `fn expected_*()`: what the algorithms should compute
pub mod problem_1;

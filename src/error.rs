//! # Error reporting
//!
//! Infeasibility is never an error: it is reported through `Tightening` and `ResultCode` values.
//! The errors below describe requests that can not be honored at all, such as using a constraint
//! handler that was never included or linking a variable that has no finite integer domain.
use thiserror::Error;

use crate::data::problem::VariableId;

/// Errors returned by the fallible operations of this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A constraint handler is used that was not included in the constraint system.
    ///
    /// The contained `str` is the name of the missing handler.
    #[error("constraint handler <{0}> not found")]
    PluginNotFound(&'static str),
    /// A variable id does not belong to the problem.
    #[error("unknown variable {0}")]
    UnknownVariable(VariableId),
    /// A linking constraint was requested for a variable that is not of integer type.
    #[error("variable <{0}> is not integer")]
    NotInteger(String),
    /// A linking constraint was requested for a variable with an infinite bound.
    #[error("variable <{0}> has an unbounded domain")]
    UnboundedDomain(String),
    /// The integer variable already has a linking constraint.
    #[error("variable <{0}> is already linked")]
    AlreadyLinked(String),
    /// The integer variable has no linking constraint.
    #[error("variable <{0}> is not linked")]
    NotLinked(String),
    /// A literal was built over a variable that is not binary.
    #[error("variable <{0}> is not binary")]
    NotBinary(String),
    /// A logic-or constraint without literals was requested.
    #[error("constraint <{0}> has no literals")]
    EmptyConstraint(String),
}

/// Result type of the fallible operations of this crate.
pub type Result<T> = std::result::Result<T, Error>;

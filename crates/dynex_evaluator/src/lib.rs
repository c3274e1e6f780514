//! dynex_evaluator: Executes resolved expression trees.
//!
//! A tree-walking interpreter over [`Value`]s. Host objects are reached
//! through the [`HostObject`] capability; records produced by projections
//! become [`RecordValue`]s. [`order_by`] applies parsed ordering clauses as a
//! stable multi-key sort.

mod evaluator;
mod sort;
mod value;

pub use evaluator::{evaluate, Evaluator};
pub use sort::{compare_keys, order_by};
pub use value::{DynamicObject, FunctionValue, HostObject, RecordValue, Value};

/// A failure while executing a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("Null reference in {0}.")]
    NullReference(String),
    #[error("Type '{type_name}' has no property or field '{member}'.")]
    MissingMember { type_name: String, member: String },
    #[error("Type '{type_name}' has no method '{method}' accepting these arguments.")]
    MissingMethod { type_name: String, method: String },
    #[error("Type '{0}' cannot be indexed.")]
    NotIndexable(String),
    #[error("Index {index} is out of range for length {length}.")]
    IndexOutOfRange { index: i128, length: usize },
    #[error("Argument out of range in {0}.")]
    ArgumentOutOfRange(String),
    #[error("Attempted to divide by zero.")]
    DivideByZero,
    #[error("Sequence contains no elements.")]
    EmptySequence,
    #[error("Expected {expected} arguments but {found} were supplied.")]
    ArgumentCount { expected: usize, found: usize },
    #[error("Expected a value of type '{expected}', found '{found}'.")]
    TypeMismatch { expected: String, found: String },
    #[error("Parameter '{0}' is not bound.")]
    UnboundParameter(String),
}

//! dynex_types: The type model shared by the binder, checker and evaluator.
//!
//! Host types are consumed through the [`TypeDescriptor`] capability; records
//! produced by `new {...}` projections are synthesized at runtime by the
//! [`RecordCache`].

pub mod builtins;
pub mod conversions;
pub mod descriptor;
pub mod record;
pub mod schema;
pub mod types;

pub use builtins::{lookup_type_name, KnownType};
pub use conversions::{
    conversion_cost, find_numeric_promotion, is_explicitly_convertible, is_implicitly_convertible,
};
pub use descriptor::{IndexerSignature, Member, MethodSignature, TypeDescriptor};
pub use record::{DynamicProperty, PropertySignature, RecordCache, RecordType};
pub use schema::SchemaClass;
pub use types::{
    ClassType, DelegateSignature, ParameterDeclaration, PrimitiveType, RecordRef, Type, TypeFlags,
};

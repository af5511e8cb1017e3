//! modeldoc — mapping metadata for plain model types.
//!
//! Model types carry no special base type. What a serializer or validator
//! needs to know about them comes from two places: the declared shape of
//! each field, and `@tag` annotations in the type's and fields'
//! documentation:
//!
//! ```text
//! /// @xmlRoot order
//! /// @xmlEncoding UTF-8
//! struct OrderModel {
//!     /// @name orderId
//!     /// @required
//!     id: u64,
//!     /// @var string[]|null
//!     /// @rule length(1, 20)
//!     tags: Vec<String>,
//! }
//! ```
//!
//! [`ModelClass::build`] reads an [`Introspectable`] instance into a
//! descriptor; [`ModelProperty`] reconciles each field's declared and
//! documented type into a [`TypeDescriptor`] and extracts requiredness and
//! [`RuleSpec`]s. Rules are extracted, never evaluated.

pub mod annotation;
pub mod class;
pub mod error;
pub mod introspect;
pub mod property;
pub mod source;
pub mod types;
pub mod value;

pub use annotation::{AnnotationTable, AnnotationTag};
pub use class::ModelClass;
pub use error::{Error, Result};
pub use introspect::{ClassInfo, FieldInfo, InstanceProvider, Introspectable, Record, Registry};
pub use property::{ModelProperty, RuleSpec};
pub use types::TypeDescriptor;
pub use value::{CoercionError, ScalarKind, Value};

//! Logical schema model
//!
//! Every format loads into and dumps from these types. A [`Schema`] is
//! validated when it is constructed and is not mutated afterwards.

mod schema;
mod typedef;

pub use crate::core_type::{is_builtin, CoreType};
pub use schema::{Meta, Schema, SchemaBuilder, META_ORDER};
pub use typedef::{FieldDef, ItemDef, TypeDef};

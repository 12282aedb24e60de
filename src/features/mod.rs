//! Features Module - payload to model input
//!
//! Alias registry, ordered feature schema, and the resolver that turns a
//! partially specified payload into a complete vector.

pub mod aliases;
pub mod schema;
pub mod resolver;

pub use aliases::AliasRegistry;
pub use schema::{FeatureSchema, SchemaError};
pub use resolver::{InputPayload, ResolveError, VectorResolver};

//! Template policies for stencil call sites.
//!
//! - **concat** - [`StringConcat`] and its specializing twin [`StringConcatOptimized`]
//! - **json** - [`JsonLiteral`], building [`JsonValue`] trees from JSON templates
//!
//! Both work with any call site from `stencil-runtime`, or eagerly through
//! [`TemplatePolicy::apply`](stencil_core::TemplatePolicy::apply).

pub mod concat;
pub mod json;

pub use concat::{ConcatError, Recipe, StringConcat, StringConcatOptimized};
pub use json::{JsonError, JsonLiteral, JsonObject, JsonValue, Skeleton};

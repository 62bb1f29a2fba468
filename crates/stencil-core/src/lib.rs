//! Core types for stencil call sites.
//!
//! This crate holds everything a policy author needs and nothing about
//! caching:
//!
//! - **templated_string** - the parsed template ([`TemplatedString`], [`Segment`])
//! - **value_type** / **native** - static types of parameters and results
//! - **dynamic** / **convert** - runtime values and typed conversions
//! - **signature** - call-site shapes and receiver identity
//! - **executor** - the callables a call site installs
//! - **policy** - the [`TemplatePolicy`] contract
//!
//! The specialization cache itself lives in `stencil-runtime`.

pub mod convert;
pub mod dynamic;
pub mod error;
pub mod executor;
pub mod native;
pub mod policy;
pub mod signature;
pub mod templated_string;
pub mod type_hash;
pub mod value_type;

pub use convert::{FromDynamic, IntoDynamic};
pub use dynamic::{Dynamic, NativeValue, collect_varargs};
pub use error::{ConversionError, PolicyError, TemplateError};
pub use executor::{ExecContext, Executor, ExecutorFlags, ExecutorFn};
pub use native::{Native, NativeType};
pub use policy::{PolicyAny, TemplatePolicy};
pub use signature::{PolicyType, Receiver, SiteSignature};
pub use templated_string::{Parameter, SENTINEL, Segment, Segments, TemplatedString};
pub use type_hash::{TypeHash, hash_constants};
pub use value_type::ValueType;

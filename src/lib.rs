//! Call-site specialization for templated strings.
//!
//! A templated string is text with typed holes. A *policy* decides what the
//! string means: plain concatenation, a JSON value, a grammar, anything. A
//! *call site* binds one template to a signature once, then runs it many
//! times, asking each policy type to specialize at most once and caching
//! the result behind a type guard.
//!
//! ```
//! use stencil::prelude::*;
//!
//! let site = bootstrap(
//!     SiteSignature::new(ValueType::String, [ValueType::String, ValueType::Int]),
//!     None,
//!     "name: \u{FFFC} age: \u{FFFC}",
//! )
//! .unwrap();
//!
//! let text = site.invoke(&StringConcatOptimized, &args!["Bob", 24]).unwrap();
//! assert_eq!(text.as_str(), Some("name: Bob age: 24"));
//! ```
//!
//! # Crates
//!
//! - `stencil-core` - templates, values, the policy contract
//! - `stencil-runtime` - the call-site cache
//! - `stencil-policies` - ready-made policies

pub use stencil_core::{
    ConversionError, Dynamic, ExecContext, Executor, ExecutorFlags, FromDynamic, IntoDynamic,
    Native, NativeType, Parameter, PolicyError, PolicyType, Receiver, SENTINEL, Segment,
    SiteSignature, TemplateError, TemplatePolicy, TemplatedString, TypeHash, ValueType,
};
pub use stencil_policies::{
    ConcatError, JsonError, JsonLiteral, JsonValue, StringConcat, StringConcatOptimized,
};
pub use stencil_runtime::{
    CacheConfig, CallSite, CallSiteError, CallSiteStats, ChainOverflow, MismatchKind,
    SealedCallSite, bootstrap, bootstrap_sealed, bootstrap_sealed_with_config,
    bootstrap_with_config,
};

/// Build an argument array from values implementing [`IntoDynamic`].
///
/// ```
/// use stencil::{Dynamic, args};
///
/// assert_eq!(args!["a", 1], [Dynamic::String("a".into()), Dynamic::Int(1)]);
/// ```
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        [$($crate::IntoDynamic::into_dynamic($value)),*]
    };
}

pub mod prelude {
    pub use crate::args;
    pub use stencil_core::{
        Dynamic, ExecContext, Executor, FromDynamic, IntoDynamic, Native, PolicyError,
        SiteSignature, TemplatePolicy, TemplatedString, ValueType,
    };
    pub use stencil_policies::{JsonLiteral, JsonValue, StringConcat, StringConcatOptimized};
    pub use stencil_runtime::{
        CacheConfig, CallSite, CallSiteError, SealedCallSite, bootstrap, bootstrap_sealed,
    };
}

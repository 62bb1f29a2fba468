//! Call-site specialization cache for templated strings.
//!
//! - **call_site** - bootstrap and invoke ([`CallSite`], [`SealedCallSite`])
//! - **inline_cache** - the guard chain, its transitions and counters
//! - **adapt** - install-time signature checks
//! - **config** - [`CacheConfig`]
//! - **error** - [`CallSiteError`]
//!
//! Policies and templates come from `stencil-core`.

pub mod adapt;
pub mod call_site;
pub mod config;
pub mod error;
mod inline_cache;

pub use call_site::{
    CallSite, SealedCallSite, bootstrap, bootstrap_sealed, bootstrap_sealed_with_config,
    bootstrap_with_config,
};
pub use config::{CacheConfig, ChainOverflow};
pub use error::{CallSiteError, MismatchKind};
pub use inline_cache::CallSiteStats;

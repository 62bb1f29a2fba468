//! Call-site bootstrap and invocation.
//!
//! A call site is created once per syntactic location and then invoked many
//! times. [`bootstrap`] builds an open site, where any policy type may show
//! up and dispatch goes through a guard chain. [`bootstrap_sealed`] builds a
//! site for exactly one policy type, where the target is installed without
//! a guard.
//!
//! ```
//! use stencil_core::{Dynamic, PolicyError, SiteSignature, TemplatePolicy, TemplatedString, ValueType};
//! use stencil_runtime::bootstrap;
//!
//! struct Shout;
//!
//! impl TemplatePolicy for Shout {
//!     fn apply(&self, t: &TemplatedString, args: &[Dynamic]) -> Result<Dynamic, PolicyError> {
//!         let name = args[0].to_string();
//!         Ok(Dynamic::String(format!("{}!", t.template().replace('\u{FFFC}', &name))))
//!     }
//! }
//!
//! let site = bootstrap(
//!     SiteSignature::new(ValueType::String, [ValueType::String]),
//!     None,
//!     "Hello \u{FFFC}",
//! )
//! .unwrap();
//! let result = site.invoke(&Shout, &[Dynamic::String("Bob".into())]).unwrap();
//! assert_eq!(result, Dynamic::String("Hello Bob!".into()));
//! ```
//!
//! A sealed site only accepts its own policy type:
//!
//! ```compile_fail
//! use stencil_core::{Dynamic, PolicyError, SiteSignature, TemplatePolicy, TemplatedString, ValueType};
//! use stencil_runtime::bootstrap_sealed;
//!
//! struct A;
//! struct B;
//!
//! impl TemplatePolicy for A {
//!     fn apply(&self, _: &TemplatedString, _: &[Dynamic]) -> Result<Dynamic, PolicyError> {
//!         Ok(Dynamic::Null)
//!     }
//! }
//!
//! impl TemplatePolicy for B {
//!     fn apply(&self, _: &TemplatedString, _: &[Dynamic]) -> Result<Dynamic, PolicyError> {
//!         Ok(Dynamic::Null)
//!     }
//! }
//!
//! let site = bootstrap_sealed::<A>(SiteSignature::new(ValueType::Any, []), None, "").unwrap();
//! site.invoke(&B, &[]).unwrap();
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use stencil_core::{
    Dynamic, Executor, PolicyType, Receiver, SiteSignature, TemplatePolicy, TemplatedString,
    ValueType,
};
use tracing::debug;

use crate::adapt::{adapt, check_varargs};
use crate::config::CacheConfig;
use crate::error::CallSiteError;
use crate::inline_cache::{CallSiteStats, InlineCache};

/// Bootstrap an open call site with the default configuration.
pub fn bootstrap(
    signature: SiteSignature,
    varargs_type: Option<ValueType>,
    template: impl Into<String>,
) -> Result<CallSite, CallSiteError> {
    bootstrap_with_config(signature, varargs_type, template, CacheConfig::default())
}

/// Bootstrap an open call site.
///
/// The signature's receiver is made open whatever it was. Parsing and
/// varargs checks happen here, so a site that bootstraps successfully never
/// fails them at call time.
pub fn bootstrap_with_config(
    signature: SiteSignature,
    varargs_type: Option<ValueType>,
    template: impl Into<String>,
    config: CacheConfig,
) -> Result<CallSite, CallSiteError> {
    let signature = signature.with_receiver(Receiver::Open);
    let cache = build(signature, varargs_type, template.into(), config)?;
    Ok(CallSite { cache })
}

/// Bootstrap a call site sealed to policy type `P`.
pub fn bootstrap_sealed<P: TemplatePolicy>(
    signature: SiteSignature,
    varargs_type: Option<ValueType>,
    template: impl Into<String>,
) -> Result<SealedCallSite<P>, CallSiteError> {
    bootstrap_sealed_with_config(signature, varargs_type, template, CacheConfig::default())
}

pub fn bootstrap_sealed_with_config<P: TemplatePolicy>(
    signature: SiteSignature,
    varargs_type: Option<ValueType>,
    template: impl Into<String>,
    config: CacheConfig,
) -> Result<SealedCallSite<P>, CallSiteError> {
    let signature = signature.with_receiver(Receiver::Sealed(PolicyType::of::<P>()));
    let cache = build(signature, varargs_type, template.into(), config)?;
    Ok(SealedCallSite {
        cache,
        _policy: PhantomData,
    })
}

#[cfg_attr(feature = "profiling", profiling::function)]
fn build(
    signature: SiteSignature,
    varargs_type: Option<ValueType>,
    template: String,
    config: CacheConfig,
) -> Result<InlineCache, CallSiteError> {
    let templated = Arc::new(TemplatedString::parse(
        template,
        signature.return_type().clone(),
        varargs_type,
        signature.parameters(),
    )?);
    let mismatch = |kind| CallSiteError::SignatureMismatch {
        site: signature.clone(),
        kind,
    };
    check_varargs(&templated, &signature).map_err(mismatch)?;

    let receiver = match signature.receiver() {
        Receiver::Sealed(policy) => policy,
        Receiver::Open => PolicyType::of::<dyn TemplatePolicy>(),
    };
    let generic = Executor::eager(&signature);
    let generic = adapt(&generic, &signature, receiver, false).map_err(mismatch)?;

    let cache = InlineCache::new(templated, signature, generic, config);
    debug!(
        signature = %cache.signature(),
        signature_hash = %cache.signature_hash(),
        template = %cache.templated(),
        max_chain_length = cache.config().max_chain_length(),
        "bootstrapped call site"
    );
    Ok(cache)
}

/// A call site whose receiver may be any policy type.
pub struct CallSite {
    cache: InlineCache,
}

impl CallSite {
    /// Invoke the site with `policy` as receiver.
    ///
    /// The first call with a given policy type specializes; later calls with
    /// that type reuse the installed executor.
    pub fn invoke(
        &self,
        policy: &dyn TemplatePolicy,
        args: &[Dynamic],
    ) -> Result<Dynamic, CallSiteError> {
        self.cache.dispatch(policy, args)
    }

    pub fn templated_string(&self) -> &Arc<TemplatedString> {
        self.cache.templated()
    }

    pub fn signature(&self) -> &SiteSignature {
        self.cache.signature()
    }

    pub fn config(&self) -> &CacheConfig {
        self.cache.config()
    }

    pub fn stats(&self) -> CallSiteStats {
        self.cache.stats()
    }
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSite")
            .field("signature", self.signature())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// A call site whose receiver is always a `P`.
///
/// The type system guarantees no other policy type reaches it, so the
/// specialized target is installed without a guard and the chain never
/// grows.
pub struct SealedCallSite<P> {
    cache: InlineCache,
    _policy: PhantomData<fn(&P)>,
}

impl<P: TemplatePolicy> SealedCallSite<P> {
    pub fn invoke(&self, policy: &P, args: &[Dynamic]) -> Result<Dynamic, CallSiteError> {
        self.cache.dispatch_direct(policy, args)
    }

    pub fn templated_string(&self) -> &Arc<TemplatedString> {
        self.cache.templated()
    }

    pub fn signature(&self) -> &SiteSignature {
        self.cache.signature()
    }

    pub fn config(&self) -> &CacheConfig {
        self.cache.config()
    }

    pub fn stats(&self) -> CallSiteStats {
        self.cache.stats()
    }
}

impl<P> fmt::Debug for SealedCallSite<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedCallSite")
            .field("signature", self.cache.signature())
            .field("stats", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MismatchKind;
    use stencil_core::{PolicyError, TemplateError};

    struct Echo;

    impl TemplatePolicy for Echo {
        fn apply(&self, _: &TemplatedString, args: &[Dynamic]) -> Result<Dynamic, PolicyError> {
            Ok(args.first().cloned().unwrap_or(Dynamic::Null))
        }
    }

    #[test]
    fn bootstrap_reports_template_arity() {
        let err = bootstrap(SiteSignature::new(ValueType::Any, []), None, "x \u{FFFC}").unwrap_err();
        assert!(matches!(
            err,
            CallSiteError::Template(TemplateError::Arity {
                placeholders: 1,
                declared: 0
            })
        ));
    }

    #[test]
    fn bootstrap_rejects_varargs_element() {
        let err = bootstrap(
            SiteSignature::new(ValueType::Any, [ValueType::String]),
            Some(ValueType::Int),
            "\u{FFFC}",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CallSiteError::SignatureMismatch {
                kind: MismatchKind::VarargsElement { index: 0, .. },
                ..
            }
        ));
    }

    #[test]
    fn open_site_forces_open_receiver() {
        let sig = SiteSignature::sealed::<Echo>(ValueType::Any, []);
        let site = bootstrap(sig, None, "").unwrap();
        assert_eq!(site.signature().receiver(), Receiver::Open);
        assert!(!site.stats().sealed);
    }

    #[test]
    fn return_type_is_checked_on_generic_path() {
        let site = bootstrap(
            SiteSignature::new(ValueType::String, [ValueType::Any]),
            None,
            "\u{FFFC}",
        )
        .unwrap();
        assert_eq!(
            site.invoke(&Echo, &[Dynamic::String("ok".into())]).unwrap(),
            Dynamic::String("ok".into())
        );
        let err = site.invoke(&Echo, &[Dynamic::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            CallSiteError::ReturnTypeMismatch { actual: "int", .. }
        ));
    }

    #[test]
    fn generic_path_widens_return() {
        let site = bootstrap(
            SiteSignature::new(ValueType::Float, [ValueType::Int]),
            None,
            "\u{FFFC}",
        )
        .unwrap();
        assert_eq!(site.invoke(&Echo, &[Dynamic::Int(2)]).unwrap(), Dynamic::Float(2.0));
    }

    #[test]
    fn sealed_site_reports_sealed() {
        let site = bootstrap_sealed::<Echo>(SiteSignature::new(ValueType::Any, []), None, "").unwrap();
        site.invoke(&Echo, &[]).unwrap();
        let stats = site.stats();
        assert!(stats.sealed);
        assert_eq!(stats.links, 0);
        assert_eq!(stats.specializations, 1);
    }
}

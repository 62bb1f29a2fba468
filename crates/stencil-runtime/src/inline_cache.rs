//! The polymorphic inline cache behind every call site.
//!
//! # State
//!
//! A cache owns one [`DispatchTable`] behind an [`ArcSwap`]. The table is
//! immutable once published:
//!
//! ```text
//! DispatchTable
//! ├── direct       - unguarded target (sealed receivers only)
//! ├── links        - (policy type, executor) pairs in first-seen order
//! ├── deoptimized  - policy types that are never specialized again
//! └── megamorphic  - set once the chain is full; unseen types go generic
//! ```
//!
//! # Transitions
//!
//! - **miss**: the receiver's type has no link. The policy is asked to
//!   `specialize`, the result is adapted to the site signature, and a new
//!   table with the link appended is published with `rcu`.
//! - **overflow**: the chain already holds `max_chain_length` links. With
//!   [`ChainOverflow::Generic`] the site turns megamorphic; with
//!   [`ChainOverflow::Replace`] the oldest link is dropped.
//! - **deoptimize**: an executor asked to be dropped. Its link is replaced
//!   in place by the generic executor and its policy type is recorded, so a
//!   later miss for that type (after the link was evicted) goes generic
//!   instead of specializing again.
//!
//! # Arguments
//!
//! When the template declares a varargs element type, every call first
//! collects its arguments into a pack of that type. Eager and specialized
//! executors see the same values.
//!
//! # Concurrency
//!
//! Readers load the table without locking and clone the executor they need
//! out of it. Writers publish a whole new table. Two threads missing on the
//! same type may both run `specialize`; the first published link wins and
//! the other result is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arc_swap::ArcSwap;
use stencil_core::{
    Dynamic, ExecContext, Executor, ExecutorFlags, PolicyError, PolicyType, SiteSignature,
    TemplatePolicy, TemplatedString, TypeHash, ValueType, collect_varargs,
};
use tracing::{debug, trace};

use crate::adapt::adapt;
use crate::config::{CacheConfig, ChainOverflow};
use crate::error::CallSiteError;

/// Snapshot of a call site's cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallSiteStats {
    /// Guarded links currently installed.
    pub links: usize,
    /// Times `specialize` was called, including redundant calls under races.
    pub specializations: usize,
    /// Executors dropped after asking to be deoptimized.
    pub deoptimizations: usize,
    /// The chain overflowed and unseen types go to the generic executor.
    pub megamorphic: bool,
    /// The receiver type is fixed and dispatch is unguarded.
    pub sealed: bool,
}

#[derive(Clone)]
struct Link {
    policy: PolicyType,
    executor: Executor,
}

#[derive(Clone, Default)]
struct DispatchTable {
    direct: Option<Executor>,
    links: Vec<Link>,
    deoptimized: Vec<PolicyType>,
    megamorphic: bool,
}

impl DispatchTable {
    fn find(&self, policy: PolicyType) -> Option<&Executor> {
        self.links
            .iter()
            .find(|link| link.policy == policy)
            .map(|link| &link.executor)
    }
}

pub(crate) struct InlineCache {
    templated: Arc<TemplatedString>,
    signature: SiteSignature,
    signature_hash: TypeHash,
    config: CacheConfig,
    generic: Executor,
    table: ArcSwap<DispatchTable>,
    specializations: AtomicUsize,
    deoptimizations: AtomicUsize,
}

impl InlineCache {
    pub(crate) fn new(
        templated: Arc<TemplatedString>,
        signature: SiteSignature,
        generic: Executor,
        config: CacheConfig,
    ) -> Self {
        Self {
            templated,
            signature_hash: signature.type_hash(),
            signature,
            config,
            generic,
            table: ArcSwap::from_pointee(DispatchTable::default()),
            specializations: AtomicUsize::new(0),
            deoptimizations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn templated(&self) -> &Arc<TemplatedString> {
        &self.templated
    }

    pub(crate) fn signature(&self) -> &SiteSignature {
        &self.signature
    }

    pub(crate) fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub(crate) fn signature_hash(&self) -> TypeHash {
        self.signature_hash
    }

    /// Guarded dispatch: walk the chain in first-seen order.
    pub(crate) fn dispatch(
        &self,
        policy: &dyn TemplatePolicy,
        args: &[Dynamic],
    ) -> Result<Dynamic, CallSiteError> {
        let ty = policy.policy_type();
        let hit = self.table.load().find(ty).cloned();
        let executor = match hit {
            Some(executor) => executor,
            None => self.miss(policy, ty)?,
        };
        self.run(&executor, policy, Some(ty), args)
    }

    /// Unguarded dispatch for sealed receivers.
    pub(crate) fn dispatch_direct(
        &self,
        policy: &dyn TemplatePolicy,
        args: &[Dynamic],
    ) -> Result<Dynamic, CallSiteError> {
        let hit = self.table.load().direct.clone();
        let executor = match hit {
            Some(executor) => executor,
            None => self.install_direct(policy)?,
        };
        self.run(&executor, policy, None, args)
    }

    pub(crate) fn stats(&self) -> CallSiteStats {
        let table = self.table.load();
        CallSiteStats {
            links: table.links.len(),
            specializations: self.specializations.load(Ordering::Relaxed),
            deoptimizations: self.deoptimizations.load(Ordering::Relaxed),
            megamorphic: table.megamorphic,
            sealed: self.signature.receiver().is_sealed(),
        }
    }

    fn run(
        &self,
        executor: &Executor,
        policy: &dyn TemplatePolicy,
        guard: Option<PolicyType>,
        args: &[Dynamic],
    ) -> Result<Dynamic, CallSiteError> {
        let packed;
        let args = match self.templated.varargs_type() {
            Some(element) if *element != ValueType::Any => {
                packed = collect_varargs(args, element).map_err(PolicyError::from)?;
                &packed[..]
            }
            _ => args,
        };

        let mut ctx = ExecContext::new(policy, &self.templated, args);
        let result = executor.call(&mut ctx);
        if ctx.deoptimize_requested() {
            self.deoptimize(guard, executor);
        }
        let result = result?;

        if !executor.flags().contains(ExecutorFlags::RETURN_CHECKED) {
            return Ok(result);
        }
        let expected = self.signature.return_type();
        result
            .coerce_to(expected)
            .map_err(|_| CallSiteError::ReturnTypeMismatch {
                expected: expected.clone(),
                actual: result.type_name(),
            })
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn miss(&self, policy: &dyn TemplatePolicy, ty: PolicyType) -> Result<Executor, CallSiteError> {
        {
            let table = self.table.load();
            trace!(policy = %ty, links = table.links.len(), "guard miss");
            if table.megamorphic {
                return Ok(self.generic.clone());
            }
            if table.deoptimized.contains(&ty) {
                trace!(policy = %ty, "policy type was deoptimized, using generic executor");
                return Ok(self.generic.clone());
            }
            if table.links.len() >= self.config.max_chain_length()
                && self.config.overflow() == ChainOverflow::Generic
            {
                self.table.rcu(|current| {
                    let mut next = DispatchTable::clone(current);
                    next.megamorphic = true;
                    next
                });
                debug!(
                    policy = %ty,
                    signature = %self.signature,
                    signature_hash = %self.signature_hash,
                    links = table.links.len(),
                    "call site went megamorphic"
                );
                return Ok(self.generic.clone());
            }
        }

        let executor = self.specialize(policy, ty)?;
        Ok(self.install(ty, executor))
    }

    fn specialize(&self, policy: &dyn TemplatePolicy, ty: PolicyType) -> Result<Executor, CallSiteError> {
        self.specializations.fetch_add(1, Ordering::Relaxed);
        let executor = policy
            .specialize(&self.templated, &self.signature)?
            .ok_or(CallSiteError::PolicyContractViolation {
                policy: ty,
                reason: "specialize returned no executor",
            })?;

        let adapted = adapt(&executor, &self.signature, ty, self.config.exact_shapes()).map_err(
            |kind| CallSiteError::SignatureMismatch {
                site: self.signature.clone(),
                kind,
            },
        )?;
        debug!(
            policy = %ty,
            signature = %self.signature,
            signature_hash = %self.signature_hash,
            flags = ?adapted.flags(),
            "specialized call site"
        );

        if adapted.flags().contains(ExecutorFlags::GENERIC) {
            Ok(adapted)
        } else {
            Ok(adapted.with_flags(ExecutorFlags::SPECIALIZED))
        }
    }

    /// Publish a link for `ty` and return whichever executor ended up
    /// serving it.
    fn install(&self, ty: PolicyType, executor: Executor) -> Executor {
        let max = self.config.max_chain_length();
        let overflow = self.config.overflow();
        self.table.rcu(|current| {
            if current.find(ty).is_some() {
                return Arc::clone(current);
            }
            let mut next = DispatchTable::clone(current);
            if next.links.len() >= max {
                match overflow {
                    ChainOverflow::Replace => {
                        next.links.remove(0);
                    }
                    ChainOverflow::Generic => {
                        next.megamorphic = true;
                        return Arc::new(next);
                    }
                }
            }
            next.links.push(Link {
                policy: ty,
                executor: executor.clone(),
            });
            Arc::new(next)
        });

        let table = self.table.load();
        debug!(
            policy = %ty,
            signature_hash = %self.signature_hash,
            links = table.links.len(),
            "installed link"
        );
        table.find(ty).cloned().unwrap_or_else(|| self.generic.clone())
    }

    fn install_direct(&self, policy: &dyn TemplatePolicy) -> Result<Executor, CallSiteError> {
        let ty = policy.policy_type();
        let executor = self.specialize(policy, ty)?;
        self.table.rcu(|current| {
            if current.direct.is_some() {
                return Arc::clone(current);
            }
            let mut next = DispatchTable::clone(current);
            next.direct = Some(executor.clone());
            Arc::new(next)
        });
        debug!(
            policy = %ty,
            signature_hash = %self.signature_hash,
            "installed unguarded target"
        );
        Ok(self
            .table
            .load()
            .direct
            .clone()
            .unwrap_or_else(|| self.generic.clone()))
    }

    /// Replace `executor` with the generic executor wherever it is installed.
    fn deoptimize(&self, guard: Option<PolicyType>, executor: &Executor) {
        if executor.flags().contains(ExecutorFlags::GENERIC) {
            return;
        }
        let mut replaced = false;
        self.table.rcu(|current| {
            replaced = false;
            let mut next = DispatchTable::clone(current);
            match guard {
                Some(ty) => {
                    if let Some(link) = next
                        .links
                        .iter_mut()
                        .find(|link| link.policy == ty && link.executor.ptr_eq(executor))
                    {
                        link.executor = self.generic.clone();
                        if !next.deoptimized.contains(&ty) {
                            next.deoptimized.push(ty);
                        }
                        replaced = true;
                    }
                }
                None => {
                    if next.direct.as_ref().is_some_and(|direct| direct.ptr_eq(executor)) {
                        next.direct = Some(self.generic.clone());
                        replaced = true;
                    }
                }
            }
            if replaced { Arc::new(next) } else { Arc::clone(current) }
        });
        if replaced {
            self.deoptimizations.fetch_add(1, Ordering::Relaxed);
            debug!(
                policy = ?guard,
                signature = %self.signature,
                signature_hash = %self.signature_hash,
                "deoptimized executor"
            );
        }
    }
}

//! Executors: the callables a call site installs and runs.
//!
//! An [`Executor`] is a shaped, type-erased function. Its shape is a
//! [`SiteSignature`]; the call site checks that shape against its own before
//! installing the executor. At run time the executor receives an
//! [`ExecContext`] holding the receiver policy, the templated string and the
//! arguments.
//!
//! ```
//! use stencil_core::{Dynamic, Executor, SiteSignature, ValueType};
//!
//! let shape = SiteSignature::new(ValueType::Int, [ValueType::Int, ValueType::Int]);
//! let add = Executor::new(shape, |ctx: &mut stencil_core::ExecContext<'_>| {
//!     let a: i64 = ctx.arg(0)?;
//!     let b: i64 = ctx.arg(1)?;
//!     Ok(Dynamic::Int(a + b))
//! });
//! assert_eq!(add.shape().arity(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::convert::FromDynamic;
use crate::error::{ConversionError, PolicyError};
use crate::{Dynamic, Native, SiteSignature, TemplatePolicy, TemplatedString, ValueType};

bitflags! {
    /// How an executor was produced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExecutorFlags: u8 {
        /// Delegates to `TemplatePolicy::apply`.
        const GENERIC = 1 << 0;
        /// Returns the same value on every call.
        const CONSTANT = 1 << 1;
        /// Returned by `TemplatePolicy::specialize`.
        const SPECIALIZED = 1 << 2;
        /// Result is checked against the call-site return type.
        const RETURN_CHECKED = 1 << 3;
    }
}

/// Trait for callables that can back an [`Executor`].
pub trait ExecutorFn: Send + Sync {
    fn call(&self, ctx: &mut ExecContext<'_>) -> Result<Dynamic, PolicyError>;
}

impl<F> ExecutorFn for F
where
    F: Fn(&mut ExecContext<'_>) -> Result<Dynamic, PolicyError> + Send + Sync,
{
    fn call(&self, ctx: &mut ExecContext<'_>) -> Result<Dynamic, PolicyError> {
        (self)(ctx)
    }
}

/// A shaped, shareable callable.
///
/// Cloning shares the underlying function.
#[derive(Clone)]
pub struct Executor {
    shape: SiteSignature,
    flags: ExecutorFlags,
    inner: Arc<dyn ExecutorFn>,
}

impl Executor {
    /// Create an executor from a callable with the given shape.
    pub fn new<F>(shape: SiteSignature, f: F) -> Self
    where
        F: Fn(&mut ExecContext<'_>) -> Result<Dynamic, PolicyError> + Send + Sync + 'static,
    {
        Self {
            shape,
            flags: ExecutorFlags::empty(),
            inner: Arc::new(f),
        }
    }

    /// An executor returning `value` on every call.
    ///
    /// Shared values (arrays, native values) keep their identity: every call
    /// returns the same instance.
    pub fn constant(shape: SiteSignature, value: Dynamic) -> Self {
        let mut executor = Self::new(shape, move |_: &mut ExecContext<'_>| Ok(value.clone()));
        executor.flags = ExecutorFlags::CONSTANT;
        executor
    }

    /// The generic executor: calls [`TemplatePolicy::apply`] with the
    /// arguments it is given.
    ///
    /// Call sites collect the varargs pack before running any executor, so
    /// on a varargs template `ctx.args()` already holds every argument
    /// coerced to the element type. `apply` may return any value, so the
    /// shape's return type is `Any`.
    pub fn eager(signature: &SiteSignature) -> Self {
        let shape = signature.clone().with_return_type(ValueType::Any);
        let mut executor = Self::new(shape, |ctx: &mut ExecContext<'_>| {
            ctx.policy().apply(ctx.templated(), ctx.args())
        });
        executor.flags = ExecutorFlags::GENERIC;
        executor
    }

    pub fn shape(&self) -> &SiteSignature {
        &self.shape
    }

    pub fn flags(&self) -> ExecutorFlags {
        self.flags
    }

    /// Add flags to this executor.
    ///
    /// [`ExecutorFlags::GENERIC`] belongs to [`Executor::eager`] alone and is
    /// ignored here, so a specialized executor can always be deoptimized.
    pub fn with_flags(mut self, flags: ExecutorFlags) -> Self {
        self.flags |= flags - ExecutorFlags::GENERIC;
        self
    }

    /// Same function, different shape.
    ///
    /// Only signature adaptation should call this, after checking that the
    /// function honors `shape`.
    pub fn reshaped(&self, shape: SiteSignature) -> Self {
        Self {
            shape,
            flags: self.flags,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Run the executor.
    pub fn call(&self, ctx: &mut ExecContext<'_>) -> Result<Dynamic, PolicyError> {
        self.inner.call(ctx)
    }

    /// Whether both executors share the same function.
    pub fn ptr_eq(&self, other: &Executor) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("shape", &self.shape)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// What an executor sees when it runs.
pub struct ExecContext<'a> {
    policy: &'a dyn TemplatePolicy,
    templated: &'a TemplatedString,
    args: &'a [Dynamic],
    deoptimize: bool,
}

impl<'a> ExecContext<'a> {
    pub fn new(
        policy: &'a dyn TemplatePolicy,
        templated: &'a TemplatedString,
        args: &'a [Dynamic],
    ) -> Self {
        Self {
            policy,
            templated,
            args,
            deoptimize: false,
        }
    }

    /// The receiver policy.
    pub fn policy(&self) -> &'a dyn TemplatePolicy {
        self.policy
    }

    /// The receiver policy as its concrete type.
    pub fn policy_as<P: TemplatePolicy>(&self) -> Option<&'a P> {
        self.policy.as_any().downcast_ref::<P>()
    }

    pub fn templated(&self) -> &'a TemplatedString {
        self.templated
    }

    pub fn args(&self) -> &'a [Dynamic] {
        self.args
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Raw access to an argument.
    pub fn arg_slot(&self, index: usize) -> Result<&'a Dynamic, ConversionError> {
        self.args
            .get(index)
            .ok_or(ConversionError::ArgumentIndexOutOfBounds {
                index,
                count: self.args.len(),
            })
    }

    /// Typed access to an argument.
    pub fn arg<T: FromDynamic>(&self, index: usize) -> Result<T, ConversionError> {
        T::from_dynamic(self.arg_slot(index)?)
    }

    /// Borrow a host-value argument.
    pub fn arg_native<T: Native>(&self, index: usize) -> Result<&'a T, ConversionError> {
        let slot = self.arg_slot(index)?;
        slot.as_native::<T>().ok_or_else(|| ConversionError::TypeMismatch {
            expected: T::type_name().to_owned(),
            actual: slot.type_name().to_owned(),
        })
    }

    /// Ask the call site to drop this executor after the current call.
    ///
    /// The call still returns this executor's result. Later calls with the
    /// same policy type go through the generic executor.
    pub fn deoptimize(&mut self) {
        self.deoptimize = true;
    }

    pub fn deoptimize_requested(&self) -> bool {
        self.deoptimize
    }
}

impl fmt::Debug for ExecContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecContext")
            .field("policy", &self.policy.policy_type())
            .field("arg_count", &self.args.len())
            .field("deoptimize", &self.deoptimize)
            .finish()
    }
}

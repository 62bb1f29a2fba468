//! Call-site signatures and receiver identity.
//!
//! A [`SiteSignature`] is the statically expected shape of one call site:
//! the receiver (always the policy, argument 0), the parameter types of the
//! template, and the result type. Executors carry a signature too, and the
//! runtime compares the two before installing an executor.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{TypeHash, ValueType};

/// The concrete Rust type of a policy, used as the guard key.
#[derive(Clone, Copy)]
pub struct PolicyType {
    id: TypeId,
    name: &'static str,
}

impl PolicyType {
    pub fn of<P: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<P>(),
            name: std::any::type_name::<P>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for PolicyType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PolicyType {}

impl Hash for PolicyType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolicyType({})", self.name)
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The declared type of argument 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// Any policy type may show up; dispatch is guarded.
    Open,
    /// Exactly one policy type can show up; dispatch needs no guard.
    Sealed(PolicyType),
}

impl Receiver {
    pub fn is_sealed(&self) -> bool {
        matches!(self, Receiver::Sealed(_))
    }

    /// Whether a policy of type `policy` may be passed as this receiver.
    pub fn accepts(&self, policy: &PolicyType) -> bool {
        match self {
            Receiver::Open => true,
            Receiver::Sealed(expected) => expected == policy,
        }
    }
}

/// The shape of a call site or of an executor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteSignature {
    return_type: ValueType,
    receiver: Receiver,
    parameters: Vec<ValueType>,
}

impl SiteSignature {
    /// A signature with an open receiver.
    pub fn new(return_type: ValueType, parameters: impl IntoIterator<Item = ValueType>) -> Self {
        Self {
            return_type,
            receiver: Receiver::Open,
            parameters: parameters.into_iter().collect(),
        }
    }

    /// A signature whose receiver is exactly `P`.
    pub fn sealed<P: 'static>(
        return_type: ValueType,
        parameters: impl IntoIterator<Item = ValueType>,
    ) -> Self {
        Self::new(return_type, parameters).with_receiver(Receiver::Sealed(PolicyType::of::<P>()))
    }

    pub fn with_receiver(mut self, receiver: Receiver) -> Self {
        self.receiver = receiver;
        self
    }

    /// Same parameters and receiver, different result type.
    pub fn with_return_type(mut self, return_type: ValueType) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn return_type(&self) -> &ValueType {
        &self.return_type
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    pub fn parameters(&self) -> &[ValueType] {
        &self.parameters
    }

    /// Number of parameters, receiver excluded.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Deterministic hash of return and parameter types.
    pub fn type_hash(&self) -> TypeHash {
        let params: Vec<TypeHash> = self.parameters.iter().map(ValueType::type_hash).collect();
        TypeHash::from_signature(self.return_type.type_hash(), &params)
    }
}

impl fmt::Display for SiteSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.receiver {
            Receiver::Open => f.write_str("(policy")?,
            Receiver::Sealed(policy) => write!(f, "({}", policy)?,
        }
        for parameter in &self.parameters {
            write!(f, ", {}", parameter)?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

//! Call-site cache configuration.

/// What a call site does when a new policy type shows up and its guard
/// chain is already full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChainOverflow {
    /// Mark the site megamorphic: unseen types go through the generic
    /// executor and nothing is specialized any more.
    #[default]
    Generic,
    /// Drop the oldest link and specialize for the new type.
    Replace,
}

/// Tunables for one call site.
///
/// ```
/// use stencil_runtime::{CacheConfig, ChainOverflow};
///
/// let config = CacheConfig::new()
///     .with_max_chain_length(2)
///     .with_overflow(ChainOverflow::Replace);
/// assert_eq!(config.max_chain_length(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    max_chain_length: usize,
    exact_shapes: bool,
    overflow: ChainOverflow,
}

impl CacheConfig {
    pub const DEFAULT_MAX_CHAIN_LENGTH: usize = 8;

    pub fn new() -> Self {
        Self {
            max_chain_length: Self::DEFAULT_MAX_CHAIN_LENGTH,
            exact_shapes: false,
            overflow: ChainOverflow::Generic,
        }
    }

    /// A single-link cache that re-specializes on every guard miss.
    pub fn monomorphic() -> Self {
        Self::new()
            .with_max_chain_length(1)
            .with_overflow(ChainOverflow::Replace)
    }

    /// Maximum number of guarded links. Values below 1 are raised to 1.
    pub fn with_max_chain_length(mut self, max: usize) -> Self {
        self.max_chain_length = max.max(1);
        self
    }

    /// Require executor shapes to equal the site signature instead of
    /// merely being adaptable to it.
    pub fn with_exact_shapes(mut self, exact: bool) -> Self {
        self.exact_shapes = exact;
        self
    }

    pub fn with_overflow(mut self, overflow: ChainOverflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn max_chain_length(&self) -> usize {
        self.max_chain_length
    }

    pub fn exact_shapes(&self) -> bool {
        self.exact_shapes
    }

    pub fn overflow(&self) -> ChainOverflow {
        self.overflow
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_chain_length(), 8);
        assert!(!config.exact_shapes());
        assert_eq!(config.overflow(), ChainOverflow::Generic);
    }

    #[test]
    fn chain_length_is_at_least_one() {
        assert_eq!(CacheConfig::new().with_max_chain_length(0).max_chain_length(), 1);
    }

    #[test]
    fn monomorphic_replaces() {
        let config = CacheConfig::monomorphic();
        assert_eq!(config.max_chain_length(), 1);
        assert_eq!(config.overflow(), ChainOverflow::Replace);
    }
}

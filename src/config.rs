//! Engine configuration
//!
//! [`EngineConfig`] gathers the pool geometry and the defaults used by the
//! higher-level operations. It loads from JSON and can be overridden from the
//! environment:
//!
//! | Variable | Effect |
//! |---|---|
//! | `COGNITIVE_POOL_CAPACITY` | number of pool blocks |
//! | `COGNITIVE_POOL_BLOCK_SIZE` | bytes per pool block |
//! | `COGNITIVE_FORCE_SCALAR` | disable the vectorized elementwise path |
//!
//! [`Engine`] is the top-level owner: one validated config plus the pool
//! every tensor of that engine is drawn from.
//!
//! ## Example
//!
//! ```rust
//! use cognitive_tensors::config::{Engine, EngineConfig};
//! use cognitive_tensors::memory::PoolConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "pool": { "capacity": 16 }, "default_attention": 0.6 }"#).unwrap();
//! assert_eq!(config.pool.capacity, 16);
//! assert_eq!(config.pool.block_size, PoolConfig::default().block_size);
//!
//! let engine = Engine::new(config).unwrap();
//! let kernel = engine.create_kernel(&[8, 8]).unwrap();
//! assert_eq!(kernel.attention_weight(), 0.6);
//! ```

use crate::cognitive::CognitiveKernel;
use crate::hypergraph::{self, Hypergraph};
use crate::kernels;
use crate::memory::{BlockPool, PoolConfig, PoolStats};
use crate::tensor::Tensor;
use crate::{CognitiveError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Env var that forces the scalar elementwise path
pub const FORCE_SCALAR_ENV: &str = "COGNITIVE_FORCE_SCALAR";

/// Env var overriding [`PoolConfig::capacity`]
pub const POOL_CAPACITY_ENV: &str = "COGNITIVE_POOL_CAPACITY";

/// Env var overriding [`PoolConfig::block_size`]
pub const POOL_BLOCK_SIZE_ENV: &str = "COGNITIVE_POOL_BLOCK_SIZE";

/// Default largest correlation pattern, in cells
pub const DEFAULT_CORRELATE_MAX_PATTERN: usize = 64 * 64;

/// Check whether the vectorized path is disabled via environment variable.
///
/// Set `COGNITIVE_FORCE_SCALAR=1` to run every elementwise kernel on the
/// scalar path. Values `0`, `false`, and the empty string leave it enabled.
pub fn scalar_forced() -> bool {
    std::env::var(FORCE_SCALAR_ENV)
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Configuration for an [`Engine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pool geometry
    pub pool: PoolConfig,

    /// Attention weight given to kernels created by the engine
    pub default_attention: f32,

    /// Largest pattern, in cells, accepted by [`Engine::correlate`]
    pub correlate_max_pattern: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            default_attention: 0.8,
            correlate_max_pattern: DEFAULT_CORRELATE_MAX_PATTERN,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CognitiveError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CognitiveError::Serialization(e.to_string()))
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `COGNITIVE_POOL_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(capacity) = parse_override(&lookup, POOL_CAPACITY_ENV)? {
            self.pool.capacity = capacity;
        }
        if let Some(block_size) = parse_override(&lookup, POOL_BLOCK_SIZE_ENV)? {
            self.pool.block_size = block_size;
        }
        Ok(self)
    }

    /// Builder: set pool geometry
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Builder: set default attention weight
    pub fn with_default_attention(mut self, weight: f32) -> Self {
        self.default_attention = weight;
        self
    }

    /// Builder: set correlation pattern limit
    pub fn with_correlate_max_pattern(mut self, cells: usize) -> Self {
        self.correlate_max_pattern = cells;
        self
    }

    /// Check every field; pool problems are reported as `Config` errors
    pub fn validate(&self) -> Result<()> {
        self.pool.validate()?;
        if !(0.0..=1.0).contains(&self.default_attention) {
            return Err(CognitiveError::Config(format!(
                "default_attention must be in [0, 1], got {}",
                self.default_attention
            )));
        }
        if self.correlate_max_pattern == 0 {
            return Err(CognitiveError::Config("correlate_max_pattern must be positive".into()));
        }
        Ok(())
    }
}

fn parse_override(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<usize>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CognitiveError::Config(format!("{} must be a non-negative integer, got {:?}", key, raw))),
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Validated configuration plus the pool it describes
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    pool: BlockPool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let pool = BlockPool::new(config.pool)?;
        info!(
            capacity = config.pool.capacity,
            block_size = config.pool.block_size,
            scalar_forced = scalar_forced(),
            "Cognitive engine ready"
        );
        Ok(Self { config, pool })
    }

    /// Engine from defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env()?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pool(&self) -> &BlockPool {
        &self.pool
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Kernel with the configured default attention weight
    pub fn create_kernel(&self, shape: &[usize]) -> Result<CognitiveKernel> {
        CognitiveKernel::create(&self.pool, shape, self.config.default_attention)
    }

    /// Correlation bounded by `correlate_max_pattern`
    pub fn correlate(&self, pattern: &Tensor, data: &Tensor) -> Result<Tensor> {
        kernels::correlate_bounded(&self.pool, pattern, data, self.config.correlate_max_pattern)
    }

    pub fn encode(&self, hg: &Hypergraph) -> Result<Tensor> {
        hypergraph::encode(&self.pool, hg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pool.capacity, 1024);
        assert_eq!(config.pool.block_size, 16384);
        assert_eq!(config.pool.alignment, 32);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EngineConfig::default()
            .with_pool(PoolConfig::default().with_capacity(4))
            .with_default_attention(0.25)
            .with_correlate_max_pattern(9);
        let json = config.to_json().unwrap();
        let parsed = EngineConfig::from_json(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_json_partial_and_invalid() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());

        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(CognitiveError::Serialization(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::default()
            .with_overrides_from(lookup(&[(POOL_CAPACITY_ENV, "32"), (POOL_BLOCK_SIZE_ENV, " 4096 ")]))
            .unwrap();
        assert_eq!(config.pool.capacity, 32);
        assert_eq!(config.pool.block_size, 4096);

        let untouched = EngineConfig::default().with_overrides_from(lookup(&[])).unwrap();
        assert_eq!(untouched, EngineConfig::default());
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let result = EngineConfig::default().with_overrides_from(lookup(&[(POOL_CAPACITY_ENV, "lots")]));
        assert!(matches!(result, Err(CognitiveError::Config(_))));
    }

    #[test]
    fn test_validate_rejects() {
        let bad_attention = EngineConfig::default().with_default_attention(1.5);
        assert!(matches!(bad_attention.validate(), Err(CognitiveError::Config(_))));

        let bad_pattern = EngineConfig::default().with_correlate_max_pattern(0);
        assert!(bad_pattern.validate().is_err());

        let bad_pool = EngineConfig::default().with_pool(PoolConfig::default().with_alignment(48));
        assert!(bad_pool.validate().is_err());
        assert!(Engine::new(bad_pool).is_err());
    }

    #[test]
    fn test_engine_operations() {
        let engine = Engine::new(
            EngineConfig::default()
                .with_pool(PoolConfig::default().with_capacity(8))
                .with_correlate_max_pattern(4),
        )
        .unwrap();

        let kernel = engine.create_kernel(&[4, 4]).unwrap();
        assert_eq!(kernel.attention_weight(), 0.8);
        assert_eq!(engine.stats().allocated, 1);

        let data = Tensor::full(engine.pool(), &[4, 4], 1.0).unwrap();
        let small = Tensor::full(engine.pool(), &[2, 2], 1.0).unwrap();
        let large = Tensor::full(engine.pool(), &[3, 3], 1.0).unwrap();
        assert!(engine.correlate(&small, &data).is_ok());
        assert!(engine.correlate(&large, &data).is_err());

        let mut hg = Hypergraph::new(2, 0);
        hg.connect(0, 1).unwrap();
        let encoded = engine.encode(&hg).unwrap();
        assert_eq!(encoded.dims(), [2, 2, 1, 1]);

        drop(kernel);
        assert!(engine.stats().is_consistent());
    }
}

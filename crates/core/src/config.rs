//! Board configuration

use crate::special::ComboShape;
use crate::types::CHAIN_DEBOUNCE_MS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Seed for refills, random layout cells and rocket directions.
    pub seed: u32,
    /// Quiet period after the last activation before a cascade ends.
    pub chain_debounce_ms: u32,
    pub combo_shape: ComboShape,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            chain_debounce_ms: CHAIN_DEBOUNCE_MS,
            combo_shape: ComboShape::Cross,
        }
    }
}

impl BoardConfig {
    /// Read `BLAST_SEED`, `BLAST_CHAIN_DEBOUNCE_MS` and `BLAST_COMBO_SHAPE`,
    /// falling back to defaults for anything missing or unparsable.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let seed = env::var("BLAST_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.seed);

        let chain_debounce_ms = env::var("BLAST_CHAIN_DEBOUNCE_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.chain_debounce_ms);

        let combo_shape = env::var("BLAST_COMBO_SHAPE")
            .ok()
            .and_then(|s| ComboShape::from_str(&s))
            .unwrap_or(defaults.combo_shape);

        Self {
            seed,
            chain_debounce_ms,
            combo_shape,
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_chain_debounce_ms(mut self, ms: u32) -> Self {
        self.chain_debounce_ms = ms;
        self
    }

    pub fn with_combo_shape(mut self, shape: ComboShape) -> Self {
        self.combo_shape = shape;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.chain_debounce_ms, 400);
        assert_eq!(config.combo_shape, ComboShape::Cross);
    }

    #[test]
    fn test_builders() {
        let config = BoardConfig::default()
            .with_seed(9)
            .with_chain_debounce_ms(0)
            .with_combo_shape(ComboShape::Wide);
        assert_eq!(config.seed, 9);
        assert_eq!(config.chain_debounce_ms, 0);
        assert_eq!(config.combo_shape, ComboShape::Wide);
    }
}

//! Configuration types for a packing run: the box, its catalog and the solver settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Item, SolverConfig, SolverConfigError, StackingDirection};

/// Top-level packing configuration, as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingConfig {
    /// Box dimensions and stacking rule.
    pub game_box: BoxSpec,
    /// Items to fit and how many of each.
    pub items: Vec<ItemSpec>,
    /// Genetic solver settings.
    #[serde(default)]
    pub solver: SolverConfig,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            game_box: BoxSpec::default(),
            items: vec![
                ItemSpec {
                    item: Item::new(88, 63, 1),
                    count: 100,
                },
                ItemSpec {
                    item: Item::new(100, 100, 1),
                    count: 100,
                },
            ],
            solver: SolverConfig::default(),
        }
    }
}

/// Box dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxSpec {
    /// Extent along y.
    pub length: i64,
    /// Extent along x.
    pub width: i64,
    /// Extent along z, split into layers.
    pub height: i64,
    /// How each item class is stacked into its required footprint.
    #[serde(default)]
    pub stacking: StackingDirection,
}

impl Default for BoxSpec {
    fn default() -> Self {
        Self {
            length: 300,
            width: 300,
            height: 120,
            stacking: StackingDirection::default(),
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpec {
    #[serde(flatten)]
    pub item: Item,
    /// Number of copies that must fit.
    pub count: u32,
}

impl BoxSpec {
    /// Box volume, `None` if it does not fit in an `i64`.
    pub fn volume(&self) -> Option<i64> {
        self.length
            .checked_mul(self.width)
            .and_then(|area| area.checked_mul(self.height))
    }
}

impl PackingConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PackingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.game_box;
        if b.length <= 0 || b.width <= 0 || b.height <= 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if b.volume().is_none() {
            return Err(ConfigError::BoxTooLarge);
        }
        if self.items.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for (index, spec) in self.items.iter().enumerate() {
            if spec.count == 0 {
                return Err(ConfigError::ZeroItemCount { index });
            }
            let item = &spec.item;
            if item.length <= 0 || item.width <= 0 || item.height <= 0 {
                return Err(ConfigError::InvalidItemDimensions { index });
            }
        }
        self.solver.validate()?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Box dimensions (length, width, height) must be positive")]
    InvalidDimensions,
    #[error("Box volume does not fit in a 64-bit integer")]
    BoxTooLarge,
    #[error("Item catalog is empty")]
    EmptyCatalog,
    #[error("Item {index} has a count of zero")]
    ZeroItemCount { index: usize },
    #[error("Item {index} dimensions must be positive")]
    InvalidItemDimensions { index: usize },
    #[error("Unknown orientation flag: {0}")]
    UnknownOrientation(String),
    #[error("Unknown plane: {0}")]
    UnknownPlane(String),
    #[error("Unknown stacking direction: {0}")]
    UnknownStackingDirection(String),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Solver config validation failed: {0}")]
    Solver(#[from] SolverConfigError),
}

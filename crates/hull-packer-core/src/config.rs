use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Candidate scan patterns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackingStyle {
    /// Diagonals from the origin corner outward (half-square ramp); pages grow in both axes.
    Ramp,
    /// Flip-flop grid scan; pages grow rows first, then columns.
    #[default]
    Default,
    /// Square shells around the origin corner; pages grow in both axes.
    Square,
}

impl FromStr for PackingStyle {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ramp" => Ok(Self::Ramp),
            "default" | "flipflop" | "flip_flop" => Ok(Self::Default),
            "square" => Ok(Self::Square),
            _ => Err(()),
        }
    }
}

/// Packing tightness. Maps onto the grid step as `block_offset << (level + 2)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackingQuality {
    /// Very tight packing (4 px per block offset unit).
    High,
    #[default]
    Default,
    /// Fast packing (16 px per block offset unit).
    Fast,
}

impl PackingQuality {
    /// Multiplier applied to `block_offset`.
    pub fn granularity_factor(self) -> u32 {
        let level = match self {
            Self::High => 0,
            Self::Default => 1,
            Self::Fast => 2,
        };
        1 << (level + 2)
    }
}

impl FromStr for PackingQuality {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "default" => Ok(Self::Default),
            "fast" => Ok(Self::Fast),
            _ => Err(()),
        }
    }
}

/// Packing configuration.
/// Key notes:
///   - `style` selects the order in which anchor cells are tried; ties are broken purely by that order
///   - `quality` and `block_offset` together give the grid step (`granularity`)
///   - `parallel` and `shard_count` only change how the search is executed, never its result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackingConfig {
    /// Padding between sprites in pixels. Hulls are extruded radially by a quarter of this.
    pub padding: u32,
    /// Maximum page width and height in pixels.
    pub max_texture_size: u32,
    /// Base grid step for candidate anchors, scaled by `quality`.
    pub block_offset: u32,
    #[serde(default)]
    pub quality: PackingQuality,
    #[serde(default)]
    pub style: PackingStyle,
    /// Accepted for compatibility; placement never rotates shapes.
    #[serde(default)]
    pub enable_rotation: bool,

    /// Seed for the per-sprite hull contexts.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Starting side length of a freshly opened page (clamped to `max_texture_size`).
    #[serde(default = "default_initial_page_size")]
    pub initial_page_size: u32,
    /// Run hull batches and search shards on the rayon pool when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Number of search shards. None => one per worker thread.
    #[serde(default)]
    pub shard_count: Option<usize>,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            padding: 4,
            max_texture_size: 2048,
            block_offset: 1,
            quality: PackingQuality::Default,
            style: PackingStyle::Default,
            enable_rotation: false,
            seed: default_seed(),
            initial_page_size: default_initial_page_size(),
            parallel: default_parallel(),
            shard_count: None,
        }
    }
}

impl PackingConfig {
    /// Grid step between candidate anchors in pixels.
    pub fn granularity(&self) -> u32 {
        self.block_offset
            .saturating_mul(self.quality.granularity_factor())
    }

    /// Radial extrusion applied to every hull vertex.
    pub fn hull_padding(&self) -> f32 {
        self.padding as f32 * 0.25
    }

    /// Side length of a newly opened page.
    pub fn start_page_size(&self) -> u32 {
        self.initial_page_size.min(self.max_texture_size)
    }

    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - The max texture size or initial page size is zero
    /// - The block offset is zero or the resulting grid step exceeds the max texture size
    /// - An explicit shard count of zero is requested
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::HullPackerError;

        if self.max_texture_size == 0 {
            return Err(HullPackerError::InvalidDimensions {
                width: self.max_texture_size,
                height: self.max_texture_size,
            });
        }
        if self.initial_page_size == 0 {
            return Err(HullPackerError::InvalidConfig(
                "initial_page_size must be greater than zero".into(),
            ));
        }
        if self.block_offset == 0 {
            return Err(HullPackerError::InvalidConfig(
                "block_offset must be greater than zero".into(),
            ));
        }
        let step = self.granularity();
        if step > self.max_texture_size {
            return Err(HullPackerError::InvalidConfig(format!(
                "block_offset ({}) at {:?} quality gives a {}px grid step, larger than max_texture_size ({})",
                self.block_offset, self.quality, step, self.max_texture_size
            )));
        }
        if self.shard_count == Some(0) {
            return Err(HullPackerError::InvalidConfig(
                "shard_count must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_seed() -> u64 {
    0x6E62_4EB7
}
fn default_initial_page_size() -> u32 {
    64
}
fn default_parallel() -> bool {
    true
}

/// Builder for `PackingConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackingConfigBuilder {
    cfg: PackingConfig,
}

impl PackingConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackingConfig::default(),
        }
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn max_texture_size(mut self, v: u32) -> Self {
        self.cfg.max_texture_size = v;
        self
    }
    pub fn block_offset(mut self, v: u32) -> Self {
        self.cfg.block_offset = v;
        self
    }
    pub fn quality(mut self, v: PackingQuality) -> Self {
        self.cfg.quality = v;
        self
    }
    pub fn style(mut self, v: PackingStyle) -> Self {
        self.cfg.style = v;
        self
    }
    pub fn enable_rotation(mut self, v: bool) -> Self {
        self.cfg.enable_rotation = v;
        self
    }
    pub fn seed(mut self, v: u64) -> Self {
        self.cfg.seed = v;
        self
    }
    pub fn initial_page_size(mut self, v: u32) -> Self {
        self.cfg.initial_page_size = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn shard_count(mut self, v: Option<usize>) -> Self {
        self.cfg.shard_count = v;
        self
    }
    pub fn build(self) -> PackingConfig {
        self.cfg
    }
}

impl PackingConfig {
    /// Create a fluent builder for `PackingConfig`.
    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder::new()
    }
}

//! Tunable parameters for outline extraction and rasterization
//!
//! Nothing here has a single correct value: sample counts, curve tolerance
//! and rounding trade quality against speed. Both structs start from
//! sensible defaults, can be adjusted with `with_*` builders, and can pick up
//! overrides from the environment:
//!
//! ```bash
//! TTRAST_OVERSAMPLE=8 TTRAST_FLATNESS=0.03 ./my_app
//! ```
//!
//! | variable | field |
//! |---|---|
//! | `TTRAST_OVERSAMPLE` | [`RasterConfig::oversample`] |
//! | `TTRAST_FLATNESS` | [`RasterConfig::flatness`] |
//! | `TTRAST_ROUNDING` | [`RasterConfig::rounding`] (`half-even`, `half-up`) |
//! | `TTRAST_GAMMA` | [`RasterConfig::gamma`] |
//! | `TTRAST_MAX_COMPOSITE_DEPTH` | [`OutlineConfig::max_composite_depth`] |

use std::str::FromStr;

use crate::error::{Result, TtError};
use crate::host::HostMath;

/// How font coordinates snap onto the 1/64 pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingMode {
    /// Ties go to the even neighbour; adjacent glyphs meet without seams
    #[default]
    HalfEven,
    /// Ties round towards positive infinity
    HalfUp,
}

impl RoundingMode {
    pub fn apply(self, math: &dyn HostMath, x: f32) -> f32 {
        match self {
            RoundingMode::HalfEven => math.round_half_even(x),
            RoundingMode::HalfUp => math.floor(x + 0.5),
        }
    }
}

impl FromStr for RoundingMode {
    type Err = TtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "half-even" | "even" | "bankers" => Ok(RoundingMode::HalfEven),
            "half-up" | "up" => Ok(RoundingMode::HalfUp),
            other => Err(TtError::config(format!("unknown rounding mode '{}'", other))),
        }
    }
}

/// Scan conversion parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterConfig {
    /// Sub-scanlines per pixel row (1..=16)
    pub oversample: u8,
    /// Maximum distance, in pixels, between a curve and its line approximation
    pub flatness: f32,
    /// Snapping of scaled coordinates onto the fixed-point grid
    pub rounding: RoundingMode,
    /// Coverage is raised to `1 / gamma`; 1.0 leaves it linear
    pub gamma: f32,
    /// Largest accepted bitmap width or height
    pub max_bitmap_dim: u32,
}

impl RasterConfig {
    pub const MAX_OVERSAMPLE: u8 = 16;

    pub fn with_oversample(mut self, oversample: u8) -> Self {
        self.oversample = oversample;
        self
    }

    pub fn with_flatness(mut self, flatness: f32) -> Self {
        self.flatness = flatness;
        self
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_max_bitmap_dim(mut self, max: u32) -> Self {
        self.max_bitmap_dim = max;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.oversample == 0 || self.oversample > Self::MAX_OVERSAMPLE {
            return Err(TtError::config(format!(
                "oversample must be within 1..={}, got {}",
                Self::MAX_OVERSAMPLE,
                self.oversample
            )));
        }
        // Below 1/64 px the fixed-point grid cannot honour the tolerance
        if !(self.flatness.is_finite() && self.flatness >= 1.0 / 64.0) {
            return Err(TtError::config(format!(
                "flatness must be at least 1/64 pixel, got {}",
                self.flatness
            )));
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(TtError::config(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        if self.max_bitmap_dim == 0 {
            return Err(TtError::config("max_bitmap_dim must be non-zero"));
        }
        Ok(())
    }

    /// Defaults overridden by `TTRAST_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, "TTRAST_OVERSAMPLE")? {
            config.oversample = v;
        }
        if let Some(v) = parse_var(&lookup, "TTRAST_FLATNESS")? {
            config.flatness = v;
        }
        if let Some(v) = parse_var(&lookup, "TTRAST_ROUNDING")? {
            config.rounding = v;
        }
        if let Some(v) = parse_var(&lookup, "TTRAST_GAMMA")? {
            config.gamma = v;
        }
        config.validate()?;
        Ok(config)
    }
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            oversample: 4,
            flatness: 1.0 / 16.0,
            rounding: RoundingMode::HalfEven,
            gamma: 1.0,
            // Guard against memory bombs from giant sizes or broken fonts
            max_bitmap_dim: 4096,
        }
    }
}

/// Outline extraction limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineConfig {
    /// Deepest allowed composite nesting; the outermost glyph is depth 0
    pub max_composite_depth: u32,
    /// Components resolved per glyph across all nesting levels
    pub max_components: u32,
}

impl OutlineConfig {
    pub fn with_max_composite_depth(mut self, depth: u32) -> Self {
        self.max_composite_depth = depth;
        self
    }

    pub fn with_max_components(mut self, components: u32) -> Self {
        self.max_components = components;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, "TTRAST_MAX_COMPOSITE_DEPTH")? {
            config.max_composite_depth = v;
        }
        Ok(config)
    }
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            max_composite_depth: 8,
            max_components: 1024,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .map_err(|e| TtError::config(format!("{}={:?}: {}", key, raw, e)))?;
            log::info!("ttrast: {} overridden from environment", key);
            Ok(Some(value))
        },
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::{
    algorithms::{fh04::SegmentFh04, mean_shift::SegmentMeanShift},
    error::{Result, SegmentationError},
    pixel::BandPixel,
    traits::ImageSegmenter,
    types::ConnectRule,
};

/// Felzenszwalb-Huttenlocher parameters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ConfigFh04 {
    /// Scale parameter; larger values favor larger regions
    #[schemars(range(min = 0.0))]
    pub k: f32,
    /// Regions smaller than this are merged into a neighbor
    pub min_size: usize,
    pub connect_rule: ConnectRule,
}

impl Default for ConfigFh04 {
    fn default() -> Self {
        Self {
            k: 300.0,
            min_size: 20,
            connect_rule: ConnectRule::Eight,
        }
    }
}

impl ConfigFh04 {
    pub fn validate(&self) -> Result<()> {
        if !(self.k.is_finite() && self.k > 0.0) {
            return Err(SegmentationError::invalid("k", format!("must be finite and > 0, got {}", self.k)));
        }
        Ok(())
    }
}

/// Mean-shift parameters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ConfigMeanShift {
    /// Half-width of the spatial window in pixels
    #[schemars(range(min = 1))]
    pub spatial_radius: usize,
    /// Euclidean color radius of the uniform color kernel
    pub color_radius: f32,
    /// Regions smaller than this are merged into a neighbor; below 2 disables pruning
    pub min_region_size: usize,
    /// Reuse modes along search paths instead of searching from every pixel
    pub fast: bool,
    pub max_iterations: usize,
    pub convergence_tol: f32,
    /// Adjacency used for splitting, merging and pruning regions
    pub connect_rule: ConnectRule,
}

impl Default for ConfigMeanShift {
    fn default() -> Self {
        Self {
            spatial_radius: 6,
            color_radius: 15.0,
            min_region_size: 30,
            fast: true,
            max_iterations: 20,
            convergence_tol: 0.1,
            connect_rule: ConnectRule::Four,
        }
    }
}

impl ConfigMeanShift {
    pub fn validate(&self) -> Result<()> {
        if self.spatial_radius == 0 {
            return Err(SegmentationError::invalid("spatial_radius", "must be at least 1"));
        }
        if !(self.color_radius.is_finite() && self.color_radius > 0.0) {
            return Err(SegmentationError::invalid(
                "color_radius",
                format!("must be finite and > 0, got {}", self.color_radius),
            ));
        }
        if self.max_iterations == 0 {
            return Err(SegmentationError::invalid("max_iterations", "must be at least 1"));
        }
        if !(self.convergence_tol.is_finite() && self.convergence_tol >= 0.0) {
            return Err(SegmentationError::invalid(
                "convergence_tol",
                format!("must be finite and >= 0, got {}", self.convergence_tol),
            ));
        }
        Ok(())
    }
}

/// Segmentation algorithm selection with its parameters.
#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params")]
#[strum(serialize_all = "snake_case")]
pub enum SegmentationAlgorithm {
    /// Felzenszwalb-Huttenlocher graph-based segmentation
    #[serde(rename = "fh04")]
    Fh04(ConfigFh04),

    /// Mean-shift mode seeking with region merging and pruning
    #[serde(rename = "mean_shift")]
    MeanShift(ConfigMeanShift),
}

impl Default for SegmentationAlgorithm {
    fn default() -> Self {
        Self::Fh04(ConfigFh04::default())
    }
}

impl SegmentationAlgorithm {
    /// Get the JSON schema for all algorithms
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SegmentationAlgorithm)
    }

    /// Get a list of all available algorithm names
    pub fn algorithm_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Fh04(_) => "Graph-based segmentation merging regions along weight-sorted pixel edges",
            Self::MeanShift(_) => "Per-pixel mean-shift mode seeking followed by region merging and pruning",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Fh04(config) => config.validate(),
            Self::MeanShift(config) => config.validate(),
        }
    }

    /// Instantiate the configured segmenter for pixel type `P`.
    pub fn build<P: BandPixel>(&self) -> Result<Box<dyn ImageSegmenter<P>>> {
        let segmenter: Box<dyn ImageSegmenter<P>> = match self {
            Self::Fh04(config) => Box::new(SegmentFh04::from_config(config)?),
            Self::MeanShift(config) => Box::new(SegmentMeanShift::from_config(config)?),
        };
        Ok(segmenter)
    }
}

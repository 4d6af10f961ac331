use serde::{Deserialize, Serialize};
use crate::{error::Result, types::SegmentedImage};

/// Serializable description of a segmentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentationSummary {
    pub image_width: u32,
    pub image_height: u32,
    pub region_count: usize,
    pub regions: Vec<RegionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionSummary {
    pub id: u32,
    /// Pixel count
    pub size: usize,
    /// Mean value of each band
    pub mean: Vec<f32>,
}

impl SegmentedImage {
    pub fn summary(&self) -> SegmentationSummary {
        let regions = self
            .segmentation
            .region_sizes
            .iter()
            .zip(self.region_colors.iter())
            .enumerate()
            .map(|(id, (&size, mean))| RegionSummary {
                id: id as u32,
                size,
                mean: mean.to_vec(),
            })
            .collect();

        SegmentationSummary {
            image_width: self.segmentation.width(),
            image_height: self.segmentation.height(),
            region_count: self.segmentation.num_regions(),
            regions,
        }
    }

    /// Export the summary as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }

    /// Save the JSON summary to file
    pub fn save_json(&self, path: &str) -> Result<()> {
        let json = self.to_json_string()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl SegmentationSummary {
    /// Load a summary from a JSON file
    pub fn from_json_file(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_string(&json)
    }

    pub fn from_json_string(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

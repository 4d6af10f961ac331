use imageproc::definitions::{Clamp, Image};
use segmentation::{BandPixel, Pipeline, SegmentationAlgorithm, SegmentationError, SegmentedImage};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ImageError(#[from] image::ImageError),
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
    #[error("Input path has no file name: {0}")]
    MissingFileName(String),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One segmentation job: an input image, where to write results and how to segment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SegmentJob {
    pub input: String,
    pub output_dir: String,
    /// Segment the luma channel instead of RGB
    #[serde(default)]
    pub grayscale: bool,
    /// Gaussian smoothing applied before segmenting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur_sigma: Option<f32>,
    /// Also write an image with one arbitrary color per region
    #[serde(default)]
    pub write_labels: bool,
    #[serde(default)]
    pub algorithm: SegmentationAlgorithm,
}

/// Files written by [`SegmentJob::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutput {
    pub region_count: usize,
    pub mean_colors: PathBuf,
    pub labels: Option<PathBuf>,
    pub summary: PathBuf,
}

impl SegmentJob {
    /// Load a job from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a job from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, JobError> {
        let job: SegmentJob = toml::from_str(content)?;
        job.algorithm.validate()?;
        Ok(job)
    }

    /// Load a job from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a job from a JSON string
    pub fn from_json(content: &str) -> Result<Self, JobError> {
        let job: SegmentJob = serde_json::from_str(content)?;
        job.algorithm.validate()?;
        Ok(job)
    }

    /// Auto-detect file format and load the job
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(JobError::UnsupportedFileFormat),
        }
    }

    /// Convert the job to a TOML string
    pub fn to_toml(&self) -> Result<String, JobError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert the job to a JSON string
    pub fn to_json(&self) -> Result<String, JobError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Segment the input image and write the results into `output_dir`
    pub fn run(&self) -> Result<JobOutput, JobError> {
        let stem = Path::new(&self.input)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| JobError::MissingFileName(self.input.clone()))?
            .to_string();

        info!(input = %self.input, algorithm = %self.algorithm, "running segmentation job");
        let image = image::open(&self.input)?;
        let result = if self.grayscale {
            self.segment(&image.to_luma8())?
        } else {
            self.segment(&image.to_rgb8())?
        };

        fs::create_dir_all(&self.output_dir)?;
        let out_dir = Path::new(&self.output_dir);

        let mean_colors = out_dir.join(format!("{stem}_{}.png", self.algorithm));
        result.render_mean_colors()?.save(&mean_colors)?;

        let labels = if self.write_labels {
            let path = out_dir.join(format!("{stem}_{}_labels.png", self.algorithm));
            segmentation::render_label_colors(&result.segmentation).save(&path)?;
            Some(path)
        } else {
            None
        };

        let summary = out_dir.join(format!("{stem}_{}.json", self.algorithm));
        fs::write(&summary, result.to_json_string()?)?;

        Ok(JobOutput {
            region_count: result.segmentation.num_regions(),
            mean_colors,
            labels,
            summary,
        })
    }

    fn segment<P>(&self, image: &Image<P>) -> Result<SegmentedImage, JobError>
    where
        P: BandPixel,
        P::Subpixel: Into<f32> + Clamp<f32>,
    {
        let mut builder = Pipeline::builder().with_algorithm(&self.algorithm)?;
        if let Some(sigma) = self.blur_sigma {
            builder = builder.with_blur(sigma);
        }
        Ok(builder.build().process(image)?)
    }
}

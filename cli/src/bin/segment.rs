use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use segmentation::{ConfigFh04, ConfigMeanShift, ConnectRule, SegmentationAlgorithm};
use segmentation_cli::SegmentJob;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ImageArgs {
    /// Path to the input image
    #[arg(short, long)]
    input: PathBuf,
    /// Directory receiving the rendered image and JSON summary
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,
    /// Segment the luma channel instead of RGB
    #[arg(long)]
    grayscale: bool,
    /// Gaussian smoothing sigma applied before segmenting
    #[arg(long)]
    blur: Option<f32>,
    /// Also write an image with one arbitrary color per region
    #[arg(long)]
    labels: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Felzenszwalb-Huttenlocher graph segmentation
    Fh {
        #[command(flatten)]
        image: ImageArgs,
        /// Scale parameter; larger values favor larger regions
        #[arg(short, long, default_value = "300.0")]
        k: f32,
        /// Minimum region size in pixels
        #[arg(long, default_value = "20")]
        min_size: usize,
        /// Use 4-connectivity instead of 8
        #[arg(long)]
        four: bool,
    },
    /// Mean-shift segmentation
    MeanShift {
        #[command(flatten)]
        image: ImageArgs,
        #[arg(long, default_value = "6")]
        spatial_radius: usize,
        #[arg(long, default_value = "15.0")]
        color_radius: f32,
        /// Minimum region size in pixels
        #[arg(long, default_value = "30")]
        min_size: usize,
        /// Search from every pixel instead of reusing modes along paths
        #[arg(long)]
        exhaustive: bool,
    },
    /// Run a job described by a TOML or JSON file
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the JSON schema of a job file
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fh { image, k, min_size, four } => {
            let algorithm = SegmentationAlgorithm::Fh04(ConfigFh04 {
                k,
                min_size,
                connect_rule: if four { ConnectRule::Four } else { ConnectRule::Eight },
            });
            run_job(&job_from_args(image, algorithm))?;
        }
        Commands::MeanShift {
            image,
            spatial_radius,
            color_radius,
            min_size,
            exhaustive,
        } => {
            let algorithm = SegmentationAlgorithm::MeanShift(ConfigMeanShift {
                spatial_radius,
                color_radius,
                min_region_size: min_size,
                fast: !exhaustive,
                ..ConfigMeanShift::default()
            });
            run_job(&job_from_args(image, algorithm))?;
        }
        Commands::Run { config } => {
            run_config(&config)?;
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(SegmentJob);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn job_from_args(args: ImageArgs, algorithm: SegmentationAlgorithm) -> SegmentJob {
    SegmentJob {
        input: args.input.to_string_lossy().into_owned(),
        output_dir: args.output_dir.to_string_lossy().into_owned(),
        grayscale: args.grayscale,
        blur_sigma: args.blur,
        write_labels: args.labels,
        algorithm,
    }
}

fn run_config(path: &Path) -> Result<()> {
    info!("Loading job from {}", path.display());
    let job = SegmentJob::from_file(path)?;
    run_job(&job)
}

fn run_job(job: &SegmentJob) -> Result<()> {
    job.algorithm.validate()?;
    let output = job.run()?;

    info!(regions = output.region_count, "Segmentation complete");
    info!("Mean colors: {}", output.mean_colors.display());
    if let Some(labels) = &output.labels {
        info!("Labels: {}", labels.display());
    }
    info!("Summary: {}", output.summary.display());
    Ok(())
}

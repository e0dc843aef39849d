use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};

use deface_select::config::{DecoderSettings, DefaceSettings, OutputFormat, Settings};
use deface_select::geometry::DisplayBox;
use deface_select::ui;

#[derive(Parser)]
#[command(name = "deface-select")]
#[command(version, about = "Pick the rectangle deface should leave alone", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CommonArgs {
    /// Width of the display box media is fitted into
    #[arg(long, global = true, value_name = "PX", default_value_t = 800)]
    max_width: u32,

    /// Height of the display box media is fitted into
    #[arg(long, global = true, value_name = "PX", default_value_t = 600)]
    max_height: u32,

    /// Report (min_x, min_y, max_x, max_y) instead of corners in drawing order
    #[arg(long, global = true)]
    normalize: bool,

    /// Print coordinates as a JSON object
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Select on a still image and run deface with the rectangle excluded
    Image {
        /// Image to open at start-up
        #[arg(value_name = "IMAGE")]
        path: Option<PathBuf>,

        /// deface executable
        #[arg(long, value_name = "PROGRAM", default_value = "deface")]
        deface: PathBuf,

        /// Print the deface command line instead of running it
        #[arg(long)]
        print_only: bool,
    },
    /// Select on a video frame while scrubbing through the video
    Video {
        /// Video to open at start-up
        #[arg(value_name = "VIDEO")]
        path: Option<PathBuf>,

        /// Playback timer interval in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 20)]
        tick_ms: u64,

        /// ffmpeg executable
        #[arg(long, value_name = "PROGRAM", default_value = "ffmpeg")]
        ffmpeg: PathBuf,

        /// ffprobe executable
        #[arg(long, value_name = "PROGRAM", default_value = "ffprobe")]
        ffprobe: PathBuf,
    },
}

impl CommonArgs {
    fn settings(&self) -> Settings {
        Settings {
            display: DisplayBox::new(self.max_width, self.max_height),
            normalize: self.normalize,
            format: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let base = cli.common.settings();

    let run = match cli.command {
        Commands::Image {
            path,
            deface,
            print_only,
        } => {
            let settings = Settings {
                deface: DefaceSettings {
                    program: deface,
                    print_only,
                },
                ..base
            }
            .validate()
            .context("invalid arguments")?;
            ui::run_image_tool(settings, path)
        }
        Commands::Video {
            path,
            tick_ms,
            ffmpeg,
            ffprobe,
        } => {
            let settings = Settings {
                tick: Duration::from_millis(tick_ms),
                decoder: DecoderSettings { ffmpeg, ffprobe },
                ..base
            }
            .validate()
            .context("invalid arguments")?;
            ui::run_video_tool(settings, path)
        }
    };
    run.map_err(|e| anyhow!("failed to run eframe: {e}"))
}

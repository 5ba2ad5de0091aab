use audiograb::client::Quality;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "audiograb")]
#[command(about = "Convert YouTube videos to MP3 through a conversion backend", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $AUDIOGRAB_CONFIG or config/audiograb.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend origin, overriding the configuration
    #[arg(long, global = true)]
    pub origin: Option<Url>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a conversion and print the download link
    Convert(ConvertArgs),
    /// Submit a conversion and save the audio file once it is ready
    Download(DownloadArgs),
    /// Print the effective configuration
    Config,
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// YouTube video URL
    pub url: String,

    /// Audio quality: high, medium or low
    #[arg(long)]
    pub quality: Option<Quality>,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub convert: ConvertArgs,

    /// Output file (defaults to a timestamped name in download.output_dir)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

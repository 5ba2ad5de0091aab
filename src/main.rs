mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use audiograb::artifact::ArtifactFetcher;
use audiograb::client::{ConversionClient, ResolvedDownload};
use audiograb::config::Config;
use audiograb::observability;
use audiograb::session::ConversionSession;
use audiograb::state::ConversionState;
use clap::Parser;
use cli::{Cli, Commands, ConvertArgs, DownloadArgs};
use tokio::sync::watch;
use tokio::task::JoinHandle;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<ExitCode, AnyError> {
    observability::init_tracing();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(origin) = cli.origin {
        config.backend.origin = origin;
        config.validate()?;
    }

    match cli.command {
        Commands::Convert(args) => convert(config, args).await,
        Commands::Download(args) => download(config, args).await,
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn convert(config: Config, args: ConvertArgs) -> Result<ExitCode, AnyError> {
    match run_conversion(config, args).await? {
        Some(_) => Ok(ExitCode::SUCCESS),
        None => Ok(ExitCode::FAILURE),
    }
}

async fn download(config: Config, args: DownloadArgs) -> Result<ExitCode, AnyError> {
    let output = args.output;
    let Some((client, resolved)) = run_conversion(config.clone(), args.convert).await? else {
        return Ok(ExitCode::FAILURE);
    };

    eprintln!("Waiting for the file to be ready...");
    let fetcher = ArtifactFetcher::from_client(&client)
        .with_timeout(config.download.fetch_timeout.as_duration());
    let artifact = match fetcher
        .wait_for(
            &resolved,
            config.download.poll_interval.as_duration(),
            config.download.max_polls,
        )
        .await
    {
        Ok(artifact) => artifact,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let path = output.unwrap_or_else(|| {
        let name = artifact.file_name.clone().unwrap_or_else(default_file_name);
        config.download.output_dir.join(name)
    });
    artifact.save(&path).await?;
    println!("{}", path.display());

    Ok(ExitCode::SUCCESS)
}

/// Drive one attempt through a session; `None` when it settled in error
async fn run_conversion(
    mut config: Config,
    args: ConvertArgs,
) -> Result<Option<(ConversionClient, ResolvedDownload)>, AnyError> {
    if let Some(quality) = args.quality {
        config.conversion.quality = quality;
    }

    let client = ConversionClient::from_config(&config)?;
    let session = ConversionSession::new(Arc::new(client.clone()));
    let renderer = spawn_renderer(session.subscribe());

    let state = session.convert(&args.url).await?;
    renderer.abort();

    match state {
        ConversionState::Ready { download } => {
            println!("{}", download.url);
            if let Some(message) = &download.message {
                eprintln!("{}", message);
            }
            if let Some(wait) = &download.estimated_wait_time {
                eprintln!("Estimated wait: {}", wait);
            }
            Ok(Some((client, download)))
        }
        ConversionState::Failed { message } => {
            eprintln!("Error: {}", message);
            Ok(None)
        }
        ConversionState::Idle | ConversionState::Loading => {
            Err("conversion did not settle".into())
        }
    }
}

fn spawn_renderer(mut rx: watch::Receiver<ConversionState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if rx.borrow_and_update().is_loading() {
                eprintln!("Converting...");
            }
        }
    })
}

fn default_file_name() -> String {
    chrono::Local::now()
        .format("youtube_audio_%Y%m%d_%H%M%S.mp3")
        .to_string()
}

//! CLI for faledit - batch image editing via fal.ai.

use clap::{Args, Parser, Subcommand};
use faledit::{
    BatchRunner, DownloadOutcome, Downloader, EditClient, SettingsStore, SourceImage, UploadClient,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "faledit")]
#[command(about = "Batch-edit images with the fal.ai flux-2 edit API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload and edit a batch of images
    Process(ProcessArgs),

    /// Manage the cached settings record
    Settings(SettingsArgs),
}

#[derive(Args)]
struct ProcessArgs {
    /// Image files to process, in order
    files: Vec<PathBuf>,

    /// Edit prompt (overrides the cached prompt)
    #[arg(short, long)]
    prompt: Option<String>,

    /// LoRA reference URL or path (overrides the cached one)
    #[arg(short, long)]
    lora: Option<String>,

    /// fal.ai API key (overrides the cached key)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Directory to download results into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Persist the effective settings to the cache
    #[arg(long)]
    save: bool,

    /// Skip downloading; only print result URLs
    #[arg(long)]
    no_download: bool,
}

#[derive(Args)]
struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the cached settings (API key redacted)
    Show,
    /// Update fields of the cached record
    Set {
        /// fal.ai API key
        #[arg(long)]
        api_key: Option<String>,
        /// Edit prompt
        #[arg(long)]
        prompt: Option<String>,
        /// LoRA reference URL or path
        #[arg(long)]
        lora: Option<String>,
    },
    /// Remove the cached record
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SettingsStore::new();

    match cli.command {
        Commands::Process(args) => process(args, &store, cli.json).await?,
        Commands::Settings(args) => manage_settings(args, &store, cli.json)?,
    }

    Ok(())
}

async fn process(args: ProcessArgs, store: &SettingsStore, json_output: bool) -> anyhow::Result<()> {
    let mut settings = store.load();
    if let Some(key) = args.api_key {
        settings.api_key = key;
    }
    if let Some(prompt) = args.prompt {
        settings.prompt = prompt;
    }
    if let Some(lora) = args.lora {
        settings.lora = lora;
    }

    if settings.api_key.is_empty() {
        anyhow::bail!("no API key: pass --api-key or cache one with `faledit settings set`");
    }
    if args.files.is_empty() {
        anyhow::bail!("no input files given");
    }

    if args.save {
        store.save(&settings)?;
    }

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        files.push(SourceImage::open(path)?);
    }

    let runner = BatchRunner::new(
        UploadClient::new(&settings.api_key),
        EditClient::new(&settings.api_key),
    );
    let outcome = runner
        .process_all(&files, &settings, |progress| {
            if !json_output {
                println!("{progress}");
            }
        })
        .await;

    let outcomes = if args.no_download || outcome.results.is_empty() {
        Vec::new()
    } else {
        Downloader::new()
            .download_all(&outcome.results, &args.out_dir)
            .await
    };

    if json_output {
        let report = serde_json::json!({
            "progress": outcome.progress,
            "results": outcome.results,
            "downloaded": outcomes
                .iter()
                .filter(|o| matches!(o, DownloadOutcome::Saved(_)))
                .count(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        for result in &outcome.results {
            println!(
                "{}  seed={}  {}",
                result.filename, result.seed, result.url
            );
        }
        for download in &outcomes {
            if let DownloadOutcome::Fallback { filename, url, reason } = download {
                println!("{filename}: download failed ({reason}), fetch manually: {url}");
            }
        }
    }

    // A truncated batch still printed its partial results above.
    if outcome.progress.starts_with("Error: ") {
        anyhow::bail!("{}", outcome.progress);
    }

    Ok(())
}

fn manage_settings(
    args: SettingsArgs,
    store: &SettingsStore,
    json_output: bool,
) -> anyhow::Result<()> {
    match args.command {
        SettingsCommand::Show => {
            let settings = store.load();
            let redacted = if settings.api_key.is_empty() {
                "(not set)".to_string()
            } else {
                "****".to_string()
            };
            if json_output {
                let report = serde_json::json!({
                    "apiKey": redacted,
                    "prompt": settings.prompt,
                    "lora": settings.lora,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("api key: {redacted}");
                println!("prompt:  {}", settings.prompt);
                println!("lora:    {}", settings.lora);
            }
        }
        SettingsCommand::Set {
            api_key,
            prompt,
            lora,
        } => {
            let mut settings = store.load();
            if let Some(key) = api_key {
                settings.api_key = key;
            }
            if let Some(p) = prompt {
                settings.prompt = p;
            }
            if let Some(l) = lora {
                settings.lora = l;
            }
            store.save(&settings)?;
            println!("saved to {}", store.path().display());
        }
        SettingsCommand::Clear => {
            store.clear()?;
            println!("cache cleared");
        }
    }
    Ok(())
}

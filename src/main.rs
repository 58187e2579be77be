use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{info, warn, LevelFilter};
use reqwest::Method;
use simplelog::{Config, TermLogger, TerminalMode, ColorChoice};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use ufile_uploader::cli::{Args, Commands};
use ufile_uploader::cloud::{self, signer, SaveOutcome, Uploader};
use ufile_uploader::config::{load_or_create_config, AppConfig};
use ufile_uploader::security::safe_error_message;

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    // init-config needs no credentials
    if let Commands::InitConfig { path } = &args.command {
        info!("Creating configuration template at {}", path.display());
        AppConfig::create_default_config_file(path)?;
        info!("Configuration created successfully");
        return Ok(());
    }

    // Load and process configuration
    let config = load_and_process_config(&args)?;

    match &args.command {
        Commands::Upload { file, key } => {
            let outcome = run_upload(&config, file, key.as_deref())?;
            print_outcome(&outcome);
            Ok(())
        }
        Commands::Sign { method, content_type, key } => print_signature(&config, method, content_type, key),
        Commands::ShowConfig => show_config(&config),
        Commands::InitConfig { .. } => Ok(()),
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

/// Load configuration, apply command-line overrides and validate
fn load_and_process_config(args: &Args) -> Result<AppConfig> {
    let mut config = load_or_create_config(args.config.as_deref())?;

    if let Some(bucket) = &args.bucket {
        config.credential.bucket = bucket.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.upload.concurrency = concurrency;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Upload one file, cancelling cleanly on Ctrl-C
fn run_upload(config: &AppConfig, file: &std::path::Path, key: Option<&str>) -> Result<SaveOutcome> {
    let runtime = Runtime::new().context("Failed to create Tokio runtime")?;

    runtime.block_on(async {
        let uploader = Uploader::from_config(config)?;
        let cancel = CancellationToken::new();

        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling upload");
                interrupt.cancel();
            }
        });

        let result = cloud::upload_file(&uploader, file, key, &cancel).await;

        let (uploaded, total) = uploader.get_progress();
        info!("Transferred {} of {} bytes", uploaded, total);

        result.map_err(|e| anyhow!(safe_error_message("Upload failed", &format!("{:#}", e))))
    })
}

fn print_outcome(outcome: &SaveOutcome) {
    match outcome {
        SaveOutcome::SinglePut { key, size } => {
            println!("Stored {} ({} bytes, single PUT)", key, size);
        }
        SaveOutcome::Multipart(result) => {
            println!(
                "Stored {}/{} ({} bytes, multipart)",
                result.bucket, result.key, result.file_size
            );
        }
    }
}

fn print_signature(config: &AppConfig, method: &str, content_type: &str, key: &str) -> Result<()> {
    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|_| anyhow!("Invalid HTTP method: {}", method))?;
    let bucket = &config.credential.bucket;

    println!("{}", signer::canonical_string(&method, content_type, bucket, key).escape_debug());
    println!(
        "{}",
        signer::sign(&config.credential.private_key, &method, content_type, bucket, key)
    );
    println!(
        "Authorization: {}",
        signer::authorization(&config.credential, &method, content_type, bucket, key)
    );
    Ok(())
}

fn show_config(config: &AppConfig) -> Result<()> {
    let mut redacted = config.clone();
    redacted.credential.private_key = "<REDACTED>".to_string();

    let yaml = serde_yaml::to_string(&redacted).context("Failed to serialize config to YAML")?;
    print!("{}", yaml);
    Ok(())
}

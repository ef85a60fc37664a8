use anyhow::{Context, Result};
use clap::Parser;
use r2_squeeze::cli::{Args, Commands};
use r2_squeeze::{
    error, info, list_image_dir, logger, plan_batch, run_batch, warn, CompressionOptions,
    Compressor, CompressorKind, Config, LocalCompressor, Pipeline, S3Store, TinifyClient,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let args = Args::parse();
    logger::set_quiet_mode(args.quiet);
    logger::set_verbose_mode(args.verbose);

    match run(args.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Run {
            workers,
            images_dir,
            compressor,
            quality,
        } => {
            let config = load_config(images_dir)?.with_worker_count(workers);
            upload_images(&config, compressor, quality)
        }
        Commands::Plan { images_dir } => {
            let config = load_config(images_dir)?;
            show_plan(&config)
        }
    }
}

fn load_config(images_dir: Option<PathBuf>) -> Result<Config> {
    Ok(Config::from_env()
        .context("Failed to load configuration")?
        .with_images_dir(images_dir))
}

fn upload_images(config: &Config, kind: CompressorKind, quality: Option<u8>) -> Result<bool> {
    info!("🤖 Starting r2-squeeze");
    info!("📁 Images: {}", config.images_dir.display());
    info!("🪣 Destination: {}/{}", config.bucket_name, config.prefix);
    info!("⚙️  Workers: {}", config.worker_count);

    let file_names = list_image_dir(&config.images_dir)
        .with_context(|| format!("Failed to list {}", config.images_dir.display()))?;
    if file_names.is_empty() {
        warn!("No files found in the images directory");
        info!("🎉 Finished r2-squeeze");
        return Ok(true);
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    let compressor: Arc<dyn Compressor> = match kind {
        CompressorKind::Tinify => {
            if quality.is_some() {
                warn!("--quality only applies to the local compressor; ignoring it");
            }
            let token = config.tinify_token()?.clone();
            Arc::new(TinifyClient::new(token, runtime.handle().clone())?)
        }
        CompressorKind::Local => Arc::new(LocalCompressor::new(CompressionOptions::new(quality)?)),
    };
    let store = Arc::new(S3Store::new(
        &config.r2_endpoint_url,
        &config.r2_region,
        &config.r2_access_key,
        &config.r2_secret_access_key,
        runtime.handle().clone(),
    )?);
    let pipeline = Arc::new(Pipeline::new(
        &config.images_dir,
        &config.bucket_name,
        &config.prefix,
        compressor,
        store,
    ));

    let summary = run_batch(config.worker_count, pipeline, &file_names)
        .context("Failed to start worker pool")?;
    summary.print();
    info!("🎉 Finished r2-squeeze");

    Ok(summary.is_success())
}

fn show_plan(config: &Config) -> Result<bool> {
    let file_names = list_image_dir(&config.images_dir)
        .with_context(|| format!("Failed to list {}", config.images_dir.display()))?;

    println!("📋 Plan for {}", config.images_dir.display());
    let plan = plan_batch(&config.prefix, &file_names);
    for item in &plan {
        match &item.key {
            Some(key) => println!("  ✅ {} -> {}/{}", item.file_name, config.bucket_name, key),
            None => println!("  🚫 {} (not a valid image format)", item.file_name),
        }
    }

    let accepted = plan.iter().filter(|item| item.key.is_some()).count();
    println!("📊 {} of {} files would be uploaded", accepted, plan.len());
    Ok(true)
}

use crate::compressor::CompressorKind;
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "r2-squeeze",
    about = "Compress a directory of images with TinyPNG and upload them to R2",
    long_about = "r2-squeeze sends every image in the images directory through a compression \
                  service, uploads the result to an S3-compatible bucket (Cloudflare R2) as \
                  {PREFIX}/{name}-optimized.jpg and removes the local original once the upload \
                  succeeded. Credentials are read from the environment or a .env file.",
    version,
    after_help = "ENVIRONMENT:\n  \
    TINIFY_TOKEN, PREFIX, BUCKET_NAME, R2_ENDPOINT_URL, R2_ACCESS_KEY_ID, R2_SECRET_ACCESS_KEY\n  \
    optional: R2_REGION (auto), NUM_THREADS (10), IMAGES_DIR (./images)\n\n\
    EXAMPLES:\n  \
    r2-squeeze run\n  \
    r2-squeeze run -j 4 --images-dir ./photos\n  \
    r2-squeeze run --compressor local -Q 75\n  \
    r2-squeeze plan"
)]
pub struct Args {
    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print per-step diagnostics")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress, upload and remove every image in the images directory",
        long_about = "Process the images directory with a fixed pool of workers. \
                      A file is removed only after its compressed form was uploaded. \
                      Exits with status 1 if any image failed."
    )]
    Run {
        #[arg(
            short = 'j',
            long,
            help = "Number of parallel workers (default: NUM_THREADS or 10)"
        )]
        workers: Option<NonZeroUsize>,

        #[arg(long, help = "Directory holding the images (default: ./images)")]
        images_dir: Option<PathBuf>,

        #[arg(
            short = 'c',
            long,
            default_value = "tinify",
            help = "Compression backend (tinify, local)",
            long_help = "tinify sends images to the TinyPNG API (needs TINIFY_TOKEN). \
                         local re-encodes images as JPEG without any network access."
        )]
        compressor: CompressorKind,

        #[arg(
            short = 'Q',
            long,
            help = "JPEG quality for the local backend (1-100, default: 80)"
        )]
        quality: Option<u8>,
    },

    #[command(
        about = "Show what a run would upload, without touching anything",
        long_about = "List every entry of the images directory with the key it would be \
                      uploaded to, or why it would be rejected. No network access, no deletion."
    )]
    Plan {
        #[arg(long, help = "Directory holding the images (default: ./images)")]
        images_dir: Option<PathBuf>,
    },
}

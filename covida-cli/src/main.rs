//! CoVida Native Replay CLI
//!
//! Drives the covida-native bridge outside of the JVM. A session script (or
//! the built-in demo session) is replayed notification by notification
//! through the same dispatch path the Java entry points use, which makes it
//! possible to exercise sinks and plugins without the annotation tool.

use anyhow::{bail, Result};
use clap::Parser;
use log::LevelFilter;
use std::io;
use std::path::PathBuf;

mod config;
mod output;
mod script;

use config::{AppConfig, OutputFormat};
use covida_native::Bridge;
use output::JsonSink;

/// CoVida Native - Replay annotation sessions through the native bridge
#[derive(Parser, Debug)]
#[command(name = "covida-cli")]
#[command(about = "Replay CoVida annotation sessions through the native bridge", long_about = None)]
#[command(version)]
struct Args {
    /// Session script to replay (default: built-in demo session)
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format, overriding the configuration
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };

    init_logging(args.verbose, args.quiet, config.bridge.log_level.into());

    log::info!("CoVida Native CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using bridge library v{}", covida_native::VERSION);

    let session = match &args.script {
        Some(path) => script::load_script(path)?,
        None => {
            log::info!("No session script given, replaying the demo session");
            script::demo_session()
        }
    };

    let format = args.format.unwrap_or(config.replay.format);
    let mut bridge = match format {
        OutputFormat::Text => Bridge::from_config(&config.bridge)?,
        OutputFormat::Json => Bridge::new(
            Box::new(JsonSink::new(io::stdout())),
            config.bridge.coordinate_space,
        ),
    };

    log::info!(
        "Replaying {} events ({} coordinates)",
        session.events.len(),
        bridge.coordinate_space()
    );
    let replayed = script::replay(&mut bridge, &session)?;
    let stats = bridge.shutdown();

    log::info!(
        "Replayed {} events: {} media events, {} annotations",
        replayed,
        stats.media_events,
        stats.annotations
    );

    if stats.failures > 0 {
        bail!("{} of {} notifications failed", stats.failures, replayed);
    }

    Ok(())
}

/// Initialize logging based on verbosity flags, falling back to the
/// configured level when no flag is given
fn init_logging(verbose: u8, quiet: bool, configured: LevelFilter) {
    use env_logger::Builder;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => configured,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

//! mamegen
//!
//! Prints the emulator command line for a game: program, arguments and
//! environment, after preparing the config directories, software-list links
//! and bezel artwork it depends on. The emulator is never started.

mod collaborators;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use collaborators::{DecorationsLookup, LoggingPadWriter};
use mamegen_config::{GeneratorSettings, SystemConfig};
use mamegen_emulator::{MameGenerator, PlayerController, Resolution};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Shell,
}

#[derive(Parser)]
#[command(name = "mamegen", version, about)]
struct Args {
    /// Logical system name (e.g. `mame`, `bbc`, `ti99`)
    #[arg(long)]
    system: String,

    /// Settings file; defaults to the user then the system settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// TOML file with the launch options for the system
    #[arg(long)]
    options: Option<PathBuf>,

    /// Launch option override, `key=value`, may be repeated
    #[arg(short = 'o', long = "option", value_parser = parse_key_value)]
    overrides: Vec<(String, String)>,

    /// Controller, `player:guid:device:name`, may be repeated
    #[arg(long = "pad", value_parser = parse_controller)]
    pads: Vec<PlayerController>,

    /// Frontend resolution, `WIDTHxHEIGHT`
    #[arg(long, value_parser = parse_resolution)]
    resolution: Option<Resolution>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// ROM file
    rom: PathBuf,
}

fn main() -> Result<()> {
    setup_logging();

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => GeneratorSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => GeneratorSettings::load_default().context("Failed to load settings")?,
    };

    let mut config = match &args.options {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            SystemConfig::from_toml(&args.system, &contents)
                .with_context(|| format!("Invalid options file {}", path.display()))?
        }
        None => SystemConfig::new(&args.system),
    };
    for (key, value) in &args.overrides {
        config.set(key, value);
    }

    let lookup = DecorationsLookup::new(settings.paths.userdata_path("decorations"));
    let generator =
        MameGenerator::from_settings(&settings, Box::new(LoggingPadWriter), Box::new(lookup))
            .context("Failed to initialize generator")?;

    info!(
        "Loaded {} systems, generating for {}",
        generator.catalog().len(),
        args.system
    );

    let command = generator
        .generate(
            &config,
            &args.rom,
            &args.pads,
            args.resolution.unwrap_or_default(),
        )
        .with_context(|| format!("Failed to generate launch for {}", args.rom.display()))?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&command)?),
        OutputFormat::Shell => println!("{}", command.to_shell_line()),
    }

    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the command descriptor
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn parse_key_value(s: &str) -> Result<(String, String)> {
    let Some((key, value)) = s.split_once('=') else {
        bail!("expected key=value, got {:?}", s);
    };
    if key.is_empty() {
        bail!("empty option key in {:?}", s);
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_resolution(s: &str) -> Result<Resolution> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("expected WIDTHxHEIGHT, got {:?}", s))?;
    Ok(Resolution {
        width: width.parse().context("invalid width")?,
        height: height.parse().context("invalid height")?,
    })
}

fn parse_controller(s: &str) -> Result<PlayerController> {
    let mut parts = s.splitn(4, ':');
    let (Some(player), Some(guid), Some(device), Some(name)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        bail!("expected player:guid:device:name, got {:?}", s);
    };

    Ok(PlayerController {
        player: player.parse().context("invalid player number")?,
        name: name.to_string(),
        guid: guid.to_string(),
        device: device.to_string(),
    })
}

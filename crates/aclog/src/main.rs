//! `aclog` - CLI for decoding and analysing .aclog flight logs

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use aclog::analysis::{executor::executor_for, AnalysisReport};
use aclog::cli::{Cli, Command, ConfigCommand, DatasetsCommand, ExportCommand, InspectCommand};
use aclog::source::{list_datasets, ExportDocument, LogSource, Summary};
use aclog::{init_logging, Config, ParseResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Inspect(cmd) => handle_inspect(&config, &cmd),
        Command::Datasets(cmd) => handle_datasets(&config, &cmd).await,
        Command::Export(cmd) => handle_export(&config, &cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open(path: &std::path::Path) -> anyhow::Result<LogSource> {
    LogSource::open(path).with_context(|| format!("reading {}", path.display()))
}

async fn load(
    config: &Config,
    source: &LogSource,
    raw: bool,
) -> anyhow::Result<(ParseResult, AnalysisReport)> {
    if raw {
        let result = source.parse(config)?;
        return Ok((result, AnalysisReport::default()));
    }
    let executor = executor_for(&config.analysis);
    Ok(source.load(config, executor.as_ref()).await?)
}

fn handle_inspect(config: &Config, cmd: &InspectCommand) -> anyhow::Result<()> {
    let source = open(&cmd.file)?;
    let result = source.parse(config)?;
    let summary = Summary::new(&source, &result);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", summary.path.display());
    println!("{}", "-".repeat(summary.path.display().to_string().len()));
    println!("Description:   {}", summary.header.description);
    println!(
        "Version:       {}.{}",
        summary.header.ver_main, summary.header.ver_sub
    );
    match summary.modified {
        Some(modified) => println!("Modified:      {}", modified.format("%Y-%m-%d %H:%M:%S")),
        None => println!("Modified:      unknown"),
    }
    println!("Size:          {} bytes", summary.size);
    println!("BLAKE3:        {}", summary.digest);
    println!("Frames:        {}", summary.stats.total_frames);
    println!("Unknown:       {}", summary.stats.unknown_frames);
    println!();
    println!("{:>4}  {:<20}  {:>10}", "Tag", "Type", "Count");
    for entry in &summary.frame_types {
        println!("{:>4}  {:<20}  {:>10}", entry.tag, entry.name, entry.count);
    }
    Ok(())
}

async fn handle_datasets(config: &Config, cmd: &DatasetsCommand) -> anyhow::Result<()> {
    let source = open(&cmd.file)?;
    let (result, report) = load(config, &source, cmd.raw).await?;
    let listing = list_datasets(&result.datasets, cmd.raw);

    if cmd.json {
        let doc = serde_json::json!({
            "datasets": listing,
            "spectrogram": report.spectrogram.as_ref().map(|s| serde_json::json!({
                "title": s.title,
                "frames": s.frames(),
                "bins": s.bins(),
                "fftSize": s.fft_size,
            })),
            "sensors": report.sensors,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let width = listing.iter().map(|l| l.key.len()).max().unwrap_or(3).max(3);
    println!("{:<width$}  {:>8}  {:<12}  Plot", "Key", "Rows", "Provenance");
    for entry in &listing {
        println!(
            "{:<width$}  {:>8}  {:<12}  {}",
            entry.key,
            entry.rows,
            entry.provenance.to_string(),
            if entry.renderable { "yes" } else { "no" }
        );
    }
    if let Some(spectrogram) = &report.spectrogram {
        println!();
        println!(
            "Spectrogram: {} ({} frames x {} bins)",
            spectrogram.title,
            spectrogram.frames(),
            spectrogram.bins()
        );
    }
    if !report.sensors.is_empty() {
        println!();
        for sensor in &report.sensors {
            println!(
                "{}: {} [{}]",
                sensor.key,
                sensor.category,
                sensor.axes.join(", ")
            );
        }
    }
    Ok(())
}

async fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let source = open(&cmd.file)?;
    let (result, report) = load(config, &source, cmd.raw).await?;
    let export = ExportDocument::new(&result, &report, &cmd.dataset);
    for key in export.missing(&cmd.dataset) {
        warn!(dataset = key, "Requested dataset not present in log");
    }

    let json = if cmd.pretty {
        serde_json::to_vec_pretty(&export)?
    } else {
        serde_json::to_vec(&export)?
    };

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "Exported {} datasets to {}",
                export.datasets.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&json)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Parser]");
                println!("  Step budget:        {}", config.parser.step_budget);
                println!("  Max frames:         {}", config.parser.max_frames);
                println!("  Byte order:         {:?}", config.parser.endian);
                println!();
                println!("[Analysis]");
                println!("  Enabled:            {}", config.analysis.enabled);
                println!("  Noise window (s):   {}", config.analysis.noise_window_secs);
                println!("  FFT size:           {}", config.analysis.fft_size);
                println!(
                    "  Spectrogram window: {}s ({}..={} points)",
                    config.analysis.spectrogram_window_secs,
                    config.analysis.spectrogram_min_fft,
                    config.analysis.spectrogram_max_fft
                );
                println!("  Offload:            {}", config.analysis.offload);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

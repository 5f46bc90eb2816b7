//! Subcommand implementations.
//!
//! Each command loads configuration, applies its command-line overrides,
//! runs the library pipeline and prints a coloured summary. Errors carry
//! `anyhow` context for the binary to report.

use crate::catalog::{CatalogAssembler, PickSummary, summarize_picks};
use crate::cli::{Args, Commands, ConvertArgs, PicksArgs, VelocityArgs, setup_logging};
use crate::config::Config;
use crate::models::{ConversionStats, StationFileStats};
use crate::relocation::RelocationParameters;
use crate::segment::segment_events;
use crate::station_file::StationFile;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Dispatch the parsed command line
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args).context("Failed to set up logging")?;

    let config = Config::load(args.config_file.as_deref()).context("Failed to load configuration")?;
    let show_progress = args.show_progress();

    match &args.command {
        Some(Commands::Convert(convert)) => {
            run_convert(convert, convert.apply(config), show_progress).map(|_| ())
        }
        Some(Commands::Velocity(velocity)) => {
            run_velocity(velocity, velocity.apply(config)).map(|_| ())
        }
        Some(Commands::Picks(picks)) => run_picks(picks, config).map(|_| ()),
        None => Ok(()),
    }
}

pub fn run_convert(args: &ConvertArgs, config: Config, show_progress: bool) -> Result<ConversionStats> {
    config.validate()?;
    let start = Instant::now();

    let text = read_input(&args.input)?;
    let assembler = CatalogAssembler::from_config(&config);
    info!(
        "Converting {} with the {} decoder",
        args.input.display(),
        assembler.decoder_name()
    );

    let progress = show_progress.then(|| {
        create_progress_bar(segment_events(&text).count() as u64, "Decoding events")
    });
    let assembled = assembler.assemble_with_progress(&text, progress.as_ref());

    let rendered = args
        .format
        .render(&assembled.document)
        .context("Failed to render catalog")?;
    let output = args.output_path();
    std::fs::write(&output, rendered)
        .with_context(|| format!("Failed to write catalog to {}", output.display()))?;

    print_conversion_summary(&assembled.stats, &output, start.elapsed());
    Ok(assembled.stats)
}

pub fn run_velocity(
    args: &VelocityArgs,
    config: Config,
) -> Result<(RelocationParameters, StationFileStats)> {
    config.validate()?;

    let station_file = StationFile::read(&args.input, &config.station_file)
        .with_context(|| format!("Failed to decode station file {}", args.input.display()))?;
    let stats = station_file.stats.clone();
    let parameters = RelocationParameters::from_station_file(station_file, &config.relocation)?;

    match &args.output {
        Some(path) => {
            parameters
                .write_json(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            for line in station_summary(&stats, &parameters, Some(path)) {
                println!("{}", line);
            }
        }
        None => {
            // stdout carries the JSON, the summary goes to stderr
            println!("{}", parameters.to_json()?);
            for line in station_summary(&stats, &parameters, None) {
                eprintln!("{}", line);
            }
        }
    }

    Ok((parameters, stats))
}

pub fn run_picks(args: &PicksArgs, mut config: Config) -> Result<Vec<PickSummary>> {
    if let Some(decoder) = args.decoder {
        config = config.with_decoder(decoder);
    }
    // every decoded event is listed, pick or not
    config = config.with_require_picks(false);

    let text = read_input(&args.input)?;
    let assembled = CatalogAssembler::from_config(&config).assemble(&text);
    let summaries = summarize_picks(&assembled.document);

    print_pick_table(&summaries);
    println!(
        "\n{} events, {} skipped, {} pick lines rejected",
        assembled.stats.events_processed.to_string().bright_green(),
        assembled.stats.events_skipped.to_string().bright_yellow(),
        assembled.stats.pick_lines_rejected
    );

    Ok(summaries)
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bulletin {}", path.display()))
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}

fn print_conversion_summary(stats: &ConversionStats, output: &Path, elapsed: std::time::Duration) {
    println!("\n{}", "Catalog conversion complete".bright_green().bold());
    println!("   • Event groups: {}", stats.groups_seen);
    println!(
        "   • Processed: {}",
        stats.events_processed.to_string().bright_green()
    );
    println!(
        "   • Skipped: {} ({} malformed headers, {} without coordinates)",
        stats.events_skipped.to_string().bright_yellow(),
        stats.malformed_headers,
        stats.missing_coordinates
    );
    if stats.events_filtered > 0 {
        println!("   • Filtered (no picks): {}", stats.events_filtered);
    }
    println!(
        "   • Picks: {} decoded, {} rejected",
        stats.picks_decoded, stats.pick_lines_rejected
    );
    println!("   • Output: {}", output.display().to_string().bright_cyan());
    println!("   • Time: {:.2?}", elapsed);
}

fn station_summary(
    stats: &StationFileStats,
    parameters: &RelocationParameters,
    output: Option<&Path>,
) -> Vec<String> {
    let destination = match output {
        Some(path) => path.display().to_string(),
        None => "stdout".to_string(),
    };

    vec![
        format!("\n{}", "Relocation parameters written".bright_green().bold()),
        format!(
            "   • Stations: {} decoded, {} skipped",
            stats.stations_decoded.to_string().bright_green(),
            stats.stations_skipped
        ),
        format!(
            "   • Velocity layers: {} (Vp/Vs {})",
            parameters.velocity_model.layer_tops.len(),
            parameters.velocity_model.vp_vs_ratio
        ),
        format!(
            "   • Ignored lines: {} markers, {} unrecognised",
            stats.marker_lines, stats.unrecognised_lines
        ),
        format!("   • Output: {}", destination.bright_cyan()),
    ]
}

fn print_pick_table(summaries: &[PickSummary]) {
    println!(
        "{}",
        format!(
            "{:>6}  {:<10}  {:>5}  {:>4}  {:>4}  {:>4}  {:>5}  {}",
            "EVENT", "DATE", "PICKS", "P", "S", "IAML", "OTHER", "ID"
        )
        .bold()
    );
    for summary in summaries {
        println!(
            "{:>6}  {:<10}  {:>5}  {:>4}  {:>4}  {:>4}  {:>5}  {}",
            summary.event_index,
            summary.origin_date.to_string(),
            summary.total,
            summary.p,
            summary.s,
            summary.amplitude,
            summary.other,
            summary.event_id.bright_black()
        );
    }
}

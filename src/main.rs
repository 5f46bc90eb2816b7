use clap::Parser;
use nordic_catalog::cli::Args;
use nordic_catalog::commands;
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Nordic Catalog - Seismic Bulletin Converter");
    println!("===========================================");
    println!();
    println!("Convert seismic bulletins in the Nordic text layout into a QuakeML 1.2");
    println!("event catalog, and extract relocation parameters from station files.");
    println!();
    println!("USAGE:");
    println!("    nordic-catalog <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    convert     Convert a bulletin into a QuakeML or JSON catalog");
    println!("    velocity    Build relocation parameters from a station/velocity file");
    println!("    picks       Print per-event pick counts of a bulletin");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>    Configuration file (TOML)");
    println!("    -v, --verbose          Increase logging verbosity");
    println!("    -q, --quiet            Only show errors");
    println!("        --log-file <FILE>  Also append log records to a file");
    println!("    -h, --help             Show help information");
    println!("    -V, --version          Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Convert a bulletin with the default fixed-column decoder:");
    println!("    nordic-catalog convert collect.out -o catalog.xml");
    println!();
    println!("    # Bulletin whose lines lost their leading blank column:");
    println!("    nordic-catalog convert collect.out --decoder positional --require-picks");
    println!();
    println!("    # Relocation parameters from a station file:");
    println!("    nordic-catalog velocity STATION0.HYP --vp-vs 1.73 -o relocation.json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    nordic-catalog <COMMAND> --help");
}

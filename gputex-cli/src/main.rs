//! gputex CLI - inspect GPU texture format selection
//!
//! Answers "what would the loader do on this device" without a GPU or a
//! container at hand.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use gputex::logging::{init_logging, LogConfig};

use commands::capabilities::CapabilitiesArgs;
use commands::plan::PlanArgs;
use commands::select::SelectArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "gputex", version, about = "GPU texture format selection and transcode planning")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the format chosen for a device and texture
    Select(SelectArgs),
    /// Preview the mip-level layout of a transcode
    Plan(PlanArgs),
    /// Derive capabilities from GPU extension names
    Capabilities(CapabilitiesArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    init_logging(&log_config).map_err(CliError::Logging)?;

    match cli.command {
        Commands::Select(args) => commands::select::run(args),
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Capabilities(args) => commands::capabilities::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan_with_flags() {
        let cli = Cli::try_parse_from([
            "gputex", "plan", "--width", "256", "--height", "128", "--s3tc", "--alpha", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Plan(args) => {
                assert_eq!(args.width, 256);
                assert!(args.caps.s3tc);
                assert!(args.content.alpha);
                assert_eq!(args.levels, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_repeated_extensions() {
        let cli = Cli::try_parse_from([
            "gputex",
            "capabilities",
            "--extension",
            "WEBGL_compressed_texture_s3tc",
            "--extension",
            "EXT_texture_compression_bptc",
        ])
        .unwrap();
        match cli.command {
            Commands::Capabilities(args) => assert_eq!(args.extensions.len(), 2),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

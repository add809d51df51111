//! CLI tool for apkalign operations.

mod commands;
mod exit_codes;
mod output;
mod progress;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use apkalign::AlignOptions;
use apkalign::align::{DEFAULT_ALIGNMENT, DEFAULT_LIBRARY_SUFFIX, DEFAULT_SO_ALIGNMENT};
use exit_codes::ExitCode;

/// ZIP/APK entry alignment tool
#[derive(Parser)]
#[command(name = "apkalign")]
#[command(author, version, about = "ZIP/APK entry alignment tool", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Align an archive into a new file
    Align {
        /// Archive to align
        input: PathBuf,

        /// Aligned archive to write
        output: PathBuf,

        #[command(flatten)]
        alignment: AlignmentArgs,

        /// Overwrite the output file if it exists
        #[arg(long)]
        force: bool,

        /// Re-check alignment and CRCs of the written archive
        #[arg(long)]
        verify: bool,
    },

    /// Check whether an archive is aligned (alias: c)
    #[command(alias = "c")]
    Check {
        /// Archive to check
        archive: PathBuf,

        #[command(flatten)]
        alignment: AlignmentArgs,

        /// Also verify the CRC-32 of every entry
        #[arg(long)]
        crc: bool,

        /// List every entry, not only misaligned ones
        #[arg(short = 'v', long)]
        verbose: bool,
    },

    /// Show the padding an alignment run would insert, without writing
    Plan {
        /// Archive to inspect
        archive: PathBuf,

        #[command(flatten)]
        alignment: AlignmentArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Alignment settings shared by all commands.
#[derive(Args, Clone)]
pub struct AlignmentArgs {
    /// Alignment in bytes for stored entries (0 disables)
    #[arg(short = 'a', long, default_value_t = DEFAULT_ALIGNMENT, env = "APKALIGN_ALIGNMENT")]
    alignment: u32,

    /// Alignment in bytes for shared libraries (0 disables)
    #[arg(long, default_value_t = DEFAULT_SO_ALIGNMENT, env = "APKALIGN_SO_ALIGNMENT")]
    so_alignment: u32,

    /// File name suffix identifying shared libraries
    #[arg(long, default_value = DEFAULT_LIBRARY_SUFFIX)]
    library_suffix: String,
}

impl AlignmentArgs {
    fn to_options(&self) -> apkalign::Result<AlignOptions> {
        Ok(AlignOptions::new()
            .alignment(self.alignment)?
            .so_alignment(self.so_alignment)?
            .library_suffix(self.library_suffix.as_str())?)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Align {
            input,
            output,
            alignment,
            force,
            verify,
        } => commands::align(&commands::AlignConfig {
            input: &input,
            output: &output,
            alignment: &alignment,
            force,
            verify,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Check {
            archive,
            alignment,
            crc,
            verbose,
        } => commands::check(&archive, &alignment, crc, verbose, cli.format),

        Commands::Plan { archive, alignment } => commands::plan(&archive, &alignment, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}

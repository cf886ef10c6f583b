use crate::config::{CliOverrides, Config, MAX_CHUNK_SIZE};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bindump")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dump files to a raw binary copy and an uppercase hex transcription")]
#[command(
    long_about = "BinDump copies each input file byte-for-byte into <name>_dump.bin and writes \
                  a hex transcription of the same bytes into <name>_dump.txt, one line per \
                  chunk read. Without path arguments it prompts for a path list on stdin."
)]
#[command(after_help = "EXAMPLES:\n  \
    bindump                                  (interactive: drop files into the console)\n  \
    bindump firmware.img --no-pause\n  \
    bindump a.exe b.dll --output-dir dumps --verify\n  \
    bindump data.bin --chunk-size 16 --output-format json")]
pub struct Cli {
    /// Files to dump (prompts on stdin when omitted)
    pub paths: Vec<PathBuf>,

    /// Directory for the dump files (defaults to the current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Bytes per read; each read becomes one line of the text dump
    #[arg(long, value_parser = parse_chunk_size)]
    pub chunk_size: Option<usize>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Decode the text dump afterwards and compare it with the input
    #[arg(long)]
    pub verify: bool,

    /// Copy the input's modification time onto the binary dump
    #[arg(long)]
    pub preserve_mtime: bool,

    /// Exit without waiting for Enter after the dump
    #[arg(long)]
    pub no_pause: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        // Paths given on the command line mean nobody is at a prompt to press Enter.
        let no_pause = self.no_pause || !self.paths.is_empty();

        CliOverrides::new()
            .with_chunk_size(self.chunk_size)
            .with_output_dir(self.output_dir.clone())
            .with_verify(self.verify)
            .with_preserve_mtime(self.preserve_mtime)
            .with_no_pause(no_pause)
    }

    pub fn is_interactive(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Splits one line of user input into file paths.
///
/// The line is split on the platform path-list separator (`:` on Unix,
/// `;` on Windows) and enclosing double quotes are removed from each entry,
/// so paths dragged into a terminal can be used as-is.
pub fn parse_path_list(line: &str) -> Vec<PathBuf> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    std::env::split_paths(line)
        .map(|entry| {
            let entry = entry.to_string_lossy();
            PathBuf::from(entry.trim_matches('"'))
        })
        .collect()
}

fn parse_chunk_size(s: &str) -> std::result::Result<usize, String> {
    let size: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid chunk size: {}", s))?;

    if size == 0 {
        return Err("Chunk size must be greater than 0".to_string());
    }

    if size > MAX_CHUNK_SIZE {
        return Err(format!(
            "Chunk size {} exceeds the maximum of {} bytes",
            size, MAX_CHUNK_SIZE
        ));
    }

    Ok(size)
}

pub mod cli;
pub mod config;
pub mod dumper;
pub mod error;
pub mod ui;

// Public API re-exports
pub use cli::{parse_path_list, Cli, OutputFormat};
pub use config::{CliOverrides, Config, DumpConfig, OutputConfig};
pub use error::{DumpError, OutputKind, Result, UserFriendlyError};

// Core functionality re-exports
pub use dumper::{BatchReport, ChunkProgress, DumpOutcome, Dumper, FileFailure};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager, Prompt};

use std::io;
use std::path::{Path, PathBuf};

/// Main library interface: dumps a list of files with user-facing reporting.
pub struct BinDump {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl BinDump {
    /// Create a new BinDump instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Ok(Self::with_shutdown(config, output_mode, verbose, quiet, shutdown))
    }

    /// Create a new BinDump instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_shutdown(config, output_mode, verbose, quiet, GracefulShutdown::new_for_test())
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create BinDump instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
    }

    /// Builds the dumper described by the current configuration.
    pub fn dumper(&self) -> Dumper {
        Dumper::from_config(&self.config.dump).with_output_dir(self.config.output.directory.clone())
    }

    /// Dumps every path in order. Missing files are skipped and per-file
    /// failures are recorded; neither stops the batch. Only an empty path
    /// list is an error.
    pub fn dump_files(&self, paths: &[PathBuf]) -> Result<BatchReport> {
        if paths.is_empty() {
            return Err(DumpError::NoFilesProvided);
        }

        let _batch = self.shutdown.enter_batch();
        let dumper = self.dumper();
        let mut report = BatchReport::new(paths.len());

        self.output_formatter.start_operation(&format!(
            "Dumping {} file(s) in chunks of {} bytes",
            paths.len(),
            dumper.chunk_size()
        ));

        for path in paths {
            if self.shutdown.check_shutdown().is_err() {
                report.mark_cancelled();
                break;
            }

            if is_missing(path) {
                let error = DumpError::FileNotFound { path: path.clone() };
                self.output_formatter.print_user_friendly_error(&error);
                report.record_skipped(path.clone());
                continue;
            }

            match self.dump_file(&dumper, path) {
                Ok(outcome) => {
                    self.output_formatter.print_dump_result(&outcome);
                    self.output_formatter.info(&format!(
                        "{} bytes in {} chunk(s)",
                        outcome.bytes, outcome.chunks
                    ));
                    report.record_dumped(outcome);
                }
                Err(DumpError::Cancelled) => {
                    report.record_failure(path.clone(), DumpError::Cancelled.to_string());
                    report.mark_cancelled();
                    break;
                }
                Err(e) => {
                    log::debug!("dump of {} failed: {}", path.display(), e);
                    self.output_formatter.print_user_friendly_error(&e);
                    report.record_failure(path.clone(), e.user_message());
                }
            }
        }

        if report.cancelled {
            self.output_formatter.warning(&format!(
                "Cancelled: {} of {} file(s) were not processed",
                report.requested - report.dumped.len() - report.skipped.len(),
                report.requested
            ));
        }

        report.finish();
        Ok(report)
    }

    /// Dumps one file with a byte progress bar, honouring Ctrl+C between chunks.
    fn dump_file(&self, dumper: &Dumper, path: &Path) -> Result<DumpOutcome> {
        let total_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let pb = self.progress_manager.create_bytes_progress(total_bytes, &label);

        let progress_callback = |progress: &ChunkProgress| -> Result<()> {
            ui::progress::update_bytes_progress(&pb, progress);
            self.shutdown.check_shutdown()
        };

        self.output_formatter.debug(&format!("Dumping {}", path.display()));

        match dumper.dump_with_progress(path, Some(&progress_callback)) {
            Ok(outcome) => {
                ui::progress::finish_progress_with_summary(&pb, &label, pb.elapsed());
                Ok(outcome)
            }
            Err(e) => {
                pb.abandon();
                Err(e)
            }
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &DumpError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Only a definite "not found" skips a path; any other metadata error is
/// left for the dump itself to report.
fn is_missing(path: &Path) -> bool {
    matches!(std::fs::metadata(path), Err(ref e) if e.kind() == io::ErrorKind::NotFound)
}

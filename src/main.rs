use anyhow::Context;
use bindump::{BatchReport, BinDump, Cli, DumpError, OutputFormatter, OutputMode, Prompt, UserFriendlyError};
use clap::Parser;
use std::path::PathBuf;
use std::process;

fn main() {
    setup_logging();
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let bindump = match BinDump::from_cli(&cli) {
        Ok(bindump) => bindump,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };
    let formatter = bindump.output_formatter();

    let paths = if cli.is_interactive() {
        match read_paths_from_stdin(formatter) {
            Ok(paths) => paths,
            Err(e) => {
                formatter.error(&format!("{:#}", e));
                return 1;
            }
        }
    } else {
        cli.paths.clone()
    };

    // An empty path list only ends the run, it is not a failure.
    let report = match bindump.dump_files(&paths) {
        Ok(report) => report,
        Err(e) => {
            bindump.handle_error(&e);
            return 0;
        }
    };

    formatter.print_batch_summary(&report);

    if !bindump.is_running() {
        return 130;
    }

    if bindump.config().output.pause_on_exit {
        // Keeps a console window opened by drag and drop visible.
        if let Err(e) = Prompt::stdin().wait_for_exit(formatter) {
            log::debug!("exit prompt failed: {}", e);
        }
    }

    exit_code_for(&report)
}

fn read_paths_from_stdin(formatter: &OutputFormatter) -> anyhow::Result<Vec<PathBuf>> {
    Prompt::stdin()
        .ask_for_paths(formatter)
        .context("Failed to read file paths from standard input")
}

/// Skipped and failed files are reported, not turned into a failure status.
fn exit_code_for(report: &BatchReport) -> i32 {
    if report.cancelled {
        130 // Interrupted (SIGINT)
    } else {
        0
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "bindump.toml".to_string());

    match BinDump::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  bindump <files> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &DumpError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("bindump=warn"))
        .format_timestamp(None)
        .init();
}

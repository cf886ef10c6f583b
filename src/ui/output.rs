use crate::dumper::{BatchReport, DumpOutcome};
use crate::error::{DumpError, UserFriendlyError};
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => println!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// Plain line for interactive prompts. Always shown in human and plain
    /// modes since the user has to answer it.
    pub fn prompt(&self, message: &str) {
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style(message).bold());
                } else {
                    println!("{}", message);
                }
            }
            OutputMode::Json => self.print_json_message("prompt", message),
            OutputMode::Plain => println!("{}", message),
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &DumpError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if self.verbose_level == 0 && self.mode != OutputMode::Json {
            return;
        }

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_dump_result(&self, outcome: &DumpOutcome) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                let heading = "Binary data dumped to:";
                if self.use_colors {
                    println!("{}{}", CHECKMARK, style(heading).green().bold());
                } else {
                    println!("{}", heading);
                }
                println!("- {}", outcome.text_output.display());
                println!("- {}", outcome.binary_output.display());
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "dumped",
                    "input": outcome.input,
                    "text_output": outcome.text_output,
                    "binary_output": outcome.binary_output,
                    "bytes": outcome.bytes,
                    "chunks": outcome.chunks,
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }));
            }
            OutputMode::Plain => {
                println!(
                    "DUMPED: {} -> {}, {}",
                    outcome.input.display(),
                    outcome.text_output.display(),
                    outcome.binary_output.display()
                );
            }
        }
    }

    pub fn print_batch_summary(&self, report: &BatchReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_summary(report);
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                if !self.quiet {
                    self.print_plain_summary(report);
                }
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            println!("{}{}", emoji, color_fn(message));
        } else {
            let prefix = match msg_type {
                MessageType::Error => "Error:",
                MessageType::Warning => "Warning:",
                MessageType::Info => "i",
            };

            println!("{} {}", prefix, message);
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, report: &BatchReport) {
        println!();
        self.print_separator();

        let headline = if report.cancelled {
            "Dump cancelled."
        } else {
            "Dump complete."
        };
        if self.use_colors {
            let styled = if report.is_clean() {
                style(headline).green().bold()
            } else {
                style(headline).yellow().bold()
            };
            println!("{}", styled);
        } else {
            println!("{}", headline);
        }

        if self.verbose_level > 0 || !report.is_clean() {
            println!();
            println!("  Files dumped:    {}", report.dumped.len());
            println!("  Bytes copied:    {}", format_bytes(report.total_bytes()));
            println!("  Time taken:      {}", format_duration(report.elapsed()));
            if !report.skipped.is_empty() {
                println!("  Skipped:         {}", report.skipped.len());
            }
            if !report.failures.is_empty() {
                println!("  Failed:          {}", report.failures.len());
            }
        }

        self.print_separator();
    }

    fn print_plain_summary(&self, report: &BatchReport) {
        println!("COMPLETED: Dump");
        println!("Files dumped: {}", report.dumped.len());
        println!("Bytes copied: {}", report.total_bytes());
        println!("Duration: {:?}", report.elapsed());
        if !report.skipped.is_empty() {
            println!("Skipped: {}", report.skipped.len());
        }
        if !report.failures.is_empty() {
            println!("Failed: {}", report.failures.len());
        }
        if report.cancelled {
            println!("Cancelled: true");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Error,
    Warning,
    Info,
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_non_human_modes_have_no_colors() {
        assert!(!OutputFormatter::new(OutputMode::Json, 0, false).use_colors);
        assert!(!OutputFormatter::new(OutputMode::Plain, 0, false).use_colors);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let quiet_formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
    }
}

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which of the two dump artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Text,
    Binary,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Text => write!(f, "text"),
            OutputKind::Binary => write!(f, "binary"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("No files provided")]
    NoFilesProvided,

    #[error("File {} does not exist", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Could not get current working directory: {source}")]
    WorkingDirectory {
        #[source]
        source: std::io::Error,
    },

    #[error("Could not create output {kind} file {}: {source}", .path.display())]
    CreateOutput {
        kind: OutputKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not open file {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing to output {kind} file {}: {source}", .path.display())]
    Write {
        kind: OutputKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path has no file name: {}", .path.display())]
    InvalidPath { path: PathBuf },

    #[error("Invalid hex dump at offset {offset}: {message}")]
    InvalidHex { offset: usize, message: String },

    #[error("Verification failed for {}: {message}", .path.display())]
    VerificationFailed { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl DumpError {
    pub(crate) fn create_output(kind: OutputKind, path: &Path, source: std::io::Error) -> Self {
        DumpError::CreateOutput {
            kind,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(kind: OutputKind, path: &Path, source: std::io::Error) -> Self {
        DumpError::Write {
            kind,
            path: path.to_path_buf(),
            source,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for DumpError {
    fn user_message(&self) -> String {
        match self {
            DumpError::NoFilesProvided => {
                "No files provided. Please drag and drop an executable file.".to_string()
            }
            DumpError::FileNotFound { path } => {
                format!("File {} does not exist. Skipping.", path.display())
            }
            DumpError::CreateOutput { kind, path, source } => {
                format!(
                    "Could not create output {} file {}: {}",
                    kind,
                    path.display(),
                    source
                )
            }
            DumpError::OpenInput { path, source } => {
                format!("Could not open file {}: {}", path.display(), source)
            }
            DumpError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            DumpError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            DumpError::NoFilesProvided => Some(
                "Pass one or more file paths as arguments, or drop files into the prompt (separate several with the system path-list separator).".to_string()
            ),
            DumpError::FileNotFound { .. } => Some(
                "Check the path for typos. Surrounding quotes are removed automatically.".to_string()
            ),
            DumpError::WorkingDirectory { .. } => Some(
                "The current directory may have been removed. Run from an existing directory or use --output-dir.".to_string()
            ),
            DumpError::CreateOutput { .. } => Some(
                "Ensure you have write permission in the output directory, or choose another one with --output-dir.".to_string()
            ),
            DumpError::OpenInput { .. } => Some(
                "Ensure the input file is readable by the current user.".to_string()
            ),
            DumpError::Config { .. } => Some(
                "Check your configuration file syntax and values, or regenerate one with --generate-config.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for DumpError {
    fn from(error: toml::de::Error) -> Self {
        DumpError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DumpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_user_friendly_messages() {
        let error = DumpError::FileNotFound {
            path: PathBuf::from("missing.exe"),
        };
        assert!(error.user_message().contains("missing.exe"));
        assert!(error.user_message().contains("Skipping"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_error_carries_cause() {
        let error = DumpError::create_output(
            OutputKind::Binary,
            Path::new("out_dump.bin"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = error.to_string();
        assert!(message.contains("binary"));
        assert!(message.contains("out_dump.bin"));
        assert!(message.contains("denied"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let error = DumpError::from(toml_error);
        assert!(matches!(error, DumpError::Config { .. }));
    }
}

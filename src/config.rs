use crate::error::{DumpError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CHUNK_SIZE: usize = 4096;
/// Largest accepted chunk size. The read buffer and the hex line are both
/// allocated up front from it.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub dump: DumpConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DumpConfig {
    pub chunk_size: usize,
    pub text_suffix: String,
    pub binary_suffix: String,
    pub preserve_mtime: bool,
    pub verify: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where dumps are written. Unset means the current working directory.
    pub directory: Option<PathBuf>,
    pub pause_on_exit: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            text_suffix: "_dump.txt".to_string(),
            binary_suffix: "_dump.bin".to_string(),
            preserve_mtime: false,
            verify: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            pause_on_exit: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DumpError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DumpError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| DumpError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["bindump.toml", ".bindump.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(chunk_size) = cli_args.chunk_size {
            self.dump.chunk_size = chunk_size;
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = Some(output_dir.clone());
        }

        if cli_args.verify {
            self.dump.verify = true;
        }

        if cli_args.preserve_mtime {
            self.dump.preserve_mtime = true;
        }

        if cli_args.no_pause {
            self.output.pause_on_exit = false;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| DumpError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| DumpError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.dump.chunk_size == 0 {
            return Err(DumpError::Config {
                message: "Chunk size must be greater than 0".to_string(),
            });
        }

        if self.dump.chunk_size > MAX_CHUNK_SIZE {
            return Err(DumpError::Config {
                message: format!(
                    "Chunk size {} exceeds the maximum of {} bytes",
                    self.dump.chunk_size, MAX_CHUNK_SIZE
                ),
            });
        }

        for (name, suffix) in [
            ("text_suffix", &self.dump.text_suffix),
            ("binary_suffix", &self.dump.binary_suffix),
        ] {
            if suffix.is_empty() {
                return Err(DumpError::Config {
                    message: format!("{} must not be empty", name),
                });
            }
            if suffix.contains('/') || suffix.contains('\\') {
                return Err(DumpError::Config {
                    message: format!("{} must not contain path separators: {}", name, suffix),
                });
            }
        }

        if self.dump.text_suffix == self.dump.binary_suffix {
            return Err(DumpError::Config {
                message: "text_suffix and binary_suffix must differ".to_string(),
            });
        }

        if let Some(ref dir) = self.output.directory {
            if !dir.is_dir() {
                return Err(DumpError::Config {
                    message: format!("Output directory does not exist: {}", dir.display()),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub chunk_size: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub verify: bool,
    pub preserve_mtime: bool,
    pub no_pause: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: Option<usize>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }

    pub fn with_no_pause(mut self, no_pause: bool) -> Self {
        self.no_pause = no_pause;
        self
    }
}

use crate::config::{DumpConfig, MAX_CHUNK_SIZE};
use crate::dumper::hex;
use crate::error::{DumpError, OutputKind, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Byte counters handed to the progress callback after every chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkProgress {
    pub bytes_written: u64,
    pub chunks_written: u64,
    pub total_bytes: u64,
}

/// Result of dumping one input file.
#[derive(Debug, Clone, Serialize)]
pub struct DumpOutcome {
    pub input: PathBuf,
    pub text_output: PathBuf,
    pub binary_output: PathBuf,
    pub bytes: u64,
    pub chunks: u64,
}

pub struct Dumper {
    chunk_size: usize,
    text_suffix: String,
    binary_suffix: String,
    output_dir: Option<PathBuf>,
    preserve_mtime: bool,
    verify: bool,
}

impl Dumper {
    pub fn new() -> Self {
        Self::from_config(&DumpConfig::default())
    }

    pub fn from_config(config: &DumpConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.clamp(1, MAX_CHUNK_SIZE),
            text_suffix: config.text_suffix.clone(),
            binary_suffix: config.binary_suffix.clone(),
            output_dir: None,
            preserve_mtime: config.preserve_mtime,
            verify: config.verify,
        }
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Directory the dumps land in: the configured one, else the current
    /// working directory.
    pub fn resolve_output_dir(&self) -> Result<PathBuf> {
        match self.output_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(|source| DumpError::WorkingDirectory { source }),
        }
    }

    /// Returns the `(text, binary)` output paths for `input` inside `output_dir`.
    pub fn output_paths(&self, input: &Path, output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let base_name = input.file_name().ok_or_else(|| DumpError::InvalidPath {
            path: input.to_path_buf(),
        })?;

        let mut text_name = base_name.to_os_string();
        text_name.push(&self.text_suffix);
        let mut binary_name = base_name.to_os_string();
        binary_name.push(&self.binary_suffix);

        Ok((output_dir.join(text_name), output_dir.join(binary_name)))
    }

    pub fn dump(&self, input: &Path) -> Result<DumpOutcome> {
        self.dump_with_progress(input, None)
    }

    /// Streams `input` into its text and binary dumps. The callback runs
    /// after each chunk; an error from it aborts the dump.
    pub fn dump_with_progress(
        &self,
        input: &Path,
        progress_callback: Option<&dyn Fn(&ChunkProgress) -> Result<()>>,
    ) -> Result<DumpOutcome> {
        let output_dir = self.resolve_output_dir()?;
        let (text_path, binary_path) = self.output_paths(input, &output_dir)?;

        let text_file = File::create(&text_path)
            .map_err(|e| DumpError::create_output(OutputKind::Text, &text_path, e))?;
        let binary_file = File::create(&binary_path)
            .map_err(|e| DumpError::create_output(OutputKind::Binary, &binary_path, e))?;

        let source_file = File::open(input).map_err(|source| DumpError::OpenInput {
            path: input.to_path_buf(),
            source,
        })?;
        let total_bytes = source_file.metadata().map(|m| m.len()).unwrap_or(0);

        log::debug!(
            "dumping {} ({} bytes) in chunks of {}",
            input.display(),
            total_bytes,
            self.chunk_size
        );

        let mut reader = BufReader::with_capacity(self.chunk_size, source_file);
        let mut text_writer = BufWriter::new(text_file);
        let mut binary_writer = BufWriter::new(binary_file);

        let mut buffer = vec![0u8; self.chunk_size];
        let mut line = Vec::with_capacity(self.chunk_size * 3 + 1);
        let mut progress = ChunkProgress {
            total_bytes,
            ..ChunkProgress::default()
        };

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(DumpError::Read {
                        path: input.to_path_buf(),
                        source,
                    })
                }
            };
            let chunk = &buffer[..bytes_read];

            line.clear();
            hex::encode_line(chunk, &mut line);
            text_writer
                .write_all(&line)
                .map_err(|e| DumpError::write(OutputKind::Text, &text_path, e))?;

            binary_writer
                .write_all(chunk)
                .map_err(|e| DumpError::write(OutputKind::Binary, &binary_path, e))?;

            progress.bytes_written += bytes_read as u64;
            progress.chunks_written += 1;

            if let Some(callback) = progress_callback {
                callback(&progress)?;
            }
        }

        text_writer
            .flush()
            .map_err(|e| DumpError::write(OutputKind::Text, &text_path, e))?;
        binary_writer
            .flush()
            .map_err(|e| DumpError::write(OutputKind::Binary, &binary_path, e))?;
        drop(text_writer);
        drop(binary_writer);

        if self.preserve_mtime {
            if let Ok(modified_time) = fs::metadata(input).and_then(|m| m.modified()) {
                let _ = filetime::set_file_mtime(
                    &binary_path,
                    filetime::FileTime::from_system_time(modified_time),
                );
            }
        }

        let outcome = DumpOutcome {
            input: input.to_path_buf(),
            text_output: text_path,
            binary_output: binary_path,
            bytes: progress.bytes_written,
            chunks: progress.chunks_written,
        };

        if self.verify {
            verify_outcome(&outcome)?;
        }

        log::info!(
            "dumped {} bytes from {} in {} chunks",
            outcome.bytes,
            input.display(),
            outcome.chunks
        );

        Ok(outcome)
    }
}

impl Default for Dumper {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that the two dumps of `outcome` agree with each other and with the
/// byte count of the run. The input is only read again when it is a regular
/// file; pipes and devices cannot be replayed.
pub fn verify_outcome(outcome: &DumpOutcome) -> Result<()> {
    let mismatch = |message: &str| DumpError::VerificationFailed {
        path: outcome.input.clone(),
        message: message.to_string(),
    };

    let binary = fs::read(&outcome.binary_output).map_err(|source| DumpError::Read {
        path: outcome.binary_output.clone(),
        source,
    })?;
    let text = fs::read_to_string(&outcome.text_output).map_err(|source| DumpError::Read {
        path: outcome.text_output.clone(),
        source,
    })?;

    if binary.len() as u64 != outcome.bytes {
        return Err(mismatch("binary dump length differs from bytes read"));
    }

    let decoded = hex::decode_dump(&text).map_err(|e| mismatch(&e.to_string()))?;
    if decoded != binary {
        return Err(mismatch("text dump does not decode to the binary dump"));
    }

    let replayable = fs::metadata(&outcome.input)
        .map(|m| m.is_file())
        .unwrap_or(false);
    if replayable {
        let original = fs::read(&outcome.input).map_err(|source| DumpError::Read {
            path: outcome.input.clone(),
            source,
        })?;
        if binary != original {
            return Err(mismatch("binary dump differs from input"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn write_input(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_dump_small_file() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let input = write_input(input_dir.path(), "sample.exe", &[0x00, 0x1A, 0xFF]);

        let dumper = Dumper::new().with_output_dir(Some(output_dir.path().to_path_buf()));
        let outcome = dumper.dump(&input).unwrap();

        assert_eq!(outcome.text_output, output_dir.path().join("sample.exe_dump.txt"));
        assert_eq!(outcome.binary_output, output_dir.path().join("sample.exe_dump.bin"));
        assert_eq!(outcome.bytes, 3);
        assert_eq!(outcome.chunks, 1);

        assert_eq!(fs::read_to_string(&outcome.text_output).unwrap(), "00 1A FF \n");
        assert_eq!(fs::read(&outcome.binary_output).unwrap(), vec![0x00, 0x1A, 0xFF]);
    }

    #[test]
    fn test_one_line_per_chunk() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let content: Vec<u8> = (0u8..10).collect();
        let input = write_input(input_dir.path(), "ten", &content);

        let dumper = Dumper::new()
            .with_chunk_size(4)
            .with_output_dir(Some(output_dir.path().to_path_buf()));
        let outcome = dumper.dump(&input).unwrap();

        assert_eq!(outcome.chunks, 3);
        let text = fs::read_to_string(&outcome.text_output).unwrap();
        assert_eq!(text, "00 01 02 03 \n04 05 06 07 \n08 09 \n");
        assert_eq!(fs::read(&outcome.binary_output).unwrap(), content);
    }

    #[test]
    fn test_large_file_round_trips() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let content: Vec<u8> = (0..10_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let input = write_input(input_dir.path(), "big.bin", &content);

        let dumper = Dumper::new().with_output_dir(Some(output_dir.path().to_path_buf()));
        let outcome = dumper.dump(&input).unwrap();

        assert_eq!(outcome.bytes, 10_000);
        assert_eq!(fs::read(&outcome.binary_output).unwrap(), content);

        let text = fs::read_to_string(&outcome.text_output).unwrap();
        assert!(text.lines().all(|l| l.len() <= 4096 * 3));
        assert_eq!(hex::decode_dump(&text).unwrap(), content);
    }

    #[test]
    fn test_empty_file() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let input = write_input(input_dir.path(), "empty", &[]);

        let dumper = Dumper::new().with_output_dir(Some(output_dir.path().to_path_buf()));
        let outcome = dumper.dump(&input).unwrap();

        assert_eq!(outcome.bytes, 0);
        assert_eq!(outcome.chunks, 0);
        assert!(fs::read(&outcome.binary_output).unwrap().is_empty());
        assert!(fs::read_to_string(&outcome.text_output).unwrap().trim().is_empty());
    }

    #[test]
    fn test_existing_outputs_are_truncated() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let input = write_input(input_dir.path(), "a", &[0xAB]);
        fs::write(output_dir.path().join("a_dump.bin"), vec![0u8; 100]).unwrap();
        fs::write(output_dir.path().join("a_dump.txt"), "stale content\n").unwrap();

        let dumper = Dumper::new().with_output_dir(Some(output_dir.path().to_path_buf()));
        let outcome = dumper.dump(&input).unwrap();

        assert_eq!(fs::read(&outcome.binary_output).unwrap(), vec![0xAB]);
        assert_eq!(fs::read_to_string(&outcome.text_output).unwrap(), "AB \n");
    }

    #[test]
    fn test_open_failure_is_reported() {
        let output_dir = TempDir::new().unwrap();
        let missing = output_dir.path().join("missing.exe");

        let dumper = Dumper::new().with_output_dir(Some(output_dir.path().to_path_buf()));
        let result = dumper.dump(&missing);

        assert!(matches!(result, Err(DumpError::OpenInput { .. })));
    }

    #[test]
    fn test_create_failure_is_reported() {
        let input_dir = TempDir::new().unwrap();
        let input = write_input(input_dir.path(), "a", &[1, 2, 3]);
        let not_a_dir = input_dir.path().join("nowhere");

        let dumper = Dumper::new().with_output_dir(Some(not_a_dir));
        let result = dumper.dump(&input);

        match result {
            Err(DumpError::CreateOutput { kind, .. }) => assert_eq!(kind, OutputKind::Text),
            other => panic!("expected CreateOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_path_without_file_name() {
        let dumper = Dumper::new();
        let result = dumper.output_paths(Path::new("/"), Path::new("/tmp"));
        assert!(matches!(result, Err(DumpError::InvalidPath { .. })));
    }

    #[test]
    fn test_progress_callback_and_cancellation() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let input = write_input(input_dir.path(), "data", &[7u8; 20]);
        let dumper = Dumper::new()
            .with_chunk_size(5)
            .with_output_dir(Some(output_dir.path().to_path_buf()));

        let calls = Cell::new(0u64);
        let counting = |p: &ChunkProgress| -> Result<()> {
            calls.set(calls.get() + 1);
            assert_eq!(p.total_bytes, 20);
            assert_eq!(p.bytes_written, p.chunks_written * 5);
            Ok(())
        };
        dumper.dump_with_progress(&input, Some(&counting)).unwrap();
        assert_eq!(calls.get(), 4);

        let cancel = |_: &ChunkProgress| -> Result<()> { Err(DumpError::Cancelled) };
        let result = dumper.dump_with_progress(&input, Some(&cancel));
        assert!(matches!(result, Err(DumpError::Cancelled)));
    }

    #[test]
    fn test_verify_and_preserve_mtime() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let input = write_input(input_dir.path(), "v.bin", b"hello world");
        let old = filetime::FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&input, old).unwrap();

        let dumper = Dumper::new()
            .with_verify(true)
            .with_preserve_mtime(true)
            .with_output_dir(Some(output_dir.path().to_path_buf()));
        let outcome = dumper.dump(&input).unwrap();

        let metadata = fs::metadata(&outcome.binary_output).unwrap();
        assert_eq!(filetime::FileTime::from_last_modification_time(&metadata), old);

        fs::write(&outcome.text_output, "00 \n").unwrap();
        assert!(matches!(
            verify_outcome(&outcome),
            Err(DumpError::VerificationFailed { .. })
        ));
    }

    #[test]
    fn test_verify_without_replayable_input() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let input = write_input(input_dir.path(), "once.bin", b"\x01\x02\xfe");

        let dumper = Dumper::new().with_output_dir(Some(output_dir.path().to_path_buf()));
        let outcome = dumper.dump(&input).unwrap();

        // The outputs still vouch for each other once the input is gone.
        fs::remove_file(&input).unwrap();
        assert!(verify_outcome(&outcome).is_ok());

        fs::write(&outcome.binary_output, b"\x01\x02").unwrap();
        assert!(matches!(
            verify_outcome(&outcome),
            Err(DumpError::VerificationFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_stream_input() {
        let output_dir = TempDir::new().unwrap();
        let dumper = Dumper::new()
            .with_verify(true)
            .with_output_dir(Some(output_dir.path().to_path_buf()));

        let outcome = dumper.dump(Path::new("/dev/null")).unwrap();
        assert_eq!(outcome.bytes, 0);
        assert!(verify_outcome(&outcome).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_input_is_a_read_error() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let dumper = Dumper::new().with_output_dir(Some(output_dir.path().to_path_buf()));

        match dumper.dump(input_dir.path()) {
            Err(DumpError::Read { path, .. }) => assert_eq!(path, input_dir.path()),
            other => panic!("expected Read, got {:?}", other),
        }
    }
}

use crate::cli::parse_path_list;
use crate::ui::OutputFormatter;
use std::io::{self, BufRead};
use std::path::PathBuf;

pub const PATHS_PROMPT: &str =
    "Please drag and drop an executable file into this console, then press Enter to proceed:";
pub const EXIT_PROMPT: &str = "Press Enter to exit.";

/// Line-oriented console interaction over any `BufRead`, so the prompt flow
/// can be driven from tests.
pub struct Prompt<R> {
    reader: R,
}

impl Prompt<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> Prompt<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Prints the path prompt and parses the answer. End of input counts as
    /// an empty answer.
    pub fn ask_for_paths(&mut self, formatter: &OutputFormatter) -> io::Result<Vec<PathBuf>> {
        formatter.prompt(PATHS_PROMPT);
        let line = self.read_line()?;
        Ok(parse_path_list(&line))
    }

    /// Blocks until the user presses Enter or input ends.
    pub fn wait_for_exit(&mut self, formatter: &OutputFormatter) -> io::Result<()> {
        formatter.prompt(EXIT_PROMPT);
        self.read_line().map(|_| ())
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::OutputMode;
    use std::io::Cursor;

    #[test]
    fn test_ask_for_paths_strips_quotes() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 0, true);
        let mut prompt = Prompt::new(Cursor::new("\"a.exe\"\nsecond line\n"));

        let paths = prompt.ask_for_paths(&formatter).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.exe")]);
    }

    #[test]
    fn test_end_of_input_yields_no_paths() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 0, true);
        let mut prompt = Prompt::new(Cursor::new(""));

        assert!(prompt.ask_for_paths(&formatter).unwrap().is_empty());
        assert!(prompt.wait_for_exit(&formatter).is_ok());
    }
}

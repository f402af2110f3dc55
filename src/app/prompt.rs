use crate::app::models::InputMode;
use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};

/// Invalid mode answers tolerated before giving up.
pub const MAX_MODE_ATTEMPTS: usize = 5;

const MODE_QUESTION: &str = "Will you be providing a .csv of files to inventory, or would you like to search a directory for files? Enter one of options [csv|directory]";

/// Line-oriented question/answer over any reader and writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `question` and returns the trimmed answer, or `None` on end of input.
    pub fn ask(&mut self, question: &str) -> Result<Option<String>> {
        writeln!(self.output, "{}", question).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Asks for the input mode until a valid one is given or attempts run out.
    pub fn select_mode(&mut self) -> Result<InputMode> {
        for _ in 0..MAX_MODE_ATTEMPTS {
            let Some(answer) = self.ask(MODE_QUESTION)? else {
                bail!("Input closed before an input mode was chosen");
            };
            if let Some(mode) = InputMode::parse(&answer) {
                return Ok(mode);
            }
            writeln!(
                self.output,
                "INPUT ERROR: Input '{}' does not match any of valid options [csv|directory]",
                answer
            )
            .context("Failed to write prompt")?;
        }
        bail!(
            "No valid input mode after {} attempts; expected one of [csv|directory]",
            MAX_MODE_ATTEMPTS
        )
    }

    pub fn ask_input_path(&mut self, mode: InputMode) -> Result<Option<String>> {
        let question = match mode {
            InputMode::Csv => {
                "Please enter the absolute path to the csv to create the inventory from"
            }
            InputMode::Directory => {
                "Please enter the absolute path to the directory you would like to inventory"
            }
        };
        self.ask(question)
    }

    pub fn ask_output_directory(&mut self) -> Result<Option<String>> {
        self.ask("Please enter the absolute path of the directory where you would like your inventory .csv file to be saved.")
    }
}

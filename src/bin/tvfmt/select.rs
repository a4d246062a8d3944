use std::io::{self, BufRead, StdinLock, Stdout, Write};

use anyhow::{Context, Result};
use colored::Colorize;

/// Interactive choices made by the user.
pub trait Selector {
    /// Ask for free-text input.
    /// Returns `None` for empty input or end of input.
    fn text(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Ask the user to pick one of the choices.
    /// Returns the index of the chosen item, or `None` if cancelled.
    fn select(&mut self, prompt: &str, choices: &[String]) -> Result<Option<usize>>;

    /// Ask a yes/no question. Anything other than yes declines.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Line-based selector reading answers from `input` and printing prompts to `output`.
pub struct TerminalSelector<R, W> {
    input: R,
    output: W,
}

impl TerminalSelector<StdinLock<'static>, Stdout> {
    /// Selector for the interactive terminal.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalSelector<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print the prompt and read one line. Returns `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{} {} ", "?".green().bold(), prompt.bold()).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush output")?;

        let mut line = String::new();
        let bytes = self.input.read_line(&mut line).context("Failed to read input")?;
        if bytes == 0 {
            writeln!(self.output).context("Failed to write output")?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Selector for TerminalSelector<R, W> {
    fn text(&mut self, prompt: &str) -> Result<Option<String>> {
        Ok(self.ask(&format!("{prompt}:"))?.filter(|answer| !answer.is_empty()))
    }

    fn select(&mut self, prompt: &str, choices: &[String]) -> Result<Option<usize>> {
        if choices.is_empty() {
            return Ok(None);
        }

        writeln!(self.output, "{} {}", "?".green().bold(), prompt.bold()).context("Failed to write prompt")?;
        let width = choices.len().to_string().len();
        for (index, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>width$}) {choice}", index + 1).context("Failed to write choices")?;
        }

        let hint = format!("[1-{}, Enter = 1, q = cancel]", choices.len());
        loop {
            let Some(answer) = self.ask(&hint.dimmed().to_string())? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(0));
            }
            if answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(number) if (1..=choices.len()).contains(&number) => return Ok(Some(number - 1)),
                _ => writeln!(self.output, "{}", format!("Invalid choice: {answer}").yellow())
                    .context("Failed to write output")?,
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.ask(&format!("{prompt} {}", "(y/N)".dimmed()))?;
        Ok(answer.is_some_and(|answer| answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")))
    }
}

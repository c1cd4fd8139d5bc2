//! Line-oriented operator prompts.
//!
//! Generic over the reader and writer so the interactive flow runs against
//! in-memory buffers in tests.

use std::io::{BufRead, Write};

use crate::error::{ProvisionError, ProvisionResult};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Free-text answer. Empty input returns `default` (or an empty string).
    pub fn input(&mut self, message: &str, default: Option<&str>) -> ProvisionResult<String> {
        match default {
            Some(d) if !d.is_empty() => self.write(&format!("{message} [{d}]: "))?,
            _ => self.write(&format!("{message}: "))?,
        }
        let answer = self.read_line()?;
        if answer.is_empty() {
            Ok(default.unwrap_or_default().to_string())
        } else {
            Ok(answer)
        }
    }

    /// Positive integer answer, re-asked until it parses. Empty keeps `default`.
    pub fn number(&mut self, message: &str, default: u32) -> ProvisionResult<u32> {
        loop {
            self.write(&format!("{message} [{default}]: "))?;
            let answer = self.read_line()?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<u32>() {
                Ok(n) if n > 0 => return Ok(n),
                _ => self.write(&format!("invalid number: {answer}\n"))?,
            }
        }
    }

    /// Forced single choice, re-asked until a listed number is entered.
    /// Returns the zero-based index of the chosen option.
    pub fn select(&mut self, message: &str, options: &[&str]) -> ProvisionResult<usize> {
        loop {
            self.write(&format!("{message}\n"))?;
            for (i, option) in options.iter().enumerate() {
                self.write(&format!("  {}) {option}\n", i + 1))?;
            }
            self.write(&format!("Choice [1-{}]: ", options.len()))?;
            let answer = self.read_line()?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => self.write(&format!("invalid choice: {answer}\n"))?,
            }
        }
    }

    fn write(&mut self, text: &str) -> ProvisionResult<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> ProvisionResult<String> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line)?;
        if n == 0 {
            return Err(ProvisionError::Prompt("unexpected end of input".into()));
        }
        Ok(line.trim().to_string())
    }
}

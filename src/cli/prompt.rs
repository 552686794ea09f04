use std::{
    env,
    io::{self, BufRead, StdinLock, Stdout, Write},
    process::Command,
};

use ansi_term::{Colour, Style};
use anyhow::{bail, Context, Result};

#[cfg(windows)]
const DEFAULT_EDITOR: &str = "notepad";
#[cfg(not(windows))]
const DEFAULT_EDITOR: &str = "vi";

/// Interface for asking the user questions. Validation is up to the caller, which reports
/// problems through [Prompter::invalid] and asks again.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    fn input(&mut self, message: &str) -> Result<String>;

    fn confirm(&mut self, message: &str) -> Result<bool>;

    /// Returns the chosen values, possibly none.
    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Vec<String>>;

    /// Lets the user write free text in their editor.
    fn editor(&mut self, message: &str) -> Result<String>;

    fn invalid(&mut self, message: &str) -> Result<()>;
}

/// Line based [Prompter] for terminals.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, message: &str, hint: &str) -> Result<()> {
        write!(
            self.output,
            "{} {} ",
            Colour::Green.bold().paint("?"),
            Style::new().bold().paint(message)
        )?;
        if !hint.is_empty() {
            write!(self.output, "{} ", Colour::Fixed(8).paint(hint))?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("Input was closed before the entry was finished");
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn input(&mut self, message: &str) -> Result<String> {
        self.ask(message, "")?;
        self.read_line()
    }

    fn confirm(&mut self, message: &str) -> Result<bool> {
        loop {
            self.ask(message, "(y/N)")?;
            match self.read_line()?.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "" | "n" | "no" => return Ok(false),
                _ => self.invalid("Please answer y or n.")?,
            }
        }
    }

    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Vec<String>> {
        loop {
            writeln!(
                self.output,
                "{} {}",
                Colour::Green.bold().paint("?"),
                Style::new().bold().paint(message)
            )?;
            for (index, choice) in choices.iter().enumerate() {
                writeln!(self.output, "  {:>2}) {choice}", index + 1)?;
            }
            self.ask(">", "(numbers separated by commas)")?;

            match parse_selection(&self.read_line()?, choices.len()) {
                Ok(indices) => {
                    return Ok(indices.into_iter().map(|v| choices[v].clone()).collect())
                }
                Err(reason) => self.invalid(&reason)?,
            }
        }
    }

    fn editor(&mut self, message: &str) -> Result<String> {
        writeln!(self.output, "{}", Style::new().bold().paint(message))?;
        self.output.flush()?;
        open_editor()
    }

    fn invalid(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{} {message}", Colour::Red.paint(">>"))?;
        Ok(())
    }
}

/// Turns an answer like `1, 3 4` into zero based indices. Repeated numbers count once.
pub fn parse_selection(answer: &str, choice_count: usize) -> Result<Vec<usize>, String> {
    let mut indices = vec![];
    for part in answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|v| !v.is_empty())
    {
        let number = part
            .parse::<usize>()
            .map_err(|_| format!("{part:?} isn't a number."))?;
        if number == 0 || number > choice_count {
            return Err(format!("Choose numbers between 1 and {choice_count}."));
        }
        if !indices.contains(&(number - 1)) {
            indices.push(number - 1);
        }
    }
    Ok(indices)
}

/// Opens `$VISUAL` or `$EDITOR` on a temporary file and returns what was written.
fn open_editor() -> Result<String> {
    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| DEFAULT_EDITOR.into());
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(DEFAULT_EDITOR);

    let file = tempfile::Builder::new()
        .prefix("auralog-")
        .suffix(".md")
        .tempfile()?;
    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to start editor {editor:?}"))?;
    if !status.success() {
        bail!("Editor {editor:?} exited with {status}");
    }
    Ok(std::fs::read_to_string(file.path())?)
}

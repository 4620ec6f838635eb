//! User input boundary. The controller asks questions through [`Prompter`];
//! the terminal implementation reads lines, tests feed scripted answers.

use crate::Result;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Prompter {
    /// Ask for a value. An empty answer yields `default`; `None` means the
    /// user cancelled (end of input).
    fn ask(&mut self, question: &str, default: &str) -> Result<Option<String>>;

    /// Yes/no question, anything but an explicit yes counts as no.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Ask for a value that has no default, such as a password.
    fn ask_secret(&mut self, question: &str) -> Result<Option<String>> {
        self.ask(question, "")
    }
}

/// Line-oriented prompter over any reader/writer pair, stdin/stdout by default.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

pub type StdinPrompter = LinePrompter<io::StdinLock<'static>, io::Stdout>;

impl StdinPrompter {
    pub fn stdio() -> Self {
        LinePrompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one line; `None` on end of input.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, question: &str, default: &str) -> Result<Option<String>> {
        write!(self.output, "{} [{}]: ", question.trim_end(), default)?;
        self.output.flush()?;

        Ok(self.read_line()?.map(|answer| {
            if answer.is_empty() {
                default.to_string()
            } else {
                answer
            }
        }))
    }

    fn ask_secret(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{}: ", question.trim_end())?;
        self.output.flush()?;
        self.read_line()
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{} [y/N]: ", question)?;
        self.output.flush()?;

        Ok(matches!(
            self.read_line()?.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        ))
    }
}

/// Replays a fixed list of answers. `None` entries and an exhausted script
/// behave like a cancelled prompt; empty strings take the default.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| Some(a.into())).collect(),
            questions: Vec::new(),
        }
    }

    pub fn push_cancel(&mut self) {
        self.answers.push_back(None);
    }

    /// Every question asked so far, in order.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str, default: &str) -> Result<Option<String>> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front().flatten().map(|answer| {
            if answer.trim().is_empty() {
                default.to_string()
            } else {
                answer.trim().to_string()
            }
        }))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        Ok(matches!(
            self.answers
                .pop_front()
                .flatten()
                .map(|a| a.trim().to_ascii_lowercase())
                .as_deref(),
            Some("y" | "yes")
        ))
    }
}

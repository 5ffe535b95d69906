//! Console prompts

use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

/// Source of answers to interactive questions
pub trait Prompter {
    /// Show `question` and return the trimmed answer
    ///
    /// An empty answer is allowed so defaults can apply.
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Ask for a value that must not be echoed
    fn ask_secret(&mut self, question: &str) -> io::Result<String> {
        self.ask(question)
    }

    /// Ask a yes/no question; only `y` (any case) means yes
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(self.ask(question)?.eq_ignore_ascii_case("y"))
    }

    /// Ask a question, falling back to `default` on an empty answer
    fn ask_or(&mut self, question: &str, default: &str) -> io::Result<String> {
        let answer = self.ask(question)?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }
}

/// Prompter bound to the terminal
pub struct ConsolePrompter {
    theme: ColorfulTheme,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for ConsolePrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)?;
        Ok(answer.trim().to_string())
    }

    fn ask_secret(&mut self, question: &str) -> io::Result<String> {
        let answer = Password::with_theme(&self.theme)
            .with_prompt(question)
            .allow_empty_password(true)
            .interact()
            .map_err(io::Error::other)?;
        Ok(answer.trim().to_string())
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(io::Error::other)
    }
}

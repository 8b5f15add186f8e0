//! Interactive selection over docker's tabular listings.

use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

/// Picks one entry out of a list; implemented by the terminal prompt and by test doubles.
pub trait Chooser {
    /// Return the index of the chosen item. `prompt` may span several lines.
    fn choose(&self, prompt: &str, items: &[String]) -> Result<usize>;
}

/// Arrow-key selector on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalChooser;

impl Chooser for TerminalChooser {
    fn choose(&self, prompt: &str, items: &[String]) -> Result<usize> {
        let theme = ColorfulTheme::default();
        Select::with_theme(&theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .context("interactive selection failed")
    }
}

//! Reviewer command parsing for the terminal front end.

/// One line of reviewer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a navigation keyword; validated by the core.
    Submit(String),
    Back,
    Skip,
    ToggleResample,
    Quit,
    Help,
}

impl Command {
    /// Parses one input line with its line terminator already stripped.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "b" | "back" => Self::Back,
            "s" | "skip" => Self::Skip,
            "r" | "resample" => Self::ToggleResample,
            "q" | "quit" => Self::Quit,
            "?" | "h" | "help" => Self::Help,
            _ => Self::Submit(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
commands:
  <digit>     score the current image (empty line scores 0)
  b, back     go back one image to correct its last score
  s, skip     skip ahead to the next unscored image
  r, resample toggle resampling of already scored images
  q, quit     save and quit
  ?, help     show this help";

use nu_ansi_term::Style;

use crate::cli::ColorMode;
use crate::color;

/// Renders the line being typed in the user's text style. Slash commands are
/// dimmed so they stand apart from chat messages.
#[derive(Default)]
pub(crate) struct Highlighter;

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> reedline::StyledText {
        let style = match color::color_mode() {
            ColorMode::Off => Style::new(),
            ColorMode::On if line.starts_with('/') => *color::DIM,
            ColorMode::On => *color::USER_TEXT,
        };

        reedline::StyledText {
            buffer: vec![(style, line.to_string())],
        }
    }
}

use std::io::{self, IsTerminal};

use crate::RequestedColorMode;

pub(crate) mod chat;
pub(crate) mod personas;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ColorMode {
    On,
    Off,
}

impl ColorMode {
    /// Returns whether ANSI color should be used on standard output.
    /// See [`ColorMode::resolve`].
    pub(crate) fn resolve_auto(cm: RequestedColorMode) -> ColorMode {
        let no_color = std::env::var_os("NO_COLOR").is_some();

        ColorMode::resolve(cm, no_color, io::stdout().is_terminal())
    }

    /// An explicit preference from the command line is always honored.
    /// Otherwise color is disabled by the "NO_COLOR" environment variable and
    /// enabled only when the output is a terminal.
    fn resolve(cm: RequestedColorMode, no_color: bool, is_terminal: bool) -> ColorMode {
        match cm {
            RequestedColorMode::Auto if no_color || !is_terminal => ColorMode::Off,
            RequestedColorMode::Auto => ColorMode::On,
            RequestedColorMode::On => ColorMode::On,
            RequestedColorMode::Off => ColorMode::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_color_mode() {
        use RequestedColorMode::*;

        assert_eq!(ColorMode::resolve(Auto, false, true), ColorMode::On);
        assert_eq!(ColorMode::resolve(Auto, true, true), ColorMode::Off);
        assert_eq!(ColorMode::resolve(Auto, false, false), ColorMode::Off);
        assert_eq!(ColorMode::resolve(On, true, false), ColorMode::On);
        assert_eq!(ColorMode::resolve(Off, false, true), ColorMode::Off);
    }
}

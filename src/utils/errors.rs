use crate::color::{self, MaybePaint};
use std::error::Error as StdError;
use std::fmt;

pub const DEFAULT_EXIT_CODE: i32 = 1;

/// Renders an error followed by each of its sources, separated by colons
pub(crate) fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();

    while let Some(err) = source {
        chain.push_str(": ");
        chain.push_str(&err.to_string());

        source = err.source();
    }

    chain
}

pub(crate) fn fmt_error<T: fmt::Display + ?Sized>(f: &mut fmt::Formatter<'_>, text: &T) -> fmt::Result {
    write!(
        f,
        "{} {}",
        color::ERROR_INDICATOR.maybe_paint("error:"),
        color::ERROR_TEXT.maybe_paint(text.to_string())
    )
}

pub(crate) fn fmt_warn<T: fmt::Display + ?Sized>(f: &mut fmt::Formatter<'_>, text: &T) -> fmt::Result {
    write!(
        f,
        "{} {}",
        color::WARNING_INDICATOR.maybe_paint("warning:"),
        color::WARNING_TEXT.maybe_paint(text.to_string())
    )
}

struct Diagnostic<'t> {
    error: bool,
    text: &'t str,
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error {
            fmt_error(f, self.text)
        } else {
            fmt_warn(f, self.text)
        }
    }
}

pub(crate) fn error_internal(text: &str) {
    eprintln!("{}", Diagnostic { error: true, text });
}

pub(crate) fn warn_internal(text: &str) {
    eprintln!("{}", Diagnostic { error: false, text });
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::warn_internal(&formatted);
    })
}

#[macro_export]
macro_rules! die {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::error_internal(&formatted);
        ::std::process::exit($crate::utils::errors::DEFAULT_EXIT_CODE);
    })
}

//! Nice QAS output formatting.

use std::fmt;

use itertools::Itertools;
use log;

const QAS_BANNER_LENGTH: usize = 103;

/// Logs a warning to the `qas-output` logger as well as the default logger.
macro_rules! qas_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::warn!($fmt, $($($arg)*)?);
        log::warn!(target: "qas-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a main output line to the `qas-output` logger.
macro_rules! qas_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "qas-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {qas_output, qas_warn};

/// Writes a nicely formatted section title.
pub(crate) fn write_title(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let length = title.chars().count().max(QAS_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    writeln!(f, "┌──{bar}──┐")?;
    writeln!(f, "│§ {title:^length$} §│")?;
    writeln!(f, "└──{bar}──┘")?;
    Ok(())
}

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted subtitle to the `qas-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    qas_output!("{}", subtitle);
    qas_output!("{}", bar);
}

/// Formats a list of orbital indices compactly, e.g. `[0, 1, 2]`.
pub(crate) fn nice_indices(indices: &[usize]) -> String {
    format!("[{}]", indices.iter().join(", "))
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging QAS outputs nicely.
pub(crate) trait QasOutput: fmt::Debug + fmt::Display {
    /// Logs display output nicely.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            qas_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> QasOutput for T where T: fmt::Debug + fmt::Display {}

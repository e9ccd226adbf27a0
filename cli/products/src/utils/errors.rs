use std::error::Error;

use thiserror::Error;

/// A failure that has already been shown to the user.
///
/// Catalog operations notify the user themselves,
/// `main` only needs to set the exit code.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Reported(pub &'static str);

/// Render an error and all of its sources on a single line.
pub fn display_chain(mut err: &dyn Error) -> String {
    let mut fmt = err.to_string();
    while let Some(source) = err.source() {
        fmt = format!("{fmt}: {source}");
        err = source;
    }
    fmt
}

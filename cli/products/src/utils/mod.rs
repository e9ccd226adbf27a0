use std::io::Stderr;
use std::sync::{LazyLock, Mutex};

pub mod dialog;
pub mod errors;
pub mod init;
pub mod listing;
pub mod message;

/// Shared handle on stderr.
///
/// Log output and interactive prompts both write to stderr,
/// prompts hold the lock while they are shown.
pub static TERMINAL_STDERR: LazyLock<Mutex<Stderr>> =
    LazyLock::new(|| Mutex::new(std::io::stderr()));

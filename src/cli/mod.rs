//! Command-line front end: drives the bundled sample plugin on the
//! in-memory host.

pub mod commands;
pub mod output;
pub mod sample;
pub mod types;

pub use types::{Cli, Commands};

/// Print `err` to stderr and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}

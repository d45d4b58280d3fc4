//! Cargo-style progress output for modsync
//!
//! Displays sync progress in the familiar cargo format:
//! ```text
//!   Requesting server manifest from: http://mods.example.com:8443/
//!   Requesting file: modA-2.0.jar
//!     Finished downloading file: modA-2.0.jar
//!       Synced 12 files in 3.2s
//! ```

use std::io::Write as _;
use std::time::Instant;

use modsync_client::ProgressSink;

/// Print a cargo-style status line
fn print_status(status: &str, message: &str) {
    let mut term = console::Term::stderr();
    let style = console::Style::new().green().bold();
    let _ = writeln!(term, "{:>12} {}", style.apply_to(status), message);
}

/// Progress sink that prints each sync step to stderr
pub struct ConsoleSink {
    start: Instant,
}

impl ConsoleSink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Show the final summary
    pub fn finish(&self, file_count: usize) {
        let elapsed = self.start.elapsed();
        let elapsed_str = if elapsed.as_secs() >= 1 {
            format!("{:.2}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        };
        print_status("Synced", &format!("{file_count} files in {elapsed_str}"));
    }
}

impl ProgressSink for ConsoleSink {
    fn progress(&self, message: &str) {
        let (verb, rest) = message.split_once(' ').unwrap_or((message, ""));
        print_status(verb.trim_end_matches(':'), rest);
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

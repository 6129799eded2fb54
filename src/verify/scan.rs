//! Extraction of output targets from shell script text.

use tracing::trace;

/// The fetch flag whose argument names the output file.
pub const OUTPUT_FLAG: &str = "-O";

/// Returns every token following [`OUTPUT_FLAG`], in script order.
///
/// Blank lines and `#` comments are skipped. Each remaining line is split
/// with POSIX shell quoting rules and no expansion; lines that cannot be
/// tokenized (unbalanced quotes, trailing backslash) are skipped.
#[must_use]
pub fn scan_targets(script: &str) -> Vec<String> {
    let mut targets = Vec::new();
    for (index, raw) in script.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(tokens) = shlex::split(line) else {
            trace!(line = index + 1, "skipping line that cannot be tokenized");
            continue;
        };
        targets.extend(
            tokens
                .windows(2)
                .filter(|pair| pair[0] == OUTPUT_FLAG)
                .map(|pair| pair[1].clone()),
        );
    }
    targets
}

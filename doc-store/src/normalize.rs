//! Text normalization for extracted document pages.
//!
//! PDF extraction tends to emit runs of spaces for justified text and long
//! stretches of blank lines between blocks. Both waste chunk budget.

use tracing::trace;

/// Normalize extracted page text with minimal layout disruption.
///
/// - Drops control characters other than whitespace (NUL, BEL, escape...).
/// - Collapses runs of spaces/tabs inside a line into one space.
/// - Trims each line.
/// - Collapses multiple blank lines into a single one.
/// - Trims leading/trailing blank lines.
pub fn normalize_page(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut blank_run = 0usize;

    for line in s.lines() {
        let line: String = line
            .chars()
            .filter(|c| !c.is_control() || c.is_whitespace())
            .collect();
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");

        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }

        out.push_str(&line);
        out.push('\n');
    }

    let trimmed = out.trim_end().to_string();
    trace!(input_len = s.len(), output_len = trimmed.len(), "normalize_page");
    trimmed
}

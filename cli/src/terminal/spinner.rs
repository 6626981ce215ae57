use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

const TEMPLATE: &str =
    "{spinner:.blue} {msg} {bar:24.green/bright_black} {pos}/{len} {elapsed_precise}";

fn scan_style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICK_STRINGS)
}

/// Turns `span` into the scan progress bar. `total` is the number of probes.
pub fn start_scan_progress(span: &Span, total: u128) {
    span.pb_set_style(&scan_style());
    span.pb_set_length(u64::try_from(total).unwrap_or(u64::MAX));
    span.pb_set_message("You can press 'q' to finish early");
}

pub fn report_scan_progress(span: &Span, open: usize) {
    span.pb_inc(1);
    if open > 0 {
        span.pb_set_message(
            &format!(
                "Found {} so far...",
                format!("{open} open ports").green().bold()
            )
            .color(colors::TEXT_DEFAULT)
            .to_string(),
        );
    }
}

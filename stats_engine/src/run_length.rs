use crate::frequency::percent_of;

pub const DEFAULT_MAX_RUN_LENGTH: usize = 4;

/// Empirical chance that an N-day window is flagged on every day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunLengthProbability {
    pub window: usize,
    /// `None` when the series is shorter than the window.
    pub percent: Option<f64>,
}

/// For N in `2..=max_len`: the share of the `len - N + 1` overlapping windows whose
/// flags are all true, in percent to two decimals.
pub fn run_length_probs(flags: &[bool], max_len: usize) -> Vec<RunLengthProbability> {
    (2..=max_len)
        .map(|window| {
            let percent = if flags.len() < window {
                None
            } else {
                let windows = flags.len() - window + 1;
                let hits = flags
                    .windows(window)
                    .filter(|w| w.iter().all(|&f| f))
                    .count();
                Some(percent_of(hits, windows))
            };
            RunLengthProbability { window, percent }
        })
        .collect()
}

pub fn format_percent(p: Option<f64>) -> String {
    match p {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}

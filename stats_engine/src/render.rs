//! Fixed-width console tables. Nothing here is parsed back.

use std::fmt::Write;

use crate::category::Category;
use crate::frequency::{Distribution, FrequencyTable, JointDistribution, JointTable};

/// Conditions as rows, categories as short-labelled columns:
///
/// ```text
/// Week Type  |    Mon |    Tue | ...
/// ---------------------------------
/// Bullish    |  20.00% |  ...
/// ```
pub fn conditional_table<C: Category, K: Category>(table: &FrequencyTable<C, K>, corner: &str) -> String {
    let cats = table.categories();
    let mut out = String::new();
    let header: Vec<String> = cats.iter().map(|k| format!("{:>6}", k.short_label())).collect();
    let _ = writeln!(out, "{:<10} | {}", corner, header.join(" | "));
    let _ = writeln!(out, "{}", "-".repeat(12 + 8 * cats.len()));
    for (c, dist) in table.groups() {
        let row: Vec<String> = cats.iter().map(|k| format!("{:6.2}%", dist.percent(k))).collect();
        let _ = writeln!(out, "{:<10} | {}", c.label(), row.join(" | "));
    }
    out
}

/// Weekday-by-session style grid for one condition.
pub fn joint_grid<C: Category, R: Category, Col: Category>(
    table: &JointTable<C, R, Col>,
    dist: &JointDistribution<R, Col>,
) -> String {
    let widths: Vec<usize> = table
        .cols()
        .iter()
        .map(|c| c.label().len().max(6))
        .collect();
    let row_width = table
        .rows()
        .iter()
        .map(|r| r.label().len())
        .max()
        .unwrap_or(0)
        .max(9);

    let mut out = String::new();
    let _ = write!(out, "{:<row_width$}", "");
    for (col, w) in table.cols().iter().zip(&widths) {
        let _ = write!(out, "  {:>w$}", col.label(), w = *w);
    }
    out.push('\n');
    for r in table.rows() {
        let _ = write!(out, "{:<row_width$}", r.label());
        for (col, w) in table.cols().iter().zip(&widths) {
            let _ = write!(out, "  {:>w$.2}", dist.percent(r, col), w = *w);
        }
        out.push('\n');
    }
    out
}

/// `  <label>: <pct>%<suffix>` per category.
pub fn distribution_lines<K: Category>(dist: &Distribution<K>, suffix: &str) -> String {
    let mut out = String::new();
    for (k, pct) in dist.iter() {
        let _ = writeln!(out, "  {}: {:.2}%{}", k.short_label(), pct, suffix);
    }
    out
}

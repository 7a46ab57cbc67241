use csv::{ReaderBuilder, WriterBuilder};
use indexmap::IndexMap;
use std::io::Read;
use std::path::Path;

use crate::category::Category;
use crate::error::{ReportError, Result};

/// `count / total` in percent to two decimals, halves rounded up. Worked out in
/// integer hundredths so exact halves such as 23/160 = 14.375 stay halves.
/// An empty total is 0%.
pub fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let (count, total) = (count as u64, total as u64);
    let hundredths = (count * 20_000 + total) / (2 * total);
    hundredths as f64 / 100.0
}

/// `domain` followed by any value from `seen` that it does not already contain,
/// in first-seen order.
fn extend_domain<'a, K: Category + 'a>(domain: &[K], seen: impl Iterator<Item = &'a K>) -> Vec<K> {
    let mut out = domain.to_vec();
    for k in seen {
        if !out.contains(k) {
            out.push(k.clone());
        }
    }
    out
}

/// Counts of one categorical variable over a fixed, ordered domain. Every domain
/// value is present, with an explicit zero when unobserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution<K: Category> {
    total: usize,
    counts: IndexMap<K, usize>,
}

impl<K: Category> Distribution<K> {
    pub fn tabulate<I>(observations: I, domain: &[K]) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut counts: IndexMap<K, usize> = domain.iter().map(|k| (k.clone(), 0)).collect();
        let mut total = 0;
        for k in observations {
            *counts.entry(k).or_insert(0) += 1;
            total += 1;
        }
        Distribution { total, counts }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count(&self, k: &K) -> usize {
        self.counts.get(k).copied().unwrap_or(0)
    }

    /// Share of observations equal to `k`, in percent to two decimals. 0.00 for an
    /// empty distribution.
    pub fn percent(&self, k: &K) -> f64 {
        percent_of(self.count(k), self.total)
    }

    pub fn categories(&self) -> impl Iterator<Item = &K> + '_ {
        self.counts.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> + '_ {
        self.counts.keys().map(move |k| (k, self.percent(k)))
    }

    pub fn labelled(&self) -> IndexMap<String, f64> {
        self.iter().map(|(k, p)| (k.label(), p)).collect()
    }
}

/// One [`Distribution`] per value of a conditioning variable, all sharing the same
/// category columns. Each non-empty group sums to 100%.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable<C: Category, K: Category> {
    domain: Vec<K>,
    groups: IndexMap<C, Distribution<K>>,
}

impl<C: Category, K: Category> FrequencyTable<C, K> {
    /// Tabulate `(condition, category)` pairs. Conditions and categories observed
    /// outside the given domains are appended after them.
    pub fn tabulate<I>(observations: I, conditions: &[C], domain: &[K]) -> Self
    where
        I: IntoIterator<Item = (C, K)>,
    {
        let obs: Vec<(C, K)> = observations.into_iter().collect();
        let domain = extend_domain(domain, obs.iter().map(|(_, k)| k));
        let conditions = extend_domain(conditions, obs.iter().map(|(c, _)| c));

        let groups = conditions
            .into_iter()
            .map(|c| {
                let members = obs.iter().filter(|(oc, _)| *oc == c).map(|(_, k)| k.clone());
                let dist = Distribution::tabulate(members, &domain);
                (c, dist)
            })
            .collect();

        FrequencyTable { domain, groups }
    }

    pub fn categories(&self) -> &[K] {
        &self.domain
    }

    pub fn group(&self, condition: &C) -> Option<&Distribution<K>> {
        self.groups.get(condition)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&C, &Distribution<K>)> + '_ {
        self.groups.iter()
    }

    pub fn percent(&self, condition: &C, k: &K) -> f64 {
        self.group(condition).map(|d| d.percent(k)).unwrap_or(0.0)
    }

    /// condition label -> category label -> percentage
    pub fn labelled(&self) -> IndexMap<String, IndexMap<String, f64>> {
        self.groups
            .iter()
            .map(|(c, d)| (c.label(), d.labelled()))
            .collect()
    }

    /// Wide layout: one row per condition, one column per category, `index_name`
    /// heading the condition column.
    pub fn to_delimited(&self, index_name: &str, delimiter: u8) -> Result<String> {
        let mut w = WriterBuilder::new().delimiter(delimiter).from_writer(Vec::new());
        self.write_rows(&mut w, index_name)?;
        into_string(w)
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P, index_name: &str) -> Result<()> {
        let mut w = WriterBuilder::new().from_path(path)?;
        self.write_rows(&mut w, index_name)?;
        w.flush()?;
        Ok(())
    }

    fn write_rows<W: std::io::Write>(&self, w: &mut csv::Writer<W>, index_name: &str) -> Result<()> {
        let mut header = vec![index_name.to_string()];
        header.extend(self.domain.iter().map(Category::label));
        w.write_record(&header)?;
        for (c, dist) in &self.groups {
            let mut row = vec![c.label()];
            row.extend(self.domain.iter().map(|k| format!("{:.2}", dist.percent(k))));
            w.write_record(&row)?;
        }
        Ok(())
    }
}

/// Read a wide percentage table back into condition -> category -> percentage.
pub fn read_frequency_table<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<IndexMap<String, IndexMap<String, f64>>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut out = IndexMap::new();
    for result in rdr.records() {
        let record = result?;
        let mut cells = IndexMap::new();
        for (name, value) in headers.iter().zip(record.iter()).skip(1) {
            let pct = value
                .parse::<f64>()
                .map_err(|_| ReportError::config(format!("bad percentage '{value}' in column {name}")))?;
            cells.insert(name.to_string(), pct);
        }
        out.insert(record.get(0).unwrap_or_default().to_string(), cells);
    }
    Ok(out)
}

/// Joint counts of two categorical variables, normalised over the whole subset:
/// all cells together sum to 100%.
#[derive(Debug, Clone, PartialEq)]
pub struct JointDistribution<R: Category, Col: Category> {
    total: usize,
    counts: IndexMap<(R, Col), usize>,
}

impl<R: Category, Col: Category> JointDistribution<R, Col> {
    fn tabulate<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = (R, Col)>,
    {
        let mut counts = IndexMap::new();
        let mut total = 0;
        for key in observations {
            *counts.entry(key).or_insert(0) += 1;
            total += 1;
        }
        JointDistribution { total, counts }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count(&self, row: &R, col: &Col) -> usize {
        self.counts
            .get(&(row.clone(), col.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn percent(&self, row: &R, col: &Col) -> f64 {
        percent_of(self.count(row, col), self.total)
    }
}

/// A [`JointDistribution`] per conditioning value over shared row and column domains.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTable<C: Category, R: Category, Col: Category> {
    rows: Vec<R>,
    cols: Vec<Col>,
    groups: IndexMap<C, JointDistribution<R, Col>>,
}

impl<C: Category, R: Category, Col: Category> JointTable<C, R, Col> {
    pub fn tabulate<I>(observations: I, conditions: &[C], rows: &[R], cols: &[Col]) -> Self
    where
        I: IntoIterator<Item = (C, R, Col)>,
    {
        let obs: Vec<(C, R, Col)> = observations.into_iter().collect();
        let rows = extend_domain(rows, obs.iter().map(|(_, r, _)| r));
        let cols = extend_domain(cols, obs.iter().map(|(_, _, c)| c));
        let conditions = extend_domain(conditions, obs.iter().map(|(c, _, _)| c));

        let groups = conditions
            .into_iter()
            .map(|c| {
                let members = obs
                    .iter()
                    .filter(|(oc, _, _)| *oc == c)
                    .map(|(_, r, col)| (r.clone(), col.clone()));
                let dist = JointDistribution::tabulate(members);
                (c, dist)
            })
            .collect();

        JointTable { rows, cols, groups }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn cols(&self) -> &[Col] {
        &self.cols
    }

    pub fn group(&self, condition: &C) -> Option<&JointDistribution<R, Col>> {
        self.groups.get(condition)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&C, &JointDistribution<R, Col>)> + '_ {
        self.groups.iter()
    }

    /// Long-by-condition layout: `index_name, row_name, <columns...>`, one line per
    /// condition and row value.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P, index_name: &str, row_name: &str) -> Result<()> {
        let mut w = WriterBuilder::new().from_path(path)?;
        let mut header = vec![index_name.to_string(), row_name.to_string()];
        header.extend(self.cols.iter().map(Category::label));
        w.write_record(&header)?;

        for (c, dist) in &self.groups {
            for r in &self.rows {
                let mut line = vec![c.label(), r.label()];
                line.extend(self.cols.iter().map(|col| format!("{:.2}", dist.percent(r, col))));
                w.write_record(&line)?;
            }
        }
        w.flush()?;
        Ok(())
    }
}

fn into_string(w: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = w
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::config(e.to_string()))
}

use std::collections::HashMap;
use polars::prelude::*;
use rayon::prelude::*;
use crate::error::DiagnosticsError;
use crate::models::{ColumnSummary, CorrelationMatrix, Dataset, DescribeTable, ValueCount, ValueCounts};

/// Most distinct values reported for one column.
pub const VALUE_COUNT_LIMIT: usize = 50;

/// Non-missing values of a numeric column. NaN counts as missing.
fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>, DiagnosticsError> {
    let floats = series.cast(&DataType::Float64)?;
    let values = floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|f| !f.is_nan()))
        .collect();
    Ok(values)
}

/// Percentile of already sorted data, linearly interpolated between ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let k = (p / 100.0) * (sorted.len() - 1) as f64;
    let f = k.floor() as usize;
    let c = k.ceil() as usize;

    if f == c || c >= sorted.len() {
        sorted[f.min(sorted.len() - 1)]
    } else {
        let d = k - f as f64;
        sorted[f] * (1.0 - d) + sorted[c] * d
    }
}

fn summarize(series: &Series) -> Result<ColumnSummary, DiagnosticsError> {
    let mut sorted: Vec<f64> = numeric_values(series)?.into_iter().flatten().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    let mean = if count == 0 {
        f64::NAN
    } else {
        sorted.iter().sum::<f64>() / count as f64
    };
    let std = if count < 2 {
        f64::NAN
    } else {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    };

    Ok(ColumnSummary {
        column: series.name().to_string(),
        count,
        mean,
        std,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: percentile(&sorted, 25.0),
        q50: percentile(&sorted, 50.0),
        q75: percentile(&sorted, 75.0),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    })
}

/// count/mean/std/min/quartiles/max for every numeric column.
pub fn describe(dataset: &Dataset) -> Result<DescribeTable, DiagnosticsError> {
    let numeric = dataset.numeric_columns();
    if numeric.is_empty() {
        return Err(DiagnosticsError::NoNumericColumns);
    }

    let columns = numeric
        .par_iter()
        .map(|series| summarize(series))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DescribeTable { columns })
}

/// Occurrences of each distinct value in `column`, most frequent first.
///
/// Missing cells form one bucket. Equal counts keep the order in which the
/// values first appear. At most [`VALUE_COUNT_LIMIT`] entries are returned.
pub fn value_counts(dataset: &Dataset, column: &str) -> Result<ValueCounts, DiagnosticsError> {
    let series = dataset.column(column)?;
    let rendered = series.cast(&DataType::String)?;

    let mut positions: HashMap<Option<&str>, usize> = HashMap::new();
    let mut tallies: Vec<(Option<&str>, usize)> = Vec::new();
    for value in rendered.str()?.into_iter() {
        match positions.get(&value) {
            Some(&idx) => tallies[idx].1 += 1,
            None => {
                positions.insert(value, tallies.len());
                tallies.push((value, 1));
            }
        }
    }

    // Stable sort, so ties stay in first-seen order
    tallies.sort_by(|a, b| b.1.cmp(&a.1));
    tallies.truncate(VALUE_COUNT_LIMIT);

    Ok(ValueCounts {
        column: column.to_string(),
        entries: tallies
            .into_iter()
            .map(|(value, count)| ValueCount {
                value: value.map(str::to_string),
                count,
            })
            .collect(),
    })
}

/// Pearson correlation over the rows where both columns have a value.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (cov, var_x, var_y) = pairs.iter().fold((0.0, 0.0, 0.0), |(cov, vx, vy), (x, y)| {
        let dx = x - mean_x;
        let dy = y - mean_y;
        (cov + dx * dy, vx + dx * dx, vy + dy * dy)
    });

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

/// Pairwise-complete Pearson correlation between all numeric columns.
pub fn correlate(dataset: &Dataset) -> Result<CorrelationMatrix, DiagnosticsError> {
    let numeric = dataset.numeric_columns();
    if numeric.len() < 2 {
        return Err(DiagnosticsError::InsufficientData);
    }

    let columns: Vec<String> = numeric.iter().map(|s| s.name().to_string()).collect();
    let values = numeric
        .par_iter()
        .map(|series| numeric_values(series))
        .collect::<Result<Vec<_>, _>>()?;

    let n = values.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();
    let coefficients: Vec<(usize, usize, f64)> = pairs
        .par_iter()
        .map(|&(i, j)| (i, j, pearson(&values[i], &values[j])))
        .collect();

    let mut matrix = vec![vec![f64::NAN; n]; n];
    for (i, j, r) in coefficients {
        matrix[i][j] = r;
        matrix[j][i] = r;
    }

    Ok(CorrelationMatrix {
        columns,
        values: matrix,
    })
}

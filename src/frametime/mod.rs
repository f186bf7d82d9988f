//! Frame-time summaries from CSV performance logs
//!
//! Reads one numeric column of frame times in milliseconds and derives the
//! mean frame time and mean frames per second.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::{IoResultExt, ToolError, ToolResult};

/// Cell contents read as a missing value rather than a number
const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Below this many values the sum is a plain loop
const PAIRWISE_MIN: usize = 8;
/// Largest block summed with unrolled accumulators before splitting
const PAIRWISE_BLOCK: usize = 128;

/// Mean frame time and FPS over one CSV column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTimeSummary {
    pub mean_frame_time_ms: f64,
    pub mean_fps: f64,
    pub sample_count: usize,
}

impl FrameTimeSummary {
    /// Summarize already parsed samples. An empty slice gives NaN means.
    pub fn from_samples(samples: &[f64]) -> Self {
        Self::from_column(samples, samples.len())
    }

    /// `column` holds every row with missing cells already zeroed, so the
    /// sum sees values at their original positions.
    fn from_column(column: &[f64], sample_count: usize) -> Self {
        let mean = pairwise_sum(column) / sample_count as f64;
        Self {
            mean_frame_time_ms: mean,
            mean_fps: (1.0 / mean) * 1000.0,
            sample_count,
        }
    }

    pub fn write_report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "Mean Frame Time: {} ms",
            format_float(self.mean_frame_time_ms)
        )?;
        writeln!(out, "Mean FPS: {}", format_float(self.mean_fps))
    }
}

/// Pairwise float summation: eight interleaved accumulators per block,
/// recursive halving above the block size.
pub fn pairwise_sum(values: &[f64]) -> f64 {
    let n = values.len();
    if n < PAIRWISE_MIN {
        let mut sum = 0.0;
        for &value in values {
            sum += value;
        }
        sum
    } else if n <= PAIRWISE_BLOCK {
        let mut acc = [0.0f64; 8];
        acc.copy_from_slice(&values[..8]);
        let unrolled = n - n % 8;
        for chunk in values[8..unrolled].chunks_exact(8) {
            for (slot, &value) in acc.iter_mut().zip(chunk) {
                *slot += value;
            }
        }
        let mut sum =
            ((acc[0] + acc[1]) + (acc[2] + acc[3])) + ((acc[4] + acc[5]) + (acc[6] + acc[7]));
        for &value in &values[unrolled..] {
            sum += value;
        }
        sum
    } else {
        let mut half = n / 2;
        half -= half % 8;
        pairwise_sum(&values[..half]) + pairwise_sum(&values[half..])
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

/// Summarize the named column of CSV data read from `reader`.
///
/// Empty cells and the usual missing-value markers (`NA`, `NaN`, `null`,
/// `#N/A` and similar) are skipped; any other non-numeric cell is an error.
/// Header names must match exactly.
pub fn summarize_reader<R: Read>(reader: R, column: &str) -> ToolResult<FrameTimeSummary> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column_index = headers
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| ToolError::MissingColumn {
            column: column.to_string(),
            available: headers.iter().collect::<Vec<_>>().join(", "),
        })?;

    let mut values = Vec::new();
    let mut sample_count = 0;
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let cell = record.get(column_index).unwrap_or("").trim();
        if is_missing(cell) {
            values.push(0.0);
            continue;
        }

        let value: f64 = cell.parse().map_err(|_| ToolError::InvalidSample {
            column: column.to_string(),
            row: row + 1,
            value: cell.to_string(),
        })?;
        if value.is_nan() {
            values.push(0.0);
            continue;
        }
        values.push(value);
        sample_count += 1;
    }

    log::debug!(
        "[frametime] Read {} samples from {} rows of column '{}'",
        sample_count,
        values.len(),
        column
    );
    if sample_count == 0 {
        log::warn!("[frametime] Column '{}' holds no numeric samples", column);
    }

    Ok(FrameTimeSummary::from_column(&values, sample_count))
}

pub fn summarize_file(path: impl AsRef<Path>, column: &str) -> ToolResult<FrameTimeSummary> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_path(path)?;
    let summary = summarize_reader(std::io::BufReader::new(file), column)?;
    log::info!(
        "[frametime] {}: {} frames, mean {:.3} ms",
        path.display(),
        summary.sample_count,
        summary.mean_frame_time_ms
    );
    Ok(summary)
}

/// Shortest round-trip form of a float. Integral values keep a trailing
/// `.0`; exponents carry a sign and at least two digits.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

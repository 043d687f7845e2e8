use crate::gaze::{GazeSample, GazeSamples};
use crate::Errors;
use anyhow::Result;
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads a headset gaze export.
///
/// The first line is a header. Every other line holds at least four comma separated columns
/// `[_, frame, x, y, ..]`; empty lines are skipped.
///
/// # Errors
/// * [`Errors::MalformedGazeRow`] for a row with missing or unparsable columns
///
pub fn read_gaze_csv<P: AsRef<Path>>(path: P) -> Result<GazeSamples> {
    let path = path.as_ref();
    let samples = parse_gaze_csv(BufReader::new(File::open(path)?))?;
    info!("Loaded {} gaze samples from {}", samples.len(), path.display());
    Ok(samples)
}

pub fn parse_gaze_csv<R: BufRead>(reader: R) -> Result<GazeSamples> {
    let mut samples = Vec::default();
    for (n, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        samples.push(parse_row(&line, n + 1)?);
    }
    Ok(GazeSamples::new(samples))
}

fn parse_row(line: &str, line_no: usize) -> Result<GazeSample> {
    let malformed = |reason: String| Errors::MalformedGazeRow {
        line: line_no,
        reason,
    };

    let columns = line
        .split(',')
        .map(|c| c.trim().trim_matches('"'))
        .collect::<Vec<_>>();
    if columns.len() < 4 {
        return Err(malformed(format!("expected 4 columns, found {}", columns.len())).into());
    }

    let frame = columns[1]
        .parse::<usize>()
        .map_err(|e| malformed(format!("frame '{}': {}", columns[1], e)))?;
    let x = columns[2]
        .parse::<f64>()
        .map_err(|e| malformed(format!("x '{}': {}", columns[2], e)))?;
    let y = columns[3]
        .parse::<f64>()
        .map_err(|e| malformed(format!("y '{}': {}", columns[3], e)))?;

    Ok(GazeSample::new(frame, x, y))
}

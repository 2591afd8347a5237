//! Upstream motion sources.
//!
//! A [`MotionSource`] produces raw accelerometer triples in arrival order.
//! Two sources ship with the crate:
//! - [`SyntheticSource`]: uniform random triples, for running without a sensor
//! - [`ReplaySource`]: `x,y,z` lines read from a recorded CSV file
//!
//! Opening a source that cannot exist is an `UnsupportedInputSource` error
//! and the pipeline is never started. Once running, a malformed reading is
//! reported as an item error so the driver can skip it and keep going.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{SensingError, SensingResult};
use crate::types::RawSample;

/// Producer of raw accelerometer samples.
pub trait MotionSource {
    /// Next sample, `None` once the source is exhausted.
    fn next_sample(&mut self) -> Option<SensingResult<RawSample>>;

    /// Human readable name for diagnostics.
    fn name(&self) -> &str;
}

/// Upper bound (exclusive) of every synthetic axis value.
pub const SYNTHETIC_RANGE: f64 = 10.0;

/// Uniform random triples in `[0, SYNTHETIC_RANGE)` per axis.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    rng: StdRng,
    remaining: Option<usize>,
}

impl SyntheticSource {
    /// Unbounded generator.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            remaining: None,
        }
    }

    /// Generator that stops after `limit` samples.
    pub fn with_limit(seed: u64, limit: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            remaining: Some(limit),
        }
    }
}

impl MotionSource for SyntheticSource {
    fn next_sample(&mut self) -> Option<SensingResult<RawSample>> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        Some(Ok(RawSample::new(
            self.rng.gen_range(0.0..SYNTHETIC_RANGE),
            self.rng.gen_range(0.0..SYNTHETIC_RANGE),
            self.rng.gen_range(0.0..SYNTHETIC_RANGE),
        )))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Recorded samples, one `x,y,z` triple per line.
///
/// Blank lines and lines starting with `#` are ignored.
pub struct ReplaySource {
    name: String,
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl ReplaySource {
    pub fn open(path: &Path) -> SensingResult<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                SensingError::UnsupportedInputSource(format!("{}: {e}", path.display()))
            }
            _ => SensingError::Io(e),
        })?;
        if file.metadata()?.is_dir() {
            return Err(SensingError::UnsupportedInputSource(format!(
                "{} is a directory",
                path.display()
            )));
        }
        Ok(Self {
            name: format!("replay:{}", path.display()),
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }
}

impl MotionSource for ReplaySource {
    fn next_sample(&mut self) -> Option<SensingResult<RawSample>> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(SensingError::Io(e))),
            };
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(parse_triple(trimmed, self.line_number));
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Parse one `x,y,z` line.
pub fn parse_triple(line: &str, line_number: usize) -> SensingResult<RawSample> {
    let invalid = |message: String| SensingError::InvalidSample {
        line: line_number,
        message,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(invalid(format!("expected 3 fields, found {}", fields.len())));
    }
    let mut values = [0.0; 3];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value: f64 = field
            .parse()
            .map_err(|e| invalid(format!("{field:?} is not a number: {e}")))?;
        if !value.is_finite() {
            return Err(invalid(format!("{field:?} is not finite")));
        }
        *slot = value;
    }
    Ok(RawSample::from(values))
}

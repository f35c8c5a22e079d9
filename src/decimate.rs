//! Decimator for direction strips
//!
//! Picks `K` evenly spaced points out of a longer series. Each output slot
//! computes its own source index (`round(i × (L−1)/(K−1))`), so the first and
//! last points are always kept and `K` need not divide `L`. Repeated indices
//! are kept as-is to preserve even spacing.

use thiserror::Error;

/// Smallest strip that can hold both endpoints
pub const MIN_STRIP_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecimateError {
    #[error("a strip needs at least 2 points (got {0})")]
    TooFewPoints(usize),
}

/// Evenly spaced sampler with a validated target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripSampler {
    target: usize,
}

impl StripSampler {
    pub const fn new(target: usize) -> Result<Self, DecimateError> {
        if target < MIN_STRIP_POINTS {
            return Err(DecimateError::TooFewPoints(target));
        }
        Ok(Self { target })
    }

    /// Sampler for `target` points, raised to the minimum when too small.
    pub const fn saturating(target: usize) -> Self {
        if target < MIN_STRIP_POINTS {
            Self { target: MIN_STRIP_POINTS }
        } else {
            Self { target }
        }
    }

    pub const fn target(&self) -> usize {
        self.target
    }

    /// Source indices selected for a series of length `len`.
    pub fn indices(&self, len: usize) -> Vec<usize> {
        if len <= self.target {
            return (0..len).collect();
        }
        let last = len - 1;
        let spacing = last as f64 / (self.target - 1) as f64;
        (0..self.target)
            .map(|i| ((i as f64 * spacing).round() as usize).min(last))
            .collect()
    }

    /// Decimate `series`; series no longer than the target come back unchanged.
    pub fn sample<T: Clone>(&self, series: &[T]) -> Vec<T> {
        if series.len() <= self.target {
            return series.to_vec();
        }
        self.indices(series.len())
            .into_iter()
            .map(|i| series[i].clone())
            .collect()
    }
}

/// One-shot decimation of `series` down to `target` points.
pub fn decimate<T: Clone>(series: &[T], target: usize) -> Result<Vec<T>, DecimateError> {
    Ok(StripSampler::new(target)?.sample(series))
}

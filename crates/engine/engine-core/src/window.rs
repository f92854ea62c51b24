//! Sliding window construction.
//!
//! The same builder serves training ("all pairs" over the historical series)
//! and inference ("last window" preceding a newly arrived value).

use engine_api::{EngineError, Result, TrainingSet, WindowConfig};

/// A window of `W` consecutive values and the value that follows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPair<'a> {
    /// Index of `target` in the source sequence.
    pub index: usize,
    pub window: &'a [f64],
    pub target: f64,
}

/// Lazy iterator over every `(window, target)` pair of a sequence.
#[derive(Debug, Clone)]
pub struct Windows<'a> {
    values: &'a [f64],
    size: usize,
    start: usize,
}

impl<'a> Iterator for Windows<'a> {
    type Item = WindowPair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.start.checked_add(self.size)?;
        if end >= self.values.len() {
            return None;
        }
        let pair = WindowPair {
            index: end,
            window: &self.values[self.start..end],
            target: self.values[end],
        };
        self.start += 1;
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .values
            .len()
            .saturating_sub(self.size)
            .saturating_sub(self.start);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows<'_> {}

/// Builds fixed-size windows for a configured window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBuilder {
    window_size: usize,
}

impl WindowBuilder {
    /// Create a builder; a zero window size is a configuration error.
    pub fn new(window_size: usize) -> Result<Self> {
        WindowConfig::new(window_size).validate()?;
        Ok(Self { window_size })
    }

    pub fn from_config(config: WindowConfig) -> Result<Self> {
        Self::new(config.window_size)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// All `(values[i..i+W], values[i+W])` pairs in target order.
    ///
    /// Yields `max(0, N - W)` pairs.
    pub fn pairs<'a>(&self, values: &'a [f64]) -> Windows<'a> {
        Windows {
            values,
            size: self.window_size,
            start: 0,
        }
    }

    /// Materialize every pair into a [`TrainingSet`].
    pub fn training_set(&self, values: &[f64]) -> Result<TrainingSet> {
        let (windows, targets): (Vec<Vec<f64>>, Vec<f64>) = self
            .pairs(values)
            .map(|pair| (pair.window.to_vec(), pair.target))
            .unzip();
        TrainingSet::new(windows, targets)
    }

    /// The last `W` values of `history`, oldest first.
    ///
    /// `history` holds the samples preceding a new value, chronological, and
    /// must not contain the new value itself.
    pub fn last_window<'a>(&self, history: &'a [f64]) -> Result<&'a [f64]> {
        if history.len() < self.window_size {
            return Err(EngineError::InsufficientHistory {
                required: self.window_size,
                got: history.len(),
            });
        }
        Ok(&history[history.len() - self.window_size..])
    }
}

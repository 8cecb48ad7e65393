//! Rolling series store feeding the charts.
//!
//! A [`Series`] is a named [`RingBuffer`] of timestamped points for one
//! scalar metric. The [`SeriesStore`] owns one series per chart line, each
//! sized by its chart's configured capacity.

use crate::monitor::config::ChartsConfig;
use crate::monitor::ring_buffer::RingBuffer;
use std::time::Instant;

/// One chart sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// When the sample was taken.
    pub at: Instant,
    /// The sampled value.
    pub value: f64,
}

/// Bounded, chronological history of one scalar metric.
#[derive(Debug, Clone)]
pub struct Series {
    name: String,
    points: RingBuffer<Point>,
}

impl Series {
    /// Creates an empty series.
    ///
    /// # Panics
    ///
    /// Panics if capacity is 0.
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self { name: name.into(), points: RingBuffer::new(capacity) }
    }

    /// Returns the series name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a point, evicting the oldest when at capacity.
    pub fn push(&mut self, at: Instant, value: f64) {
        self.points.push(Point { at, value });
    }

    /// Discards every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Iterates the current values oldest-first.
    ///
    /// Each call starts a fresh pass over the contents at call time.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Iterates the current points oldest-first.
    pub fn points(&self) -> impl DoubleEndedIterator<Item = &Point> + ExactSizeIterator {
        self.points.iter()
    }

    /// Returns the most recent value.
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.points.latest().map(|p| p.value)
    }

    /// Largest value currently held, or 0 when empty.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.values().fold(0.0, f64::max)
    }

    /// Number of points held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true when the series holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum number of points held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }
}

/// Identifies a chart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesId {
    /// Utilization of the selected core (or the all-core average).
    Cpu,
    /// Memory used, in percent of total.
    Memory,
    /// Aggregate receive rate, bytes/s.
    NetRx,
    /// Aggregate transmit rate, bytes/s.
    NetTx,
}

impl SeriesId {
    /// All series, in display order.
    pub const ALL: [Self; 4] = [Self::Cpu, Self::Memory, Self::NetRx, Self::NetTx];
}

/// Every chart series, each with its own capacity.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    cpu: Series,
    memory: Series,
    net_rx: Series,
    net_tx: Series,
}

impl SeriesStore {
    /// Builds the store from validated chart settings.
    #[must_use]
    pub fn new(charts: &ChartsConfig) -> Self {
        Self {
            cpu: Series::new("cpu", charts.cpu.capacity),
            memory: Series::new("memory", charts.memory.capacity),
            net_rx: Series::new("net.rx", charts.network.capacity),
            net_tx: Series::new("net.tx", charts.network.capacity),
        }
    }

    /// Returns a series by id.
    #[must_use]
    pub fn get(&self, id: SeriesId) -> &Series {
        match id {
            SeriesId::Cpu => &self.cpu,
            SeriesId::Memory => &self.memory,
            SeriesId::NetRx => &self.net_rx,
            SeriesId::NetTx => &self.net_tx,
        }
    }

    /// Returns a series by id, mutably.
    pub fn get_mut(&mut self, id: SeriesId) -> &mut Series {
        match id {
            SeriesId::Cpu => &mut self.cpu,
            SeriesId::Memory => &mut self.memory,
            SeriesId::NetRx => &mut self.net_rx,
            SeriesId::NetTx => &mut self.net_tx,
        }
    }

    /// Appends a point to one series.
    pub fn push(&mut self, id: SeriesId, at: Instant, value: f64) {
        self.get_mut(id).push(at, value);
    }

    /// Empties one series.
    pub fn clear(&mut self, id: SeriesId) {
        self.get_mut(id).clear();
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_series_bounded_and_fifo(
            capacity in 1usize..64,
            values in prop::collection::vec(-1e6f64..1e6, 0..256)
        ) {
            let now = Instant::now();
            let mut series = Series::new("p", capacity);
            for &v in &values {
                series.push(now, v);
            }

            prop_assert!(series.len() <= capacity);
            let skip = values.len().saturating_sub(capacity);
            let expected: Vec<f64> = values[skip..].to_vec();
            prop_assert_eq!(series.values().collect::<Vec<_>>(), expected);
        }
    }
}

// Handle conversion history concerns

use std::{collections::VecDeque, fmt};

use chrono::{DateTime, FixedOffset, SubsecRound};
use serde::{Deserialize, Serialize};

use crate::converter::{format, Temperature};

// The number of records ever shown to a user.
pub const RECENT_LIMIT: usize = 10;

pub type Timestamp = DateTime<FixedOffset>;

/// A conversion that succeeded at a given moment.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConversionRecord {
    pub timestamp: Timestamp,
    pub from: Temperature,
    pub to: Temperature,
}

impl ConversionRecord {
    pub fn new(timestamp: Timestamp, from: Temperature, to: Temperature) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            from,
            to,
        }
    }
}

impl fmt::Display for ConversionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} — {} {} → {} {}",
            self.timestamp.format("%H:%M:%S"),
            format(self.from.value),
            self.from.unit.label(),
            format(self.to.value),
            self.to.unit.label(),
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogState {
    Empty,
    NonEmpty,
}

/// Conversion records, newest first. Storage is unbounded; callers only ever
/// look at the front of it through [`HistoryLog::recent`].
#[derive(Clone, Debug, Default)]
pub struct HistoryLog {
    records: VecDeque<ConversionRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, timestamp: Timestamp, from: Temperature, to: Temperature) {
        self.push(ConversionRecord::new(timestamp, from, to));
    }

    pub(crate) fn push(&mut self, record: ConversionRecord) {
        self.records.push_front(record);
    }

    /// The `n` most recent records, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ConversionRecord> {
        self.records.iter().take(n)
    }

    pub fn clear(&mut self) {
        self.records = VecDeque::new();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn state(&self) -> LogState {
        if self.records.is_empty() {
            LogState::Empty
        } else {
            LogState::NonEmpty
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::converter::Unit;

    fn at(secs: u32) -> Timestamp {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 9, 15, secs)
            .unwrap()
    }

    fn celsius(value: f64) -> Temperature {
        Temperature::new(value, Unit::Celsius).unwrap()
    }

    fn fill(log: &mut HistoryLog, k: u32) {
        for i in 0..k {
            let from = celsius(i as f64);
            log.record(at(i % 60), from, from.convert().unwrap());
        }
    }

    #[test]
    fn starts_empty() {
        let log = HistoryLog::new();
        assert_eq!(log.state(), LogState::Empty);
        assert_eq!(log.recent(RECENT_LIMIT).count(), 0);
    }

    #[test]
    fn lists_the_most_recent_first() {
        let mut log = HistoryLog::new();
        fill(&mut log, 3);

        let values: Vec<f64> = log.recent(RECENT_LIMIT).map(|r| r.from.value).collect();
        assert_eq!(values, vec![2.0, 1.0, 0.0]);
        assert_eq!(log.state(), LogState::NonEmpty);
    }

    #[test]
    fn caps_what_is_listed_but_keeps_everything() {
        for k in [0, 1, 9, 10, 11, 25] {
            let mut log = HistoryLog::new();
            fill(&mut log, k);

            let values: Vec<f64> = log.recent(RECENT_LIMIT).map(|r| r.from.value).collect();
            let expected: Vec<f64> = (0..k)
                .rev()
                .take(RECENT_LIMIT)
                .map(|i| i as f64)
                .collect();
            assert_eq!(values, expected, "after {k} records");
            assert_eq!(log.len(), k as usize);
        }
    }

    #[test]
    fn clear_empties_and_recording_resumes() {
        let mut log = HistoryLog::new();
        fill(&mut log, 12);

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.recent(RECENT_LIMIT).count(), 0);

        fill(&mut log, 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn clearing_an_empty_log_is_a_no_op() {
        let mut log = HistoryLog::new();
        log.clear();
        log.clear();
        assert_eq!(log.state(), LogState::Empty);
    }

    #[test]
    fn records_whole_seconds() {
        let precise = at(5) + chrono::Duration::milliseconds(750);
        let record = ConversionRecord::new(precise, celsius(1.0), celsius(1.0));
        assert_eq!(record.timestamp, at(5));
    }

    #[test]
    fn displays_a_record_line() {
        let from = celsius(25.0);
        let record = ConversionRecord::new(at(7), from, from.convert().unwrap());
        assert_eq!(
            record.to_string(),
            "09:15:07 — 25 Celsius (°C) → 77 Fahrenheit (°F)"
        );
    }
}

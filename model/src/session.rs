// Handle the state of one user's converter session

use log::debug;
use serde::{Deserialize, Serialize};

use crate::converter::{Temperature, Unit, ValidationError};
use crate::history::{ConversionRecord, HistoryLog, Timestamp};

// Everything that can happen to a session. State can be rebuilt by replaying
// these in order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Event {
    Converted { record: ConversionRecord },
    Cleared,
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    history: HistoryLog,
    last: Option<ConversionRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert `value` and, on success, record the conversion. A rejected
    /// value leaves the session as it was.
    pub fn on_convert(
        &mut self,
        value: f64,
        unit: Unit,
        now: Timestamp,
    ) -> Result<ConversionRecord, ValidationError> {
        let from = Temperature::new(value, unit)?;
        let to = from.convert()?;
        debug!("Converted {from} to {to}");

        let record = ConversionRecord::new(now, from, to);
        self.on_event(Event::Converted {
            record: record.clone(),
        });
        Ok(record)
    }

    pub fn on_clear(&mut self) {
        self.on_event(Event::Cleared);
    }

    pub fn on_event(&mut self, event: Event) {
        match event {
            Event::Converted { record } => {
                self.history.push(record.clone());
                self.last = Some(record);
            }
            Event::Cleared => {
                self.history.clear();
                self.last = None;
            }
        }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ConversionRecord> {
        self.history.recent(n)
    }

    /// The most recent successful conversion since the last clear.
    pub fn last(&self) -> Option<&ConversionRecord> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use test_log::test;

    use super::*;
    use crate::history::{LogState, RECENT_LIMIT};

    fn now() -> Timestamp {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 2, 23, 59, 58)
            .unwrap()
    }

    #[test]
    fn convert_records_and_returns_the_result() {
        let mut session = Session::new();

        let record = session.on_convert(25.0, Unit::Celsius, now()).unwrap();

        assert_eq!(record.to.value, 77.0);
        assert_eq!(record.to.unit, Unit::Fahrenheit);
        assert_eq!(session.last(), Some(&record));
        assert_eq!(session.recent(RECENT_LIMIT).collect::<Vec<_>>(), vec![&record]);
    }

    #[test]
    fn rejected_values_leave_no_trace() {
        let mut session = Session::new();
        session.on_convert(0.0, Unit::Celsius, now()).unwrap();

        let result = session.on_convert(f64::NAN, Unit::Fahrenheit, now());

        assert!(matches!(result, Err(ValidationError::NotFinite(_))));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.last().map(|r| r.from.value), Some(0.0));
    }

    #[test]
    fn clear_resets_the_session() {
        let mut session = Session::new();
        session.on_convert(98.6, Unit::Fahrenheit, now()).unwrap();

        session.on_clear();
        assert_eq!(session.history().state(), LogState::Empty);
        assert!(session.last().is_none());

        session.on_clear();
        assert_eq!(session.history().state(), LogState::Empty);

        session.on_convert(1.0, Unit::Celsius, now()).unwrap();
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn replaying_events_rebuilds_the_history() {
        let mut live = Session::new();
        let mut events = Vec::new();
        for value in [10.0, 20.0, 30.0] {
            let record = live.on_convert(value, Unit::Celsius, now()).unwrap();
            events.push(Event::Converted { record });
        }
        live.on_clear();
        events.push(Event::Cleared);
        let record = live.on_convert(40.0, Unit::Celsius, now()).unwrap();
        events.push(Event::Converted { record });

        let mut replayed = Session::new();
        for event in events {
            replayed.on_event(event);
        }

        let expected: Vec<_> = live.recent(RECENT_LIMIT).collect();
        let actual: Vec<_> = replayed.recent(RECENT_LIMIT).collect();
        assert_eq!(actual, expected);
        assert_eq!(replayed.history().len(), 1);
        assert_eq!(replayed.last(), live.last());
    }
}

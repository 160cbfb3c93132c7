//! The purpose of the model crate is to share types and behavior between
//! both the frontend and the backend. Conversions, the history of a session
//! and the bodies of the HTTP API all live here so that either side renders
//! a conversion the same way.

pub mod api;
pub mod converter;
pub mod history;
pub mod session;

pub use converter::{convert, format, try_convert, Temperature, Unit, ValidationError};
pub use history::{ConversionRecord, HistoryLog, LogState, Timestamp, RECENT_LIMIT};
pub use session::{Event, Session};

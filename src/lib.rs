//! Outage schedule normalization for household electricity supply.
//!
//! Provider payloads (an HTML grid of half-hour cells, or a regional JSON schedule keyed
//! by rotation group) are reduced to one `CanonicalPayload`: today's outage intervals and
//! whether the power is off now or when it goes off next.

pub mod assembler;
pub mod client;
pub mod config;
pub mod day_events;
pub mod error;
pub mod groups;
pub mod outage;
pub mod region;
pub mod scheduler;
pub mod slots;
pub mod table;
pub mod types;
pub mod worker;

pub use client::{HttpFetcher, ScheduleFetcher};
pub use error::{MalformedRecord, ScheduleError, ScheduleResult};
pub use types::{CanonicalPayload, ClockTime, Interval, OutageStatus, Snapshot};
pub use worker::OutageWorker;

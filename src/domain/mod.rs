//! Domain layer: event model, push updates, and the merge engine.
//!
//! Everything here is synchronous and transport-agnostic. The store layer
//! decides when mutations run; this module decides what they do.

pub mod clock;
pub mod coeff;
pub mod event;
pub mod event_id;
pub mod event_table;
pub mod odds_update;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coeff::{Coeff, InvalidCoefficient};
pub use event::{ApiEvent, Event, EventStatus, Trend};
pub use event_id::EventId;
pub use event_table::{EventTable, TableStatus, UpdateOrdering, UpdateOutcome};
pub use odds_update::{OddsUpdate, PushDecodeError, decode_push_message};

mod cursor;
mod event;
mod target;
mod window;

pub use cursor::SyncCursor;
pub use event::{Attendee, EventId, EventRecord, EventRecordBuilder, EventTime, ResponseStatus};
pub use target::{SyncTarget, settings};
pub use window::{TimeParseError, TimeWindow, overlaps, resolve_instant};

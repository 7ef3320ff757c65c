pub mod schedule;
pub mod layout;
pub mod planning;
pub mod storage;

pub use schedule::{Absence, AbsenceStatus, Appointment, AppointmentDraft, User, Vehicle};
pub use layout::{Grid, SpanSegment, ViewKind, compute_spans, grid_for};
pub use storage::{ScheduleStore, SnapshotStore, config::Config};

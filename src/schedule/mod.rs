pub mod absence;
pub mod appointment;
pub mod date_format;
pub mod directory;
pub mod wire;

pub use absence::{Absence, AbsenceError, AbsenceKind, AbsenceRequest, AbsenceStatus};
pub use appointment::{Appointment, AppointmentDraft, DeletionScope, ScheduleSlot};
pub use date_format::DateFormatError;
pub use directory::{User, UserRole, Vehicle};
pub use wire::AppointmentRecord;

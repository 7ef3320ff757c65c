pub mod absence_projection;
pub mod expander;
pub mod overlap;

pub use absence_projection::{calendar_entries, project_absences};
pub use expander::{DayTiming, ExpandError, SelectionRequest, SelectionWarning, expand_confirmed, expand_selection};
pub use overlap::{AbsencePlan, find_overlaps, plan_absence};

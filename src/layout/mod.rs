pub mod grid;
pub mod spans;
pub mod year;

pub use grid::{Direction, Grid, ViewKind, grid_for, navigate};
pub use spans::{SpanSegment, cell_appointments, compute_spans};

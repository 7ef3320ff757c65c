use chrono::{Datelike, NaiveDate};

use crate::layout::grid::{ViewKind, grid_for};
use crate::schedule::Appointment;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: NaiveDate,
    pub appointment_count: usize,
}

/// Appointment count per month of the anchor's year. Every record of a
/// multi-day group counts toward the month its day falls in.
pub fn month_counts(appointments: &[Appointment], anchor: NaiveDate) -> Vec<MonthSummary> {
    grid_for(anchor, ViewKind::Year)
        .cells
        .into_iter()
        .map(|month| MonthSummary {
            month,
            appointment_count: appointments
                .iter()
                .filter(|a| {
                    let day = a.day();
                    day.year() == month.year() && day.month() == month.month()
                })
                .count(),
        })
        .collect()
}

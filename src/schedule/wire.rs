use serde::{Deserialize, Serialize};

use crate::schedule::appointment::{Appointment, ScheduleSlot};
use crate::schedule::date_format::{self, DateFormatError};

/// Flat appointment shape used by the REST layer and snapshot imports:
/// dates are strings whose format depends on `all_day`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub workers: Vec<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub notes: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub multi_day_group_id: Option<String>,
    #[serde(default)]
    pub is_first_day: Option<bool>,
    #[serde(default)]
    pub is_last_day: Option<bool>,
    #[serde(default)]
    pub job_group_id: Option<String>,
}

impl TryFrom<AppointmentRecord> for Appointment {
    type Error = DateFormatError;

    fn try_from(record: AppointmentRecord) -> Result<Self, Self::Error> {
        let slot = if record.all_day {
            // Older records store all-day dates as midnight timestamps.
            let day = date_format::parse_date(&record.start_date)
                .or_else(|_| date_format::parse_timestamp(&record.start_date).map(|t| t.date()))?;
            ScheduleSlot::AllDay(day)
        } else {
            let start = date_format::parse_timestamp(&record.start_date)?;
            let end = date_format::parse_timestamp(&record.end_date)?;
            ScheduleSlot::Timed { start, end }
        };

        Ok(Appointment {
            id: record.id,
            title: record.title,
            location: record.location,
            address: record.address,
            customer_name: record.customer,
            notes: record.notes,
            workers: record.workers,
            vehicle_id: record.vehicle_id.filter(|id| !id.is_empty()),
            equipment: record.equipment,
            slot,
            color: record.color,
            multi_day_group_id: record.multi_day_group_id.filter(|id| !id.is_empty()),
            is_first_day: record.is_first_day.unwrap_or(false),
            is_last_day: record.is_last_day.unwrap_or(false),
            job_group_id: record.job_group_id.filter(|id| !id.is_empty()),
        })
    }
}

impl From<&Appointment> for AppointmentRecord {
    fn from(appointment: &Appointment) -> Self {
        let (start_date, end_date) = match &appointment.slot {
            ScheduleSlot::AllDay(day) => (date_format::format_date(*day), date_format::format_date(*day)),
            ScheduleSlot::Timed { start, end } => (
                start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            ),
        };

        Self {
            id: appointment.id.clone(),
            title: appointment.title.clone(),
            location: appointment.location.clone(),
            address: appointment.address.clone(),
            customer: appointment.customer_name.clone(),
            workers: appointment.workers.clone(),
            vehicle_id: appointment.vehicle_id.clone(),
            equipment: appointment.equipment.clone(),
            notes: appointment.notes.clone(),
            start_date,
            end_date,
            color: appointment.color.clone(),
            all_day: appointment.is_all_day(),
            multi_day_group_id: appointment.multi_day_group_id.clone(),
            is_first_day: Some(appointment.is_first_day),
            is_last_day: Some(appointment.is_last_day),
            job_group_id: appointment.job_group_id.clone(),
        }
    }
}

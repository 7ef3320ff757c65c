use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSlot {
    AllDay(NaiveDate),
    Timed { start: NaiveDateTime, end: NaiveDateTime },
}

impl ScheduleSlot {
    pub fn timed(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self::Timed {
            start: date.and_time(start),
            end: date.and_time(end),
        }
    }

    /// The calendar day this slot occupies. Multi-day coverage is expressed
    /// through grouping, so a slot never spans more than one day.
    pub fn day(&self) -> NaiveDate {
        match self {
            Self::AllDay(date) => *date,
            Self::Timed { start, .. } => start.date(),
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        match self {
            Self::AllDay(date) => date.and_time(NaiveTime::MIN),
            Self::Timed { start, .. } => *start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub workers: Vec<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub equipment: String,
    pub slot: ScheduleSlot,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub multi_day_group_id: Option<String>,
    #[serde(default)]
    pub is_first_day: bool,
    #[serde(default)]
    pub is_last_day: bool,
    #[serde(default)]
    pub job_group_id: Option<String>,
}

/// An appointment that has not been persisted yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub title: String,
    pub location: String,
    pub address: String,
    pub customer_name: String,
    pub notes: String,
    pub workers: Vec<String>,
    pub vehicle_id: Option<String>,
    pub equipment: String,
    pub slot: ScheduleSlot,
    pub color: String,
    pub multi_day_group_id: Option<String>,
    pub is_first_day: bool,
    pub is_last_day: bool,
    pub job_group_id: Option<String>,
}

impl AppointmentDraft {
    pub fn into_appointment(self, id: String) -> Appointment {
        Appointment {
            id,
            title: self.title,
            location: self.location,
            address: self.address,
            customer_name: self.customer_name,
            notes: self.notes,
            workers: self.workers,
            vehicle_id: self.vehicle_id,
            equipment: self.equipment,
            slot: self.slot,
            color: self.color,
            multi_day_group_id: self.multi_day_group_id,
            is_first_day: self.is_first_day,
            is_last_day: self.is_last_day,
            job_group_id: self.job_group_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeletionScope {
    Job(String),
    MultiDay(String),
    Single(String),
}

impl DeletionScope {
    pub fn targets(&self, all: &[Appointment]) -> Vec<String> {
        match self {
            Self::Job(job_id) => all
                .iter()
                .filter(|a| a.job_group_id.as_deref() == Some(job_id.as_str()))
                .map(|a| a.id.clone())
                .collect(),
            Self::MultiDay(group_id) => all
                .iter()
                .filter(|a| a.multi_day_group_id.as_deref() == Some(group_id.as_str()))
                .map(|a| a.id.clone())
                .collect(),
            Self::Single(id) => vec![id.clone()],
        }
    }
}

impl Appointment {
    pub fn day(&self) -> NaiveDate {
        self.slot.day()
    }

    pub fn is_all_day(&self) -> bool {
        self.slot.is_all_day()
    }

    pub fn is_multi_day(&self) -> bool {
        self.multi_day_group_id.is_some()
    }

    /// Vehicle name when one is set, otherwise the title.
    pub fn label(&self) -> &str {
        if self.equipment.is_empty() {
            &self.title
        } else {
            &self.equipment
        }
    }

    /// Deleting an appointment removes the whole job it was scheduled with,
    /// or failing that its multi-day run.
    pub fn deletion_scope(&self) -> DeletionScope {
        if let Some(job_id) = &self.job_group_id {
            DeletionScope::Job(job_id.clone())
        } else if let Some(group_id) = &self.multi_day_group_id {
            DeletionScope::MultiDay(group_id.clone())
        } else {
            DeletionScope::Single(self.id.clone())
        }
    }

    pub fn deletion_targets(&self, all: &[Appointment]) -> Vec<String> {
        self.deletion_scope().targets(all)
    }

    pub fn job_siblings<'a>(&self, all: &'a [Appointment]) -> Vec<&'a Appointment> {
        match &self.job_group_id {
            Some(job_id) => all
                .iter()
                .filter(|a| a.job_group_id.as_ref() == Some(job_id))
                .collect(),
            None => all.iter().filter(|a| a.id == self.id).collect(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{appointment, date, multi_day};
    use super::*;

    #[test]
    fn timed_slot_occupies_its_start_day() {
        let slot = ScheduleSlot::timed(
            date(2024, 3, 1),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        );

        assert_eq!(slot.day(), date(2024, 3, 1));
        assert!(!slot.is_all_day());
    }

    #[test]
    fn all_day_slot_starts_at_midnight() {
        let slot = ScheduleSlot::AllDay(date(2024, 3, 1));
        assert_eq!(slot.starts_at(), date(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn label_falls_back_to_title_without_vehicle() {
        let mut apt = appointment("a1", date(2024, 3, 1));
        assert_eq!(apt.label(), "Truck 1");

        apt.equipment.clear();
        assert_eq!(apt.label(), "Job a1");
    }

    #[test]
    fn deleting_job_member_removes_whole_job() {
        let mut all = multi_day("g1", date(2024, 3, 1), 2);
        all.extend(multi_day("g2", date(2024, 3, 1), 2));
        all.push(appointment("lonely", date(2024, 3, 4)));
        for apt in all.iter_mut().take(4) {
            apt.job_group_id = Some("job-1".to_string());
        }

        let targets = all[0].deletion_targets(&all);

        assert_eq!(targets, vec!["g1-0", "g1-1", "g2-0", "g2-1"]);
    }

    #[test]
    fn deleting_ungrouped_by_job_removes_multi_day_run() {
        let mut all = multi_day("g1", date(2024, 3, 1), 3);
        all.extend(multi_day("g2", date(2024, 3, 1), 2));

        let targets = all[1].deletion_targets(&all);

        assert_eq!(targets, vec!["g1-0", "g1-1", "g1-2"]);
    }

    #[test]
    fn deleting_single_appointment_removes_only_itself() {
        let all = vec![appointment("a1", date(2024, 3, 1)), appointment("a2", date(2024, 3, 1))];
        assert_eq!(all[1].deletion_scope(), DeletionScope::Single("a2".to_string()));
        assert_eq!(all[1].deletion_targets(&all), vec!["a2"]);
    }

    #[test]
    fn job_siblings_without_job_is_just_self() {
        let all = vec![appointment("a1", date(2024, 3, 1)), appointment("a2", date(2024, 3, 1))];
        let siblings = all[0].job_siblings(&all);
        assert_eq!(siblings.len(), 1);
        assert_eq!(siblings[0].id, "a1");
    }

    #[test]
    fn appointment_json_defaults_missing_text_fields() {
        let json = r#"{"id":"a1","slot":{"all_day":"2024-03-01"}}"#;
        let apt: Appointment = serde_json::from_str(json).unwrap();

        assert_eq!(apt.title, "");
        assert!(apt.workers.is_empty());
        assert!(!apt.is_first_day);
        assert_eq!(apt.day(), date(2024, 3, 1));
    }
}

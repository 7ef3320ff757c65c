use crate::schedule::absence::{Absence, AbsenceStatus};
use crate::schedule::appointment::{Appointment, ScheduleSlot};
use crate::schedule::directory::{User, find_user};
use crate::storage::config::DisplayLabels;

pub const ABSENCE_ID_PREFIX: &str = "absence_";

pub fn is_projected_absence(appointment: &Appointment) -> bool {
    appointment.id.starts_with(ABSENCE_ID_PREFIX)
}

/// Calendar entries standing in for approved absences, one all-day entry per
/// absent day. Multi-day absences are grouped like real multi-day work so the
/// span resolver draws them as bars. Ids derive from the absence id, so the
/// output is identical for identical input.
pub fn project_absences(absences: &[Absence], users: &[User], labels: &DisplayLabels) -> Vec<Appointment> {
    let mut projected = Vec::new();

    for absence in absences.iter().filter(|a| a.status == AbsenceStatus::Approved) {
        let worker = find_user(users, &absence.user_id)
            .map_or(labels.unknown_worker.as_str(), |u| u.full_name.as_str());
        let title = format!("{} - {}", worker, absence.reason);

        let entry = |id: String, day| Appointment {
            id,
            title: title.clone(),
            location: title.clone(),
            address: String::new(),
            customer_name: String::new(),
            notes: absence.reason.clone(),
            workers: vec![absence.user_id.clone()],
            vehicle_id: None,
            equipment: String::new(),
            slot: ScheduleSlot::AllDay(day),
            color: labels.absence_color.clone(),
            multi_day_group_id: None,
            is_first_day: false,
            is_last_day: false,
            job_group_id: None,
        };

        if absence.is_single_day() {
            projected.push(entry(format!("{}{}", ABSENCE_ID_PREFIX, absence.id), absence.start_date));
            continue;
        }

        let group_id = format!("{}multi_{}", ABSENCE_ID_PREFIX, absence.id);
        let last_index = absence.duration_days() - 1;
        for (index, day) in absence.days().enumerate() {
            let mut apt = entry(format!("{}{}_{}", ABSENCE_ID_PREFIX, absence.id, index), day);
            apt.multi_day_group_id = Some(group_id.clone());
            apt.is_first_day = index == 0;
            apt.is_last_day = index as i64 == last_index;
            projected.push(apt);
        }
    }

    projected
}

/// Real appointments followed by projected absences, as the calendar views
/// consume them.
pub fn calendar_entries(
    appointments: &[Appointment],
    absences: &[Absence],
    users: &[User],
    labels: &DisplayLabels,
) -> Vec<Appointment> {
    let mut entries = appointments.to_vec();
    entries.extend(project_absences(absences, users, labels));
    entries
}

use chrono::{DateTime, NaiveDate, Utc};

use crate::schedule::absence::{Absence, AbsenceRequest};
use crate::schedule::directory::{User, find_user};

/// Full names of other users holding a pending or approved absence that
/// intersects `[start, end]`, deduplicated in first-seen order.
pub fn find_overlaps(
    start: NaiveDate,
    end: NaiveDate,
    exclude_user_id: &str,
    absences: &[Absence],
    users: &[User],
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for absence in absences
        .iter()
        .filter(|a| a.status.blocks_dates() && a.user_id != exclude_user_id)
        .filter(|a| a.overlaps(start, end))
    {
        let Some(user) = find_user(users, &absence.user_id) else {
            tracing::warn!("Absence {} references unknown user {}", absence.id, absence.user_id);
            continue;
        };
        if !names.contains(&user.full_name) {
            names.push(user.full_name.clone());
        }
    }

    names
}

/// Outcome of checking a request against existing absences. A plan with
/// overlaps should be shown to the requester before it is confirmed; the
/// resulting absence then waits for an administrator.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsencePlan {
    pub request: AbsenceRequest,
    pub overlapping_users: Vec<String>,
}

impl AbsencePlan {
    pub fn requires_approval(&self) -> bool {
        !self.overlapping_users.is_empty()
    }

    pub fn confirm(self, id: String, created_at: DateTime<Utc>, vacation_label: &str) -> Absence {
        let requires_approval = self.requires_approval();
        if requires_approval {
            tracing::info!(
                "Absence {} for {} overlaps with {}; queued for approval",
                id,
                self.request.user_id,
                self.overlapping_users.join(", ")
            );
        }
        self.request
            .into_absence(id, created_at, requires_approval, vacation_label)
    }
}

pub fn plan_absence(request: AbsenceRequest, absences: &[Absence], users: &[User]) -> AbsencePlan {
    let overlapping_users = find_overlaps(
        request.start_date,
        request.end_date,
        &request.user_id,
        absences,
        users,
    );
    AbsencePlan {
        request,
        overlapping_users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::absence::fixtures::absence;
    use crate::schedule::absence::{AbsenceKind, AbsenceStatus};
    use crate::schedule::appointment::fixtures::date;
    use crate::schedule::directory::UserRole;
    use proptest::prelude::*;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.to_string(),
            username: id.to_string(),
            full_name: name.to_string(),
            role: UserRole::Worker,
        }
    }

    fn staff() -> Vec<User> {
        vec![user("a", "Anna Berg"), user("b", "Bernd Kraus"), user("c", "Clara Vogt")]
    }

    #[test]
    fn touching_pending_absence_is_reported() {
        let absences = vec![absence("x", "b", date(2024, 6, 12), date(2024, 6, 15), AbsenceStatus::Pending)];

        let names = find_overlaps(date(2024, 6, 10), date(2024, 6, 12), "a", &absences, &staff());

        assert_eq!(names, vec!["Bernd Kraus"]);
    }

    #[test]
    fn rejected_absences_do_not_count() {
        let absences = vec![absence("x", "b", date(2024, 6, 10), date(2024, 6, 15), AbsenceStatus::Rejected)];

        let names = find_overlaps(date(2024, 6, 10), date(2024, 6, 12), "a", &absences, &staff());

        assert!(names.is_empty());
    }

    #[test]
    fn own_absences_are_excluded() {
        let absences = vec![absence("x", "a", date(2024, 6, 10), date(2024, 6, 15), AbsenceStatus::Approved)];

        let names = find_overlaps(date(2024, 6, 10), date(2024, 6, 12), "a", &absences, &staff());

        assert!(names.is_empty());
    }

    #[test]
    fn names_are_deduplicated_in_first_seen_order() {
        let absences = vec![
            absence("1", "c", date(2024, 6, 11), date(2024, 6, 11), AbsenceStatus::Approved),
            absence("2", "b", date(2024, 6, 1), date(2024, 6, 30), AbsenceStatus::Pending),
            absence("3", "c", date(2024, 6, 12), date(2024, 6, 13), AbsenceStatus::Pending),
        ];

        let names = find_overlaps(date(2024, 6, 10), date(2024, 6, 12), "a", &absences, &staff());

        assert_eq!(names, vec!["Clara Vogt", "Bernd Kraus"]);
    }

    #[test]
    fn unknown_users_are_skipped() {
        let absences = vec![absence("x", "ghost", date(2024, 6, 10), date(2024, 6, 15), AbsenceStatus::Approved)];

        assert!(find_overlaps(date(2024, 6, 10), date(2024, 6, 12), "a", &absences, &staff()).is_empty());
    }

    #[test]
    fn plan_without_overlap_is_auto_approved() {
        let request = AbsenceRequest::new("a", date(2024, 6, 10), Some(date(2024, 6, 12)), AbsenceKind::Vacation).unwrap();

        let plan = plan_absence(request, &[], &staff());
        assert!(!plan.requires_approval());

        let absence = plan.confirm("abs-1".to_string(), Utc::now(), "Vacation");
        assert_eq!(absence.status, AbsenceStatus::Approved);
        assert!(!absence.requires_approval);
    }

    #[test]
    fn plan_with_overlap_waits_for_approval() {
        let existing = vec![absence("x", "b", date(2024, 6, 12), date(2024, 6, 15), AbsenceStatus::Pending)];
        let request = AbsenceRequest::new("a", date(2024, 6, 10), Some(date(2024, 6, 12)), AbsenceKind::Vacation).unwrap();

        let plan = plan_absence(request, &existing, &staff());
        assert_eq!(plan.overlapping_users, vec!["Bernd Kraus"]);

        let absence = plan.confirm("abs-1".to_string(), Utc::now(), "Vacation");
        assert_eq!(absence.status, AbsenceStatus::Pending);
        assert!(absence.requires_approval);
    }

    proptest! {
        #[test]
        fn overlap_matches_closed_interval_test(a in 0i64..60, len1 in 0i64..10, c in 0i64..60, len2 in 0i64..10) {
            let base = date(2024, 1, 1);
            let (start, end) = (base + chrono::Duration::days(a), base + chrono::Duration::days(a + len1));
            let (other_start, other_end) = (base + chrono::Duration::days(c), base + chrono::Duration::days(c + len2));
            let absences = vec![absence("x", "b", other_start, other_end, AbsenceStatus::Approved)];

            let reported = !find_overlaps(start, end, "a", &absences, &staff()).is_empty();

            prop_assert_eq!(reported, start <= other_end && other_start <= end);
        }
    }
}

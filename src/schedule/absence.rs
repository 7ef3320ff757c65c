use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AbsenceError {
    #[error("Absence ends ({end}) before it starts ({start})")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("A reason is required for absences of type 'other'")]
    MissingCustomReason,
    #[error("Absence {id} is already {status:?}")]
    AlreadyDecided { id: String, status: AbsenceStatus },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
    Vacation,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Absence {
    pub id: String,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub kind: AbsenceKind,
    pub status: AbsenceStatus,
    pub requires_approval: bool,
    pub created_at: DateTime<Utc>,
}

impl AbsenceStatus {
    /// Pending and approved absences both block the dates they cover.
    pub fn blocks_dates(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl Absence {
    /// Checks a record that did not come through `AbsenceRequest`, such as an
    /// imported one.
    pub fn validate(&self) -> Result<(), AbsenceError> {
        if self.end_date < self.start_date {
            return Err(AbsenceError::InvertedRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if let AbsenceKind::Other(reason) = &self.kind {
            if reason.trim().is_empty() {
                return Err(AbsenceError::MissingCustomReason);
            }
        }
        Ok(())
    }

    pub fn is_single_day(&self) -> bool {
        self.start_date == self.end_date
    }

    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Closed-interval intersection: touching endpoints overlap.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end_date && self.start_date <= end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date.iter_days().take_while(move |d| *d <= self.end_date)
    }

    pub fn approve(&mut self) -> Result<(), AbsenceError> {
        self.decide(AbsenceStatus::Approved)
    }

    pub fn reject(&mut self) -> Result<(), AbsenceError> {
        self.decide(AbsenceStatus::Rejected)
    }

    pub fn decide(&mut self, status: AbsenceStatus) -> Result<(), AbsenceError> {
        if self.status != AbsenceStatus::Pending {
            return Err(AbsenceError::AlreadyDecided {
                id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = status;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbsenceRequest {
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: AbsenceKind,
}

impl AbsenceRequest {
    /// `end_date = None` requests a single day.
    pub fn new(
        user_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        kind: AbsenceKind,
    ) -> Result<Self, AbsenceError> {
        let end_date = end_date.unwrap_or(start_date);
        if end_date < start_date {
            return Err(AbsenceError::InvertedRange {
                start: start_date,
                end: end_date,
            });
        }

        let kind = match kind {
            AbsenceKind::Other(reason) => {
                let reason = reason.trim().to_string();
                if reason.is_empty() {
                    return Err(AbsenceError::MissingCustomReason);
                }
                AbsenceKind::Other(reason)
            }
            AbsenceKind::Vacation => AbsenceKind::Vacation,
        };

        Ok(Self {
            user_id: user_id.into(),
            start_date,
            end_date,
            kind,
        })
    }

    pub fn reason(&self, vacation_label: &str) -> String {
        match &self.kind {
            AbsenceKind::Vacation => vacation_label.to_string(),
            AbsenceKind::Other(reason) => reason.clone(),
        }
    }

    pub fn into_absence(
        self,
        id: String,
        created_at: DateTime<Utc>,
        requires_approval: bool,
        vacation_label: &str,
    ) -> Absence {
        let reason = self.reason(vacation_label);
        Absence {
            id,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
            reason,
            kind: self.kind,
            status: if requires_approval {
                AbsenceStatus::Pending
            } else {
                AbsenceStatus::Approved
            },
            requires_approval,
            created_at,
        }
    }
}

/// Pending absences for the approval queue: those flagged for review first,
/// newest first within each class.
pub fn pending_requests(absences: &[Absence]) -> Vec<&Absence> {
    let mut pending: Vec<&Absence> = absences
        .iter()
        .filter(|a| a.status == AbsenceStatus::Pending)
        .collect();
    pending.sort_by(|a, b| {
        b.requires_approval
            .cmp(&a.requires_approval)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    pending
}

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::schedule::appointment::{AppointmentDraft, ScheduleSlot};
use crate::schedule::directory::{Vehicle, find_vehicle};
use crate::storage::config::{ConfigError, DisplayLabels, ScheduleConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayTiming {
    #[default]
    AllDay,
    Timed { start: NaiveTime, end: NaiveTime },
}

impl DayTiming {
    /// A timed day using the configured default hours.
    pub fn working_hours(schedule: &ScheduleConfig) -> Result<Self, ConfigError> {
        let (start, end) = schedule.working_hours()?;
        Ok(Self::Timed { start, end })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionWarning {
    NoDates,
    MissingTask,
    NoWorkers,
    NoVehicles,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpandError {
    #[error("Selection is incomplete and was not confirmed: {0:?}")]
    NeedsConfirmation(Vec<SelectionWarning>),
}

/// A drag selection resolved to dates, plus what should be scheduled on them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionRequest {
    pub dates: Vec<NaiveDate>,
    pub task: Option<String>,
    pub workers: Vec<String>,
    pub vehicle_ids: Vec<String>,
    pub notes: String,
    pub timings: HashMap<NaiveDate, DayTiming>,
}

impl SelectionRequest {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            ..Self::default()
        }
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_workers(mut self, workers: Vec<String>) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_vehicles(mut self, vehicle_ids: Vec<String>) -> Self {
        self.vehicle_ids = vehicle_ids;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_timing(mut self, date: NaiveDate, timing: DayTiming) -> Self {
        self.timings.insert(date, timing);
        self
    }

    pub fn timing_for(&self, date: NaiveDate) -> DayTiming {
        self.timings.get(&date).copied().unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<SelectionWarning> {
        let mut warnings = Vec::new();
        if self.dates.is_empty() {
            warnings.push(SelectionWarning::NoDates);
        }
        if self.task.as_deref().is_none_or(|t| t.trim().is_empty()) {
            warnings.push(SelectionWarning::MissingTask);
        }
        if self.workers.is_empty() {
            warnings.push(SelectionWarning::NoWorkers);
        }
        if self.vehicle_ids.is_empty() {
            warnings.push(SelectionWarning::NoVehicles);
        }
        warnings
    }
}

/// Maximal runs of consecutive days. Input order and duplicates don't matter.
pub fn date_runs(dates: &[NaiveDate]) -> Vec<Vec<NaiveDate>> {
    let mut sorted = dates.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut runs: Vec<Vec<NaiveDate>> = Vec::new();
    for date in sorted {
        match runs.last_mut() {
            Some(run) if run.last().and_then(|d| d.succ_opt()) == Some(date) => run.push(date),
            _ => runs.push(vec![date]),
        }
    }
    runs
}

/// One draft per (vehicle, selected day). Every draft shares one job id; each
/// run of two or more days gets its own multi-day group per vehicle.
pub fn expand_selection(
    request: &SelectionRequest,
    vehicles: &[Vehicle],
    labels: &DisplayLabels,
) -> Vec<AppointmentDraft> {
    let runs = date_runs(&request.dates);
    let job_group_id = format!("job-{}", Uuid::new_v4());
    let title = request
        .task
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| labels.unassigned_task.clone());

    let mut drafts = Vec::new();

    for vehicle_id in &request.vehicle_ids {
        let vehicle = find_vehicle(vehicles, vehicle_id);
        if vehicle.is_none() {
            tracing::warn!("Scheduling unknown vehicle {}", vehicle_id);
        }
        let equipment = vehicle.map_or_else(|| labels.unknown_vehicle.clone(), |v| v.name.clone());
        let color = vehicle.map_or_else(|| labels.default_vehicle_color.clone(), |v| v.color.clone());

        for run in &runs {
            let group_id = (run.len() > 1).then(|| format!("group-{}", Uuid::new_v4()));

            for (position, date) in run.iter().enumerate() {
                let slot = match request.timing_for(*date) {
                    DayTiming::AllDay => ScheduleSlot::AllDay(*date),
                    DayTiming::Timed { start, end } => ScheduleSlot::timed(*date, start, end),
                };

                drafts.push(AppointmentDraft {
                    title: title.clone(),
                    location: title.clone(),
                    address: String::new(),
                    customer_name: String::new(),
                    notes: request.notes.clone(),
                    workers: request.workers.clone(),
                    vehicle_id: vehicle.map(|v| v.id.clone()),
                    equipment: equipment.clone(),
                    slot,
                    color: color.clone(),
                    multi_day_group_id: group_id.clone(),
                    is_first_day: group_id.is_some() && position == 0,
                    is_last_day: group_id.is_some() && position + 1 == run.len(),
                    job_group_id: Some(job_group_id.clone()),
                });
            }
        }
    }

    tracing::debug!(
        "Expanded {} days x {} vehicles into {} drafts ({} runs)",
        runs.iter().map(Vec::len).sum::<usize>(),
        request.vehicle_ids.len(),
        drafts.len(),
        runs.len()
    );

    drafts
}

/// Like [`expand_selection`], but an incomplete request is refused unless
/// the caller forces it after showing the warnings.
pub fn expand_confirmed(
    request: &SelectionRequest,
    vehicles: &[Vehicle],
    labels: &DisplayLabels,
    force: bool,
) -> Result<Vec<AppointmentDraft>, ExpandError> {
    let warnings = request.warnings();
    if !warnings.is_empty() {
        if !force {
            return Err(ExpandError::NeedsConfirmation(warnings));
        }
        tracing::warn!("Creating appointments despite warnings: {:?}", warnings);
    }
    Ok(expand_selection(request, vehicles, labels))
}

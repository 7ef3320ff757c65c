use std::{
    env,
    io::{self, Write},
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use thiserror::Error;

use dispatch_planner::{
    layout::{
        grid::{Grid, ViewKind, grid_for},
        spans::{SpanSegment, cell_appointments, compute_spans},
        year::month_counts,
    },
    planning::{calendar_entries, find_overlaps},
    schedule::{Absence, Appointment, AppointmentRecord, ScheduleSlot, User, Vehicle, date_format},
    storage::{ScheduleStore, SnapshotStore, config::Config},
};

pub const USAGE: &str = "Usage: dispatch-planner [--db PATH] \
[--month|--week|--agenda|--year [YYYY-MM-DD]] [--import FILE] [--overlaps START END USER_ID]";

#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
    #[error("Missing value for {0}")]
    MissingValue(&'static str),
    #[error(transparent)]
    InvalidDate(#[from] date_format::DateFormatError),
}

impl CliError {
    /// Status the binary exits with, following the sysexits usage convention.
    pub fn exit_code(&self) -> u8 {
        64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    View { kind: ViewKind, anchor: NaiveDate },
    Import(PathBuf),
    Overlaps { start: NaiveDate, end: NaiveDate, user_id: String },
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub database: Option<PathBuf>,
    pub mode: CliMode,
}

#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    vehicles: Vec<Vehicle>,
    #[serde(default)]
    appointments: Vec<AppointmentRecord>,
    #[serde(default)]
    absences: Vec<Absence>,
}

pub fn parse_cli_mode() -> Result<CliArgs, CliError> {
    parse_args(env::args().skip(1), Local::now().date_naive())
}

pub fn parse_args(args: impl IntoIterator<Item = String>, today: NaiveDate) -> Result<CliArgs, CliError> {
    let mut database = None;
    let mut mode = CliMode::View { kind: ViewKind::Month, anchor: today };
    let mut args = args.into_iter().peekable();

    while let Some(arg) = args.next() {
        let view = match arg.as_str() {
            "--month" => Some(ViewKind::Month),
            "--week" => Some(ViewKind::Week),
            "--agenda" => Some(ViewKind::Day),
            "--year" => Some(ViewKind::Year),
            _ => None,
        };

        if let Some(kind) = view {
            let anchor = match args.next_if(|next| !next.starts_with("--")) {
                Some(value) => date_format::parse_date(&value)?,
                None => today,
            };
            mode = CliMode::View { kind, anchor };
            continue;
        }

        match arg.as_str() {
            "--db" => {
                database = Some(PathBuf::from(args.next().ok_or(CliError::MissingValue("--db"))?));
            }
            "--import" => {
                mode = CliMode::Import(PathBuf::from(args.next().ok_or(CliError::MissingValue("--import"))?));
            }
            "--overlaps" => {
                let start = args.next().ok_or(CliError::MissingValue("--overlaps START"))?;
                let end = args.next().ok_or(CliError::MissingValue("--overlaps END"))?;
                let user_id = args.next().ok_or(CliError::MissingValue("--overlaps USER_ID"))?;
                mode = CliMode::Overlaps {
                    start: date_format::parse_date(&start)?,
                    end: date_format::parse_date(&end)?,
                    user_id,
                };
            }
            "--help" => mode = CliMode::Help,
            _ => return Err(CliError::UnknownArgument(arg)),
        }
    }

    Ok(CliArgs { database, mode })
}

pub fn run(args: CliArgs) -> anyhow::Result<()> {
    if args.mode == CliMode::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = Config::load_or_create().context("loading configuration")?;
    let db_path = args.database.unwrap_or_else(|| config.storage.database.clone());
    let store = SnapshotStore::open(&db_path)
        .with_context(|| format!("opening schedule database {}", db_path.display()))?;

    match args.mode {
        CliMode::View { kind, anchor } => {
            let appointments = store.all_appointments()?;
            let absences = store.all_absences()?;
            let users = store.all_users()?;
            let entries = calendar_entries(&appointments, &absences, &users, &config.labels);

            let text = match kind {
                ViewKind::Year => format_year(anchor, &entries),
                ViewKind::Day => format_agenda(anchor, &entries),
                ViewKind::Week | ViewKind::Month => format_rows(&grid_for(anchor, kind), &entries),
            };
            display_with_pager(&text)?;
        }
        CliMode::Import(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            let summary = import_snapshot(&store, &content)?;
            println!("{summary}");
        }
        CliMode::Overlaps { start, end, user_id } => {
            let names = find_overlaps(start, end, &user_id, &store.all_absences()?, &store.all_users()?);
            if names.is_empty() {
                println!("No overlapping absences.");
            } else {
                println!("Overlaps with: {}", names.join(", "));
            }
        }
        CliMode::Help => {}
    }

    Ok(())
}

fn import_snapshot(store: &SnapshotStore, content: &str) -> anyhow::Result<String> {
    let snapshot: Snapshot = serde_json::from_str(content).context("parsing snapshot JSON")?;

    let appointments = snapshot
        .appointments
        .into_iter()
        .map(|record| {
            let id = record.id.clone();
            Appointment::try_from(record).with_context(|| format!("appointment {}", id))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    store
        .import(&snapshot.users, &snapshot.vehicles, &appointments, &snapshot.absences)
        .context("writing snapshot")?;

    Ok(format!(
        "Imported {} users, {} vehicles, {} appointments, {} absences",
        snapshot.users.len(),
        snapshot.vehicles.len(),
        appointments.len(),
        snapshot.absences.len()
    ))
}

fn time_label(slot: &ScheduleSlot) -> String {
    match slot {
        ScheduleSlot::AllDay(_) => "All Day".to_string(),
        ScheduleSlot::Timed { start, end } => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
    }
}

fn segment_bar(segment: &SpanSegment, width: usize) -> String {
    (0..width)
        .map(|col| {
            if col < segment.start_col || col > segment.end_col {
                '.'
            } else if col == segment.start_col && segment.is_first_row_segment {
                '['
            } else if col == segment.end_col && segment.is_last_row_segment {
                ']'
            } else {
                '='
            }
        })
        .collect()
}

pub fn format_rows(grid: &Grid, entries: &[Appointment]) -> String {
    let spans = compute_spans(entries, grid);
    let width = grid.row_width().unwrap_or(7);
    let mut lines = Vec::new();

    for (row, dates) in grid.rows().into_iter().enumerate() {
        let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
            continue;
        };
        lines.push(format!("{} - {}", first.format("%a %b %d"), last.format("%a %b %d, %Y")));

        let mut row_spans: Vec<&SpanSegment> = spans.iter().filter(|s| s.row == row).collect();
        row_spans.sort_by_key(|s| s.lane);
        for segment in row_spans {
            lines.push(format!("  {} {}", segment_bar(segment, width), segment.label));
        }

        for date in dates {
            for apt in cell_appointments(entries, *date) {
                lines.push(format!("  {} {:<13} {}", date.format("%a %d"), time_label(&apt.slot), apt.label()));
            }
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn format_agenda(date: NaiveDate, entries: &[Appointment]) -> String {
    let mut lines = vec![format!("Agenda - {}", date.format("%A, %B %d, %Y")), String::new()];

    let grid = grid_for(date, ViewKind::Day);
    let spans = compute_spans(entries, &grid);
    let mut singles = cell_appointments(entries, date);
    singles.sort_by_key(|a| a.slot.starts_at());

    if spans.is_empty() && singles.is_empty() {
        lines.push("No appointments scheduled.".to_string());
    }
    for segment in &spans {
        lines.push(format!("- {:<13} {} (multi-day)", "All Day", segment.label));
    }
    for apt in singles {
        let mut line = format!("- {:<13} {}", time_label(&apt.slot), apt.label());
        if !apt.location.is_empty() && apt.location != apt.title {
            line.push_str(&format!(" @ {}", apt.location));
        }
        lines.push(line);
    }

    lines.join("\n")
}

pub fn format_year(anchor: NaiveDate, entries: &[Appointment]) -> String {
    month_counts(entries, anchor)
        .into_iter()
        .map(|summary| {
            let noun = if summary.appointment_count == 1 { "appointment" } else { "appointments" };
            format!("{:<10} {:>4} {}", summary.month.format("%B"), summary.appointment_count, noun)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let Some(cmd) = parts.next() else {
        println!("{text}");
        return Ok(());
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            println!("{text}");
        }
    }

    Ok(())
}

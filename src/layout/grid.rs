use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Unknown calendar view '{0}'")]
pub struct UnknownView(pub String);

impl FromStr for ViewKind {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(UnknownView(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Ordered calendar cells for one view. Day, week and month grids are runs of
/// consecutive days; a year grid holds the first day of each month.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub kind: ViewKind,
    pub anchor: NaiveDate,
    pub cells: Vec<NaiveDate>,
}

impl Grid {
    /// Cells per rendered row, or `None` when the grid has no day rows.
    pub fn row_width(&self) -> Option<usize> {
        match self.kind {
            ViewKind::Day => Some(1),
            ViewKind::Week | ViewKind::Month => Some(7),
            ViewKind::Year => None,
        }
    }

    pub fn rows(&self) -> Vec<&[NaiveDate]> {
        match self.row_width() {
            Some(width) => self.cells.chunks(width).collect(),
            None => vec![self.cells.as_slice()],
        }
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.cells.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.cells.last().copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if self.kind == ViewKind::Year {
            return self.cells.iter().position(|c| *c == date);
        }
        let first = self.first()?;
        let offset = (date - first).num_days();
        usize::try_from(offset)
            .ok()
            .filter(|idx| self.cells.get(*idx) == Some(&date))
    }
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(days_from_monday))
        .unwrap_or(date)
}

pub fn week_end(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - date.weekday().num_days_from_monday() as u64;
    date.checked_add_days(Days::new(days_to_sunday))
        .unwrap_or(date)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

pub fn grid_for(anchor: NaiveDate, kind: ViewKind) -> Grid {
    let cells = match kind {
        ViewKind::Day => vec![anchor],
        ViewKind::Week => days_between(week_start(anchor), week_end(anchor)),
        ViewKind::Month => days_between(
            week_start(first_of_month(anchor)),
            week_end(last_of_month(anchor)),
        ),
        ViewKind::Year => (1..=12)
            .filter_map(|month| NaiveDate::from_ymd_opt(anchor.year(), month, 1))
            .collect(),
    };

    Grid { kind, anchor, cells }
}

/// Steps the anchor by one unit of the view. Month and year steps clamp to the
/// last valid day of the target month.
pub fn navigate(date: NaiveDate, direction: Direction, kind: ViewKind) -> NaiveDate {
    let stepped = match (kind, direction) {
        (ViewKind::Day, Direction::Previous) => date.checked_sub_days(Days::new(1)),
        (ViewKind::Day, Direction::Next) => date.checked_add_days(Days::new(1)),
        (ViewKind::Week, Direction::Previous) => date.checked_sub_days(Days::new(7)),
        (ViewKind::Week, Direction::Next) => date.checked_add_days(Days::new(7)),
        (ViewKind::Month, Direction::Previous) => date.checked_sub_months(Months::new(1)),
        (ViewKind::Month, Direction::Next) => date.checked_add_months(Months::new(1)),
        (ViewKind::Year, Direction::Previous) => date.checked_sub_months(Months::new(12)),
        (ViewKind::Year, Direction::Next) => date.checked_add_months(Months::new(12)),
    };
    stepped.unwrap_or(date)
}

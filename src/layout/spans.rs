use std::collections::HashMap;

use chrono::NaiveDate;

use crate::layout::grid::Grid;
use crate::schedule::Appointment;

/// One row-bounded piece of a multi-day group as drawn on a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanSegment<'a> {
    pub group_id: String,
    pub appointments: Vec<&'a Appointment>,
    pub row: usize,
    /// Stack position among the segments sharing this row.
    pub lane: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub color: String,
    pub label: String,
    /// Set only on the segment holding the group's real first day.
    pub is_first_row_segment: bool,
    /// Set only on the segment holding the group's real last day.
    pub is_last_row_segment: bool,
}

impl SpanSegment<'_> {
    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    pub fn dates<'g>(&self, grid: &'g Grid) -> &'g [NaiveDate] {
        let Some(width) = grid.row_width() else {
            return &[];
        };
        let offset = self.row * width;
        grid.cells
            .get(offset + self.start_col..=offset + self.end_col)
            .unwrap_or(&[])
    }
}

struct GroupBounds<'a> {
    id: &'a str,
    members: Vec<&'a Appointment>,
    start: NaiveDate,
    end: NaiveDate,
}

/// Single-day appointments of one cell. Grouped appointments are only ever
/// drawn as spans.
pub fn cell_appointments(appointments: &[Appointment], date: NaiveDate) -> Vec<&Appointment> {
    appointments
        .iter()
        .filter(|a| a.multi_day_group_id.is_none() && a.day() == date)
        .collect()
}

/// Tallest single-day stack of any cell in a row.
pub fn row_single_day_load(appointments: &[Appointment], row: &[NaiveDate]) -> usize {
    row.iter()
        .map(|date| cell_appointments(appointments, *date).len())
        .max()
        .unwrap_or(0)
}

fn collect_groups(appointments: &[Appointment]) -> Vec<GroupBounds<'_>> {
    let mut order: Vec<(&str, Vec<&Appointment>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for apt in appointments {
        let Some(group_id) = apt.multi_day_group_id.as_deref() else {
            continue;
        };
        match index.get(group_id) {
            Some(&slot) => order[slot].1.push(apt),
            None => {
                index.insert(group_id, order.len());
                order.push((group_id, vec![apt]));
            }
        }
    }

    order
        .into_iter()
        .filter_map(|(id, mut members)| {
            members.sort_by_key(|a| a.slot.starts_at());
            let first = members.first()?.day();
            let last = members.last()?.day();

            let start = members
                .iter()
                .find(|a| a.is_first_day)
                .map_or(first, |a| a.day());
            let end = members
                .iter()
                .rev()
                .find(|a| a.is_last_day)
                .map_or(last, |a| a.day());
            let (start, end) = if start <= end { (start, end) } else { (end, start) };

            Some(GroupBounds { id, members, start, end })
        })
        .collect()
}

/// Splits every multi-day group visible on `grid` into per-row segments.
///
/// Groups are clipped to the grid: a group running in from the previous month
/// yields segments for its visible days, with `is_first_row_segment` left unset.
/// Segments come out in the order groups are first met in `appointments`, which
/// is also their stacking order within a row.
pub fn compute_spans<'a>(appointments: &'a [Appointment], grid: &Grid) -> Vec<SpanSegment<'a>> {
    let (Some(width), Some(grid_first), Some(grid_last)) = (grid.row_width(), grid.first(), grid.last()) else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    let mut lanes: HashMap<usize, usize> = HashMap::new();

    for group in collect_groups(appointments) {
        if group.end < grid_first || group.start > grid_last {
            continue;
        }

        let visible_start = group.start.max(grid_first);
        let visible_end = group.end.min(grid_last);
        let (Some(start_idx), Some(end_idx)) = (grid.index_of(visible_start), grid.index_of(visible_end)) else {
            continue;
        };

        let lead = group.members[0];
        let start_row = start_idx / width;
        let end_row = end_idx / width;

        for row in start_row..=end_row {
            let row_first = row * width;
            let row_last = row_first + width - 1;

            let lane = lanes.entry(row).or_insert(0);
            segments.push(SpanSegment {
                group_id: group.id.to_string(),
                appointments: group.members.clone(),
                row,
                lane: *lane,
                start_col: start_idx.max(row_first) - row_first,
                end_col: end_idx.min(row_last) - row_first,
                color: lead.color.clone(),
                label: lead.label().to_string(),
                is_first_row_segment: row == start_row && group.start >= grid_first,
                is_last_row_segment: row == end_row && group.end <= grid_last,
            });
            *lane += 1;
        }
    }

    tracing::debug!(
        "Computed {} span segments for {:?} grid anchored at {}",
        segments.len(),
        grid.kind,
        grid.anchor
    );

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::grid::{ViewKind, grid_for};
    use crate::schedule::appointment::fixtures::{appointment, date, multi_day};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn columns(segments: &[SpanSegment]) -> Vec<(usize, usize, usize)> {
        segments.iter().map(|s| (s.row, s.start_col, s.end_col)).collect()
    }

    #[test]
    fn cell_excludes_grouped_appointments() {
        let mut all = multi_day("g1", date(2024, 3, 5), 2);
        all.push(appointment("single", date(2024, 3, 5)));
        all.push(appointment("other-day", date(2024, 3, 6)));

        let cell = cell_appointments(&all, date(2024, 3, 5));

        assert_eq!(cell.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["single"]);
    }

    #[test]
    fn row_load_counts_busiest_cell() {
        let all = vec![
            appointment("a", date(2024, 3, 5)),
            appointment("b", date(2024, 3, 5)),
            appointment("c", date(2024, 3, 6)),
        ];
        let grid = grid_for(date(2024, 3, 5), ViewKind::Week);

        assert_eq!(row_single_day_load(&all, grid.rows()[0]), 2);
    }

    #[test]
    fn span_within_one_week_is_single_segment() {
        // 2024-03-05 is a Tuesday.
        let all = multi_day("g1", date(2024, 3, 5), 3);
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        let spans = compute_spans(&all, &grid);

        assert_eq!(columns(&spans), vec![(1, 1, 3)]);
        assert!(spans[0].is_first_row_segment);
        assert!(spans[0].is_last_row_segment);
        assert_eq!(spans[0].label, "Truck 1");
        assert_eq!(spans[0].appointments.len(), 3);
    }

    #[test]
    fn span_crossing_weeks_splits_at_row_boundaries() {
        // Friday 2024-03-08 through Tuesday 2024-03-19.
        let all = multi_day("g1", date(2024, 3, 8), 12);
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        let spans = compute_spans(&all, &grid);

        assert_eq!(columns(&spans), vec![(1, 4, 6), (2, 0, 6), (3, 0, 1)]);
        let flags: Vec<_> = spans.iter().map(|s| (s.is_first_row_segment, s.is_last_row_segment)).collect();
        assert_eq!(flags, vec![(true, false), (false, false), (false, true)]);
        assert_eq!(spans[1].width(), 7);
    }

    #[test]
    fn week_view_emits_one_segment() {
        let all = multi_day("g1", date(2024, 3, 5), 3);
        let grid = grid_for(date(2024, 3, 6), ViewKind::Week);

        let spans = compute_spans(&all, &grid);

        assert_eq!(columns(&spans), vec![(0, 1, 3)]);
    }

    #[test]
    fn group_starting_before_grid_is_clipped() {
        // Runs 2024-02-20 .. 2024-02-28; the March grid starts on 2024-02-26.
        let all = multi_day("g1", date(2024, 2, 20), 9);
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        let spans = compute_spans(&all, &grid);

        assert_eq!(columns(&spans), vec![(0, 0, 2)]);
        assert!(!spans[0].is_first_row_segment);
        assert!(spans[0].is_last_row_segment);
    }

    #[test]
    fn group_ending_after_grid_is_clipped() {
        let all = multi_day("g1", date(2024, 3, 30), 4);
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        let spans = compute_spans(&all, &grid);

        assert_eq!(columns(&spans), vec![(4, 5, 6)]);
        assert!(spans[0].is_first_row_segment);
        assert!(!spans[0].is_last_row_segment);
    }

    #[test]
    fn group_outside_grid_yields_nothing() {
        let all = multi_day("g1", date(2024, 5, 1), 3);
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        assert!(compute_spans(&all, &grid).is_empty());
    }

    #[test]
    fn day_view_shows_one_cell_of_a_running_group() {
        let all = multi_day("g1", date(2024, 3, 5), 3);
        let grid = grid_for(date(2024, 3, 6), ViewKind::Day);

        let spans = compute_spans(&all, &grid);

        assert_eq!(columns(&spans), vec![(0, 0, 0)]);
        assert!(!spans[0].is_first_row_segment);
        assert!(!spans[0].is_last_row_segment);
    }

    #[test]
    fn year_grid_has_no_spans() {
        let all = multi_day("g1", date(2024, 3, 1), 3);
        let grid = grid_for(date(2024, 3, 1), ViewKind::Year);

        assert!(compute_spans(&all, &grid).is_empty());
    }

    #[test]
    fn unordered_input_is_sorted_by_date() {
        let mut all = multi_day("g1", date(2024, 3, 5), 3);
        all.reverse();
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        let spans = compute_spans(&all, &grid);

        assert_eq!(columns(&spans), vec![(1, 1, 3)]);
        assert_eq!(spans[0].appointments[0].id, "g1-0");
    }

    #[test]
    fn missing_markers_fall_back_to_sort_order() {
        let mut all = multi_day("g1", date(2024, 3, 5), 3);
        for apt in &mut all {
            apt.is_first_day = false;
            apt.is_last_day = false;
        }
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        assert_eq!(columns(&compute_spans(&all, &grid)), vec![(1, 1, 3)]);
    }

    #[test]
    fn stacking_follows_first_encounter_order() {
        let mut all = vec![appointment("noise", date(2024, 3, 4))];
        let mut second = multi_day("b", date(2024, 3, 6), 2);
        second[0].color = "#000000".to_string();
        all.push(second[1].clone());
        all.extend(multi_day("a", date(2024, 3, 5), 3));
        all.push(second[0].clone());
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        let spans = compute_spans(&all, &grid);

        let order: Vec<_> = spans.iter().map(|s| (s.group_id.as_str(), s.lane)).collect();
        assert_eq!(order, vec![("b", 0), ("a", 1)]);
        assert_eq!(spans[0].color, "#000000");
    }

    #[test]
    fn lanes_are_counted_per_row() {
        let mut all = multi_day("long", date(2024, 3, 8), 4);
        all.extend(multi_day("late", date(2024, 3, 11), 2));
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        let spans = compute_spans(&all, &grid);

        let lanes: Vec<_> = spans.iter().map(|s| (s.group_id.as_str(), s.row, s.lane)).collect();
        assert_eq!(lanes, vec![("long", 1, 0), ("long", 2, 0), ("late", 2, 1)]);
    }

    #[test]
    fn label_falls_back_to_title() {
        let mut all = multi_day("g1", date(2024, 3, 5), 2);
        for apt in &mut all {
            apt.equipment.clear();
        }
        let grid = grid_for(date(2024, 3, 1), ViewKind::Month);

        assert_eq!(compute_spans(&all, &grid)[0].label, "Job g1-0");
    }

    proptest! {
        #[test]
        fn contained_group_is_covered_exactly_once(offset in 0u64..35, len in 1u64..35) {
            let grid = grid_for(date(2024, 3, 1), ViewKind::Month);
            let len = len.min(35 - offset);
            let first = grid.cells[offset as usize];
            let all = multi_day("g", first, len);

            let spans = compute_spans(&all, &grid);

            let covered: Vec<NaiveDate> = spans.iter().flat_map(|s| s.dates(&grid).to_vec()).collect();
            let expected: Vec<NaiveDate> = all.iter().map(|a| a.day()).collect();
            prop_assert_eq!(covered, expected);
            prop_assert_eq!(spans.iter().filter(|s| s.is_first_row_segment).count(), 1);
            prop_assert_eq!(spans.iter().filter(|s| s.is_last_row_segment).count(), 1);
            prop_assert!(spans[0].is_first_row_segment);
            prop_assert!(spans[spans.len() - 1].is_last_row_segment);
        }
    }
}

use std::fmt::Write;

use chrono::{FixedOffset, NaiveDate};

use crate::{
    models::session::Session,
    views::{
        duration::format_duration,
        filter::{filter_by_day, DayFilter},
    },
};

const HEADERS: [&str; 6] = ["Id", "Start", "End", "Total Time", "Tag", "Description"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub id: i64,
    pub start: String,
    pub end: String,
    pub total: String,
    pub tag: String,
    pub description: String,
    /// Whether the description of this row may be edited inline.
    pub editable: bool,
}

impl SessionRow {
    fn cells(&self) -> [String; 6] {
        let id = if self.editable {
            format!("{}*", self.id)
        } else {
            self.id.to_string()
        };
        [
            id,
            self.start.clone(),
            self.end.clone(),
            self.total.clone(),
            self.tag.clone(),
            self.description.clone(),
        ]
    }
}

/// The session table after day filtering.
#[derive(Debug, Clone)]
pub struct SessionTable {
    rows: Vec<SessionRow>,
}

impl SessionTable {
    /// `editable` names the one session whose description can be edited;
    /// it is marked with `*` when rendered.
    pub fn new(
        sessions: &[Session],
        filter: DayFilter,
        today: NaiveDate,
        offset: &FixedOffset,
        editable: Option<i64>,
    ) -> Self {
        let rows = filter_by_day(sessions, filter, today, offset)
            .into_iter()
            .map(|s| SessionRow {
                id: s.id,
                start: s.start.with_timezone(offset).format("%Y-%m-%d %H:%M").to_string(),
                end: match s.end {
                    Some(end) => end.with_timezone(offset).format("%H:%M").to_string(),
                    None => "in progress".to_string(),
                },
                total: s
                    .end
                    .map(|end| format_duration(s.start, end))
                    .unwrap_or_default(),
                editable: editable == Some(s.id),
                tag: s.tag,
                description: s.description,
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[SessionRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let cells: Vec<[String; 6]> = self.rows.iter().map(SessionRow::cells).collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        write_line(&mut out, &HEADERS.map(String::from), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("  "));
        for row in &cells {
            write_line(&mut out, row, &widths);
        }
        out
    }
}

fn write_line(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    let _ = writeln!(out, "{}", padded.join("  ").trim_end());
}

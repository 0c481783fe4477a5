//! Report rendering.
//!
//! A plan is laid out as sheets: one per week ("Week 1" .. "Week N") plus
//! a final "Analytics" sheet. Sheets can be printed as aligned text,
//! written as one CSV file each, or the whole plan dumped as JSON.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::analytics::AnalyticsRecord;
use crate::error::Result;
use crate::planner::Plan;
use crate::projection::WeeklyView;

/// Title of the analytics sheet.
pub const ANALYTICS_SHEET: &str = "Analytics";

/// A titled table of strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Sheet title.
    pub name: String,
    /// Column headers.
    pub header: Vec<String>,
    /// Data rows, each as wide as `header`.
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// File stem for this sheet ("Week 3" → "week_3").
    pub fn file_stem(&self) -> String {
        self.name.to_lowercase().replace(' ', "_")
    }

    /// Renders as space-aligned text with a title line.
    pub fn to_text(&self) -> String {
        let widths: Vec<usize> = (0..self.header.len())
            .map(|c| {
                std::iter::once(&self.header)
                    .chain(&self.rows)
                    .filter_map(|r| r.get(c))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let _ = writeln!(out, "{}:", self.name);
        for row in std::iter::once(&self.header).chain(&self.rows) {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell:<w$}"))
                .collect();
            let _ = writeln!(out, "{}", line.join("  ").trim_end());
        }
        out
    }
}

/// Sheet for one week.
pub fn week_sheet(view: &WeeklyView) -> Sheet {
    let header = std::iter::once("Employee".to_string())
        .chain(view.column_labels())
        .collect();
    let rows = view
        .rows
        .iter()
        .map(|r| {
            std::iter::once(r.employee.clone())
                .chain(r.cells.iter().map(ToString::to_string))
                .collect::<Vec<String>>()
        })
        .collect();
    Sheet {
        name: view.title(),
        header,
        rows,
    }
}

/// The analytics sheet. Variant columns follow the first record's variants.
pub fn analytics_sheet(records: &[AnalyticsRecord]) -> Sheet {
    let variants: Vec<char> = records
        .first()
        .map(|r| r.variants.iter().map(|v| v.variant).collect())
        .unwrap_or_default();

    let mut header: Vec<String> = [
        "Employee",
        "Multiplier",
        "Regularly Unavailable Days",
        "Individually Unavailable Days",
        "Target Hours",
        "Scheduled Hours",
        "Hours %",
        "Weekday Shifts",
        "Weekend Shifts",
        "% Weekday Shifts",
        "% Weekend Shifts",
        "Morning Shifts (Weekday)",
        "Evening Shifts (Weekday)",
        "% Morning Shifts (Weekday)",
        "% Evening Shifts (Weekday)",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    for v in &variants {
        header.push(format!("Shift {v} Count"));
        header.push(format!("% Shift {v}"));
    }

    let rows = records
        .iter()
        .map(|r| {
            let mut row = vec![
                r.employee.clone(),
                format!("{:.2}", r.multiplier),
                r.regularly_unavailable.join(", "),
                r.individually_unavailable
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                format!("{:.1}", r.target_hours),
                format!("{:.1}", r.scheduled_hours),
                format!("{:.1}", r.hours_pct),
                r.weekday_shifts.to_string(),
                r.weekend_shifts.to_string(),
                format!("{:.1}", r.weekday_pct),
                format!("{:.1}", r.weekend_pct),
                r.morning_shifts.to_string(),
                r.evening_shifts.to_string(),
                format!("{:.1}", r.morning_pct),
                format!("{:.1}", r.evening_pct),
            ];
            for v in &variants {
                let (count, pct) = r.variant(*v).map(|s| (s.count, s.pct)).unwrap_or((0, 0.0));
                row.push(count.to_string());
                row.push(format!("{pct:.1}"));
            }
            row
        })
        .collect();

    Sheet {
        name: ANALYTICS_SHEET.to_string(),
        header,
        rows,
    }
}

/// All sheets of a plan: weeks in order, then analytics.
pub fn sheets(plan: &Plan) -> Vec<Sheet> {
    plan.weeks
        .iter()
        .map(week_sheet)
        .chain(std::iter::once(analytics_sheet(&plan.analytics)))
        .collect()
}

/// Renders every sheet as text, separated by blank lines.
pub fn render_text(plan: &Plan) -> String {
    let mut out = format!(
        "Solution found on attempt {} with margin {}\n\n",
        plan.attempts, plan.window
    );
    let body: Vec<String> = sheets(plan).iter().map(Sheet::to_text).collect();
    out.push_str(&body.join("\n"));
    out
}

/// Writes one CSV file per sheet into `dir`, creating it if needed.
///
/// Returns the written paths in sheet order.
pub fn write_csv_dir(plan: &Plan, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for sheet in sheets(plan) {
        let path = dir.join(format!("{}.csv", sheet.file_stem()));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&sheet.header)?;
        for row in &sheet.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "wrote CSV report");
    Ok(written)
}

/// Writes the whole plan as pretty JSON.
pub fn write_json(plan: &Plan, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, plan)?;
    info!(path = %path.display(), "wrote JSON report");
    Ok(())
}

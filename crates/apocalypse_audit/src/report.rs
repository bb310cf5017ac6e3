//! Report presentation helpers
//!
//! Everything the report page shows that is data rather than markup:
//! the countdown banner, the last-audit line, table rows, downloads and
//! pagination.

use crate::error::Result;
use crate::types::{AuditRecord, AuditRun};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

pub const EXPORT_FILE_STEM: &str = "flash-apocalypse-report";
pub const EMPTY_STATE_MESSAGE: &str = "No Flash objects were found in your site.";
pub const NO_AUDIT_MESSAGE: &str = "No audit has been run yet.";
pub const APOCALYPSE_HERE_MESSAGE: &str =
    "Flash apocalypse is here - Flash is no longer supported.";
pub const DEFAULT_PER_PAGE: u64 = 50;

/// Explanation shown under the banner on the report page.
pub const DESCRIPTION: &str = "Support for Adobe Flash is coming to an end. By mid-2019 most \
browsers will disable Flash player support and this will impact sites with Flash based content.

This report lists activities in your site that contain flash-based content that need to be \
replaced as they will no longer work.

If you require help converting your old flash content, contact the certified partner \
Catalyst IT (https://www.catalyst.net.nz/products/moodle/).";

pub const TABLE_HEADERS: [&str; 5] = ["Category", "Course", "Type", "Activity", "HTML5 present"];

const EXPORT_HEADERS: [&str; 7] = [
    "Category",
    "Course",
    "Course URL",
    "Type",
    "Activity",
    "Activity URL",
    "HTML5 present",
];

const SECONDS_PER_DAY: i64 = 86_400;

// ============================================================================
// Banner
// ============================================================================

/// Whole days from `now` until `cutoff`, rounded down. Negative once passed.
pub fn days_remaining(cutoff: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (cutoff - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

pub fn banner(days_remaining: i64) -> String {
    if days_remaining > 0 {
        format!("Flash apocalypse in {} days", days_remaining)
    } else {
        APOCALYPSE_HERE_MESSAGE.to_string()
    }
}

// ============================================================================
// Last audit
// ============================================================================

/// "N seconds/minutes/hours/days ago", or the date for anything over a week.
pub fn format_elapsed(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 0 {
        return "just now".to_string();
    }

    if secs < 60 {
        format!("{} second{} ago", secs, if secs == 1 { "" } else { "s" })
    } else if secs < 3600 {
        let mins = secs / 60;
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if secs < SECONDS_PER_DAY {
        let hours = secs / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if secs < 7 * SECONDS_PER_DAY {
        let days = secs / SECONDS_PER_DAY;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        then.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

pub fn last_audit_line(last_run: Option<&AuditRun>, now: DateTime<Utc>) -> String {
    match last_run.and_then(AuditRun::run_at_utc) {
        Some(at) => format!("Last audit: {}", format_elapsed(at, now)),
        None => NO_AUDIT_MESSAGE.to_string(),
    }
}

// ============================================================================
// Rows
// ============================================================================

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Display cells in [`TABLE_HEADERS`] order.
pub fn table_row(record: &AuditRecord) -> Vec<String> {
    vec![
        record.category.clone(),
        record.course_full_name.clone(),
        record.activity_type.to_string(),
        record.activity_name.clone(),
        yes_no(record.html5_present).to_string(),
    ]
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    category: &'a str,
    course: &'a str,
    course_url: &'a str,
    #[serde(rename = "type")]
    activity_type: &'a str,
    activity: &'a str,
    activity_url: &'a str,
    html5_present: bool,
}

impl<'a> From<&'a AuditRecord> for ExportRow<'a> {
    fn from(record: &'a AuditRecord) -> Self {
        Self {
            category: &record.category,
            course: &record.course_full_name,
            course_url: &record.course_url,
            activity_type: record.activity_type.as_str(),
            activity: &record.activity_name,
            activity_url: &record.activity_url,
            html5_present: record.html5_present,
        }
    }
}

// ============================================================================
// Downloads
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// `flash-apocalypse-report.<ext>`
    pub fn default_file_name(self) -> String {
        format!("{}.{}", EXPORT_FILE_STEM, self.extension())
    }

    pub fn write<W: Write>(self, records: &[AuditRecord], writer: W) -> Result<()> {
        match self {
            ExportFormat::Csv => write_csv(records, writer),
            ExportFormat::Json => write_json(records, writer),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{other}' (expected csv or json)")),
        }
    }
}

pub fn write_csv<W: Write>(records: &[AuditRecord], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(EXPORT_HEADERS)?;
    for record in records {
        csv.write_record([
            record.category.as_str(),
            record.course_full_name.as_str(),
            record.course_url.as_str(),
            record.activity_type.as_str(),
            record.activity_name.as_str(),
            record.activity_url.as_str(),
            yes_no(record.html5_present),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(records: &[AuditRecord], mut writer: W) -> Result<()> {
    let rows: Vec<ExportRow<'_>> = records.iter().map(ExportRow::from).collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writeln!(writer)?;
    Ok(())
}

// ============================================================================
// Pagination
// ============================================================================

/// Zero-based page of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
}

impl Pagination {
    /// `per_page` of 0 falls back to the default page size.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page,
            per_page: if per_page == 0 { DEFAULT_PER_PAGE } else { per_page },
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }

    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page)
    }
}

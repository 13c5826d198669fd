//! Builders for the derived evidence item kinds.
//!
//! Each builder validates its input and returns a ready `EvidenceItem`;
//! nothing here touches the network. `CredentialServiceClient` wraps them
//! and posts the result through `create_evidence_item`.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::types::{EvidenceCategory, EvidenceItem};

const SECONDS_PER_DAY: i64 = 86_400;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Grade evidence. `grade` must be a number in the closed range 0..=100;
/// its string form is sent verbatim.
pub fn grade_item(grade: impl Display, description: &str, hidden: bool) -> Result<EvidenceItem> {
    let grade = grade.to_string();
    let in_range = grade
        .trim()
        .parse::<f64>()
        .map(|value| value.is_finite() && (0.0..=100.0).contains(&value))
        .unwrap_or(false);
    if !in_range {
        return Err(ApiError::InvalidArgument(format!(
            "{grade} must be a numeric value between 0 and 100."
        )));
    }

    Ok(EvidenceItem {
        description: description.to_string(),
        category: EvidenceCategory::Grade,
        string_object: grade,
        hidden,
    })
}

#[derive(Debug, Serialize)]
struct DurationInfo {
    start_date: String,
    end_date: String,
    duration_in_days: i64,
}

/// Course duration evidence computed from an enrollment window.
///
/// The day count is the floor of the elapsed seconds over 86400. A zero
/// count is still accepted when the two instants fall on different calendar
/// days (an overnight completion), in which case it is reported as one day.
/// Identical calendar days with a zero count are rejected.
pub fn duration_item(start_date: &str, end_date: &str, hidden: bool) -> Result<EvidenceItem> {
    let start = parse_instant(start_date)?;
    let end = parse_instant(end_date)?;

    let mut info = DurationInfo {
        start_date: start.date_naive().format("%Y-%m-%d").to_string(),
        end_date: end.date_naive().format("%Y-%m-%d").to_string(),
        duration_in_days: (end - start).num_seconds().div_euclid(SECONDS_PER_DAY),
    };

    let description = if info.duration_in_days != 0 {
        format!("Completed in {} days", info.duration_in_days)
    } else if info.start_date != info.end_date {
        info.duration_in_days = 1;
        "Completed in 1 day".to_string()
    } else {
        return Err(ApiError::InvalidArgument(
            "Enrollment duration must be greater than 0.".to_string(),
        ));
    };

    let string_object =
        serde_json::to_string(&info).map_err(|e| ApiError::Serialization(e.to_string()))?;

    Ok(EvidenceItem {
        description,
        category: EvidenceCategory::CourseDuration,
        string_object,
        hidden,
    })
}

#[derive(Debug, Serialize)]
struct TranscriptLine {
    category: String,
    percent: Value,
}

/// Transcript evidence: one `{category, percent}` line per entry, in the
/// order given.
pub fn transcript_item<I, K, V>(entries: I, hidden: bool) -> Result<EvidenceItem>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let lines: Vec<TranscriptLine> = entries
        .into_iter()
        .map(|(category, percent)| TranscriptLine {
            category: category.into(),
            percent: percent.into(),
        })
        .collect();
    let string_object =
        serde_json::to_string(&lines).map_err(|e| ApiError::Serialization(e.to_string()))?;

    Ok(EvidenceItem {
        description: "Course Transcript".to_string(),
        category: EvidenceCategory::Transcript,
        string_object,
        hidden,
    })
}

/// Parse a date or timestamp into UTC. Inputs without an offset are taken
/// as UTC; offset timestamps are converted so calendar dates compare in one
/// timezone.
fn parse_instant(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| ApiError::InvalidArgument(format!("{input} is not a valid date.")))?;

    Ok(naive.and_utc())
}

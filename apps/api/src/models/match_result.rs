use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One evaluated (project, developer) pair. The pair is unique in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub project_id: i32,
    pub developer_id: i32,
    pub technical_match: f64,
    pub ai_technical_affinity: i32,
    pub ai_motivational_affinity: i32,
    pub ai_experience_relevance: i32,
    pub ai_comment: String,
    pub created_at: DateTime<Utc>,
}

impl MatchResult {
    /// Unweighted mean of the technical match and the three AI metrics.
    /// Computed on read, never stored.
    pub fn composite_score(&self) -> f64 {
        (self.technical_match
            + self.ai_technical_affinity as f64
            + self.ai_motivational_affinity as f64
            + self.ai_experience_relevance as f64)
            / 4.0
    }

    /// Copies the mutable fields and timestamp of `newer` into `self`, keeping the key.
    pub fn overwrite_with(&mut self, newer: &MatchResult) {
        self.technical_match = newer.technical_match;
        self.ai_technical_affinity = newer.ai_technical_affinity;
        self.ai_motivational_affinity = newer.ai_motivational_affinity;
        self.ai_experience_relevance = newer.ai_experience_relevance;
        self.ai_comment = newer.ai_comment.clone();
        self.created_at = newer.created_at;
    }
}

/// Stored shape of a match. The AI columns are nullable and `created_at`
/// is an ISO-8601 string column.
#[derive(Debug, Clone, FromRow)]
pub struct MatchRow {
    pub project_id: i32,
    pub developer_id: i32,
    pub technical_match: f64,
    pub ai_technical_affinity: Option<i32>,
    pub ai_motivational_affinity: Option<i32>,
    pub ai_experience_relevance: Option<i32>,
    pub ai_comment: Option<String>,
    pub created_at: String,
}

impl MatchRow {
    pub fn into_result(self) -> MatchResult {
        MatchResult {
            project_id: self.project_id,
            developer_id: self.developer_id,
            technical_match: self.technical_match,
            ai_technical_affinity: self.ai_technical_affinity.unwrap_or_default(),
            ai_motivational_affinity: self.ai_motivational_affinity.unwrap_or_default(),
            ai_experience_relevance: self.ai_experience_relevance.unwrap_or_default(),
            ai_comment: self.ai_comment.unwrap_or_default(),
            created_at: parse_timestamp(&self.created_at).unwrap_or_default(),
        }
    }
}

/// Format written to the `created_at` column.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts RFC 3339, Postgres `timestamptz` text, and zone-less ISO strings (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(technical: f64, a: i32, b: i32, c: i32) -> MatchResult {
        MatchResult {
            project_id: 1,
            developer_id: 2,
            technical_match: technical,
            ai_technical_affinity: a,
            ai_motivational_affinity: b,
            ai_experience_relevance: c,
            ai_comment: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_composite_is_mean_of_four_terms() {
        let r = result(50.0, 80, 70, 0);
        assert!((r.composite_score() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overwrite_keeps_key() {
        let mut existing = result(10.0, 10, 10, 10);
        let mut newer = result(90.0, 80, 70, 60);
        newer.project_id = 99;
        newer.ai_comment = "better".to_string();
        existing.overwrite_with(&newer);
        assert_eq!(existing.project_id, 1);
        assert_eq!(existing.ai_technical_affinity, 80);
        assert_eq!(existing.ai_comment, "better");
        assert_eq!(existing.created_at, newer.created_at);
    }

    fn legacy_row() -> MatchRow {
        MatchRow {
            project_id: 4,
            developer_id: 9,
            technical_match: 75.0,
            ai_technical_affinity: None,
            ai_motivational_affinity: Some(60),
            ai_experience_relevance: None,
            ai_comment: None,
            created_at: "2024-03-05T14:30:12.345678".to_string(),
        }
    }

    #[test]
    fn test_null_ai_columns_read_as_defaults() {
        let r = legacy_row().into_result();
        assert_eq!(r.ai_technical_affinity, 0);
        assert_eq!(r.ai_motivational_affinity, 60);
        assert_eq!(r.ai_experience_relevance, 0);
        assert!(r.ai_comment.is_empty());
        assert!((r.composite_score() - 33.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let python = parse_timestamp("2024-03-05T14:30:12.345678").unwrap();
        assert_eq!(python.to_rfc3339(), "2024-03-05T14:30:12.345678+00:00");

        let postgres = parse_timestamp("2024-03-05 16:30:12+02").unwrap();
        assert_eq!(postgres.to_rfc3339(), "2024-03-05T14:30:12+00:00");

        assert!(parse_timestamp("2024-03-05T14:30:12Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_unreadable_timestamp_does_not_fail_the_row() {
        let mut row = legacy_row();
        row.created_at = "not a date".to_string();
        assert_eq!(row.into_result().created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_written_timestamp_reads_back() {
        let now = Utc::now();
        let stored = format_timestamp(now);
        assert!(stored.len() <= 50);
        assert_eq!(
            parse_timestamp(&stored).unwrap().timestamp_micros(),
            now.timestamp_micros()
        );
    }
}

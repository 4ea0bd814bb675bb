use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use crate::{error::Result, validation::session as rules};

/// One deep-work interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The identifier assigned by the store.
    pub id: i64,
    /// When the session started. Never changes after creation.
    pub start: DateTime<Utc>,
    /// When the session ended; `None` while it is in progress.
    pub end: Option<DateTime<Utc>>,
    /// Seconds actually spent focusing.
    pub focused: Option<i64>,
    /// Short category label.
    pub tag: String,
    /// Free-text label.
    pub description: String,
}

impl Session {
    /// Whether the session has not been completed yet.
    pub fn is_in_progress(&self) -> bool {
        self.end.is_none()
    }

    /// Wall-clock length in seconds, once the session has ended.
    pub fn wall_clock_seconds(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_seconds())
    }

    /// Returns a copy with the fields present in `patch` applied.
    ///
    /// The merged record is checked against the session invariants, so an
    /// `Err` means the patch must not be written.
    pub fn merged(&self, patch: &SessionPatch) -> Result<Session> {
        if let (Some(current), Some(new)) = (self.end, patch.end) {
            if current != new {
                return Err(crate::error::AppError::Validation(format!(
                    "Session {} has already been completed",
                    self.id
                )));
            }
        }

        let merged = Session {
            id: self.id,
            start: self.start,
            end: patch.end.or(self.end),
            focused: patch.focused.or(self.focused),
            tag: self.tag.clone(),
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
        };

        rules::validate_text("description", &merged.description)?;
        rules::validate_timing(merged.start, merged.end, merged.focused)?;
        Ok(merged)
    }
}

impl TryFrom<&Row> for Session {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            start: row.try_get("start")?,
            end: row.try_get("end")?,
            focused: row.try_get("focused")?,
            tag: row.try_get("tag")?,
            description: row.try_get("description")?,
        })
    }
}

/// The fields a client supplies when creating a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSession {
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused: Option<i64>,
    pub tag: String,
    pub description: String,
}

impl NewSession {
    /// A session that starts at `start` and is still in progress.
    pub fn in_progress(start: DateTime<Utc>, tag: String, description: String) -> Self {
        Self {
            start,
            end: None,
            focused: None,
            tag,
            description,
        }
    }

    /// Checks the required fields and timing invariants.
    pub fn validate(&self) -> Result<()> {
        rules::validate_text("tag", &self.tag)?;
        rules::validate_text("description", &self.description)?;
        rules::validate_timing(self.start, self.end, self.focused)
    }
}

/// A partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused: Option<i64>,
}

impl SessionPatch {
    /// The patch sent when a running session completes.
    pub fn completion(end: DateTime<Utc>, focused: i64) -> Self {
        Self {
            description: None,
            end: Some(end),
            focused: Some(focused),
        }
    }

    /// The patch sent by an inline description edit.
    pub fn description(description: String) -> Self {
        Self {
            description: Some(description),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.end.is_none() && self.focused.is_none()
    }
}

//! Smart alert domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a smart alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Warning,
    Info,
    Success,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Warning => "warning",
            AlertType::Info => "info",
            AlertType::Success => "success",
        }
    }
}

/// Domain model representing a smart alert.
///
/// Alerts are created as side effects of transaction and goal mutations or
/// seeded into the demo dataset. They never expire on their own, users mark
/// them read or delete them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmartAlert {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

/// Input model for creating a smart alert. Identity, owner, creation time
/// and the unread flag are assigned at insert time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSmartAlert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
}

impl NewSmartAlert {
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        NewSmartAlert {
            alert_type: AlertType::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        NewSmartAlert {
            alert_type: AlertType::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        NewSmartAlert {
            alert_type: AlertType::Success,
            title: title.into(),
            message: message.into(),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role claim carried by the authenticated principal. Resolution of the
/// session/cookie into a principal happens outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Reviewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Reviewer => "reviewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "reviewer" => Some(Role::Reviewer),
            _ => None,
        }
    }
}

/// Request-scoped identity passed explicitly into every core operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Reviewed,
    Approved,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Reviewed => "reviewed",
            ItemStatus::Approved => "approved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "reviewed" => Some(Self::Reviewed),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Processing,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
    Modify,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
            Decision::Modify => "modify",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "modify" => Some(Self::Modify),
            _ => None,
        }
    }
}

/// One ingested text unit awaiting (or past) adjudication.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaggingData {
    pub id: String,
    pub text: String,
    pub original_tags: Option<String>,
    pub tag_en: Option<String>,
    pub tag_ar: Option<String>,
    pub status: String,
    pub uploaded_by: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl TaggingData {
    pub fn item_status(&self) -> Option<ItemStatus> {
        ItemStatus::parse(&self.status)
    }
}

/// One reviewer's adjudication of one item.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaggingReview {
    pub id: String,
    pub data_id: String,
    pub reviewer_id: String,
    pub decision: String,
    pub new_tag_en: Option<String>,
    pub new_tag_ar: Option<String>,
    pub notes: Option<String>,
    pub confidence: i64,
    pub time_spent: Option<i64>,
    pub reviewed_at: DateTime<Utc>,
}

/// One complete attempt to import one uploaded file.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UploadSession {
    pub id: String,
    pub filename: String,
    pub total_records: i64,
    pub processed_records: i64,
    pub failed_records: i64,
    pub status: String,
    pub uploaded_by: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub error_log: Option<String>,
}

impl UploadSession {
    pub fn session_status(&self) -> Option<SessionStatus> {
        SessionStatus::parse(&self.status)
    }

    pub fn progress_percentage(&self) -> f64 {
        if self.total_records > 0 {
            (self.processed_records as f64 / self.total_records as f64 * 10000.0).round() / 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

//! Reorder queue models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Severity;

/// Purchase request waiting for (or going through) procurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderQueueEntry {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub quantity: i64,
    pub reason: String,
    pub priority: Severity,
    pub status: ReorderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderStatus {
    Pending,
    Ordered,
    Received,
    Cancelled,
}

impl ReorderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReorderStatus::Pending => "pending",
            ReorderStatus::Ordered => "ordered",
            ReorderStatus::Received => "received",
            ReorderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReorderStatus::Pending),
            "ordered" => Some(ReorderStatus::Ordered),
            "received" => Some(ReorderStatus::Received),
            "cancelled" => Some(ReorderStatus::Cancelled),
            _ => None,
        }
    }

    /// pending -> ordered -> received; cancel allowed before receipt
    pub fn can_transition_to(&self, next: ReorderStatus) -> bool {
        matches!(
            (self, next),
            (ReorderStatus::Pending, ReorderStatus::Ordered)
                | (ReorderStatus::Ordered, ReorderStatus::Received)
                | (ReorderStatus::Pending, ReorderStatus::Cancelled)
                | (ReorderStatus::Ordered, ReorderStatus::Cancelled)
        )
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ReorderStatus::Pending | ReorderStatus::Ordered)
    }
}

impl std::fmt::Display for ReorderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

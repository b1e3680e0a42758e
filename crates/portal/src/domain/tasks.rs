//! Follow-up tasks attached to SREC and invoice work.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::filter::is_overdue;
use crate::record::stage::{stage_enum, StageTable};
use crate::record::Record;

stage_enum! {
    /// Task status.
    pub enum TaskStatus {
        Pending => "Pending",
        InProgress => "In Progress",
        Completed => "Completed",
    }
}

/// Task urgency, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "Low"),
            TaskPriority::Medium => write!(f, "Medium"),
            TaskPriority::High => write!(f, "High"),
            TaskPriority::Urgent => write!(f, "Urgent"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Certificate or invoice the task belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_record_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub related_record_id: Option<String>,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

impl Task {
    /// Not completed and past its due date, as of `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        is_overdue(self.status == TaskStatus::Completed, self.due_date, now)
    }

    /// Predicate keeping tasks at `min` priority or above.
    pub fn priority_at_least(
        min: TaskPriority,
    ) -> impl Fn(&Task, DateTime<Utc>) -> bool + Send + Sync + 'static {
        move |task: &Task, _now: DateTime<Utc>| task.priority >= min
    }
}

impl Record for Task {
    type Stage = TaskStatus;
    type Draft = TaskDraft;

    const COLLECTION: &'static str = "tasks";
    const ID_PREFIX: &'static str = "task";
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description", "assignee"];

    fn stage_table() -> StageTable<TaskStatus> {
        StageTable::starting_at(TaskStatus::Pending)
            .then(TaskStatus::InProgress)
            .then(TaskStatus::Completed)
            .stamping("completedDate")
    }

    fn from_draft(id: String, draft: TaskDraft, stage: TaskStatus, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            assignee: draft.assignee,
            priority: draft.priority,
            status: stage,
            due_date: draft.due_date,
            related_record_id: draft.related_record_id,
            completed_date: None,
            created_date: now,
            updated_date: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stage(&self) -> TaskStatus {
        self.status
    }

    fn set_stage(&mut self, stage: TaskStatus) {
        self.status = stage;
    }

    fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    fn updated_date(&self) -> DateTime<Utc> {
        self.updated_date
    }

    fn set_updated_date(&mut self, now: DateTime<Utc>) {
        self.updated_date = now;
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "title" => Some(Cow::Borrowed(&self.title)),
            "description" => self.description.as_deref().map(Cow::Borrowed),
            "assignee" => self.assignee.as_deref().map(Cow::Borrowed),
            "priority" => Some(Cow::Owned(self.priority.to_string())),
            "relatedRecordId" => self.related_record_id.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    fn stamp(&mut self, field: &str, now: DateTime<Utc>) -> bool {
        match field {
            "completedDate" => {
                self.completed_date = Some(now);
                true
            }
            _ => false,
        }
    }
}

//! Installation project tracking.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::record::stage::{check_progress, stage_enum, StageTable};
use crate::record::Record;

stage_enum! {
    pub enum InstallationStage {
        Scheduled => "Scheduled",
        SiteSurvey => "Site Survey",
        PermitsPending => "Permits Pending",
        InstallationInProgress => "Installation In Progress",
        Inspection => "Inspection",
        Completed => "Completed",
        // Off the chain: parked projects resume through an explicit edit.
        OnHold => "On Hold",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationProject {
    pub id: String,
    pub project_name: String,
    pub customer_name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_size_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_value: Option<f64>,
    pub stage: InstallationStage,
    /// Completion percentage, 0..=100.
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationDraft {
    pub project_name: String,
    pub customer_name: String,
    pub address: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub installer: Option<String>,
    #[serde(default)]
    pub system_size_kw: Option<f64>,
    #[serde(default)]
    pub contract_value: Option<f64>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for InstallationProject {
    type Stage = InstallationStage;
    type Draft = InstallationDraft;

    const COLLECTION: &'static str = "installation_projects";
    const ID_PREFIX: &'static str = "project";
    const SEARCH_FIELDS: &'static [&'static str] =
        &["projectName", "customerName", "address", "installer"];

    fn stage_table() -> StageTable<InstallationStage> {
        StageTable::starting_at(InstallationStage::Scheduled)
            .with_progress(0)
            .then(InstallationStage::SiteSurvey)
            .with_progress(10)
            .then(InstallationStage::PermitsPending)
            .with_progress(20)
            .then(InstallationStage::InstallationInProgress)
            .with_progress(50)
            .stamping("actualStartDate")
            .then(InstallationStage::Inspection)
            .with_progress(90)
            .then(InstallationStage::Completed)
            .with_progress(100)
            .stamping("actualEndDate")
    }

    fn from_draft(
        id: String,
        draft: InstallationDraft,
        stage: InstallationStage,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project_name: draft.project_name,
            customer_name: draft.customer_name,
            address: draft.address,
            state: draft.state,
            installer: draft.installer,
            system_size_kw: draft.system_size_kw,
            contract_value: draft.contract_value,
            stage,
            progress: 0,
            scheduled_date: draft.scheduled_date,
            estimated_completion_date: draft.estimated_completion_date,
            actual_start_date: None,
            actual_end_date: None,
            notes: draft.notes,
            created_date: now,
            updated_date: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stage(&self) -> InstallationStage {
        self.stage
    }

    fn set_stage(&mut self, stage: InstallationStage) {
        self.stage = stage;
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
            "projectName" => Some(Cow::Borrowed(&self.project_name)),
            "customerName" => Some(Cow::Borrowed(&self.customer_name)),
            "address" => Some(Cow::Borrowed(&self.address)),
            "state" => self.state.as_deref().map(Cow::Borrowed),
            "installer" => self.installer.as_deref().map(Cow::Borrowed),
            "notes" => self.notes.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    fn set_progress(&mut self, progress: u8) {
        self.progress = progress;
    }

    fn validate(&self) -> Result<(), String> {
        check_progress(self.progress)
    }

    fn stamp(&mut self, field: &str, now: DateTime<Utc>) -> bool {
        match field {
            "actualStartDate" => self.actual_start_date = Some(now),
            "actualEndDate" => self.actual_end_date = Some(now),
            _ => return false,
        }
        true
    }
}

//! Sales leads and the opportunities they convert into.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::stage::{stage_enum, StageTable};
use crate::record::Record;

stage_enum! {
    pub enum LeadStage {
        NewLead => "New Lead",
        Qualified => "Qualified",
        ConvertedToOpportunity => "Converted to Opportunity",
        ContractSent => "Contract Sent",
        ClosedWon => "Closed Won",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Where the lead came from (referral, web form, event...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Proposed system size in kW.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_size_kw: Option<f64>,
    /// Estimated contract value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<f64>,
    pub stage: LeadStage,
    /// Set once the lead has been converted to an opportunity.
    #[serde(default)]
    pub is_opportunity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub system_size_kw: Option<f64>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for Lead {
    type Stage = LeadStage;
    type Draft = LeadDraft;

    const COLLECTION: &'static str = "sales_records";
    const ID_PREFIX: &'static str = "lead";
    const SEARCH_FIELDS: &'static [&'static str] =
        &["firstName", "lastName", "fullName", "email", "company", "address"];

    fn stage_table() -> StageTable<LeadStage> {
        StageTable::starting_at(LeadStage::NewLead)
            .then(LeadStage::Qualified)
            .then(LeadStage::ConvertedToOpportunity)
            .stamping("convertedDate")
            .then(LeadStage::ContractSent)
            .then(LeadStage::ClosedWon)
            .stamping("closedDate")
    }

    fn from_draft(id: String, draft: LeadDraft, stage: LeadStage, now: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            company: draft.company,
            address: draft.address,
            state: draft.state,
            source: draft.source,
            system_size_kw: draft.system_size_kw,
            estimated_value: draft.estimated_value,
            stage,
            is_opportunity: false,
            converted_date: None,
            closed_date: None,
            created_date: now,
            updated_date: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stage(&self) -> LeadStage {
        self.stage
    }

    fn set_stage(&mut self, stage: LeadStage) {
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
            "firstName" => Some(Cow::Borrowed(&self.first_name)),
            "lastName" => Some(Cow::Borrowed(&self.last_name)),
            "fullName" => Some(Cow::Owned(self.full_name())),
            "email" => Some(Cow::Borrowed(&self.email)),
            "phone" => self.phone.as_deref().map(Cow::Borrowed),
            "company" => self.company.as_deref().map(Cow::Borrowed),
            "address" => self.address.as_deref().map(Cow::Borrowed),
            "state" => self.state.as_deref().map(Cow::Borrowed),
            "source" => self.source.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    fn stamp(&mut self, field: &str, now: DateTime<Utc>) -> bool {
        match field {
            "convertedDate" => self.converted_date = Some(now),
            "closedDate" => self.closed_date = Some(now),
            _ => return false,
        }
        true
    }

    fn on_stage_entered(&mut self, stage: LeadStage, _now: DateTime<Utc>) {
        if stage == LeadStage::ConvertedToOpportunity {
            self.is_opportunity = true;
        }
    }
}

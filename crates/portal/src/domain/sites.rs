//! Site provisioning, from sales handoff to permission to operate.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::stage::{check_progress, stage_enum, StageTable};
use crate::record::Record;

stage_enum! {
    pub enum SiteStage {
        SalesHandoff => "Sales Handoff",
        SiteSurvey => "Site Survey",
        Design => "Design",
        EngineeringReview => "Engineering Review",
        Permitting => "Permitting",
        Procurement => "Procurement",
        Installation => "Installation",
        Inspection => "Inspection",
        Interconnection => "Interconnection",
        PtoGranted => "PTO Granted",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub site_name: String,
    pub customer_name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility: Option<String>,
    /// Site category, e.g. residential or commercial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_size_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_capacity_kwh: Option<f64>,
    pub stage: SiteStage,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pto_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDraft {
    pub site_name: String,
    pub customer_name: String,
    pub address: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub utility: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub system_size_kw: Option<f64>,
    #[serde(default)]
    pub battery_capacity_kwh: Option<f64>,
}

impl Record for Site {
    type Stage = SiteStage;
    type Draft = SiteDraft;

    const COLLECTION: &'static str = "site_records";
    const ID_PREFIX: &'static str = "site";
    const SEARCH_FIELDS: &'static [&'static str] =
        &["siteName", "customerName", "address", "utility"];

    fn stage_table() -> StageTable<SiteStage> {
        StageTable::starting_at(SiteStage::SalesHandoff)
            .with_progress(0)
            .then(SiteStage::SiteSurvey)
            .with_progress(10)
            .then(SiteStage::Design)
            .with_progress(20)
            .then(SiteStage::EngineeringReview)
            .with_progress(30)
            .then(SiteStage::Permitting)
            .with_progress(40)
            .then(SiteStage::Procurement)
            .with_progress(50)
            .then(SiteStage::Installation)
            .with_progress(65)
            .stamping("installDate")
            .then(SiteStage::Inspection)
            .with_progress(80)
            .then(SiteStage::Interconnection)
            .with_progress(90)
            .then(SiteStage::PtoGranted)
            .with_progress(100)
            .stamping("ptoDate")
    }

    fn from_draft(id: String, draft: SiteDraft, stage: SiteStage, now: DateTime<Utc>) -> Self {
        Self {
            id,
            site_name: draft.site_name,
            customer_name: draft.customer_name,
            address: draft.address,
            state: draft.state,
            utility: draft.utility,
            category: draft.category,
            system_size_kw: draft.system_size_kw,
            battery_capacity_kwh: draft.battery_capacity_kwh,
            stage,
            progress: 0,
            install_date: None,
            pto_date: None,
            created_date: now,
            updated_date: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stage(&self) -> SiteStage {
        self.stage
    }

    fn set_stage(&mut self, stage: SiteStage) {
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
            "siteName" => Some(Cow::Borrowed(&self.site_name)),
            "customerName" => Some(Cow::Borrowed(&self.customer_name)),
            "address" => Some(Cow::Borrowed(&self.address)),
            "state" => self.state.as_deref().map(Cow::Borrowed),
            "utility" => self.utility.as_deref().map(Cow::Borrowed),
            "category" => self.category.as_deref().map(Cow::Borrowed),
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
            "installDate" => self.install_date = Some(now),
            "ptoDate" => self.pto_date = Some(now),
            _ => return false,
        }
        true
    }
}

//! SREC (solar renewable energy certificate) records and the invoices
//! raised when certificates are sold.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::filter::is_overdue;
use crate::record::stage::{stage_enum, StageTable};
use crate::record::Record;

stage_enum! {
    pub enum SrecStatus {
        Pending => "Pending",
        Verified => "Verified",
        Issued => "Issued",
        Listed => "Listed",
        Sold => "Sold",
        Retired => "Retired",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrecRecord {
    pub id: String,
    pub certificate_number: String,
    pub facility_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Generation year the certificates belong to.
    pub vintage_year: i32,
    /// Number of certificates (one per MWh generated).
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_certificate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
    pub status: SrecStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retired_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrecDraft {
    pub certificate_number: String,
    pub facility_name: String,
    #[serde(default)]
    pub state: Option<String>,
    pub vintage_year: i32,
    pub quantity: u32,
    #[serde(default)]
    pub price_per_certificate: Option<f64>,
    #[serde(default)]
    pub buyer: Option<String>,
}

impl SrecRecord {
    /// Quantity times unit price, when priced.
    pub fn total_value(&self) -> Option<f64> {
        self.price_per_certificate
            .map(|price| price * f64::from(self.quantity))
    }
}

impl Record for SrecRecord {
    type Stage = SrecStatus;
    type Draft = SrecDraft;

    const COLLECTION: &'static str = "srec_records";
    const ID_PREFIX: &'static str = "srec";
    const SEARCH_FIELDS: &'static [&'static str] =
        &["certificateNumber", "facilityName", "buyer"];

    fn stage_table() -> StageTable<SrecStatus> {
        StageTable::starting_at(SrecStatus::Pending)
            .then(SrecStatus::Verified)
            .then(SrecStatus::Issued)
            .stamping("issuedDate")
            .then(SrecStatus::Listed)
            .then(SrecStatus::Sold)
            .stamping("soldDate")
            .then(SrecStatus::Retired)
            .stamping("retiredDate")
    }

    fn from_draft(id: String, draft: SrecDraft, stage: SrecStatus, now: DateTime<Utc>) -> Self {
        Self {
            id,
            certificate_number: draft.certificate_number,
            facility_name: draft.facility_name,
            state: draft.state,
            vintage_year: draft.vintage_year,
            quantity: draft.quantity,
            price_per_certificate: draft.price_per_certificate,
            buyer: draft.buyer,
            status: stage,
            issued_date: None,
            sold_date: None,
            retired_date: None,
            created_date: now,
            updated_date: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stage(&self) -> SrecStatus {
        self.status
    }

    fn set_stage(&mut self, stage: SrecStatus) {
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
            "certificateNumber" => Some(Cow::Borrowed(&self.certificate_number)),
            "facilityName" => Some(Cow::Borrowed(&self.facility_name)),
            "state" => self.state.as_deref().map(Cow::Borrowed),
            "vintageYear" => Some(Cow::Owned(self.vintage_year.to_string())),
            "buyer" => self.buyer.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    fn stamp(&mut self, field: &str, now: DateTime<Utc>) -> bool {
        match field {
            "issuedDate" => self.issued_date = Some(now),
            "soldDate" => self.sold_date = Some(now),
            "retiredDate" => self.retired_date = Some(now),
            _ => return false,
        }
        true
    }
}

stage_enum! {
    pub enum InvoiceStatus {
        Draft => "Draft",
        Sent => "Sent",
        Paid => "Paid",
        Void => "Void",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub customer_name: String,
    pub amount: f64,
    /// Certificate record billed by this invoice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srec_record_id: Option<String>,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub customer_name: String,
    pub amount: f64,
    #[serde(default)]
    pub srec_record_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Unpaid (and not voided) past its due date, as of `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        let settled = matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Void);
        is_overdue(settled, self.due_date, now)
    }
}

impl Record for Invoice {
    type Stage = InvoiceStatus;
    type Draft = InvoiceDraft;

    const COLLECTION: &'static str = "invoices";
    const ID_PREFIX: &'static str = "invoice";
    const SEARCH_FIELDS: &'static [&'static str] = &["invoiceNumber", "customerName"];

    fn stage_table() -> StageTable<InvoiceStatus> {
        StageTable::starting_at(InvoiceStatus::Draft)
            .then(InvoiceStatus::Sent)
            .stamping("sentDate")
            .then(InvoiceStatus::Paid)
            .stamping("paidDate")
    }

    fn from_draft(
        id: String,
        draft: InvoiceDraft,
        stage: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            invoice_number: draft.invoice_number,
            customer_name: draft.customer_name,
            amount: draft.amount,
            srec_record_id: draft.srec_record_id,
            status: stage,
            due_date: draft.due_date,
            sent_date: None,
            paid_date: None,
            created_date: now,
            updated_date: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stage(&self) -> InvoiceStatus {
        self.status
    }

    fn set_stage(&mut self, stage: InvoiceStatus) {
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
            "invoiceNumber" => Some(Cow::Borrowed(&self.invoice_number)),
            "customerName" => Some(Cow::Borrowed(&self.customer_name)),
            "srecRecordId" => self.srec_record_id.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    fn stamp(&mut self, field: &str, now: DateTime<Utc>) -> bool {
        match field {
            "sentDate" => self.sent_date = Some(now),
            "paidDate" => self.paid_date = Some(now),
            _ => return false,
        }
        true
    }
}

//! Builders for domain drafts.

#![allow(dead_code)]

use chrono::{DateTime, Utc};

use portal::domain::{
    InstallationDraft, InvoiceDraft, LeadDraft, SiteDraft, SrecDraft, TaskDraft, TaskPriority,
};

pub fn lead_draft(first_name: &str, last_name: &str, email: &str) -> LeadDraft {
    LeadDraft {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        ..Default::default()
    }
}

pub fn project_draft(project_name: &str) -> InstallationDraft {
    InstallationDraft {
        project_name: project_name.to_string(),
        customer_name: "Test Customer".to_string(),
        address: "1 Solar Way".to_string(),
        ..Default::default()
    }
}

pub fn site_draft(site_name: &str) -> SiteDraft {
    SiteDraft {
        site_name: site_name.to_string(),
        customer_name: "Test Customer".to_string(),
        address: "1 Solar Way".to_string(),
        ..Default::default()
    }
}

pub fn srec_draft(certificate_number: &str) -> SrecDraft {
    SrecDraft {
        certificate_number: certificate_number.to_string(),
        facility_name: "Test Facility".to_string(),
        vintage_year: 2026,
        quantity: 10,
        ..Default::default()
    }
}

pub fn invoice_draft(invoice_number: &str, due_date: Option<DateTime<Utc>>) -> InvoiceDraft {
    InvoiceDraft {
        invoice_number: invoice_number.to_string(),
        customer_name: "Test Buyer".to_string(),
        amount: 1_000.0,
        due_date,
        ..Default::default()
    }
}

/// Builder for `TaskDraft`.
pub struct TaskBuilder {
    draft: TaskDraft,
}

impl TaskBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            draft: TaskDraft {
                title: title.to_string(),
                description: None,
                assignee: None,
                priority: TaskPriority::Medium,
                due_date: None,
                related_record_id: None,
            },
        }
    }

    pub fn assignee(mut self, assignee: &str) -> Self {
        self.draft.assignee = Some(assignee.to_string());
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.draft.priority = priority;
        self
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.draft.due_date = Some(due_date);
        self
    }

    pub fn build(self) -> TaskDraft {
        self.draft
    }
}

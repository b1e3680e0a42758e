//! Domain collections served by the record store.

pub mod installation;
pub mod sales;
pub mod sites;
pub mod srec;
pub mod tasks;

pub use installation::{InstallationDraft, InstallationProject, InstallationStage};
pub use sales::{Lead, LeadDraft, LeadStage};
pub use sites::{Site, SiteDraft, SiteStage};
pub use srec::{Invoice, InvoiceDraft, InvoiceStatus, SrecDraft, SrecRecord, SrecStatus};
pub use tasks::{Task, TaskDraft, TaskPriority, TaskStatus};

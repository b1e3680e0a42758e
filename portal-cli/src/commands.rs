//! Subcommand implementations, generic over the record type of the selected
//! collection.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use portal::domain::{
    InstallationProject, Invoice, Lead, Site, SrecRecord, Task, TaskPriority,
};
use portal::record::UnknownStage;
use portal::{
    FileStore, ListQuery, PageRequest, PortalConfig, PortalError, Record, RecordFilter,
    RecordStore, Stage, StoreError,
};

use crate::display;
use crate::{Collection, OutputFormat};

type Store = RecordStore<FileStore>;

#[derive(Error, Debug)]
pub(crate) enum CliError {
    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error("No data directory configured and no home directory to default to")]
    NoDataDirectory,

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Portal(PortalError::Store(e))
    }
}

impl CliError {
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            CliError::Portal(PortalError::Store(e)) => e.is_retryable(),
            CliError::Portal(PortalError::Storage(_)) => true,
            _ => false,
        }
    }
}

/// Filter and page flags for `list`.
#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Case-insensitive text to search for
    #[arg(long)]
    search: Option<String>,

    /// Field to search instead of the collection defaults (repeatable)
    #[arg(long = "in", value_name = "FIELD")]
    search_fields: Vec<String>,

    /// Only records at this stage
    #[arg(long)]
    stage: Option<String>,

    /// Exact field match (repeatable)
    #[arg(long = "where", value_name = "FIELD=VALUE")]
    equals: Vec<String>,

    /// Only records past their due date (tasks, invoices)
    #[arg(long)]
    overdue: bool,

    /// Only tasks at this priority or above
    #[arg(long, value_name = "PRIORITY")]
    min_priority: Option<TaskPriority>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Records per page, capped by the configured maximum
    #[arg(long)]
    page_size: Option<usize>,
}

/// Per-collection behavior of the command line.
pub(crate) trait CliRecord: Record {
    /// One-line human summary.
    fn headline(&self) -> String;

    /// Applies the derived-predicate flags this collection supports.
    fn derived_filters(
        filter: RecordFilter<Self>,
        args: &ListArgs,
    ) -> Result<RecordFilter<Self>, CliError> {
        if args.overdue || args.min_priority.is_some() {
            return Err(CliError::Usage(format!(
                "--overdue and --min-priority do not apply to {}",
                Self::COLLECTION
            )));
        }
        Ok(filter)
    }
}

impl CliRecord for Lead {
    fn headline(&self) -> String {
        match &self.company {
            Some(company) => format!("{} <{}>, {}", self.full_name(), self.email, company),
            None => format!("{} <{}>", self.full_name(), self.email),
        }
    }
}

impl CliRecord for InstallationProject {
    fn headline(&self) -> String {
        format!(
            "{} ({}) {}%",
            self.project_name, self.customer_name, self.progress
        )
    }
}

impl CliRecord for Site {
    fn headline(&self) -> String {
        format!("{} ({}) {}%", self.site_name, self.customer_name, self.progress)
    }
}

impl CliRecord for SrecRecord {
    fn headline(&self) -> String {
        format!(
            "{} {} x{} ({})",
            self.certificate_number, self.facility_name, self.quantity, self.vintage_year
        )
    }
}

impl CliRecord for Invoice {
    fn headline(&self) -> String {
        format!(
            "{} {} {:.2}",
            self.invoice_number, self.customer_name, self.amount
        )
    }

    fn derived_filters(
        filter: RecordFilter<Self>,
        args: &ListArgs,
    ) -> Result<RecordFilter<Self>, CliError> {
        if args.min_priority.is_some() {
            return Err(CliError::Usage(
                "--min-priority only applies to tasks".to_string(),
            ));
        }
        Ok(if args.overdue {
            filter.matching("overdue", Invoice::is_overdue)
        } else {
            filter
        })
    }
}

impl CliRecord for Task {
    fn headline(&self) -> String {
        match &self.assignee {
            Some(assignee) => format!("{} [{}] @{}", self.title, self.priority, assignee),
            None => format!("{} [{}]", self.title, self.priority),
        }
    }

    fn derived_filters(
        mut filter: RecordFilter<Self>,
        args: &ListArgs,
    ) -> Result<RecordFilter<Self>, CliError> {
        if args.overdue {
            filter = filter.matching("overdue", Task::is_overdue);
        }
        if let Some(min) = args.min_priority {
            filter = filter.matching("priority", Task::priority_at_least(min));
        }
        Ok(filter)
    }
}

macro_rules! dispatch {
    (async $collection:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $collection {
            Collection::Leads => $func::<Lead>($($arg),*).await,
            Collection::Projects => $func::<InstallationProject>($($arg),*).await,
            Collection::Sites => $func::<Site>($($arg),*).await,
            Collection::Srecs => $func::<SrecRecord>($($arg),*).await,
            Collection::Invoices => $func::<Invoice>($($arg),*).await,
            Collection::Tasks => $func::<Task>($($arg),*).await,
        }
    };
    ($collection:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $collection {
            Collection::Leads => $func::<Lead>($($arg),*),
            Collection::Projects => $func::<InstallationProject>($($arg),*),
            Collection::Sites => $func::<Site>($($arg),*),
            Collection::Srecs => $func::<SrecRecord>($($arg),*),
            Collection::Invoices => $func::<Invoice>($($arg),*),
            Collection::Tasks => $func::<Task>($($arg),*),
        }
    };
}

fn build_filter<R: CliRecord>(args: &ListArgs) -> Result<RecordFilter<R>, CliError> {
    let mut filter = RecordFilter::<R>::new();

    if let Some(term) = &args.search {
        filter = if args.search_fields.is_empty() {
            filter.search(term)
        } else {
            filter.search_in(term, args.search_fields.iter().cloned())
        };
    }

    if let Some(stage) = &args.stage {
        let stage: R::Stage = stage
            .parse()
            .map_err(|e: UnknownStage| CliError::Usage(e.to_string()))?;
        filter = filter.stage(stage);
    }

    for clause in &args.equals {
        let (field, value) = clause.split_once('=').ok_or_else(|| {
            CliError::Usage(format!("expected FIELD=VALUE, got '{}'", clause))
        })?;
        filter = filter.field_equals(field.trim(), value.trim());
    }

    R::derived_filters(filter, args)
}

async fn list_records<R: CliRecord>(
    store: &Store,
    config: &PortalConfig,
    args: &ListArgs,
    output: OutputFormat,
) -> Result<(), CliError> {
    let filter = build_filter::<R>(args)?;
    let page = PageRequest::new(args.page, config.page_size(args.page_size))?;
    let result = store.list(&ListQuery::new(filter, page)).await?;
    display::page(&result, output)
}

pub(crate) async fn list(
    store: &Store,
    config: &PortalConfig,
    collection: Collection,
    args: &ListArgs,
    output: OutputFormat,
) -> Result<(), CliError> {
    dispatch!(async collection, list_records(store, config, args, output))
}

async fn get_record<R: CliRecord>(
    store: &Store,
    id: &str,
    output: OutputFormat,
) -> Result<(), CliError> {
    let record = store.get::<R>(id).await?;
    display::record(&record, output)
}

pub(crate) async fn get(
    store: &Store,
    collection: Collection,
    id: &str,
    output: OutputFormat,
) -> Result<(), CliError> {
    dispatch!(async collection, get_record(store, id, output))
}

async fn create_record<R>(store: &Store, draft: &str, output: OutputFormat) -> Result<(), CliError>
where
    R: CliRecord,
    R::Draft: DeserializeOwned,
{
    let draft: R::Draft = serde_json::from_str(draft)?;
    let record = store.create::<R>(draft).await?;
    display::record(&record, output)
}

pub(crate) async fn create(
    store: &Store,
    collection: Collection,
    draft: &str,
    output: OutputFormat,
) -> Result<(), CliError> {
    dispatch!(async collection, create_record(store, draft, output))
}

async fn update_record<R: CliRecord>(
    store: &Store,
    id: &str,
    patch: &str,
    output: OutputFormat,
) -> Result<(), CliError> {
    let patch: serde_json::Value = serde_json::from_str(patch)?;
    let record = store.update_field::<R>(id, patch).await?;
    display::record(&record, output)
}

pub(crate) async fn update(
    store: &Store,
    collection: Collection,
    id: &str,
    patch: &str,
    output: OutputFormat,
) -> Result<(), CliError> {
    dispatch!(async collection, update_record(store, id, patch, output))
}

async fn advance_record<R: CliRecord>(
    store: &Store,
    id: &str,
    output: OutputFormat,
) -> Result<(), CliError> {
    let record = store.advance_stage::<R>(id).await?;
    display::record(&record, output)
}

pub(crate) async fn advance(
    store: &Store,
    collection: Collection,
    id: &str,
    output: OutputFormat,
) -> Result<(), CliError> {
    dispatch!(async collection, advance_record(store, id, output))
}

fn stage_table<R: CliRecord>(output: OutputFormat) -> Result<(), CliError> {
    let table = R::stage_table();
    let rows: Vec<serde_json::Value> = R::Stage::all()
        .iter()
        .map(|stage| {
            let effect = table.side_effects(*stage);
            json!({
                "stage": stage,
                "position": table.position(*stage).map(|p| p + 1),
                "progress": effect.and_then(|e| e.progress),
                "stamps": effect.map(|e| e.stamps.clone()).unwrap_or_default(),
            })
        })
        .collect();
    display::stage_rows(R::COLLECTION, &rows, output)
}

pub(crate) fn stages(collection: Collection, output: OutputFormat) -> Result<(), CliError> {
    dispatch!(collection, stage_table(output))
}

async fn stage_counts<R: CliRecord>(store: &Store, output: OutputFormat) -> Result<(), CliError> {
    let summary = store.stage_summary::<R>().await?;
    display::summary(R::COLLECTION, &summary, output)
}

pub(crate) async fn summary(
    store: &Store,
    collection: Collection,
    output: OutputFormat,
) -> Result<(), CliError> {
    dispatch!(async collection, stage_counts(store, output))
}

async fn seed_records<R: CliRecord>(
    store: &Store,
    file: &Path,
    output: OutputFormat,
) -> Result<(), CliError> {
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| CliError::ReadFile {
            path: file.to_path_buf(),
            source: e,
        })?;
    let records: Vec<R> = serde_json::from_str(&content)?;
    let count = records.len();
    let written = store.seed_if_absent(records).await?;

    match output {
        OutputFormat::Json => display::json(&json!({
            "collection": R::COLLECTION,
            "seeded": written,
            "records": if written { count } else { 0 },
        })),
        OutputFormat::Text => {
            if written {
                println!("Seeded {} with {} records", R::COLLECTION, count);
            } else {
                println!("{} already exists; nothing written", R::COLLECTION);
            }
            Ok(())
        }
    }
}

pub(crate) async fn seed(
    store: &Store,
    collection: Collection,
    file: &Path,
    output: OutputFormat,
) -> Result<(), CliError> {
    dispatch!(async collection, seed_records(store, file, output))
}

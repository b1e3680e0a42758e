//! End-to-end workflows for each domain collection.

mod common;

use chrono::Duration;

use common::{
    invoice_draft, lead_draft, project_draft, site_draft, srec_draft, TaskBuilder, TestHarness,
};
use portal::domain::{
    InstallationProject, InstallationStage, Invoice, InvoiceStatus, Lead, LeadStage, Site,
    SiteStage, SrecRecord, SrecStatus, Task,
};
use portal::{KeyValueStore, ListQuery, PageRequest, Record, RecordFilter, RecordStore, StoreError};

fn first_page() -> PageRequest {
    PageRequest::new(1, 20).unwrap()
}

/// Advances a fresh record through its whole chain, then checks that one
/// more advance is refused without a write.
async fn walk_full_chain<R, B>(store: &RecordStore<B>, draft: R::Draft, harness: &TestHarness) -> R
where
    R: Record + std::fmt::Debug,
    B: KeyValueStore,
{
    let table = R::stage_table();
    let mut record = store.create::<R>(draft).await.unwrap();
    let id = record.id().to_string();
    assert_eq!(record.stage(), table.initial());

    for _ in 1..table.len() {
        harness.tick();
        record = store.advance_stage::<R>(&id).await.unwrap();
    }
    assert_eq!(record.stage(), table.terminal());

    harness.tick();
    let err = store.advance_stage::<R>(&id).await.unwrap_err();
    assert!(
        matches!(err, StoreError::TerminalStage { .. }),
        "{} should refuse to advance past its last stage",
        R::COLLECTION
    );
    let stored = store.get::<R>(&id).await.unwrap();
    assert_eq!(stored.updated_date(), record.updated_date());
    record
}

#[tokio::test]
async fn test_sales_lead_search_and_conversion() {
    let harness = TestHarness::new();
    let store = &harness.store;
    store
        .create::<Lead>(lead_draft("Ana", "Diaz", "ana@x.com"))
        .await
        .unwrap();
    store
        .create::<Lead>(lead_draft("Ben", "Okafor", "ben@y.com"))
        .await
        .unwrap();

    let found = store
        .list(&ListQuery::new(RecordFilter::<Lead>::new().search("ana"), first_page()))
        .await
        .unwrap();
    assert_eq!(found.records.len(), 1);
    let lead = found.records[0].clone();
    assert_eq!(lead.stage, LeadStage::NewLead);
    assert!(!lead.is_opportunity);

    harness.tick();
    let lead = store.advance_stage::<Lead>(&lead.id).await.unwrap();
    assert_eq!(lead.stage, LeadStage::Qualified);

    harness.tick();
    let lead = store.advance_stage::<Lead>(&lead.id).await.unwrap();
    assert_eq!(lead.stage, LeadStage::ConvertedToOpportunity);
    assert!(lead.is_opportunity);
    assert_eq!(lead.converted_date, Some(harness.now()));

    let opportunities = store
        .list(&ListQuery::new(
            RecordFilter::<Lead>::new().stage(LeadStage::ConvertedToOpportunity),
            first_page(),
        ))
        .await
        .unwrap();
    assert_eq!(opportunities.records, vec![lead]);
}

#[tokio::test]
async fn test_installation_progress_and_dates() {
    let harness = TestHarness::new();
    let store = &harness.store;
    let project = store
        .create::<InstallationProject>(project_draft("Hillside Rooftop"))
        .await
        .unwrap();
    assert_eq!(project.progress, 0);

    harness.tick();
    let project = store
        .advance_stage::<InstallationProject>(&project.id)
        .await
        .unwrap();
    assert_eq!(project.stage, InstallationStage::SiteSurvey);
    assert_eq!(project.progress, 10);
    assert!(project.actual_start_date.is_none());

    harness.tick();
    let project = store
        .advance_stage::<InstallationProject>(&project.id)
        .await
        .unwrap();
    harness.tick();
    let project = store
        .advance_stage::<InstallationProject>(&project.id)
        .await
        .unwrap();
    assert_eq!(project.stage, InstallationStage::InstallationInProgress);
    assert_eq!(project.progress, 50);
    assert_eq!(project.actual_start_date, Some(harness.now()));

    harness.tick();
    store
        .advance_stage::<InstallationProject>(&project.id)
        .await
        .unwrap();
    harness.tick();
    let project = store
        .advance_stage::<InstallationProject>(&project.id)
        .await
        .unwrap();
    assert_eq!(project.stage, InstallationStage::Completed);
    assert_eq!(project.progress, 100);
    assert_eq!(project.actual_end_date, Some(harness.now()));
}

#[tokio::test]
async fn test_on_hold_project_does_not_advance_until_resumed() {
    let harness = TestHarness::new();
    let store = &harness.store;
    let project = store
        .create::<InstallationProject>(project_draft("Barn Array"))
        .await
        .unwrap();
    store
        .update_field::<InstallationProject>(&project.id, serde_json::json!({"stage": "On Hold"}))
        .await
        .unwrap();

    let err = store
        .advance_stage::<InstallationProject>(&project.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::TerminalStage { ref stage, .. } if stage == "On Hold"));

    store
        .update_field::<InstallationProject>(
            &project.id,
            serde_json::json!({"stage": "Site Survey"}),
        )
        .await
        .unwrap();
    let project = store
        .advance_stage::<InstallationProject>(&project.id)
        .await
        .unwrap();
    assert_eq!(project.stage, InstallationStage::PermitsPending);
    assert_eq!(project.progress, 20);
}

#[tokio::test]
async fn test_every_domain_walks_its_chain_to_the_end() {
    let harness = TestHarness::new();
    let store = &harness.store;

    let lead = walk_full_chain::<Lead, _>(store, lead_draft("Ana", "Diaz", "ana@x.com"), &harness)
        .await;
    assert_eq!(lead.stage, LeadStage::ClosedWon);
    assert!(lead.closed_date.is_some());

    let project =
        walk_full_chain::<InstallationProject, _>(store, project_draft("Lakeview"), &harness).await;
    assert_eq!(project.progress, 100);

    let site = walk_full_chain::<Site, _>(store, site_draft("Oak Street"), &harness).await;
    assert_eq!(site.stage, SiteStage::PtoGranted);
    assert_eq!(site.progress, 100);
    assert!(site.install_date.is_some());
    assert!(site.pto_date.is_some());

    let srec = walk_full_chain::<SrecRecord, _>(store, srec_draft("NJ-2026-000001"), &harness).await;
    assert_eq!(srec.status, SrecStatus::Retired);
    assert!(srec.retired_date.is_some());

    let invoice =
        walk_full_chain::<Invoice, _>(store, invoice_draft("INV-1", None), &harness).await;
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert!(invoice.paid_date.is_some());

    let task = walk_full_chain::<Task, _>(store, TaskBuilder::new("Close out").build(), &harness)
        .await;
    assert!(task.completed_date.is_some());
}

#[tokio::test]
async fn test_site_progress_follows_stage() {
    let harness = TestHarness::new();
    let store = &harness.store;
    let site = store.create::<Site>(site_draft("Mill Road")).await.unwrap();
    let table = Site::stage_table();

    let mut current = site;
    while table.can_advance(current.stage) {
        current = store.advance_stage::<Site>(&current.id).await.unwrap();
        let expected = table
            .side_effects(current.stage)
            .and_then(|effect| effect.progress);
        assert_eq!(Some(current.progress), expected, "at {}", current.stage);
    }
}

#[tokio::test]
async fn test_site_progress_patch_stays_within_percent_range() {
    let harness = TestHarness::new();
    let store = &harness.store;
    let site = store.create::<Site>(site_draft("Mill Road")).await.unwrap();

    let err = store
        .update_field::<Site>(&site.id, serde_json::json!({"progress": 101}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidPatch { .. }));

    let resumed = store
        .update_field::<Site>(&site.id, serde_json::json!({"progress": 35, "stage": "design"}))
        .await
        .unwrap();
    assert_eq!(resumed.progress, 35);
    assert_eq!(resumed.stage, SiteStage::Design);
}

#[tokio::test]
async fn test_overdue_invoices() {
    let harness = TestHarness::new();
    let store = &harness.store;
    let yesterday = TestHarness::epoch() - Duration::days(1);
    let next_week = TestHarness::epoch() + Duration::days(7);

    let late = store
        .create::<Invoice>(invoice_draft("INV-LATE", Some(yesterday)))
        .await
        .unwrap();
    store
        .create::<Invoice>(invoice_draft("INV-FUTURE", Some(next_week)))
        .await
        .unwrap();
    let paid = store
        .create::<Invoice>(invoice_draft("INV-PAID", Some(yesterday)))
        .await
        .unwrap();
    store.advance_stage::<Invoice>(&paid.id).await.unwrap();
    store.advance_stage::<Invoice>(&paid.id).await.unwrap();

    let overdue = || {
        ListQuery::new(
            RecordFilter::<Invoice>::new().matching("overdue", Invoice::is_overdue),
            first_page(),
        )
    };
    let hits: Vec<String> = store
        .list(&overdue())
        .await
        .unwrap()
        .records
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(hits, vec![late.id.clone()]);

    store
        .update_field::<Invoice>(&late.id, serde_json::json!({"status": "Void"}))
        .await
        .unwrap();
    assert!(store.list(&overdue()).await.unwrap().records.is_empty());

    harness.clock.advance(Duration::days(8));
    assert_eq!(store.list(&overdue()).await.unwrap().records.len(), 1);
}

#[tokio::test]
async fn test_stage_summary_lists_off_chain_stages_last() {
    let harness = TestHarness::new();
    let store = &harness.store;
    let a = store
        .create::<InstallationProject>(project_draft("A"))
        .await
        .unwrap();
    store
        .create::<InstallationProject>(project_draft("B"))
        .await
        .unwrap();
    store
        .update_field::<InstallationProject>(&a.id, serde_json::json!({"stage": "On Hold"}))
        .await
        .unwrap();

    let summary = store.stage_summary::<InstallationProject>().await.unwrap();
    assert_eq!(summary.len(), 7);
    assert_eq!(summary[0].stage, InstallationStage::Scheduled);
    assert_eq!(summary[0].count, 1);

    let last = summary.last().unwrap();
    assert_eq!(last.stage, InstallationStage::OnHold);
    assert_eq!(last.count, 1);
    assert!(!last.in_chain);
}

#[tokio::test]
async fn test_tasks_linked_to_invoice() {
    let harness = TestHarness::new();
    let store = &harness.store;
    let invoice = store
        .create::<Invoice>(invoice_draft("INV-7", None))
        .await
        .unwrap();

    let mut draft = TaskBuilder::new("Chase payment").build();
    draft.related_record_id = Some(invoice.id.clone());
    store.create::<Task>(draft).await.unwrap();
    store
        .create::<Task>(TaskBuilder::new("Unrelated").build())
        .await
        .unwrap();

    let filter = RecordFilter::<Task>::new().field_equals("relatedRecordId", invoice.id.clone());
    let linked = store
        .list(&ListQuery::new(filter, first_page()))
        .await
        .unwrap()
        .records;
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].title, "Chase payment");
}

//! Dashboard handler flows against the fake backend.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use price_monitor_sdk::browser::FilterInput;
use price_monitor_sdk::dashboard::{DashboardStats, ScrapeForm};
use price_monitor_sdk::models::{JobId, NewSeason, Table};
use price_monitor_sdk::monitor::Closure;
use price_monitor_sdk::{Dashboard, PriceMonitorError, PriceMonitorSdk, ToastLevel};

use common::{spawn_backend, wait_until, Backend, RecordingUi};

fn dashboard(backend: &Backend, confirm: bool) -> (Dashboard, Arc<RecordingUi>) {
    let ui = RecordingUi::new(confirm);
    (Dashboard::new(backend.sdk(), ui.clone()), ui)
}

fn form() -> ScrapeForm {
    ScrapeForm {
        start_date: "2025-06-01".into(),
        end_date: "2025-06-07".into(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Workspaces and seasons
// ---------------------------------------------------------------------------

#[test]
fn single_workspace_and_season_are_auto_selected() {
    let backend = spawn_backend();
    let (mut d, ui) = dashboard(&backend, true);

    d.load_workspaces().unwrap();

    assert_eq!(d.state().workspace_id(), Some(1));
    assert_eq!(d.state().season_id, Some(10));
    assert_eq!(
        ui.stats.lock().unwrap().last(),
        Some(&DashboardStats { listings: 2, seasons: 1 })
    );
}

#[test]
fn clearing_the_workspace_clears_the_season() {
    let backend = spawn_backend();
    let (mut d, _ui) = dashboard(&backend, true);
    d.load_workspaces().unwrap();
    d.select_workspace(None).unwrap();
    assert!(d.state().workspace.is_none());
    assert!(d.state().season_id.is_none());
}

#[test]
fn create_workspace_selects_it() {
    let backend = spawn_backend();
    let (mut d, ui) = dashboard(&backend, true);
    let ws = d.create_workspace("Lakes").unwrap();
    assert_eq!(d.state().workspace_id(), Some(ws.id));
    assert!(d.state().season_id.is_none());
    assert!(ui.has_toast(ToastLevel::Success, "Workspace created"));
}

#[test]
fn declined_delete_issues_no_request() {
    let backend = spawn_backend();
    let (mut d, ui) = dashboard(&backend, false);
    d.load_workspaces().unwrap();

    let err = d.delete_workspace().unwrap_err();

    assert!(matches!(err, PriceMonitorError::Cancelled(_)));
    assert!(backend.requests_matching("DELETE").is_empty());
    assert_eq!(ui.confirmations.lock().unwrap().len(), 1);
    assert!(d.state().workspace.is_some());
}

#[test]
fn confirmed_season_delete_drops_selection() {
    let backend = spawn_backend();
    let (mut d, _ui) = dashboard(&backend, true);
    d.load_workspaces().unwrap();

    d.delete_season(10, "Summer").unwrap();

    assert!(d.state().season_id.is_none());
    assert_eq!(backend.requests_matching("DELETE /api/seasons/10").len(), 1);
}

#[test]
fn create_season_without_workspace_warns() {
    let backend = spawn_backend();
    let (mut d, ui) = dashboard(&backend, true);
    let season = NewSeason {
        name: "x".into(),
        start_date: "2025-01-01".into(),
        end_date: "2025-01-02".into(),
    };
    assert!(d.create_season(&season).is_err());
    assert!(ui.has_toast(ToastLevel::Warning, "Select a workspace first"));
    assert!(backend.requests_matching("POST").is_empty());
}

// ---------------------------------------------------------------------------
// Scraping
// ---------------------------------------------------------------------------

#[test]
fn scrape_preflight_blocks_requests() {
    let backend = spawn_backend();
    let (mut d, ui) = dashboard(&backend, true);

    assert!(matches!(d.start_bulk_scrape(&form()), Err(PriceMonitorError::Validation(_))));
    assert!(ui.has_toast(ToastLevel::Warning, "Select a workspace and a season first"));

    d.load_workspaces().unwrap();
    assert!(matches!(d.start_bulk_scrape(&form()), Err(PriceMonitorError::Validation(_))));
    assert!(ui.has_toast(ToastLevel::Warning, "Select at least one listing"));

    assert!(backend.requests_matching("POST /api/seasons").is_empty());
}

#[test]
fn scrape_flow_watches_job_and_refreshes_once() {
    let backend = spawn_backend();
    backend.with_state(|s| {
        s.job_messages = vec![
            r#"{"type":"progress","percent":60}"#.into(),
            r#"{"type":"done"}"#.into(),
        ]
    });
    let (mut d, ui) = dashboard(&backend, true);
    d.load_workspaces().unwrap();
    d.toggle_scrape_listing(8);
    d.toggle_scrape_listing(7);
    let stats_before = ui.stats_count();

    let started = d.start_bulk_scrape(&form()).unwrap();

    assert_eq!(started.job_id, Some(JobId::from(42)));
    assert!(ui.has_toast(ToastLevel::Success, "Job 42 started"));
    assert!(d.state().scrape_selection.is_empty());

    let body = backend.with_state(|s| s.scrape_requests[0].clone());
    assert_eq!(body["establishments"], serde_json::json!([8, 7]));
    assert_eq!(body["platform"], "airbnb");
    assert_eq!(body["params"]["guests"], 2);
    assert_eq!(body["params"]["currency"], "USD");

    let closure = started.watcher.unwrap().join().unwrap();
    assert_eq!(closure, Closure::Success);
    assert!(wait_until(Duration::from_secs(3), || ui.stats_count() == stats_before + 1));
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(ui.stats_count(), stats_before + 1);
    assert!(ui.has_toast(ToastLevel::Success, "Job 42 completed"));
}

#[test]
fn scrape_server_error_is_toasted_verbatim() {
    let backend = spawn_backend();
    backend.with_state(|s| s.scrape_error = Some("no capacity".into()));
    let (mut d, ui) = dashboard(&backend, true);
    d.load_workspaces().unwrap();
    d.toggle_scrape_listing(7);

    assert!(d.start_bulk_scrape(&form()).is_err());
    assert_eq!(
        ui.last_toast(),
        Some((ToastLevel::Danger, "Error: no capacity".to_string()))
    );
    assert!(d.state().scrape_selection.contains(7));
}

#[test]
fn changing_provider_clears_scrape_selection() {
    let backend = spawn_backend();
    let (mut d, _ui) = dashboard(&backend, true);
    d.load_workspaces().unwrap();
    d.toggle_scrape_listing(7);
    d.set_scrape_provider("booking");
    assert!(d.state().scrape_selection.is_empty());
    assert!(d.scraping_listings().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[test]
fn analytics_load_and_export() {
    let backend = spawn_backend();
    let dir = tempfile::tempdir().unwrap();
    let sdk = PriceMonitorSdk::builder()
        .base_url(&backend.url)
        .export_dir(dir.path())
        .build()
        .unwrap();
    let ui = RecordingUi::new(true);
    let mut d = Dashboard::new(sdk, ui.clone());

    d.load_analytics_tab().unwrap();
    assert!(d.analytics().range().is_some());

    assert!(d.load_analytics().is_err());
    assert!(ui.has_toast(ToastLevel::Warning, "Select at least one listing"));

    d.set_analytics_range(
        NaiveDate::from_ymd_opt(2025, 1, 1),
        NaiveDate::from_ymd_opt(2025, 1, 31),
    );
    let report = d.toggle_analytics_listing(7).unwrap().unwrap();
    assert_eq!(report.stats.rows.len(), 1);
    assert_eq!(ui.charts_shown.load(Ordering::SeqCst), 1);

    let path = d.export_analytics().unwrap();
    assert_eq!(path, dir.path().join("analytics_2025-01-01_2025-01-31.csv"));
    assert!(std::fs::read_to_string(path).unwrap().starts_with("Fecha,"));
}

#[test]
fn analytics_tab_offers_only_current_workspace_listings() {
    let backend = spawn_backend();
    let (mut d, _ui) = dashboard(&backend, true);

    d.load_workspaces().unwrap();
    assert_eq!(d.state().workspace_id(), Some(1));

    let ids: Vec<i64> = d.load_analytics_tab().unwrap().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![7, 8]);
    assert!(d.analytics().listings.iter().all(|l| l.id != 9));

    d.select_workspace(None).unwrap();
    let ids: Vec<i64> = d.load_analytics_tab().unwrap().iter().map(|l| l.id).collect();
    assert!(ids.contains(&9));
}

#[test]
fn analytics_failure_is_reported() {
    let backend = spawn_backend();
    backend.with_state(|s| s.failing_prices = Some(7));
    let (mut d, ui) = dashboard(&backend, true);
    d.set_analytics_range(
        NaiveDate::from_ymd_opt(2025, 1, 1),
        NaiveDate::from_ymd_opt(2025, 1, 31),
    );
    assert!(d.toggle_analytics_listing(7).is_err());
    assert!(ui.has_toast(ToastLevel::Danger, "price store unavailable"));
}

// ---------------------------------------------------------------------------
// Database browser
// ---------------------------------------------------------------------------

#[test]
fn database_paging_and_filters() {
    let backend = spawn_backend();
    let (mut d, ui) = dashboard(&backend, true);
    d.load_workspaces().unwrap();

    let page = d.load_database_table(Table::Prices).unwrap();
    assert_eq!(page.items.len(), 50);
    assert_eq!(d.browser().total_pages(), 3);

    assert!(d.prev_database_page().unwrap().is_none());
    d.next_database_page().unwrap().unwrap();
    let last = d.go_to_database_page(3).unwrap();
    assert_eq!(last.items.len(), 20);
    assert!(d.next_database_page().unwrap().is_none());

    d.apply_database_filters(&FilterInput {
        listing_id: Some(7),
        ..Default::default()
    })
    .unwrap();
    d.sort_database("date").unwrap();

    let last_request = backend.requests_matching("GET /api/database/prices").pop().unwrap();
    assert_eq!(
        last_request,
        "GET /api/database/prices?page=1&page_size=50&workspace_id=1&season_id=10&listing_id=7&sort_by=date&sort_order=asc"
    );
    let (columns, _) = ui.tables.lock().unwrap().last().cloned().unwrap();
    assert_eq!(columns[0], "id");
}

#[test]
fn bulk_delete_confirms_then_reloads() {
    let backend = spawn_backend();
    let (mut d, ui) = dashboard(&backend, true);
    d.load_database_table(Table::Prices).unwrap();

    let message = d.delete_filtered_records().unwrap();

    assert_eq!(message, "Deleted 120 records");
    assert!(ui.has_toast(ToastLevel::Success, "Deleted 120 records"));
    assert!(ui.confirmations.lock().unwrap()[0].contains("ALL records"));
    assert_eq!(d.browser().total, 0);
}

#[test]
fn workspace_table_cannot_be_bulk_deleted_or_exported() {
    let backend = spawn_backend();
    let (mut d, ui) = dashboard(&backend, true);
    d.load_database_table(Table::Workspaces).unwrap();

    assert!(d.delete_filtered_records().is_err());
    assert!(d.export_database_table().is_err());
    assert!(ui.confirmations.lock().unwrap().is_empty());
    assert!(backend.requests_matching("DELETE").is_empty());
}

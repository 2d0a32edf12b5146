//! Shared test fixtures for the Price Monitor SDK integration tests.
//!
//! Provides `spawn_backend()`, an in-process fake of the Price Monitor HTTP
//! and WebSocket API served by axum on an ephemeral port, and `RecordingUi`,
//! a [`Ui`] that records everything pushed to it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use price_monitor_sdk::analytics::{PriceChart, StatsTable};
use price_monitor_sdk::dashboard::DashboardStats;
use price_monitor_sdk::models::{Listing, Page, Season, Workspace};
use price_monitor_sdk::{PriceMonitorSdk, ToastLevel, Ui};

// ---------------------------------------------------------------------------
// Backend state
// ---------------------------------------------------------------------------

pub struct BackendState {
    pub workspaces: Vec<Value>,
    pub seasons: Vec<Value>,
    pub listings: Vec<Value>,
    pub prices: HashMap<i64, Vec<Value>>,
    /// Listing whose price endpoint answers 500.
    pub failing_prices: Option<i64>,
    pub scrape_requests: Vec<Value>,
    pub scrape_response: Value,
    /// Plain-text body for a 400 answer to scrape submissions.
    pub scrape_error: Option<String>,
    /// Frames sent on every job socket, in order.
    pub job_messages: Vec<String>,
    pub tables: HashMap<String, Vec<Value>>,
    /// `METHOD /path?query` for every request received.
    pub requests: Vec<String>,
    next_id: i64,
}

impl BackendState {
    fn seeded() -> Self {
        let mut prices = HashMap::new();
        prices.insert(
            7,
            vec![
                json!({"date": "2025-01-01", "price_per_night": 100.0, "available": true, "min_nights": 2, "stay_total": 200.0}),
                json!({"date": "2025-01-03", "price_per_night": null, "available": false}),
            ],
        );
        prices.insert(
            8,
            vec![json!({"date": "2025-01-02", "price_per_night": 80.0, "available": true})],
        );

        let mut tables = HashMap::new();
        tables.insert(
            "prices".to_string(),
            (1..=120)
                .map(|i| json!({"id": i, "listing_id": 7, "date": "2025-01-01", "price_per_night": 100.0, "available": true}))
                .collect(),
        );
        tables.insert(
            "jobs".to_string(),
            vec![json!({"id": 1, "status": "completed", "error": null})],
        );

        Self {
            workspaces: vec![json!({"id": 1, "name": "Coast", "created_at": "2025-01-01T00:00:00"})],
            seasons: vec![json!({
                "id": 10, "workspace_id": 1, "name": "Summer",
                "start_date": "2025-06-01", "end_date": "2025-08-31"
            })],
            listings: vec![
                json!({
                    "id": 7, "listing_id": "A7", "name": "Sea View", "url": null,
                    "provider": "airbnb", "workspace_id": 1,
                    "platform_sources": [
                        {"platform": "airbnb"},
                        {"platform": "booking", "extra_data": {"supported": false}}
                    ]
                }),
                json!({"id": 8, "listing_id": "B8", "name": "Old Town", "workspace_id": 1}),
                json!({"id": 9, "listing_id": "C9", "name": "Elsewhere", "workspace_id": 2}),
            ],
            prices,
            failing_prices: None,
            scrape_requests: Vec::new(),
            scrape_response: json!({"job_id": 42}),
            scrape_error: None,
            job_messages: Vec::new(),
            tables,
            requests: Vec::new(),
            next_id: 100,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<BackendState>>;

pub struct Backend {
    pub url: String,
    pub state: Shared,
}

impl Backend {
    pub fn sdk(&self) -> PriceMonitorSdk {
        PriceMonitorSdk::builder()
            .base_url(&self.url)
            .timeout(Duration::from_secs(5))
            .refresh_delay(Duration::from_millis(50))
            .build()
            .unwrap()
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut BackendState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    /// Requests whose line starts with `prefix`.
    pub fn requests_matching(&self, prefix: &str) -> Vec<String> {
        self.with_state(|s| {
            s.requests
                .iter()
                .filter(|r| r.starts_with(prefix))
                .cloned()
                .collect()
        })
    }
}

/// Start the fake backend on its own Tokio runtime thread.
pub fn spawn_backend() -> Backend {
    let state: Shared = Arc::new(Mutex::new(BackendState::seeded()));
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    Backend {
        url: format!("http://{addr}"),
        state,
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/workspaces", get(list_workspaces).post(create_workspace))
        .route(
            "/api/workspaces/{id}",
            get(get_workspace).put(rename_workspace).delete(delete_workspace),
        )
        .route(
            "/api/workspaces/{id}/seasons",
            get(list_seasons).post(create_season),
        )
        .route("/api/seasons/{id}", delete(delete_season))
        .route("/api/seasons/{id}/scrape", post(submit_scrape))
        .route("/api/listings", get(list_listings).post(create_listing))
        .route("/api/listings/{id}", delete(delete_listing))
        .route("/api/prices/{id}", get(get_prices))
        .route(
            "/api/database/{table}",
            get(database_page).delete(database_delete),
        )
        .route("/api/database/{table}/export", get(database_export))
        .route("/ws/scrape-jobs/{id}", get(job_socket))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let line = format!("{} {}", req.method(), req.uri());
    state.lock().unwrap().requests.push(line);
    next.run(req).await
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": format!("{what} not found")}))).into_response()
}

// -- Workspaces ---------------------------------------------------------------

async fn list_workspaces(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().workspaces.clone()))
}

async fn create_workspace(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut s = state.lock().unwrap();
    let id = s.next_id();
    let ws = json!({"id": id, "name": body["name"]});
    s.workspaces.push(ws.clone());
    Json(ws)
}

async fn get_workspace(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let s = state.lock().unwrap();
    match s.workspaces.iter().find(|w| w["id"] == id) {
        Some(ws) => Json(ws.clone()).into_response(),
        None => not_found("Workspace"),
    }
}

async fn rename_workspace(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    match s.workspaces.iter_mut().find(|w| w["id"] == id) {
        Some(ws) => {
            ws["name"] = body["name"].clone();
            Json(ws.clone()).into_response()
        }
        None => not_found("Workspace"),
    }
}

async fn delete_workspace(State(state): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    state.lock().unwrap().workspaces.retain(|w| w["id"] != id);
    Json(json!({"ok": true}))
}

// -- Seasons ------------------------------------------------------------------

async fn list_seasons(State(state): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    let s = state.lock().unwrap();
    Json(Value::Array(
        s.seasons
            .iter()
            .filter(|season| season["workspace_id"] == id)
            .cloned()
            .collect(),
    ))
}

async fn create_season(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Json<Value> {
    let mut s = state.lock().unwrap();
    body["id"] = json!(s.next_id());
    body["workspace_id"] = json!(id);
    s.seasons.push(body.clone());
    Json(body)
}

async fn delete_season(State(state): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    state.lock().unwrap().seasons.retain(|season| season["id"] != id);
    Json(json!({"ok": true}))
}

async fn submit_scrape(
    State(state): State<Shared>,
    Path(_season): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.scrape_requests.push(body);
    match &s.scrape_error {
        Some(text) => (StatusCode::BAD_REQUEST, text.clone()).into_response(),
        None => Json(s.scrape_response.clone()).into_response(),
    }
}

// -- Listings -----------------------------------------------------------------

async fn list_listings(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().listings.clone()))
}

async fn create_listing(State(state): State<Shared>, Json(mut body): Json<Value>) -> Json<Value> {
    let mut s = state.lock().unwrap();
    body["id"] = json!(s.next_id());
    s.listings.push(body.clone());
    Json(body)
}

async fn delete_listing(State(state): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    state.lock().unwrap().listings.retain(|l| l["id"] != id);
    Json(json!({"ok": true}))
}

async fn get_prices(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let s = state.lock().unwrap();
    if s.failing_prices == Some(id) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "price store unavailable"})),
        )
            .into_response();
    }
    let start = params.get("start_date").cloned().unwrap_or_default();
    let end = params
        .get("end_date")
        .cloned()
        .unwrap_or_else(|| "9999-12-31".to_string());
    let rows: Vec<Value> = s
        .prices
        .get(&id)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|p| {
            let date = p["date"].as_str().unwrap_or_default();
            date >= start.as_str() && date <= end.as_str()
        })
        .collect();
    Json(Value::Array(rows)).into_response()
}

// -- Database -----------------------------------------------------------------

async fn database_page(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let s = state.lock().unwrap();
    let rows = s.tables.get(&table).cloned().unwrap_or_default();
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let size: usize = params
        .get("page_size")
        .and_then(|p| p.parse().ok())
        .unwrap_or(50);
    let items: Vec<Value> = rows
        .iter()
        .skip((page - 1) * size)
        .take(size)
        .cloned()
        .collect();
    Json(json!({"items": items, "total": rows.len()}))
}

async fn database_delete(State(state): State<Shared>, Path(table): Path<String>) -> Json<Value> {
    let mut s = state.lock().unwrap();
    let removed = s.tables.get_mut(&table).map(std::mem::take).unwrap_or_default();
    Json(json!({"message": format!("Deleted {} records", removed.len())}))
}

async fn database_export(Path(table): Path<String>) -> Response {
    (
        [("content-type", "text/csv")],
        format!("id,table\n1,{table}\n"),
    )
        .into_response()
}

// -- Job socket ---------------------------------------------------------------

async fn job_socket(State(state): State<Shared>, ws: WebSocketUpgrade) -> Response {
    let messages = state.lock().unwrap().job_messages.clone();
    ws.on_upgrade(move |socket| stream_job(socket, messages))
}

/// Send the scripted frames, then wait briefly for the client to close. If it
/// does not, close from the server side.
async fn stream_job(mut socket: WebSocket, messages: Vec<String>) {
    for text in messages {
        if socket.send(Message::Text(text.into())).await.is_err() {
            return;
        }
    }
    let client_closed = tokio::time::timeout(Duration::from_millis(300), async {
        while let Some(Ok(msg)) = socket.recv().await {
            if matches!(msg, Message::Close(_)) {
                return true;
            }
        }
        true
    })
    .await
    .unwrap_or(false);
    if !client_closed {
        let _ = socket.send(Message::Close(None)).await;
        let _ = tokio::time::timeout(Duration::from_millis(300), socket.recv()).await;
    }
}

// ---------------------------------------------------------------------------
// RecordingUi
// ---------------------------------------------------------------------------

/// [`Ui`] that records every call for later assertions.
pub struct RecordingUi {
    pub toasts: Mutex<Vec<(ToastLevel, String)>>,
    pub logs: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<f64>>,
    pub confirmations: Mutex<Vec<String>>,
    pub stats: Mutex<Vec<DashboardStats>>,
    pub tables: Mutex<Vec<(Vec<String>, usize)>>,
    pub seasons_shown: AtomicUsize,
    pub listings_shown: AtomicUsize,
    pub charts_shown: AtomicUsize,
    answer: AtomicBool,
}

impl RecordingUi {
    /// A recorder that answers every confirmation with `answer`.
    pub fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            toasts: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
            progress: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Vec::new()),
            stats: Mutex::new(Vec::new()),
            tables: Mutex::new(Vec::new()),
            seasons_shown: AtomicUsize::new(0),
            listings_shown: AtomicUsize::new(0),
            charts_shown: AtomicUsize::new(0),
            answer: AtomicBool::new(answer),
        })
    }

    pub fn toasts(&self) -> Vec<(ToastLevel, String)> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }

    pub fn last_toast(&self) -> Option<(ToastLevel, String)> {
        self.toasts.lock().unwrap().last().cloned()
    }

    pub fn has_toast(&self, level: ToastLevel, needle: &str) -> bool {
        self.toasts()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    pub fn stats_count(&self) -> usize {
        self.stats.lock().unwrap().len()
    }
}

impl Ui for RecordingUi {
    fn toast(&self, level: ToastLevel, message: &str) {
        self.toasts.lock().unwrap().push((level, message.to_string()));
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirmations.lock().unwrap().push(message.to_string());
        self.answer.load(Ordering::SeqCst)
    }

    fn append_scrape_log(&self, line: &str) {
        self.logs.lock().unwrap().push(line.to_string());
    }

    fn set_scrape_progress(&self, percent: f64) {
        self.progress.lock().unwrap().push(percent);
    }

    fn show_seasons(&self, _seasons: &[Season]) {
        self.seasons_shown.fetch_add(1, Ordering::SeqCst);
    }

    fn show_listings(&self, _listings: &[Listing]) {
        self.listings_shown.fetch_add(1, Ordering::SeqCst);
    }

    fn show_workspaces(&self, _workspaces: &[Workspace]) {}

    fn show_stats(&self, stats: &DashboardStats) {
        self.stats.lock().unwrap().push(*stats);
    }

    fn show_chart(&self, _chart: &PriceChart) {
        self.charts_shown.fetch_add(1, Ordering::SeqCst);
    }

    fn show_price_stats(&self, _stats: &StatsTable) {}

    fn show_table(&self, columns: &[String], page: &Page) {
        self.tables
            .lock()
            .unwrap()
            .push((columns.to_vec(), page.items.len()));
    }
}

/// Poll `cond` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    cond()
}

#![allow(dead_code)]

use dlm_live::page::markup::render_listing;
use dlm_live::page::{Page, Selector};
use dlm_live::sync::poll::{build_client, PollLoop, PollOptions, SharedPage};
use dlm_live::sync::DownloadSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PROGRESS_PATH: &str = "/downloads/progress";

/// Setup a mock progress endpoint serving `body` as JSON
/// Returns (MockServer, endpoint_url)
pub async fn setup_progress_server(body: serde_json::Value) -> (MockServer, String) {
    let server = MockServer::start().await;
    mount_progress(&server, body).await;
    let endpoint = format!("{}{}", server.uri(), PROGRESS_PATH);
    (server, endpoint)
}

/// Mount (or re-mount after `reset`) the progress response
pub async fn mount_progress(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(PROGRESS_PATH))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Setup a mock progress endpoint that returns an HTTP error
pub async fn setup_error_server(status_code: u16) -> (MockServer, String) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROGRESS_PATH))
        .respond_with(ResponseTemplate::new(status_code))
        .mount(&server)
        .await;

    let endpoint = format!("{}{}", server.uri(), PROGRESS_PATH);
    (server, endpoint)
}

/// Setup a mock progress endpoint whose body is not a snapshot array
pub async fn setup_malformed_server() -> (MockServer, String) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROGRESS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{\"oops\": ")
                .append_header("Content-Type", "application/json"),
        )
        .mount(&server)
        .await;

    let endpoint = format!("{}{}", server.uri(), PROGRESS_PATH);
    (server, endpoint)
}

/// Snapshot with byte counters set
pub fn snapshot(id: &str, status: &str, received: i64, total: i64) -> DownloadSnapshot {
    let mut snapshot = DownloadSnapshot::new(id, status);
    snapshot.received_bytes = received;
    snapshot.total_bytes = total;
    snapshot
}

/// Listing page with one row per snapshot, shared for polling
pub fn shared_listing(rows: &[DownloadSnapshot]) -> SharedPage {
    Arc::new(RwLock::new(render_listing(rows)))
}

/// Poll loop against `endpoint` with UTC times and the given interval
pub fn create_test_poll(endpoint: &str, page: SharedPage, interval: Duration) -> PollLoop {
    let mut options = PollOptions::new(Url::parse(endpoint).unwrap());
    options.interval = interval;
    options.display.utc_times = true;
    let client = build_client("dlm-live-test", Some(Duration::from_secs(5))).unwrap();
    PollLoop::new(client, options, page)
}

/// Row for download `id`
pub fn row(page: &Page, id: &str) -> dlm_live::page::NodeId {
    page.query(
        page.root(),
        &Selector::tag("tr").and_attr_eq("data-download-id", id),
    )
    .unwrap()
}

/// Text of the first element with `class` inside the row for `id`
pub fn row_text(page: &Page, id: &str, class: &str) -> String {
    let row = row(page, id);
    let el = page.query(row, &Selector::class(class)).unwrap();
    page.text(el).to_string()
}

/// Inline width of the bar fill inside the row for `id`
pub fn bar_width(page: &Page, id: &str) -> Option<String> {
    let row = row(page, id);
    let bar = page.query(row, &Selector::class("progress__bar-fill"))?;
    page.style_width(bar).map(str::to_string)
}

/// Poll `check` against the page until it holds or `limit` elapses
pub async fn wait_for_page<F>(page: &SharedPage, limit: Duration, check: F) -> bool
where
    F: Fn(&Page) -> bool,
{
    tokio::time::timeout(limit, async {
        loop {
            if check(&*page.read().await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}

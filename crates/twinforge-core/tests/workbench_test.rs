#![allow(clippy::unwrap_used)]
// End-to-end tests for the Workbench against a wiremock backend.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use twinforge_core::{
    AssignmentStatus, BuildStatus, CoreError, PinDisplay, Workbench, WorkbenchConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Workbench) {
    let server = MockServer::start().await;
    let workbench = bench_with_intervals(&server, Duration::ZERO, Duration::ZERO);
    (server, workbench)
}

/// Workbench wired to `server`, pollers paced as given (zero = disabled).
fn bench_with_intervals(
    server: &MockServer,
    ota_poll: Duration,
    status_poll: Duration,
) -> Workbench {
    let mut config = WorkbenchConfig::new(Url::parse(&server.uri()).unwrap(), "esp32_01");
    config.ota_poll_interval = ota_poll;
    config.status_poll_interval = status_poll;
    Workbench::new(config).unwrap()
}

// ── Compile → assign happy path ─────────────────────────────────────

#[tokio::test]
async fn compile_then_assign_flow() {
    let (server, workbench) = setup().await;

    Mock::given(method("POST"))
        .and(path("/firmware/compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "build_id": "b-42",
            "logs": "OK"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/ota/assign"))
        .and(body_json(json!({"device_id": "esp32_01", "build_id": "b-42"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    workbench.start_compile("void setup() {}").await.unwrap();

    let build = workbench.snapshot().build.clone();
    assert_eq!(build.status, BuildStatus::Succeeded);
    assert_eq!(build.id.as_deref(), Some("b-42"));
    assert_eq!(build.logs, "OK");

    workbench.start_assignment("esp32_01").await.unwrap();

    let assignment = workbench.snapshot().assignment.clone().unwrap();
    assert_eq!(assignment.status, AssignmentStatus::Assigned);
    assert_eq!(assignment.device_id, "esp32_01");
    assert_eq!(assignment.build_id, "b-42");
}

#[tokio::test]
async fn compile_server_failure_lands_in_build_status() {
    let (server, workbench) = setup().await;

    Mock::given(method("POST"))
        .and(path("/firmware/compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "build_id": null,
            "logs": "error: 'Serail' was not declared in this scope"
        })))
        .mount(&server)
        .await;

    // Network failure is not an Err: it's attached to the Build record.
    workbench.start_compile("Serail.begin();").await.unwrap();

    let build = workbench.snapshot().build.clone();
    assert_eq!(build.status, BuildStatus::Failed);
    assert_eq!(build.id, None);
    assert!(build.logs.contains("not declared"));
}

#[tokio::test]
async fn compile_transport_failure_lands_in_build_status() {
    // Closed port: connection refused.
    let config = WorkbenchConfig::new(Url::parse("http://127.0.0.1:9").unwrap(), "esp32_01");
    let workbench = Workbench::new(config).unwrap();

    workbench.start_compile("void setup() {}").await.unwrap();

    let build = workbench.snapshot().build.clone();
    assert_eq!(build.status, BuildStatus::Failed);
    assert_eq!(build.id, None);
    assert!(!build.logs.is_empty());
}

// ── Guard failures issue zero network calls ─────────────────────────

#[tokio::test]
async fn guard_failures_send_nothing() {
    let (server, workbench) = setup().await;

    // Any request reaching the server fails the test on drop.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let compile = workbench.start_compile("").await;
    assert!(matches!(compile, Err(CoreError::EmptyInput)));

    let assign = workbench.start_assignment("esp32_01").await;
    assert!(matches!(assign, Err(CoreError::NoBuildAvailable)));
    assert!(workbench.snapshot().assignment.is_none());
}

// ── Supersession under real network reordering ──────────────────────

#[tokio::test]
async fn slow_first_compile_cannot_clobber_second() {
    let (server, workbench) = setup().await;

    // First request: slow, answers b1. Second request: fast, answers b2.
    Mock::given(method("POST"))
        .and(path("/firmware/compile"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(400))
                .set_body_json(json!({"success": true, "build_id": "b1", "logs": "OK"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/firmware/compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "build_id": "b2",
            "logs": "OK"
        })))
        .mount(&server)
        .await;

    let wb1 = workbench.clone();
    let first = tokio::spawn(async move { wb1.start_compile("// v1").await });

    // Let the first compile get issued before the second supersedes it.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let wb2 = workbench.clone();
    let second = tokio::spawn(async move { wb2.start_compile("// v2").await });

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let build = workbench.snapshot().build.clone();
    assert_eq!(build.status, BuildStatus::Succeeded);
    assert_eq!(build.id.as_deref(), Some("b2"));
    assert_eq!(build.source_code, "// v2");
}

// ── Status refresh and pin telemetry ────────────────────────────────

#[tokio::test]
async fn refresh_updates_device_and_pins() {
    let (server, workbench) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/esp32_01/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "online": true,
            "wifi_confirmed": true,
            "last_seen": "2024-06-15T10:30:00"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/digital-twin/esp32_01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pins": {"2": 1, "13": 7},
            "warnings": ["Pin 13 abnormal value"]
        })))
        .mount(&server)
        .await;

    let device = workbench.refresh_device().await.unwrap();
    assert!(device.online);
    assert!(device.network_confirmed);
    assert!(device.last_seen.is_some());

    let pins = workbench.refresh_pins().await.unwrap();
    assert_eq!(pins.get(2).unwrap().display(), PinDisplay::Working);
    assert_eq!(pins.get(13).unwrap().display(), PinDisplay::Error);
    let legend = pins.legend();
    assert_eq!((legend.working, legend.error, legend.unused), (1, 1, 38));
}

#[tokio::test]
async fn refresh_device_maps_unknown_device() {
    let (server, workbench) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/esp32_01/status"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Device not found"})),
        )
        .mount(&server)
        .await;

    let result = workbench.refresh_device().await;
    assert!(matches!(result, Err(CoreError::DeviceNotFound { .. })));
}

#[tokio::test]
async fn confirm_network_reflects_locally() {
    let (server, workbench) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/esp32_01/confirm-network"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "confirmed"})))
        .mount(&server)
        .await;

    workbench.confirm_network().await.unwrap();
    assert!(workbench.snapshot().device.network_confirmed);
}

// ── Poller behavior ─────────────────────────────────────────────────

#[tokio::test]
async fn event_poller_is_idempotent_across_ticks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ota/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "timestamp": 1,
            "device_id": "esp32_01",
            "build_id": "b-42",
            "status": "fallback",
            "reason": "crc_fail"
        }])))
        .mount(&server)
        .await;

    let workbench = bench_with_intervals(&server, Duration::from_millis(50), Duration::ZERO);
    workbench.start().await;

    // Several poll ticks observe the identical response.
    tokio::time::sleep(Duration::from_millis(300)).await;
    workbench.shutdown().await;

    let events = workbench.snapshot().events.clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].build_id, "b-42");
    assert_eq!(events[0].status.as_str(), "fallback");
}

#[tokio::test]
async fn shutdown_discards_in_flight_fetch() {
    let server = MockServer::start().await;

    // The fetch would take far longer than the test: shutdown must not
    // wait for it, and its result must never be applied.
    Mock::given(method("GET"))
        .and(path("/ota/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(30))
                .set_body_json(json!([{
                    "timestamp": 1,
                    "device_id": "esp32_01",
                    "build_id": "b-42",
                    "status": "fallback",
                    "reason": null
                }])),
        )
        .mount(&server)
        .await;

    let workbench = bench_with_intervals(&server, Duration::from_millis(20), Duration::ZERO);
    workbench.start().await;

    // Let a tick fire and the fetch get in flight.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = std::time::Instant::now();
    workbench.shutdown().await;
    assert!(started.elapsed() < Duration::from_secs(5));

    assert!(workbench.snapshot().events.is_empty());
}

#[tokio::test]
async fn status_poller_keeps_device_fresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/devices/esp32_01/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "online": true,
            "wifi_confirmed": false,
            "last_seen": "2024-06-15T10:30:00"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/digital-twin/esp32_01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pins": {"4": 0},
            "warnings": []
        })))
        .mount(&server)
        .await;

    let workbench = bench_with_intervals(&server, Duration::ZERO, Duration::from_millis(50));

    assert!(!workbench.snapshot().device.online);
    workbench.start().await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    workbench.shutdown().await;

    assert!(workbench.snapshot().device.online);
    assert_eq!(
        workbench.pins().get(4).unwrap().display(),
        PinDisplay::Working
    );
}

#[tokio::test]
async fn poll_failures_are_swallowed_and_self_heal() {
    let server = MockServer::start().await;

    // First two polls fail, then the feed recovers.
    Mock::given(method("GET"))
        .and(path("/ota/events"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ota/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "timestamp": 7,
            "device_id": "esp32_01",
            "build_id": "b-7",
            "status": "delivered",
            "reason": null
        }])))
        .mount(&server)
        .await;

    let workbench = bench_with_intervals(&server, Duration::from_millis(40), Duration::ZERO);
    workbench.start().await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    workbench.shutdown().await;

    let events = workbench.snapshot().events.clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].build_id, "b-7");
}

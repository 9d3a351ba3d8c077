mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{fast_simulation, init_logging, job, FakeBackend, TestSink};
use nexus_engine::{
    BackendSettings, DispatchError, DispatchReport, Engine, RemoteBackend, ReqwestBackend,
    RunCompletion, RunSource, Strategy,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> Arc<ReqwestBackend> {
    Arc::new(ReqwestBackend::new(BackendSettings {
        base_url: server.uri(),
        health_timeout: Duration::from_millis(200),
    }))
}

#[tokio::test]
async fn health_check_is_true_for_2xx_health() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let engine = Engine::new(backend_for(&server), fast_simulation(1));
    let sink = TestSink::new();

    assert!(engine.check_health(&sink).await);
    assert_eq!(
        sink.events(),
        vec![nexus_engine::EngineEvent::BackendChecked { available: true }]
    );
    assert_eq!(engine.availability().get(), nexus_engine::Availability::Available);
}

#[tokio::test]
async fn health_check_is_false_for_server_errors() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(!backend_for(&server).check_health().await);
}

#[tokio::test]
async fn health_check_is_false_when_health_is_too_slow() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    assert!(!backend_for(&server).check_health().await);
}

#[tokio::test]
async fn health_check_is_false_when_nothing_listens() {
    init_logging();
    let backend = ReqwestBackend::new(BackendSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        health_timeout: Duration::from_millis(200),
    });
    assert!(!backend.check_health().await);
}

#[tokio::test]
async fn dispatch_posts_job_and_parses_report() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .and(body_json(serde_json::json!({
            "id": "R",
            "url": "https://www.mh.com.fj",
            "strategy": "STATIC",
            "selectors": {
                "productContainer": "div.product-card",
                "name": "h2.title",
                "price": "span.price",
                "image": "img"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "count": 42,
            "log": ["fetched page 1", "fetched page 2"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = backend_for(&server)
        .dispatch(&job("R", Strategy::Static))
        .await
        .expect("dispatch ok");
    assert_eq!(
        report,
        DispatchReport {
            success: true,
            count: 42,
            log: vec!["fetched page 1".to_string(), "fetched page 2".to_string()],
        }
    );
}

#[tokio::test]
async fn dispatch_maps_http_status() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .dispatch(&job("R", Strategy::Static))
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::HttpStatus(500));
}

#[tokio::test]
async fn dispatch_rejects_malformed_body() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .dispatch(&job("R", Strategy::Static))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidResponse(_)));
}

#[tokio::test]
async fn remote_success_commits_server_count() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "count": 17,
            "log": ["[Server] page 1 done"]
        })))
        .mount(&server)
        .await;

    let engine = Engine::new(backend_for(&server), fast_simulation(1));
    engine.availability().resolve(true);
    let sink = TestSink::new();
    let spec = job("R", Strategy::Static);
    engine.begin(&spec, &sink);

    let completion = engine.execute(&spec, &sink).await;

    match completion {
        RunCompletion::Succeeded(summary) => {
            assert_eq!(summary.items, 17);
            assert_eq!(summary.source, RunSource::Remote);
        }
        other => panic!("unexpected {other:?}"),
    }
    let messages = sink.messages();
    assert!(messages.contains(&"[System] Connected to backend server. Dispatching job...".to_string()));
    assert!(messages.contains(&"[Server] page 1 done".to_string()));
    assert!(messages.contains(&"[Server] Job finished. Scraped 17 items.".to_string()));
    assert_eq!(sink.count_containing("Scraping page"), 0);
}

#[tokio::test]
async fn unavailable_backend_never_receives_scrape_requests() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = Engine::new(backend_for(&server), fast_simulation(1));
    let sink = TestSink::new();
    assert!(!engine.check_health(&sink).await);

    for id in ["a", "b", "c"] {
        let spec = job(id, Strategy::Static);
        engine.begin(&spec, &sink);
        let completion = engine.execute(&spec, &sink).await;
        assert!(matches!(
            completion,
            RunCompletion::Succeeded(ref summary) if summary.source == RunSource::Simulated
        ));
    }
}

#[tokio::test]
async fn rejected_dispatch_falls_back_within_the_same_run() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": false })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = Engine::new(backend_for(&server), fast_simulation(3));
    engine.availability().resolve(true);
    let sink = TestSink::new();
    let spec = job("F", Strategy::Static);
    engine.begin(&spec, &sink);

    let completion = engine.execute(&spec, &sink).await;

    assert!(matches!(
        completion,
        RunCompletion::Succeeded(ref summary) if summary.source == RunSource::Simulated
    ));
    assert_eq!(
        sink.count_containing(
            "[Error] Backend failure: scrape job failed on server. Falling back to simulation..."
        ),
        1
    );
    assert_eq!(sink.page_counts().len(), 3);
}

#[tokio::test]
async fn network_failure_logs_one_fallback_line_then_simulates() {
    init_logging();
    let backend = Arc::new(ReqwestBackend::new(BackendSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        health_timeout: Duration::from_millis(200),
    }));
    let engine = Engine::new(backend, fast_simulation(8));
    // Health check said yes earlier; the backend has since gone away.
    engine.availability().resolve(true);
    let sink = TestSink::new();
    let spec = job("Y", Strategy::Static);
    engine.begin(&spec, &sink);

    let completion = engine.execute(&spec, &sink).await;

    assert!(matches!(completion, RunCompletion::Succeeded(_)));
    assert_eq!(sink.count_containing("Falling back to simulation"), 1);
    let messages = sink.messages();
    let fallback = messages
        .iter()
        .position(|m| m.contains("Falling back to simulation"))
        .expect("fallback line");
    let dns = messages
        .iter()
        .position(|m| m.contains("Resolving DNS"))
        .expect("simulation started");
    assert!(fallback < dns);
    assert_eq!(sink.count_containing("Backend unavailable"), 0);
    // Failure does not downgrade availability for later runs.
    assert_eq!(engine.availability().get(), nexus_engine::Availability::Available);
}

#[tokio::test]
async fn stop_while_dispatch_in_flight_discards_result() {
    init_logging();
    let backend = FakeBackend::succeeding(250);
    let engine = Engine::new(backend.clone(), fast_simulation(1));
    engine.availability().resolve(true);
    backend.stop_during_dispatch(engine.registry().clone(), "S");
    let sink = TestSink::new();
    let spec = job("S", Strategy::Static);
    engine.begin(&spec, &sink);

    let completion = engine.execute(&spec, &sink).await;

    assert_eq!(completion, RunCompletion::Stopped);
    assert_eq!(backend.dispatches(), 1);
    assert_eq!(sink.count_containing("Scraped 250 items"), 0);
    assert_eq!(sink.count_containing("Process stopped by user request."), 1);
}

#[tokio::test]
async fn stop_while_failing_dispatch_in_flight_ends_cancelled_not_fallback() {
    init_logging();
    let backend = FakeBackend::new(
        true,
        Ok(DispatchReport {
            success: false,
            count: 0,
            log: Vec::new(),
        }),
    );
    let engine = Engine::new(backend.clone(), fast_simulation(1));
    engine.availability().resolve(true);
    backend.stop_during_dispatch(engine.registry().clone(), "S");
    let sink = TestSink::new();
    let spec = job("S", Strategy::Static);
    engine.begin(&spec, &sink);

    let completion = engine.execute(&spec, &sink).await;

    assert_eq!(completion, RunCompletion::Stopped);
    assert_eq!(sink.count_containing("Falling back"), 0);
    assert_eq!(sink.count_containing("Resolving DNS"), 0);
}

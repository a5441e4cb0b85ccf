mod common;

use ringscan_extract::NormalizePolicy;
use ringscan_http::HttpClient;
use ringscan_scan::{PageOutcome, PageResult, ScanError, ScanSettings, Scanner};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn page(server: &MockServer, route: &str, template: ResponseTemplate) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
    format!("{}{}", server.uri(), route)
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{body}</body></html>"),
        "text/html; charset=utf-8",
    )
}

fn scanner(timeout: Duration) -> Scanner {
    let client = HttpClient::new().unwrap();
    Scanner::new(
        client,
        ScanSettings {
            timeout,
            policy: NormalizePolicy::Strict,
        },
    )
}

fn numbers(result: &PageResult) -> Vec<&str> {
    result
        .phones()
        .unwrap_or_else(|| panic!("{} failed: {:?}", result.url, result.error()))
        .iter()
        .map(|n| n.as_str())
        .collect()
}

#[tokio::test]
async fn results_follow_input_order_not_completion_order() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let a = page(
        &server,
        "/a",
        html("8 (916) 111-11-11").set_delay(Duration::from_millis(400)),
    )
    .await;
    let b = page(
        &server,
        "/b",
        html("8 (916) 222-22-22").set_delay(Duration::from_millis(200)),
    )
    .await;
    let c = page(&server, "/c", html("8 (916) 333-33-33")).await;

    let urls = vec![a.clone(), b.clone(), c.clone()];
    let results = scanner(Duration::from_secs(5)).run(&urls).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].url, a);
    assert_eq!(results[1].url, b);
    assert_eq!(results[2].url, c);
    assert_eq!(numbers(&results[0]), vec!["89161111111"]);
    assert_eq!(numbers(&results[1]), vec!["89162222222"]);
    assert_eq!(numbers(&results[2]), vec!["89163333333"]);
}

#[tokio::test]
async fn pages_are_fetched_concurrently() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let mut urls = Vec::new();
    for i in 0..5 {
        let route = format!("/slow/{i}");
        urls.push(page(&server, &route, html("").set_delay(Duration::from_millis(300))).await);
    }

    let started = std::time::Instant::now();
    let results = scanner(Duration::from_secs(5)).run(&urls).await;

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.phones().is_some()));
    // Sequential fetching would need at least 1.5s.
    assert!(started.elapsed() < Duration::from_millis(1200));
}

#[tokio::test]
async fn numbers_are_normalized_and_deduplicated_per_page() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let url = page(
        &server,
        "/contacts",
        html(
            r#"<p>Офис: 8 916 123 45 67</p>
               <p>WhatsApp: +7(916)123-45-67</p>
               <a href="tel:89161234567">call</a>
               <p>Бухгалтерия: 8 (495) 765-43-21</p>"#,
        ),
    )
    .await;

    let results = scanner(Duration::from_secs(5)).run(&[url]).await;

    assert_eq!(numbers(&results[0]), vec!["84957654321", "89161234567"]);
}

#[tokio::test]
async fn page_without_numbers_yields_empty_set() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let url = page(&server, "/empty", html("<h1>About us</h1><p>Since 1998.</p>")).await;

    let results = scanner(Duration::from_secs(5)).run(&[url.clone()]).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, url);
    assert!(numbers(&results[0]).is_empty());
}

#[tokio::test]
async fn failing_urls_do_not_poison_the_batch() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let good = page(&server, "/good", html("+7 916 123-45-67")).await;
    let missing = page(&server, "/missing", ResponseTemplate::new(404)).await;
    let binary = page(
        &server,
        "/binary",
        ResponseTemplate::new(200).set_body_raw(vec![0xffu8, 0xfe, 0x00], "text/html"),
    )
    .await;
    let invalid = "not a url".to_string();

    let urls = vec![missing.clone(), good.clone(), invalid.clone(), binary.clone()];
    let results = scanner(Duration::from_secs(5)).run(&urls).await;

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].error(), Some(&ScanError::Status { status: 404 }));
    assert_eq!(numbers(&results[1]), vec!["89161234567"]);
    assert_eq!(results[2].url, invalid);
    assert_eq!(results[2].error().map(ScanError::kind), Some("invalid_url"));
    assert_eq!(results[3].error().map(ScanError::kind), Some("decode_failure"));
}

#[tokio::test]
async fn slow_page_times_out_on_its_own() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let slow = page(
        &server,
        "/slow",
        html("8 916 000 00 00").set_delay(Duration::from_secs(3)),
    )
    .await;
    let fast = page(&server, "/fast", html("8 916 123 45 67")).await;

    let results = scanner(Duration::from_millis(200))
        .run(&[slow, fast])
        .await;

    assert_eq!(
        results[0].error(),
        Some(&ScanError::Timeout { timeout_ms: 200 })
    );
    assert_eq!(numbers(&results[1]), vec!["89161234567"]);
}

#[tokio::test]
async fn cancellation_marks_unfinished_pages() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let fast = page(&server, "/fast", html("8 916 123 45 67")).await;
    let stuck = page(
        &server,
        "/stuck",
        html("8 916 765 43 21").set_delay(Duration::from_secs(10)),
    )
    .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let results = scanner(Duration::from_secs(30))
        .run_until_cancelled(&[fast, stuck.clone()], cancel)
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(numbers(&results[0]), vec!["89161234567"]);
    assert_eq!(results[1].url, stuck);
    assert_eq!(results[1].error(), Some(&ScanError::Cancelled));
}

#[tokio::test]
async fn empty_input_yields_empty_result_set() {
    let urls: Vec<String> = Vec::new();
    let results = scanner(Duration::from_secs(1)).run(&urls).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn convenience_run_uses_a_scoped_client() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let url = page(&server, "/", html("7 (495) 123-45-67")).await;

    let results = ringscan_scan::run(&[url.as_str()]).await.unwrap();

    assert_eq!(results.len(), 1);
    match &results[0].outcome {
        PageOutcome::Phones { phones, rejected } => {
            assert_eq!(phones.len(), 1);
            assert!(rejected.is_empty());
        }
        PageOutcome::Failed { error } => panic!("unexpected failure: {error}"),
    }
}

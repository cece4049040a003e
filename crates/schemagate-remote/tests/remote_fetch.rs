//! Contract tests for remote sourcing against a wiremock server.

use schemagate_core::{GateError, SchemaRecord};
use schemagate_remote::{check_links, FetchConfig, FetchError, LinkProblem, RemoteFetcher};
use schemagate_scan::ScanVisitor;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Collect {
    seen: Vec<(String, String)>,
    done: bool,
    reject: Option<String>,
}

impl ScanVisitor for Collect {
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        self.seen.push((record.file_name.clone(), record.location.clone()));
        if self.reject.as_deref() == Some(record.file_name.as_str()) {
            return Err(GateError::MissingSchemaKeyword(record.location.clone()));
        }
        Ok(())
    }

    fn schema_done(&mut self) -> Result<(), GateError> {
        self.done = true;
        Ok(())
    }
}

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn fetcher() -> RemoteFetcher {
    RemoteFetcher::new(&FetchConfig { timeout_secs: 5 }).unwrap()
}

#[tokio::test]
async fn fetch_names_record_after_last_segment() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/schemas/tool.json",
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"type": "object"})),
    )
    .await;

    let url = format!("{}/schemas/tool.json", server.uri());
    let record = fetcher().fetch(&url).await.unwrap();
    assert_eq!(record.file_name, "tool.json");
    assert_eq!(record.name, "tool");
    assert_eq!(record.location, url);
}

#[tokio::test]
async fn non_success_status_is_fetch_error() {
    let server = MockServer::start().await;
    serve(&server, "/gone.json", ResponseTemplate::new(404)).await;

    let url = format!("{}/gone.json", server.uri());
    match fetcher().fetch(&url).await.unwrap_err() {
        FetchError::Status { status, .. } => assert_eq!(status, 404),
        other => panic!("unexpected {other}"),
    }
}

#[tokio::test]
async fn invalid_url_is_fetch_error() {
    assert!(matches!(
        fetcher().fetch("not a url").await.unwrap_err(),
        FetchError::InvalidUrl { .. }
    ));
}

#[tokio::test]
async fn fetch_each_skips_failures_and_keeps_going() {
    let server = MockServer::start().await;
    serve(&server, "/a.json", ResponseTemplate::new(200).set_body_string("{}")).await;
    serve(&server, "/b.json", ResponseTemplate::new(500)).await;
    serve(&server, "/c.json", ResponseTemplate::new(200).set_body_string("{}")).await;

    let urls: Vec<String> = ["a", "b", "c"]
        .iter()
        .map(|n| format!("{}/{n}.json", server.uri()))
        .collect();
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();

    let mut visitor = Collect {
        reject: Some("c.json".into()),
        ..Collect::default()
    };
    let summary = fetcher().fetch_each(&refs, &mut visitor).await;

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.rejected, 1);
    let names: Vec<&str> = visitor.seen.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["a.json", "c.json"]);
    assert!(visitor.done);
}

#[tokio::test]
async fn link_check_reports_each_problem() {
    let server = MockServer::start().await;
    serve(&server, "/ok.json", ResponseTemplate::new(200).set_body_string(r#"{"a": 1}"#)).await;
    let mut with_bom = vec![0xEF, 0xBB, 0xBF];
    with_bom.extend_from_slice(b"{}");
    serve(&server, "/bom.json", ResponseTemplate::new(200).set_body_bytes(with_bom)).await;
    serve(&server, "/broken.json", ResponseTemplate::new(200).set_body_string("{oops")).await;
    serve(&server, "/missing.json", ResponseTemplate::new(404)).await;

    let urls: Vec<String> = ["ok", "bom", "broken", "missing"]
        .iter()
        .map(|n| format!("{}/{n}.json", server.uri()))
        .collect();
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();

    let report = check_links(&fetcher(), &refs).await;
    assert_eq!(report.checked, 4);
    assert!(!report.is_clean());
    let problems: Vec<&LinkProblem> = report.problems.iter().map(|(_, p)| p).collect();
    assert_eq!(problems.len(), 3);
    assert_eq!(problems[0], &LinkProblem::ByteOrderMark);
    assert!(matches!(problems[1], LinkProblem::InvalidJson(_)));
    assert!(matches!(problems[2], LinkProblem::Unreachable(_)));
}

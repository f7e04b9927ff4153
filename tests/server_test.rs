// Integration tests for the HTTP API.
//
// The router is built around a scripted provider and driven with
// tower::ServiceExt::oneshot(), so no socket or model is involved.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // provides .oneshot()

use common::{sample_requirements, sample_test_cases, ScriptedProvider};
use testgen::config::RefinementConfig;
use testgen::providers::{Critique, UnconfiguredProvider};
use testgen::refinement::RefinementController;
use testgen::server::{create_router, AppState};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "testgen-boundary";

fn router_with(provider: Arc<ScriptedProvider>) -> Router {
    let controller = RefinementController::new(provider, &RefinementConfig::default());
    create_router(AppState::new(controller))
}

fn router() -> Router {
    router_with(Arc::new(ScriptedProvider::new()))
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        filename: &'a str,
        content_type: &'a str,
        content: &'a [u8],
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                filename,
                content_type,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn post_multipart(app: Router, path: &str, parts: &[Part<'_>]) -> axum::response::Response {
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .expect("failed to build request");
    app.oneshot(req).await.expect("oneshot failed")
}

async fn post_json(app: Router, path: &str, body: Value) -> axum::response::Response {
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .expect("failed to build request");
    app.oneshot(req).await.expect("oneshot failed")
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 4 * 1024 * 1024)
        .await
        .expect("failed to read body")
        .to_vec()
}

/// Read an Axum response body as a parsed serde_json::Value.
async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("response body is not valid JSON")
}

fn generate_body() -> Value {
    json!({
        "requirements": sample_requirements(),
        "template": {"name": "Standard", "format": "table", "fields": ["title", "steps"]},
    })
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"status": "ok"}));
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_parse_markdown_upload() {
    let content = "# Login\n- Users log in\n- Users reset passwords\n";
    let resp = post_multipart(
        router(),
        "/requirements/parse",
        &[Part::File {
            filename: "login.md",
            content_type: "text/markdown",
            content: content.as_bytes(),
        }],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["source_name"], "login.md");
    assert_eq!(json["raw_text"], content);
    assert_eq!(json["version"], 1);
    assert_eq!(json["requirements"][0]["id"], "REQ-1");
    assert_eq!(json["requirements"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_parse_rejects_unsupported_upload() {
    let provider = Arc::new(ScriptedProvider::new());
    let resp = post_multipart(
        router_with(provider.clone()),
        "/requirements/parse",
        &[Part::File {
            filename: "scan.pdf",
            content_type: "application/pdf",
            content: b"%PDF-1.4",
        }],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "unsupported_file");
    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn test_parse_corrupt_docx_is_unprocessable() {
    let resp = post_multipart(
        router(),
        "/requirements/parse",
        &[Part::File {
            filename: "requirements.docx",
            content_type: "application/octet-stream",
            content: b"definitely not a zip archive",
        }],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["error"], "unreadable_document");
}

#[tokio::test]
async fn test_parse_without_file_or_feedback() {
    let resp = post_multipart(router(), "/requirements/parse", &[]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "invalid_input");
}

#[tokio::test]
async fn test_refine_requirements_increments_version() {
    let existing = serde_json::to_string(&sample_requirements()).unwrap();
    let resp = post_multipart(
        router(),
        "/requirements/parse",
        &[
            Part::Text("feedback", "Add a requirement for account lockout"),
            Part::Text("existing_requirements", &existing),
            Part::Text("version", "2"),
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["source_name"], "refined");
    assert_eq!(json["raw_text"], "");
    assert_eq!(json["version"], 3);
    assert_eq!(json["requirements"][2]["text"], "Add a requirement for account lockout");
}

#[tokio::test]
async fn test_refine_requirements_with_blank_feedback() {
    let provider = Arc::new(ScriptedProvider::new());
    let existing = serde_json::to_string(&sample_requirements()).unwrap();
    let resp = post_multipart(
        router_with(provider.clone()),
        "/requirements/parse",
        &[
            Part::Text("feedback", "   "),
            Part::Text("existing_requirements", &existing),
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "empty_feedback");
    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn test_enrich_echoes_valid_payload() {
    let body = json!({
        "requirements": sample_requirements(),
        "app_link": "https://app.example.com",
        "diagram_links": ["https://diagrams.example.com/flow.png"],
        "notes": "Mobile first",
    });
    let resp = post_json(router(), "/requirements/enrich", body.clone()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["app_link"], body["app_link"]);
    assert_eq!(json["diagram_links"], body["diagram_links"]);
    assert_eq!(json["requirements"], body["requirements"]);
}

#[tokio::test]
async fn test_enrich_rejects_bad_link() {
    let body = json!({"requirements": [], "prototype_link": "javascript:alert(1)"});
    let resp = post_json(router(), "/requirements/enrich", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test cases
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_generate_reports_validation() {
    let provider = Arc::new(
        ScriptedProvider::new().with_critiques(vec![Critique::reject(["no negative cases"])]),
    );
    let resp = post_json(router_with(provider.clone()), "/testcases/generate", generate_body()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["version"], 1);
    assert_eq!(json["validation"]["status"], "approved");
    assert_eq!(json["validation"]["cycles"], 1);
    assert_eq!(json["validation"]["critiques"], 2);
    assert_eq!(json["validation"]["deficiencies"][0], "no negative cases");
    assert_eq!(json["test_cases"].as_array().unwrap().len(), 3);
    assert_eq!(json["test_cases"][2]["type"], "Negative");
}

#[tokio::test]
async fn test_generate_with_feedback_and_existing_refines() {
    let provider = Arc::new(ScriptedProvider::new());
    let mut body = generate_body();
    body["feedback"] = json!("Cover expired passwords");
    body["existing_test_cases"] = serde_json::to_value(sample_test_cases()).unwrap();
    body["version"] = json!(5);

    let resp = post_json(router_with(provider.clone()), "/testcases/generate", body).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["version"], 6);
    assert_eq!(json["test_cases"][2]["title"], "Cover expired passwords");
    assert_eq!(
        provider.produce_calls.load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_generate_with_feedback_only_generates_fresh() {
    let provider = Arc::new(ScriptedProvider::new());
    let mut body = generate_body();
    body["feedback"] = json!("Focus on security");

    let resp = post_json(router_with(provider.clone()), "/testcases/generate", body).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["version"], 1);
    assert_eq!(
        provider.produce_calls.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn test_refine_test_cases_with_blank_feedback() {
    let provider = Arc::new(ScriptedProvider::new());
    let mut body = generate_body();
    body["feedback"] = json!("");
    body["existing_test_cases"] = serde_json::to_value(sample_test_cases()).unwrap();

    let resp = post_json(router_with(provider.clone()), "/testcases/generate", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "empty_feedback");
    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn test_generate_without_requirements_is_invalid() {
    let mut body = generate_body();
    body["requirements"] = json!([]);
    let resp = post_json(router(), "/testcases/generate", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "invalid_input");
}

#[tokio::test]
async fn test_unconfigured_provider_answers_503() {
    let controller = RefinementController::new(
        Arc::new(UnconfiguredProvider::new("no API key")),
        &RefinementConfig::default(),
    );
    let app = create_router(AppState::new(controller));

    let resp = post_json(app, "/testcases/generate", generate_body()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await["error"], "not_configured");
}

// ---------------------------------------------------------------------------
// Export and integrations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_export_csv_download() {
    let body = json!({"test_cases": sample_test_cases()});
    let resp = post_json(router(), "/export/csv", body).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=test_cases.csv"
    );
    let text = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(text.starts_with("\"ID\",\"Title\""));
    assert!(text.contains("\"TC-2\""));
}

#[tokio::test]
async fn test_export_excel_download() {
    let body = json!({"test_cases": sample_test_cases()});
    let resp = post_json(router(), "/export/excel", body).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=test_cases.xlsx"
    );
    let bytes = body_bytes(resp).await;
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_export_json_then_import() {
    let body = json!({"test_cases": sample_test_cases()});
    let resp = post_json(router(), "/export/json", body).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let exported = body_bytes(resp).await;

    let export: Value = serde_json::from_slice(&exported).unwrap();
    assert_eq!(export["export_format"], "test_cases_v1");
    assert_eq!(export["total_count"], 2);

    let req = Request::builder()
        .method("POST")
        .uri("/import/json")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(exported))
        .unwrap();
    let resp = router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["test_cases"],
        serde_json::to_value(sample_test_cases()).unwrap()
    );
}

#[tokio::test]
async fn test_jira_stub() {
    let body = json!({"project_key": "QA", "issue_type": "Test", "test_cases": sample_test_cases()});
    let resp = post_json(router(), "/export/jira", body).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "not_configured");
    assert!(json["message"].as_str().unwrap().contains("project 'QA'"));
}

#[tokio::test]
async fn test_playwright_stub() {
    let body = json!({"test_cases": sample_test_cases(), "target_base_url": "https://app.example.com"});
    let resp = post_json(router(), "/automation/playwright", body).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "stubbed");
    assert_eq!(json["files"][1], "tests/test_generated_cases.py");
}

#[tokio::test]
async fn test_playwright_rejects_bad_url() {
    let body = json!({"test_cases": [], "target_base_url": "not a url"});
    let resp = post_json(router(), "/automation/playwright", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

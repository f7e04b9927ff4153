// HTTP request handlers

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::error::ApiError;
use super::types::{
    AutomationRequest, EnrichRequest, ExportRequest, GenerateTestCasesRequest,
    GenerateTestCasesResponse, HealthResponse, JiraExportRequest, ParseResponse,
};
use super::AppState;
use crate::artifact::{
    Artifact, ArtifactKind, ArtifactRevision, EnrichmentContext, GenerationContext,
    RequirementItem, TestCase,
};
use crate::documents;
use crate::export::{self, ExportFormat, JiraExportResult, PlaywrightResult};

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

struct UploadedFile {
    name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

#[derive(Default)]
struct ParseForm {
    file: Option<UploadedFile>,
    feedback: Option<String>,
    existing_requirements: Option<String>,
    version: Option<u32>,
}

async fn read_parse_form(mut multipart: Multipart) -> Result<ParseForm, ApiError> {
    let mut form = ParseForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("uploaded").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Could not read upload: {}", e)))?;
                form.file = Some(UploadedFile {
                    name: file_name,
                    content_type,
                    bytes,
                });
            }
            "feedback" | "existing_requirements" | "version" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Could not read field {}: {}", name, e)))?;
                match name.as_str() {
                    "feedback" => form.feedback = Some(text),
                    "existing_requirements" => form.existing_requirements = Some(text),
                    _ => {
                        let version = text
                            .trim()
                            .parse::<u32>()
                            .map_err(|_| ApiError::bad_request(format!("Invalid version: {}", text)))?;
                        form.version = Some(version);
                    }
                }
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }
    Ok(form)
}

/// Extract requirements from an uploaded document, or refine an existing
/// list when `feedback` and `existing_requirements` are both sent.
pub async fn parse_requirements(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ParseResponse>, ApiError> {
    let form = read_parse_form(multipart).await?;

    if let (Some(feedback), Some(existing)) = (&form.feedback, &form.existing_requirements) {
        let items: Vec<RequirementItem> = serde_json::from_str(existing)
            .map_err(|e| ApiError::bad_request(format!("existing_requirements is not a requirement list: {}", e)))?;
        let prior = ArtifactRevision::restored(Artifact::Requirements(items), form.version);
        let outcome = state
            .controller
            .refine(&prior, feedback, &GenerationContext::default())
            .await?;

        return Ok(Json(ParseResponse {
            source_name: "refined".to_string(),
            raw_text: String::new(),
            version: outcome.revision.version,
            requirements: outcome.revision.payload.into_requirements().unwrap_or_default(),
        }));
    }

    let file = form
        .file
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let raw_text = documents::extract_text(&file.name, file.content_type.as_deref(), &file.bytes)?;

    let ctx = GenerationContext::from_document(file.name.clone(), raw_text.clone());
    let outcome = state
        .controller
        .generate(ArtifactKind::Requirements, &ctx)
        .await?;

    Ok(Json(ParseResponse {
        source_name: file.name,
        raw_text,
        version: outcome.revision.version,
        requirements: outcome.revision.payload.into_requirements().unwrap_or_default(),
    }))
}

fn validate_link(field: &str, link: &str) -> Result<(), ApiError> {
    let url = reqwest::Url::parse(link)
        .map_err(|e| ApiError::bad_request(format!("{} is not a valid URL ({}): {}", field, e, link)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ApiError::bad_request(format!(
            "{} must use http or https, got {}",
            field, scheme
        ))),
    }
}

fn validate_enrichment(enrichment: &EnrichmentContext) -> Result<(), ApiError> {
    if let Some(link) = &enrichment.app_link {
        validate_link("app_link", link)?;
    }
    if let Some(link) = &enrichment.prototype_link {
        validate_link("prototype_link", link)?;
    }
    for link in &enrichment.diagram_links {
        validate_link("diagram_links", link)?;
    }
    for link in &enrichment.image_links {
        validate_link("image_links", link)?;
    }
    Ok(())
}

/// Validate enrichment links and echo the payload back
pub async fn enrich_requirements(
    Json(payload): Json<EnrichRequest>,
) -> Result<Json<EnrichRequest>, ApiError> {
    validate_enrichment(&payload.enrichment)?;
    Ok(Json(payload))
}

/// Generate test cases, or refine the client's latest ones.
///
/// `existing_test_cases` plus `feedback` is a refine round; `feedback` alone
/// steers a fresh generation.
pub async fn generate_test_cases(
    State(state): State<AppState>,
    Json(payload): Json<GenerateTestCasesRequest>,
) -> Result<Json<GenerateTestCasesResponse>, ApiError> {
    let GenerateTestCasesRequest {
        mut requirements,
        template,
        context,
        feedback,
        existing_test_cases,
        version,
    } = payload;

    let enrichment = match context {
        Some(context) => {
            validate_enrichment(&context.enrichment)?;
            if requirements.is_empty() {
                requirements = context.requirements;
            }
            Some(context.enrichment).filter(|e| !e.is_empty())
        }
        None => None,
    };

    let mut ctx = GenerationContext::from_requirements(requirements).with_template(template);
    if let Some(enrichment) = enrichment {
        ctx = ctx.with_enrichment(enrichment);
    }

    let outcome = match feedback {
        Some(feedback) if !existing_test_cases.is_empty() => {
            let prior = ArtifactRevision::restored(Artifact::TestCases(existing_test_cases), version);
            state.controller.refine(&prior, &feedback, &ctx).await?
        }
        Some(feedback) => {
            let ctx = ctx.with_guidance(feedback);
            state.controller.generate(ArtifactKind::TestCases, &ctx).await?
        }
        None => state.controller.generate(ArtifactKind::TestCases, &ctx).await?,
    };

    Ok(Json(GenerateTestCasesResponse {
        version: outcome.revision.version,
        validation: outcome.validation,
        test_cases: outcome.revision.payload.into_test_cases().unwrap_or_default(),
    }))
}

fn download(format: ExportFormat, test_cases: &[TestCase]) -> Result<Response, ApiError> {
    let file = export::export(format, test_cases)?;
    let headers = [
        (header::CONTENT_TYPE, file.content_type.to_string()),
        (header::CONTENT_DISPOSITION, file.content_disposition()),
    ];
    Ok((headers, file.bytes).into_response())
}

pub async fn export_csv(Json(payload): Json<ExportRequest>) -> Result<Response, ApiError> {
    download(ExportFormat::Csv, &payload.test_cases)
}

pub async fn export_excel(Json(payload): Json<ExportRequest>) -> Result<Response, ApiError> {
    download(ExportFormat::Excel, &payload.test_cases)
}

pub async fn export_json(Json(payload): Json<ExportRequest>) -> Result<Response, ApiError> {
    download(ExportFormat::Json, &payload.test_cases)
}

/// Read a JSON export back so a client can resume refining it
pub async fn import_json(body: Bytes) -> Result<Json<ExportRequest>, ApiError> {
    let test_cases = export::import_json(&body).map_err(|e| ApiError::bad_request(format!("{:#}", e)))?;
    Ok(Json(ExportRequest { test_cases }))
}

pub async fn export_jira(Json(payload): Json<JiraExportRequest>) -> Json<JiraExportResult> {
    Json(export::jira_stub(
        &payload.project_key,
        &payload.issue_type,
        &payload.test_cases,
    ))
}

pub async fn automation_playwright(
    Json(payload): Json<AutomationRequest>,
) -> Result<Json<PlaywrightResult>, ApiError> {
    if let Some(url) = &payload.target_base_url {
        validate_link("target_base_url", url)?;
    }
    Ok(Json(export::playwright_stub(
        &payload.test_cases,
        payload.target_base_url.as_deref(),
    )))
}

//! Axum route handlers for the Tailoring API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::fit_scoring::FitReport;
use crate::errors::AppError;
use crate::models::resume::{Bullet, ResumeDocument, SectionKind};
use crate::state::AppState;
use crate::tailoring::locator::{locate_sections, section_bullets};
use crate::tailoring::orchestrator::{
    tailor_document, tailor_lines, RewriteRecord, TailorOutcome, TailorStatus,
};
use crate::tailoring::upload::parse_multipart;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TailorTextRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub resume_text: String,
    /// When present, the preview also carries a fit analysis.
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub run_id: Uuid,
    pub status: TailorStatus,
    pub no_bullets_found: bool,
    pub tailored_text: String,
    pub lines: ResumeDocument,
    pub rewrites: Vec<RewriteRecord>,
    pub warnings: Vec<String>,
    /// Fit of the resume as uploaded.
    pub analysis: FitReport,
    /// Keyword fit score of the tailored resume.
    pub tailored_score: u32,
    pub generated_at: DateTime<Utc>,
}

impl TailorResponse {
    async fn build(
        state: &AppState,
        outcome: TailorOutcome,
        job_description: &str,
    ) -> Result<Self, AppError> {
        let analysis = state
            .fit_scorer
            .score(&outcome.original, job_description)
            .await?;
        let tailored_score = state
            .fit_scorer
            .score(&outcome.document, job_description)
            .await?
            .overall_score;

        Ok(Self {
            run_id: outcome.run_id,
            status: outcome.status,
            no_bullets_found: outcome.no_bullets_found(),
            tailored_text: outcome.text(),
            lines: outcome.document,
            rewrites: outcome.rewrites,
            warnings: outcome.warnings,
            analysis,
            tailored_score,
            generated_at: Utc::now(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SectionPreview {
    pub section: SectionKind,
    pub header_index: usize,
    pub start: usize,
    pub end: usize,
    pub bullets: Vec<Bullet>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub sections: Vec<SectionPreview>,
    pub bullet_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FitReport>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tailor
///
/// Multipart upload: `resume` file (pdf, docx or txt), `job_description`, optional `format`.
pub async fn handle_tailor_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TailorResponse>, AppError> {
    let form = parse_multipart(multipart).await?;
    info!(
        "Tailoring upload '{}' ({}, {} bytes)",
        form.resume.filename,
        form.resume.format,
        form.resume.data.len()
    );

    let outcome = tailor_document(
        form.resume.data,
        form.resume.format,
        &form.job_description,
        &state.config.tailor_config(),
        state.rewriter.as_ref(),
    )
    .await?;

    Ok(Json(
        TailorResponse::build(&state, outcome, &form.job_description).await?,
    ))
}

/// POST /api/v1/tailor/text
///
/// Same pipeline for resume text pasted directly.
pub async fn handle_tailor_text(
    State(state): State<AppState>,
    Json(request): Json<TailorTextRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let document = ResumeDocument::from_text(&request.resume_text);
    let outcome = tailor_lines(
        &document,
        &request.job_description,
        &state.config.tailor_config(),
        state.rewriter.as_ref(),
    )
    .await?;

    Ok(Json(
        TailorResponse::build(&state, outcome, &request.job_description).await?,
    ))
}

/// POST /api/v1/tailor/preview
///
/// Shows which lines would be rewritten, without calling the model.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let document = ResumeDocument::from_text(&request.resume_text);
    let lines = document.lines();

    let sections: Vec<SectionPreview> = locate_sections(lines)
        .into_iter()
        .map(|boundary| SectionPreview {
            section: boundary.section,
            header_index: boundary.header_index,
            start: boundary.start,
            end: boundary.end,
            bullets: section_bullets(lines, &boundary),
        })
        .collect();
    let bullet_count = sections.iter().map(|s| s.bullets.len()).sum();

    let analysis = match request.job_description.as_deref() {
        Some(jd) if !jd.trim().is_empty() => Some(state.fit_scorer.score(&document, jd).await?),
        _ => None,
    };

    Ok(Json(PreviewResponse {
        sections,
        bullet_count,
        analysis,
    }))
}

/// POST /api/v1/analyze
///
/// Keyword fit of a resume against a job description: score, matching and missing skills.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<FitReport>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }
    let document = ResumeDocument::from_text(&request.resume_text);
    let report = state
        .fit_scorer
        .score(&document, &request.job_description)
        .await?;
    info!(
        "Fit analysis: score {} ({} matching, {} missing)",
        report.overall_score,
        report.matching_skills.len(),
        report.missing_skills.len()
    );
    Ok(Json(report))
}

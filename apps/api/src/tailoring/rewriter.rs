//! Rewrite Client: one bullet plus the job description in, one rewritten line out.
//!
//! `BulletRewriter` is the seam the orchestrator depends on; `LlmRewriter` is the
//! production implementation. Tests substitute deterministic stubs.

use async_trait::async_trait;

use crate::errors::TailorError;
use crate::llm_client::prompts::{FACTUAL_INSTRUCTION, SINGLE_LINE_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::resume::Bullet;
use crate::tailoring::locator::split_marker;
use crate::tailoring::prompts::{ANSWER_LABEL, REWRITE_PROMPT_TEMPLATE, REWRITE_SYSTEM};

#[async_trait]
pub trait BulletRewriter: Send + Sync {
    /// Returns the full replacement line for `bullet`.
    async fn rewrite(&self, bullet: &Bullet, job_description: &str) -> Result<String, TailorError>;
}

/// Rewrites bullets through the configured language model.
/// The model only sees the bullet's words; the original marker and indentation are re-attached.
pub struct LlmRewriter {
    llm: LlmClient,
}

impl LlmRewriter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl BulletRewriter for LlmRewriter {
    async fn rewrite(&self, bullet: &Bullet, job_description: &str) -> Result<String, TailorError> {
        let prompt = build_rewrite_prompt(&bullet.content, job_description);
        let system = format!("{REWRITE_SYSTEM} {SINGLE_LINE_SYSTEM}");

        let raw = self.llm.generate_text(&prompt, &system).await?;
        let rewritten = clean_response(&raw).ok_or_else(|| {
            TailorError::InvalidInferenceResponse(format!(
                "no usable text for line {}",
                bullet.index + 1
            ))
        })?;

        Ok(format!("{}{}", bullet.marker, rewritten))
    }
}

pub fn build_rewrite_prompt(bullet: &str, job_description: &str) -> String {
    REWRITE_PROMPT_TEMPLATE
        .replace("{factual_instruction}", FACTUAL_INSTRUCTION)
        .replace("{job_description}", job_description.trim())
        .replace("{bullet}", bullet)
}

/// Reduces raw model output to a single bullet line: drops an echoed
/// "Rewritten Bullet Point:" label, keeps the first non-empty line, and strips
/// wrapping quotes or a bullet glyph the model added.
pub fn clean_response(raw: &str) -> Option<String> {
    let line = raw
        .lines()
        .map(|line| strip_label(line.trim()))
        .find(|line| !line.is_empty())?;

    let line = unquote(line);
    let line = split_marker(line).map_or(line, |(_, content)| content);
    let line = line.trim();

    (!line.is_empty()).then(|| line.to_string())
}

fn strip_label(line: &str) -> &str {
    match line.get(..ANSWER_LABEL.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(ANSWER_LABEL) => {
            line[ANSWER_LABEL.len()..].trim_start()
        }
        _ => line,
    }
}

fn unquote(line: &str) -> &str {
    for (open, close) in [('"', '"'), ('\u{201c}', '\u{201d}')] {
        if let Some(inner) = line
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    use crate::llm_client::tests::{settings, spawn_stub};
    use crate::models::resume::SectionKind;

    fn bullet(marker: &str, content: &str) -> Bullet {
        Bullet {
            index: 2,
            section: SectionKind::WorkExperience,
            text: format!("{marker}{content}"),
            marker: marker.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_prompt_carries_bullet_and_job_description() {
        let prompt = build_rewrite_prompt("Built a dashboard", "  Looking for a data engineer\n");
        assert!(prompt.contains("Original Bullet Point:\nBuilt a dashboard"));
        assert!(prompt.contains("Job Description:\nLooking for a data engineer\n"));
        assert!(prompt.contains(FACTUAL_INSTRUCTION));
        assert!(!prompt.contains("{bullet}"));
    }

    #[test]
    fn test_clean_response_strips_label_and_extra_lines() {
        let raw = "Rewritten Bullet Point: Built a data-pipeline dashboard\n\nThis emphasizes ETL.";
        assert_eq!(
            clean_response(raw).as_deref(),
            Some("Built a data-pipeline dashboard")
        );
    }

    #[test]
    fn test_clean_response_label_on_its_own_line() {
        let raw = "REWRITTEN BULLET POINT:\n  \"Designed SQL models for analytics\"  ";
        assert_eq!(
            clean_response(raw).as_deref(),
            Some("Designed SQL models for analytics")
        );
    }

    #[test]
    fn test_clean_response_drops_model_added_marker() {
        assert_eq!(
            clean_response("• Led a team of 4 data engineers").as_deref(),
            Some("Led a team of 4 data engineers")
        );
        assert_eq!(
            clean_response("-5% error rate in ETL jobs").as_deref(),
            Some("-5% error rate in ETL jobs")
        );
    }

    #[test]
    fn test_clean_response_empty_is_none() {
        assert_eq!(clean_response("  \n Rewritten Bullet Point:  \n"), None);
        assert_eq!(clean_response("\"\""), None);
    }

    #[tokio::test]
    async fn test_llm_rewriter_reattaches_marker() {
        let seen_prompt = Arc::new(Mutex::new(String::new()));
        let captured = seen_prompt.clone();
        let router = Router::new().route(
            "/api/generate",
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = body["prompt"].as_str().unwrap_or_default().into();
                    Json(json!({
                        "model": "llama3.2:3b",
                        "response": "Rewritten Bullet Point: Built a real-time data dashboard"
                    }))
                }
            }),
        );
        let base = spawn_stub(router).await;
        let llm = LlmClient::new(settings(base, Duration::from_secs(5))).unwrap();
        let rewriter = LlmRewriter::new(llm);

        let rewritten = rewriter
            .rewrite(&bullet("  - ", "Built a dashboard"), "Looking for a data engineer")
            .await
            .unwrap();

        assert_eq!(rewritten, "  - Built a real-time data dashboard");
        let prompt = seen_prompt.lock().unwrap().clone();
        assert!(prompt.contains("Original Bullet Point:\nBuilt a dashboard\n"));
        assert!(!prompt.contains("  - Built"));
    }

    #[tokio::test]
    async fn test_llm_rewriter_unreachable_endpoint() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let llm = LlmClient::new(settings(format!("http://{addr}"), Duration::from_secs(5))).unwrap();
        let err = LlmRewriter::new(llm)
            .rewrite(&bullet("- ", "Built a dashboard"), "Data engineer")
            .await
            .unwrap_err();

        assert!(matches!(err, TailorError::InferenceUnavailable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_llm_rewriter_blank_answer_is_invalid_response() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({"model": "m", "response": "Rewritten Bullet Point:"})) }),
        );
        let base = spawn_stub(router).await;
        let llm = LlmClient::new(settings(base, Duration::from_secs(5))).unwrap();

        let err = LlmRewriter::new(llm)
            .rewrite(&bullet("- ", "Built a dashboard"), "Data engineer")
            .await
            .unwrap_err();

        assert!(matches!(err, TailorError::InvalidInferenceResponse(_)));
    }
}

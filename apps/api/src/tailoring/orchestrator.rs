//! Tailoring Orchestrator: load → locate → rewrite each bullet → substitute.
//!
//! The output document always has the input's length; only bullet positions of
//! the two target sections are overwritten. Rewrites may run concurrently
//! (`max_concurrent_rewrites`), but results are assembled in position order.
//! Dropping the returned future abandons the run with no partial output.

use std::pin::pin;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::keywords::{extract_keywords, keywords_added, KEYWORD_LIMIT};
use crate::document::{load_document, DocumentFormat};
use crate::errors::TailorError;
use crate::models::resume::{Bullet, ResumeDocument, SectionKind};
use crate::tailoring::locator::locate_bullets;
use crate::tailoring::rewriter::BulletRewriter;

pub const NO_BULLETS_WARNING: &str =
    "No bullets found under Work Experience or Projects; the resume was returned unchanged.";

/// What to do when a single bullet cannot be rewritten. Fixed for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteFailurePolicy {
    /// Surface the first failure; no output is produced.
    Abort,
    /// Keep the bullet's original text, record a warning and continue.
    #[default]
    KeepOriginal,
}

impl FromStr for RewriteFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "abort" => Ok(RewriteFailurePolicy::Abort),
            "keep_original" | "fallback" => Ok(RewriteFailurePolicy::KeepOriginal),
            other => Err(format!(
                "unknown rewrite failure policy '{other}' (expected 'abort' or 'keep_original')"
            )),
        }
    }
}

/// Explicit run configuration handed in by the caller.
#[derive(Debug, Clone)]
pub struct TailorConfig {
    pub failure_policy: RewriteFailurePolicy,
    /// Upper bound on a single rewrite attempt.
    pub inference_timeout: Duration,
    /// Extra attempts after an unavailable/timed-out rewrite.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_backoff: Duration,
    pub max_concurrent_rewrites: usize,
}

impl Default for TailorConfig {
    fn default() -> Self {
        Self {
            failure_policy: RewriteFailurePolicy::KeepOriginal,
            inference_timeout: Duration::from_secs(120),
            max_retries: 0,
            retry_backoff: Duration::from_millis(1000),
            max_concurrent_rewrites: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TailorStatus {
    Tailored,
    NoBulletsFound,
}

/// One bullet's before/after, for display to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteRecord {
    pub index: usize,
    pub section: SectionKind,
    pub original: String,
    pub rewritten: String,
    /// True when the rewrite failed and the original line was kept.
    pub kept_original: bool,
    /// Job-description keywords the rewrite introduced.
    pub keywords_added: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TailorOutcome {
    pub run_id: Uuid,
    pub status: TailorStatus,
    pub document: ResumeDocument,
    /// The document as loaded, before any rewrite.
    #[serde(skip)]
    pub original: ResumeDocument,
    pub rewrites: Vec<RewriteRecord>,
    pub warnings: Vec<String>,
}

impl TailorOutcome {
    pub fn no_bullets_found(&self) -> bool {
        self.status == TailorStatus::NoBulletsFound
    }

    pub fn text(&self) -> String {
        self.document.to_text()
    }
}

/// Full pipeline from uploaded bytes. Extraction runs on the blocking pool.
pub async fn tailor_document(
    bytes: Bytes,
    format: DocumentFormat,
    job_description: &str,
    config: &TailorConfig,
    rewriter: &dyn BulletRewriter,
) -> Result<TailorOutcome, TailorError> {
    validate_job_description(job_description)?;

    let document = tokio::task::spawn_blocking(move || load_document(&bytes, format))
        .await
        .map_err(|e| TailorError::Extraction(format!("{format} loader aborted: {e}")))??;

    tailor_lines(&document, job_description, config, rewriter).await
}

/// Rewrites the target-section bullets of an already loaded document.
pub async fn tailor_lines(
    document: &ResumeDocument,
    job_description: &str,
    config: &TailorConfig,
    rewriter: &dyn BulletRewriter,
) -> Result<TailorOutcome, TailorError> {
    validate_job_description(job_description)?;

    let run_id = Uuid::new_v4();
    let bullets = locate_bullets(document.lines());

    if bullets.is_empty() {
        info!("Run {run_id}: {NO_BULLETS_WARNING}");
        return Ok(TailorOutcome {
            run_id,
            status: TailorStatus::NoBulletsFound,
            document: document.clone(),
            original: document.clone(),
            rewrites: Vec::new(),
            warnings: vec![NO_BULLETS_WARNING.to_string()],
        });
    }

    info!(
        "Run {run_id}: rewriting {} bullets across {} lines (policy={:?}, concurrency={})",
        bullets.len(),
        document.len(),
        config.failure_policy,
        config.max_concurrent_rewrites.max(1)
    );

    let keywords = extract_keywords(job_description, KEYWORD_LIMIT);
    let calls: Vec<_> = bullets
        .iter()
        .map(|bullet| async move {
            let result = rewrite_with_retry(rewriter, bullet, job_description, config).await;
            (bullet, result)
        })
        .collect();
    let mut results =
        pin!(stream::iter(calls).buffered(config.max_concurrent_rewrites.max(1)));

    let mut rewrites = Vec::with_capacity(bullets.len());
    let mut warnings = Vec::new();

    while let Some((bullet, result)) = results.next().await {
        match result {
            Ok(rewritten) => rewrites.push(RewriteRecord {
                index: bullet.index,
                section: bullet.section,
                original: bullet.text.clone(),
                keywords_added: keywords_added(&keywords, &bullet.text, &rewritten),
                rewritten,
                kept_original: false,
            }),
            Err(err) => match config.failure_policy {
                RewriteFailurePolicy::Abort => {
                    warn!(
                        "Run {run_id}: rewrite of line {} failed, aborting: {err}",
                        bullet.index + 1
                    );
                    return Err(err);
                }
                RewriteFailurePolicy::KeepOriginal => {
                    warn!(
                        "Run {run_id}: rewrite of line {} failed, keeping original text: {err}",
                        bullet.index + 1
                    );
                    warnings.push(format!(
                        "Line {} kept its original text: {err}",
                        bullet.index + 1
                    ));
                    rewrites.push(RewriteRecord {
                        index: bullet.index,
                        section: bullet.section,
                        original: bullet.text.clone(),
                        rewritten: bullet.text.clone(),
                        kept_original: true,
                        keywords_added: Vec::new(),
                    });
                }
            },
        }
    }

    let tailored = document.with_replacements(
        rewrites
            .iter()
            .filter(|r| !r.kept_original)
            .map(|r| (r.index, r.rewritten.clone())),
    );

    info!(
        "Run {run_id}: done, {} rewritten, {} kept original",
        rewrites.iter().filter(|r| !r.kept_original).count(),
        warnings.len()
    );

    Ok(TailorOutcome {
        run_id,
        status: TailorStatus::Tailored,
        document: tailored,
        original: document.clone(),
        rewrites,
        warnings,
    })
}

/// One bullet through the rewriter, bounded by `inference_timeout` per attempt.
/// Only unavailable/timed-out attempts are retried, with exponential backoff.
async fn rewrite_with_retry(
    rewriter: &dyn BulletRewriter,
    bullet: &Bullet,
    job_description: &str,
    config: &TailorConfig,
) -> Result<String, TailorError> {
    let mut attempt: u32 = 0;
    loop {
        let result = tokio::time::timeout(
            config.inference_timeout,
            rewriter.rewrite(bullet, job_description),
        )
        .await
        .unwrap_or(Err(TailorError::InferenceTimeout(config.inference_timeout)));

        match result {
            Err(err) if err.is_transient() && attempt < config.max_retries => {
                let delay = config
                    .retry_backoff
                    .saturating_mul(2u32.saturating_pow(attempt));
                warn!(
                    "Rewrite of line {} attempt {} failed ({err}), retrying after {}ms",
                    bullet.index + 1,
                    attempt + 1,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn validate_job_description(job_description: &str) -> Result<(), TailorError> {
    if job_description.trim().is_empty() {
        return Err(TailorError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

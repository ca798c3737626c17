//! Fit Scoring: how well a resume covers a job description.
//!
//! `KeywordFitScorer` is the default backend: deterministic and model-free.
//! `AppState` holds an `Arc<dyn FitScorer>` so another backend can be swapped in at startup.

use async_trait::async_trait;
use serde::Serialize;

use crate::analysis::keywords::{extract_keywords, term_set, KeywordEntry, KEYWORD_LIMIT};
use crate::errors::TailorError;
use crate::models::resume::ResumeDocument;

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

/// A job-description keyword found in the resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitMatch {
    pub keyword: String,
    /// 1.0 for a whole-term match, 0.6 when it only appears inside a longer word.
    pub strength: f32,
    /// First resume line mentioning the keyword.
    pub evidence: String,
}

/// A job-description keyword the resume does not mention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gap {
    pub keyword: String,
    pub jd_frequency: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub overall_score: u32, // 0 – 100
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strong_matches: Vec<FitMatch>,
    pub partial_matches: Vec<FitMatch>,
    pub gaps: Vec<Gap>,
    pub recommendations: Vec<String>,
    pub scorer_backend: String,
}

#[async_trait]
pub trait FitScorer: Send + Sync {
    async fn score(
        &self,
        resume: &ResumeDocument,
        job_description: &str,
    ) -> Result<FitReport, TailorError>;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordFitScorer
// ────────────────────────────────────────────────────────────────────────────

/// Weighted keyword coverage.
///
/// 1. Take the top job-description keywords (`extract_keywords`).
/// 2. Whole-term match in the resume → 1.0, substring match → 0.6, else 0.0.
/// 3. overall_score = Σ(strength × weighted_score) / Σ(weighted_score) × 100
pub struct KeywordFitScorer;

#[async_trait]
impl FitScorer for KeywordFitScorer {
    async fn score(
        &self,
        resume: &ResumeDocument,
        job_description: &str,
    ) -> Result<FitReport, TailorError> {
        if job_description.trim().is_empty() {
            return Err(TailorError::Validation(
                "job_description cannot be empty".to_string(),
            ));
        }
        let keywords = extract_keywords(job_description, KEYWORD_LIMIT);
        Ok(compute_keyword_fit(resume, &keywords))
    }
}

fn compute_keyword_fit(resume: &ResumeDocument, keywords: &[KeywordEntry]) -> FitReport {
    if keywords.is_empty() {
        return FitReport {
            overall_score: 0,
            matching_skills: vec![],
            missing_skills: vec![],
            strong_matches: vec![],
            partial_matches: vec![],
            gaps: vec![],
            recommendations: vec![
                "No keywords found in the job description; cannot score fit.".to_string(),
            ],
            scorer_backend: "keyword".to_string(),
        };
    }

    let line_terms: Vec<_> = resume.lines().iter().map(|l| term_set(l)).collect();
    let lowered: Vec<String> = resume.lines().iter().map(|l| l.to_lowercase()).collect();

    let mut strong_matches = Vec::new();
    let mut partial_matches = Vec::new();
    let mut gaps = Vec::new();
    let mut total_weighted = 0.0_f32;
    let mut total_score = 0.0_f32;

    for entry in keywords {
        total_weighted += entry.weighted_score;

        let whole = line_terms.iter().position(|terms| terms.contains(&entry.keyword));
        let partial = || lowered.iter().position(|l| l.contains(&entry.keyword));
        let (strength, line) = match whole {
            Some(line) => (1.0, Some(line)),
            None => match partial() {
                Some(line) => (0.6, Some(line)),
                None => (0.0, None),
            },
        };

        total_score += strength * entry.weighted_score;

        match line {
            Some(line) => {
                let fit_match = FitMatch {
                    keyword: entry.keyword.clone(),
                    strength,
                    evidence: resume.lines()[line].trim().to_string(),
                };
                if strength >= 0.8 {
                    strong_matches.push(fit_match);
                } else {
                    partial_matches.push(fit_match);
                }
            }
            None => gaps.push(Gap {
                keyword: entry.keyword.clone(),
                jd_frequency: entry.frequency,
            }),
        }
    }

    let overall_score = if total_weighted > 0.0 {
        ((total_score / total_weighted) * 100.0).round().clamp(0.0, 100.0) as u32
    } else {
        0
    };

    let matching_skills = strong_matches
        .iter()
        .chain(&partial_matches)
        .map(|m| m.keyword.clone())
        .collect();
    let missing_skills = gaps.iter().map(|g| g.keyword.clone()).collect();
    let recommendations = build_recommendations(overall_score, &gaps, &partial_matches);

    FitReport {
        overall_score,
        matching_skills,
        missing_skills,
        strong_matches,
        partial_matches,
        gaps,
        recommendations,
        scorer_backend: "keyword".to_string(),
    }
}

fn build_recommendations(score: u32, gaps: &[Gap], partial: &[FitMatch]) -> Vec<String> {
    let top_gaps: Vec<&str> = gaps.iter().take(3).map(|g| g.keyword.as_str()).collect();
    let mut recommendations = Vec::new();

    if score >= 80 {
        recommendations.push(
            "Strong fit. The resume already covers the key job requirements.".to_string(),
        );
    } else if score >= 60 {
        recommendations.push(format!("Moderate fit ({score}/100)."));
    } else {
        recommendations.push(format!(
            "Low fit ({score}/100). Consider whether this role matches your experience."
        ));
    }

    if !top_gaps.is_empty() {
        recommendations.push(format!(
            "Mention {} where your experience genuinely supports it.",
            top_gaps.join(", ")
        ));
    }
    if let Some(m) = partial.first() {
        recommendations.push(format!(
            "Use the job description's exact term '{}' instead of a variant.",
            m.keyword
        ));
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume(raw: &str) -> ResumeDocument {
        ResumeDocument::from_text(raw)
    }

    #[tokio::test]
    async fn test_full_coverage_scores_strong() {
        let report = KeywordFitScorer
            .score(
                &resume("Work Experience\n- Built Kafka and Spark pipelines"),
                "Kafka, Spark",
            )
            .await
            .unwrap();

        assert_eq!(report.overall_score, 100);
        assert_eq!(report.matching_skills, vec!["kafka", "spark"]);
        assert!(report.missing_skills.is_empty());
        assert_eq!(report.strong_matches[0].evidence, "- Built Kafka and Spark pipelines");
        assert!(report.recommendations[0].starts_with("Strong fit"));
    }

    #[tokio::test]
    async fn test_missing_keywords_become_gaps() {
        let report = KeywordFitScorer
            .score(&resume("Projects\n- Python scripts"), "Rust Rust Python")
            .await
            .unwrap();

        assert_eq!(report.missing_skills, vec!["rust"]);
        assert_eq!(report.gaps[0].jd_frequency, 2);
        assert!(report.overall_score < 60, "got {}", report.overall_score);
        assert!(report.recommendations.iter().any(|r| r.contains("rust")));
    }

    #[test]
    fn test_substring_match_is_partial() {
        let keywords = extract_keywords("Postgres", 10);
        let report = compute_keyword_fit(&resume("- Tuned PostgreSQL queries"), &keywords);

        assert_eq!(report.partial_matches.len(), 1);
        assert_eq!(report.partial_matches[0].strength, 0.6);
        assert_eq!(report.overall_score, 60);
        assert_eq!(report.matching_skills, vec!["postgres"]);
    }

    #[test]
    fn test_no_keywords_scores_zero() {
        let report = compute_keyword_fit(&resume("- Anything"), &[]);
        assert_eq!(report.overall_score, 0);
        assert!(report.gaps.is_empty());
        assert_eq!(report.scorer_backend, "keyword");
    }

    #[tokio::test]
    async fn test_blank_job_description_is_rejected() {
        let err = KeywordFitScorer
            .score(&resume("- Anything"), " ")
            .await
            .unwrap_err();
        assert!(matches!(err, TailorError::Validation(_)));
    }

    #[test]
    fn test_recommendation_bands() {
        assert!(build_recommendations(85, &[], &[])[0].contains("Strong fit"));
        assert!(build_recommendations(65, &[], &[])[0].contains("65/100"));
        let gaps = vec![Gap {
            keyword: "airflow".to_string(),
            jd_frequency: 1,
        }];
        let low = build_recommendations(30, &gaps, &[]);
        assert!(low[0].contains("Low fit (30/100)"));
        assert!(low[1].contains("airflow"));
    }
}

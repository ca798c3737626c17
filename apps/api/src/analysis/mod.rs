// Resume/job-description fit analysis.
// Deterministic keyword scoring; no model calls.

pub mod fit_scoring;
pub mod keywords;

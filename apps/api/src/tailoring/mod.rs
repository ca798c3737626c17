// Resume tailoring: locate Work Experience / Projects bullets and rewrite them
// against a job description, one model call per bullet.
// All model calls go through llm_client via the BulletRewriter seam.

pub mod handlers;
pub mod locator;
pub mod orchestrator;
pub mod prompts;
pub mod rewriter;
pub mod upload;

// All LLM prompt constants for the tailoring module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for bullet rewriting.
pub const REWRITE_SYSTEM: &str = "You are a resume-tailoring assistant. \
    You rewrite a single resume bullet so it speaks the language of a job description.";

/// Bullet rewrite prompt template.
/// Replace: {factual_instruction}, {job_description}, {bullet}
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"Given a job description and one of the applicant's resume bullet points, rewrite the bullet so that it aligns more directly with the job description's language and requirements.

{factual_instruction}

Keep the rewritten bullet roughly the same length as the original and write it as a single line.

Job Description:
{job_description}

Original Bullet Point:
{bullet}

Rewritten Bullet Point (do not add new details):"#;

/// Label some models echo back before the answer; stripped during clean-up.
pub const ANSWER_LABEL: &str = "rewritten bullet point:";

// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

/// System prompt fragment that enforces a single plain-text line of output.
pub const SINGLE_LINE_SYSTEM: &str = "You are a precise writing assistant. \
    Respond with exactly one line of plain text. \
    Do NOT include labels, quotes, bullet markers or markdown. \
    Do NOT include explanations or apologies.";

/// Common instruction appended to every rewrite prompt.
pub const FACTUAL_INSTRUCTION: &str = "\
    CRITICAL: Do NOT invent experience, tools, metrics or responsibilities. \
    Keep every fact, number and scope claim exactly as written. \
    Preserve the level of seniority; only adjust phrasing and keywords.";

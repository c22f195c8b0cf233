// Cross-cutting prompt fragments shared by the model backends.
// Task-specific prompts live in a prompts.rs next to the service that owns
// them (see summarize::prompts).

/// System prompt for chat-style backends. Enforces structured JSON output.
pub const CV_ANALYST_SYSTEM: &str = "You are an expert at analyzing CVs and resumes. \
    Extract key information and return structured JSON.";

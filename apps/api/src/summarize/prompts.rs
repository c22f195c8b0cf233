// All prompt constants for the Summarization module.
// The field names and the JSON-only requirement are part of the external
// contract with the model backend; change them and the coercer breaks.

/// Summarization prompt template.
/// Replace `{cv_text}` and `{current_date}` before sending.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Analyze the following CV/resume text and extract key information.

CV Text:
{cv_text}

Please provide a JSON response with the following structure:
{
    "summary": "A concise 2-3 sentence summary of the candidate's background, experience, and key strengths",
    "skills": ["skill1", "skill2", "skill3"],
    "experience_years": <number>
}

Instructions:
- summary: Write a professional summary highlighting the candidate's experience and expertise
- skills: Extract all technical and professional skills mentioned. Include programming languages, frameworks, tools, methodologies, etc.
- experience_years: Calculate the total years of professional experience:
  * Sum the duration of every professional position across the whole CV
  * Merge overlapping employment periods so that overlapping months are counted once, never twice
  * Treat an end date of "Present" as {current_date}
  * Return the total as a decimal number (e.g. 5.5 for 5 years and 6 months)

Return ONLY valid JSON, no additional text."#;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// The API key for the selected provider is validated when the model
/// backend is constructed, not here, so the other provider's key may be
/// absent.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
    /// Maximum accepted upload size in bytes.
    pub max_file_size: usize,
    /// Lowercased dot-prefixed extensions accepted for upload, e.g. `.pdf`.
    pub allowed_extensions: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            ai_provider: env_or("AI_PROVIDER", "openai"),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            max_file_size: env_or("MAX_FILE_SIZE", "10485760")
                .parse::<usize>()
                .context("MAX_FILE_SIZE must be a byte count")?,
            allowed_extensions: parse_extensions(&env_or("ALLOWED_EXTENSIONS", ".pdf")),
        })
    }

    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|e| e == extension)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses a comma-separated extension list, normalizing case and dropping
/// empty entries. `".pdf"` and `".pdf, .docx"` are both accepted.
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

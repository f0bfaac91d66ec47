use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key (sent as the `api_key` query parameter)
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL poster paths are appended to
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Attempts per catalog call before giving up
    #[serde(default = "default_catalog_max_attempts")]
    pub catalog_max_attempts: u32,

    /// First backoff delay between catalog attempts, doubled each retry
    #[serde(default = "default_catalog_retry_base_ms")]
    pub catalog_retry_base_ms: u64,

    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_timeout_secs: u64,

    /// Google Gemini API key (primary completion provider)
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// OpenAI API key (secondary completion provider)
    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// OpenRouter API key (tertiary completion provider)
    #[serde(default)]
    pub openrouter_api_key: Option<String>,

    #[serde(default = "default_openrouter_model")]
    pub openrouter_model: String,

    #[serde(default = "default_openrouter_api_url")]
    pub openrouter_api_url: String,

    /// Sent as `HTTP-Referer` to OpenRouter
    #[serde(default)]
    pub openrouter_referer: Option<String>,

    /// Sent as `X-Title` to OpenRouter
    #[serde(default)]
    pub openrouter_title: Option<String>,

    /// Per-request timeout for completion providers
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_catalog_max_attempts() -> u32 {
    3
}

fn default_catalog_retry_base_ms() -> u64 {
    1000
}

fn default_catalog_timeout_secs() -> u64 {
    15
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openrouter_model() -> String {
    "deepseek/deepseek-chat".to_string()
}

fn default_openrouter_api_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_completion_timeout_secs() -> u64 {
    60
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.catalog_max_attempts == 0 {
            anyhow::bail!("CATALOG_MAX_ATTEMPTS must be at least 1");
        }

        Ok(config)
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

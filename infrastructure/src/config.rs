use anyhow::Context;
use dotenvy::dotenv;
use shared::types::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// `/v1/embeddings` on the completion server.
    Http,
    /// all-MiniLM-L6-v2 run in-process.
    Local,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" | "server" => Ok(Self::Http),
            "local" | "fastembed" => Ok(Self::Local),
            other => anyhow::bail!("unknown embedding backend '{other}' (expected http or local)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub model: Option<String>,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    pub curriculum_max_tokens: u32,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_model: Option<String>,
    pub embedding_cache_dir: Option<PathBuf>,
    pub retrieval_top_k: usize,
    pub retrieval_chunk_size: usize,
    pub youtube_api_key: Option<String>,
    pub youtube_api_base: String,
    pub youtube_max_results: usize,
    pub transcript_api_base: String,
    pub transcript_lang: String,
    pub personas_file: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:1234".to_string(),
            model: None,
            timeout: Duration::from_secs(60),
            temperature: 0.7,
            max_tokens: 2048,
            curriculum_max_tokens: 4096,
            embedding_backend: EmbeddingBackend::Http,
            embedding_model: None,
            embedding_cache_dir: None,
            retrieval_top_k: 3,
            retrieval_chunk_size: 5,
            youtube_api_key: None,
            youtube_api_base: "https://www.googleapis.com".to_string(),
            youtube_max_results: 5,
            transcript_api_base: "https://www.youtube.com".to_string(),
            transcript_lang: "en".to_string(),
            personas_file: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let config = Self {
            api_base: get("TUTOR_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            model: get("TUTOR_MODEL"),
            timeout: Duration::from_secs(parse_or(&get, "TUTOR_TIMEOUT_SECS", 60u64)?),
            temperature: parse_or(&get, "TUTOR_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(&get, "TUTOR_MAX_TOKENS", defaults.max_tokens)?,
            curriculum_max_tokens: parse_or(
                &get,
                "TUTOR_CURRICULUM_MAX_TOKENS",
                defaults.curriculum_max_tokens,
            )?,
            embedding_backend: parse_or(
                &get,
                "TUTOR_EMBEDDING_BACKEND",
                defaults.embedding_backend,
            )?,
            embedding_model: get("TUTOR_EMBEDDING_MODEL"),
            embedding_cache_dir: get("TUTOR_EMBEDDING_CACHE_DIR").map(PathBuf::from),
            retrieval_top_k: parse_or(&get, "TUTOR_RETRIEVAL_TOP_K", defaults.retrieval_top_k)?,
            retrieval_chunk_size: parse_or(
                &get,
                "TUTOR_RETRIEVAL_CHUNK_SIZE",
                defaults.retrieval_chunk_size,
            )?,
            youtube_api_key: get("YOUTUBE_API_KEY"),
            youtube_api_base: get("YOUTUBE_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.youtube_api_base),
            youtube_max_results: parse_or(
                &get,
                "YOUTUBE_MAX_RESULTS",
                defaults.youtube_max_results,
            )?,
            transcript_api_base: get("TRANSCRIPT_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.transcript_api_base),
            transcript_lang: get("TRANSCRIPT_LANG").unwrap_or(defaults.transcript_lang),
            personas_file: get("TUTOR_PERSONAS_FILE").map(PathBuf::from),
            export_dir: get("TUTOR_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.retrieval_top_k == 0 {
            anyhow::bail!("TUTOR_RETRIEVAL_TOP_K must be at least 1");
        }
        if self.retrieval_chunk_size == 0 {
            anyhow::bail!("TUTOR_RETRIEVAL_CHUNK_SIZE must be at least 1");
        }
        Ok(())
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value '{raw}' for {key}")),
        None => Ok(default),
    }
}

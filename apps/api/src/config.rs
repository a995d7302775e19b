use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 45;
const DEFAULT_ANALYZER_PROGRAM: &str = "python";
const DEFAULT_ANALYZER_SCRIPT: &str = "attached_assets/AI_Powered_Resume_Analyzer.py";

/// Application configuration loaded from environment variables.
/// Every variable has a default; a value that is present but unparseable fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub analyzer_program: String,
    /// Script passed ahead of the document path. `None` runs the program with the path alone.
    pub analyzer_script: Option<String>,
    pub analysis_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let analyzer_script = std::env::var("ANALYZER_SCRIPT")
            .unwrap_or_else(|_| DEFAULT_ANALYZER_SCRIPT.to_string());

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            analyzer_program: std::env::var("ANALYZER_PROGRAM")
                .unwrap_or_else(|_| DEFAULT_ANALYZER_PROGRAM.to_string()),
            analyzer_script: (!analyzer_script.trim().is_empty()).then_some(analyzer_script),
            analysis_timeout: Duration::from_secs(parse_env(
                "ANALYSIS_TIMEOUT_SECS",
                DEFAULT_ANALYSIS_TIMEOUT_SECS,
            )?),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: u16 = parse_env("RESUME_ANALYZER_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("RESUME_ANALYZER_TEST_BAD_TIMEOUT", "forty-five");
        let result: Result<u64> = parse_env("RESUME_ANALYZER_TEST_BAD_TIMEOUT", 45);
        assert!(result.is_err());
        std::env::remove_var("RESUME_ANALYZER_TEST_BAD_TIMEOUT");
    }

    #[test]
    fn test_parse_env_trims_whitespace() {
        std::env::set_var("RESUME_ANALYZER_TEST_MAX_BYTES", " 1024 ");
        let value: usize = parse_env("RESUME_ANALYZER_TEST_MAX_BYTES", 0).unwrap();
        assert_eq!(value, 1024);
        std::env::remove_var("RESUME_ANALYZER_TEST_MAX_BYTES");
    }
}

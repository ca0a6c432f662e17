use anyhow::{Result, bail};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port to bind to
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Base URL of the image classification service
    #[arg(long, env = "CLASSIFIER_URL")]
    pub classifier_url: String,

    /// API key for the Gemini generative service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Gemini model used for the sustainability analysis
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    pub gemini_model: String,

    /// Base URL of the Gemini REST API
    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub gemini_base_url: String,

    /// Timeout in seconds for each outbound HTTP request
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60")]
    pub request_timeout_secs: u64,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "10485760")]
    pub max_upload_bytes: usize,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    /// Presence check only; the values themselves are trusted.
    pub fn validate(&self) -> Result<()> {
        if self.classifier_url.trim().is_empty() {
            bail!("CLASSIFIER_URL must not be empty");
        }
        if self.gemini_api_key.trim().is_empty() {
            bail!("GEMINI_API_KEY must not be empty");
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["ecoscan"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).expect("config should parse")
    }

    #[test]
    fn defaults_apply_when_only_required_values_given() {
        let config = parse(&[
            "--classifier-url",
            "http://localhost:5000",
            "--gemini-api-key",
            "key",
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_api_key_fails_validation() {
        let config = parse(&[
            "--classifier-url",
            "http://localhost:5000",
            "--gemini-api-key",
            "  ",
        ]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}

use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Runtime options, loaded from a JSON file. Every recognized key is declared
/// here with a typed default; unknown keys are rejected so a typo fails the
/// run instead of silently configuring nothing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Seconds to wait between product page scans.
    pub sleep_rate_limit: u64,
    /// HTTP request timeout in seconds.
    pub request_timeout: u64,
    /// User-agent pool; one is picked per run.
    pub user_agents: Vec<String>,
    /// Directory the results workbook is written to.
    pub output_dir: PathBuf,
    /// Sellers whose listings survive the availability filter even when the
    /// page marks them unavailable (substring match on the seller name).
    pub trusted_sellers: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sleep_rate_limit: 5,
            request_timeout: 30,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
            ],
            output_dir: PathBuf::from("results"),
            trusted_sellers: vec!["Amazon".to_string()],
        }
    }
}

/// Loads the config file, falling back to defaults when the file does not
/// exist. Any other read or parse failure is an error.
pub fn load_config(path: &Path) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => return Err(e.into()),
    };
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

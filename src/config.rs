use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File picked up from the working directory when present.
pub const SETTINGS_FILE: &str = "vendor_scraper.toml";
pub const ENV_PREFIX: &str = "VENDOR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no seed URLs given (pass URLs or --file)")]
    NoSeedUrls,

    #[error("invalid regex for {pattern_name} ({pattern}): {error}")]
    InvalidRegex {
        pattern_name: String,
        pattern: String,
        error: String,
    },

    #[error("config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runtime settings: built-in defaults, then `vendor_scraper.toml`, then `VENDOR_*`
/// environment variables. CLI flags are applied on top by the binary.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub export_dir: PathBuf,
    pub db_path: PathBuf,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub request_delay_ms: u64,
    pub max_pages_per_vendor: usize,
    pub concurrency: usize,
    pub use_sitemap: bool,
    pub rules_path: Option<PathBuf>,
}

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_dir: PathBuf::from("vendor_research"),
            export_dir: PathBuf::from("vendor_export"),
            db_path: PathBuf::from("data/vendors.sqlite"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            request_delay_ms: 1000,
            max_pages_per_vendor: 25,
            concurrency: 2,
            use_sitemap: true,
            rules_path: None,
        }
    }
}

impl Settings {
    /// Load from the working directory and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    pub fn load_from(file: &Path) -> Result<Self, ConfigError> {
        let d = Settings::default();
        let settings = config::Config::builder()
            .set_default("output_dir", d.output_dir.to_string_lossy().to_string())?
            .set_default("export_dir", d.export_dir.to_string_lossy().to_string())?
            .set_default("db_path", d.db_path.to_string_lossy().to_string())?
            .set_default("user_agent", d.user_agent)?
            .set_default("request_timeout_secs", d.request_timeout_secs)?
            .set_default("request_delay_ms", d.request_delay_ms)?
            .set_default("max_pages_per_vendor", d.max_pages_per_vendor as u64)?
            .set_default("concurrency", d.concurrency as u64)?
            .set_default("use_sitemap", d.use_sitemap)?
            .add_source(config::File::from(file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
}

/// Seed URLs from a newline-delimited file. Blank lines and `#` comments are ignored.
pub fn read_url_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_url_list(&text))
}

pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(s.request_timeout_secs, 30);
        assert_eq!(s.request_delay_ms, 1000);
        assert_eq!(s.concurrency, 2);
        assert!(s.use_sitemap);
        assert!(s.rules_path.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendor_scraper.toml");
        std::fs::write(
            &path,
            "max_pages_per_vendor = 5\nuse_sitemap = false\nrules_path = \"rules.toml\"\n",
        )
        .unwrap();
        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.max_pages_per_vendor, 5);
        assert!(!s.use_sitemap);
        assert_eq!(s.rules_path, Some(PathBuf::from("rules.toml")));
        assert_eq!(s.request_delay_ms, 1000);
    }

    #[test]
    fn url_list_skips_comments_and_blanks() {
        let urls = parse_url_list("# vendors\nhttps://a.example\n\n  https://b.example  \n#x\n");
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
    }
}

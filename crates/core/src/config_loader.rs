use crate::config::AppConfig;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "config/Config.toml";
const ENV_PREFIX: &str = "NEWSALPHA_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering built-in defaults, `config/Config.toml`
    /// and `NEWSALPHA_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source cannot be parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(None)
    }

    /// Loads configuration with an additional explicit file layered on top of
    /// `config/Config.toml`. Files ending in `.json` are read as JSON, anything
    /// else as TOML. Environment variables still take precedence; nested keys
    /// use a double underscore (`NEWSALPHA_STRATEGY__MIN_DOCS=5`).
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file does not exist or if any source
    /// cannot be parsed into [`AppConfig`].
    pub fn load_from(path: Option<&Path>) -> Result<AppConfig> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(DEFAULT_CONFIG_FILE));

        if let Some(path) = path {
            if !path.exists() {
                bail!("Config not found: {}", path.display());
            }
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
            tracing::debug!("Layered config file {}", path.display());
        }

        let config: AppConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ConfigLoader::load_from(Some(Path::new("does/not/exist.toml")))
            .expect_err("missing file must fail");

        assert!(err.to_string().contains("Config not found"));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(
            file,
            "tickers = [\"aapl.us\"]\n\n[strategy]\nsent_thresh = 0.08\n\n[stats]\nseed = 7"
        )
        .expect("write");

        let config = ConfigLoader::load_from(Some(&path)).expect("load");

        assert_eq!(config.tickers, vec!["aapl.us".to_string()]);
        assert!((config.strategy.sent_thresh - 0.08).abs() < f64::EPSILON);
        assert_eq!(config.strategy.min_docs, 10);
        assert_eq!(config.stats.seed, 7);
        assert_eq!(config.stats.n_bootstrap, 2000);
    }

    #[test]
    fn json_file_is_detected_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("defaults.json");
        std::fs::write(&path, r#"{"sweep": {"min_docs": [1, 2]}}"#).expect("write");

        let config = ConfigLoader::load_from(Some(&path)).expect("load");

        assert_eq!(config.sweep.min_docs, vec![1, 2]);
        assert_eq!(config.sweep.sent_thresh.len(), 4);
    }
}

//! Load — config loading from file and environment.

use std::fs;
use std::path::Path;

use super::model::{AnnotatorConfig, ConfError};

/// Default config path, used when neither the flag nor the environment
/// names one.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/nodetail/annotator.toml";

impl AnnotatorConfig {
    /// Load configuration.
    /// Priority: explicit path (flag) > `ANNOTATOR_CONFIG_FILE` > default
    /// path. An explicitly named file must exist; the fallback paths may be
    /// absent, yielding the (invalid-until-populated) default config.
    pub fn load(explicit_path: Option<&str>) -> Result<Self, ConfError> {
        if let Some(path) = explicit_path {
            tracing::info!("Loading configuration from: {}", path);
            return Self::from_file(path);
        }

        let config_path = std::env::var("ANNOTATOR_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)
        } else {
            tracing::info!(
                "Config file not found at {}, using built-in defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, ConfError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfError::Io {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_config(tag: &str, contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("annotator-conf-{}-{}.toml", tag, std::process::id()));
        let mut file = std::fs::File::create(&path).expect("Should create temp file");
        file.write_all(contents.as_bytes()).expect("Should write");
        path
    }

    #[test]
    fn test_from_file_parses_blocks() {
        let path = write_temp_config(
            "blocks",
            r#"
            [[block]]
            name = "init"
            start = "begin"
            end = "end"
            "#,
        );
        let cfg = AnnotatorConfig::from_file(path.to_str().unwrap()).expect("Should load");
        assert_eq!(cfg.blocks.len(), 1);
        assert_eq!(cfg.blocks[0].name, "init");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = AnnotatorConfig::from_file("/nonexistent/annotator.toml").unwrap_err();
        assert!(matches!(err, ConfError::Io { .. }));
    }

    #[test]
    fn test_from_file_bad_toml_is_parse_error() {
        let path = write_temp_config("bad-toml", "not = [valid");
        let err = AnnotatorConfig::from_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfError::Parse { .. }));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_explicit_path_must_exist() {
        let err = AnnotatorConfig::load(Some("/nonexistent/annotator.toml")).unwrap_err();
        assert!(matches!(err, ConfError::Io { .. }));
    }
}

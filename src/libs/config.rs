use crate::libs::error::{HeatmapError, Result};
use crate::libs::trait_data::{ExportOptions, FieldMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Environment variable naming a JSON config file
pub const CONF_ENV: &str = "GNHM_CONF";

/// Settings shared by all subcommands.
///
/// Layers, later ones win: built-in defaults, the file in `$GNHM_CONF`, the
/// file passed with `--config`, then individual command line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Traits of datasets with `public <= threshold` are treated as unknown
    pub threshold: i32,
    /// Where the traits file for the mapping engine is written
    pub tmpdir: PathBuf,
    pub field_mode: FieldMode,
    pub include_variance: bool,
    pub include_ndata: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 0,
            tmpdir: std::env::temp_dir(),
            field_mode: FieldMode::Value,
            include_variance: false,
            include_ndata: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with `$GNHM_CONF` and then `explicit`, if given.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let env_file = std::env::var(CONF_ENV).ok().filter(|s| !s.is_empty());
        let files: Vec<String> = env_file
            .into_iter()
            .chain(explicit.map(|s| s.to_string()))
            .collect();

        let mut merged = serde_json::to_value(Self::default())?;
        for file in &files {
            log::debug!("Reading config {}", file);
            let text = std::fs::read_to_string(file).map_err(|e| {
                HeatmapError::Collaborator(format!("cannot read config {}: {}", file, e))
            })?;
            let overlay: Value = serde_json::from_str(&text)?;
            merge(&mut merged, overlay);
        }

        Self::from_value(merged)
    }

    /// Build from an already merged JSON object
    pub fn from_value(value: Value) -> Result<Self> {
        // surface a bad mode as such, not as a generic JSON error
        if let Some(mode) = value.get("field_mode").and_then(|m| m.as_str()) {
            mode.parse::<FieldMode>()?;
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::new(self.field_mode, self.include_variance, self.include_ndata)
    }
}

// Shallow, key by key; non-object overlays replace the base.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                base.insert(key, value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.threshold, 0);
        assert_eq!(config.field_mode, FieldMode::Value);
        assert_eq!(config.export_options().width(), 1);
    }

    #[test]
    fn test_partial_overlay() {
        let mut base = serde_json::to_value(PipelineConfig::default()).unwrap();
        merge(&mut base, json!({"field_mode": "all", "include_ndata": true}));
        let config = PipelineConfig::from_value(base).unwrap();

        assert_eq!(config.field_mode, FieldMode::All);
        assert!(config.include_ndata);
        assert!(!config.include_variance);
        assert_eq!(config.export_options().width(), 2);
    }

    #[test]
    fn test_bad_mode() {
        match PipelineConfig::from_value(json!({"field_mode": "value"})) {
            Err(HeatmapError::InvalidFieldMode(mode)) => assert_eq!(mode, "value"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gnhm.json");
        std::fs::write(&path, r#"{"threshold": 1, "tmpdir": "/var/tmp"}"#).unwrap();

        let config = PipelineConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.threshold, 1);
        assert_eq!(config.tmpdir, PathBuf::from("/var/tmp"));
        assert_eq!(config.field_mode, FieldMode::Value);

        assert!(PipelineConfig::load(Some("tests/heatmap/no_such.json")).is_err());
    }
}

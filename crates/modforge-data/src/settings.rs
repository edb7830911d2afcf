//! Conversion settings.

use crate::loader::{DataLoadError, read_file};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_modpack_name() -> String {
    "aoe2_base".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Options for one conversion run. Every field has a default, so an empty
/// or absent settings file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Name of the generated modpack and root of every object path.
    #[serde(default = "default_modpack_name")]
    pub modpack_name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub authors: Vec<String>,
    /// Also export media whose reference count dropped to zero.
    pub export_unreferenced_media: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            modpack_name: default_modpack_name(),
            version: default_version(),
            authors: Vec::new(),
            export_unreferenced_media: false,
        }
    }
}

pub fn load_settings(path: &Path) -> Result<ConversionSettings, DataLoadError> {
    read_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::ScratchDir;

    #[test]
    fn missing_fields_use_defaults() {
        let settings: ConversionSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ConversionSettings::default());
        assert_eq!(settings.modpack_name, "aoe2_base");
    }

    #[test]
    fn load_from_ron() {
        let dir = ScratchDir::new("settings_ron");
        let path = dir.write("settings.ron", r#"(modpack_name: "de2_base", authors: ["openage"])"#);

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.modpack_name, "de2_base");
        assert_eq!(settings.version, "0.1.0");
        assert_eq!(settings.authors, vec!["openage".to_string()]);
    }

    #[test]
    fn load_from_toml() {
        let dir = ScratchDir::new("settings_toml");
        let path = dir.write("settings.toml", "version = \"1.2.0\"\nexport_unreferenced_media = true\n");

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.version, "1.2.0");
        assert!(settings.export_unreferenced_media);
    }
}

// ── Window configuration ──────────────────────────────────────────────────────
//
// Reads and writes `%APPDATA%\dpiscale\window.json`.
// No `unsafe` — pure safe Rust + serde_json.

use std::{fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ── On-disk type ──────────────────────────────────────────────────────────────

const CONFIG_VERSION: u32 = 1;

/// Root of the JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WindowConfig {
    pub(crate) version: u32,
    /// Window width at 96 DPI, in pixels.
    #[serde(default = "default_width")]
    pub(crate) design_width: f64,
    /// Window height at 96 DPI, in pixels.
    #[serde(default = "default_height")]
    pub(crate) design_height: f64,
    #[serde(default = "default_title")]
    pub(crate) title: String,
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    600.0
}

fn default_title() -> String {
    "dpiscale".to_owned()
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            design_width: default_width(),
            design_height: default_height(),
            title: default_title(),
        }
    }
}

impl WindowConfig {
    /// Parse a config file's contents.  Returns `Ok(None)` for a well-formed
    /// file that this version must not use.
    fn parse(data: &[u8]) -> Result<Option<Self>> {
        let cfg: WindowConfig = serde_json::from_slice(data)?;
        if cfg.version != CONFIG_VERSION {
            log::warn!("config version {} is not supported", cfg.version);
            return Ok(None);
        }
        let size_ok = |v: f64| v.is_finite() && v > 0.0;
        if !size_ok(cfg.design_width) || !size_ok(cfg.design_height) {
            log::warn!(
                "config design size {}x{} is not usable",
                cfg.design_width,
                cfg.design_height
            );
            return Ok(None);
        }
        Ok(Some(cfg))
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the path to the config file: `%APPDATA%\dpiscale\window.json`.
///
/// Returns `None` if the `APPDATA` environment variable is not set.
pub(crate) fn config_path() -> Option<PathBuf> {
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("dpiscale");
    p.push("window.json");
    Some(p)
}

// ── Load / save ───────────────────────────────────────────────────────────────

/// Read the config file, falling back to defaults on any problem.
pub(crate) fn load() -> WindowConfig {
    config_path()
        .and_then(|path| load_from(&path))
        .unwrap_or_default()
}

fn load_from(path: &std::path::Path) -> Option<WindowConfig> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("could not read {}: {e}", path.display());
            return None;
        }
    };
    match WindowConfig::parse(&data) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("ignoring {}: {e}", path.display());
            None
        }
    }
}

/// Write `cfg` as pretty-printed JSON, creating the parent directory.
#[allow(dead_code)] // no UI for editing the config yet
pub(crate) fn save(path: &std::path::Path, cfg: &WindowConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, cfg)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_design_size() {
        let cfg = WindowConfig::default();
        assert_eq!(cfg.design_width, 800.0);
        assert_eq!(cfg.design_height, 600.0);
        assert_eq!(cfg.title, "dpiscale");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = WindowConfig::parse(br#"{"version":1,"design_width":1024}"#)
            .expect("parse")
            .expect("usable");
        assert_eq!(cfg.design_width, 1024.0);
        assert_eq!(cfg.design_height, 600.0);
        assert_eq!(cfg.title, "dpiscale");
    }

    #[test]
    fn wrong_version_is_rejected() {
        let cfg = WindowConfig::parse(br#"{"version":99}"#).expect("parse");
        assert_eq!(cfg, None);
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let zero = WindowConfig::parse(br#"{"version":1,"design_width":0}"#).expect("parse");
        assert_eq!(zero, None);
        let neg = WindowConfig::parse(br#"{"version":1,"design_height":-5}"#).expect("parse");
        assert_eq!(neg, None);
    }

    #[test]
    fn garbage_is_a_config_error() {
        assert!(matches!(
            WindowConfig::parse(b"not json"),
            Err(crate::error::ScaleError::Config(_))
        ));
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("dpiscale-test-{}", std::process::id()));
        let path = dir.join("window.json");
        let cfg = WindowConfig {
            title: "Scaled".to_owned(),
            design_width: 640.0,
            ..WindowConfig::default()
        };
        save(&path, &cfg).expect("save");
        assert_eq!(load_from(&path), Some(cfg));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_loads_nothing() {
        let path = std::env::temp_dir().join("dpiscale-does-not-exist").join("window.json");
        assert_eq!(load_from(&path), None);
    }
}

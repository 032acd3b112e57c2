//! Configuration Vault – reads/writes `~/.wayfind/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use wayfind_perception::{FeatureQuery, SnapOptions};
use wayfind_runtime::LocatorConfig;
use wayfind_types::{CameraIntrinsics, Viewport};

/// Persisted localization tuning stored in `~/.wayfind/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Placed objects are clamped to this distance from the camera (metres).
    #[serde(default = "default_max_placement_distance")]
    pub max_placement_distance: f32,

    /// Far clipping distance used for unprojection (metres).
    #[serde(default = "default_far_clip")]
    pub far_clip: f32,

    /// Vertical field of view of the camera (degrees).
    #[serde(default = "default_vertical_fov_deg")]
    pub vertical_fov_deg: f32,

    #[serde(default = "default_feature_cone_angle_deg")]
    pub feature_cone_angle_deg: f32,

    #[serde(default = "default_feature_min_distance")]
    pub feature_min_distance: f32,

    #[serde(default = "default_feature_max_distance")]
    pub feature_max_distance: f32,

    #[serde(default = "default_feature_max_results")]
    pub feature_max_results: usize,

    #[serde(default = "default_snap_tolerance_fraction")]
    pub snap_tolerance_fraction: f32,

    #[serde(default = "default_snap_vertical_allowance")]
    pub snap_vertical_allowance: f32,

    #[serde(default = "default_snap_epsilon")]
    pub snap_epsilon: f32,

    /// Snap animation length per metre of vertical travel.
    #[serde(default = "default_snap_seconds_per_metre")]
    pub snap_seconds_per_metre: f32,

    /// Size of the marker drawn at a placed object (metres).
    #[serde(default = "default_object_scale")]
    pub object_scale: f32,
}

fn default_max_placement_distance() -> f32 {
    5.0
}
fn default_far_clip() -> f32 {
    100.0
}
fn default_vertical_fov_deg() -> f32 {
    60.0
}
fn default_feature_cone_angle_deg() -> f32 {
    10.0
}
fn default_feature_min_distance() -> f32 {
    0.1
}
fn default_feature_max_distance() -> f32 {
    5.0
}
fn default_feature_max_results() -> usize {
    10
}
fn default_snap_tolerance_fraction() -> f32 {
    0.1
}
fn default_snap_vertical_allowance() -> f32 {
    0.05
}
fn default_snap_epsilon() -> f32 {
    0.001
}
fn default_snap_seconds_per_metre() -> f32 {
    10.0
}
fn default_object_scale() -> f32 {
    0.1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_placement_distance: default_max_placement_distance(),
            far_clip: default_far_clip(),
            vertical_fov_deg: default_vertical_fov_deg(),
            feature_cone_angle_deg: default_feature_cone_angle_deg(),
            feature_min_distance: default_feature_min_distance(),
            feature_max_distance: default_feature_max_distance(),
            feature_max_results: default_feature_max_results(),
            snap_tolerance_fraction: default_snap_tolerance_fraction(),
            snap_vertical_allowance: default_snap_vertical_allowance(),
            snap_epsilon: default_snap_epsilon(),
            snap_seconds_per_metre: default_snap_seconds_per_metre(),
            object_scale: default_object_scale(),
        }
    }
}

impl Config {
    /// Locator tuning derived from this config.
    pub fn locator_config(&self) -> LocatorConfig {
        LocatorConfig {
            max_placement_distance: self.max_placement_distance,
            feature_query: FeatureQuery {
                cone_angle_deg: self.feature_cone_angle_deg,
                min_distance: self.feature_min_distance,
                max_distance: self.feature_max_distance,
                max_results: self.feature_max_results,
            },
            snap: SnapOptions {
                tolerance_fraction: self.snap_tolerance_fraction,
                vertical_allowance: self.snap_vertical_allowance,
                epsilon: self.snap_epsilon,
            },
            snap_seconds_per_metre: self.snap_seconds_per_metre,
            object_scale: self.object_scale,
        }
    }

    /// Camera intrinsics for `viewport` using the configured field of view.
    pub fn intrinsics(&self, viewport: &Viewport) -> CameraIntrinsics {
        CameraIntrinsics::from_vertical_fov(
            self.vertical_fov_deg.to_radians(),
            viewport,
            self.far_clip,
        )
    }

    /// Update one field by its TOML key.  Used by the REPL's `/set`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        fn num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
            value
                .parse::<T>()
                .map_err(|_| format!("'{value}' is not a valid value for {key}"))
        }
        match key {
            "max_placement_distance" => self.max_placement_distance = num(key, value)?,
            "far_clip" => {
                let far: f32 = num(key, value)?;
                if far.is_nan() || far <= 0.0 {
                    return Err(format!("far_clip must be positive, got {value}"));
                }
                self.far_clip = far;
            }
            "vertical_fov_deg" => self.vertical_fov_deg = num(key, value)?,
            "feature_cone_angle_deg" => self.feature_cone_angle_deg = num(key, value)?,
            "feature_min_distance" => self.feature_min_distance = num(key, value)?,
            "feature_max_distance" => self.feature_max_distance = num(key, value)?,
            "feature_max_results" => self.feature_max_results = num(key, value)?,
            "snap_tolerance_fraction" => self.snap_tolerance_fraction = num(key, value)?,
            "snap_vertical_allowance" => self.snap_vertical_allowance = num(key, value)?,
            "snap_epsilon" => self.snap_epsilon = num(key, value)?,
            "snap_seconds_per_metre" => self.snap_seconds_per_metre = num(key, value)?,
            "object_scale" => self.object_scale = num(key, value)?,
            other => return Err(format!("Unknown setting '{other}'")),
        }
        Ok(())
    }
}

/// Return the path to `~/.wayfind/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".wayfind").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `WAYFIND_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `WAYFIND_MAX_DISTANCE` | `max_placement_distance` |
/// | `WAYFIND_FAR_CLIP` | `far_clip` |
/// | `WAYFIND_FOV_DEG` | `vertical_fov_deg` |
/// | `WAYFIND_FEATURE_MAX_RESULTS` | `feature_max_results` |
///
/// Values that do not parse are ignored, as is a far clip that is not
/// strictly positive.
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |name| std::env::var(name).ok());
}

/// Apply overrides using `lookup` to resolve each `WAYFIND_*` name.
fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("WAYFIND_MAX_DISTANCE")
        && let Ok(d) = v.parse::<f32>()
    {
        cfg.max_placement_distance = d;
    }
    if let Some(v) = lookup("WAYFIND_FAR_CLIP")
        && let Ok(d) = v.parse::<f32>()
        && d > 0.0
    {
        cfg.far_clip = d;
    }
    if let Some(v) = lookup("WAYFIND_FOV_DEG")
        && let Ok(d) = v.parse::<f32>()
    {
        cfg.vertical_fov_deg = d;
    }
    if let Some(v) = lookup("WAYFIND_FEATURE_MAX_RESULTS")
        && let Ok(n) = v.parse::<usize>()
    {
        cfg.feature_max_results = n;
    }
}

/// Save the config to disk, creating `~/.wayfind/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

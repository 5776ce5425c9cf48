use crate::error::{Error, Result};

use fxhash::FxHashMap;
use serde::Deserialize;
use std::path::Path;

lazy_static! {
    /// Built-in profiles by name. `default` is the classic
    /// 0..1024 range, `narrow` the 40..950 range of later deployments.
    pub static ref PROFILES: FxHashMap<&'static str, DeviceProfile> = builtin_profiles();
}

fn builtin_profiles() -> FxHashMap<&'static str, DeviceProfile> {
    let mut profiles = FxHashMap::default();
    profiles.insert("default", DeviceProfile::default());
    profiles.insert(
        "narrow",
        DeviceProfile {
            name: "narrow".to_owned(),
            x_min: 40,
            x_max: 950,
            y_min: 40,
            y_max: 950,
            ..DeviceProfile::default()
        },
    );
    profiles
}

/// Describes the device registered with the input subsystem.
///
/// `device_name` and the axis ranges are registered with uinput. The ranges are
/// reported to consumers only, values written by clients are never clamped to
/// them. uinput offers no way to set the physical path, so `phys` is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub name: String,
    pub device_name: String,
    pub phys: String,
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        DeviceProfile {
            name: "default".to_owned(),
            device_name: "Virtual touchscreen".to_owned(),
            phys: "virtual_ts/input0".to_owned(),
            x_min: 0,
            x_max: 1024,
            y_min: 0,
            y_max: 1024,
        }
    }
}

impl DeviceProfile {
    /// Looks up one of the built-in profiles
    pub fn named(name: &str) -> Result<DeviceProfile> {
        PROFILES
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownProfile(name.to_owned()))
    }

    /// Parses a profile from TOML. Missing keys fall back to the `default` profile.
    ///
    /// ```
    /// use virtual_touchscreen::device::DeviceProfile;
    ///
    /// let p = DeviceProfile::from_toml_str("x_max = 1920\ny_max = 1080").unwrap();
    /// assert_eq!((p.x_max, p.y_max), (1920, 1080));
    /// ```
    pub fn from_toml_str(s: &str) -> Result<DeviceProfile> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<DeviceProfile> {
        let content = std::fs::read_to_string(path)?;
        DeviceProfile::from_toml_str(&content)
    }
}

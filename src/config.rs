use anyhow::{Context, Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::error::Error;
use crate::gestures::Binding;

/// Recognition thresholds and surface behaviour. Distances are in the
/// host's pixel units, durations and frequencies in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Class the host toggles on the surface while it is pressed.
    pub touch_class: String,
    /// Ignore mouse input on the surface.
    pub disable_click: bool,
    pub tap_tolerance: f64,
    pub touch_hold_tolerance: f64,
    pub long_tap_time_interval: f64,
    pub roll_over_frequency: f64,
    pub drag_frequency: f64,
    /// Keep tracking moves and releases that land outside the surface.
    pub drag_outside: bool,
    pub swipe_tolerance: f64,
    pub swipe_cone_size: f64,
    pub zoom_frequency: f64,
    pub zoom_distance: f64,
    pub zoom_in_out_distance: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            touch_class: String::new(),
            disable_click: false,
            tap_tolerance: 10.0,
            touch_hold_tolerance: 400.0,
            long_tap_time_interval: 400.0,
            roll_over_frequency: 100.0,
            drag_frequency: 10.0,
            drag_outside: false,
            swipe_tolerance: 100.0,
            swipe_cone_size: 0.75,
            zoom_frequency: 10.0,
            zoom_distance: 10.0,
            zoom_in_out_distance: 100.0,
        }
    }
}

impl Options {
    pub fn validate(&self) -> std::result::Result<(), Error> {
        let numeric = [
            ("tap_tolerance", self.tap_tolerance),
            ("touch_hold_tolerance", self.touch_hold_tolerance),
            ("long_tap_time_interval", self.long_tap_time_interval),
            ("roll_over_frequency", self.roll_over_frequency),
            ("drag_frequency", self.drag_frequency),
            ("swipe_tolerance", self.swipe_tolerance),
            ("swipe_cone_size", self.swipe_cone_size),
            ("zoom_frequency", self.zoom_frequency),
            ("zoom_distance", self.zoom_distance),
            ("zoom_in_out_distance", self.zoom_in_out_distance),
        ];
        for (name, value) in numeric {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidOption { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub options: Options,

    /// Binding declaration ("swipe.left.stop") -> label printed when it fires.
    /// Nested tables flatten into dotted keys.
    #[serde(default, deserialize_with = "deserialize_bindings_flat")]
    pub bindings: BTreeMap<String, String>,
}

impl Profile {
    pub fn parse(text: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(text)?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    /// Bindings parsed into subscriptions, in key order.
    pub fn subscriptions(&self) -> Result<Vec<(Binding, String)>> {
        self.bindings
            .iter()
            .map(|(k, v)| {
                let binding: Binding = k
                    .parse()
                    .with_context(|| format!("invalid binding '{k}'"))?;
                Ok((binding, v.clone()))
            })
            .collect()
    }
}

fn deserialize_bindings_flat<'de, D>(
    de: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = toml::Value::deserialize(de)?;
    let table = match val {
        toml::Value::Table(t) => t,
        other => {
            return Err(serde::de::Error::custom(format!(
                "bindings must be a table, got {:?}",
                other.type_str()
            )));
        }
    };

    let mut out = BTreeMap::new();
    flatten_table("", &table, &mut out).map_err(serde::de::Error::custom)?;
    Ok(out)
}

fn flatten_table(
    prefix: &str,
    table: &toml::value::Table,
    out: &mut BTreeMap<String, String>,
) -> std::result::Result<(), String> {
    for (k, v) in table {
        let key = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        match v {
            toml::Value::String(s) => {
                out.insert(key, s.clone());
            }
            toml::Value::Table(sub) => {
                flatten_table(&key, sub, out)?;
            }
            other => {
                return Err(format!(
                    "binding '{}' label must be a string, got {}",
                    key,
                    other.type_str()
                ));
            }
        }
    }
    Ok(())
}

fn validate_profile(p: &Profile) -> Result<()> {
    p.options.validate()?;
    for (k, v) in &p.bindings {
        if v.trim().is_empty() {
            return Err(anyhow!("binding '{}' has an empty label", k));
        }
        k.parse::<Binding>()
            .with_context(|| format!("invalid binding '{k}'"))?;
    }
    Ok(())
}

/// Profiles on disk: `~/.config/gesturectl/profiles/<name>.toml` plus an
/// `active` file naming the default one.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl ProfileStore {
    pub fn open_default() -> Result<Self> {
        let home = UserDirs::new()
            .ok_or_else(|| anyhow!("cannot determine home directory"))?
            .home_dir()
            .to_path_buf();
        Self::open(home.join(".config").join("gesturectl"))
    }

    /// Opens the store rooted at `config_dir`, installing the built-in
    /// default profile when missing.
    pub fn open(config_dir: PathBuf) -> Result<Self> {
        let profiles_dir = config_dir.join("profiles");
        fs::create_dir_all(&profiles_dir)
            .with_context(|| format!("failed to create {}", profiles_dir.display()))?;

        let def_path = profiles_dir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = config_dir.join("active");
        if !active_ptr.exists() {
            fs::write(&active_ptr, b"default")?;
        }

        Ok(Self {
            config_dir,
            profiles_dir,
            active_ptr,
        })
    }

    pub fn active_name(&self) -> Result<String> {
        let name = fs::read_to_string(&self.active_ptr)
            .with_context(|| format!("failed to read {}", self.active_ptr.display()))?;
        Ok(name.trim().to_string())
    }

    pub fn set_active(&self, name: &str) -> Result<()> {
        let p = self.profile_path(name);
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        fs::write(&self.active_ptr, name.as_bytes())?;
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{name}.toml"))
    }

    /// Loads `name`, or the active profile when `None`.
    pub fn load(&self, name: Option<&str>) -> Result<Profile> {
        let name = match name {
            Some(n) => n.to_string(),
            None => self.active_name()?,
        };
        let profile = load_profile_file(&self.profile_path(&name))?;
        info!("loaded profile '{name}'");
        Ok(profile)
    }
}

pub fn load_profile_file(path: &Path) -> Result<Profile> {
    let txt = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    Profile::parse(&txt).map_err(|e| anyhow!("failed to parse {}: {e:#}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let o = Options::default();
        assert_eq!(o.tap_tolerance, 10.0);
        assert_eq!(o.touch_hold_tolerance, 400.0);
        assert_eq!(o.long_tap_time_interval, 400.0);
        assert_eq!(o.roll_over_frequency, 100.0);
        assert_eq!(o.drag_frequency, 10.0);
        assert_eq!(o.swipe_tolerance, 100.0);
        assert_eq!(o.swipe_cone_size, 0.75);
        assert_eq!(o.zoom_frequency, 10.0);
        assert_eq!(o.zoom_distance, 10.0);
        assert_eq!(o.zoom_in_out_distance, 100.0);
        assert!(!o.disable_click);
        assert!(!o.drag_outside);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn partial_options_keep_defaults() {
        let p = Profile::parse(
            r#"
            [options]
            tap_tolerance = 4
            drag_outside = true
            "#,
        )
        .unwrap();
        assert_eq!(p.options.tap_tolerance, 4.0);
        assert!(p.options.drag_outside);
        assert_eq!(p.options.swipe_tolerance, 100.0);
    }

    #[test]
    fn nested_bindings_flatten() {
        let p = Profile::parse(
            r#"
            [meta]
            name = "reader"

            [bindings]
            tap = "select"
            "drag.once" = "grab"

            [bindings.swipe]
            left = "next"
            right = "prev"
            "#,
        )
        .unwrap();
        let keys: Vec<&str> = p.bindings.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["drag.once", "swipe.left", "swipe.right", "tap"]);
        assert_eq!(p.meta.name.as_deref(), Some("reader"));
        assert_eq!(p.subscriptions().unwrap().len(), 4);
    }

    #[test]
    fn rejects_negative_option() {
        let err = Profile::parse("[options]\nswipe_tolerance = -1\n").unwrap_err();
        assert!(err.to_string().contains("swipe_tolerance"));
    }

    #[test]
    fn rejects_unknown_binding() {
        assert!(Profile::parse("[bindings]\nfling = \"x\"\n").is_err());
        assert!(Profile::parse("[bindings]\ntap = \"  \"\n").is_err());
    }

    #[test]
    fn bundled_default_profile_is_valid() {
        let p = Profile::parse(default_profile_text()).unwrap();
        assert!(!p.bindings.is_empty());
    }

    #[test]
    fn store_installs_default_and_lists() {
        let dir = std::env::temp_dir().join(format!("gesturectl-test-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let store = ProfileStore::open(dir.clone()).unwrap();
        assert_eq!(store.active_name().unwrap(), "default");
        assert_eq!(store.list_profiles(), vec!["default".to_string()]);
        assert!(store.load(None).is_ok());
        assert!(store.set_active("missing").is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}

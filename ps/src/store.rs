//! Core PrefStore implementation

use eyre::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::RwLock;

/// Chat user identifier
pub type UserId = i64;

/// Routing preference passed through to trip search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutePriority {
    #[serde(rename = "leasttime")]
    Fastest,
    #[serde(rename = "leastinterchange")]
    LeastTransfers,
    #[serde(rename = "leastwalking")]
    LeastWalking,
}

impl RoutePriority {
    pub const ALL: [RoutePriority; 3] = [Self::Fastest, Self::LeastTransfers, Self::LeastWalking];

    /// Value understood by the trip-search backend (`routeType`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fastest => "leasttime",
            Self::LeastTransfers => "leastinterchange",
            Self::LeastWalking => "leastwalking",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fastest => "Fastest",
            Self::LeastTransfers => "Least transfers",
            Self::LeastWalking => "Least walking",
        }
    }
}

impl fmt::Display for RoutePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutePriority {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "leasttime" | "fastest" => Ok(Self::Fastest),
            "leastinterchange" | "least-transfers" => Ok(Self::LeastTransfers),
            "leastwalking" | "least-walking" => Ok(Self::LeastWalking),
            other => Err(eyre::eyre!("Unknown route priority: '{}'", other)),
        }
    }
}

/// A user's saved locations and routing preference
///
/// Locations are opaque references: stop IDs, addresses or coordinate strings.
/// An empty string means "not saved".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub home_location: String,
    #[serde(default)]
    pub work_location: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_priority"
    )]
    pub route_priority: Option<RoutePriority>,
}

// Older files may hold an empty or unrecognised priority; treat both as unset.
fn deserialize_priority<'de, D>(deserializer: D) -> std::result::Result<Option<RoutePriority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// Preferences for all users, mirrored to a JSON file
pub struct PrefStore {
    path: PathBuf,
    prefs: RwLock<BTreeMap<UserId, UserPreferences>>,
}

impl PrefStore {
    /// Open the store at `path`, creating the directory and an empty file if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context(format!("Failed to create prefs directory: {}", dir.display()))?;
        }
        if !path.exists() {
            fs::write(&path, "{}\n").context(format!("Failed to create prefs file: {}", path.display()))?;
        }

        let prefs = load_file(&path)?;
        info!("Loaded preferences for {} users from {}", prefs.len(), path.display());

        Ok(Self {
            path,
            prefs: RwLock::new(prefs),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A user's preferences, or the empty default if none were saved
    pub fn get(&self, user: UserId) -> UserPreferences {
        match self.prefs.read() {
            Ok(prefs) => prefs.get(&user).cloned().unwrap_or_default(),
            Err(poisoned) => poisoned.into_inner().get(&user).cloned().unwrap_or_default(),
        }
    }

    /// All users with saved preferences, ordered by user ID
    pub fn list(&self) -> Vec<(UserId, UserPreferences)> {
        match self.prefs.read() {
            Ok(prefs) => prefs.iter().map(|(id, p)| (*id, p.clone())).collect(),
            Err(poisoned) => poisoned.into_inner().iter().map(|(id, p)| (*id, p.clone())).collect(),
        }
    }

    pub fn set_home(&self, user: UserId, location: &str) -> Result<()> {
        debug!("set_home: user={} location={}", user, location);
        self.update(user, |p| p.home_location = location.to_string())
    }

    pub fn set_work(&self, user: UserId, location: &str) -> Result<()> {
        debug!("set_work: user={} location={}", user, location);
        self.update(user, |p| p.work_location = location.to_string())
    }

    pub fn set_priority(&self, user: UserId, priority: RoutePriority) -> Result<()> {
        debug!("set_priority: user={} priority={}", user, priority);
        self.update(user, |p| p.route_priority = Some(priority))
    }

    // The file is rewritten while the write lock is held so saves land in the
    // same order as the in-memory updates. Memory only changes once the file
    // has been replaced.
    fn update(&self, user: UserId, apply: impl FnOnce(&mut UserPreferences)) -> Result<()> {
        let mut prefs = self
            .prefs
            .write()
            .map_err(|_| eyre::eyre!("Preference lock poisoned"))?;
        let mut next = prefs.clone();
        apply(next.entry(user).or_default());
        save_file(&self.path, &next)?;
        *prefs = next;
        Ok(())
    }
}

fn load_file(path: &Path) -> Result<BTreeMap<UserId, UserPreferences>> {
    let content = fs::read_to_string(path).context(format!("Failed to read prefs file: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let raw: BTreeMap<String, UserPreferences> =
        serde_json::from_str(&content).context(format!("Failed to parse prefs file: {}", path.display()))?;

    let mut prefs = BTreeMap::new();
    for (key, value) in raw {
        match key.trim().parse::<UserId>() {
            Ok(id) => {
                prefs.insert(id, value);
            }
            Err(_) => warn!("Skipping invalid user key in prefs file: {}", key),
        }
    }
    Ok(prefs)
}

fn save_file(path: &Path, prefs: &BTreeMap<UserId, UserPreferences>) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context("Failed to ensure prefs directory")?;
    }

    let keyed: BTreeMap<String, &UserPreferences> = prefs.iter().map(|(id, p)| (id.to_string(), p)).collect();
    let data = serde_json::to_string_pretty(&keyed)?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path).context("Failed to create temporary prefs file")?;
        file.write_all(data.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all().context("Failed to flush prefs file")?;
    }
    fs::rename(&tmp_path, path).context(format!("Failed to replace prefs file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PrefStore) {
        let temp = TempDir::new().unwrap();
        let store = PrefStore::open(temp.path().join("data").join("userprefs.json")).unwrap();
        (temp, store)
    }

    #[test]
    fn test_open_creates_empty_file() {
        let (_temp, store) = setup();
        assert!(store.path().exists());
        assert_eq!(fs::read_to_string(store.path()).unwrap().trim(), "{}");
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_get_unknown_user_is_default() {
        let (_temp, store) = setup();
        assert_eq!(store.get(7), UserPreferences::default());
    }

    #[test]
    fn test_fields_are_independent() {
        let (_temp, store) = setup();
        store.set_home(1, "home-ref").unwrap();
        store.set_work(1, "work-ref").unwrap();
        store.set_priority(1, RoutePriority::LeastTransfers).unwrap();
        store.set_home(1, "new-home").unwrap();

        let prefs = store.get(1);
        assert_eq!(prefs.home_location, "new-home");
        assert_eq!(prefs.work_location, "work-ref");
        assert_eq!(prefs.route_priority, Some(RoutePriority::LeastTransfers));
    }

    #[test]
    fn test_persists_across_reopen() {
        let (temp, store) = setup();
        store.set_work(99, "9091001000009117").unwrap();
        store.set_priority(99, RoutePriority::LeastWalking).unwrap();
        drop(store);

        let reopened = PrefStore::open(temp.path().join("data").join("userprefs.json")).unwrap();
        let prefs = reopened.get(99);
        assert_eq!(prefs.work_location, "9091001000009117");
        assert_eq!(prefs.route_priority, Some(RoutePriority::LeastWalking));
    }

    #[test]
    fn test_file_uses_backend_wire_values() {
        let (_temp, store) = setup();
        store.set_home(5, "abc").unwrap();
        store.set_priority(5, RoutePriority::Fastest).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["5"]["homeLocation"], "abc");
        assert_eq!(raw["5"]["workLocation"], "");
        assert_eq!(raw["5"]["routePriority"], "leasttime");
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_save_keeps_previous_value() {
        let (_temp, store) = setup();
        store.set_home(1, "old").unwrap();

        // A directory where the temp file goes makes File::create fail
        fs::create_dir(store.path().with_extension("json.tmp")).unwrap();
        assert!(store.set_home(1, "new").is_err());
        assert!(store.set_priority(2, RoutePriority::Fastest).is_err());

        assert_eq!(store.get(1).home_location, "old");
        assert_eq!(store.get(2), UserPreferences::default());
        assert_eq!(store.list().len(), 1);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["1"]["homeLocation"], "old");
    }

    #[test]
    fn test_load_skips_invalid_keys_and_unknown_priority() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prefs.json");
        fs::write(
            &path,
            r#"{
                "12": {"homeLocation": "a", "workLocation": "b", "routePriority": ""},
                "not-a-number": {"homeLocation": "x", "workLocation": "y"},
                "13": {"homeLocation": "c", "workLocation": "d", "routePriority": "sideways"}
            }"#,
        )
        .unwrap();

        let store = PrefStore::open(&path).unwrap();
        let all = store.list();
        assert_eq!(all.len(), 2);
        assert_eq!(store.get(12).route_priority, None);
        assert_eq!(store.get(13).home_location, "c");
        assert_eq!(store.get(13).route_priority, None);
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(PrefStore::open(&path).is_err());
    }

    #[test]
    fn test_route_priority_parse_and_labels() {
        assert_eq!("leasttime".parse::<RoutePriority>().unwrap(), RoutePriority::Fastest);
        assert_eq!(
            "LeastInterchange".parse::<RoutePriority>().unwrap(),
            RoutePriority::LeastTransfers
        );
        assert_eq!("least-walking".parse::<RoutePriority>().unwrap(), RoutePriority::LeastWalking);
        assert!("teleport".parse::<RoutePriority>().is_err());

        assert_eq!(RoutePriority::Fastest.label(), "Fastest");
        assert_eq!(RoutePriority::LeastTransfers.label(), "Least transfers");
        assert_eq!(RoutePriority::LeastWalking.to_string(), "leastwalking");
    }
}

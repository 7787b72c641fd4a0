//! Runtime settings loader for swipe-deck.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/swipe.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/swipe-deck/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/swipe.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "swipe-deck/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

/// Merged `swipe.yaml` settings. Every field is optional; unset values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwipeSettings {
    /// Gesture thresholds.
    #[serde(default)]
    pub gesture: GestureSettings,
    /// Deck paging and rendering.
    #[serde(default)]
    pub deck: DeckSettings,
    /// Backend call bounds.
    #[serde(default)]
    pub decision: DecisionSettings,
    /// Event bus.
    #[serde(default)]
    pub events: EventSettings,
}

/// `gesture` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GestureSettings {
    /// Horizontal distance for like/pass.
    pub swipe_threshold: Option<f64>,
    /// Upward distance for open-details.
    pub details_threshold: Option<f64>,
    /// Upward release velocity for open-details.
    pub velocity_threshold: Option<f64>,
}

/// `deck` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckSettings {
    /// Cards per `DeckChanged` event.
    pub visible_count: Option<usize>,
    /// Prefetch below this many undecided cards (0 disables).
    pub prefetch_threshold: Option<usize>,
    /// Candidates per fetch.
    pub page_size: Option<usize>,
}

/// `decision` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionSettings {
    /// Per-attempt timeout for backend calls.
    pub timeout_ms: Option<u64>,
    /// Extra record attempts.
    pub retries: Option<u32>,
    /// Pause between record attempts.
    pub retry_backoff_ms: Option<u64>,
}

/// `events` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventSettings {
    /// Broadcast buffer per subscriber.
    pub capacity: Option<usize>,
}

impl SwipeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            gesture: self.gesture.merge(overlay.gesture),
            deck: self.deck.merge(overlay.deck),
            decision: self.decision.merge(overlay.decision),
            events: self.events.merge(overlay.events),
        }
    }
}

impl GestureSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            swipe_threshold: overlay.swipe_threshold.or(self.swipe_threshold),
            details_threshold: overlay.details_threshold.or(self.details_threshold),
            velocity_threshold: overlay.velocity_threshold.or(self.velocity_threshold),
        }
    }
}

impl DeckSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            visible_count: overlay.visible_count.or(self.visible_count),
            prefetch_threshold: overlay.prefetch_threshold.or(self.prefetch_threshold),
            page_size: overlay.page_size.or(self.page_size),
        }
    }
}

impl DecisionSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            timeout_ms: overlay.timeout_ms.or(self.timeout_ms),
            retries: overlay.retries.or(self.retries),
            retry_backoff_ms: overlay.retry_backoff_ms.or(self.retry_backoff_ms),
        }
    }
}

impl EventSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            capacity: overlay.capacity.or(self.capacity),
        }
    }
}

/// Load system + user settings from their default locations.
#[must_use]
pub fn load_swipe_settings() -> SwipeSettings {
    SettingsPaths::resolve().load()
}

/// Where the two settings layers live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPaths {
    /// Shipped defaults.
    pub system: PathBuf,
    /// Per-user overrides.
    pub user: PathBuf,
}

impl SettingsPaths {
    /// Root from `PRJ_ROOT` (else cwd); config home from `--conf`, then
    /// `PRJ_CONFIG_HOME`, then `.config`.
    #[must_use]
    pub fn resolve() -> Self {
        let root = env_value("PRJ_ROOT").map_or_else(
            || std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            PathBuf::from,
        );
        let config_home = CONFIG_HOME_OVERRIDE
            .get()
            .cloned()
            .or_else(|| env_value("PRJ_CONFIG_HOME").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_HOME_RELATIVE_PATH));
        Self::under(&root, &config_home)
    }

    /// Layout below `root`. An absolute `config_home` is used as is.
    #[must_use]
    pub fn under(root: &Path, config_home: &Path) -> Self {
        Self {
            system: root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH),
            user: root
                .join(config_home)
                .join(DEFAULT_USER_SETTINGS_RELATIVE_PATH),
        }
    }

    /// Read both layers, user over system. A missing or unreadable layer counts as empty.
    #[must_use]
    pub fn load(&self) -> SwipeSettings {
        read_layer(&self.system).merge(read_layer(&self.user))
    }
}

fn read_layer(path: &Path) -> SwipeSettings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return SwipeSettings::default();
        }
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read swipe settings; skipping layer"
            );
            return SwipeSettings::default();
        }
    };
    serde_yaml::from_str(&raw).unwrap_or_else(|error| {
        tracing::warn!(
            path = %path.display(),
            error = %error,
            "invalid swipe settings yaml; skipping layer"
        );
        SwipeSettings::default()
    })
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Set the config home from the CLI `--conf` flag. First call wins.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if let Err(ignored) = CONFIG_HOME_OVERRIDE.set(path) {
        tracing::warn!(
            ignored = %ignored.display(),
            "config home already set; keeping the first value"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_user_overrides_system_field_by_field() {
        let dir = tempfile::tempdir().unwrap();
        let system = write(
            dir.path(),
            "system.yaml",
            "gesture:\n  swipe_threshold: 100\n  details_threshold: 50\ndeck:\n  page_size: 10\n",
        );
        let user = write(
            dir.path(),
            "user.yaml",
            "gesture:\n  swipe_threshold: 140\ndecision:\n  retries: 3\n",
        );

        let settings = SettingsPaths { system, user }.load();
        assert_eq!(settings.gesture.swipe_threshold, Some(140.0));
        assert_eq!(settings.gesture.details_threshold, Some(50.0));
        assert_eq!(settings.deck.page_size, Some(10));
        assert_eq!(settings.decision.retries, Some(3));
        assert_eq!(settings.events.capacity, None);
    }

    #[test]
    fn test_shipped_system_settings_parse() {
        let shipped: SwipeSettings =
            serde_yaml::from_str(include_str!("../../../../../conf/swipe.yaml")).unwrap();
        assert_eq!(shipped.gesture.swipe_threshold, Some(120.0));
        assert_eq!(shipped.deck.visible_count, Some(3));
        assert_eq!(shipped.decision.timeout_ms, Some(15_000));
        assert_eq!(shipped.events.capacity, Some(256));
    }

    #[test]
    fn test_layout_under_project_root() {
        let root = Path::new("/srv/app");
        let relative = SettingsPaths::under(root, Path::new(".config"));
        assert_eq!(relative.system, root.join("packages/conf/swipe.yaml"));
        assert_eq!(
            relative.user,
            root.join(".config/swipe-deck/settings.yaml")
        );

        let absolute = SettingsPaths::under(root, Path::new("/etc/swipe"));
        assert_eq!(
            absolute.user,
            PathBuf::from("/etc/swipe/swipe-deck/settings.yaml")
        );
    }

    #[test]
    fn test_missing_and_broken_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(dir.path(), "broken.yaml", "gesture: [not, a, map");
        let missing = dir.path().join("missing.yaml");

        let settings = SettingsPaths {
            system: missing,
            user: broken,
        }
        .load();
        assert!(settings.gesture.swipe_threshold.is_none());
        assert!(settings.deck.visible_count.is_none());
    }
}

//! Config namespace: YAML settings loading and runtime config resolution.

mod runtime;
mod settings;

pub use runtime::SettingsError;
pub use settings::{
    DeckSettings, DecisionSettings, EventSettings, GestureSettings, SettingsPaths, SwipeSettings,
    load_swipe_settings, set_config_home_override,
};

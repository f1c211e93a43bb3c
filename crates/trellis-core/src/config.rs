use serde::{Deserialize, Serialize};

/// What the frame adapter does with a fatal binding error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugBehavior {
    /// Keep the partial tree and append the error and warning report views.
    Verbose,
    /// Clear the frame.
    #[default]
    Silent,
}

impl DebugBehavior {
    pub fn show_debug_views(self) -> bool {
        self == DebugBehavior::Verbose
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrellisConfig {
    pub debug_behavior: DebugBehavior,
    /// Pixels per dp.
    pub density: f32,
    /// Released adapters kept per recycler key.
    pub pool_capacity_per_key: usize,
    /// Distinct recycler keys a single pool tracks.
    pub max_pool_keys: usize,
    /// Overrides the asset provider's theme flag when set.
    pub dark_theme: Option<bool>,
}

impl Default for TrellisConfig {
    fn default() -> Self {
        TrellisConfig {
            debug_behavior: DebugBehavior::Silent,
            density: 1.0,
            pool_capacity_per_key: 8,
            max_pool_keys: 32,
            dark_theme: None,
        }
    }
}

impl TrellisConfig {
    pub fn verbose() -> Self {
        TrellisConfig {
            debug_behavior: DebugBehavior::Verbose,
            ..Default::default()
        }
    }
}

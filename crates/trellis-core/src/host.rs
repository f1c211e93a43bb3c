//! Services the host supplies. Everything here has a usable default so a
//! host only overrides what it actually provides.

use crate::model::{BindingValue, CustomElementData, Image};
use crate::{ViewHandle, ViewKind};
use std::sync::Arc;
use web_time::{SystemTime, UNIX_EPOCH};

/// Result of an image load.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedImage {
    pub url: String,
    pub width_px: u32,
    pub height_px: u32,
}

/// Called once per request; `None` means the load failed.
pub type ImageConsumer = Box<dyn FnOnce(Option<LoadedImage>) + Send>;

/// Called once per request with the resolved family name, or `None`.
pub type TypefaceConsumer = Box<dyn FnOnce(Option<String>) + Send>;

pub trait AssetProvider: Send + Sync {
    /// Loads one of `image`'s sources sized for the target box.
    fn get_image(
        &self,
        image: &Image,
        width_px: Option<i32>,
        height_px: Option<i32>,
        consumer: ImageConsumer,
    );

    fn get_typeface(&self, family: &str, italic: bool, consumer: TypefaceConsumer);

    /// "5 minutes ago" and friends.
    fn relative_time_string(&self, elapsed_ms: u64) -> String;

    fn is_dark_theme(&self) -> bool {
        false
    }

    fn is_rtl(&self) -> bool {
        false
    }
}

pub trait CustomElementProvider: Send + Sync {
    fn create_custom_element(&self, data: &CustomElementData) -> ViewHandle;
    fn release_custom_view(&self, view: &ViewHandle, data: &CustomElementData);
}

/// Resolves binding values whose content lives on the host side.
pub trait HostBindingProvider: Send + Sync {
    fn resolve(&self, value: &BindingValue) -> BindingValue {
        let mut resolved = value.clone();
        resolved.host_binding_data = None;
        resolved
    }
}

pub trait Clock: Send + Sync {
    fn current_time_ms(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_time_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Fails every load; used until a host plugs in real assets.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssets;

impl AssetProvider for NoAssets {
    fn get_image(&self, _: &Image, _: Option<i32>, _: Option<i32>, consumer: ImageConsumer) {
        consumer(None);
    }

    fn get_typeface(&self, _: &str, _: bool, consumer: TypefaceConsumer) {
        consumer(None);
    }

    fn relative_time_string(&self, elapsed_ms: u64) -> String {
        let minutes = elapsed_ms / 60_000;
        match minutes {
            0 => "just now".to_string(),
            1..=59 => format!("{minutes}m"),
            60..=1439 => format!("{}h", minutes / 60),
            _ => format!("{}d", minutes / 1440),
        }
    }
}

/// Hands back an empty custom view carrying the payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderCustomElements;

impl CustomElementProvider for PlaceholderCustomElements {
    fn create_custom_element(&self, data: &CustomElementData) -> ViewHandle {
        ViewHandle::new(ViewKind::Custom {
            payload: Some(data.payload.clone()),
        })
    }

    fn release_custom_view(&self, view: &ViewHandle, _: &CustomElementData) {
        view.set_custom_payload(None);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StripHostBindings;

impl HostBindingProvider for StripHostBindings {}

#[derive(Clone)]
pub struct HostProviders {
    pub assets: Arc<dyn AssetProvider>,
    pub custom_elements: Arc<dyn CustomElementProvider>,
    pub host_bindings: Arc<dyn HostBindingProvider>,
    pub clock: Arc<dyn Clock>,
}

impl Default for HostProviders {
    fn default() -> Self {
        HostProviders {
            assets: Arc::new(NoAssets),
            custom_elements: Arc::new(PlaceholderCustomElements),
            host_bindings: Arc::new(StripHostBindings),
            clock: Arc::new(SystemClock),
        }
    }
}

impl std::fmt::Debug for HostProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostProviders")
            .field("assets", &"<provider>")
            .field("custom_elements", &"<provider>")
            .field("host_bindings", &"<provider>")
            .field("clock", &"<clock>")
            .finish()
    }
}

impl HostProviders {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn assets(mut self, assets: Arc<dyn AssetProvider>) -> Self {
        self.assets = assets;
        self
    }
    pub fn custom_elements(mut self, provider: Arc<dyn CustomElementProvider>) -> Self {
        self.custom_elements = provider;
        self
    }
    pub fn host_bindings(mut self, provider: Arc<dyn HostBindingProvider>) -> Self {
        self.host_bindings = provider;
        self
    }
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

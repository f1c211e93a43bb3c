//! Fixtures and fake host providers shared by the unit tests.

use crate::context::{FrameContext, create_frame_context};
use crate::params::AdapterParameters;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use trellis_core::model::{
    BindingContext, BindingRef, BindingValue, CustomElementData, Element, ElementKind, Frame,
    Image, ImageContent, ImageElement, ImageSource, ParameterizedText, Style, Stylesheet,
    Stylesheets, Template, TextContent, TextElement,
};
use trellis_core::{
    AssetProvider, Clock, CustomElementProvider, DebugLogger, HostProviders, ImageConsumer,
    LoadedImage, TrellisConfig, TypefaceConsumer, ViewHandle, ViewKind,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn params() -> Arc<AdapterParameters> {
    params_with(TrellisConfig::default(), HostProviders::default())
}

pub fn params_with(config: TrellisConfig, host: HostProviders) -> Arc<AdapterParameters> {
    AdapterParameters::new(config, host)
}

/// Context for an empty 400px frame.
pub fn frame_context(params: &AdapterParameters) -> FrameContext {
    create_frame_context(&Frame::default(), 400, &[], Arc::default(), params).unwrap()
}

/// Frame context with `styles` in one inline stylesheet.
pub fn frame_context_with_styles(params: &AdapterParameters, styles: Vec<Style>) -> FrameContext {
    let frame = Frame {
        stylesheets: Stylesheets {
            stylesheet_ids: vec![],
            stylesheets: vec![Stylesheet {
                stylesheet_id: "test".into(),
                styles,
                conditions: vec![],
            }],
        },
        ..Default::default()
    };
    create_frame_context(&frame, 400, &[], Arc::new(DebugLogger::new()), params).unwrap()
}

/// Template-instance context holding `values`.
pub fn template_context(params: &AdapterParameters, values: Vec<BindingValue>) -> FrameContext {
    frame_context(params)
        .create_template_context(
            &Template::default(),
            &BindingContext {
                binding_values: values,
            },
        )
        .unwrap()
}

pub fn text(value: &str) -> Element {
    Element::new(ElementKind::Text(TextElement {
        content: Some(TextContent::ParameterizedText(ParameterizedText::plain(value))),
    }))
}

pub fn bound_text(binding_id: &str, optional: bool) -> Element {
    let binding = if optional {
        BindingRef::optional(binding_id)
    } else {
        BindingRef::new(binding_id)
    };
    Element::new(ElementKind::Text(TextElement {
        content: Some(TextContent::ParameterizedTextBinding(binding)),
    }))
}

pub fn image_element(url: &str) -> Element {
    Element::new(ElementKind::Image(ImageElement {
        content: Some(ImageContent::Image(Image {
            sources: vec![ImageSource::new(url)],
            tint_color: None,
        })),
    }))
}

pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn current_time_ms(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageRequest {
    pub urls: Vec<String>,
    pub width_px: Option<i32>,
    pub height_px: Option<i32>,
}

type Pending = Box<dyn FnOnce() + Send>;

/// Records every request. Loads complete inline unless `deferred` is set,
/// in which case they wait for `complete_pending`.
#[derive(Default)]
pub struct FakeAssets {
    pub known_typefaces: Vec<String>,
    pub typeface_requests: Mutex<Vec<String>>,
    pub image_requests: Mutex<Vec<ImageRequest>>,
    pub fail_images: AtomicBool,
    pub deferred: AtomicBool,
    pub(crate) pending: Mutex<Vec<Pending>>,
}

impl FakeAssets {
    fn run(&self, job: Pending) {
        if self.deferred.load(Ordering::SeqCst) {
            self.pending.lock().push(job);
        } else {
            job();
        }
    }

    pub fn complete_pending(&self) {
        let jobs = std::mem::take(&mut *self.pending.lock());
        for job in jobs {
            job();
        }
    }
}

impl AssetProvider for FakeAssets {
    fn get_image(
        &self,
        image: &Image,
        width_px: Option<i32>,
        height_px: Option<i32>,
        consumer: ImageConsumer,
    ) {
        let urls: Vec<String> = image.sources.iter().map(|s| s.url.clone()).collect();
        self.image_requests.lock().push(ImageRequest {
            urls: urls.clone(),
            width_px,
            height_px,
        });
        let loaded = match urls.into_iter().next() {
            Some(url) if !self.fail_images.load(Ordering::SeqCst) => Some(LoadedImage {
                url,
                width_px: width_px.unwrap_or(0).max(0) as u32,
                height_px: height_px.unwrap_or(0).max(0) as u32,
            }),
            _ => None,
        };
        self.run(Box::new(move || consumer(loaded)));
    }

    fn get_typeface(&self, family: &str, _italic: bool, consumer: TypefaceConsumer) {
        self.typeface_requests.lock().push(family.to_string());
        let found = self
            .known_typefaces
            .iter()
            .any(|known| known == family)
            .then(|| family.to_string());
        self.run(Box::new(move || consumer(found)));
    }

    fn relative_time_string(&self, elapsed_ms: u64) -> String {
        format!("{}m ago", elapsed_ms / 60_000)
    }
}

/// Custom views carrying the payload; remembers what was created and released.
#[derive(Default)]
pub struct CountingCustomElements {
    created: Mutex<Vec<String>>,
    released: Mutex<Vec<String>>,
}

impl CountingCustomElements {
    pub fn created(&self) -> Vec<String> {
        self.created.lock().clone()
    }

    pub fn released(&self) -> Vec<String> {
        self.released.lock().clone()
    }
}

impl CustomElementProvider for CountingCustomElements {
    fn create_custom_element(&self, data: &CustomElementData) -> ViewHandle {
        self.created.lock().push(data.payload.clone());
        ViewHandle::new(ViewKind::Custom {
            payload: Some(data.payload.clone()),
        })
    }

    fn release_custom_view(&self, view: &ViewHandle, data: &CustomElementData) {
        self.released.lock().push(data.payload.clone());
        view.set_custom_payload(None);
    }
}

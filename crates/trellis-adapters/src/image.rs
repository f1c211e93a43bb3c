use crate::adapter::{AdapterBase, ElementAdapter};
use crate::context::FrameContext;
use crate::key::{AdapterKind, RecyclerKey};
use crate::params::AdapterParameters;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use trellis_core::model::{Element, ElementKind, Image, ImageContent, ImageElement};
use trellis_core::{Color, ErrorCode, MessageType, Result, TrellisError, ViewHandle, ViewKind};

pub struct ImageElementAdapter {
    base: AdapterBase,
    /// Cancel flag of the in-flight load, if any.
    load: Option<Arc<AtomicBool>>,
}

impl ElementAdapter for ImageElementAdapter {
    type Model = ImageElement;
    const KIND: AdapterKind = AdapterKind::Image;

    fn new_adapter(params: &AdapterParameters) -> Self {
        ImageElementAdapter {
            base: AdapterBase::new(
                ViewHandle::new(ViewKind::image()),
                params.default_style.clone(),
            ),
            load: None,
        }
    }

    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AdapterBase {
        &mut self.base
    }

    fn model_from_element(element: &Element) -> Result<&ImageElement> {
        match &element.kind {
            Some(ElementKind::Image(image)) => Ok(image),
            _ => Err(TrellisError::MissingContent {
                kind: "ImageElement",
            }),
        }
    }

    /// Images are pooled by their styled box size.
    fn recycler_key(
        _model: &ImageElement,
        element: &Element,
        ctx: &FrameContext,
        _params: &AdapterParameters,
    ) -> RecyclerKey {
        let style = ctx.make_style_for(&element.style_references);
        RecyclerKey::Image {
            width_px: style.width_px,
            height_px: style.height_px,
        }
    }

    fn on_create(
        &mut self,
        _model: &ImageElement,
        _element: &Element,
        _ctx: &FrameContext,
        _params: &AdapterParameters,
    ) -> Result<()> {
        Ok(())
    }

    fn on_bind(
        &mut self,
        model: &ImageElement,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        match &model.content {
            Some(ImageContent::Image(image)) => self.load_image(image, ctx, params),
            Some(ImageContent::ImageBinding(binding)) => {
                let value = ctx.get_image_binding_value(binding)?;
                match value.image() {
                    Some(image) => self.load_image(image, ctx, params),
                    None => {
                        self.base.base_view().set_image(None);
                        self.base.hide_for_absent_binding(binding, "Image")?;
                    }
                }
            }
            None => return Err(TrellisError::UnhandledContent("not set".into())),
        }
        Ok(())
    }

    fn on_unbind(&mut self, _params: &AdapterParameters) {
        self.cancel_load();
        let view = self.base.base_view();
        view.set_image(None);
        view.set_image_tint(None);
    }
}

impl ImageElementAdapter {
    fn cancel_load(&mut self) {
        if let Some(load) = self.load.take() {
            load.store(true, Ordering::Release);
        }
    }

    fn load_image(&mut self, image: &Image, ctx: &FrameContext, params: &AdapterParameters) {
        self.cancel_load();
        let image = ctx.filter_image_sources_by_media_query_condition(image);
        let view = self.base.base_view().clone();
        view.set_image_tint(image.tint_color.map(Color::from_argb));

        let cancelled = Arc::new(AtomicBool::new(false));
        self.load = Some(cancelled.clone());
        let debug_logger = ctx.shared_debug_logger();
        let urls: Vec<String> = image.sources.iter().map(|s| s.url.clone()).collect();

        params.host.assets.get_image(
            &image,
            self.base.computed_width_px(),
            self.base.computed_height_px(),
            Box::new(move |loaded| {
                if cancelled.load(Ordering::Acquire) {
                    log::debug!("dropping image completion for unbound view");
                    return;
                }
                match loaded {
                    Some(loaded) => view.set_image(Some(loaded.url)),
                    None => {
                        debug_logger.record_message(
                            MessageType::Warning,
                            ErrorCode::ImageLoadFailed,
                            format!("Image failed to load: {urls:?}"),
                        );
                        view.set_image(None);
                    }
                }
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use trellis_core::HostProviders;
    use trellis_core::model::{
        BindingRef, BindingValue, BoundValue, DarkLightMode, ImageSource, MediaQueryCondition,
        Style, Visibility,
    };

    fn fake_params() -> (Arc<FakeAssets>, Arc<AdapterParameters>) {
        let assets = Arc::new(FakeAssets::default());
        let params = params_with(Default::default(), HostProviders::new().assets(assets.clone()));
        (assets, params)
    }

    fn bound_image(id: &str, optional: bool) -> Element {
        let binding = if optional {
            BindingRef::optional(id)
        } else {
            BindingRef::new(id)
        };
        Element::new(ElementKind::Image(ImageElement {
            content: Some(ImageContent::ImageBinding(binding)),
        }))
    }

    #[test]
    fn test_inline_image_loads_with_target_size() {
        let (assets, params) = fake_params();
        let ctx = frame_context_with_styles(
            &params,
            vec![Style {
                width: Some(24),
                height: Some(16),
                ..Style::new("icon")
            }],
        );
        let mut adapter = ImageElementAdapter::new_adapter(&params);
        adapter
            .bind_model(&image_element("a.png").styles(&["icon"]), &ctx, &params)
            .unwrap();

        assert_eq!(adapter.view().image().as_deref(), Some("a.png"));
        let requests = assets.image_requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].urls, vec!["a.png"]);
        assert_eq!((requests[0].width_px, requests[0].height_px), (Some(24), Some(16)));
    }

    #[test]
    fn test_sources_are_filtered_by_media_query() {
        let (assets, params) = fake_params();
        let ctx = frame_context(&params);
        let element = Element::new(ElementKind::Image(ImageElement {
            content: Some(ImageContent::Image(Image {
                sources: vec![
                    ImageSource {
                        conditions: vec![MediaQueryCondition::DarkLight(DarkLightMode::Dark)],
                        ..ImageSource::new("dark.png")
                    },
                    ImageSource::new("light.png"),
                ],
                tint_color: Some(0xFF00FF00),
            })),
        }));
        let mut adapter = ImageElementAdapter::new_adapter(&params);
        adapter.bind_model(&element, &ctx, &params).unwrap();

        assert_eq!(assets.image_requests.lock()[0].urls, vec!["light.png"]);
        assert_eq!(adapter.view().image().as_deref(), Some("light.png"));
    }

    #[test]
    fn test_load_failure_warns_and_clears() {
        let (assets, params) = fake_params();
        assets.fail_images.store(true, Ordering::SeqCst);
        let ctx = frame_context(&params);
        let mut adapter = ImageElementAdapter::new_adapter(&params);
        adapter
            .bind_model(&image_element("broken.png"), &ctx, &params)
            .unwrap();

        assert_eq!(adapter.view().image(), None);
        assert_eq!(
            ctx.debug_logger().messages(MessageType::Warning),
            vec![r#"Image failed to load: ["broken.png"]"#]
        );
    }

    #[test]
    fn test_completion_after_unbind_is_ignored() {
        let (assets, params) = fake_params();
        assets.deferred.store(true, Ordering::SeqCst);
        let ctx = frame_context(&params);
        let mut adapter = ImageElementAdapter::new_adapter(&params);
        adapter.bind_model(&image_element("slow.png"), &ctx, &params).unwrap();
        adapter.unbind_model(&params);

        assets.complete_pending();
        assert_eq!(adapter.view().image(), None);
    }

    #[test]
    fn test_bound_image() {
        let (_, params) = fake_params();
        let ctx = template_context(
            &params,
            vec![BindingValue::new(
                "hero",
                BoundValue::Image(Image {
                    sources: vec![ImageSource::new("hero.png")],
                    tint_color: None,
                }),
            )],
        );
        let mut adapter = ImageElementAdapter::new_adapter(&params);
        adapter.bind_model(&bound_image("hero", false), &ctx, &params).unwrap();
        assert_eq!(adapter.view().image().as_deref(), Some("hero.png"));

        adapter.bind_model(&bound_image("other", true), &ctx, &params).unwrap();
        assert_eq!(adapter.view().visibility(), Visibility::Gone);

        let err = adapter
            .bind_model(&bound_image("other", false), &ctx, &params)
            .unwrap_err();
        assert_eq!(err.to_string(), "Image binding other had no content");
    }

    #[test]
    fn test_image_without_content_is_fatal() {
        let (_, params) = fake_params();
        let ctx = frame_context(&params);
        let mut adapter = ImageElementAdapter::new_adapter(&params);
        let element = Element::new(ElementKind::Image(ImageElement::default()));
        let err = adapter.bind_model(&element, &ctx, &params).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::UnhandledContent);
    }

    #[test]
    fn test_key_follows_style_size() {
        let (_, params) = fake_params();
        let ctx = frame_context_with_styles(
            &params,
            vec![Style {
                width: Some(10),
                ..Style::new("narrow")
            }],
        );
        let mut a = ImageElementAdapter::new_adapter(&params);
        a.create_adapter(&image_element("x").styles(&["narrow"]), &ctx, &params)
            .unwrap();
        assert_eq!(
            a.key(),
            Some(&RecyclerKey::Image {
                width_px: Some(10),
                height_px: None
            })
        );
    }
}

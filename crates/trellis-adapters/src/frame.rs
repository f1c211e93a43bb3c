//! # Frame adapter
//!
//! Root of one bound screen. Each `bind_model` opens a fresh
//! [`FrameContext`](crate::context::FrameContext) and diagnostics log,
//! adapts the frame's contents and attaches them to a vertical root view.
//! A fatal error stops the pass; what happens to the partial tree depends
//! on [`DebugBehavior`].
//!
//! [`DebugBehavior`]: trellis_core::DebugBehavior

use crate::container::child_layout;
use crate::context::create_frame_context;
use crate::params::AdapterParameters;
use crate::registry::AnyAdapter;
use std::sync::Arc;
use trellis_core::model::{Frame, SharedState};
use trellis_core::{DebugLogger, Dimension, MessageType, Result, ViewHandle};

pub struct FrameAdapter {
    params: Arc<AdapterParameters>,
    view: ViewHandle,
    children: Vec<AnyAdapter>,
    debug_logger: Arc<DebugLogger>,
}

impl std::fmt::Debug for FrameAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameAdapter")
            .field("children", &self.children.len())
            .field("debug_logger", &self.debug_logger)
            .finish()
    }
}

impl FrameAdapter {
    pub fn new(params: Arc<AdapterParameters>) -> Self {
        let view = ViewHandle::column();
        view.set_size(Dimension::MatchParent, Dimension::WrapContent);
        FrameAdapter {
            params,
            view,
            children: Vec::new(),
            debug_logger: Arc::new(DebugLogger::new()),
        }
    }

    pub fn view(&self) -> &ViewHandle {
        &self.view
    }

    /// Diagnostics of the most recent bind.
    pub fn debug_logger(&self) -> &DebugLogger {
        &self.debug_logger
    }

    pub fn child_adapters(&self) -> &[AnyAdapter] {
        &self.children
    }

    pub fn bind_model(
        &mut self,
        frame: &Frame,
        frame_width_px: i32,
        shared_states: &[SharedState],
    ) -> Result<()> {
        self.unbind_model();
        self.debug_logger = Arc::new(DebugLogger::new());

        let result = self.bind_frame(frame, frame_width_px, shared_states);
        let verbose = self.params.config.debug_behavior.show_debug_views();
        if let Err(err) = &result {
            self.debug_logger
                .record_message(MessageType::Error, err.error_code(), err.to_string());
            if !verbose {
                self.unbind_model();
            }
        }
        if verbose {
            for ty in [MessageType::Error, MessageType::Warning] {
                if let Some(report) = self.debug_logger.report_view(ty) {
                    self.view.attach_child(&report);
                }
            }
        }
        result
    }

    fn bind_frame(
        &mut self,
        frame: &Frame,
        frame_width_px: i32,
        shared_states: &[SharedState],
    ) -> Result<()> {
        let params = self.params.clone();
        let ctx = create_frame_context(
            frame,
            frame_width_px,
            shared_states,
            self.debug_logger.clone(),
            &params,
        )?;
        ctx.make_style_for(&frame.style_references).apply_to(&self.view);

        for content in &frame.contents {
            for adapter in params.factories.adapt_content(content, &ctx, &params)? {
                self.attach(adapter);
            }
        }
        log::debug!(
            "bound frame '{}' with {} top-level adapters",
            frame.tag,
            self.children.len()
        );
        Ok(())
    }

    fn attach(&mut self, adapter: AnyAdapter) {
        let view = adapter.view();
        view.set_layout_params(child_layout(
            &adapter,
            Dimension::MatchParent,
            Dimension::WrapContent,
        ));
        self.view.attach_child(view);
        self.children.push(adapter);
    }

    /// Returns every child adapter to its factory and clears the root.
    pub fn unbind_model(&mut self) {
        for adapter in self.children.drain(..) {
            self.params.factories.release_and_recycle(adapter, &self.params);
        }
        self.view.detach_all_children();
        self.params.default_style.apply_to(&self.view);
    }
}

impl Drop for FrameAdapter {
    fn drop(&mut self) {
        self.unbind_model();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::AdapterKind;
    use crate::testing::*;
    use trellis_core::model::{
        BindingContext, BindingRef, Content, Element, SharedState, Style, Stylesheet, Stylesheets,
        Template, TemplateInvocation,
    };
    use trellis_core::{Color, ErrorCode, HostProviders, TrellisConfig};

    const CARD: &str = r#"{
        "tag": "card",
        "stylesheets": {
            "stylesheets": [
                { "stylesheet_id": "inline", "styles": [
                    { "style_id": "root", "background_color": 4294967295 }
                ] }
            ]
        },
        "style_references": { "style_ids": ["root"] },
        "templates": [
            { "template_id": "row", "element": { "kind": { "text": { "content": {
                "parameterized_text_binding": { "binding_id": "label" }
            } } } } }
        ],
        "contents": [
            { "element": { "kind": { "text": { "content": {
                "parameterized_text": { "text": "Title" }
            } } } } },
            { "template_invocation": { "template_id": "row", "binding_contexts": [
                { "binding_values": [
                    { "binding_id": "label", "value": { "parameterized_text": { "text": "one" } } }
                ] },
                { "binding_values": [
                    { "binding_id": "label", "value": { "parameterized_text": { "text": "two" } } }
                ] }
            ] } }
        ]
    }"#;

    fn card() -> Frame {
        serde_json::from_str(CARD).unwrap()
    }

    /// A frame whose second entry needs a binding table it does not have.
    fn broken() -> Frame {
        Frame {
            contents: vec![
                Content::Element(text("ok")),
                Content::BoundElement(BindingRef::new("nowhere")),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_binds_json_frame() {
        init_logging();
        let params = params();
        let mut frame = FrameAdapter::new(params.clone());
        frame.bind_model(&card(), 400, &[]).unwrap();

        assert_eq!(frame.view().background(), Some(Color::from_argb(0xFFFFFFFF)));
        assert_eq!(frame.child_adapters().len(), 3);
        insta::assert_snapshot!(frame.view().dump(), @r#"
        Column
          Text "Title"
          Column
            Text "one"
          Column
            Text "two"
        "#);
    }

    #[test]
    fn test_rebind_reuses_pooled_adapters() {
        let params = params();
        let mut frame = FrameAdapter::new(params.clone());
        frame.bind_model(&card(), 400, &[]).unwrap();
        frame.bind_model(&card(), 400, &[]).unwrap();

        let templates = params.factories.stats(AdapterKind::TemplateInstance);
        assert_eq!(templates.creations, 2);
        assert_eq!(templates.recycled, 2);
        assert_eq!(frame.view().child_count(), 3);

        frame.unbind_model();
        assert_eq!(frame.view().child_count(), 0);
        assert_eq!(frame.view().background(), None);
        assert_eq!(params.factories.template.pooled(), 2);
    }

    fn invoking(body: Element) -> Frame {
        Frame {
            templates: vec![Template {
                template_id: "t".into(),
                element: Some(body),
                ..Default::default()
            }],
            contents: vec![Content::TemplateInvocation(TemplateInvocation {
                template_id: "t".into(),
                binding_contexts: vec![BindingContext::default()],
            })],
            ..Default::default()
        }
    }

    #[test]
    fn test_rebind_with_changed_template_body() {
        let assets = Arc::new(FakeAssets::default());
        let params = params_with(Default::default(), HostProviders::new().assets(assets));
        let mut frame = FrameAdapter::new(params.clone());
        frame.bind_model(&invoking(text("old")), 400, &[]).unwrap();
        frame
            .bind_model(&invoking(image_element("https://example.com/u.png")), 400, &[])
            .unwrap();

        let instance = frame.view().child_at(0).unwrap();
        assert_eq!(
            instance.child_at(0).unwrap().image().as_deref(),
            Some("https://example.com/u.png")
        );
        assert_eq!(params.factories.stats(AdapterKind::TemplateInstance).recycled, 1);
    }

    #[test]
    fn test_rebind_picks_up_updated_shared_stylesheet() {
        let params = params();
        let mut frame = FrameAdapter::new(params.clone());
        let model = Frame {
            stylesheets: Stylesheets {
                stylesheet_ids: vec!["shared".into()],
                stylesheets: vec![],
            },
            contents: vec![Content::Element(text("hi").styles(&["s"]))],
            ..Default::default()
        };
        let shared = |argb: u32| SharedState {
            stylesheets: vec![Stylesheet {
                stylesheet_id: "shared".into(),
                styles: vec![Style {
                    color: Some(argb),
                    ..Style::new("s")
                }],
                conditions: vec![],
            }],
            ..Default::default()
        };

        frame.bind_model(&model, 400, &[shared(0xFFFF0000)]).unwrap();
        assert_eq!(
            frame.child_adapters()[0].element_style().color,
            Color::from_argb(0xFFFF0000)
        );
        frame.bind_model(&model, 400, &[shared(0xFF00FF00)]).unwrap();
        assert_eq!(
            frame.child_adapters()[0].element_style().color,
            Color::from_argb(0xFF00FF00)
        );
    }

    #[test]
    fn test_silent_mode_clears_frame_on_error() {
        let params = params();
        let mut frame = FrameAdapter::new(params.clone());
        let err = frame.bind_model(&broken(), 400, &[]).unwrap_err();

        assert_eq!(err.to_string(), "no BindingValues defined");
        assert_eq!(frame.view().child_count(), 0);
        assert!(frame.child_adapters().is_empty());
        assert_eq!(
            frame.debug_logger().error_codes(),
            vec![ErrorCode::MissingBindingValue]
        );
    }

    #[test]
    fn test_verbose_mode_keeps_partial_tree_and_reports() {
        let params = params_with(TrellisConfig::verbose(), Default::default());
        let mut frame = FrameAdapter::new(params.clone());
        frame.bind_model(&broken(), 400, &[]).unwrap_err();

        insta::assert_snapshot!(frame.view().dump(), @r#"
        Column
          Text "ok"
          Column
            Box
            Text "no BindingValues defined"
        "#);
    }

    #[test]
    fn test_verbose_mode_reports_warnings_after_success() {
        let params = params_with(TrellisConfig::verbose(), Default::default());
        let mut frame = FrameAdapter::new(params.clone());
        let model = Frame {
            contents: vec![Content::Element(text("styled").styles(&["ghost"]))],
            ..Default::default()
        };
        frame.bind_model(&model, 400, &[]).unwrap();

        assert_eq!(frame.view().child_count(), 2);
        assert_eq!(
            frame.debug_logger().messages(MessageType::Warning),
            vec!["Unable to bind style [ghost], style not found in Stylesheet"]
        );

        frame.bind_model(&card(), 400, &[]).unwrap();
        assert!(!frame.debug_logger().has_messages(MessageType::Warning));
        assert_eq!(frame.view().child_count(), 3);
    }
}

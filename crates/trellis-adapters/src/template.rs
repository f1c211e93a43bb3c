//! # Template instances
//!
//! A `TemplateInvocation` yields one instance per binding context. Each
//! instance wraps the adapter tree of the template's element and binds it
//! against a child context built from its binding context.
//!
//! Instances are pooled by template id plus the conditional stylesheets that
//! were active at creation. A released instance keeps its subtree (unbound,
//! not released), so recycling one only needs a rebind. When the template
//! body or a shared stylesheet it references has changed since, the old
//! subtree goes back to the factories and a new one is built.

use crate::adapter::{AdapterBase, LifecyclePhase};
use crate::container::child_layout;
use crate::context::FrameContext;
use crate::factory::Recyclable;
use crate::key::{RecyclerKey, TemplateKey};
use crate::params::AdapterParameters;
use crate::registry::AnyAdapter;
use crate::style::StyleDescriptor;
use std::sync::Arc;
use trellis_core::model::{
    BindingContext, Element, Stylesheet, Template, TemplateInvocation, Visibility,
};
use trellis_core::{Dimension, Result, TrellisError, ViewHandle};

pub struct TemplateInstanceAdapter {
    base: AdapterBase,
    template: Option<Arc<Template>>,
    shared_stylesheets: Vec<Stylesheet>,
    child: Option<Box<AnyAdapter>>,
}

impl std::fmt::Debug for TemplateInstanceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateInstanceAdapter")
            .field("template", &self.template.as_ref().map(|t| &t.template_id))
            .field("phase", &self.base.phase())
            .finish()
    }
}

fn template_element(template: &Template) -> Result<&Element> {
    template.element.as_ref().ok_or(TrellisError::MissingContent {
        kind: "Template element",
    })
}

impl TemplateInstanceAdapter {
    pub fn new_adapter(params: &AdapterParameters) -> Self {
        TemplateInstanceAdapter {
            base: AdapterBase::new(ViewHandle::column(), params.default_style.clone()),
            template: None,
            shared_stylesheets: Vec::new(),
            child: None,
        }
    }

    pub fn template_key(template: &Template, ctx: &FrameContext) -> RecyclerKey {
        RecyclerKey::Template(TemplateKey {
            template_id: template.template_id.clone(),
            media_stylesheet_ids: ctx.media_query_stylesheet_ids(template),
        })
    }

    /// Builds the subtree for `template`, unless this instance already holds
    /// one from an earlier life.
    pub fn create_adapter(
        &mut self,
        template: &Arc<Template>,
        binding_context: &BindingContext,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        match self.base.phase {
            LifecyclePhase::Created | LifecyclePhase::Bound => return Ok(()),
            LifecyclePhase::Uninitialized | LifecyclePhase::Released => {}
        }
        let shared_stylesheets = ctx.referenced_shared_stylesheets(template);
        let same_source = self.template.as_deref() == Some(&**template)
            && self.shared_stylesheets == shared_stylesheets;
        if !same_source {
            self.discard_subtree(params);
        }
        self.base.key = Some(Self::template_key(template, ctx));
        self.template = Some(template.clone());
        self.shared_stylesheets = shared_stylesheets;
        self.base.phase = LifecyclePhase::Created;

        if self.child.is_none() {
            let element = template_element(template)?;
            let child_ctx = ctx.create_template_context(template, binding_context)?;
            let child = params
                .factories
                .create_adapter_for_element(element, &child_ctx, params)?;
            self.base.base_view().attach_child(child.view());
            self.child = Some(Box::new(child));
        } else {
            log::debug!("reusing subtree of template '{}'", template.template_id);
        }
        Ok(())
    }

    fn discard_subtree(&mut self, params: &AdapterParameters) {
        if let Some(child) = self.child.take() {
            log::debug!(
                "template '{}' changed, dropping its old subtree",
                self.template.as_ref().map_or("", |t| t.template_id.as_str())
            );
            self.base.base_view().detach_child(child.view());
            params.factories.release_and_recycle(*child, params);
        }
    }

    pub fn bind_model(
        &mut self,
        template_id: &str,
        binding_context: &BindingContext,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        match self.base.phase {
            LifecyclePhase::Uninitialized | LifecyclePhase::Released => {
                return Err(TrellisError::InvalidState(format!(
                    "template instance '{template_id}' bound before create"
                )));
            }
            LifecyclePhase::Bound => self.unbind_model(params),
            LifecyclePhase::Created => {}
        }
        let template = match &self.template {
            Some(template) if template.template_id == template_id => template.clone(),
            _ => {
                return Err(TrellisError::InvalidState(format!(
                    "template instance rebound to '{template_id}'"
                )));
            }
        };
        self.base.phase = LifecyclePhase::Bound;

        let element = template_element(&template)?;
        let child_ctx = ctx.create_template_context(&template, binding_context)?;
        if let Some(child) = self.child.as_mut() {
            child.bind_element(element, &child_ctx, params)?;
            child.view().set_layout_params(child_layout(
                child,
                Dimension::MatchParent,
                Dimension::WrapContent,
            ));
        }
        Ok(())
    }

    pub fn unbind_model(&mut self, params: &AdapterParameters) {
        if self.base.phase != LifecyclePhase::Bound {
            return;
        }
        if let Some(child) = self.child.as_mut() {
            child.unbind_model(params);
        }
        self.base.phase = LifecyclePhase::Created;
    }

    /// Unbinds but keeps the subtree for the next instance of the template.
    pub fn release_adapter(&mut self, params: &AdapterParameters) {
        match self.base.phase {
            LifecyclePhase::Released => return,
            LifecyclePhase::Bound => {
                log::warn!("template instance released while bound, unbinding first");
                self.unbind_model(params);
            }
            LifecyclePhase::Created | LifecyclePhase::Uninitialized => {}
        }
        self.base.set_visibility(Visibility::Visible);
        self.base.phase = LifecyclePhase::Released;
    }

    pub fn key(&self) -> Option<&RecyclerKey> {
        self.base.key()
    }

    pub fn view(&self) -> &ViewHandle {
        self.base.view()
    }

    pub fn base_view(&self) -> &ViewHandle {
        self.base.base_view()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.base.phase()
    }

    pub fn child(&self) -> Option<&AnyAdapter> {
        self.child.as_deref()
    }

    pub fn computed_width_px(&self) -> Option<i32> {
        self.child.as_ref().and_then(|c| c.computed_width_px())
    }

    pub fn computed_height_px(&self) -> Option<i32> {
        self.child.as_ref().and_then(|c| c.computed_height_px())
    }

    pub fn element_style(&self) -> &Arc<StyleDescriptor> {
        match &self.child {
            Some(child) => child.element_style(),
            None => self.base.style(),
        }
    }
}

impl Recyclable for TemplateInstanceAdapter {
    fn pool_key(&self) -> Option<&RecyclerKey> {
        self.key()
    }

    fn prepare_for_pool(&mut self, params: &AdapterParameters) {
        self.release_adapter(params);
    }
}

pub struct TemplateBinder;

impl TemplateBinder {
    /// One created (not bound) instance per binding context of `invocation`.
    pub fn create_template_adapters(
        invocation: &TemplateInvocation,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<Vec<AnyAdapter>> {
        let template = ctx.get_template(&invocation.template_id)?;
        let key = TemplateInstanceAdapter::template_key(&template, ctx);
        let factory = &params.factories.template;

        let mut adapters = Vec::with_capacity(invocation.binding_contexts.len());
        for binding_context in &invocation.binding_contexts {
            let mut adapter =
                factory.get_with(&key, || TemplateInstanceAdapter::new_adapter(params));
            if let Err(err) = adapter.create_adapter(&template, binding_context, ctx, params) {
                factory.release(adapter, params);
                for created in adapters {
                    params.factories.release_and_recycle(created, params);
                }
                return Err(err);
            }
            adapters.push(AnyAdapter::Template(adapter));
        }
        Ok(adapters)
    }

    pub fn bind_template_adapters(
        adapters: &mut [AnyAdapter],
        invocation: &TemplateInvocation,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        if adapters.len() != invocation.binding_contexts.len() {
            return Err(TrellisError::AdapterCountMismatch);
        }
        for (adapter, binding_context) in adapters.iter_mut().zip(&invocation.binding_contexts) {
            adapter.bind_template(&invocation.template_id, binding_context, ctx, params)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use trellis_core::model::{BindingValue, BoundValue, Frame, ParameterizedText};

    fn title_template() -> Template {
        Template {
            template_id: "card".into(),
            element: Some(bound_text("title", false)),
            ..Default::default()
        }
    }

    fn invocation(titles: &[&str]) -> TemplateInvocation {
        TemplateInvocation {
            template_id: "card".into(),
            binding_contexts: titles
                .iter()
                .map(|t| BindingContext {
                    binding_values: vec![BindingValue::new(
                        "title",
                        BoundValue::ParameterizedText(ParameterizedText::plain(*t)),
                    )],
                })
                .collect(),
        }
    }

    fn ctx_with(params: &AdapterParameters, templates: Vec<Template>) -> FrameContext {
        let frame = Frame {
            templates,
            ..Default::default()
        };
        crate::context::create_frame_context(&frame, 400, &[], Arc::default(), params).unwrap()
    }

    fn titles(adapters: &[AnyAdapter]) -> Vec<String> {
        adapters
            .iter()
            .filter_map(|a| a.view().child_at(0).and_then(|v| v.text()))
            .collect()
    }

    #[test]
    fn test_one_instance_per_binding_context() {
        let params = params();
        let ctx = ctx_with(&params, vec![title_template()]);
        let inv = invocation(&["one", "two"]);

        let mut adapters = TemplateBinder::create_template_adapters(&inv, &ctx, &params).unwrap();
        assert_eq!(adapters.len(), 2);
        TemplateBinder::bind_template_adapters(&mut adapters, &inv, &ctx, &params).unwrap();
        assert_eq!(titles(&adapters), vec!["one", "two"]);
    }

    #[test]
    fn test_unknown_template() {
        let params = params();
        let ctx = ctx_with(&params, vec![]);
        let err = TemplateBinder::create_template_adapters(&invocation(&["x"]), &ctx, &params)
            .unwrap_err();
        assert_eq!(err, TrellisError::TemplateNotFound("card".into()));
    }

    #[test]
    fn test_count_mismatch() {
        let params = params();
        let ctx = ctx_with(&params, vec![title_template()]);
        let mut adapters =
            TemplateBinder::create_template_adapters(&invocation(&["a"]), &ctx, &params).unwrap();
        let err = TemplateBinder::bind_template_adapters(
            &mut adapters,
            &invocation(&["a", "b"]),
            &ctx,
            &params,
        )
        .unwrap_err();
        assert_eq!(err, TrellisError::AdapterCountMismatch);
    }

    #[test]
    fn test_recycled_instance_keeps_subtree() {
        let params = params();
        let ctx = ctx_with(&params, vec![title_template()]);
        let inv = invocation(&["first"]);

        let mut adapters = TemplateBinder::create_template_adapters(&inv, &ctx, &params).unwrap();
        TemplateBinder::bind_template_adapters(&mut adapters, &inv, &ctx, &params).unwrap();
        let inner_view = adapters[0].view().child_at(0).unwrap();
        for adapter in adapters {
            params.factories.release_and_recycle(adapter, &params);
        }
        assert_eq!(params.factories.template.pooled(), 1);
        assert_eq!(params.factories.text.pooled(), 0);

        let again = invocation(&["second"]);
        let mut adapters = TemplateBinder::create_template_adapters(&again, &ctx, &params).unwrap();
        TemplateBinder::bind_template_adapters(&mut adapters, &again, &ctx, &params).unwrap();
        assert!(adapters[0].view().child_at(0).unwrap().ptr_eq(&inner_view));
        assert_eq!(titles(&adapters), vec!["second"]);
        assert_eq!(params.factories.template.stats().recycled, 1);
    }

    #[test]
    fn test_changed_template_body_rebuilds_subtree() {
        let params = params();
        let ctx = ctx_with(&params, vec![title_template()]);
        let inv = invocation(&["first"]);
        let mut adapters = TemplateBinder::create_template_adapters(&inv, &ctx, &params).unwrap();
        TemplateBinder::bind_template_adapters(&mut adapters, &inv, &ctx, &params).unwrap();
        for adapter in adapters {
            params.factories.release_and_recycle(adapter, &params);
        }

        let picture = Template {
            template_id: "card".into(),
            element: Some(image_element("https://example.com/a.png")),
            ..Default::default()
        };
        let ctx = ctx_with(&params, vec![picture]);
        let mut adapters = TemplateBinder::create_template_adapters(&inv, &ctx, &params).unwrap();
        TemplateBinder::bind_template_adapters(&mut adapters, &inv, &ctx, &params).unwrap();

        let AnyAdapter::Template(instance) = &adapters[0] else {
            panic!("expected a template instance");
        };
        assert_eq!(instance.child().map(|c| c.kind()), Some(crate::key::AdapterKind::Image));
        assert_eq!(adapters[0].view().child_count(), 1);
        assert_eq!(params.factories.template.stats().recycled, 1);
        assert_eq!(params.factories.text.pooled(), 1);
    }

    #[test]
    fn test_missing_required_binding_in_instance() {
        let params = params();
        let ctx = ctx_with(&params, vec![title_template()]);
        let inv = TemplateInvocation {
            template_id: "card".into(),
            binding_contexts: vec![BindingContext::default()],
        };
        let mut adapters = TemplateBinder::create_template_adapters(&inv, &ctx, &params).unwrap();
        let err = TemplateBinder::bind_template_adapters(&mut adapters, &inv, &ctx, &params)
            .unwrap_err();
        assert_eq!(err.to_string(), "Text binding title had no content");
    }

    #[test]
    fn test_template_without_element() {
        let params = params();
        let empty = Template {
            template_id: "card".into(),
            ..Default::default()
        };
        let ctx = ctx_with(&params, vec![empty]);
        let err = TemplateBinder::create_template_adapters(&invocation(&["x"]), &ctx, &params)
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing Template element");
        // the failed instance went back to the pool
        assert_eq!(params.factories.template.stats().releases, 1);
    }
}

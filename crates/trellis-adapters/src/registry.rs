//! # Adapter registry
//!
//! `AnyAdapter` closes the set of adapter kinds; dispatch is a plain match.
//! `AdapterFactories` owns one pooled factory per kind and turns model
//! content into created (and, for bound content, bound) adapters.

use crate::adapter::{ElementAdapter, LifecyclePhase};
use crate::context::FrameContext;
use crate::custom::CustomElementAdapter;
use crate::factory::{AdapterFactory, PoolStats, Recyclable};
use crate::grid::GridRowAdapter;
use crate::image::ImageElementAdapter;
use crate::key::{AdapterKind, RecyclerKey};
use crate::list::{ElementListAdapter, ElementStackAdapter};
use crate::params::AdapterParameters;
use crate::style::StyleDescriptor;
use crate::template::{TemplateBinder, TemplateInstanceAdapter};
use crate::text::TextElementAdapter;
use std::sync::Arc;
use trellis_core::model::{BindingContext, Content, Element, ElementKind, Visibility};
use trellis_core::{Result, TrellisConfig, TrellisError, ViewHandle};

macro_rules! impl_recyclable {
    ($($adapter:ty),* $(,)?) => {$(
        impl Recyclable for $adapter {
            fn pool_key(&self) -> Option<&RecyclerKey> {
                ElementAdapter::key(self)
            }

            fn prepare_for_pool(&mut self, params: &AdapterParameters) {
                ElementAdapter::release_adapter(self, params);
            }
        }
    )*};
}

impl_recyclable!(
    TextElementAdapter,
    ImageElementAdapter,
    CustomElementAdapter,
    ElementListAdapter,
    ElementStackAdapter,
    GridRowAdapter,
);

pub enum AnyAdapter {
    Text(TextElementAdapter),
    Image(ImageElementAdapter),
    Custom(CustomElementAdapter),
    List(ElementListAdapter),
    Stack(ElementStackAdapter),
    GridRow(GridRowAdapter),
    Template(TemplateInstanceAdapter),
}

/// Runs `$body` with `$a` bound to whichever adapter `$self` holds.
macro_rules! dispatch {
    ($self:expr, $a:ident => $body:expr) => {
        match $self {
            AnyAdapter::Text($a) => $body,
            AnyAdapter::Image($a) => $body,
            AnyAdapter::Custom($a) => $body,
            AnyAdapter::List($a) => $body,
            AnyAdapter::Stack($a) => $body,
            AnyAdapter::GridRow($a) => $body,
            AnyAdapter::Template($a) => $body,
        }
    };
}

/// Like `dispatch!`, for operations only element adapters support.
macro_rules! dispatch_element {
    ($self:expr, $a:ident => $body:expr, $template:ident => $otherwise:expr) => {
        match $self {
            AnyAdapter::Text($a) => $body,
            AnyAdapter::Image($a) => $body,
            AnyAdapter::Custom($a) => $body,
            AnyAdapter::List($a) => $body,
            AnyAdapter::Stack($a) => $body,
            AnyAdapter::GridRow($a) => $body,
            AnyAdapter::Template($template) => $otherwise,
        }
    };
}

impl std::fmt::Debug for AnyAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyAdapter")
            .field("kind", &self.kind())
            .field("phase", &self.phase())
            .field("view", self.view())
            .finish()
    }
}

impl AnyAdapter {
    pub fn kind(&self) -> AdapterKind {
        match self {
            AnyAdapter::Text(_) => AdapterKind::Text,
            AnyAdapter::Image(_) => AdapterKind::Image,
            AnyAdapter::Custom(_) => AdapterKind::Custom,
            AnyAdapter::List(_) => AdapterKind::List,
            AnyAdapter::Stack(_) => AdapterKind::Stack,
            AnyAdapter::GridRow(_) => AdapterKind::GridRow,
            AnyAdapter::Template(_) => AdapterKind::TemplateInstance,
        }
    }

    pub fn view(&self) -> &ViewHandle {
        dispatch!(self, a => a.view())
    }

    pub fn base_view(&self) -> &ViewHandle {
        dispatch!(self, a => a.base_view())
    }

    pub fn key(&self) -> Option<&RecyclerKey> {
        dispatch!(self, a => a.key())
    }

    pub fn phase(&self) -> LifecyclePhase {
        dispatch!(self, a => a.phase())
    }

    pub fn computed_width_px(&self) -> Option<i32> {
        dispatch!(self, a => a.computed_width_px())
    }

    pub fn computed_height_px(&self) -> Option<i32> {
        dispatch!(self, a => a.computed_height_px())
    }

    pub fn element_style(&self) -> &Arc<StyleDescriptor> {
        dispatch!(self, a => a.element_style())
    }

    pub fn create_element(
        &mut self,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        dispatch_element!(
            self,
            a => a.create_adapter(element, ctx, params),
            _t => Err(TrellisError::InvalidState(
                "template instance created from an element".into()
            ))
        )
    }

    pub fn bind_element(
        &mut self,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        dispatch_element!(
            self,
            a => a.bind_model(element, ctx, params),
            _t => Err(TrellisError::InvalidState(
                "template instance bound to an element".into()
            ))
        )
    }

    pub fn bind_template(
        &mut self,
        template_id: &str,
        binding_context: &BindingContext,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        match self {
            AnyAdapter::Template(t) => t.bind_model(template_id, binding_context, ctx, params),
            other => Err(TrellisError::InvalidState(format!(
                "{:?} adapter bound to template '{template_id}'",
                other.kind()
            ))),
        }
    }

    pub fn unbind_model(&mut self, params: &AdapterParameters) {
        dispatch!(self, a => a.unbind_model(params))
    }

    pub fn release_adapter(&mut self, params: &AdapterParameters) {
        dispatch!(self, a => a.release_adapter(params))
    }
}

/// One pooled factory per adapter kind.
#[derive(Debug)]
pub struct AdapterFactories {
    pub text: AdapterFactory<TextElementAdapter>,
    pub image: AdapterFactory<ImageElementAdapter>,
    pub custom: AdapterFactory<CustomElementAdapter>,
    pub list: AdapterFactory<ElementListAdapter>,
    pub stack: AdapterFactory<ElementStackAdapter>,
    pub grid_row: AdapterFactory<GridRowAdapter>,
    pub template: AdapterFactory<TemplateInstanceAdapter>,
}

impl AdapterFactories {
    pub fn new(config: &TrellisConfig) -> Self {
        AdapterFactories {
            text: AdapterFactory::new(AdapterKind::Text, config),
            image: AdapterFactory::new(AdapterKind::Image, config),
            custom: AdapterFactory::new(AdapterKind::Custom, config),
            list: AdapterFactory::new(AdapterKind::List, config),
            stack: AdapterFactory::new(AdapterKind::Stack, config),
            grid_row: AdapterFactory::new(AdapterKind::GridRow, config),
            template: AdapterFactory::new(AdapterKind::TemplateInstance, config),
        }
    }

    /// Pooled or fresh adapter for `element`'s kind; not created yet.
    pub fn get_adapter_for_element(
        &self,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<AnyAdapter> {
        let adapter = match &element.kind {
            Some(ElementKind::Text(_)) => AnyAdapter::Text(self.text.get(element, ctx, params)?),
            Some(ElementKind::Image(_)) => {
                AnyAdapter::Image(self.image.get(element, ctx, params)?)
            }
            Some(ElementKind::Custom(_)) => {
                AnyAdapter::Custom(self.custom.get(element, ctx, params)?)
            }
            Some(ElementKind::List(_)) => AnyAdapter::List(self.list.get(element, ctx, params)?),
            Some(ElementKind::Stack(_)) => {
                AnyAdapter::Stack(self.stack.get(element, ctx, params)?)
            }
            Some(ElementKind::GridRow(_)) => {
                AnyAdapter::GridRow(self.grid_row.get(element, ctx, params)?)
            }
            None => return Err(TrellisError::UnhandledElement("not set".into())),
        };
        Ok(adapter)
    }

    /// A created adapter for `element`. On failure the adapter goes back to
    /// its factory before the error is returned.
    pub fn create_adapter_for_element(
        &self,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<AnyAdapter> {
        let mut adapter = self.get_adapter_for_element(element, ctx, params)?;
        if let Err(err) = adapter.create_element(element, ctx, params) {
            self.release_and_recycle(adapter, params);
            return Err(err);
        }
        Ok(adapter)
    }

    /// Created adapters for inline content. Bound content has nothing to
    /// create until a binding table is available.
    pub fn create_adapters_for_content(
        &self,
        content: &Content,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<Vec<AnyAdapter>> {
        match content {
            Content::Element(element) => {
                Ok(vec![self.create_adapter_for_element(element, ctx, params)?])
            }
            Content::TemplateInvocation(invocation) => {
                TemplateBinder::create_template_adapters(invocation, ctx, params)
            }
            Content::BoundElement(_) | Content::BoundTemplate(_) => Ok(Vec::new()),
        }
    }

    /// Created and bound adapters for any content.
    pub fn adapt_content(
        &self,
        content: &Content,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<Vec<AnyAdapter>> {
        match content {
            Content::Element(element) => {
                let adapter = self.create_adapter_for_element(element, ctx, params)?;
                self.bind_or_release(adapter, element, ctx, params)
                    .map(|adapter| vec![adapter])
            }
            Content::TemplateInvocation(invocation) => {
                let mut adapters =
                    TemplateBinder::create_template_adapters(invocation, ctx, params)?;
                let bound =
                    TemplateBinder::bind_template_adapters(&mut adapters, invocation, ctx, params);
                match bound {
                    Ok(()) => Ok(adapters),
                    Err(err) => {
                        self.release_all(adapters, params);
                        Err(err)
                    }
                }
            }
            Content::BoundElement(_) | Content::BoundTemplate(_) => {
                self.adapt_bound_content(content, ctx, params)
            }
        }
    }

    /// Resolves bound content through `ctx` and adapts what it names. A
    /// value marked `Gone`, or an empty optional binding, yields nothing.
    pub fn adapt_bound_content(
        &self,
        content: &Content,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<Vec<AnyAdapter>> {
        match content {
            Content::BoundElement(binding) => {
                let value = ctx.get_element_binding_value(binding)?;
                if value.visibility == Some(Visibility::Gone) {
                    return Ok(Vec::new());
                }
                match value.element() {
                    Some(element) => {
                        self.adapt_content(&Content::Element(element.clone()), ctx, params)
                    }
                    None if binding.is_optional => Ok(Vec::new()),
                    None => Err(TrellisError::NoContent {
                        kind: "Element",
                        binding_id: binding.binding_id.clone(),
                    }),
                }
            }
            Content::BoundTemplate(binding) => {
                let value = ctx.get_template_invocation_binding_value(binding)?;
                if value.visibility == Some(Visibility::Gone) {
                    return Ok(Vec::new());
                }
                match value.template_invocation() {
                    Some(invocation) => self.adapt_content(
                        &Content::TemplateInvocation(invocation.clone()),
                        ctx,
                        params,
                    ),
                    None if binding.is_optional => Ok(Vec::new()),
                    None => Err(TrellisError::NoContent {
                        kind: "Template",
                        binding_id: binding.binding_id.clone(),
                    }),
                }
            }
            Content::Element(_) | Content::TemplateInvocation(_) => {
                self.adapt_content(content, ctx, params)
            }
        }
    }

    fn bind_or_release(
        &self,
        mut adapter: AnyAdapter,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<AnyAdapter> {
        match adapter.bind_element(element, ctx, params) {
            Ok(()) => Ok(adapter),
            Err(err) => {
                self.release_and_recycle(adapter, params);
                Err(err)
            }
        }
    }

    pub fn release_and_recycle(&self, adapter: AnyAdapter, params: &AdapterParameters) {
        match adapter {
            AnyAdapter::Text(a) => self.text.release(a, params),
            AnyAdapter::Image(a) => self.image.release(a, params),
            AnyAdapter::Custom(a) => self.custom.release(a, params),
            AnyAdapter::List(a) => self.list.release(a, params),
            AnyAdapter::Stack(a) => self.stack.release(a, params),
            AnyAdapter::GridRow(a) => self.grid_row.release(a, params),
            AnyAdapter::Template(a) => self.template.release(a, params),
        }
    }

    pub fn release_all(&self, adapters: Vec<AnyAdapter>, params: &AdapterParameters) {
        for adapter in adapters {
            self.release_and_recycle(adapter, params);
        }
    }

    pub fn purge_all(&self) {
        self.text.purge();
        self.image.purge();
        self.custom.purge();
        self.list.purge();
        self.stack.purge();
        self.grid_row.purge();
        self.template.purge();
    }

    pub fn stats(&self, kind: AdapterKind) -> PoolStats {
        match kind {
            AdapterKind::Text => self.text.stats(),
            AdapterKind::Image => self.image.stats(),
            AdapterKind::Custom => self.custom.stats(),
            AdapterKind::List => self.list.stats(),
            AdapterKind::Stack => self.stack.stats(),
            AdapterKind::GridRow => self.grid_row.stats(),
            AdapterKind::TemplateInstance => self.template.stats(),
        }
    }
}

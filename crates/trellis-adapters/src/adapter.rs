//! # Element adapter life cycle
//!
//! ```text
//! Uninitialized --create--> Created --bind--> Bound
//!                              ^                |
//!                              +----unbind------+
//! Created/Bound --release--> Released --create--> Created
//! ```
//!
//! [`ElementAdapter`] implements the transitions once; each kind only fills
//! in `on_create`, `on_bind`, `on_unbind` and `on_release`.
//!
//! - `create_adapter` on a Created or Bound adapter is a no-op, so the view
//!   and key keep their identity.
//! - An element whose default visibility is `Gone` skips kind creation; the
//!   first bind that makes it visible runs it.
//! - `bind_model` on a Bound adapter unbinds first. Binding a Released
//!   adapter is an error; it has to be created again.
//! - `release_adapter` unbinds if needed, resets visibility and computed
//!   sizes, and is idempotent.

use crate::context::FrameContext;
use crate::key::{AdapterKind, RecyclerKey};
use crate::params::AdapterParameters;
use crate::style::StyleDescriptor;
use std::sync::Arc;
use trellis_core::model::{BindingRef, Element, StyleIdsStack, Visibility};
use trellis_core::{Result, TrellisError, ViewHandle, ViewKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    Uninitialized,
    Created,
    Bound,
    Released,
}

/// State every adapter kind carries.
#[derive(Debug)]
pub struct AdapterBase {
    view: ViewHandle,
    wrapper: Option<ViewHandle>,
    pub(crate) key: Option<RecyclerKey>,
    pub(crate) phase: LifecyclePhase,
    style: Arc<StyleDescriptor>,
    style_ids: StyleIdsStack,
    computed_width_px: Option<i32>,
    computed_height_px: Option<i32>,
    kind_created: bool,
    kind_bound: bool,
}

impl AdapterBase {
    pub fn new(view: ViewHandle, style: Arc<StyleDescriptor>) -> Self {
        AdapterBase {
            view,
            wrapper: None,
            key: None,
            phase: LifecyclePhase::Uninitialized,
            style,
            style_ids: StyleIdsStack::default(),
            computed_width_px: None,
            computed_height_px: None,
            kind_created: false,
            kind_bound: false,
        }
    }

    /// Outermost view: the rounded-corner/border wrapper if there is one.
    pub fn view(&self) -> &ViewHandle {
        self.wrapper.as_ref().unwrap_or(&self.view)
    }

    pub fn base_view(&self) -> &ViewHandle {
        &self.view
    }

    pub fn key(&self) -> Option<&RecyclerKey> {
        self.key.as_ref()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn style(&self) -> &Arc<StyleDescriptor> {
        &self.style
    }

    pub fn style_ids(&self) -> &StyleIdsStack {
        &self.style_ids
    }

    pub fn computed_width_px(&self) -> Option<i32> {
        self.computed_width_px
    }

    pub fn computed_height_px(&self) -> Option<i32> {
        self.computed_height_px
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        self.view().set_visibility(visibility);
    }

    /// Empty optional bindings hide the view; empty required ones are fatal.
    pub fn hide_for_absent_binding(
        &self,
        binding: &BindingRef,
        kind: &'static str,
    ) -> Result<()> {
        if binding.is_optional {
            self.set_visibility(Visibility::Gone);
            Ok(())
        } else {
            Err(TrellisError::NoContent {
                kind,
                binding_id: binding.binding_id.clone(),
            })
        }
    }

    /// Applies `style`. The wrapper view is only created on `create`; a
    /// restyle during bind reuses whatever structure is already there.
    pub(crate) fn set_style(
        &mut self,
        style: Arc<StyleDescriptor>,
        params: &AdapterParameters,
        create: bool,
    ) {
        self.computed_width_px = style.width_px;
        self.computed_height_px = style.height_px;

        if create && style.needs_wrapper() && self.wrapper.is_none() {
            let wrapper = ViewHandle::new(ViewKind::Box);
            wrapper.attach_child(&self.view);
            self.wrapper = Some(wrapper);
        }

        match &self.wrapper {
            Some(wrapper) => {
                self.view.set_padding(style.padding);
                self.view.set_background(None);
                wrapper.set_background(style.background);
                wrapper.set_opacity(style.opacity);
                wrapper.set_border(style.border);
                wrapper.set_corner_mask(
                    style
                        .has_rounded_corners()
                        .then(|| params.mask_cache.mask(style.corner_radius_px, style.corners)),
                );
            }
            None => style.apply_to(&self.view),
        }
        self.style = style;
    }

    fn reset(&mut self, params: &AdapterParameters) {
        if let Some(wrapper) = self.wrapper.take() {
            wrapper.detach_all_children();
        }
        self.view.set_visibility(Visibility::Visible);
        self.view.set_content_description(None);
        self.computed_width_px = None;
        self.computed_height_px = None;
        self.style = params.default_style.clone();
        self.kind_created = false;
        self.kind_bound = false;
        self.phase = LifecyclePhase::Released;
    }
}

fn resolve_visibility(element: &Element, ctx: &FrameContext) -> Visibility {
    element
        .visibility_state
        .as_ref()
        .and_then(|state| state.overriding_bound_visibility.as_ref())
        .and_then(|binding| ctx.visibility_from_binding(binding))
        .unwrap_or_else(|| element.default_visibility())
}

pub trait ElementAdapter: Send + Sized + 'static {
    type Model;
    const KIND: AdapterKind;

    fn new_adapter(params: &AdapterParameters) -> Self;
    fn base(&self) -> &AdapterBase;
    fn base_mut(&mut self) -> &mut AdapterBase;

    /// The kind-specific model; `MissingContent` when `element` is some
    /// other kind.
    fn model_from_element(element: &Element) -> Result<&Self::Model>;

    fn recycler_key(
        _model: &Self::Model,
        _element: &Element,
        _ctx: &FrameContext,
        _params: &AdapterParameters,
    ) -> RecyclerKey {
        RecyclerKey::Singleton(Self::KIND)
    }

    fn on_create(
        &mut self,
        model: &Self::Model,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()>;

    fn on_bind(
        &mut self,
        model: &Self::Model,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()>;

    fn on_unbind(&mut self, params: &AdapterParameters);

    fn on_release(&mut self, _params: &AdapterParameters) {}

    fn create_adapter(
        &mut self,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        match self.base().phase {
            LifecyclePhase::Created | LifecyclePhase::Bound => return Ok(()),
            LifecyclePhase::Uninitialized | LifecyclePhase::Released => {}
        }
        let model = Self::model_from_element(element)?;
        let key = Self::recycler_key(model, element, ctx, params);
        let style = ctx.make_style_for(&element.style_references);

        let base = self.base_mut();
        base.key = Some(key);
        base.style_ids = element.style_references.clone();
        base.set_style(style, params, true);
        base.phase = LifecyclePhase::Created;

        let visibility = element.default_visibility();
        base.set_visibility(visibility);
        if visibility == Visibility::Gone {
            log::debug!("{:?}: gone at create, deferring", Self::KIND);
            return Ok(());
        }
        self.run_create(model, element, ctx, params)
    }

    #[doc(hidden)]
    fn run_create(
        &mut self,
        model: &Self::Model,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        // Marked before the call so a partial create is still released.
        self.base_mut().kind_created = true;
        self.on_create(model, element, ctx, params)
    }

    fn bind_model(
        &mut self,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        match self.base().phase {
            LifecyclePhase::Uninitialized => self.create_adapter(element, ctx, params)?,
            LifecyclePhase::Released => {
                return Err(TrellisError::InvalidState(format!(
                    "{:?} adapter bound after release",
                    Self::KIND
                )));
            }
            LifecyclePhase::Bound => self.unbind_model(params),
            LifecyclePhase::Created => {}
        }
        let model = Self::model_from_element(element)?;

        let visibility = resolve_visibility(element, ctx);
        self.base().set_visibility(visibility);
        self.base_mut().phase = LifecyclePhase::Bound;
        if visibility == Visibility::Gone {
            return Ok(());
        }
        if !self.base().kind_created {
            self.run_create(model, element, ctx, params)?;
        }

        if element.style_references.style_binding.is_some() {
            let style = ctx.make_style_for(&element.style_references);
            self.base_mut().set_style(style, params, false);
        }
        bind_accessibility(self.base(), element, ctx, params)?;

        self.base_mut().kind_bound = true;
        self.on_bind(model, element, ctx, params)
    }

    fn unbind_model(&mut self, params: &AdapterParameters) {
        if self.base().kind_bound {
            self.on_unbind(params);
            self.base_mut().kind_bound = false;
        }
        if self.base().phase == LifecyclePhase::Bound {
            self.base_mut().phase = LifecyclePhase::Created;
        }
    }

    fn release_adapter(&mut self, params: &AdapterParameters) {
        match self.base().phase {
            LifecyclePhase::Released => return,
            LifecyclePhase::Bound => {
                log::warn!("{:?}: released while bound, unbinding first", Self::KIND);
                self.unbind_model(params);
            }
            LifecyclePhase::Created | LifecyclePhase::Uninitialized => {}
        }
        if self.base().kind_created {
            self.on_release(params);
        }
        self.base_mut().reset(params);
    }

    fn key(&self) -> Option<&RecyclerKey> {
        self.base().key()
    }

    fn view(&self) -> &ViewHandle {
        self.base().view()
    }

    fn base_view(&self) -> &ViewHandle {
        self.base().base_view()
    }

    fn phase(&self) -> LifecyclePhase {
        self.base().phase()
    }

    fn computed_width_px(&self) -> Option<i32> {
        self.base().computed_width_px()
    }

    fn computed_height_px(&self) -> Option<i32> {
        self.base().computed_height_px()
    }

    fn element_style(&self) -> &Arc<StyleDescriptor> {
        self.base().style()
    }

    fn element_style_ids(&self) -> &StyleIdsStack {
        self.base().style_ids()
    }
}

fn bind_accessibility(
    base: &AdapterBase,
    element: &Element,
    ctx: &FrameContext,
    params: &AdapterParameters,
) -> Result<()> {
    let mut description = None;
    if let Some(a11y) = &element.accessibility {
        if let Some(text) = &a11y.description {
            description = Some(params.text_evaluator.evaluate(text));
        } else if let Some(binding) = &a11y.description_binding {
            let value = ctx.get_parameterized_text_binding_value(binding)?;
            description = value
                .parameterized_text()
                .map(|t| params.text_evaluator.evaluate(t));
        }
    }
    base.view()
        .set_content_description(description.filter(|d| !d.is_empty()));
    Ok(())
}

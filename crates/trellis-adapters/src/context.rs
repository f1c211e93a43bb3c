//! # Frame context
//!
//! Everything an adapter may look up while binding: resolved styles, the
//! template table and, inside a template instance, the binding table.
//!
//! A frame-level context has no binding table; asking it for a binding is
//! fatal. Template instances get a child context with their own table and
//! their own stylesheets. Frame styles are not inherited.
//!
//! Missing ids are not errors here. Getters hand back an empty value with
//! the requested id, and the adapter decides from `BindingRef::is_optional`
//! whether that hides the view or fails the bind.

use crate::media::MediaQueryHelper;
use crate::params::AdapterParameters;
use crate::style::{StyleDescriptor, StyleMap, StyleResolver, StylesheetCache};
use ahash::AHashMap;
use std::sync::Arc;
use trellis_core::model::{
    BindingContext, BindingRef, BindingValue, BoundStyle, Frame, GridCellWidth, Image,
    SharedState, StyleIdsStack, Stylesheet, Stylesheets, Template, Visibility,
};
use trellis_core::{
    DebugLogger, ErrorCode, HostBindingProvider, MessageType, Result, TextDirection, TrellisError,
};

pub struct FrameContext {
    styles: StyleResolver,
    templates: Arc<AHashMap<String, Arc<Template>>>,
    shared_stylesheets: Arc<AHashMap<String, Stylesheet>>,
    bindings: Option<AHashMap<String, BindingValue>>,
    debug_logger: Arc<DebugLogger>,
    media: MediaQueryHelper,
    host_bindings: Arc<dyn HostBindingProvider>,
    stylesheet_cache: Arc<StylesheetCache>,
    density: f32,
    direction: TextDirection,
}

impl std::fmt::Debug for FrameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameContext")
            .field("styles", &self.styles.len())
            .field("templates", &self.templates.len())
            .field("bindings", &self.bindings.as_ref().map(|b| b.len()))
            .field("media", &self.media)
            .finish()
    }
}

/// Builds the root context for one render pass of `frame`.
pub fn create_frame_context(
    frame: &Frame,
    frame_width_px: i32,
    shared_states: &[SharedState],
    debug_logger: Arc<DebugLogger>,
    params: &AdapterParameters,
) -> Result<FrameContext> {
    let assets = &params.host.assets;
    let dark_theme = params
        .config
        .dark_theme
        .unwrap_or_else(|| assets.is_dark_theme());
    let direction = if assets.is_rtl() {
        TextDirection::Rtl
    } else {
        TextDirection::Ltr
    };
    let density = params.config.density;
    let media = MediaQueryHelper::new(frame_width_px, density, dark_theme);

    let mut templates = AHashMap::new();
    let frame_templates = frame.templates.iter();
    let shared_templates = shared_states.iter().flat_map(|s| s.templates.iter());
    for template in frame_templates.chain(shared_templates) {
        if templates.contains_key(&template.template_id) {
            return Err(TrellisError::DuplicateKey {
                what: "Template",
                key: template.template_id.clone(),
            });
        }
        templates.insert(template.template_id.clone(), Arc::new(template.clone()));
    }

    let mut shared_stylesheets = AHashMap::new();
    for sheet in shared_states.iter().flat_map(|s| s.stylesheets.iter()) {
        shared_stylesheets.insert(sheet.stylesheet_id.clone(), sheet.clone());
    }

    let stylesheet_cache = params.stylesheet_cache.clone();
    let styles = build_style_map(
        &frame.stylesheets,
        &shared_stylesheets,
        &media,
        &stylesheet_cache,
        &debug_logger,
    );
    log::debug!(
        "frame '{}': {} templates, {} styles, {:?}",
        frame.tag,
        templates.len(),
        styles.len(),
        media
    );

    Ok(FrameContext {
        styles: StyleResolver::new(styles, density, direction),
        templates: Arc::new(templates),
        shared_stylesheets: Arc::new(shared_stylesheets),
        bindings: None,
        debug_logger,
        media,
        host_bindings: params.host.host_bindings.clone(),
        stylesheet_cache,
        density,
        direction,
    })
}

/// Styles from the referenced shared sheets, then inline ones; later sheets
/// win on id clashes. Sheets whose media conditions fail are skipped.
fn build_style_map(
    stylesheets: &Stylesheets,
    shared: &AHashMap<String, Stylesheet>,
    media: &MediaQueryHelper,
    cache: &StylesheetCache,
    debug_logger: &DebugLogger,
) -> StyleMap {
    let mut styles = StyleMap::new();
    for id in &stylesheets.stylesheet_ids {
        let Some(sheet) = shared.get(id) else {
            debug_logger.record_message(
                MessageType::Warning,
                ErrorCode::MissingStylesheet,
                format!("Stylesheet [{id}] not found"),
            );
            continue;
        };
        if media.are_conditions_met(&sheet.conditions) {
            let indexed = cache.index(sheet);
            styles.extend(indexed.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    for sheet in media.filter_stylesheets(&stylesheets.stylesheets) {
        styles.extend(sheet.styles.iter().map(|s| (s.style_id.clone(), s.clone())));
    }
    styles
}

impl FrameContext {
    /// Child context for one instance of `template`.
    pub fn create_template_context(
        &self,
        template: &Template,
        binding_context: &BindingContext,
    ) -> Result<FrameContext> {
        let mut bindings = AHashMap::with_capacity(binding_context.binding_values.len());
        for value in &binding_context.binding_values {
            if bindings.contains_key(&value.binding_id) {
                return Err(TrellisError::DuplicateKey {
                    what: "BindingValue",
                    key: value.binding_id.clone(),
                });
            }
            let resolved = match &value.binding_id_from_transcluding_template {
                Some(parent_id) => match self.lookup(parent_id) {
                    Some(parent) => BindingValue {
                        binding_id: value.binding_id.clone(),
                        binding_id_from_transcluding_template: None,
                        ..parent.clone()
                    },
                    None => {
                        log::debug!(
                            "binding '{}' transcludes '{parent_id}', which the parent lacks",
                            value.binding_id
                        );
                        continue;
                    }
                },
                None => value.clone(),
            };
            bindings.insert(value.binding_id.clone(), resolved);
        }

        let styles = build_style_map(
            &template.stylesheets,
            &self.shared_stylesheets,
            &self.media,
            &self.stylesheet_cache,
            &self.debug_logger,
        );

        Ok(FrameContext {
            styles: StyleResolver::new(styles, self.density, self.direction),
            templates: self.templates.clone(),
            shared_stylesheets: self.shared_stylesheets.clone(),
            bindings: Some(bindings),
            debug_logger: self.debug_logger.clone(),
            media: self.media,
            host_bindings: self.host_bindings.clone(),
            stylesheet_cache: self.stylesheet_cache.clone(),
            density: self.density,
            direction: self.direction,
        })
    }

    fn lookup(&self, binding_id: &str) -> Option<&BindingValue> {
        self.bindings.as_ref()?.get(binding_id)
    }

    fn binding_value(&self, binding: &BindingRef, kind: &str) -> Result<BindingValue> {
        let table = self.bindings.as_ref().ok_or(TrellisError::NoBindingContext)?;
        match table.get(&binding.binding_id) {
            Some(value) if value.host_binding_data.is_some() => {
                Ok(self.host_bindings.resolve(value))
            }
            Some(value) => Ok(value.clone()),
            None => {
                if !binding.is_optional {
                    log::debug!("{kind} binding '{}' not found", binding.binding_id);
                }
                Ok(BindingValue::empty(binding.binding_id.as_str()))
            }
        }
    }

    pub fn get_parameterized_text_binding_value(
        &self,
        binding: &BindingRef,
    ) -> Result<BindingValue> {
        self.binding_value(binding, "ParameterizedText")
    }

    pub fn get_chunked_text_binding_value(&self, binding: &BindingRef) -> Result<BindingValue> {
        self.binding_value(binding, "ChunkedText")
    }

    pub fn get_image_binding_value(&self, binding: &BindingRef) -> Result<BindingValue> {
        self.binding_value(binding, "Image")
    }

    pub fn get_element_binding_value(&self, binding: &BindingRef) -> Result<BindingValue> {
        self.binding_value(binding, "Element")
    }

    pub fn get_custom_element_binding_value(&self, binding: &BindingRef) -> Result<BindingValue> {
        self.binding_value(binding, "CustomElement")
    }

    pub fn get_template_invocation_binding_value(
        &self,
        binding: &BindingRef,
    ) -> Result<BindingValue> {
        self.binding_value(binding, "TemplateInvocation")
    }

    pub fn visibility_from_binding(&self, binding: &BindingRef) -> Option<Visibility> {
        self.lookup(&binding.binding_id)?.visibility
    }

    pub fn grid_cell_width_from_binding(&self, binding: &BindingRef) -> Option<GridCellWidth> {
        self.lookup(&binding.binding_id)?.cell_width().cloned()
    }

    pub fn style_from_binding(&self, binding: &BindingRef) -> BoundStyle {
        self.lookup(&binding.binding_id)
            .and_then(|v| v.bound_style())
            .cloned()
            .unwrap_or_default()
    }

    pub fn make_style_for(&self, stack: &StyleIdsStack) -> Arc<StyleDescriptor> {
        let bound = stack
            .style_binding
            .as_ref()
            .map(|binding| self.style_from_binding(binding));
        self.styles.resolve(stack, bound.as_ref(), &self.debug_logger)
    }

    pub fn get_template(&self, template_id: &str) -> Result<Arc<Template>> {
        self.templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| TrellisError::TemplateNotFound(template_id.to_string()))
    }

    pub fn report_message(
        &self,
        ty: MessageType,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> String {
        self.debug_logger.record_message(ty, code, message)
    }

    pub fn debug_logger(&self) -> &DebugLogger {
        &self.debug_logger
    }

    /// For completion callbacks that outlive the bind call.
    pub(crate) fn shared_debug_logger(&self) -> Arc<DebugLogger> {
        self.debug_logger.clone()
    }

    pub fn media(&self) -> &MediaQueryHelper {
        &self.media
    }

    pub fn direction(&self) -> TextDirection {
        self.direction
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn has_bindings(&self) -> bool {
        self.bindings.is_some()
    }

    pub fn filter_image_sources_by_media_query_condition(&self, image: &Image) -> Image {
        self.media.filter_image_sources(image)
    }

    /// Shared stylesheets `template` references, as this frame ships them.
    pub fn referenced_shared_stylesheets(&self, template: &Template) -> Vec<Stylesheet> {
        template
            .stylesheets
            .stylesheet_ids
            .iter()
            .filter_map(|id| self.shared_stylesheets.get(id).cloned())
            .collect()
    }

    /// Ids of the conditional stylesheets `template` uses that are active
    /// for this frame. Unconditional sheets never change, so they are left
    /// out.
    pub fn media_query_stylesheet_ids(&self, template: &Template) -> Vec<String> {
        let shared = template
            .stylesheets
            .stylesheet_ids
            .iter()
            .filter_map(|id| self.shared_stylesheets.get(id));
        shared
            .chain(template.stylesheets.stylesheets.iter())
            .filter(|s| !s.conditions.is_empty() && self.media.are_conditions_met(&s.conditions))
            .map(|s| s.stylesheet_id.clone())
            .collect()
    }
}

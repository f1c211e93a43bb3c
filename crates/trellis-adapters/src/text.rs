use crate::adapter::{AdapterBase, ElementAdapter};
use crate::context::FrameContext;
use crate::key::{AdapterKind, RecyclerKey};
use crate::params::AdapterParameters;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use trellis_core::model::{
    BindingRef, ChunkedText, CommonTypeface, Element, ElementKind, TextChunk, TextContent,
    TextElement, Typeface,
};
use trellis_core::{
    AssetProvider, DebugLogger, ErrorCode, MessageType, Result, TextSpan, TrellisError,
    ViewHandle, ViewKind,
};

/// Stands in for an inline image inside chunked text.
pub const IMAGE_PLACEHOLDER: char = '\u{FFFC}';

pub struct TextElementAdapter {
    base: AdapterBase,
    typeface_load: Option<Arc<AtomicBool>>,
}

impl ElementAdapter for TextElementAdapter {
    type Model = TextElement;
    const KIND: AdapterKind = AdapterKind::Text;

    fn new_adapter(params: &AdapterParameters) -> Self {
        TextElementAdapter {
            base: AdapterBase::new(
                ViewHandle::new(ViewKind::text()),
                params.default_style.clone(),
            ),
            typeface_load: None,
        }
    }

    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AdapterBase {
        &mut self.base
    }

    fn model_from_element(element: &Element) -> Result<&TextElement> {
        match &element.kind {
            Some(ElementKind::Text(text)) => Ok(text),
            _ => Err(TrellisError::MissingContent {
                kind: "TextElement",
            }),
        }
    }

    /// Text views are only interchangeable when their fonts match.
    fn recycler_key(
        _model: &TextElement,
        element: &Element,
        ctx: &FrameContext,
        _params: &AdapterParameters,
    ) -> RecyclerKey {
        RecyclerKey::Text(ctx.make_style_for(&element.style_references).font.clone())
    }

    fn on_create(
        &mut self,
        _model: &TextElement,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        let style = self.base.style().clone();
        let font_px = style.font.size_sp as f32 * params.config.density;
        self.base.base_view().update(|node| {
            if let ViewKind::Text {
                color,
                font_size,
                italic,
                max_lines,
                alignment,
                ..
            } = &mut node.kind
            {
                *color = style.color;
                *font_size = font_px;
                *italic = style.font.italic;
                *max_lines = style.max_lines;
                *alignment = style.text_alignment;
            }
        });
        self.load_typeface(&style.font.typefaces, style.font.italic, ctx, params);
        Ok(())
    }

    fn on_bind(
        &mut self,
        model: &TextElement,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        let view = self.base.base_view();
        match &model.content {
            Some(TextContent::ParameterizedText(text)) => {
                view.set_text(params.text_evaluator.evaluate(text));
            }
            Some(TextContent::ParameterizedTextBinding(binding)) => {
                let value = ctx.get_parameterized_text_binding_value(binding)?;
                match value.parameterized_text() {
                    Some(text) => view.set_text(params.text_evaluator.evaluate(text)),
                    None => self.clear_for_absent(binding)?,
                }
            }
            Some(TextContent::ChunkedText(chunks)) => bind_chunked(view, chunks, ctx, params),
            Some(TextContent::ChunkedTextBinding(binding)) => {
                let value = ctx.get_chunked_text_binding_value(binding)?;
                match value.chunked_text() {
                    Some(chunks) => bind_chunked(view, chunks, ctx, params),
                    None => self.clear_for_absent(binding)?,
                }
            }
            None => {
                ctx.report_message(
                    MessageType::Warning,
                    ErrorCode::MissingOrUnhandledContent,
                    "TextElement missing or unhandled content",
                );
                view.set_text("");
            }
        }
        Ok(())
    }

    fn on_unbind(&mut self, _params: &AdapterParameters) {
        self.base.base_view().set_text("");
    }

    fn on_release(&mut self, _params: &AdapterParameters) {
        if let Some(load) = self.typeface_load.take() {
            load.store(true, Ordering::Release);
        }
        self.base.base_view().set_typeface(None);
    }
}

impl TextElementAdapter {
    fn clear_for_absent(&self, binding: &BindingRef) -> Result<()> {
        self.base.base_view().set_text("");
        self.base.hide_for_absent_binding(binding, "Text")
    }

    fn load_typeface(
        &mut self,
        typefaces: &[Typeface],
        italic: bool,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) {
        if let Some(previous) = self.typeface_load.take() {
            previous.store(true, Ordering::Release);
        }
        if typefaces.is_empty() {
            self.base.base_view().set_typeface(None);
            return;
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        self.typeface_load = Some(cancelled.clone());
        TypefaceRequest {
            typefaces: typefaces.to_vec(),
            italic,
            view: self.base.base_view().clone(),
            cancelled,
            assets: params.host.assets.clone(),
            debug_logger: ctx.shared_debug_logger(),
        }
        .load(0);
    }
}

/// Walks the typeface list until one loads. Common families resolve
/// locally; custom ones go through the asset provider.
struct TypefaceRequest {
    typefaces: Vec<Typeface>,
    italic: bool,
    view: ViewHandle,
    cancelled: Arc<AtomicBool>,
    assets: Arc<dyn AssetProvider>,
    debug_logger: Arc<DebugLogger>,
}

impl TypefaceRequest {
    fn load(self, index: usize) {
        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        let family = match self.typefaces.get(index) {
            Some(Typeface::Common(common)) => {
                self.view.set_typeface(Some(common_family(*common).to_string()));
                return;
            }
            Some(Typeface::Custom(family)) => family.clone(),
            None => {
                self.debug_logger.record_message(
                    MessageType::Warning,
                    ErrorCode::TypefaceLoadFailed,
                    format!("Could not load any of typefaces {:?}", self.typefaces),
                );
                self.view.set_typeface(None);
                return;
            }
        };
        let assets = self.assets.clone();
        let italic = self.italic;
        let requested = family.clone();
        assets.get_typeface(
            &requested,
            italic,
            Box::new(move |loaded| {
                if self.cancelled.load(Ordering::Acquire) {
                    return;
                }
                match loaded {
                    Some(name) => self.view.set_typeface(Some(name)),
                    None => {
                        log::debug!("typeface {family} unavailable, trying next");
                        self.load(index + 1);
                    }
                }
            }),
        );
    }
}

fn common_family(typeface: CommonTypeface) -> &'static str {
    match typeface {
        CommonTypeface::PlatformDefaultRegular => "sans-serif",
        CommonTypeface::PlatformDefaultMedium => "sans-serif-medium",
    }
}

fn bind_chunked(
    view: &ViewHandle,
    chunked: &ChunkedText,
    ctx: &FrameContext,
    params: &AdapterParameters,
) {
    let mut text = String::new();
    let mut spans = Vec::new();
    for chunk in &chunked.chunks {
        let start = text.len();
        match chunk {
            TextChunk::StyledText {
                text: chunk_text,
                style_references,
            } => {
                text.push_str(&params.text_evaluator.evaluate(chunk_text));
                let styled = !style_references.style_ids.is_empty()
                    || style_references.style_binding.is_some();
                if styled {
                    let style = ctx.make_style_for(style_references);
                    spans.push(TextSpan {
                        start,
                        end: text.len(),
                        color: Some(style.color),
                        font_size: Some(style.font.size_sp as f32 * params.config.density),
                        image_url: None,
                    });
                }
            }
            TextChunk::Image(image) => {
                let image = ctx.filter_image_sources_by_media_query_condition(image);
                text.push(IMAGE_PLACEHOLDER);
                spans.push(TextSpan {
                    start,
                    end: text.len(),
                    color: None,
                    font_size: None,
                    image_url: image.sources.first().map(|s| s.url.clone()),
                });
            }
        }
    }
    view.set_text_with_spans(text, spans);
}

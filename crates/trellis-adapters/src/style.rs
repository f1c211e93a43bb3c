//! # Style resolution
//!
//! A `StyleIdsStack` names styles from the active stylesheets. Resolution
//! overlays them in order onto an empty `Style`, applies any bound style last,
//! and turns the result into an immutable [`StyleDescriptor`] in pixels.
//! Descriptors are shared as `Arc` and replaced, never edited.

use ahash::AHashMap;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::Arc;
use trellis_core::model::{
    BoundStyle, EdgeWidths, FontWeight, HorizontalAlignment, Style, StyleIdsStack, Stylesheet,
    Typeface, VerticalAlignment,
};
use trellis_core::{
    Color, Corners, DebugLogger, ErrorCode, Gravity, HorizontalGravity, Insets, LayoutParams,
    MessageType, TextDirection, VerticalGravity, ViewHandle, dp_to_px,
};

pub const DEFAULT_FONT_SIZE_SP: u32 = 14;

/// Style id to style, for the stylesheets active in one context.
pub type StyleMap = AHashMap<String, Style>;

/// Resolved font. Text adapters are only recycled between equal fonts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub size_sp: u32,
    pub weight: FontWeight,
    pub italic: bool,
    pub line_height_sp: Option<u32>,
    pub typefaces: Vec<Typeface>,
}

impl Default for FontSpec {
    fn default() -> Self {
        FontSpec {
            size_sp: DEFAULT_FONT_SIZE_SP,
            weight: FontWeight::Regular,
            italic: false,
            line_height_sp: None,
            typefaces: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyleDescriptor {
    pub color: Color,
    pub background: Option<Color>,
    pub font: FontSpec,
    /// Zero means unlimited.
    pub max_lines: u32,
    pub text_alignment: HorizontalGravity,
    pub gravity: Gravity,
    pub padding: Insets,
    pub margins: Insets,
    pub width_px: Option<i32>,
    pub height_px: Option<i32>,
    pub corner_radius_px: u32,
    pub corners: Corners,
    pub border: Option<(i32, Color)>,
    pub opacity: f32,
    pub direction: TextDirection,
}

impl Default for StyleDescriptor {
    fn default() -> Self {
        StyleDescriptor::resolve(&Style::default(), 1.0, TextDirection::Ltr)
    }
}

fn horizontal(a: Option<HorizontalAlignment>) -> HorizontalGravity {
    match a {
        Some(HorizontalAlignment::Center) => HorizontalGravity::Center,
        Some(HorizontalAlignment::End) => HorizontalGravity::End,
        Some(HorizontalAlignment::Start) | None => HorizontalGravity::Start,
    }
}

fn vertical(a: Option<VerticalAlignment>) -> VerticalGravity {
    match a {
        Some(VerticalAlignment::Middle) => VerticalGravity::Middle,
        Some(VerticalAlignment::Bottom) => VerticalGravity::Bottom,
        Some(VerticalAlignment::Top) | None => VerticalGravity::Top,
    }
}

fn insets(edges: Option<&EdgeWidths>, density: f32, direction: TextDirection) -> Insets {
    let Some(e) = edges else {
        return Insets::ZERO;
    };
    let px = |v: Option<u32>| dp_to_px(v.unwrap_or(0) as f32, density);
    let (start, end) = (px(e.start), px(e.end));
    let (left, right) = match direction {
        TextDirection::Ltr => (start, end),
        TextDirection::Rtl => (end, start),
    };
    Insets {
        left,
        right,
        top: px(e.top),
        bottom: px(e.bottom),
    }
}

impl StyleDescriptor {
    pub fn resolve(style: &Style, density: f32, direction: TextDirection) -> Self {
        let font = style
            .font
            .as_ref()
            .map(|f| FontSpec {
                size_sp: f.size.unwrap_or(DEFAULT_FONT_SIZE_SP),
                weight: f.weight.unwrap_or_default(),
                italic: f.italic.unwrap_or(false),
                line_height_sp: f.line_height,
                typefaces: f.typeface.clone(),
            })
            .unwrap_or_default();

        let (corner_radius_px, corners) = match &style.rounded_corners {
            Some(rc) => (
                dp_to_px(rc.radius.unwrap_or(0) as f32, density).max(0) as u32,
                Corners::from_model_bits(rc.bitmask.unwrap_or(0)).to_physical(direction),
            ),
            None => (0, Corners::empty()),
        };

        let border = style.borders.as_ref().and_then(|b| {
            let width = dp_to_px(b.width.unwrap_or(0) as f32, density);
            (width > 0).then(|| (width, Color::from_argb(b.color.unwrap_or(0xFF000000))))
        });

        StyleDescriptor {
            color: style.color.map(Color::from_argb).unwrap_or(Color::BLACK),
            background: style.background_color.map(Color::from_argb),
            font,
            max_lines: style.max_lines.unwrap_or(0),
            text_alignment: horizontal(style.text_alignment_horizontal),
            gravity: Gravity {
                horizontal: horizontal(style.gravity_horizontal),
                vertical: vertical(style.gravity_vertical),
            },
            padding: insets(style.padding.as_ref(), density, direction),
            margins: insets(style.margins.as_ref(), density, direction),
            width_px: style.width.map(|w| dp_to_px(w as f32, density)),
            height_px: style.height.map(|h| dp_to_px(h as f32, density)),
            corner_radius_px,
            corners,
            border,
            opacity: style.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
            direction,
        }
    }

    pub fn has_rounded_corners(&self) -> bool {
        self.corner_radius_px > 0 && !self.corners.is_empty()
    }

    pub fn has_borders(&self) -> bool {
        self.border.is_some()
    }

    /// Rounded corners and borders are drawn by a wrapper around the view.
    pub fn needs_wrapper(&self) -> bool {
        self.has_rounded_corners() || self.has_borders()
    }

    /// Padding, background and opacity; margins belong to the parent.
    pub fn apply_to(&self, view: &ViewHandle) {
        view.set_padding(self.padding);
        view.set_background(self.background);
        view.set_opacity(self.opacity);
    }

    pub fn apply_margins(&self, params: &mut LayoutParams) {
        params.margins = self.margins;
    }
}

/// Resolves style stacks against one context's styles, caching per stack.
#[derive(Debug)]
pub struct StyleResolver {
    styles: StyleMap,
    density: f32,
    direction: TextDirection,
    cache: RefCell<AHashMap<Vec<String>, Arc<StyleDescriptor>>>,
}

impl StyleResolver {
    pub fn new(styles: StyleMap, density: f32, direction: TextDirection) -> Self {
        StyleResolver {
            styles,
            density,
            direction,
            cache: RefCell::new(AHashMap::new()),
        }
    }

    pub fn style(&self, style_id: &str) -> Option<&Style> {
        self.styles.get(style_id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn cached_stacks(&self) -> usize {
        self.cache.borrow().len()
    }

    /// `bound` is the resolved style binding of `stack`, if it has one.
    /// Stacks with a binding are not cached.
    pub fn resolve(
        &self,
        stack: &StyleIdsStack,
        bound: Option<&BoundStyle>,
        diagnostics: &DebugLogger,
    ) -> Arc<StyleDescriptor> {
        let cacheable = stack.style_binding.is_none();
        if cacheable {
            if let Some(hit) = self.cache.borrow().get(&stack.style_ids) {
                return hit.clone();
            }
        }

        let mut merged = Style::default();
        for id in &stack.style_ids {
            match self.styles.get(id) {
                Some(style) => merged.merge_from(style),
                None => {
                    diagnostics.record_message(
                        MessageType::Warning,
                        ErrorCode::MissingStyle,
                        format!("Unable to bind style [{id}], style not found in Stylesheet"),
                    );
                }
            }
        }
        if let Some(bound) = bound {
            merged.apply_bound(bound);
        }

        let descriptor = Arc::new(StyleDescriptor::resolve(
            &merged,
            self.density,
            self.direction,
        ));
        if cacheable {
            self.cache
                .borrow_mut()
                .insert(stack.style_ids.clone(), descriptor.clone());
        }
        descriptor
    }
}

/// Host-scoped index of shared stylesheets, keyed by stylesheet id. An
/// entry is re-indexed when a host ships different content under its id.
#[derive(Debug, Default)]
pub struct StylesheetCache {
    indexed: Mutex<AHashMap<String, IndexedSheet>>,
}

#[derive(Debug)]
struct IndexedSheet {
    source: Stylesheet,
    styles: Arc<StyleMap>,
}

impl StylesheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self, sheet: &Stylesheet) -> Arc<StyleMap> {
        if sheet.stylesheet_id.is_empty() {
            return Arc::new(index_styles(sheet));
        }
        let mut indexed = self.indexed.lock();
        if let Some(entry) = indexed.get(&sheet.stylesheet_id) {
            if entry.source == *sheet {
                return entry.styles.clone();
            }
            log::debug!("stylesheet '{}' changed, re-indexing", sheet.stylesheet_id);
        }
        let styles = Arc::new(index_styles(sheet));
        indexed.insert(
            sheet.stylesheet_id.clone(),
            IndexedSheet {
                source: sheet.clone(),
                styles: styles.clone(),
            },
        );
        styles
    }

    pub fn len(&self) -> usize {
        self.indexed.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.lock().is_empty()
    }

    pub fn purge(&self) {
        self.indexed.lock().clear();
    }
}

fn index_styles(sheet: &Stylesheet) -> StyleMap {
    sheet
        .styles
        .iter()
        .map(|s| (s.style_id.clone(), s.clone()))
        .collect()
}

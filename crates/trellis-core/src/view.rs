use crate::model::Visibility;
use crate::{Color, Corners, Dimension, Gravity, HorizontalGravity, Insets};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type ViewId = u64;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// A styled range inside a text view, produced by chunked text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
    pub color: Option<Color>,
    pub font_size: Option<f32>,
    /// Inline image chunk; the range covers its placeholder character.
    pub image_url: Option<String>,
}

/// Rasterized coverage for one rounded corner, shared between views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CornerMask {
    pub radius_px: u32,
    pub corners: Corners,
    /// `radius_px * radius_px` alpha values for the top-left quadrant; the
    /// other corners are mirrors of it.
    pub alpha: Vec<u8>,
}

#[derive(Clone, Debug)]
pub enum ViewKind {
    Box,
    Container {
        orientation: Orientation,
    },
    Stack,
    GridRow,
    Text {
        text: String,
        color: Color,
        font_size: f32,
        typeface: Option<String>,
        italic: bool,
        max_lines: u32,
        alignment: HorizontalGravity,
        spans: Vec<TextSpan>,
    },
    Image {
        url: Option<String>,
        tint: Option<Color>,
    },
    Custom {
        payload: Option<String>,
    },
}

impl ViewKind {
    pub fn text() -> Self {
        ViewKind::Text {
            text: String::new(),
            color: Color::BLACK,
            font_size: 14.0,
            typeface: None,
            italic: false,
            max_lines: 0,
            alignment: HorizontalGravity::Start,
            spans: Vec::new(),
        }
    }

    pub fn image() -> Self {
        ViewKind::Image {
            url: None,
            tint: None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ViewKind::Box => "Box",
            ViewKind::Container {
                orientation: Orientation::Vertical,
            } => "Column",
            ViewKind::Container {
                orientation: Orientation::Horizontal,
            } => "Row",
            ViewKind::Stack => "Stack",
            ViewKind::GridRow => "GridRow",
            ViewKind::Text { .. } => "Text",
            ViewKind::Image { .. } => "Image",
            ViewKind::Custom { .. } => "Custom",
        }
    }
}

/// Layout request a parent places on a child.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub width: Dimension,
    pub height: Dimension,
    pub weight: f32,
    pub margins: Insets,
    pub gravity: Gravity,
    pub collapsible: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        LayoutParams {
            width: Dimension::WrapContent,
            height: Dimension::WrapContent,
            weight: 0.0,
            margins: Insets::ZERO,
            gravity: Gravity::default(),
            collapsible: false,
        }
    }
}

#[derive(Debug)]
pub struct ViewNode {
    pub id: ViewId,
    pub kind: ViewKind,
    pub visibility: Visibility,
    pub layout_params: LayoutParams,
    pub padding: Insets,
    pub background: Option<Color>,
    pub opacity: f32,
    pub corner_mask: Option<Arc<CornerMask>>,
    pub border: Option<(i32, Color)>,
    pub clip_children: bool,
    pub content_description: Option<String>,
    pub children: SmallVec<[ViewHandle; 4]>,
}

/// Shared handle to a retained view node. Cloning shares the node.
#[derive(Clone)]
pub struct ViewHandle(Arc<Mutex<ViewNode>>);

impl std::fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.0.lock();
        f.debug_struct("ViewHandle")
            .field("id", &node.id)
            .field("kind", &node.kind.label())
            .field("children", &node.children.len())
            .finish()
    }
}

impl ViewHandle {
    pub fn new(kind: ViewKind) -> Self {
        ViewHandle(Arc::new(Mutex::new(ViewNode {
            id: NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            visibility: Visibility::Visible,
            layout_params: LayoutParams::default(),
            padding: Insets::ZERO,
            background: None,
            opacity: 1.0,
            corner_mask: None,
            border: None,
            clip_children: true,
            content_description: None,
            children: SmallVec::new(),
        })))
    }

    pub fn column() -> Self {
        Self::new(ViewKind::Container {
            orientation: Orientation::Vertical,
        })
    }

    pub fn ptr_eq(&self, other: &ViewHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn id(&self) -> ViewId {
        self.0.lock().id
    }

    /// Runs `f` with the node locked. Do not touch other handles of the same
    /// subtree from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&ViewNode) -> R) -> R {
        f(&self.0.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut ViewNode) -> R) -> R {
        f(&mut self.0.lock())
    }

    // Children

    pub fn attach_child(&self, child: &ViewHandle) {
        self.0.lock().children.push(child.clone());
    }

    /// Inserts at `index`, clamped to the current child count.
    pub fn insert_child(&self, index: usize, child: &ViewHandle) {
        let mut node = self.0.lock();
        let index = index.min(node.children.len());
        node.children.insert(index, child.clone());
    }

    pub fn detach_child(&self, child: &ViewHandle) -> bool {
        let mut node = self.0.lock();
        match node.children.iter().position(|c| c.ptr_eq(child)) {
            Some(i) => {
                node.children.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn detach_all_children(&self) {
        self.0.lock().children.clear();
    }

    pub fn child_count(&self) -> usize {
        self.0.lock().children.len()
    }

    pub fn child_at(&self, index: usize) -> Option<ViewHandle> {
        self.0.lock().children.get(index).cloned()
    }

    pub fn children(&self) -> Vec<ViewHandle> {
        self.0.lock().children.to_vec()
    }

    // Layout

    pub fn set_size(&self, width: Dimension, height: Dimension) {
        let mut node = self.0.lock();
        node.layout_params.width = width;
        node.layout_params.height = height;
    }

    pub fn layout_params(&self) -> LayoutParams {
        self.0.lock().layout_params
    }

    pub fn set_layout_params(&self, params: LayoutParams) {
        self.0.lock().layout_params = params;
    }

    pub fn set_layout_margins(&self, margins: Insets) {
        self.0.lock().layout_params.margins = margins;
    }

    pub fn set_padding(&self, padding: Insets) {
        self.0.lock().padding = padding;
    }

    pub fn padding(&self) -> Insets {
        self.0.lock().padding
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        self.0.lock().visibility = visibility;
    }

    pub fn visibility(&self) -> Visibility {
        self.0.lock().visibility
    }

    // Decoration

    pub fn set_background(&self, color: Option<Color>) {
        self.0.lock().background = color;
    }

    pub fn background(&self) -> Option<Color> {
        self.0.lock().background
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.0.lock().opacity = opacity;
    }

    pub fn set_corner_mask(&self, mask: Option<Arc<CornerMask>>) {
        self.0.lock().corner_mask = mask;
    }

    pub fn set_border(&self, border: Option<(i32, Color)>) {
        self.0.lock().border = border;
    }

    pub fn set_clip_children(&self, clip: bool) {
        self.0.lock().clip_children = clip;
    }

    pub fn clips_children(&self) -> bool {
        self.0.lock().clip_children
    }

    pub fn set_content_description(&self, description: Option<String>) {
        self.0.lock().content_description = description;
    }

    pub fn content_description(&self) -> Option<String> {
        self.0.lock().content_description.clone()
    }

    // Payloads

    /// Replaces the text and drops any spans. No-op on non-text views.
    pub fn set_text(&self, value: impl Into<String>) {
        self.set_text_with_spans(value, Vec::new());
    }

    pub fn set_text_with_spans(&self, value: impl Into<String>, new_spans: Vec<TextSpan>) {
        if let ViewKind::Text { text, spans, .. } = &mut self.0.lock().kind {
            *text = value.into();
            *spans = new_spans;
        }
    }

    pub fn text(&self) -> Option<String> {
        match &self.0.lock().kind {
            ViewKind::Text { text, .. } => Some(text.clone()),
            _ => None,
        }
    }

    pub fn spans(&self) -> Vec<TextSpan> {
        match &self.0.lock().kind {
            ViewKind::Text { spans, .. } => spans.clone(),
            _ => Vec::new(),
        }
    }

    pub fn set_typeface(&self, family: Option<String>) {
        if let ViewKind::Text { typeface, .. } = &mut self.0.lock().kind {
            *typeface = family;
        }
    }

    pub fn typeface(&self) -> Option<String> {
        match &self.0.lock().kind {
            ViewKind::Text { typeface, .. } => typeface.clone(),
            _ => None,
        }
    }

    pub fn set_image(&self, source: Option<String>) {
        if let ViewKind::Image { url, .. } = &mut self.0.lock().kind {
            *url = source;
        }
    }

    pub fn set_image_tint(&self, color: Option<Color>) {
        if let ViewKind::Image { tint, .. } = &mut self.0.lock().kind {
            *tint = color;
        }
    }

    pub fn image(&self) -> Option<String> {
        match &self.0.lock().kind {
            ViewKind::Image { url, .. } => url.clone(),
            _ => None,
        }
    }

    pub fn set_custom_payload(&self, data: Option<String>) {
        if let ViewKind::Custom { payload } = &mut self.0.lock().kind {
            *payload = data;
        }
    }

    /// Indented outline of the subtree; used by tests and debugging hosts.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let children = {
            let node = self.0.lock();
            let _ = write!(out, "{}{}", "  ".repeat(depth), node.kind.label());
            match &node.kind {
                ViewKind::Text { text, .. } => {
                    let _ = write!(out, " {text:?}");
                }
                ViewKind::Image { url: Some(url), .. } => {
                    let _ = write!(out, " {url}");
                }
                _ => {}
            }
            if node.visibility != Visibility::Visible {
                let _ = write!(out, " [{:?}]", node.visibility);
            }
            out.push('\n');
            node.children.to_vec()
        };
        for child in children {
            child.dump_into(out, depth + 1);
        }
    }
}

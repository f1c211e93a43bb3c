//! # Model tree
//!
//! The declarative input to the adapters. A host ships a [`Frame`] (plus any
//! [`SharedState`]s it references) per render pass; everything here is plain
//! data, created fresh for each pass and never mutated by the engine.
//!
//! Content is either inline or bound. Bound content names a [`BindingValue`]
//! by id; the value only becomes resolvable once a template is instantiated
//! with a [`BindingContext`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Frames, templates and bindings
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    pub tag: String,
    pub stylesheets: Stylesheets,
    pub style_references: StyleIdsStack,
    pub templates: Vec<Template>,
    pub contents: Vec<Content>,
}

/// Templates and stylesheets cached by the host and shared between frames.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedState {
    pub templates: Vec<Template>,
    pub stylesheets: Vec<Stylesheet>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub template_id: String,
    pub stylesheets: Stylesheets,
    pub element: Option<Element>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateInvocation {
    pub template_id: String,
    pub binding_contexts: Vec<BindingContext>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingContext {
    pub binding_values: Vec<BindingValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingRef {
    pub binding_id: String,
    pub is_optional: bool,
}

impl BindingRef {
    pub fn new(binding_id: impl Into<String>) -> Self {
        BindingRef {
            binding_id: binding_id.into(),
            is_optional: false,
        }
    }

    pub fn optional(binding_id: impl Into<String>) -> Self {
        BindingRef {
            binding_id: binding_id.into(),
            is_optional: true,
        }
    }
}

/// Opaque payload resolved by the host's binding provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostBindingData {
    pub payload: String,
}

/// Resolved value for one binding id. `value == None` is the "present but
/// empty" state, which is distinct from the id being absent from the table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingValue {
    pub binding_id: String,
    /// Take the value from the parent context's binding with this id.
    pub binding_id_from_transcluding_template: Option<String>,
    pub host_binding_data: Option<HostBindingData>,
    pub visibility: Option<Visibility>,
    pub value: Option<BoundValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundValue {
    ParameterizedText(ParameterizedText),
    ChunkedText(ChunkedText),
    Image(Image),
    Element(Element),
    TemplateInvocation(TemplateInvocation),
    CustomElementData(CustomElementData),
    CellWidth(GridCellWidth),
    Style(BoundStyle),
}

impl BindingValue {
    pub fn new(binding_id: impl Into<String>, value: BoundValue) -> Self {
        BindingValue {
            binding_id: binding_id.into(),
            value: Some(value),
            ..Default::default()
        }
    }

    /// Present-but-empty value for `binding_id`.
    pub fn empty(binding_id: impl Into<String>) -> Self {
        BindingValue {
            binding_id: binding_id.into(),
            ..Default::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn parameterized_text(&self) -> Option<&ParameterizedText> {
        match &self.value {
            Some(BoundValue::ParameterizedText(t)) => Some(t),
            _ => None,
        }
    }
    pub fn chunked_text(&self) -> Option<&ChunkedText> {
        match &self.value {
            Some(BoundValue::ChunkedText(t)) => Some(t),
            _ => None,
        }
    }
    pub fn image(&self) -> Option<&Image> {
        match &self.value {
            Some(BoundValue::Image(i)) => Some(i),
            _ => None,
        }
    }
    pub fn element(&self) -> Option<&Element> {
        match &self.value {
            Some(BoundValue::Element(e)) => Some(e),
            _ => None,
        }
    }
    pub fn template_invocation(&self) -> Option<&TemplateInvocation> {
        match &self.value {
            Some(BoundValue::TemplateInvocation(t)) => Some(t),
            _ => None,
        }
    }
    pub fn custom_element_data(&self) -> Option<&CustomElementData> {
        match &self.value {
            Some(BoundValue::CustomElementData(d)) => Some(d),
            _ => None,
        }
    }
    pub fn cell_width(&self) -> Option<&GridCellWidth> {
        match &self.value {
            Some(BoundValue::CellWidth(w)) => Some(w),
            _ => None,
        }
    }
    pub fn bound_style(&self) -> Option<&BoundStyle> {
        match &self.value {
            Some(BoundValue::Style(s)) => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Elements and content
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Element(Element),
    BoundElement(BindingRef),
    TemplateInvocation(TemplateInvocation),
    BoundTemplate(BindingRef),
}

impl Content {
    pub fn is_bound(&self) -> bool {
        matches!(self, Content::BoundElement(_) | Content::BoundTemplate(_))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    pub style_references: StyleIdsStack,
    pub visibility_state: Option<VisibilityState>,
    pub accessibility: Option<Accessibility>,
    pub kind: Option<ElementKind>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Element {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn styles(mut self, style_ids: &[&str]) -> Self {
        self.style_references.style_ids = style_ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn visibility(mut self, state: VisibilityState) -> Self {
        self.visibility_state = Some(state);
        self
    }

    pub fn default_visibility(&self) -> Visibility {
        self.visibility_state
            .as_ref()
            .and_then(|v| v.default_visibility)
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text(TextElement),
    Image(ImageElement),
    List(ElementList),
    Stack(ElementStack),
    GridRow(GridRow),
    Custom(CustomElement),
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "TextElement",
            ElementKind::Image(_) => "ImageElement",
            ElementKind::List(_) => "ElementList",
            ElementKind::Stack(_) => "ElementStack",
            ElementKind::GridRow(_) => "GridRow",
            ElementKind::Custom(_) => "CustomElement",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    Invisible,
    Gone,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityState {
    pub default_visibility: Option<Visibility>,
    pub overriding_bound_visibility: Option<BindingRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accessibility {
    pub description: Option<ParameterizedText>,
    pub description_binding: Option<BindingRef>,
}

// Text

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextElement {
    pub content: Option<TextContent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextContent {
    ParameterizedText(ParameterizedText),
    ParameterizedTextBinding(BindingRef),
    ChunkedText(ChunkedText),
    ChunkedTextBinding(BindingRef),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterizedText {
    pub text: String,
    pub is_html: bool,
    pub params: Vec<Param>,
}

impl ParameterizedText {
    pub fn plain(text: impl Into<String>) -> Self {
        ParameterizedText {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        ParameterizedText {
            text: text.into(),
            is_html: true,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    /// Seconds since the epoch, rendered as a host relative-time string.
    Timestamp { seconds: u64 },
    Literal(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkedText {
    pub chunks: Vec<TextChunk>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextChunk {
    StyledText {
        text: ParameterizedText,
        #[serde(default)]
        style_references: StyleIdsStack,
    },
    Image(Image),
}

// Image

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageElement {
    pub content: Option<ImageContent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageContent {
    Image(Image),
    ImageBinding(BindingRef),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub sources: Vec<ImageSource>,
    pub tint_color: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSource {
    pub url: String,
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
    pub conditions: Vec<MediaQueryCondition>,
}

impl ImageSource {
    pub fn new(url: impl Into<String>) -> Self {
        ImageSource {
            url: url.into(),
            ..Default::default()
        }
    }
}

// Containers

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementList {
    pub contents: Vec<Content>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementStack {
    pub contents: Vec<Content>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridRow {
    pub cells: Vec<GridCell>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridCell {
    pub content: Option<Content>,
    pub width: Option<GridCellWidth>,
    pub width_binding: Option<BindingRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridCellWidth {
    pub width: CellWidth,
    #[serde(default)]
    pub is_collapsible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellWidth {
    Dp(u32),
    Weight(u32),
    ContentWidth(ContentWidth),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentWidth {
    ContentWidth,
    InvalidContentWidth,
}

// Custom

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomElement {
    pub content: Option<CustomContent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomContent {
    Data(CustomElementData),
    Binding(BindingRef),
}

/// Opaque to the engine; handed to the host's custom element provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomElementData {
    pub payload: String,
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleIdsStack {
    pub style_ids: Vec<String>,
    pub style_binding: Option<BindingRef>,
}

impl StyleIdsStack {
    pub fn of(style_ids: &[&str]) -> Self {
        StyleIdsStack {
            style_ids: style_ids.iter().map(|s| s.to_string()).collect(),
            style_binding: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stylesheets {
    pub stylesheet_ids: Vec<String>,
    pub stylesheets: Vec<Stylesheet>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stylesheet {
    pub stylesheet_id: String,
    pub styles: Vec<Style>,
    pub conditions: Vec<MediaQueryCondition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaQueryCondition {
    FrameWidth {
        width_dp: u32,
        condition: ComparisonCondition,
    },
    DarkLight(DarkLightMode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonCondition {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DarkLightMode {
    Dark,
    Light,
}

/// Sparse style record. Unset fields fall through to earlier styles in a
/// stack, and finally to the engine defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub style_id: String,
    pub color: Option<u32>,
    pub background_color: Option<u32>,
    pub font: Option<Font>,
    pub max_lines: Option<u32>,
    pub text_alignment_horizontal: Option<HorizontalAlignment>,
    pub text_alignment_vertical: Option<VerticalAlignment>,
    pub gravity_horizontal: Option<HorizontalAlignment>,
    pub gravity_vertical: Option<VerticalAlignment>,
    pub padding: Option<EdgeWidths>,
    pub margins: Option<EdgeWidths>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rounded_corners: Option<RoundedCorners>,
    pub borders: Option<Borders>,
    pub opacity: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlignment {
    Start,
    Center,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    pub size: Option<u32>,
    pub weight: Option<FontWeight>,
    pub italic: Option<bool>,
    pub line_height: Option<u32>,
    pub typeface: Vec<Typeface>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Medium,
    Bold,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Typeface {
    Common(CommonTypeface),
    Custom(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommonTypeface {
    PlatformDefaultRegular,
    PlatformDefaultMedium,
}

/// Edge widths in dp; `start`/`end` follow the layout direction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeWidths {
    pub start: Option<u32>,
    pub end: Option<u32>,
    pub top: Option<u32>,
    pub bottom: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundedCorners {
    /// Bit per corner (see `Corners`); zero rounds all corners.
    pub bitmask: Option<u32>,
    pub radius: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Borders {
    pub width: Option<u32>,
    pub color: Option<u32>,
}

/// Style overrides supplied through a binding rather than a stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundStyle {
    pub color: Option<u32>,
    pub background_color: Option<u32>,
}

impl Style {
    pub fn new(style_id: impl Into<String>) -> Self {
        Style {
            style_id: style_id.into(),
            ..Default::default()
        }
    }

    /// Overlays the fields `other` sets. Nested records merge field by field.
    pub fn merge_from(&mut self, other: &Style) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }
        take(&mut self.color, &other.color);
        take(&mut self.background_color, &other.background_color);
        take(&mut self.max_lines, &other.max_lines);
        take(&mut self.text_alignment_horizontal, &other.text_alignment_horizontal);
        take(&mut self.text_alignment_vertical, &other.text_alignment_vertical);
        take(&mut self.gravity_horizontal, &other.gravity_horizontal);
        take(&mut self.gravity_vertical, &other.gravity_vertical);
        take(&mut self.width, &other.width);
        take(&mut self.height, &other.height);
        take(&mut self.opacity, &other.opacity);

        merge_nested(&mut self.font, &other.font, Font::merge_from);
        merge_nested(&mut self.padding, &other.padding, EdgeWidths::merge_from);
        merge_nested(&mut self.margins, &other.margins, EdgeWidths::merge_from);
        merge_nested(
            &mut self.rounded_corners,
            &other.rounded_corners,
            RoundedCorners::merge_from,
        );
        merge_nested(&mut self.borders, &other.borders, Borders::merge_from);
    }

    pub fn apply_bound(&mut self, bound: &BoundStyle) {
        if bound.color.is_some() {
            self.color = bound.color;
        }
        if bound.background_color.is_some() {
            self.background_color = bound.background_color;
        }
    }
}

fn merge_nested<T: Clone>(dst: &mut Option<T>, src: &Option<T>, merge: fn(&mut T, &T)) {
    match (dst.as_mut(), src) {
        (Some(d), Some(s)) => merge(d, s),
        (None, Some(s)) => *dst = Some(s.clone()),
        _ => {}
    }
}

impl Font {
    pub fn merge_from(&mut self, other: &Font) {
        if other.size.is_some() {
            self.size = other.size;
        }
        if other.weight.is_some() {
            self.weight = other.weight;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.line_height.is_some() {
            self.line_height = other.line_height;
        }
        if !other.typeface.is_empty() {
            self.typeface.clone_from(&other.typeface);
        }
    }
}

impl EdgeWidths {
    pub fn merge_from(&mut self, other: &EdgeWidths) {
        if other.start.is_some() {
            self.start = other.start;
        }
        if other.end.is_some() {
            self.end = other.end;
        }
        if other.top.is_some() {
            self.top = other.top;
        }
        if other.bottom.is_some() {
            self.bottom = other.bottom;
        }
    }
}

impl RoundedCorners {
    pub fn merge_from(&mut self, other: &RoundedCorners) {
        if other.bitmask.is_some() {
            self.bitmask = other.bitmask;
        }
        if other.radius.is_some() {
            self.radius = other.radius;
        }
    }
}

impl Borders {
    pub fn merge_from(&mut self, other: &Borders) {
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
    }
}

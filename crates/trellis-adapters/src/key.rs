use crate::style::FontSpec;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_UNIQUE: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Text,
    Image,
    Custom,
    List,
    Stack,
    GridRow,
    TemplateInstance,
}

/// Template id plus the media-query stylesheets that were active when the
/// instance was created; a template instance keeps its subtree across
/// recycling, so both have to match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub template_id: String,
    pub media_stylesheet_ids: Vec<String>,
}

/// Decides which pooled adapters are interchangeable. Equal keys are
/// fungible; a `Unique` key is never equal to another and is never pooled.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecyclerKey {
    Singleton(AdapterKind),
    Text(FontSpec),
    Image {
        width_px: Option<i32>,
        height_px: Option<i32>,
    },
    Template(TemplateKey),
    Unique(u64),
}

impl RecyclerKey {
    pub fn unique() -> Self {
        RecyclerKey::Unique(NEXT_UNIQUE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_recyclable(&self) -> bool {
        !matches!(self, RecyclerKey::Unique(_))
    }
}

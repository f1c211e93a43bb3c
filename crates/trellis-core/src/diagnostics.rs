//! # Diagnostics
//!
//! `DebugLogger` collects what went wrong while binding a frame. Fatal errors
//! still travel as `Err(TrellisError)`; this is where the frame adapter writes
//! them down, next to the warnings that never interrupted binding.
//!
//! Every record is mirrored to the `log` facade, so hosts that only install a
//! logger still see them.

use crate::error::ErrorCode;
use crate::{Color, Dimension, Insets, ViewHandle, ViewKind};
use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    Error,
    Warning,
}

pub const DIVIDER_HEIGHT_PX: i32 = 4;
const ERROR_DIVIDER_COLOR: Color = Color(255, 0, 0, 0x65);
const WARNING_DIVIDER_COLOR: Color = Color(255, 255, 0, 0x65);
const MESSAGE_PADDING_PX: i32 = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    code: ErrorCode,
    message: String,
}

#[derive(Default)]
struct Messages {
    errors: Vec<Entry>,
    warnings: Vec<Entry>,
}

impl Messages {
    fn of(&self, ty: MessageType) -> &Vec<Entry> {
        match ty {
            MessageType::Error => &self.errors,
            MessageType::Warning => &self.warnings,
        }
    }
}

#[derive(Default)]
pub struct DebugLogger {
    messages: Mutex<Messages>,
}

impl std::fmt::Debug for DebugLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.messages.lock();
        f.debug_struct("DebugLogger")
            .field("errors", &m.errors.len())
            .field("warnings", &m.warnings.len())
            .finish()
    }
}

impl DebugLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and hands it back, so call sites can record and
    /// build an error from the same string.
    pub fn record_message(
        &self,
        ty: MessageType,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> String {
        let message = message.into();
        match ty {
            MessageType::Error => log::error!("[{code:?}] {message}"),
            MessageType::Warning => log::warn!("[{code:?}] {message}"),
        }
        let entry = Entry {
            code,
            message: message.clone(),
        };
        let mut m = self.messages.lock();
        match ty {
            MessageType::Error => m.errors.push(entry),
            MessageType::Warning => m.warnings.push(entry),
        }
        message
    }

    pub fn record_warning(&self, message: impl Into<String>) -> String {
        self.record_message(MessageType::Warning, ErrorCode::Unspecified, message)
    }

    pub fn messages(&self, ty: MessageType) -> Vec<String> {
        self.messages
            .lock()
            .of(ty)
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn error_codes(&self) -> Vec<ErrorCode> {
        self.messages.lock().errors.iter().map(|e| e.code).collect()
    }

    pub fn has_messages(&self, ty: MessageType) -> bool {
        !self.messages.lock().of(ty).is_empty()
    }

    pub fn clear(&self) {
        let mut m = self.messages.lock();
        m.errors.clear();
        m.warnings.clear();
    }

    /// A divider followed by one text view per message, or `None` when
    /// nothing was recorded under `ty`.
    pub fn report_view(&self, ty: MessageType) -> Option<ViewHandle> {
        let messages = self.messages(ty);
        if messages.is_empty() {
            return None;
        }

        let panel = ViewHandle::column();
        panel.set_size(Dimension::MatchParent, Dimension::WrapContent);

        let divider = ViewHandle::new(ViewKind::Box);
        divider.set_size(Dimension::MatchParent, Dimension::Px(DIVIDER_HEIGHT_PX));
        divider.set_background(Some(match ty {
            MessageType::Error => ERROR_DIVIDER_COLOR,
            MessageType::Warning => WARNING_DIVIDER_COLOR,
        }));
        panel.attach_child(&divider);

        for message in messages {
            let text = ViewHandle::new(ViewKind::text());
            text.set_text(message);
            text.set_padding(Insets::all(MESSAGE_PADDING_PX));
            text.set_size(Dimension::MatchParent, Dimension::WrapContent);
            panel.attach_child(&text);
        }
        Some(panel)
    }
}

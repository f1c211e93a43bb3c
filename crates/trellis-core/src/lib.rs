//! # Trellis core
//!
//! Shared vocabulary for the adapter engine:
//!
//! - [`model`]: the declarative tree a host ships per frame.
//! - [`ViewHandle`]: retained, mutable view nodes the adapters build and a
//!   host renderer walks.
//! - [`DebugLogger`]: diagnostics recorded while binding.
//! - [`host`]: provider traits for images, typefaces, custom content and time.
//!
//! ```rust
//! use trellis_core::*;
//!
//! let logger = DebugLogger::new();
//! logger.record_warning("style [card] not found");
//! let report = logger.report_view(MessageType::Warning).unwrap();
//! assert_eq!(report.child_count(), 2); // divider + one message
//! assert!(logger.report_view(MessageType::Error).is_none());
//! ```

pub mod color;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod host;
pub mod model;
pub mod view;

pub use color::*;
pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use geometry::*;
pub use host::*;
pub use view::*;

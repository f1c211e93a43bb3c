//! # Trellis adapters
//!
//! Turns a model [`Frame`](trellis_core::model::Frame) into a retained
//! [`ViewHandle`](trellis_core::ViewHandle) tree.
//!
//! Every element kind has an adapter with a four-step life: create builds
//! the views that depend only on the element and its styles, bind fills in
//! per-instance content from the binding table, unbind clears it, release
//! hands the adapter back to a pool keyed by what its created views depend
//! on. [`FrameAdapter`] drives one frame; [`AdapterParameters`] holds the
//! pools and caches shared by every frame of a host.
//!
//! ```rust
//! use trellis_adapters::{AdapterParameters, FrameAdapter};
//! use trellis_core::model::*;
//! use trellis_core::{HostProviders, TrellisConfig};
//!
//! let params = AdapterParameters::new(TrellisConfig::default(), HostProviders::default());
//! let mut frame = FrameAdapter::new(params);
//! let model = Frame {
//!     contents: vec![Content::Element(Element::new(ElementKind::Text(TextElement {
//!         content: Some(TextContent::ParameterizedText(ParameterizedText::plain("hi"))),
//!     })))],
//!     ..Default::default()
//! };
//! frame.bind_model(&model, 360, &[]).unwrap();
//! assert_eq!(frame.view().child_at(0).unwrap().text().as_deref(), Some("hi"));
//! ```

pub mod adapter;
pub mod container;
pub mod context;
pub mod custom;
pub mod factory;
pub mod frame;
pub mod grid;
pub mod image;
pub mod key;
pub mod list;
pub mod mask;
pub mod media;
pub mod params;
pub mod pool;
pub mod registry;
pub mod style;
pub mod template;
pub mod text;

#[cfg(test)]
mod testing;

pub use adapter::{AdapterBase, ElementAdapter, LifecyclePhase};
pub use context::{FrameContext, create_frame_context};
pub use factory::{AdapterFactory, PoolStats, Recyclable};
pub use frame::FrameAdapter;
pub use key::{AdapterKind, RecyclerKey};
pub use params::AdapterParameters;
pub use registry::{AdapterFactories, AnyAdapter};
pub use style::StyleDescriptor;
pub use template::{TemplateBinder, TemplateInstanceAdapter};

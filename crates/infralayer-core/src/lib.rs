#![forbid(unsafe_code)]

//! Layer visibility and filter state synchronization for infrastructure maps (headless).
//!
//! The crate owns the canonical state behind a map's layer control: which abstract layers are
//! visible, which filter options are selected per category (plant source, substation type,
//! power-line voltage band), and whether each category is enabled. It compiles that state into
//! MapLibre filter expressions and pushes it to a [`RenderEngine`], and it serializes the
//! visible set into a compact string for URLs.
//!
//! Design goals:
//! - one owner for all state; the panel and URL manager only go through the controller
//! - filter application is a pure function of a per-style snapshot and a selection, so it is
//!   idempotent however often it runs
//! - no engine writes before the style is loaded, and no mutation lost while waiting for it
//!
//! ```
//! use infralayer_core::{ControllerConfig, MapStateController, StyleDocument};
//! use serde_json::json;
//!
//! let style = json!({ "layers": [
//!     { "id": "osm_base" },
//!     { "id": "satellite_base" },
//! ]});
//!
//! let mut controller = MapStateController::new(ControllerConfig::default())?;
//! controller.attach(StyleDocument::loaded(style));
//! assert_eq!(controller.get_serialized_state(), "");
//!
//! controller.set_visibility("M", true);
//! assert_eq!(controller.get_serialized_state(), "B,L,M,P");
//! # Ok::<(), infralayer_core::Error>(())
//! ```

pub mod apply;
pub mod compile;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod options;
pub mod panel;
pub mod predicate;
pub mod registry;
pub mod selection;
pub mod snapshot;
pub mod style;

pub use compile::CompiledFilter;
pub use config::{ControllerConfig, SelectionDefaults};
pub use controller::{MapStateController, PendingUpdate};
pub use engine::{RenderEngine, Visibility};
pub use error::{Error, Result};
pub use options::{Category, FilterOption, OptionKind, PerCategory};
pub use panel::{ControlPanel, StateObserver, StateView};
pub use predicate::Predicate;
pub use registry::{LayerRegistry, LayerSpec, VisibilitySet};
pub use selection::SelectionSet;
pub use snapshot::{FilterSnapshot, StyleSnapshot};
pub use style::StyleDocument;

//! The rendering-engine seam.
//!
//! The core never reads feature data; it only instructs an engine which concrete layers are
//! visible and which predicate each one carries.

use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};

/// MapLibre `layout.visibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    None,
}

impl Visibility {
    pub fn from_shown(shown: bool) -> Self {
        if shown { Self::Visible } else { Self::None }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::None => "none",
        }
    }
}

/// A map renderer holding one loaded style at a time.
///
/// Style readiness is delivered the other way round: the host calls
/// [`MapStateController::handle_style_ready`](crate::MapStateController::handle_style_ready)
/// when the engine reports that a style finished loading.
pub trait RenderEngine {
    fn is_style_ready(&self) -> bool;

    /// Ids of every concrete layer in the current style, in style order.
    fn layer_ids(&self) -> Vec<String>;

    fn layer_exists(&self, layer: &str) -> bool;

    fn visibility(&self, layer: &str) -> Option<Visibility>;

    fn set_visibility(&mut self, layer: &str, visibility: Visibility);

    fn predicate(&self, layer: &str) -> Option<Predicate>;

    /// Sets or (with `None`) clears the layer's predicate.
    fn set_predicate(&mut self, layer: &str, predicate: Option<&Predicate>);
}

impl<E: RenderEngine + ?Sized> RenderEngine for &mut E {
    fn is_style_ready(&self) -> bool {
        (**self).is_style_ready()
    }

    fn layer_ids(&self) -> Vec<String> {
        (**self).layer_ids()
    }

    fn layer_exists(&self, layer: &str) -> bool {
        (**self).layer_exists(layer)
    }

    fn visibility(&self, layer: &str) -> Option<Visibility> {
        (**self).visibility(layer)
    }

    fn set_visibility(&mut self, layer: &str, visibility: Visibility) {
        (**self).set_visibility(layer, visibility);
    }

    fn predicate(&self, layer: &str) -> Option<Predicate> {
        (**self).predicate(layer)
    }

    fn set_predicate(&mut self, layer: &str, predicate: Option<&Predicate>) {
        (**self).set_predicate(layer, predicate);
    }
}

impl<E: RenderEngine + ?Sized> RenderEngine for Box<E> {
    fn is_style_ready(&self) -> bool {
        (**self).is_style_ready()
    }

    fn layer_ids(&self) -> Vec<String> {
        (**self).layer_ids()
    }

    fn layer_exists(&self, layer: &str) -> bool {
        (**self).layer_exists(layer)
    }

    fn visibility(&self, layer: &str) -> Option<Visibility> {
        (**self).visibility(layer)
    }

    fn set_visibility(&mut self, layer: &str, visibility: Visibility) {
        (**self).set_visibility(layer, visibility);
    }

    fn predicate(&self, layer: &str) -> Option<Predicate> {
        (**self).predicate(layer)
    }

    fn set_predicate(&mut self, layer: &str, predicate: Option<&Predicate>) {
        (**self).set_predicate(layer, predicate);
    }
}

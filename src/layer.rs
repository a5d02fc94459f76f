//! Layer store: the ordered stack of image layers composited under the dialogue box.
//!
//! The first layer in a [`LayerStore`] is the bottom-most (usually the background),
//! every following layer is drawn on top of the previous one. A store is never empty
//! after it has been created: removing the last remaining layer is silently refused.
//!
//! # Example
//!
//! ```rust
//! use dialogue_screen::layer::{LayerStore, LayerUpdate};
//!
//! let mut store = LayerStore::new("background", "images/bg.png");
//! let portrait = store.add_layer("portrait", "images/rt.png");
//!
//! store.update_layer(portrait.id, LayerUpdate { opacity: Some(0.5), ..Default::default() });
//! assert_eq!(store.get(portrait.id).unwrap().opacity, 0.5);
//!
//! store.remove_layer(portrait.id);
//! assert_eq!(store.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a layer inside a [`LayerStore`].
///
/// Ids are minted by the store that owns the layer, start at 1 and are never reused,
/// not even after the layer has been removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(u64);

impl LayerId {
    /// Returns the raw numeric value of the id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single image with its transform and appearance attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique id of the layer
    pub id: LayerId,
    /// Display label, not required to be unique
    pub name: String,
    /// Opaque reference to the image (path, URL or handle), resolved by the render backend
    pub image_ref: String,
    /// Horizontal offset in pixels
    pub offset_x: f64,
    /// Vertical offset in pixels
    pub offset_y: f64,
    /// Rotation in degrees
    pub rotation: f64,
    /// Scale multiplier
    pub scale: f64,
    /// Opacity in the range `0.0 ..= 1.0`
    pub opacity: f64,
    /// Mirror the image horizontally
    pub flip_x: bool,
    /// Post-processing filter description, empty means no filter
    pub filter: String,
}

impl Layer {
    fn new(id: LayerId, name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image_ref: image_ref.into(),
            offset_x: 0.0,
            offset_y: 0.0,
            rotation: 0.0,
            scale: 1.0,
            opacity: 1.0,
            flip_x: false,
            filter: String::new(),
        }
    }

    /// Merges every field that is set in `update` over this layer. Unset fields are kept.
    pub fn apply(&mut self, update: LayerUpdate) {
        let LayerUpdate {
            name,
            image_ref,
            offset_x,
            offset_y,
            rotation,
            scale,
            opacity,
            flip_x,
            filter,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(image_ref) = image_ref {
            self.image_ref = image_ref;
        }
        if let Some(offset_x) = offset_x {
            self.offset_x = offset_x;
        }
        if let Some(offset_y) = offset_y {
            self.offset_y = offset_y;
        }
        if let Some(rotation) = rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = scale {
            self.scale = scale;
        }
        if let Some(opacity) = opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(flip_x) = flip_x {
            self.flip_x = flip_x;
        }
        if let Some(filter) = filter {
            self.filter = filter;
        }
    }
}

/// Partial update of a [`Layer`]. The id of a layer cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerUpdate {
    pub name: Option<String>,
    pub image_ref: Option<String>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub rotation: Option<f64>,
    pub scale: Option<f64>,
    pub opacity: Option<f64>,
    pub flip_x: Option<bool>,
    pub filter: Option<String>,
}

impl LayerUpdate {
    /// Returns true when the update does not touch any field.
    pub fn is_empty(&self) -> bool {
        *self == LayerUpdate::default()
    }
}

/// Ordered collection of layers, in draw order (bottom first).
#[derive(Debug, Clone)]
pub struct LayerStore {
    layers: Vec<Layer>,
    /// Last id handed out by this store
    last_id: u64,
}

impl LayerStore {
    /// Creates a store holding a single base layer.
    pub fn new(name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        let mut store = Self {
            layers: Vec::new(),
            last_id: 0,
        };
        store.add_layer(name, image_ref);
        store
    }

    fn next_id(&mut self) -> LayerId {
        self.last_id += 1;
        LayerId(self.last_id)
    }

    /// Appends a new layer with default attributes on top of the stack and returns a copy of it.
    pub fn add_layer(&mut self, name: impl Into<String>, image_ref: impl Into<String>) -> Layer {
        let id = self.next_id();
        let layer = Layer::new(id, name, image_ref);
        log::debug!("Layer {} ('{}') added on top of {} layer(s)", id, layer.name, self.layers.len());

        self.layers.push(layer.clone());
        layer
    }

    /// Merges `update` into the layer with the given id, keeping its position in the stack.
    ///
    /// Returns false when no layer has this id. Stale ids are not an error.
    pub fn update_layer(&mut self, id: LayerId, update: LayerUpdate) -> bool {
        match self.layers.iter_mut().find(|l| l.id == id) {
            Some(layer) => {
                layer.apply(update);
                true
            }
            None => {
                log::debug!("Layer {} not found, update ignored", id);
                false
            }
        }
    }

    /// Removes the layer with the given id, unless it is the only layer left.
    ///
    /// Returns true when a layer was actually removed.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        if self.layers.len() <= 1 {
            log::debug!("Refusing to remove layer {}: store must keep at least one layer", id);
            return false;
        }

        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        before != self.layers.len()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Layers in draw order, bottom-most first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false for a store created through [`LayerStore::new`].
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(n: usize) -> (LayerStore, Vec<LayerId>) {
        let mut store = LayerStore::new("background", "bg.png");
        let mut ids = vec![store.layers()[0].id];
        for i in 1..n {
            ids.push(store.add_layer(format!("layer {i}"), format!("{i}.png")).id);
        }
        (store, ids)
    }

    #[test]
    fn ids_start_at_one_and_strictly_increase() {
        let (mut store, ids) = store_with(5);
        assert_eq!(ids[0].get(), 1);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        // removed ids are never handed out again
        store.remove_layer(ids[4]);
        let next = store.add_layer("again", "again.png");
        assert_eq!(next.id.get(), 6);
    }

    #[test]
    fn new_layers_have_defaults_and_go_on_top() {
        let (mut store, _) = store_with(1);
        let layer = store.add_layer("portrait", "rt.png");

        assert_eq!(layer.offset_x, 0.0);
        assert_eq!(layer.offset_y, 0.0);
        assert_eq!(layer.rotation, 0.0);
        assert_eq!(layer.scale, 1.0);
        assert_eq!(layer.opacity, 1.0);
        assert!(!layer.flip_x);
        assert!(layer.filter.is_empty());
        assert_eq!(store.layers().last(), Some(&layer));
    }

    #[test]
    fn update_touches_only_given_fields_of_matching_layer() {
        let (mut store, ids) = store_with(3);
        let before = store.layers().to_vec();

        assert!(store.update_layer(ids[1], LayerUpdate { opacity: Some(0.5), ..Default::default() }));

        let after = store.layers();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);

        let mut expected = before[1].clone();
        expected.opacity = 0.5;
        assert_eq!(after[1], expected);
    }

    #[test]
    fn update_keeps_position() {
        let (mut store, ids) = store_with(3);
        store.update_layer(
            ids[0],
            LayerUpdate {
                name: Some("sky".into()),
                flip_x: Some(true),
                ..Default::default()
            },
        );

        assert_eq!(store.layers()[0].id, ids[0]);
        assert_eq!(store.layers()[0].name, "sky");
        assert!(store.layers()[0].flip_x);
    }

    #[test]
    fn update_with_unknown_id_is_a_no_op() {
        let (mut store, ids) = store_with(2);
        store.remove_layer(ids[1]);
        let before = store.layers().to_vec();

        assert!(!store.update_layer(ids[1], LayerUpdate { scale: Some(2.0), ..Default::default() }));
        assert_eq!(store.layers(), before.as_slice());
    }

    #[test]
    fn opacity_is_clamped() {
        let (mut store, ids) = store_with(1);
        store.update_layer(ids[0], LayerUpdate { opacity: Some(3.0), ..Default::default() });
        assert_eq!(store.layers()[0].opacity, 1.0);
    }

    #[test]
    fn never_removes_the_last_layer() {
        let (mut store, ids) = store_with(3);

        assert!(store.remove_layer(ids[0]));
        assert!(store.remove_layer(ids[2]));
        assert!(!store.remove_layer(ids[1]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.layers()[0].id, ids[1]);

        // even a flood of removals keeps one layer around
        for id in ids {
            store.remove_layer(id);
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let (mut store, _) = store_with(2);
        let ghost = LayerId(99);
        assert!(!store.remove_layer(ghost));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(LayerUpdate::default().is_empty());
        assert!(!LayerUpdate { filter: Some("blur(2px)".into()), ..Default::default() }.is_empty());
    }
}

//! Render list and display items.
//!
//! A [`RenderList`] is the flattened, backend-independent description of one frame of
//! the dialogue screen: a clear, the image layers from bottom to top, and the dialogue
//! box chrome and text on top of them. Backends consume the list in order.
//!
//! # Example
//!
//! ```rust
//! use dialogue_screen::render::{Color, DisplayItem, RenderList};
//!
//! let mut list = RenderList::new();
//! list.add_command(DisplayItem::Clear { color: Color::from_u8(0, 0, 0, 255) });
//! assert_eq!(list.items.len(), 1);
//! ```

use crate::layer::LayerId;
use crate::settings::{DialogueType, Emotion, FontTag};

/// RGBA color used for drawing commands.
///
/// Channels are represented as `f64` in the range `0.0 ..= 1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f64,
    /// Green channel
    pub g: f64,
    /// Blue channel
    pub b: f64,
    /// Alpha channel (opacity)
    pub a: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    /// Creates a new color from `u8` channel values in the range `0 ..= 255`.
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        }
    }
}

/// A single drawing command.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayItem {
    /// Clear the entire surface with the given color.
    Clear { color: Color },

    /// Draw the image of a layer. `(x, y)` is the offset of the image center from the
    /// surface center, rotation is in degrees.
    Image {
        layer: LayerId,
        image_ref: String,
        x: f64,
        y: f64,
        rotation: f64,
        scale: f64,
        opacity: f64,
        flip_x: bool,
        /// `None` when the layer has no filter
        filter: Option<String>,
    },

    /// Draw the box behind the dialogue text.
    DialogueBox {
        kind: DialogueType,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Color,
    },

    /// Draw the speaker name plate.
    SpeakerName {
        text: String,
        x: f64,
        y: f64,
        size: f64,
        color: Color,
    },

    /// Draw the dialogue text, one entry per row.
    DialogueText {
        lines: Vec<String>,
        x: f64,
        y: f64,
        size: f64,
        line_height: f64,
        font: FontTag,
        color: Color,
    },

    /// Draw an emotion icon at `(x, y)`.
    EmotionIcon { emotion: Emotion, x: f64, y: f64, size: f64 },
}

/// A list of display items to be rendered, in painting order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderList {
    pub items: Vec<DisplayItem>,
}

impl RenderList {
    pub fn new() -> Self {
        RenderList { items: Vec::new() }
    }

    /// Adds a new display item (drawing command) to the list.
    pub fn add_command(&mut self, command: DisplayItem) {
        self.items.push(command);
    }

    /// Image items only, bottom-most first.
    pub fn images(&self) -> impl Iterator<Item = &DisplayItem> {
        self.items.iter().filter(|i| matches!(i, DisplayItem::Image { .. }))
    }

    /// The rows of the dialogue text, if the list draws any.
    pub fn text_lines(&self) -> Option<&[String]> {
        self.items.iter().find_map(|i| match i {
            DisplayItem::DialogueText { lines, .. } => Some(lines.as_slice()),
            _ => None,
        })
    }
}

//! Screen commands and events.
//!
//! Commands travel from a [`ScreenHandle`](crate::handle::ScreenHandle) to the worker over
//! an mpsc channel. Commands that produce a value carry a oneshot `reply` sender. Events
//! are broadcast to every subscriber; a slow subscriber may lag and miss events, the
//! screen itself never waits for them.

use crate::layer::{Layer, LayerId, LayerUpdate};
use crate::screen::{ScreenId, ScreenSnapshot};
use crate::settings::SettingsUpdate;
use tokio::sync::oneshot;

/// Commands that can be sent to a running screen
#[derive(Debug)]
pub enum ScreenCommand {
    // ****************************************
    // ** Playback
    /// User input: show the next line, or interrupt the one being revealed
    Advance,

    // ****************************************
    // ** Layers
    /// Add a layer on top of the stack
    AddLayer {
        name: String,
        image_ref: String,
        reply: oneshot::Sender<Layer>,
    },
    /// Merge attributes into an existing layer
    UpdateLayer { id: LayerId, update: LayerUpdate },
    /// Remove a layer (the last remaining layer is kept)
    RemoveLayer { id: LayerId },

    // ****************************************
    // ** Settings / rendering
    /// Merge fields into the dialogue settings
    UpdateSettings { update: SettingsUpdate },
    /// Resize the surface
    Resize { width: u32, height: u32 },

    // ****************************************
    // ** Control
    /// Read the current state of the screen
    Snapshot { reply: oneshot::Sender<ScreenSnapshot> },
    /// Stop the worker
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    // ****************************************
    // ** Lifecycle
    /// Worker started
    ScreenStarted { screen_id: ScreenId },
    /// Worker stopped, no more events follow
    ScreenClosed { screen_id: ScreenId },

    // ****************************************
    // ** Rendering
    /// A new frame has been rendered. `frame` is the screen's redraw count
    Redraw { screen_id: ScreenId, frame: u64 },
    /// Resizing failed, the previous surface is kept
    ResizeFailed { screen_id: ScreenId, error: String },

    // ****************************************
    // ** Playback
    /// Reveal of a script line started
    LineStarted { screen_id: ScreenId, index: usize },
    /// Reveal of a script line ended
    LineFinished {
        screen_id: ScreenId,
        index: usize,
        interrupted: bool,
    },

    // ****************************************
    // ** Layers
    /// A layer was added
    LayerAdded { screen_id: ScreenId, id: LayerId },
    /// A layer was removed
    LayerRemoved { screen_id: ScreenId, id: LayerId },
}

//! Render pipeline: composition of settings and layers into a display list, and the
//! backends that paint such a list onto a surface.

pub mod backend;

/// Rendering backends for the dialogue screen.
pub mod backends {
    /// Cairo rendering backend
    #[cfg(feature = "backend_cairo")]
    pub mod cairo;
    pub mod null;
}

mod compose;
mod render_list;

pub use compose::compose;
pub use render_list::*;

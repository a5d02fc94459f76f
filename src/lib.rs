pub mod config;
pub mod errors;
pub mod events;
pub mod handle;
pub mod layer;
pub mod playback;
pub mod render;
pub mod screen;
pub mod settings;
pub mod tick;
pub mod worker;
pub mod wrap;

pub use config::ScreenConfig;
pub use errors::{ConfigError, ScreenError};
pub use events::{ScreenCommand, ScreenEvent};
pub use handle::ScreenHandle;
pub use screen::{DialogueScreen, ScreenId, ScreenSnapshot};
pub use worker::ScreenWorker;

use crate::playback::PlaybackState;

// A tick result returns the state of the screen after a tick() or advance() has been processed
#[derive(Default, Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Current playback state
    pub status: PlaybackState,
    /// When the next tick is due. `None` when nothing is being revealed
    pub next_tick_in: Option<std::time::Duration>,
    /// A new frame was rendered during this step and can be presented
    pub needs_redraw: bool,
    /// Index of the script line that started during this step
    pub line_started: Option<usize>,
    /// Index of the script line that finished during this step, and whether it was interrupted
    pub line_finished: Option<(usize, bool)>,
}

//! Dialogue playback: the typewriter state machine.
//!
//! A [`PlaybackController`] walks cyclically through a script of lines. An advance request
//! while idle starts revealing the current line one character at a time; every following
//! [`tick`](PlaybackController::tick) (paced by [`CHARACTER_DELAY`]) shows one more
//! character. An advance request that arrives mid-reveal does not start a new line: it
//! raises an interrupt, and the next tick jumps straight to the full text.
//!
//! ```text
//!            advance                 tick (more chars)
//!   Idle ─────────────▶ Revealing ◀──────────────┐
//!    ▲                   │    │  └───────────────┘
//!    │  tick (all shown) │    │ advance
//!    ├───────────────────┘    ▼
//!    │      tick         Interrupted ── advance (swallowed)
//!    └───────────────────────┘
//! ```
//!
//! The controller never touches [`Settings`](crate::settings::Settings) itself. Each call
//! returns a [`Transition`] and the owner applies the carried update, which keeps all
//! mutation on a single timeline.

use crate::settings::{DialogueType, FontTag, SettingsUpdate};
use crate::wrap::LineWrapper;
use serde::Serialize;
use std::time::Duration;

/// Pause between two revealed characters. Not configurable at runtime.
pub const CHARACTER_DELAY: Duration = Duration::from_micros(200);

/// Where the controller is in its reveal cycle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No reveal in progress; the last full line (or the placeholder) is shown.
    #[default]
    Idle,
    /// A prefix of the current line is shown and grows on every tick.
    Revealing,
    /// An advance arrived mid-reveal; the next tick shows the full line.
    Interrupted,
}

/// Result of driving the controller one step.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing changed.
    None,
    /// The reveal of line `index` started and shows its first character.
    Started { index: usize, update: SettingsUpdate },
    /// An interrupt was raised for the running reveal.
    Interrupted,
    /// One more character of the running line is visible.
    Emitted(SettingsUpdate),
    /// The reveal of line `index` ended and the script moved on.
    ///
    /// `update` carries the full text when the reveal was cut short.
    Finished {
        index: usize,
        interrupted: bool,
        update: Option<SettingsUpdate>,
    },
}

impl Transition {
    /// The settings update carried by this transition, if any.
    pub fn update(&self) -> Option<&SettingsUpdate> {
        match self {
            Transition::Started { update, .. } | Transition::Emitted(update) => Some(update),
            Transition::Finished { update, .. } => update.as_ref(),
            Transition::None | Transition::Interrupted => None,
        }
    }
}

/// A reveal in flight.
#[derive(Debug, Clone)]
struct Reveal {
    /// Script index of the line being revealed
    index: usize,
    /// Wrapped segments joined into the full text
    target: String,
    /// Byte offset into `target` of the visible prefix
    shown: usize,
}

impl Reveal {
    /// Byte offset just past the next character after `shown`.
    fn next_boundary(&self) -> Option<usize> {
        self.target[self.shown..]
            .chars()
            .next()
            .map(|c| self.shown + c.len_utf8())
    }
}

/// Drives the reveal of a cyclic script of dialogue lines.
pub struct PlaybackController {
    script: Vec<String>,
    speaker: String,
    wrapper: Box<dyn LineWrapper>,
    /// Next line to reveal
    index: usize,
    state: PlaybackState,
    reveal: Option<Reveal>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("lines", &self.script.len())
            .field("speaker", &self.speaker)
            .field("index", &self.index)
            .field("state", &self.state)
            .finish()
    }
}

impl PlaybackController {
    pub fn new(script: Vec<String>, speaker: impl Into<String>, wrapper: Box<dyn LineWrapper>) -> Self {
        Self {
            script,
            speaker: speaker.into(),
            wrapper,
            index: 0,
            state: PlaybackState::Idle,
            reveal: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the line the next reveal will show (or the one being revealed).
    pub fn index(&self) -> usize {
        self.reveal.as_ref().map_or(self.index, |r| r.index)
    }

    pub fn script(&self) -> &[String] {
        &self.script
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    /// True while a reveal holds the timeline (revealing or interrupted).
    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    /// Full text of the line being revealed.
    pub fn target(&self) -> Option<&str> {
        self.reveal.as_ref().map(|r| r.target.as_str())
    }

    /// Handles a user request for the next line.
    ///
    /// `kind` and `font` are the current box settings and select the wrapping rules.
    pub fn advance(&mut self, kind: DialogueType, font: FontTag) -> Transition {
        match self.state {
            PlaybackState::Revealing => {
                log::debug!("Advance during reveal of line {}: interrupting", self.index());
                self.state = PlaybackState::Interrupted;
                Transition::Interrupted
            }
            PlaybackState::Interrupted => {
                log::trace!("Advance swallowed, interrupt already pending");
                Transition::None
            }
            PlaybackState::Idle => self.start(kind, font),
        }
    }

    fn start(&mut self, kind: DialogueType, font: FontTag) -> Transition {
        let Some(line) = self.script.get(self.index) else {
            log::debug!("Advance on an empty script ignored");
            return Transition::None;
        };

        let target = self.wrapper.wrap(line, kind, font).join("\n");
        let index = self.index;

        let mut reveal = Reveal { index, target, shown: 0 };
        let Some(first) = reveal.next_boundary() else {
            // Nothing to reveal, the line is over before it began
            log::debug!("Line {} is empty, skipping", index);
            self.index = (index + 1) % self.script.len();
            return Transition::Finished {
                index,
                interrupted: false,
                update: None,
            };
        };
        reveal.shown = first;

        log::debug!("Revealing line {} ({} chars)", index, reveal.target.chars().count());
        let update = SettingsUpdate::line(self.speaker.clone(), &reveal.target[..first]);

        self.reveal = Some(reveal);
        self.state = PlaybackState::Revealing;

        Transition::Started { index, update }
    }

    /// Advances the running reveal by one pacing step.
    ///
    /// The interrupt flag is only observed here, never inside [`advance`](Self::advance).
    pub fn tick(&mut self) -> Transition {
        match self.state {
            PlaybackState::Idle => Transition::None,
            PlaybackState::Interrupted => {
                let update = self
                    .reveal
                    .as_ref()
                    .map(|r| SettingsUpdate::line(self.speaker.clone(), r.target.clone()));
                self.finish(true, update)
            }
            PlaybackState::Revealing => {
                let Some(reveal) = self.reveal.as_mut() else {
                    self.state = PlaybackState::Idle;
                    return Transition::None;
                };

                match reveal.next_boundary() {
                    Some(end) => {
                        reveal.shown = end;
                        log::trace!("Line {}: {} bytes shown", reveal.index, end);
                        Transition::Emitted(SettingsUpdate::line(self.speaker.clone(), &reveal.target[..end]))
                    }
                    None => self.finish(false, None),
                }
            }
        }
    }

    fn finish(&mut self, interrupted: bool, update: Option<SettingsUpdate>) -> Transition {
        let index = self.index();

        // Clears both the reveal guard and a pending interrupt
        self.reveal = None;
        self.state = PlaybackState::Idle;
        if !self.script.is_empty() {
            self.index = (index + 1) % self.script.len();
        }

        log::debug!("Line {} finished (interrupted: {}), next is {}", index, interrupted, self.index);
        Transition::Finished {
            index,
            interrupted,
            update,
        }
    }

    /// Time until the next [`tick`](Self::tick) is due, `None` when idle.
    pub fn next_tick_in(&self) -> Option<Duration> {
        self.is_revealing().then_some(CHARACTER_DELAY)
    }
}

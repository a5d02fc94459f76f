//! The dialogue screen: layers, settings, playback and rendering in one place.
//!
//! [`DialogueScreen`] is the synchronous core. Every mutation (layer add/update/remove,
//! settings merge, a playback step) is followed by exactly one redraw through the
//! configured [`RenderBackend`], before the call returns. The screen does not keep time
//! itself: the host calls [`tick`](DialogueScreen::tick) whenever
//! [`TickResult::next_tick_in`] has elapsed. [`ScreenWorker`](crate::worker::ScreenWorker)
//! does exactly that on a tokio task.

use crate::config::ScreenConfig;
use crate::errors::{ConfigError, ScreenError};
use crate::layer::{Layer, LayerId, LayerStore, LayerUpdate};
use crate::playback::{PlaybackController, PlaybackState, Transition};
use crate::render::backend::{ErasedSurface, RenderBackend, RgbaImage, SurfaceSize};
use crate::render::compose;
use crate::settings::{Settings, SettingsUpdate};
use crate::tick::TickResult;
use crate::wrap::{GreedyWrapper, LineWrapper};
use serde::Serialize;
use uuid::Uuid;

/// A unique identifier for a dialogue screen.
///
/// Several screens can live side by side (one per window or per viewer); each owns its
/// own layer ids, playback state and surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScreenId(Uuid);

impl ScreenId {
    /// Create a new unique `ScreenId` using a random UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only copy of what the screen currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenSnapshot {
    pub settings: Settings,
    pub layers: Vec<Layer>,
    pub state: PlaybackState,
    /// Index of the line being revealed, or the next one when idle
    pub index: usize,
    pub redraws: u64,
}

pub struct DialogueScreen {
    /// ID of the screen
    pub id: ScreenId,
    layers: LayerStore,
    settings: Settings,
    playback: PlaybackController,

    backend: Box<dyn RenderBackend>,
    /// Surface to paint on. `None` until the host sizes the screen
    surface: Option<Box<dyn ErasedSurface>>,
    surface_size: SurfaceSize,

    /// Number of frames handed to the backend
    redraws: u64,
}

impl std::fmt::Debug for DialogueScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueScreen")
            .field("id", &self.id)
            .field("layers", &self.layers.len())
            .field("playback", &self.playback)
            .field("backend", &self.backend.name())
            .field("redraws", &self.redraws)
            .finish()
    }
}

impl DialogueScreen {
    /// Creates a screen with the default [`GreedyWrapper`].
    ///
    /// The screen starts with two layers (`background` and `portrait`) and shows the
    /// placeholder text. No surface is allocated yet, call [`resize`](Self::resize) for that.
    pub fn new(config: ScreenConfig, backend: Box<dyn RenderBackend>) -> Self {
        Self::with_wrapper(config, backend, Box::new(GreedyWrapper))
    }

    pub fn with_wrapper(config: ScreenConfig, backend: Box<dyn RenderBackend>, wrapper: Box<dyn LineWrapper>) -> Self {
        let ScreenConfig {
            speaker_name,
            background_ref,
            portrait_ref,
            script,
            surface_size,
            dialogue_type,
            font,
            placeholder_text,
        } = config;

        let mut layers = LayerStore::new("background", background_ref);
        layers.add_layer("portrait", portrait_ref);

        let settings = Settings {
            dialogue_text: placeholder_text,
            dialogue_type,
            font,
            ..Settings::default()
        };

        let mut screen = Self {
            id: ScreenId::new(),
            layers,
            settings,
            playback: PlaybackController::new(script, speaker_name, wrapper),
            backend,
            surface: None,
            surface_size,
            redraws: 0,
        };

        log::debug!("Screen {:?} created with backend {}", screen.id, screen.backend.name());
        screen.redraw();
        screen
    }

    /// Allocates a surface of the given size and redraws onto it.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ScreenError> {
        let size = SurfaceSize::new(width, height);
        if size.is_empty() {
            return Err(ConfigError::ZeroSurface.into());
        }

        if self.surface.as_ref().map_or(true, |s| s.size() != size) {
            let surface = self
                .backend
                .create_surface(size)
                .map_err(|e| ScreenError::Renderer(e.to_string()))?;
            self.surface = Some(surface);
        }

        self.surface_size = size;
        self.redraw();
        Ok(())
    }

    /// Paints the current settings and layers. Backend failures are logged, never returned.
    fn redraw(&mut self) {
        let list = compose(&self.settings, self.layers.layers(), self.surface_size);
        let surface: Option<&mut dyn ErasedSurface> = match self.surface.as_mut() {
            Some(s) => Some(s.as_mut()),
            None => None,
        };

        if let Err(e) = self.backend.render(&list, surface) {
            log::warn!("Screen {:?}: {} failed to render: {}", self.id, self.backend.name(), e);
        }
        self.redraws += 1;
    }

    /// Appends a new layer on top of the stack.
    pub fn add_layer(&mut self, name: impl Into<String>, image_ref: impl Into<String>) -> Layer {
        let layer = self.layers.add_layer(name, image_ref);
        self.redraw();
        layer
    }

    /// Merges `update` into the layer with `id`. Unknown ids are ignored.
    pub fn update_layer(&mut self, id: LayerId, update: LayerUpdate) {
        self.layers.update_layer(id, update);
        self.redraw();
    }

    /// Removes the layer with `id`, unless it is the last one.
    pub fn remove_layer(&mut self, id: LayerId) {
        self.layers.remove_layer(id);
        self.redraw();
    }

    /// Shallow-merges `update` into the settings.
    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.settings.apply(update);
        self.redraw();
    }

    /// Requests the next line, or interrupts the line being revealed.
    pub fn advance(&mut self) -> TickResult {
        let transition = self.playback.advance(self.settings.dialogue_type, self.settings.font);
        self.apply(transition)
    }

    /// Drives the running reveal one pacing step. Does nothing when idle.
    pub fn tick(&mut self) -> TickResult {
        let transition = self.playback.tick();
        self.apply(transition)
    }

    fn apply(&mut self, transition: Transition) -> TickResult {
        let mut result = TickResult::default();

        match transition {
            Transition::None | Transition::Interrupted => {}
            Transition::Started { index, update } => {
                result.line_started = Some(index);
                self.update_settings(update);
                result.needs_redraw = true;
            }
            Transition::Emitted(update) => {
                self.update_settings(update);
                result.needs_redraw = true;
            }
            Transition::Finished {
                index,
                interrupted,
                update,
            } => {
                result.line_finished = Some((index, interrupted));
                if let Some(update) = update {
                    self.update_settings(update);
                    result.needs_redraw = true;
                }
            }
        }

        result.status = self.playback.state();
        result.next_tick_in = self.playback.next_tick_in();
        result
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Layers in draw order, bottom-most first.
    pub fn layers(&self) -> &[Layer] {
        self.layers.layers()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Index of the line being revealed, or of the next line when idle.
    pub fn script_index(&self) -> usize {
        self.playback.index()
    }

    /// Number of frames rendered so far. Never decreases.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface_size
    }

    /// Copies the pixels of the current surface.
    pub fn pixels(&mut self) -> Result<RgbaImage, ScreenError> {
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| ScreenError::Renderer("no surface allocated".to_string()))?;

        self.backend
            .snapshot(surface.as_mut())
            .map_err(|e| ScreenError::Renderer(e.to_string()))
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            settings: self.settings.clone(),
            layers: self.layers.layers().to_vec(),
            state: self.playback.state(),
            index: self.playback.index(),
            redraws: self.redraws,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::null::NullBackend;
    use crate::settings::{DialogueType, FontTag};

    fn screen(lines: &[&str]) -> DialogueScreen {
        let config = ScreenConfig::builder()
            .script(lines.iter().map(|s| s.to_string()).collect())
            .build()
            .unwrap();
        DialogueScreen::with_wrapper(
            config,
            Box::new(NullBackend::new()),
            Box::new(|t: &str, _: DialogueType, _: FontTag| vec![t.to_string()]),
        )
    }

    /// Ticks until the reveal is over.
    fn finish(s: &mut DialogueScreen) {
        for _ in 0..10_000 {
            if s.tick().line_finished.is_some() {
                return;
            }
        }
        panic!("reveal never finished");
    }

    #[test]
    fn starts_with_background_portrait_and_placeholder() {
        let s = screen(&["A"]);

        let names: Vec<_> = s.layers().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["background", "portrait"]);
        assert_eq!(s.settings().dialogue_text, "Click / Tap to start");
        assert_eq!(s.settings().speaker, "");
        assert_eq!(s.playback_state(), PlaybackState::Idle);
        assert_eq!(s.redraw_count(), 1);
    }

    #[test]
    fn hi_reveals_in_two_steps_and_wraps_to_the_start() {
        let mut s = screen(&["Hi"]);

        let r = s.advance();
        assert_eq!(s.settings().dialogue_text, "H");
        assert_eq!(s.settings().speaker, "Rita");
        assert_eq!(r.status, PlaybackState::Revealing);
        assert_eq!(r.line_started, Some(0));

        s.tick();
        assert_eq!(s.settings().dialogue_text, "Hi");

        let r = s.tick();
        assert_eq!(r.status, PlaybackState::Idle);
        assert_eq!(r.line_finished, Some((0, false)));
        assert_eq!(r.next_tick_in, None);
        assert_eq!(s.script_index(), 0);
    }

    #[test]
    fn every_emission_and_layer_call_redraws() {
        let mut s = screen(&["Hey"]);
        let mut last = s.redraw_count();
        let mut bump = |s: &DialogueScreen| {
            assert!(s.redraw_count() > last);
            last = s.redraw_count();
        };

        let layer = s.add_layer("effect", "fx.png");
        bump(&s);
        s.update_layer(layer.id, LayerUpdate { rotation: Some(15.0), ..Default::default() });
        bump(&s);
        s.remove_layer(layer.id);
        bump(&s);
        s.remove_layer(layer.id);
        bump(&s);

        s.advance();
        bump(&s);
        s.tick();
        bump(&s);
        s.tick();
        bump(&s);
    }

    #[test]
    fn interrupt_shows_full_line_and_moves_on() {
        let mut s = screen(&["Hello there", "Second"]);
        s.advance();
        s.tick();

        let r = s.advance();
        assert_eq!(r.status, PlaybackState::Interrupted);
        assert!(!r.needs_redraw);

        let r = s.tick();
        assert_eq!(r.line_finished, Some((0, true)));
        assert_eq!(s.settings().dialogue_text, "Hello there");
        assert_eq!(s.playback_state(), PlaybackState::Idle);

        s.advance();
        assert_eq!(s.settings().dialogue_text, "S");
    }

    #[test]
    fn wrapping_uses_the_current_box_settings() {
        let config = ScreenConfig::builder().script(vec!["abc".into()]).build().unwrap();
        let mut s = DialogueScreen::with_wrapper(
            config,
            Box::new(NullBackend::new()),
            Box::new(|t: &str, kind: DialogueType, font: FontTag| vec![format!("{kind:?}/{font}/{t}")]),
        );

        s.update_settings(SettingsUpdate {
            dialogue_type: Some(DialogueType::Narration),
            font: Some(FontTag::Ja),
            ..Default::default()
        });
        s.advance();
        finish(&mut s);

        assert_eq!(s.settings().dialogue_text, "Narration/ja/abc");
    }

    #[test]
    fn empty_script_never_fails() {
        let mut s = screen(&[]);
        for _ in 0..3 {
            let r = s.advance();
            assert_eq!(r.status, PlaybackState::Idle);
            s.tick();
        }
        assert_eq!(s.settings().dialogue_text, "Click / Tap to start");
    }

    #[test]
    fn resize_allocates_a_surface() {
        let mut s = screen(&["A"]);
        assert!(s.pixels().is_err());

        s.resize(10, 20).unwrap();
        let img = s.pixels().unwrap();
        assert_eq!((img.width, img.height), (10, 20));
        assert_eq!(s.surface_size(), SurfaceSize::new(10, 20));

        assert!(matches!(s.resize(0, 20), Err(ScreenError::Config(ConfigError::ZeroSurface))));
    }

    #[test]
    fn huge_surfaces_report_errors_instead_of_panicking() {
        let mut s = screen(&["A"]);

        s.resize(70_000, 70_000).unwrap();
        assert!(matches!(s.pixels(), Err(ScreenError::Renderer(_))));

        s.advance();
        assert_eq!(s.settings().dialogue_text, "A");
    }

    #[test]
    fn snapshot_reflects_the_current_state() {
        let mut s = screen(&["A", "B"]);
        s.advance();
        finish(&mut s);

        let snap = s.snapshot();
        assert_eq!(snap.settings.dialogue_text, "A");
        assert_eq!(snap.index, 1);
        assert_eq!(snap.layers.len(), 2);
        assert_eq!(snap.state, PlaybackState::Idle);
        assert_eq!(snap.redraws, s.redraw_count());
    }
}

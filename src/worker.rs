use crate::events::{ScreenCommand, ScreenEvent};
use crate::handle::ScreenHandle;
use crate::screen::DialogueScreen;
use crate::tick::TickResult;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Number of commands that can be queued before senders wait
const COMMAND_BUFFER: usize = 64;
/// Number of events a subscriber may lag behind before it misses some
const EVENT_BUFFER: usize = 256;

/// Runs a [`DialogueScreen`] on its own tokio task.
///
/// Commands and reveal ticks are handled one at a time on that task, so the screen never
/// sees two state transitions at once.
pub struct ScreenWorker {
    screen: DialogueScreen,
    cmd_rx: mpsc::Receiver<ScreenCommand>,
    event_tx: broadcast::Sender<ScreenEvent>,
    /// When the running reveal wants its next tick
    next_tick: Option<Instant>,
    /// Redraw count of the last `Redraw` event sent
    last_frame: u64,
}

impl ScreenWorker {
    /// Moves `screen` onto a new task and returns a handle to talk to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(screen: DialogueScreen) -> (ScreenHandle, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let handle = ScreenHandle::new(screen.id, cmd_tx, event_tx.clone());
        let worker = Self {
            last_frame: screen.redraw_count(),
            screen,
            cmd_rx,
            event_tx,
            next_tick: None,
        };

        let join = tokio::spawn(worker.run());
        (handle, join)
    }

    pub async fn run(mut self) {
        let screen_id = self.screen.id;
        log::debug!("Screen {:?}: worker started", screen_id);
        self.emit(ScreenEvent::ScreenStarted { screen_id });

        loop {
            let deadline = self.next_tick;

            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(ScreenCommand::Shutdown) | None => break,
                        Some(cmd) => self.handle_command(cmd),
                    }
                }
                // Reveal pacing, only armed while a line is being revealed
                _ = async {
                    match deadline {
                        Some(at) => tokio::time::sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                } => {
                    let result = self.screen.tick();
                    self.after_step(result);
                }
            }
        }

        log::debug!("Screen {:?}: worker stopped", screen_id);
        self.emit(ScreenEvent::ScreenClosed { screen_id });
    }

    fn handle_command(&mut self, cmd: ScreenCommand) {
        let screen_id = self.screen.id;
        log::trace!("Screen {:?}: handling {:?}", screen_id, cmd);

        match cmd {
            ScreenCommand::Advance => {
                let result = self.screen.advance();
                self.after_step(result);
                return;
            }
            ScreenCommand::AddLayer { name, image_ref, reply } => {
                let layer = self.screen.add_layer(name, image_ref);
                self.emit(ScreenEvent::LayerAdded { screen_id, id: layer.id });
                // The caller may have given up waiting
                let _ = reply.send(layer);
            }
            ScreenCommand::UpdateLayer { id, update } => {
                self.screen.update_layer(id, update);
            }
            ScreenCommand::RemoveLayer { id } => {
                let before = self.screen.layers().len();
                self.screen.remove_layer(id);
                if self.screen.layers().len() < before {
                    self.emit(ScreenEvent::LayerRemoved { screen_id, id });
                }
            }
            ScreenCommand::UpdateSettings { update } => {
                self.screen.update_settings(update);
            }
            ScreenCommand::Resize { width, height } => {
                if let Err(e) = self.screen.resize(width, height) {
                    log::warn!("Screen {:?}: cannot resize to {}x{}: {}", screen_id, width, height, e);
                    self.emit(ScreenEvent::ResizeFailed {
                        screen_id,
                        error: e.to_string(),
                    });
                }
            }
            ScreenCommand::Snapshot { reply } => {
                let _ = reply.send(self.screen.snapshot());
            }
            // Handled by the run loop
            ScreenCommand::Shutdown => {}
        }

        self.emit_redraw();
    }

    /// Publishes the outcome of a playback step and re-arms the pacing timer.
    fn after_step(&mut self, result: TickResult) {
        let screen_id = self.screen.id;

        if let Some(index) = result.line_started {
            self.emit(ScreenEvent::LineStarted { screen_id, index });
        }
        self.emit_redraw();
        if let Some((index, interrupted)) = result.line_finished {
            self.emit(ScreenEvent::LineFinished {
                screen_id,
                index,
                interrupted,
            });
        }

        self.next_tick = match (result.next_tick_in, self.next_tick) {
            (None, _) => None,
            // An interrupt keeps the pending deadline so the full line shows on schedule
            (Some(_), Some(at)) if result.line_started.is_none() && !result.needs_redraw => Some(at),
            (Some(delay), _) => Some(Instant::now() + delay),
        };
    }

    fn emit_redraw(&mut self) {
        let frame = self.screen.redraw_count();
        if frame != self.last_frame {
            self.last_frame = frame;
            self.emit(ScreenEvent::Redraw {
                screen_id: self.screen.id,
                frame,
            });
        }
    }

    fn emit(&self, event: ScreenEvent) {
        // No subscribers is not an error
        let _ = self.event_tx.send(event);
    }
}

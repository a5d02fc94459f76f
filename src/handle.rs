use crate::errors::ScreenError;
use crate::events::{ScreenCommand, ScreenEvent};
use crate::layer::{Layer, LayerId, LayerUpdate};
use crate::screen::{ScreenId, ScreenSnapshot};
use crate::settings::SettingsUpdate;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Cloneable handle to a screen running on a [`ScreenWorker`](crate::worker::ScreenWorker).
#[derive(Clone)]
pub struct ScreenHandle {
    screen_id: ScreenId,
    cmd_tx: mpsc::Sender<ScreenCommand>,
    event_tx: broadcast::Sender<ScreenEvent>,
}

impl std::fmt::Debug for ScreenHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenHandle")
            .field("screen_id", &self.screen_id)
            .field("closed", &self.cmd_tx.is_closed())
            .finish()
    }
}

impl ScreenHandle {
    pub(crate) fn new(
        screen_id: ScreenId,
        cmd_tx: mpsc::Sender<ScreenCommand>,
        event_tx: broadcast::Sender<ScreenEvent>,
    ) -> Self {
        Self {
            screen_id,
            cmd_tx,
            event_tx,
        }
    }

    pub fn id(&self) -> ScreenId {
        self.screen_id
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ScreenEvent> {
        self.event_tx.subscribe()
    }

    async fn send(&self, cmd: ScreenCommand) -> Result<(), ScreenError> {
        self.cmd_tx.send(cmd).await.map_err(|_| ScreenError::ChannelClosed)
    }

    /// Shows the next line, or interrupts the line being revealed.
    pub async fn advance(&self) -> Result<(), ScreenError> {
        self.send(ScreenCommand::Advance).await
    }

    /// Adds a layer on top of the stack and returns it once the screen has redrawn.
    pub async fn add_layer(&self, name: impl Into<String>, image_ref: impl Into<String>) -> Result<Layer, ScreenError> {
        let (tx, rx) = oneshot::channel();

        self.send(ScreenCommand::AddLayer {
            name: name.into(),
            image_ref: image_ref.into(),
            reply: tx,
        })
        .await?;

        rx.await.map_err(|_| ScreenError::ReplyDropped)
    }

    pub async fn update_layer(&self, id: LayerId, update: LayerUpdate) -> Result<(), ScreenError> {
        self.send(ScreenCommand::UpdateLayer { id, update }).await
    }

    pub async fn remove_layer(&self, id: LayerId) -> Result<(), ScreenError> {
        self.send(ScreenCommand::RemoveLayer { id }).await
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<(), ScreenError> {
        self.send(ScreenCommand::UpdateSettings { update }).await
    }

    pub async fn resize(&self, width: u32, height: u32) -> Result<(), ScreenError> {
        self.send(ScreenCommand::Resize { width, height }).await
    }

    /// Reads settings, layers and playback state as the worker sees them right now.
    pub async fn snapshot(&self) -> Result<ScreenSnapshot, ScreenError> {
        let (tx, rx) = oneshot::channel();
        self.send(ScreenCommand::Snapshot { reply: tx }).await?;
        rx.await.map_err(|_| ScreenError::ReplyDropped)
    }

    /// Stops the worker. Commands sent afterwards fail with [`ScreenError::ChannelClosed`].
    pub async fn shutdown(&self) -> Result<(), ScreenError> {
        self.send(ScreenCommand::Shutdown).await
    }
}

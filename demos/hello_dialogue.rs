use dialogue_screen::layer::LayerUpdate;
use dialogue_screen::render::backends::null::NullBackend;
use dialogue_screen::settings::{Emotion, SettingsUpdate};
use dialogue_screen::{DialogueScreen, ScreenConfig, ScreenError, ScreenEvent, ScreenWorker};
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), ScreenError> {
    env_logger::init();

    // Options can be given the same way as on the web page, e.g.
    // `cargo run --example hello_dialogue -- "name=Luca&dia=[\"Hi!\"]"`
    let query = std::env::args().nth(1).unwrap_or_default();
    let config = ScreenConfig::from_query(&query);
    println!("Speaker: {}, {} lines in the script", config.speaker_name, config.script.len());

    let screen = DialogueScreen::new(config, Box::new(NullBackend::new()));
    let (handle, join) = ScreenWorker::spawn(screen);
    let mut event_rx = handle.subscribe_events();

    handle.resize(500, 890).await?;

    // Put an effect layer on top and nudge the portrait a bit
    let effect = handle.add_layer("sparkles", "images/sparkles.png").await?;
    handle
        .update_layer(
            effect.id,
            LayerUpdate {
                opacity: Some(0.5),
                rotation: Some(12.0),
                ..Default::default()
            },
        )
        .await?;
    handle
        .update_settings(SettingsUpdate {
            emotion: Some(Emotion::Exclamation),
            ..Default::default()
        })
        .await?;

    // Click through the first lines. The second click on every line lands mid-reveal
    // and shows the full text right away.
    for _ in 0..3 {
        handle.advance().await?;
        sleep(Duration::from_micros(600)).await;
        handle.advance().await?;
        sleep(Duration::from_millis(5)).await;
    }

    let snapshot = handle.snapshot().await?;
    println!("Showing: {:?}", snapshot.settings.dialogue_text);
    println!("Next line: {}, frames rendered: {}", snapshot.index, snapshot.redraws);

    handle.shutdown().await?;
    if let Err(join_err) = join.await {
        eprintln!("screen task panicked: {join_err}");
    }

    let mut seen_frames = 0usize;
    loop {
        match event_rx.try_recv() {
            Ok(ScreenEvent::Redraw { .. }) => seen_frames += 1,
            Ok(ScreenEvent::LineStarted { index, .. }) => println!("[event] line {index} started"),
            Ok(ScreenEvent::LineFinished { index, interrupted, .. }) => {
                println!("[event] line {index} finished (interrupted: {interrupted})")
            }
            Ok(other) => println!("[event] {other:?}"),
            Err(TryRecvError::Lagged(missed)) => println!("[event] missed {missed} events"),
            Err(_) => break,
        }
    }
    println!("Redraw events seen: {seen_frames}");

    println!("Done. Exiting.");
    Ok(())
}

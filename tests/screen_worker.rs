use dialogue_screen::layer::LayerUpdate;
use dialogue_screen::playback::PlaybackState;
use dialogue_screen::render::backends::null::NullBackend;
use dialogue_screen::settings::{DialogueType, FontTag, SettingsUpdate};
use dialogue_screen::{DialogueScreen, ScreenConfig, ScreenError, ScreenEvent, ScreenHandle, ScreenWorker};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

fn spawn(lines: &[&str]) -> (ScreenHandle, JoinHandle<()>, broadcast::Receiver<ScreenEvent>) {
    let config = ScreenConfig::builder()
        .script(lines.iter().map(|s| s.to_string()).collect())
        .build()
        .unwrap();
    let screen = DialogueScreen::with_wrapper(
        config,
        Box::new(NullBackend::new()),
        Box::new(|t: &str, _: DialogueType, _: FontTag| vec![t.to_string()]),
    );

    let (handle, join) = ScreenWorker::spawn(screen);
    let events = handle.subscribe_events();
    (handle, join, events)
}

/// Receives events until one matches, returning everything seen on the way.
async fn wait_for(
    events: &mut broadcast::Receiver<ScreenEvent>,
    pred: impl Fn(&ScreenEvent) -> bool,
) -> Vec<ScreenEvent> {
    let mut seen = Vec::new();
    loop {
        let ev = events.recv().await.expect("event stream ended");
        let done = pred(&ev);
        seen.push(ev);
        if done {
            return seen;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn line_reveals_and_finishes_on_its_own() {
    let (handle, join, mut events) = spawn(&["Hi", "Yo"]);

    handle.advance().await.unwrap();
    let seen = wait_for(&mut events, |e| matches!(e, ScreenEvent::LineFinished { .. })).await;

    assert!(matches!(seen[0], ScreenEvent::ScreenStarted { .. }));
    assert!(seen.iter().any(|e| matches!(e, ScreenEvent::LineStarted { index: 0, .. })));
    assert!(matches!(
        seen.last(),
        Some(ScreenEvent::LineFinished {
            index: 0,
            interrupted: false,
            ..
        })
    ));

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.settings.dialogue_text, "Hi");
    assert_eq!(snap.settings.speaker, "Rita");
    assert_eq!(snap.state, PlaybackState::Idle);
    assert_eq!(snap.index, 1);

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn second_click_completes_the_line() {
    let (handle, join, mut events) = spawn(&["A rather long line of dialogue", "Next"]);

    handle.advance().await.unwrap();
    handle.advance().await.unwrap();

    let seen = wait_for(&mut events, |e| matches!(e, ScreenEvent::LineFinished { .. })).await;
    assert!(matches!(
        seen.last(),
        Some(ScreenEvent::LineFinished {
            index: 0,
            interrupted: true,
            ..
        })
    ));

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.settings.dialogue_text, "A rather long line of dialogue");
    assert_eq!(snap.index, 1);

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn rapid_clicks_skip_at_most_one_line() {
    let (handle, join, mut events) = spawn(&["First line", "Second line", "Third line"]);

    for _ in 0..5 {
        handle.advance().await.unwrap();
    }

    wait_for(&mut events, |e| matches!(e, ScreenEvent::LineFinished { .. })).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.settings.dialogue_text, "First line");
    assert_eq!(snap.index, 1);
    assert_eq!(snap.state, PlaybackState::Idle);

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn redraw_frames_only_grow() {
    let (handle, join, mut events) = spawn(&["Hello", "World"]);

    handle.advance().await.unwrap();
    let seen = wait_for(&mut events, |e| matches!(e, ScreenEvent::LineFinished { .. })).await;

    let frames: Vec<u64> = seen
        .iter()
        .filter_map(|e| match e {
            ScreenEvent::Redraw { frame, .. } => Some(*frame),
            _ => None,
        })
        .collect();

    // One frame per revealed character
    assert_eq!(frames.len(), 5);
    assert!(frames.windows(2).all(|w| w[0] < w[1]));

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn layers_can_be_managed_remotely() {
    let (handle, join, mut events) = spawn(&["A"]);

    let layer = handle.add_layer("effect", "fx.png").await.unwrap();
    wait_for(&mut events, |e| matches!(e, ScreenEvent::LayerAdded { id, .. } if *id == layer.id)).await;

    handle
        .update_layer(
            layer.id,
            LayerUpdate {
                opacity: Some(3.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let snap = handle.snapshot().await.unwrap();
    let names: Vec<_> = snap.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["background", "portrait", "effect"]);
    assert_eq!(snap.layers[2].opacity, 1.0);

    // Removing everything leaves the last layer standing
    for l in snap.layers.iter() {
        handle.remove_layer(l.id).await.unwrap();
    }
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.layers.len(), 1);
    assert_eq!(snap.layers[0].name, "effect");

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn settings_updates_are_merged() {
    let (handle, join, _events) = spawn(&["A"]);

    handle
        .update_settings(SettingsUpdate {
            speaker: Some("Luca".into()),
            dialogue_type: Some(DialogueType::Caption),
            ..Default::default()
        })
        .await
        .unwrap();

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.settings.speaker, "Luca");
    assert_eq!(snap.settings.dialogue_type, DialogueType::Caption);
    assert_eq!(snap.settings.dialogue_text, "Click / Tap to start");

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn bad_resize_is_reported_as_event() {
    let (handle, join, mut events) = spawn(&["A"]);

    handle.resize(0, 100).await.unwrap();
    wait_for(&mut events, |e| matches!(e, ScreenEvent::ResizeFailed { .. })).await;

    handle.resize(250, 445).await.unwrap();
    wait_for(&mut events, |e| matches!(e, ScreenEvent::Redraw { .. })).await;

    handle.shutdown().await.unwrap();
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn closed_screen_rejects_commands() {
    let (handle, join, mut events) = spawn(&["A"]);

    handle.shutdown().await.unwrap();
    join.await.unwrap();

    wait_for(&mut events, |e| matches!(e, ScreenEvent::ScreenClosed { .. })).await;
    assert!(matches!(handle.advance().await, Err(ScreenError::ChannelClosed)));
    assert!(matches!(handle.snapshot().await, Err(ScreenError::ChannelClosed)));
}

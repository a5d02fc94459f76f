use crate::layer::Layer;
use crate::render::backend::SurfaceSize;
use crate::render::{Color, DisplayItem, RenderList};
use crate::settings::{DialogueType, Emotion, Settings};

/// Width the layout constants below were measured against.
const REFERENCE_WIDTH: f64 = 500.0;

fn box_color(kind: DialogueType) -> Color {
    match kind {
        DialogueType::Dialogue => Color::from_u8(16, 20, 38, 220),
        DialogueType::Narration => Color::from_u8(0, 0, 0, 170),
        DialogueType::Intro => Color::from_u8(0, 0, 0, 255),
        DialogueType::Caption => Color::from_u8(0, 0, 0, 120),
    }
}

/// Projects the settings and the ordered layers onto a display list for a surface of `size`.
///
/// This is a pure function: the same inputs always give the same list.
pub fn compose(settings: &Settings, layers: &[Layer], size: SurfaceSize) -> RenderList {
    let mut list = RenderList::new();
    let w = size.width as f64;
    let h = size.height as f64;
    let unit = if w > 0.0 { w / REFERENCE_WIDTH } else { 1.0 };

    list.add_command(DisplayItem::Clear {
        color: Color::from_u8(0, 0, 0, 255),
    });

    for layer in layers {
        list.add_command(DisplayItem::Image {
            layer: layer.id,
            image_ref: layer.image_ref.clone(),
            x: layer.offset_x,
            y: layer.offset_y,
            rotation: layer.rotation,
            scale: layer.scale,
            opacity: layer.opacity,
            flip_x: layer.flip_x,
            filter: (!layer.filter.is_empty()).then(|| layer.filter.clone()),
        });
    }

    if settings.emotion != Emotion::None {
        let side = if settings.emotion_is_left { 0.2 } else { 0.7 };
        list.add_command(DisplayItem::EmotionIcon {
            emotion: settings.emotion,
            x: w * side + settings.emotion_offset_x,
            y: h * 0.3 + settings.emotion_offset_y,
            size: 64.0 * unit,
        });
    }

    let (box_x, box_y, box_w, box_h) = match settings.dialogue_type {
        DialogueType::Caption => (0.0, 0.0, w, h * 0.08),
        DialogueType::Intro => (0.0, h * 0.4, w, h * 0.2),
        DialogueType::Dialogue | DialogueType::Narration => (w * 0.04, h * 0.72, w * 0.92, h * 0.22),
    };

    list.add_command(DisplayItem::DialogueBox {
        kind: settings.dialogue_type,
        x: box_x,
        y: box_y,
        w: box_w,
        h: box_h,
        color: box_color(settings.dialogue_type),
    });

    if settings.dialogue_type.shows_speaker() && !settings.speaker.is_empty() {
        list.add_command(DisplayItem::SpeakerName {
            text: settings.speaker.clone(),
            x: box_x + 20.0 * unit,
            y: box_y - 8.0 * unit,
            size: 24.0 * unit,
            color: Color::from_u8(255, 255, 255, 255),
        });
    }

    let size = 20.0 * unit;
    list.add_command(DisplayItem::DialogueText {
        lines: settings.dialogue_text.split('\n').map(str::to_string).collect(),
        x: box_x + 24.0 * unit,
        y: box_y + 40.0 * unit,
        size,
        line_height: size * 1.5,
        font: settings.font,
        color: Color::from_u8(255, 255, 255, 255),
    });

    list
}

//! Dialogue box settings.
//!
//! [`Settings`] is a single mutable record describing what the dialogue box currently
//! shows. It is never replaced wholesale: changes arrive as a [`SettingsUpdate`] and are
//! shallow-merged into the previous value, keeping every field the update leaves unset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of box drawn around the dialogue text.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogueType {
    /// Regular dialogue box with a speaker name plate
    #[default]
    Dialogue,
    /// Narration box, no name plate
    Narration,
    /// Chapter intro card
    Intro,
    /// Single caption line at the top of the screen
    Caption,
}

impl DialogueType {
    /// Whether this box type shows the speaker name plate.
    pub fn shows_speaker(&self) -> bool {
        matches!(self, DialogueType::Dialogue)
    }
}

/// Font/locale tag. Selects the wrapping rules and the typeface of the dialogue text.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontTag {
    #[default]
    En,
    Ja,
    ZhTw,
    ZhCn,
}

impl FontTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontTag::En => "en",
            FontTag::Ja => "ja",
            FontTag::ZhTw => "zh_tw",
            FontTag::ZhCn => "zh_cn",
        }
    }

    /// Parses a tag like `"en"` or `"zh_tw"`. Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en" => Some(FontTag::En),
            "ja" => Some(FontTag::Ja),
            "zh_tw" => Some(FontTag::ZhTw),
            "zh_cn" => Some(FontTag::ZhCn),
            _ => None,
        }
    }

    /// CJK text can break between any two characters, latin text only on whitespace.
    pub fn breaks_anywhere(&self) -> bool {
        !matches!(self, FontTag::En)
    }
}

impl fmt::Display for FontTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotion icon drawn next to the speaker portrait.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    None,
    Anger,
    Bad,
    Exclamation,
    Heart,
    Inspiration,
    Question,
    Sleep,
    Sweat,
}

/// Current state of the dialogue box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Name shown on the name plate. Empty hides the plate.
    pub speaker: String,
    /// Text currently shown, may be a prefix of a line during a reveal
    pub dialogue_text: String,
    pub dialogue_type: DialogueType,
    pub font: FontTag,
    pub emotion: Emotion,
    /// Draw the emotion icon on the left side instead of the right
    pub emotion_is_left: bool,
    pub emotion_offset_x: f64,
    pub emotion_offset_y: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speaker: String::new(),
            dialogue_text: String::new(),
            dialogue_type: DialogueType::Dialogue,
            font: FontTag::En,
            emotion: Emotion::None,
            emotion_is_left: true,
            emotion_offset_x: 0.0,
            emotion_offset_y: 0.0,
        }
    }
}

impl Settings {
    /// Shallow-merges `update` into the settings.
    pub fn apply(&mut self, update: SettingsUpdate) {
        let SettingsUpdate {
            speaker,
            dialogue_text,
            dialogue_type,
            font,
            emotion,
            emotion_is_left,
            emotion_offset_x,
            emotion_offset_y,
        } = update;

        if let Some(speaker) = speaker {
            self.speaker = speaker;
        }
        if let Some(dialogue_text) = dialogue_text {
            self.dialogue_text = dialogue_text;
        }
        if let Some(dialogue_type) = dialogue_type {
            self.dialogue_type = dialogue_type;
        }
        if let Some(font) = font {
            self.font = font;
        }
        if let Some(emotion) = emotion {
            self.emotion = emotion;
        }
        if let Some(emotion_is_left) = emotion_is_left {
            self.emotion_is_left = emotion_is_left;
        }
        if let Some(emotion_offset_x) = emotion_offset_x {
            self.emotion_offset_x = emotion_offset_x;
        }
        if let Some(emotion_offset_y) = emotion_offset_y {
            self.emotion_offset_y = emotion_offset_y;
        }
    }
}

/// Partial update of [`Settings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub speaker: Option<String>,
    pub dialogue_text: Option<String>,
    pub dialogue_type: Option<DialogueType>,
    pub font: Option<FontTag>,
    pub emotion: Option<Emotion>,
    pub emotion_is_left: Option<bool>,
    pub emotion_offset_x: Option<f64>,
    pub emotion_offset_y: Option<f64>,
}

impl SettingsUpdate {
    /// Update emitted for every step of a reveal: the speaker plus the visible text.
    pub fn line(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: Some(speaker.into()),
            dialogue_text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_preserves_unset_fields() {
        let mut settings = Settings {
            emotion: Emotion::Heart,
            emotion_offset_x: 12.0,
            ..Default::default()
        };

        settings.apply(SettingsUpdate::line("Rita", "Hello"));

        assert_eq!(settings.speaker, "Rita");
        assert_eq!(settings.dialogue_text, "Hello");
        assert_eq!(settings.emotion, Emotion::Heart);
        assert_eq!(settings.emotion_offset_x, 12.0);
        assert!(settings.emotion_is_left);
    }

    #[test]
    fn empty_update_changes_nothing() {
        let mut settings = Settings::default();
        let before = settings.clone();
        settings.apply(SettingsUpdate::default());
        assert_eq!(settings, before);
    }

    #[test]
    fn update_deserializes_from_partial_json() {
        let update: SettingsUpdate =
            serde_json::from_str(r#"{ "dialogue_type": "narration", "font": "zh_tw" }"#).unwrap();

        assert_eq!(update.dialogue_type, Some(DialogueType::Narration));
        assert_eq!(update.font, Some(FontTag::ZhTw));
        assert_eq!(update.speaker, None);
    }

    #[test]
    fn font_tags_round_trip_through_strings() {
        for tag in [FontTag::En, FontTag::Ja, FontTag::ZhTw, FontTag::ZhCn] {
            assert_eq!(FontTag::parse(tag.as_str()), Some(tag));
        }
        assert_eq!(FontTag::parse(" EN "), Some(FontTag::En));
        assert_eq!(FontTag::parse("klingon"), None);
    }

    #[test]
    fn only_dialogue_boxes_show_the_speaker() {
        assert!(DialogueType::Dialogue.shows_speaker());
        assert!(!DialogueType::Narration.shows_speaker());
        assert!(!DialogueType::Caption.shows_speaker());
    }
}

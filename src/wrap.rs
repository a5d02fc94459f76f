//! Line wrapping of raw dialogue text into displayable segments.
//!
//! Wrapping is a pluggable concern: the playback controller only needs something that
//! implements [`LineWrapper`]. Any `Fn(&str, DialogueType, FontTag) -> Vec<String>`
//! closure qualifies, which keeps tests short. [`GreedyWrapper`] is the default and
//! fills each row up to a per-box column limit.

use crate::settings::{DialogueType, FontTag};

/// Splits raw text into ordered display segments (one per row in the box).
///
/// Implementations must be deterministic: the same input always produces the same
/// segments.
pub trait LineWrapper: Send {
    fn wrap(&self, text: &str, kind: DialogueType, font: FontTag) -> Vec<String>;
}

impl<F> LineWrapper for F
where
    F: Fn(&str, DialogueType, FontTag) -> Vec<String> + Send,
{
    fn wrap(&self, text: &str, kind: DialogueType, font: FontTag) -> Vec<String> {
        self(text, kind, font)
    }
}

/// Greedy row filler with a fixed column budget per box type.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyWrapper;

impl GreedyWrapper {
    /// Number of characters that fit on a single row.
    pub fn columns(kind: DialogueType, font: FontTag) -> usize {
        let latin = match kind {
            DialogueType::Dialogue => 32,
            DialogueType::Narration => 36,
            DialogueType::Intro => 28,
            DialogueType::Caption => 40,
        };

        // Full-width glyphs take roughly twice the room
        if font.breaks_anywhere() {
            latin / 2
        } else {
            latin
        }
    }

    fn wrap_words(paragraph: &str, columns: usize, rows: &mut Vec<String>) {
        let mut row = String::new();
        let mut row_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if row_len > 0 && row_len + 1 + word_len > columns {
                rows.push(std::mem::take(&mut row));
                row_len = 0;
            }

            if word_len > columns {
                // A single word wider than the box gets hard-split
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(columns) {
                    if row_len > 0 {
                        rows.push(std::mem::take(&mut row));
                    }
                    row = chunk.iter().collect();
                    row_len = chunk.len();
                }
                continue;
            }

            if row_len > 0 {
                row.push(' ');
                row_len += 1;
            }
            row.push_str(word);
            row_len += word_len;
        }

        if row_len > 0 {
            rows.push(row);
        }
    }

    fn wrap_chars(paragraph: &str, columns: usize, rows: &mut Vec<String>) {
        let chars: Vec<char> = paragraph.trim().chars().collect();
        rows.extend(chars.chunks(columns).map(|c| c.iter().collect::<String>()));
    }
}

impl LineWrapper for GreedyWrapper {
    fn wrap(&self, text: &str, kind: DialogueType, font: FontTag) -> Vec<String> {
        let columns = Self::columns(kind, font).max(1);
        let mut rows = Vec::new();

        // Explicit newlines always start a new row
        for paragraph in text.lines() {
            if font.breaks_anywhere() {
                Self::wrap_chars(paragraph, columns, &mut rows);
            } else {
                Self::wrap_words(paragraph, columns, &mut rows);
            }
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_segment() {
        let rows = GreedyWrapper.wrap("Hi", DialogueType::Dialogue, FontTag::En);
        assert_eq!(rows, vec!["Hi".to_string()]);
    }

    #[test]
    fn rows_respect_the_column_budget() {
        let text = "Guys, guys, so um yesterday I learned that it is possible to like put a game in the Twitter player thing.";
        let rows = GreedyWrapper.wrap(text, DialogueType::Dialogue, FontTag::En);

        assert!(rows.len() > 1);
        for row in &rows {
            assert!(row.chars().count() <= 32, "row too wide: {row:?}");
        }
        assert_eq!(rows.join(" "), text);
    }

    #[test]
    fn oversized_words_are_hard_split() {
        let rows = GreedyWrapper.wrap(&"a".repeat(70), DialogueType::Dialogue, FontTag::En);
        assert_eq!(rows.iter().map(|r| r.len()).collect::<Vec<_>>(), vec![32, 32, 6]);
    }

    #[test]
    fn cjk_breaks_between_characters() {
        let text = "幾重にも辛酸を舐め、七難八苦を超え、艱難辛苦の果て";
        let rows = GreedyWrapper.wrap(text, DialogueType::Dialogue, FontTag::Ja);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].chars().count(), 16);
        assert_eq!(rows.concat(), text);
    }

    #[test]
    fn explicit_newlines_start_new_rows() {
        let rows = GreedyWrapper.wrap("one\ntwo", DialogueType::Caption, FontTag::En);
        assert_eq!(rows, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn wrapping_is_deterministic() {
        let text = "Anyways, I don't really have a plan for this.";
        let a = GreedyWrapper.wrap(text, DialogueType::Narration, FontTag::En);
        let b = GreedyWrapper.wrap(text, DialogueType::Narration, FontTag::En);
        assert_eq!(a, b);
    }

    #[test]
    fn closures_are_wrappers() {
        let wrapper = |text: &str, _: DialogueType, _: FontTag| vec![text.to_uppercase()];
        assert_eq!(wrapper.wrap("hey", DialogueType::Dialogue, FontTag::En), vec!["HEY".to_string()]);
    }
}

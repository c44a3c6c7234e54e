//! Page content elements consumed and produced by the segmenters.
//!
//! Words and letters come from an upstream text extractor with their
//! geometry already computed. Text lines and blocks are built here from the
//! leaves of the X-Y cut.

use serde::{Deserialize, Serialize};

use crate::utils::{HasBBox, Rectangle, get_bound, mode};

/// A single glyph with its rectangle and font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Letter {
    pub value: String,
    pub glyph: Rectangle,
    #[serde(default)]
    pub font_size: f64,
}

impl Letter {
    pub fn new(value: impl Into<String>, glyph: Rectangle, font_size: f64) -> Self {
        Self {
            value: value.into(),
            glyph,
            font_size,
        }
    }
}

/// A word: text plus bounding box, optionally with its letters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: Rectangle,
    #[serde(default)]
    pub letters: Vec<Letter>,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: Rectangle) -> Self {
        Self {
            text: text.into(),
            bbox,
            letters: Vec::new(),
        }
    }

    /// Builds a word whose bounding box encloses its letters.
    pub fn from_letters(letters: Vec<Letter>) -> Option<Self> {
        let bbox = get_bound(letters.iter().map(|l| l.glyph))?;
        let text = letters.iter().map(|l| l.value.as_str()).collect();
        Some(Self { text, bbox, letters })
    }

    /// Glyph `(width, height)` pairs, ignoring blank letters.
    ///
    /// Words extracted without letters report one averaged glyph per
    /// character.
    pub fn glyph_sizes(&self) -> Vec<(f64, f64)> {
        if self.letters.is_empty() {
            let chars = self.text.chars().filter(|c| !c.is_whitespace()).count().max(1);
            let w = self.bbox.width() / chars as f64;
            return vec![(w, self.bbox.height()); chars];
        }
        self.letters
            .iter()
            .filter(|l| !l.value.trim().is_empty())
            .map(|l| (l.glyph.width().abs(), l.glyph.height().abs()))
            .collect()
    }
}

impl HasBBox for Word {
    fn bbox(&self) -> Rectangle {
        self.bbox
    }
}

/// Modal glyph width and height over a set of words.
pub fn dominant_glyph_size(words: &[Word]) -> Option<(f64, f64)> {
    let sizes: Vec<(f64, f64)> = words.iter().flat_map(Word::glyph_sizes).collect();
    let w = mode(sizes.iter().map(|s| s.0))?;
    let h = mode(sizes.iter().map(|s| s.1))?;
    Some((w, h))
}

/// Words sharing a baseline band, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub bbox: Rectangle,
    pub words: Vec<Word>,
}

impl HasBBox for TextLine {
    fn bbox(&self) -> Rectangle {
        self.bbox
    }
}

impl TextLine {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A block of text lines, ordered top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub bbox: Rectangle,
    pub lines: Vec<TextLine>,
}

impl HasBBox for TextBlock {
    fn bbox(&self) -> Rectangle {
        self.bbox
    }
}

impl TextBlock {
    /// Groups words into lines and wraps them in a block.
    ///
    /// A word joins the current line when it overlaps the line vertically;
    /// otherwise it starts a new line. Returns `None` for an empty slice.
    pub fn from_words(words: &[Word]) -> Option<Self> {
        let bbox = get_bound(words.iter().map(|w| w.bbox))?;

        let mut sorted: Vec<&Word> = words.iter().collect();
        sorted.sort_by(|a, b| {
            b.bbox
                .top
                .total_cmp(&a.bbox.top)
                .then(a.bbox.left.total_cmp(&b.bbox.left))
        });

        let mut lines: Vec<(Rectangle, Vec<Word>)> = Vec::new();
        for word in sorted {
            match lines.last_mut() {
                Some((line_bbox, line_words))
                    if word.bbox.bottom < line_bbox.top && word.bbox.top > line_bbox.bottom =>
                {
                    *line_bbox = line_bbox.union(&word.bbox);
                    line_words.push(word.clone());
                }
                _ => lines.push((word.bbox, vec![word.clone()])),
            }
        }

        let lines = lines
            .into_iter()
            .map(|(bbox, mut words)| {
                words.sort_by(|a, b| a.bbox.left.total_cmp(&b.bbox.left));
                TextLine { bbox, words }
            })
            .collect();

        Some(Self { bbox, lines })
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.lines.iter().flat_map(|l| l.words.iter())
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Mean font size over all letters, `None` when no letter is known.
    pub fn average_font_size(&self) -> Option<f64> {
        let (sum, count) = self
            .words()
            .flat_map(|w| w.letters.iter())
            .fold((0.0, 0usize), |(s, c), l| (s + l.font_size, c + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, rect: (f64, f64, f64, f64)) -> Word {
        Word::new(text, Rectangle::from(rect))
    }

    #[test]
    fn from_letters_encloses_glyphs() {
        let w = Word::from_letters(vec![
            Letter::new("a", Rectangle::new(0.0, 0.0, 5.0, 10.0), 10.0),
            Letter::new("b", Rectangle::new(5.0, -2.0, 10.0, 10.0), 10.0),
        ])
        .unwrap();
        assert_eq!(w.text, "ab");
        assert_eq!(w.bbox, Rectangle::new(0.0, -2.0, 10.0, 10.0));
        assert!(Word::from_letters(Vec::new()).is_none());
    }

    #[test]
    fn glyph_sizes_fall_back_to_average_width() {
        let w = word("abcd", (0.0, 0.0, 20.0, 8.0));
        assert_eq!(w.glyph_sizes(), vec![(5.0, 8.0); 4]);
    }

    #[test]
    fn glyph_sizes_skip_blank_letters() {
        let mut w = word("a b", (0.0, 0.0, 15.0, 10.0));
        w.letters = vec![
            Letter::new("a", Rectangle::new(0.0, 0.0, 5.0, 10.0), 10.0),
            Letter::new(" ", Rectangle::new(5.0, 0.0, 7.0, 10.0), 10.0),
            Letter::new("b", Rectangle::new(10.0, 0.0, 15.0, 10.0), 10.0),
        ];
        assert_eq!(w.glyph_sizes().len(), 2);
    }

    #[test]
    fn dominant_glyph_size_uses_mode() {
        let words = vec![
            word("ab", (0.0, 0.0, 10.0, 10.0)),
            word("cd", (20.0, 0.0, 30.0, 10.0)),
            word("e", (40.0, 0.0, 48.0, 12.0)),
        ];
        assert_eq!(dominant_glyph_size(&words), Some((5.0, 10.0)));
        assert_eq!(dominant_glyph_size(&[]), None);
    }

    #[test]
    fn text_block_groups_lines_top_down() {
        let words = vec![
            word("world", (30.0, 20.0, 60.0, 30.0)),
            word("second", (0.0, 0.0, 40.0, 10.0)),
            word("hello", (0.0, 21.0, 25.0, 31.0)),
        ];
        let block = TextBlock::from_words(&words).unwrap();
        assert_eq!(block.lines.len(), 2);
        assert_eq!(block.text(), "hello world\nsecond");
        assert_eq!(block.bbox, Rectangle::new(0.0, 0.0, 60.0, 31.0));
        assert_eq!(block.average_font_size(), None);
    }
}

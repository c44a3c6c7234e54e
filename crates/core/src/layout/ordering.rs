//! Reading-order heuristics for text blocks.

use std::cmp::Ordering;

use crate::layout::elements::TextBlock;

/// Reorders a page's text blocks.
pub trait BlocksOrderer {
    fn order(&self, blocks: Vec<TextBlock>) -> Vec<TextBlock>;
}

/// Orders blocks by ascending average font size.
///
/// Body text tends to be smaller than headings, so this surfaces running
/// text first. Blocks without letter metrics sort last. The sort is stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontSizeOrderer;

impl BlocksOrderer for FontSizeOrderer {
    fn order(&self, blocks: Vec<TextBlock>) -> Vec<TextBlock> {
        let mut keyed: Vec<(Option<f64>, TextBlock)> = blocks
            .into_iter()
            .map(|b| (b.average_font_size(), b))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => a.total_cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        keyed.into_iter().map(|(_, b)| b).collect()
    }
}

/// Orders blocks top to bottom, then left to right.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopDownOrderer;

impl BlocksOrderer for TopDownOrderer {
    fn order(&self, mut blocks: Vec<TextBlock>) -> Vec<TextBlock> {
        blocks.sort_by(|a, b| {
            b.bbox
                .top
                .total_cmp(&a.bbox.top)
                .then(a.bbox.left.total_cmp(&b.bbox.left))
        });
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::elements::{Letter, Word};
    use crate::utils::Rectangle;

    fn block(text: &str, rect: (f64, f64, f64, f64), font_size: Option<f64>) -> TextBlock {
        let bbox = Rectangle::from(rect);
        let mut word = Word::new(text, bbox);
        if let Some(size) = font_size {
            word.letters = vec![Letter::new(text, bbox, size)];
        }
        TextBlock::from_words(&[word]).unwrap()
    }

    fn texts(blocks: &[TextBlock]) -> Vec<String> {
        blocks.iter().map(TextBlock::text).collect()
    }

    #[test]
    fn font_size_orderer_puts_small_text_first() {
        let blocks = vec![
            block("title", (0.0, 90.0, 50.0, 100.0), Some(18.0)),
            block("plain", (0.0, 0.0, 50.0, 10.0), None),
            block("body", (0.0, 50.0, 50.0, 60.0), Some(10.0)),
        ];
        let ordered = FontSizeOrderer.order(blocks);
        assert_eq!(texts(&ordered), vec!["body", "title", "plain"]);
    }

    #[test]
    fn top_down_orderer_reads_rows_left_to_right() {
        let blocks = vec![
            block("bottom", (0.0, 0.0, 50.0, 10.0), None),
            block("right", (60.0, 50.0, 90.0, 60.0), None),
            block("left", (0.0, 50.0, 50.0, 60.0), None),
        ];
        let ordered = TopDownOrderer.order(blocks);
        assert_eq!(texts(&ordered), vec!["left", "right", "bottom"]);
    }
}

//! Tests for maximal whitespace rectangle extraction.
//!
//! Covers the worked two-word gap, the structural guarantees of the cover
//! (containment, obstacle overlap, adjacency, result cap) on a generated
//! two-column page, and the iteration budget.

use pagecut_core::layout::{WhitespaceExtractor, WhitespaceParams, Word};
use pagecut_core::utils::Rectangle;

/// Two ragged columns of 30 lines, x in [50, 216] and [300, 466].
fn two_column_page() -> Vec<Word> {
    let mut words = Vec::new();
    for line in 0..30 {
        let y = 100.0 + line as f64 * 15.0;
        for col_left in [50.0, 300.0] {
            let mut x = col_left;
            for k in 0..3 {
                let w = 40.0 + ((line * 3 + k * 5) % 4) as f64 * 5.0;
                words.push(Word::new("word", Rectangle::new(x, y, x + w, y + 10.0)));
                x += w + 8.0;
            }
        }
    }
    words
}

fn extract(words: &[Word], params: WhitespaceParams) -> pagecut_core::layout::WhitespaceCover {
    WhitespaceExtractor::new(params)
        .unwrap()
        .extract_from_words(words)
        .unwrap()
}

// ============================================================================
// Worked examples
// ============================================================================

#[test]
fn test_gap_between_two_words() {
    let extractor = WhitespaceExtractor::default();
    let bound = Rectangle::new(0.0, 0.0, 30.0, 10.0);
    let obstacles = vec![
        Rectangle::new(0.0, 0.0, 10.0, 10.0),
        Rectangle::new(20.0, 0.0, 30.0, 10.0),
    ];
    let cover = extractor.extract(bound, obstacles, 1.0, 1.0);
    assert_eq!(cover.rectangles, vec![Rectangle::new(10.0, 0.0, 20.0, 10.0)]);
    assert!(!cover.exhausted);
}

#[test]
fn test_gap_from_words_uses_word_bound() {
    let words = vec![
        Word::new("ab", Rectangle::new(0.0, 0.0, 10.0, 10.0)),
        Word::new("cd", Rectangle::new(20.0, 0.0, 30.0, 10.0)),
    ];
    // glyphs are 5 x 10: sub-rectangles must be taller than 12.5, so the
    // 10 high gap is never explored.
    let cover = extract(&words, WhitespaceParams::default());
    assert_eq!(cover.bound, Rectangle::new(0.0, 0.0, 30.0, 10.0));
    assert!(cover.rectangles.is_empty());

    let words: Vec<Word> = words
        .into_iter()
        .map(|w| Word::new("a", w.bbox))
        .collect();
    let params = WhitespaceParams {
        min_size_factor: 0.5,
        ..Default::default()
    };
    let cover = extract(&words, params);
    assert_eq!(cover.rectangles, vec![Rectangle::new(10.0, 0.0, 20.0, 10.0)]);
}

#[test]
fn test_empty_word_list_is_an_error() {
    let extractor = WhitespaceExtractor::default();
    assert!(extractor.extract_from_words(&[]).is_err());
    let flat = vec![Word::new("-", Rectangle::new(0.0, 5.0, 10.0, 5.0))];
    assert!(extractor.extract_from_words(&flat).is_err());
}

// ============================================================================
// Structural properties
// ============================================================================

#[test]
fn test_cover_respects_result_cap() {
    let words = two_column_page();
    let cover = extract(&words, WhitespaceParams::default());
    assert!(!cover.rectangles.is_empty());
    assert!(cover.rectangles.len() <= 30);

    let params = WhitespaceParams {
        max_rectangles: 3,
        ..Default::default()
    };
    let capped = extract(&words, params);
    assert!(!capped.rectangles.is_empty() && capped.rectangles.len() <= 3);
    assert_eq!(capped.rectangles[..], cover.rectangles[..capped.rectangles.len()]);
}

#[test]
fn test_no_rectangle_contains_another() {
    let cover = extract(&two_column_page(), WhitespaceParams::default());
    for (i, a) in cover.rectangles.iter().enumerate() {
        for (j, b) in cover.rectangles.iter().enumerate() {
            if i != j {
                assert!(!a.contains(b), "{a} contains {b}");
            }
        }
    }
}

#[test]
fn test_obstacle_overlap_stays_within_fuzziness() {
    let words = two_column_page();
    let fuzziness = WhitespaceParams::default().fuzziness;
    let cover = extract(&words, WhitespaceParams::default());
    for r in &cover.rectangles {
        let area = r.area();
        let mut total = 0.0;
        for w in &words {
            let overlap = r.overlapping_area(&w.bbox);
            assert!(overlap <= area.min(w.bbox.area()) * fuzziness + 1e-9);
            total += overlap;
        }
        assert!(total <= area * fuzziness + 1e-9, "{r} covers {total}");
    }
}

#[test]
fn test_rectangles_grow_from_border_or_accepted_whitespace() {
    let cover = extract(&two_column_page(), WhitespaceParams::default());
    let b = cover.bound;
    for (i, r) in cover.rectangles.iter().enumerate() {
        let on_border =
            r.left == b.left || r.right == b.right || r.bottom == b.bottom || r.top == b.top;
        let next_to_earlier = cover.rectangles[..i].iter().any(|s| s.is_adjacent_to(r));
        assert!(on_border || next_to_earlier, "{r} is isolated");
        assert!(b.contains(r));
    }
}

#[test]
fn test_column_gap_is_found() {
    let cover = extract(&two_column_page(), WhitespaceParams::default());
    assert!(
        cover
            .rectangles
            .iter()
            .any(|r| r.right == 300.0 && (200.0..=216.0).contains(&r.left) && r.height() >= 400.0),
        "no gap between columns in {:?}",
        cover.rectangles
    );
}

#[test]
fn test_extraction_is_deterministic() {
    let words = two_column_page();
    let a = extract(&words, WhitespaceParams::default());
    let b = extract(&words, WhitespaceParams::default());
    assert_eq!(a, b);
}

// ============================================================================
// Budget
// ============================================================================

#[test]
fn test_iteration_budget_returns_partial_cover() {
    let params = WhitespaceParams {
        max_iterations: 5,
        ..Default::default()
    };
    let cover = extract(&two_column_page(), params);
    assert!(cover.exhausted);
    assert_eq!(cover.iterations, 5);
    assert!(cover.rectangles.len() <= 5);
}

#[test]
fn test_invalid_params_are_rejected() {
    let params = WhitespaceParams {
        fuzziness: -0.1,
        ..Default::default()
    };
    assert!(WhitespaceExtractor::new(params).is_err());
}

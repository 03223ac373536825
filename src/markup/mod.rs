//! Markdown markup detection and style projection.
//!
//! This module handles:
//! - The ordered pattern catalog (headings, emphasis, todos, lists)
//! - Line classification shared with the editing commands
//! - Projecting raw text into a partition of styled runs

pub mod lines;
mod patterns;
mod projector;
mod types;

pub use patterns::{
    BULLET_GLYPH, CATALOG, ClassifiedLine, LineKind, Pattern, classify_line, collect_matches,
    is_empty_list_marker, todo_marker_range, todo_matches,
};
pub use projector::project;
pub use types::{
    ClaimedRanges, FontWeight, HeadingLevel, ListParagraph, Match, PatternId, RunStyle, SizeTier,
    StyleEdit, StyleOp, StyledRun, Visibility,
};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_projection_partitions_any_text(text in "[-#*~\\[\\]xX0-9. a-zé\\n\\t]{0,80}") {
            let runs = project(&text);
            let mut expected = 0;
            for run in &runs {
                prop_assert_eq!(run.range.start, expected);
                prop_assert!(run.range.end > run.range.start);
                prop_assert!(text.is_char_boundary(run.range.start));
                expected = run.range.end;
            }
            prop_assert_eq!(expected, text.len());
        }

        #[test]
        fn test_projection_is_deterministic(text in "\\PC{0,60}") {
            prop_assert_eq!(project(&text), project(&text));
        }

        #[test]
        fn test_adjacent_runs_differ(text in "[-#*~ ab\\n]{0,60}") {
            let runs = project(&text);
            for pair in runs.windows(2) {
                prop_assert_ne!(pair[0].style, pair[1].style);
            }
        }
    }
}

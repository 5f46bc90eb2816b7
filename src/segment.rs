//! Event segmentation.
//!
//! Splits bulletin text into blank-line separated groups. Purely
//! structural: line content is never inspected beyond blankness.

use crate::models::RawEventGroup;
use std::str::Lines;

/// Lazy iterator over the event groups of a bulletin
///
/// Clones are independent cursors over the same text.
#[derive(Debug, Clone)]
pub struct EventSegments<'a> {
    lines: Lines<'a>,
    next_index: usize,
}

/// Segment bulletin text into event groups
pub fn segment_events(text: &str) -> EventSegments<'_> {
    EventSegments {
        lines: text.lines(),
        next_index: 1,
    }
}

impl<'a> Iterator for EventSegments<'a> {
    type Item = RawEventGroup<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut lines = Vec::new();

        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                if lines.is_empty() {
                    continue;
                }
                break;
            }
            lines.push(line);
        }

        if lines.is_empty() {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        Some(RawEventGroup { index, lines })
    }
}

impl std::iter::FusedIterator for EventSegments<'_> {}

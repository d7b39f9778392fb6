//! Span 单元测试
//!
//! 测试源位置跟踪的 Position 和 Span

use crate::util::span::{Position, Span};

#[cfg(test)]
mod position_tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_position_start() {
        let pos = Position::start();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_feed_advances_column() {
        let mut pos = Position::start();
        pos.feed("abc");
        assert_eq!(pos, Position::with_offset(1, 4, 3));
    }

    #[test]
    fn test_feed_resets_column_on_newline() {
        let mut pos = Position::start();
        pos.feed("ab\ncd");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 5);
    }

    #[test]
    fn test_feed_counts_characters_not_bytes() {
        let mut pos = Position::start();
        pos.feed("é€");
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, "é€".len());
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(3, 2) > Position::new(3, 1));
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(10, 20).to_string(), "line 10, column 20");
    }

    proptest! {
        #[test]
        fn prop_feed_counts_line_terminators(lines in proptest::collection::vec("[a-z ]{0,8}", 1..12)) {
            let text = lines.join("\n");
            let mut pos = Position::start();
            pos.feed(&text);

            let terminators = lines.len() - 1;
            prop_assert_eq!(pos.line, 1 + terminators);
            let last = lines.last().map(|l| l.chars().count()).unwrap_or(0);
            prop_assert_eq!(pos.column, 1 + last);
        }
    }
}

#[cfg(test)]
mod span_tests {
    use super::*;

    #[test]
    fn test_span_between() {
        let a = Span::new(Position::new(1, 1), Position::new(1, 5));
        let b = Span::new(Position::new(3, 2), Position::new(3, 9));
        let joined = Span::between(a, b);
        assert_eq!(joined.start, a.start);
        assert_eq!(joined.end, b.end);
        assert!(joined.start <= joined.end);
    }

    #[test]
    fn test_span_len() {
        let span = Span::new(
            Position::with_offset(1, 1, 4),
            Position::with_offset(1, 6, 9),
        );
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_span_display_single_line() {
        let span = Span::new(Position::new(2, 3), Position::new(2, 7));
        assert_eq!(span.to_string(), "line 2 from column 3 to column 7");
    }

    #[test]
    fn test_span_display_multi_line() {
        let span = Span::new(Position::new(2, 3), Position::new(4, 1));
        assert_eq!(span.to_string(), "line 2, column 3 to line 4, column 1");
    }
}

//! Property tests for the format parser

use glyphgrid_format::{parse, ParseCommandStacks, Parser};
use proptest::prelude::*;

proptest! {
    /// Text without brackets or backticks passes through unchanged
    #[test]
    fn test_plain_text_round_trip(text in "[^\\[`]{0,64}") {
        let string = parse(&text);
        prop_assert_eq!(string.string(), text.clone());
        prop_assert_eq!(string.len(), text.chars().count());
    }

    /// Arbitrary input never panics and never produces more glyphs than chars
    #[test]
    fn test_arbitrary_input(text in ".{0,64}") {
        let string = parse(&text);
        prop_assert!(string.len() <= text.chars().count());
    }

    /// Commands produce no glyphs of their own
    #[test]
    fn test_commands_are_zero_width(
        before in "[a-z ]{0,10}",
        after in "[a-z ]{0,10}",
        command in prop_oneof![
            Just("[c:r f:red]"),
            Just("[c:r b:10,20,30,x:2]"),
            Just("[c:m h]"),
            Just("[c:u]"),
            Just("[c:u 3:a]"),
            Just("[c:g f:red:blue:3]"),
            Just("[c:b 2]"),
            Just("[c:sg *:1]"),
            Just("[c:ce]"),
        ],
    ) {
        let text = format!("{before}{command}{after}");
        let string = parse(&text);
        prop_assert_eq!(string.len(), before.len() + after.len());
    }

    /// Undoing everything leaves default styling
    #[test]
    fn test_undo_all_restores_defaults(pushes in 1..6usize) {
        let mut text = String::new();
        for i in 0..pushes {
            text.push_str(&format!("[c:r f:{},0,0]x", i * 40));
        }
        text.push_str(&format!("[c:u {pushes}]y"));

        let mut stacks = ParseCommandStacks::new();
        let string = Parser::new().parse_with(&text, None, &mut stacks);
        prop_assert!(stacks.is_empty());
        prop_assert_eq!(string[pushes].foreground, glyphgrid_core::Color::WHITE);
    }
}

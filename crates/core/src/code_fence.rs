//! Code fence tracking for the directive scanner.
//!
//! Directive markers inside fenced code are literal text. The scanner feeds
//! every line through [`advance_fence_state`] and ignores lines it reports as
//! code.

/// Fence parsing phases tracked across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FencePhase {
    /// Not currently inside a fence.
    #[default]
    Outside,
    /// Within fence contents.
    InsideFence,
}

/// Current fence state (phase, marker, and length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceState {
    /// Current fence phase.
    pub phase: FencePhase,
    /// Fence marker character (``` or ~~~).
    pub marker: Option<char>,
    /// Length of the opening fence (number of ` or ~ characters).
    pub length: usize,
}

/// Outcome of processing a single line for fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParseOutcome {
    /// State to carry into the next line.
    pub next_state: FenceState,
    /// Whether the line is a fence or fenced content.
    pub is_code: bool,
}

/// Advance fence state based on a single line of text.
pub fn advance_fence_state(line: &str, state: FenceState) -> LineParseOutcome {
    let (visual_indent, byte_offset) = leading_whitespace_info(line);
    let after_indent = &line[byte_offset..];

    match state.phase {
        FencePhase::Outside => {
            // 4+ columns is an indented code block, never a fence opener.
            if visual_indent <= 3
                && let Some((marker, length)) = detect_opening_fence(after_indent)
            {
                return LineParseOutcome {
                    next_state: FenceState {
                        phase: FencePhase::InsideFence,
                        marker: Some(marker),
                        length,
                    },
                    is_code: true,
                };
            }
            LineParseOutcome {
                next_state: state,
                is_code: false,
            }
        }
        FencePhase::InsideFence => {
            let closes = visual_indent <= 3
                && detect_closing_fence(after_indent)
                    .is_some_and(|(marker, len)| Some(marker) == state.marker && len >= state.length);
            LineParseOutcome {
                next_state: if closes { FenceState::default() } else { state },
                is_code: true,
            }
        }
    }
}

/// Returns (visual_columns, byte_offset) for leading whitespace.
/// Visual columns expand tabs to 4-column boundaries per CommonMark.
pub(crate) fn leading_whitespace_info(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => {
                col += 1;
                bytes += 1;
            }
            b'\t' => {
                col += 4 - (col % 4);
                bytes += 1;
            }
            _ => break,
        }
    }
    (col, bytes)
}

fn marker_run(after_indent: &str) -> Option<(char, usize)> {
    let first = after_indent.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run_len = after_indent.chars().take_while(|c| *c == first).count();
    (run_len >= 3).then_some((first, run_len))
}

fn detect_opening_fence(after_indent: &str) -> Option<(char, usize)> {
    let (marker, length) = marker_run(after_indent)?;
    // A backtick fence's info string may not contain backticks.
    if marker == '`' && after_indent[length..].contains('`') {
        return None;
    }
    Some((marker, length))
}

/// A closing fence has only fence markers followed by optional whitespace.
fn detect_closing_fence(after_indent: &str) -> Option<(char, usize)> {
    let (marker, length) = marker_run(after_indent)?;
    after_indent[length..]
        .chars()
        .all(char::is_whitespace)
        .then_some((marker, length))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lines: &[&str]) -> Vec<bool> {
        let mut state = FenceState::default();
        lines
            .iter()
            .map(|line| {
                let outcome = advance_fence_state(line, state);
                state = outcome.next_state;
                outcome.is_code
            })
            .collect()
    }

    #[test]
    fn opens_and_closes_backtick_fence() {
        assert_eq!(
            run(&["```js", ":::raw", "```", ":::raw"]),
            vec![true, true, true, false]
        );
    }

    #[test]
    fn deeply_indented_fence_not_opened() {
        assert_eq!(run(&["    ```js", "::raw[x]"]), vec![false, false]);
        assert_eq!(run(&["\t```js"]), vec![false]);
    }

    #[test]
    fn ignores_mismatched_marker() {
        let start = advance_fence_state("~~~ts", FenceState::default());
        let still_inside = advance_fence_state("```", start.next_state);
        assert!(still_inside.is_code);
        assert_eq!(still_inside.next_state.marker, Some('~'));
    }

    #[test]
    fn requires_three_markers_to_open() {
        assert_eq!(run(&["``", "x"]), vec![false, false]);
    }

    #[test]
    fn backtick_info_string_cannot_contain_backticks() {
        assert_eq!(run(&["``` a`b", "x"]), vec![false, false]);
        assert_eq!(run(&["~~~ a`b", "x"]), vec![true, true]);
    }

    #[test]
    fn fence_with_info_string_does_not_close() {
        assert_eq!(run(&["```", "content", "```js", "more"]), vec![true; 4]);
    }

    #[test]
    fn shorter_fence_does_not_close_longer_one() {
        assert_eq!(
            run(&["````markdown", "```js", ":::note", "```", "````", "after"]),
            vec![true, true, true, true, true, false]
        );
    }

    #[test]
    fn indented_closer_closes_unindented_fence() {
        assert_eq!(run(&["```", "code", "  ```", "x"]), vec![true, true, true, false]);
    }
}

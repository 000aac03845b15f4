//! Markdown returned by the OCR backend, reduced to readable blocks.
//!
//! The backend emits plain markdown. We only need enough structure to lay the
//! text out and to give the definition flow a per-block context window, so
//! this parses headings, list items, and paragraphs and strips the inline
//! markers we would otherwise read aloud.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text_utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem,
}

/// One display block of the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

static LINK_OR_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!?\[([^\]]*)\]\(([^)]*)\)").unwrap());
static ORDERED_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+").unwrap());

/// Parse backend markdown into blocks. Empty or whitespace-only input yields
/// no blocks.
pub fn parse_markdown(markdown: &str) -> Vec<Block> {
    let normalized = text_utils::normalize(markdown);
    let mut blocks = Vec::new();
    let mut paragraph = String::new();

    let mut flush = |paragraph: &mut String, blocks: &mut Vec<Block>| {
        let text = text_utils::collapse_whitespace(paragraph);
        if !text.is_empty() {
            blocks.push(Block {
                kind: BlockKind::Paragraph,
                text,
            });
        }
        paragraph.clear();
    };

    for line in normalized.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush(&mut paragraph, &mut blocks);
            continue;
        }

        if let Some((level, rest)) = heading_line(trimmed) {
            flush(&mut paragraph, &mut blocks);
            let text = strip_inline(rest);
            if !text.is_empty() {
                blocks.push(Block {
                    kind: BlockKind::Heading(level),
                    text,
                });
            }
            continue;
        }

        if let Some(rest) = list_item_line(trimmed) {
            flush(&mut paragraph, &mut blocks);
            let text = strip_inline(rest);
            if !text.is_empty() {
                blocks.push(Block {
                    kind: BlockKind::ListItem,
                    text,
                });
            }
            continue;
        }

        if !paragraph.is_empty() {
            paragraph.push(' ');
        }
        paragraph.push_str(&strip_inline(trimmed));
    }
    flush(&mut paragraph, &mut blocks);

    blocks
}

fn heading_line(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if (1..=6).contains(&hashes) {
        let rest = &line[hashes..];
        if let Some(stripped) = rest.strip_prefix(' ') {
            return Some((hashes as u8, stripped));
        }
    }
    None
}

fn list_item_line(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest);
        }
    }
    ORDERED_MARKER
        .find(line)
        .map(|m| &line[m.end()..])
}

/// Drop inline markdown syntax, keeping the visible text. Images keep their
/// alt text, links keep their label.
fn strip_inline(text: &str) -> String {
    let without_links = LINK_OR_IMAGE.replace_all(text, "$1");
    let mut out = String::with_capacity(without_links.len());
    for ch in without_links.chars() {
        if !matches!(ch, '*' | '`') {
            out.push(ch);
        }
    }
    text_utils::collapse_whitespace(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_blocks() {
        assert!(parse_markdown("").is_empty());
        assert!(parse_markdown("  \n\n \t ").is_empty());
    }

    #[test]
    fn splits_headings_lists_and_paragraphs() {
        let blocks = parse_markdown("# Title\n\nFirst line\ncontinues here.\n\n- one\n- two\n");
        assert_eq!(
            blocks,
            vec![
                Block {
                    kind: BlockKind::Heading(1),
                    text: "Title".into()
                },
                Block {
                    kind: BlockKind::Paragraph,
                    text: "First line continues here.".into()
                },
                Block {
                    kind: BlockKind::ListItem,
                    text: "one".into()
                },
                Block {
                    kind: BlockKind::ListItem,
                    text: "two".into()
                },
            ]
        );
    }

    #[test]
    fn strips_inline_markers() {
        let blocks = parse_markdown("Some **bold** and a [link](http://x) plus ![alt](img.png).");
        assert_eq!(blocks[0].text, "Some bold and a link plus alt.");
    }

    #[test]
    fn ordered_lists_lose_their_numbers() {
        let blocks = parse_markdown("1. first\n2. second");
        assert_eq!(blocks[0].kind, BlockKind::ListItem);
        assert_eq!(blocks[0].text, "first");
        assert_eq!(blocks[1].text, "second");
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        let blocks = parse_markdown("#tag in text");
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
    }
}

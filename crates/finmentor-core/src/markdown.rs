//! Markdown Rendering
//!
//! Converts the restricted markdown subset produced by the model into render
//! nodes. Supported: `# ` / `## ` headings, `* ` / `- ` lists, pipe tables
//! and `**bold**` spans. Rendering is total; anything unrecognized is a
//! paragraph.

use serde::{Deserialize, Serialize};

/// Inline span
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),
    Bold(String),
}

/// Sequence of inline spans
pub type Spans = Vec<Inline>;

/// Block-level render node
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Spans),
    Heading1(Spans),
    Heading2(Spans),
    List(Vec<Spans>),
    Table { headers: Vec<Spans>, rows: Vec<Vec<Spans>> },
}

const BOLD: &str = "**";

/// Render a text blob into blocks
pub fn render(text: &str) -> Vec<Block> {
    split_blocks(text)
        .iter()
        .map(|block| classify(block))
        .collect()
}

/// Split on runs of blank lines; each block is trimmed and empty ones dropped
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            flush(&mut current, &mut blocks);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut blocks);

    blocks
}

fn flush(lines: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let block = lines.join("\n");
    let trimmed = block.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_owned());
    }
    lines.clear();
}

fn classify(block: &str) -> Block {
    if let Some(rest) = block.strip_prefix("# ") {
        return Block::Heading1(parse_inline(rest));
    }
    if let Some(rest) = block.strip_prefix("## ") {
        return Block::Heading2(parse_inline(rest));
    }
    if block.starts_with("* ") || block.starts_with("- ") {
        return Block::List(block.lines().map(|l| parse_inline(strip_marker(l))).collect());
    }
    if block.contains('|') {
        return parse_table(block).unwrap_or_else(|| Block::Paragraph(parse_inline(block)));
    }
    Block::Paragraph(parse_inline(block))
}

/// Drop a leading `*` or `-` followed by one whitespace character
fn strip_marker(line: &str) -> &str {
    let Some(rest) = line.strip_prefix(['*', '-']) else {
        return line;
    };
    match rest.chars().next() {
        Some(c) if c.is_whitespace() => &rest[c.len_utf8()..],
        _ => line,
    }
}

/// A table needs a separator row containing `---` and at least one header cell
fn parse_table(block: &str) -> Option<Block> {
    let lines: Vec<&str> = block.lines().filter(|l| !l.is_empty()).collect();
    if lines.len() < 2 || !lines[1].contains("---") {
        return None;
    }

    let headers = split_cells(lines[0]);
    if headers.is_empty() {
        return None;
    }
    let rows = lines[2..].iter().map(|line| split_cells(line)).collect();

    Some(Block::Table { headers, rows })
}

fn split_cells(line: &str) -> Vec<Spans> {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(parse_inline)
        .collect()
}

/// Split text into plain and bold spans.
///
/// A bold span runs from a `**` to the nearest following `**` on the same
/// line. Unmatched markers stay as text.
pub fn parse_inline(text: &str) -> Spans {
    let mut spans = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(BOLD) {
        let open = cursor + offset;
        let inner_start = open + BOLD.len();

        match closing_marker(&text[inner_start..]) {
            Some(len) => {
                if open > plain_start {
                    spans.push(Inline::Text(text[plain_start..open].to_owned()));
                }
                spans.push(Inline::Bold(text[inner_start..inner_start + len].to_owned()));
                cursor = inner_start + len + BOLD.len();
                plain_start = cursor;
            }
            // `*` is one byte, so stepping by one stays on a char boundary
            None => cursor = open + 1,
        }
    }

    if plain_start < text.len() {
        spans.push(Inline::Text(text[plain_start..].to_owned()));
    }
    spans
}

/// Byte length of the bold content, if a closing marker exists before the line ends
fn closing_marker(rest: &str) -> Option<usize> {
    let line_end = rest.find('\n').unwrap_or(rest.len());
    rest[..line_end].find(BOLD)
}

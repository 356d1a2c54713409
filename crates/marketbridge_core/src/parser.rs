//! Section parser: turns an agent's freeform output into typed content blocks.
//!
//! Agents write in two styles. Some separate sections with blank lines,
//! others open each section with a pictographic marker on its own line and
//! no blank line in between. Both are handled by one pass: blank lines always
//! close a segment, and a line that starts with a section marker always opens
//! a new one.
//!
//! The first line of a segment is a header when it carries a section marker
//! or one of the uppercase keywords. Remaining lines of a header segment are
//! bullets when they start with a bullet glyph, plain lines otherwise. A
//! segment without a header line is plain throughout. Every non-blank input
//! line yields exactly one block, in input order.

use std::sync::OnceLock;

use regex::Regex;

/// Pictographic markers that open a section.
///
/// The warning sign is listed without its variation selector so that both
/// `⚠` and `⚠️` match.
pub const SECTION_MARKERS: &[&str] = &["🎨", "💰", "📦", "🎯", "📊", "✅", "⚠", "❌"];

/// Keywords that promote a segment's first line to a header.
pub const HEADER_KEYWORDS: &[&str] = &[
    "BREAKDOWN",
    "ANALYSIS",
    "METRICS",
    "STRATEGY",
    "STATUS",
    "COORDINATION",
];

const BULLET_GLYPHS: &[char] = &['•', '◦', '▪'];
// Only bullets when followed by whitespace, so "-5%" stays plain.
const ASCII_BULLETS: &[char] = &['-', '*'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Header,
    Bullet,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Header(String),
    Bullet(String),
    Plain(String),
}

impl ContentBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            ContentBlock::Header(_) => BlockKind::Header,
            ContentBlock::Bullet(_) => BlockKind::Bullet,
            ContentBlock::Plain(_) => BlockKind::Plain,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ContentBlock::Header(text) | ContentBlock::Bullet(text) | ContentBlock::Plain(text) => {
                text
            }
        }
    }
}

/// Parses one stage's raw text into an ordered block sequence.
///
/// Total and deterministic: empty or malformed input degrades to plain
/// blocks (or no blocks at all), never to an error.
pub fn parse_blocks(raw: &str) -> Vec<ContentBlock> {
    let normalized = normalize(raw);
    segment(&normalized)
        .into_iter()
        .flat_map(|lines| classify(&lines))
        .collect()
}

/// Strips `**bold**`, `` `code` `` and `<!-- comment -->` markup, keeping the
/// enclosed text and every line break.
///
/// Removing one token can expose another (`<!<!---->-- x -->`), so the pass
/// repeats until nothing matches. Every replacement shortens the text, which
/// bounds the loop.
pub fn normalize(raw: &str) -> String {
    static BOLD_RE: OnceLock<Option<Regex>> = OnceLock::new();
    static CODE_RE: OnceLock<Option<Regex>> = OnceLock::new();
    static COMMENT_RE: OnceLock<Option<Regex>> = OnceLock::new();

    let rules = [
        (cached_regex(&BOLD_RE, r"\*\*(.*?)\*\*"), "$1"),
        (cached_regex(&CODE_RE, r"`(.*?)`"), "$1"),
        (cached_regex(&COMMENT_RE, r"<!--.*?-->"), ""),
    ];

    let mut text = raw.to_string();
    loop {
        let mut changed = false;
        for (regex, replacement) in &rules {
            let Some(regex) = regex else { continue };
            if regex.is_match(&text) {
                let stripped = regex.replace_all(&text, *replacement).into_owned();
                text = stripped;
                changed = true;
            }
        }
        if !changed {
            return text;
        }
    }
}

/// Compiles `pattern` once per cell. A pattern that fails to compile leaves
/// the cell empty and callers skip that rule.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Returns the text after a leading bullet glyph, or `None` when the line is
/// not a bullet.
pub fn strip_bullet_marker(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let first = chars.next()?;
    let rest = chars.as_str();
    let is_bullet = BULLET_GLYPHS.contains(&first)
        || (ASCII_BULLETS.contains(&first) && rest.starts_with(char::is_whitespace));
    if !is_bullet {
        return None;
    }
    let text = rest.trim_start();
    (!text.is_empty()).then_some(text)
}

pub fn is_header_line(line: &str) -> bool {
    SECTION_MARKERS.iter().any(|marker| line.contains(marker))
        || HEADER_KEYWORDS.iter().any(|keyword| line.contains(keyword))
}

fn starts_with_marker(line: &str) -> bool {
    SECTION_MARKERS.iter().any(|marker| line.starts_with(marker))
}

fn segment(text: &str) -> Vec<Vec<&str>> {
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            continue;
        }
        if starts_with_marker(line) && !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
        current.push(line);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn classify(lines: &[&str]) -> Vec<ContentBlock> {
    let Some((first, rest)) = lines.split_first() else {
        return Vec::new();
    };

    if !is_header_line(first) {
        return lines
            .iter()
            .map(|line| ContentBlock::Plain((*line).to_string()))
            .collect();
    }

    let mut blocks = Vec::with_capacity(lines.len());
    blocks.push(ContentBlock::Header((*first).to_string()));
    blocks.extend(rest.iter().map(|line| match strip_bullet_marker(line) {
        Some(text) => ContentBlock::Bullet(text.to_string()),
        None => ContentBlock::Plain((*line).to_string()),
    }));
    blocks
}

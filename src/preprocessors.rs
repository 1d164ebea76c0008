//! Line-level passes that run before block parsing.

use crate::config::{Options, SafeMode};
use crate::context::Context;
use crate::registry::Registry;
use crate::util::{ETX, STX, expand_tabs, is_block_level};
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

/// A pass over the source lines.
pub trait Preprocessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, lines: Vec<String>, ctx: &mut Context<'_>) -> Vec<String>;
}

/// Builds the default preprocessor chain for `options`.
pub fn build_preprocessors(options: &Options) -> Registry<Box<dyn Preprocessor>> {
    let mut registry: Registry<Box<dyn Preprocessor>> = Registry::new();
    registry.append("normalize_whitespace", Box::new(NormalizeWhitespace));
    if options.safe_mode != SafeMode::Escape {
        registry.append("html_block", Box::new(HtmlBlockPreprocessor));
    }
    registry.append("reference", Box::new(ReferencePreprocessor));
    registry
}

static WHITESPACE_ONLY_LINE: LazyLock<fancy_regex::Regex> =
    LazyLock::new(|| fancy_regex::Regex::new(r"(?<=\n) +\n").unwrap());

/// Normalizes line endings and tabs, and strips placeholder markers from the
/// source so user text can never forge a placeholder.
pub struct NormalizeWhitespace;

impl Preprocessor for NormalizeWhitespace {
    fn name(&self) -> &'static str {
        "normalize_whitespace"
    }

    fn run(&self, lines: Vec<String>, ctx: &mut Context<'_>) -> Vec<String> {
        let source = lines.join("\n").replace([STX, ETX], "");
        let mut source = source.replace("\r\n", "\n").replace('\r', "\n");
        source.push_str("\n\n");
        let source = expand_tabs(&source, ctx.options.tab_length);
        let source = WHITESPACE_ONLY_LINE.replace_all(&source, "\n");
        source.split('\n').map(String::from).collect()
    }
}

const ATTRS_PATTERN: &str = r#"\s*(?P<attr>[^>"'/= ]+)=(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')|\s*(?P<attr1>[^>"'/= ]+)=(?P<value1>[^> ]+)|\s*(?P<attr2>[^>"'/= ]+)"#;

static ATTRS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(ATTRS_PATTERN).unwrap());

static LEFT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    let unnamed = Regex::new(r"\?P<[a-z0-9]+>").unwrap().replace_all(ATTRS_PATTERN, "?:").into_owned();
    Regex::new(&format!(r"^<(?P<tag>[^> ]+)(?P<attrs>(?:{unnamed})*)\s*/?>?")).unwrap()
});

static MARKDOWN_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\smarkdown(=['"]?[^> ]*['"]?)?"#).unwrap());

/// Pulls block-level raw HTML out of the source into the html stash.
pub struct HtmlBlockPreprocessor;

struct LeftTag {
    tag: String,
    index: usize,
    attrs: HashMap<String, String>,
}

impl HtmlBlockPreprocessor {
    fn get_left_tag(block: &str) -> LeftTag {
        if let Some(caps) = LEFT_TAG_RE.captures(block) {
            let mut attrs = HashMap::new();
            if let Some(raw) = caps.name("attrs") {
                for ma in ATTRS_RE.captures_iter(raw.as_str()) {
                    if let Some(attr) = ma.name("attr") {
                        let value = ma.name("dq").or_else(|| ma.name("sq")).map_or("", |m| m.as_str());
                        attrs.insert(attr.as_str().trim().to_string(), value.to_string());
                    } else if let Some(attr) = ma.name("attr1") {
                        let value = ma.name("value1").map_or("", |m| m.as_str());
                        attrs.insert(attr.as_str().trim().to_string(), value.to_string());
                    } else if let Some(attr) = ma.name("attr2") {
                        let name = attr.as_str().trim().to_string();
                        attrs.insert(name.clone(), name);
                    }
                }
            }
            let tag = caps.name("tag").map_or("", |m| m.as_str()).to_string();
            return LeftTag {
                tag,
                index: caps.get(0).map_or(0, |m| m.end()),
                attrs,
            };
        }
        let tag = block
            .get(1..)
            .unwrap_or("")
            .split('>')
            .next()
            .unwrap_or("")
            .to_lowercase();
        LeftTag {
            index: tag.len() + 2,
            tag,
            attrs: HashMap::new(),
        }
    }

    /// Finds the end of the close tag `rtag` matching the open tag `ltag`,
    /// skipping nested pairs of the same tag.
    fn find_closing_tag(ltag: &str, rtag: &str, start: usize, block: &str) -> Option<usize> {
        let mut depth = 0usize;
        let mut pos = start;
        loop {
            let i = block.get(pos..)?.find(rtag)? + pos;
            let j = block[pos..].find(ltag).map(|j| j + pos);
            match j {
                Some(j) if j < i => {
                    // Another open tag first: its close tag must be skipped.
                    let gt = block[j..].find('>')? + j;
                    depth += 1;
                    pos = gt + 1;
                }
                _ => {
                    if depth == 0 {
                        return Some(i + rtag.len());
                    }
                    depth -= 1;
                    pos = i + rtag.len();
                }
            }
        }
    }

    fn get_right_tag(left_tag: &str, left_index: usize, block: &str) -> (String, usize) {
        let open = format!("<{left_tag}");
        for rtag in [format!("</{left_tag}>"), format!("{left_tag}>")] {
            if let Some(i) = Self::find_closing_tag(&open, &rtag, left_index, block)
                && i > 2
            {
                let name = rtag.trim_start_matches('<').trim_end_matches('>').to_string();
                return (name, i);
            }
        }
        let chars: Vec<char> = block.trim_end().chars().collect();
        let end = chars.len().saturating_sub(1);
        let start = if left_index == 0 {
            0
        } else {
            chars.len().saturating_sub(left_index)
        };
        let tag: String = if start < end {
            chars[start..end].iter().collect::<String>().to_lowercase()
        } else {
            String::new()
        };
        (tag, block.len())
    }

    fn equal_tags(left_tag: &str, right_tag: &str) -> bool {
        if left_tag.starts_with(['?', '@', '%']) {
            return true;
        }
        if format!("/{left_tag}") == right_tag {
            return true;
        }
        if right_tag == "--" && left_tag == "--" {
            return true;
        }
        right_tag.strip_prefix('/') == Some(left_tag)
    }

    fn is_oneliner(tag: &str) -> bool {
        tag == "hr" || tag == "hr/"
    }
}

impl Preprocessor for HtmlBlockPreprocessor {
    fn name(&self) -> &'static str {
        "html_block"
    }

    fn run(&self, lines: Vec<String>, ctx: &mut Context<'_>) -> Vec<String> {
        let markdown_in_html = ctx.options.markdown_in_html;
        let stash = &mut ctx.html_stash;
        let text = lines.join("\n");
        let mut queue: VecDeque<String> = text.split("\n\n").map(String::from).collect();
        let mut new_blocks: Vec<String> = Vec::new();
        let mut items: Vec<String> = Vec::new();
        let mut left = LeftTag {
            tag: String::new(),
            index: 0,
            attrs: HashMap::new(),
        };
        let mut in_tag = false;

        while let Some(mut block) = queue.pop_front() {
            for _ in 0..2 {
                if block.starts_with('\n') {
                    block.remove(0);
                }
            }

            if in_tag {
                items.push(block.clone());
                let (right_tag, data_index) = Self::get_right_tag(&left.tag, 0, &block);
                if Self::equal_tags(&left.tag, &right_tag) {
                    if data_index < block.len() {
                        if let Some(last) = items.last_mut() {
                            *last = block[..data_index].to_string();
                        }
                        queue.push_front(block[data_index..].to_string());
                    }
                    in_tag = false;
                    if markdown_in_html && left.attrs.contains_key("markdown") {
                        if let Some((start, end)) = split_markdown_wrapper(&mut items, left.index, &right_tag) {
                            new_blocks.push(stash.store(start, false));
                            new_blocks.append(&mut items);
                            new_blocks.push(stash.store(end, false));
                        } else {
                            new_blocks.push(stash.store(items.join("\n\n"), false));
                        }
                    } else {
                        new_blocks.push(stash.store(items.join("\n\n"), false));
                    }
                    items.clear();
                }
                continue;
            }

            if !(block.starts_with('<') && block.trim().chars().count() > 1) {
                new_blocks.push(block);
                continue;
            }

            left = if block[1..].starts_with("!--") {
                LeftTag {
                    tag: "--".to_string(),
                    index: 2,
                    attrs: HashMap::new(),
                }
            } else {
                Self::get_left_tag(&block)
            };
            let (right_tag, data_index) = Self::get_right_tag(&left.tag, left.index, &block);
            let block_level = is_block_level(&left.tag) || left.tag == "--";

            if data_index < block.len() && block_level {
                queue.push_front(block[data_index..].to_string());
                block.truncate(data_index);
            }

            let marker = block[1..].chars().next();
            if !(is_block_level(&left.tag) || matches!(marker, Some('!' | '?' | '@' | '%'))) {
                new_blocks.push(block);
                continue;
            }

            if Self::is_oneliner(&left.tag) {
                new_blocks.push(block.trim().to_string());
                continue;
            }

            if block.trim_end().ends_with('>') && Self::equal_tags(&left.tag, &right_tag) {
                if markdown_in_html && left.attrs.contains_key("markdown") {
                    let mut parts = vec![block.clone()];
                    if let Some((start, end)) = split_markdown_wrapper(&mut parts, left.index, &right_tag) {
                        new_blocks.push(stash.store(start, false));
                        new_blocks.append(&mut parts);
                        new_blocks.push(stash.store(end, false));
                        continue;
                    }
                }
                new_blocks.push(stash.store(block.trim(), false));
                continue;
            }

            if !Self::equal_tags(&left.tag, &right_tag) && block_level {
                items.push(block.trim().to_string());
                in_tag = true;
            } else {
                new_blocks.push(stash.store(block.trim(), false));
            }
        }

        if !items.is_empty() {
            log::debug!(
                "[rumdown-html] Unclosed <{}> block runs to end of document",
                left.tag
            );
            new_blocks.push(stash.store(items.join("\n\n"), false));
            new_blocks.push("\n".to_string());
        }

        new_blocks.join("\n\n").split('\n').map(String::from).collect()
    }
}

/// Cuts the opening tag (minus its `markdown` attribute) off the first item
/// and the closing tag off the last one, returning both.
fn split_markdown_wrapper(items: &mut [String], left_index: usize, right_tag: &str) -> Option<(String, String)> {
    let close_len = right_tag.len() + 2;
    let first = items.first()?;
    let start = MARKDOWN_ATTR_RE.replace_all(first.get(..left_index)?, "").into_owned();
    let first_rest = first.get(left_index..)?.to_string();
    let last_index = items.len() - 1;
    if last_index == 0 {
        let cut = first_rest.len().checked_sub(close_len)?;
        let end = first_rest.get(cut..)?.to_string();
        items[0] = first_rest.get(..cut)?.to_string();
        return Some((start, end));
    }
    let last = &items[last_index];
    let cut = last.len().checked_sub(close_len)?;
    let end = last.get(cut..)?.to_string();
    let last_rest = last.get(..cut)?.to_string();
    items[0] = first_rest;
    items[last_index] = last_rest;
    Some((start, end))
}

const TITLE: &str = r#"[ ]*("(.*)"|'(.*)'|\((.*)\))[ ]*"#;

static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^[ ]{{0,3}}\[([^\]]*)\]:\s*([^ ]*)[ ]*({TITLE})?$")).unwrap());

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(&format!("^{TITLE}$")).unwrap());

/// Removes link reference definitions from the source and records them.
pub struct ReferencePreprocessor;

impl Preprocessor for ReferencePreprocessor {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn run(&self, lines: Vec<String>, ctx: &mut Context<'_>) -> Vec<String> {
        let mut new_text = Vec::with_capacity(lines.len());
        let mut lines: VecDeque<String> = lines.into();
        while let Some(line) = lines.pop_front() {
            let Some(caps) = REFERENCE_RE.captures(&line) else {
                new_text.push(line);
                continue;
            };
            let id = caps.get(1).map_or("", |m| m.as_str()).trim().to_lowercase();
            let link = caps
                .get(2)
                .map_or("", |m| m.as_str())
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string();
            let mut title = [5, 6, 7]
                .iter()
                .find_map(|&g| caps.get(g).map(|m| m.as_str().to_string()))
                .filter(|t| !t.is_empty());
            if title.is_none()
                && let Some(next) = lines.front()
                && let Some(tm) = TITLE_RE.captures(next)
            {
                title = [2, 3, 4]
                    .iter()
                    .find_map(|&g| tm.get(g).map(|m| m.as_str().to_string()));
                lines.pop_front();
            }
            log::debug!("[rumdown-refs] Reference '{id}' -> {link}");
            ctx.references.insert(&id, link, title);
        }
        new_text
    }
}

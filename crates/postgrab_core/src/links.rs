use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkListError {
    #[error("no links given")]
    Empty,
    #[error("line {line}: {link:?} is not a post link")]
    InvalidLink { line: usize, link: String },
}

fn post_link_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^https?://(?:www\.)?reddit\.com/r/[a-zA-Z0-9_]+/comments/[a-zA-Z0-9_]+/?")
                .ok()
        })
        .as_ref()
}

/// Whether `link` points at a single post.
pub fn is_valid_post_link(link: &str) -> bool {
    post_link_pattern().is_some_and(|pattern| pattern.is_match(link))
}

/// Parses a newline separated list of post links.
///
/// Blank lines are ignored and duplicates dropped (first occurrence kept). A
/// single invalid line rejects the whole list.
pub fn parse_link_list(raw: &str) -> Result<Vec<String>, LinkListError> {
    let mut links: Vec<String> = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let link = line.trim();
        if link.is_empty() {
            continue;
        }
        if !is_valid_post_link(link) {
            return Err(LinkListError::InvalidLink {
                line: index + 1,
                link: link.to_string(),
            });
        }
        if !links.iter().any(|seen| seen == link) {
            links.push(link.to_string());
        }
    }
    if links.is_empty() {
        return Err(LinkListError::Empty);
    }
    Ok(links)
}

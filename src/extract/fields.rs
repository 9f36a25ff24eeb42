//! Contact field extractors: email, phone number and site URL.
//!
//! All three run independently over the same text; none of them sees the
//! residue left by another.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::matcher::{remove_matches, FoundMatch, LineHit, LinePattern, RemovalMode};

/// `local@domain.tld` with a permissive character class on both sides.
pub const EMAIL_PATTERN: &str = r"[a-zA-Z0-9\.\-+_]+@[a-zA-Z0-9\.\-+_]+\.[a-zA-Z]+";

/// Three alternatives, each its own capture group:
/// 1. a whole line of international-style digit groups,
/// 2. US-style `(NNN) NNN-NNNN`,
/// 3. grouped `NNNNN NNNNN`.
pub const PHONE_PATTERN: &str = r"(^\+?\d{1,4}?[-.\s]?\(?\d{1,3}?\)?[-.\s]?\d{1,4}[-.\s]?\d{1,4}[-.\s]?\d{1,9}$)|(\(\d{3}\)\s\d{3}-\d{4})|(\d{5}\s\d{5})";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern should compile"));

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern should compile"));

/// Mail hosts whose `.com` is never reported as a site.
const EXCLUDED_SITE_HOSTS: [&str; 2] = ["gmail", "yahoo"];

/// Site URL matcher: `(?:www\.)?[\w-]+\.com`, rejecting hosts that end in
/// `gmail`/`yahoo`, hits followed by a word character or `@`, and hits that
/// belong to an email address.
///
/// The lookarounds are checked by hand while scanning start positions in
/// order, which gives the same hits as a backtracking regex engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteUrlPattern;

impl LinePattern for SiteUrlPattern {
    fn find_all(&self, line: &str) -> Vec<LineHit> {
        let mut hits = Vec::new();
        let mut pos = 0;

        while pos < line.len() {
            match site_match_at(line, pos) {
                Some(end) => {
                    hits.push(LineHit {
                        start: pos,
                        end,
                        found: FoundMatch::Text(line[pos..end].to_string()),
                    });
                    pos = end;
                }
                None => {
                    pos += line[pos..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        hits
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_host_char(c: char) -> bool {
    is_word_char(c) || c == '-'
}

/// True when the `[\w.-]` run right before `start` is preceded by `@`, i.e.
/// the candidate is part of an email domain.
fn inside_email(line: &str, start: usize) -> bool {
    line[..start]
        .chars()
        .rev()
        .find(|&c| !(is_host_char(c) || c == '.'))
        == Some('@')
}

fn site_match_at(line: &str, start: usize) -> Option<usize> {
    if inside_email(line, start) {
        return None;
    }

    if line[start..].starts_with("www.") {
        if let Some(end) = host_dot_com(line, start + 4) {
            return Some(end);
        }
    }

    host_dot_com(line, start)
}

/// Anchored `[\w-]+(?<!gmail|yahoo)\.com(?=[^\w@]|$)` at `start`.
///
/// Only the longest host run can be followed by `.`, so no shorter split
/// needs to be tried.
fn host_dot_com(line: &str, start: usize) -> Option<usize> {
    let host_len = line[start..]
        .char_indices()
        .find(|(_, c)| !is_host_char(*c))
        .map_or(line.len() - start, |(i, _)| i);
    if host_len == 0 {
        return None;
    }

    let host_end = start + host_len;
    let before_dot = &line[..host_end];
    if EXCLUDED_SITE_HOSTS
        .iter()
        .any(|host| before_dot.ends_with(host))
    {
        return None;
    }

    if !line[host_end..].starts_with(".com") {
        return None;
    }

    let end = host_end + ".com".len();
    match line[end..].chars().next() {
        Some(c) if is_word_char(c) || c == '@' => None,
        _ => Some(end),
    }
}

/// Email addresses, in the order they appear.
pub fn extract_email(text: &str) -> Vec<String> {
    remove_matches(text, &*EMAIL_REGEX, RemovalMode::WholeLine)
        .matches
        .into_iter()
        .map(FoundMatch::into_text)
        .collect()
}

/// Phone numbers as three-slot tuples, one slot per pattern alternative.
pub fn extract_phone(text: &str) -> Vec<FoundMatch> {
    remove_matches(text, &*PHONE_REGEX, RemovalMode::WholeLine).matches
}

/// Site hostnames ending in `.com`.
pub fn extract_site_url(text: &str) -> Vec<String> {
    remove_matches(text, &SiteUrlPattern, RemovalMode::WholeLine)
        .matches
        .into_iter()
        .map(FoundMatch::into_text)
        .collect()
}

/// All contact fields pulled from one transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactFields {
    pub email: Vec<String>,
    pub phone: Vec<FoundMatch>,
    pub site: Vec<String>,
}

impl ContactFields {
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.phone.is_empty() && self.site.is_empty()
    }
}

/// Run every field extractor over the same text.
pub fn extract_contacts(text: &str) -> ContactFields {
    ContactFields {
        email: extract_email(text),
        phone: extract_phone(text),
        site: extract_site_url(text),
    }
}

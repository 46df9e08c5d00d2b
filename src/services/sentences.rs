// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Encoding of matched-sentence context carried between search results and
//! the passage view.
//!
//! A blob is the `$`-joined highlight fragments, form-urlencoded. Fragments are
//! markup: they keep the index's emphasis tags and escaped entities, so
//! editorial signs such as `&lt;e&gt;` survive until the blob is decoded.

use scraper::Html;
use url::form_urlencoded;

/// Reserved token between sentences. Never part of a sentence.
pub const SENTENCE_SEPARATOR: char = '$';

/// Join markup fragments with the reserved separator and form-urlencode the result.
pub fn encode_sentences<S: AsRef<str>>(fragments: &[S]) -> String {
    let joined = fragments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&SENTENCE_SEPARATOR.to_string());
    form_urlencoded::byte_serialize(joined.as_bytes()).collect()
}

/// Decode a sentence blob back into plain-text sentences.
///
/// Markup and punctuation are removed, whitespace inside each sentence is
/// collapsed and sentences left empty are dropped.
pub fn extract_sentences(blob: &str) -> Vec<String> {
    markup_text(&form_decode(blob))
        .split(SENTENCE_SEPARATOR)
        .map(strip_punctuation)
        .map(|s| collapse_whitespace(&s))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Text content of an HTML fragment, with entities decoded.
///
/// Stray end tags from a cut highlight fragment are ignored.
pub fn markup_text(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect()
}

/// Drop every character that is neither a letter, a digit nor whitespace.
///
/// Signs inside a word are removed without splitting it, so `sp<e>cial`
/// reads as `special`.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn form_decode(blob: &str) -> String {
    // Literal pair delimiters are content here, not structure.
    let escaped = blob.replace('&', "%26").replace('=', "%3D");
    form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}

// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Highlighting of matched sentences inside rendered passage markup.
//!
//! The passage is flattened into an arena of pieces (tags, whitespace, words).
//! Words with a non-empty normalized form are the token stream that phrases are
//! matched against. Matches become [`HighlightSpan`]s over token indices, and a
//! second pass writes the pieces back out, wrapping marked words in a
//! `searched` span that is closed before every tag and reopened after it.

use crate::services::sentences::markup_text;

const WRAPPER_OPEN: &str = r#"<span class="searched">"#;
const SPAN_CLOSE: &str = "</span>";
const WORD_CLASS: &str = "w";

/// Inclusive range of token indices covered by one logical match run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    fn mark(&self, token: usize) -> Mark {
        match (token == self.start, token == self.end) {
            (true, true) => Mark::Both,
            (true, false) => Mark::Start,
            (false, true) => Mark::End,
            (false, false) => Mark::Inner,
        }
    }
}

/// Position of a word inside its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Start,
    Inner,
    End,
    Both,
}

impl Mark {
    fn classes(self) -> &'static str {
        match self {
            Mark::Start => "searched-start",
            Mark::Inner => "",
            Mark::End => "searched-end",
            Mark::Both => "searched-start searched-end",
        }
    }

    fn ends_run(self) -> bool {
        matches!(self, Mark::End | Mark::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Tag(&'a str),
    Space(&'a str),
    Word(Word<'a>),
}

/// A word, either a `<span class="w">` element or bare text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Word<'a> {
    open: Option<&'a str>,
    text: &'a str,
}

impl Word<'_> {
    fn write(&self, out: &mut String, mark: Option<Mark>) {
        match (self.open, mark) {
            (Some(open), mark) => {
                let classes = mark.map_or("", Mark::classes);
                out.push_str(&add_classes(open, classes));
                out.push_str(self.text);
                out.push_str(SPAN_CLOSE);
            }
            (None, None) => out.push_str(self.text),
            (None, Some(mark)) => {
                let classes = match mark.classes() {
                    "" => WORD_CLASS.to_string(),
                    extra => format!("{WORD_CLASS} {extra}"),
                };
                out.push_str(&format!(r#"<span class="{classes}">{}</span>"#, self.text));
            }
        }
    }
}

/// Wrap every occurrence of the given sentences in `html` with `searched` spans.
///
/// Sentences are matched word by word on the normalized form of each word, so
/// editorial signs and entities inside a word do not break a match. The
/// displayed word text is left as it was.
pub fn highlight<S: AsRef<str>>(html: &str, sentences: &[S]) -> String {
    let phrases: Vec<Vec<String>> = sentences
        .iter()
        .map(|s| {
            s.as_ref()
                .split_whitespace()
                .map(normalize)
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|p| !p.is_empty())
        .collect();
    if phrases.is_empty() {
        return html.to_string();
    }

    let pieces = lex(html);

    // Token index -> piece index
    let mut token_pieces = Vec::new();
    let mut tokens = Vec::new();
    for (i, piece) in pieces.iter().enumerate() {
        if let Piece::Word(word) = piece {
            let normalized = normalize_markup(word.text);
            if !normalized.is_empty() {
                token_pieces.push(i);
                tokens.push(normalized);
            }
        }
    }

    let mut marks: Vec<Option<Mark>> = vec![None; pieces.len()];
    for span in find_spans(&tokens, &phrases) {
        for token in span.start..=span.end {
            marks[token_pieces[token]] = Some(span.mark(token));
        }
    }

    let mut out = String::with_capacity(html.len() * 2);
    let mut wrapped = false;
    for (piece, mark) in pieces.iter().zip(marks) {
        match piece {
            Piece::Tag(tag) => {
                if wrapped {
                    out.push_str(SPAN_CLOSE);
                    wrapped = false;
                }
                out.push_str(tag);
            }
            Piece::Space(space) => out.push_str(space),
            Piece::Word(word) => {
                if mark.is_some() && !wrapped {
                    out.push_str(WRAPPER_OPEN);
                    wrapped = true;
                }
                word.write(&mut out, mark);
                if mark.is_some_and(Mark::ends_run) {
                    out.push_str(SPAN_CLOSE);
                    wrapped = false;
                }
            }
        }
    }
    if wrapped {
        out.push_str(SPAN_CLOSE);
    }
    out
}

/// Every occurrence of every phrase in the token stream, with overlapping runs merged.
pub fn find_spans(tokens: &[String], phrases: &[Vec<String>]) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    for phrase in phrases.iter().filter(|p| !p.is_empty()) {
        let mut start = 0;
        while start + phrase.len() <= tokens.len() {
            if tokens[start..start + phrase.len()] == phrase[..] {
                spans.push(HighlightSpan {
                    start,
                    end: start + phrase.len() - 1,
                });
                start += phrase.len();
            } else {
                start += 1;
            }
        }
    }

    spans.sort_by_key(|s| (s.start, s.end));
    let mut merged: Vec<HighlightSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Matching form of a word: only letters and digits kept, lowercased.
pub fn normalize(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Matching form of a word taken from passage markup, where signs may be escaped.
fn normalize_markup(word: &str) -> String {
    if word.contains('&') {
        normalize(&markup_text(word))
    } else {
        normalize(word)
    }
}

fn lex(html: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = html;
    while !rest.is_empty() {
        if rest.starts_with('<') {
            let tag_len = rest.find('>').map_or(rest.len(), |i| i + 1);
            let (tag, after) = rest.split_at(tag_len);
            if is_word_open(tag) {
                let text_len = after.find('<').unwrap_or(after.len());
                if after[text_len..].starts_with(SPAN_CLOSE) {
                    pieces.push(Piece::Word(Word {
                        open: Some(tag),
                        text: &after[..text_len],
                    }));
                    rest = &after[text_len + SPAN_CLOSE.len()..];
                    continue;
                }
            }
            pieces.push(Piece::Tag(tag));
            rest = after;
        } else {
            let text_len = rest.find('<').unwrap_or(rest.len());
            let (text, after) = rest.split_at(text_len);
            lex_text(text, &mut pieces);
            rest = after;
        }
    }
    pieces
}

fn lex_text<'a>(text: &'a str, pieces: &mut Vec<Piece<'a>>) {
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        let space = first.is_whitespace();
        let len = rest
            .find(|c: char| c.is_whitespace() != space)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(len);
        pieces.push(if space {
            Piece::Space(chunk)
        } else {
            Piece::Word(Word {
                open: None,
                text: chunk,
            })
        });
        rest = tail;
    }
}

/// Byte range of the `class` attribute value inside a tag.
fn class_range(tag: &str) -> Option<(usize, usize)> {
    let start = tag.find(r#"class=""#)? + r#"class=""#.len();
    let len = tag[start..].find('"')?;
    Some((start, start + len))
}

fn is_word_open(tag: &str) -> bool {
    let is_span = tag
        .strip_prefix("<span")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_whitespace() || c == '>');
    is_span
        && class_range(tag)
            .is_some_and(|(start, end)| tag[start..end].split_whitespace().any(|c| c == WORD_CLASS))
}

fn add_classes(tag: &str, classes: &str) -> String {
    if classes.is_empty() {
        return tag.to_string();
    }
    match class_range(tag) {
        Some((_, end)) => format!("{} {}{}", &tag[..end], classes, &tag[end..]),
        None => {
            let end = tag.strip_suffix('>').unwrap_or(tag);
            format!(r#"{end} class="{classes}">"#)
        }
    }
}

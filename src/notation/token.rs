/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{iter::Peekable, str::CharIndices};

/// A single lexical unit of game notation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A `[Name "Value"]` tag pair, kept verbatim including the brackets.
    Header(String),

    /// A move number such as `1.` or `12...`.
    MoveNumber(String),

    /// Anything that looks like it could be a move. Legality is never checked here.
    Move(String),

    /// Body of a `{...}` or `;` comment, trimmed.
    Comment(String),

    /// A symbolic (`!?`) or numeric (`$14`) annotation glyph.
    Annotation(String),

    /// `(`
    VariationOpen,

    /// `)`
    VariationClose,

    /// One of `1-0`, `0-1`, `1/2-1/2` or `*`.
    Result(String),
}

impl Token {
    /// Decodes a [`Token::Header`] into its name and value.
    ///
    /// Returns `None` for any other token, or a header without a name.
    pub fn header_pair(&self) -> Option<(String, String)> {
        let Self::Header(raw) = self else {
            return None;
        };

        let inner = raw.trim_start_matches('[').trim_end_matches(']').trim();
        let (name, rest) = inner.split_once(char::is_whitespace).unwrap_or((inner, ""));
        if name.is_empty() {
            return None;
        }

        let rest = rest.trim();
        let quoted = rest
            .strip_prefix('"')
            .map(|s| s.strip_suffix('"').unwrap_or(s))
            .unwrap_or(rest);

        // Undo `\"` and `\\` escapes
        let mut value = String::with_capacity(quoted.len());
        let mut chars = quoted.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    value.push(next);
                }
            } else {
                value.push(c);
            }
        }

        Some((name.to_string(), value))
    }
}

/// Characters that always end a bare word.
const DELIMITERS: &[char] = &['{', '}', '(', ')', '[', ']', ';'];

const RESULTS: &[&str] = &["1-0", "0-1", "1/2-1/2", "*"];

const GLYPHS: &[&str] = &["!", "?", "!!", "??", "!?", "?!"];

/// Splits raw notation text into a flat list of [`Token`]s.
///
/// This never fails: unterminated headers and comments run to the end of the input,
/// and anything unrecognized becomes a [`Token::Move`].
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }

            '[' => {
                let end = consume_until(&mut chars, |c| c == ']', text.len());
                tokens.push(Token::Header(text[start..end].to_string()));
            }

            '{' => {
                chars.next();
                tokens.push(Token::Comment(read_brace_comment(text, &mut chars)));
            }

            ';' => {
                chars.next();
                let body_start = chars.peek().map_or(text.len(), |(i, _)| *i);
                let end = consume_until(&mut chars, |c| c == '\n', text.len());
                tokens.push(Token::Comment(text[body_start..end].trim().to_string()));
            }

            '(' => {
                chars.next();
                tokens.push(Token::VariationOpen);
            }

            ')' => {
                chars.next();
                tokens.push(Token::VariationClose);
            }

            // A stray closing bracket or brace carries no meaning
            ']' | '}' => {
                chars.next();
            }

            _ => {
                let mut end = text.len();
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_whitespace() || DELIMITERS.contains(&c) {
                        end = i;
                        break;
                    }
                    chars.next();
                }
                classify_word(&text[start..end], &mut tokens);
            }
        }
    }

    tokens
}

/// Consumes chars up to and including the first one matching `stop`, returning the byte index just past it.
fn consume_until(
    chars: &mut Peekable<CharIndices<'_>>,
    stop: impl Fn(char) -> bool,
    len: usize,
) -> usize {
    for (i, c) in chars.by_ref() {
        if stop(c) {
            return i + c.len_utf8();
        }
    }
    len
}

/// Reads a brace comment body whose opening `{` has already been consumed.
///
/// Nested braces are balanced and kept in the body.
fn read_brace_comment(text: &str, chars: &mut Peekable<CharIndices<'_>>) -> String {
    let body_start = chars.peek().map_or(text.len(), |(i, _)| *i);
    let mut depth = 1;
    let mut body_end = text.len();

    for (i, c) in chars.by_ref() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    body_end = i;
                    break;
                }
            }
            _ => {}
        }
    }

    text[body_start..body_end].trim().to_string()
}

/// Classifies a whitespace/delimiter-separated word, splitting glued move numbers and glyphs.
fn classify_word(word: &str, tokens: &mut Vec<Token>) {
    if word.is_empty() {
        return;
    }

    if RESULTS.contains(&word) {
        tokens.push(Token::Result(word.to_string()));
        return;
    }

    if is_glyph(word) {
        tokens.push(Token::Annotation(word.to_string()));
        return;
    }

    // Leading move number, possibly glued to a move like `1.e4`
    let digits = word.len() - word.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 && word[digits..].starts_with('.') {
        let after = word[digits..].trim_start_matches('.');
        let number_end = word.len() - after.len();
        tokens.push(Token::MoveNumber(word[..number_end].to_string()));
        classify_word(after, tokens);
        return;
    }

    // Trailing glyphs glued to a move like `e4!?`
    let body = word.trim_end_matches(['!', '?']);
    if !body.is_empty() && body.len() < word.len() {
        tokens.push(Token::Move(body.to_string()));
        tokens.push(Token::Annotation(word[body.len()..].to_string()));
        return;
    }

    tokens.push(Token::Move(word.to_string()));
}

fn is_glyph(word: &str) -> bool {
    GLYPHS.contains(&word)
        || word
            .strip_prefix('$')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

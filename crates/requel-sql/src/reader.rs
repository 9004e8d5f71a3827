//! Semantic token reading
//!
//! [`TokenReader`] turns the comment-free lexeme stream into the tokens the
//! parsers consume. It joins multi-word keywords (`left outer join`,
//! `group by`, `is not distinct from`, ...), tracks bracket depth, detects
//! statement termination at a top-level `;`, and supports exactly one level
//! of rollback.
//!
//! [`BracketScope`] bounds any [`TokenSource`] to a single parenthesized
//! region: it consumes the opening `(` on construction and guarantees the
//! matching `)` is consumed exactly once, so every nested construct can be
//! parsed by an ordinary unbounded parser function.
//!
//! [`StatementReader`] iterates `;`-separated statements by resetting the
//! termination flag between them.

use crate::error::{Error, Result};
use crate::lexer::CommentSkippingReader;

/// The reading surface the parsers are written against.
///
/// `peek` never consumes; `read` consumes; `rollback` pushes the most
/// recently read token back (depth 1 only). All keyword comparisons in the
/// provided helpers are case-insensitive.
pub trait TokenSource {
    /// Look at the next token without consuming it. `None` when the
    /// current statement is terminated or the region is exhausted.
    fn peek(&mut self) -> Result<Option<&str>>;

    /// Consume and return the next token.
    fn read(&mut self) -> Result<Option<String>>;

    /// Push the most recently read token back onto the stream. A second
    /// rollback without an intervening read is an internal error.
    fn rollback(&mut self) -> Result<()>;

    /// Current bracket nesting depth.
    fn bracket_depth(&self) -> i32;

    /// Whether the next token equals `word` (case-insensitive).
    fn peek_is(&mut self, word: &str) -> Result<bool> {
        Ok(self
            .peek()?
            .is_some_and(|t| t.eq_ignore_ascii_case(word)))
    }

    /// Whether the next token equals any of `words`.
    fn peek_is_any(&mut self, words: &[&str]) -> Result<bool> {
        Ok(self
            .peek()?
            .is_some_and(|t| words.iter().any(|w| t.eq_ignore_ascii_case(w))))
    }

    /// Consume the next token if it equals `word`, returning it as read.
    fn read_if(&mut self, word: &str) -> Result<Option<String>> {
        if self.peek_is(word)? {
            self.read()
        } else {
            Ok(None)
        }
    }

    /// Consume the next token if it equals any of `words`.
    fn read_if_any(&mut self, words: &[&str]) -> Result<Option<String>> {
        if self.peek_is_any(words)? {
            self.read()
        } else {
            Ok(None)
        }
    }

    /// Consume the next token, requiring it to equal `expected`.
    fn expect(&mut self, expected: &str) -> Result<String> {
        match self.read()? {
            Some(t) if t.eq_ignore_ascii_case(expected) => Ok(t),
            Some(t) => Err(Error::syntax(expected, t)),
            None => Err(Error::end_of_input(expected)),
        }
    }

    /// Consume the next token, requiring one to exist. `expected` names
    /// what the grammar wanted for the error message.
    fn require(&mut self, expected: &str) -> Result<String> {
        self.read()?.ok_or_else(|| Error::end_of_input(expected))
    }
}

/// Reads semantic tokens from SQL text.
pub struct TokenReader {
    lexer: CommentSkippingReader,
    /// One lexeme of lookahead for keyword joining.
    lex_pending: Option<String>,
    /// One token of lookahead for `peek`.
    peeked: Option<String>,
    /// Token pushed back by `rollback`, returned by the next `read`.
    rolled_back: Option<String>,
    /// Most recently consumed token, the rollback candidate.
    last_read: Option<String>,
    bracket_depth: i32,
    terminated: bool,
}

impl TokenReader {
    pub fn new(text: &str) -> Self {
        Self {
            lexer: CommentSkippingReader::new(text),
            lex_pending: None,
            peeked: None,
            rolled_back: None,
            last_read: None,
            bracket_depth: 0,
            terminated: false,
        }
    }

    /// Whether a top-level `;` or end of input has been reached.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn reset_terminated(&mut self) {
        self.terminated = false;
    }

    fn peek_lexeme(&mut self) -> Result<Option<&str>> {
        if self.lex_pending.is_none() {
            self.lex_pending = self.lexer.read()?;
        }
        Ok(self.lex_pending.as_deref())
    }

    fn take_lexeme(&mut self) -> Result<Option<String>> {
        if let Some(lex) = self.lex_pending.take() {
            return Ok(Some(lex));
        }
        self.lexer.read()
    }

    fn lexeme_is(&mut self, word: &str) -> Result<bool> {
        Ok(self
            .peek_lexeme()?
            .is_some_and(|l| l.eq_ignore_ascii_case(word)))
    }

    fn take_lexeme_if(&mut self, word: &str) -> Result<Option<String>> {
        if self.lexeme_is(word)? {
            self.take_lexeme()
        } else {
            Ok(None)
        }
    }

    fn expect_lexeme(&mut self, expected: &str) -> Result<String> {
        match self.take_lexeme()? {
            Some(l) if l.eq_ignore_ascii_case(expected) => Ok(l),
            Some(l) => Err(Error::syntax(expected, l)),
            None => Err(Error::end_of_input(expected)),
        }
    }

    /// Pull one token, joining multi-word keywords. Joins are applied only
    /// immediately after reading the triggering word.
    fn pull(&mut self) -> Result<Option<String>> {
        let Some(word) = self.take_lexeme()? else {
            return Ok(None);
        };

        let joined = match word.to_ascii_lowercase().as_str() {
            "is" => {
                let mut parts = vec![word];
                if let Some(not) = self.take_lexeme_if("not")? {
                    parts.push(not);
                }
                if let Some(distinct) = self.take_lexeme_if("distinct")? {
                    parts.push(distinct);
                    parts.push(self.expect_lexeme("from")?);
                }
                parts.join(" ")
            }
            "inner" | "cross" => match self.take_lexeme_if("join")? {
                Some(join) => format!("{word} {join}"),
                None => word,
            },
            // LEFT(...) and RIGHT(...) are scalar functions; the bare word
            // is returned when a parenthesis follows immediately.
            "left" | "right" => {
                if self.lexeme_is("(")? {
                    word
                } else if let Some(outer) = self.take_lexeme_if("outer")? {
                    let join = self.expect_lexeme("join")?;
                    format!("{word} {outer} {join}")
                } else if let Some(join) = self.take_lexeme_if("join")? {
                    format!("{word} {join}")
                } else {
                    word
                }
            }
            "group" | "partition" | "order" => match self.take_lexeme_if("by")? {
                Some(by) => format!("{word} {by}"),
                None => word,
            },
            "nulls" => {
                if let Some(first) = self.take_lexeme_if("first")? {
                    format!("{word} {first}")
                } else if let Some(last) = self.take_lexeme_if("last")? {
                    format!("{word} {last}")
                } else {
                    word
                }
            }
            "union" => match self.take_lexeme_if("all")? {
                Some(all) => format!("{word} {all}"),
                None => word,
            },
            "not" => match self.take_lexeme_if("materialized")? {
                Some(m) => format!("{word} {m}"),
                None => word,
            },
            "double" => match self.take_lexeme_if("precision")? {
                Some(p) => format!("{word} {p}"),
                None => word,
            },
            "at" | "without" => {
                if self.lexeme_is("time")? {
                    let time = self.take_lexeme()?.unwrap_or_default();
                    let zone = self.expect_lexeme("zone")?;
                    format!("{word} {time} {zone}")
                } else {
                    word
                }
            }
            _ => word,
        };

        Ok(Some(joined))
    }

    fn adjust_depth(&mut self, token: &str, forward: bool) {
        let delta = match token {
            "(" => 1,
            ")" => -1,
            _ => return,
        };
        self.bracket_depth += if forward { delta } else { -delta };
    }
}

impl TokenSource for TokenReader {
    fn peek(&mut self) -> Result<Option<&str>> {
        if self.terminated {
            return Ok(None);
        }
        if self.rolled_back.is_some() {
            return Ok(self.rolled_back.as_deref());
        }
        if self.peeked.is_none() {
            self.peeked = self.pull()?;
        }
        // A peeked top-level terminator already ends the statement.
        if self.peeked.as_deref() == Some(";") && self.bracket_depth == 0 {
            self.peeked = None;
            self.terminated = true;
            self.last_read = None;
            return Ok(None);
        }
        Ok(self.peeked.as_deref())
    }

    fn read(&mut self) -> Result<Option<String>> {
        if self.terminated {
            return Ok(None);
        }
        let token = if let Some(tok) = self.rolled_back.take() {
            Some(tok)
        } else if let Some(tok) = self.peeked.take() {
            Some(tok)
        } else {
            self.pull()?
        };

        let Some(token) = token else {
            self.terminated = true;
            self.last_read = None;
            return Ok(None);
        };

        if token == ";" && self.bracket_depth == 0 {
            self.terminated = true;
            self.last_read = None;
            return Ok(None);
        }

        self.adjust_depth(&token, true);
        self.last_read = Some(token.clone());
        Ok(Some(token))
    }

    fn rollback(&mut self) -> Result<()> {
        let Some(token) = self.last_read.take() else {
            return Err(Error::internal(
                "rollback requires an intervening read",
            ));
        };
        self.adjust_depth(&token, false);
        self.rolled_back = Some(token);
        Ok(())
    }

    fn bracket_depth(&self) -> i32 {
        self.bracket_depth
    }
}

/// A reader bounded to one parenthesized region.
///
/// Construction consumes the opening `(` and records the depth baseline.
/// Reads delegate to the outer reader until a `)` would bring the depth
/// back below the baseline; that token terminates the scope. [`close`]
/// consumes the matching `)` if the interior parser left it unread, so the
/// close paren is consumed exactly once on every path.
///
/// [`close`]: BracketScope::close
pub struct BracketScope<'a> {
    reader: &'a mut dyn TokenSource,
    baseline: i32,
    finished: bool,
}

impl<'a> BracketScope<'a> {
    /// Consume `(` and open a scope bounded by its matching `)`.
    pub fn open(reader: &'a mut dyn TokenSource) -> Result<Self> {
        reader.expect("(")?;
        let baseline = reader.bracket_depth();
        Ok(Self {
            reader,
            baseline,
            finished: false,
        })
    }

    /// Whether the next outer token is the scope's matching `)`.
    fn at_boundary(&mut self) -> Result<bool> {
        if self.reader.bracket_depth() != self.baseline {
            return Ok(false);
        }
        self.reader.peek_is(")")
    }

    /// Consume the matching `)` if it has not been consumed yet.
    pub fn close(mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        match self.reader.read()? {
            Some(t) if t == ")" => {
                self.finished = true;
                Ok(())
            }
            Some(t) => Err(Error::syntax(")", t)),
            None => Err(Error::end_of_input(")")),
        }
    }
}

impl TokenSource for BracketScope<'_> {
    fn peek(&mut self) -> Result<Option<&str>> {
        if self.finished || self.at_boundary()? {
            return Ok(None);
        }
        self.reader.peek()
    }

    fn read(&mut self) -> Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }
        if self.at_boundary()? {
            // The matching close paren terminates the scope.
            self.reader.read()?;
            self.finished = true;
            return Ok(None);
        }
        match self.reader.read()? {
            Some(t) => Ok(Some(t)),
            None => Err(Error::end_of_input(")")),
        }
    }

    fn rollback(&mut self) -> Result<()> {
        self.reader.rollback()
    }

    fn bracket_depth(&self) -> i32 {
        self.reader.bracket_depth()
    }
}

/// Iterates `;`-separated statements over one [`TokenReader`].
pub struct StatementReader {
    reader: TokenReader,
}

impl StatementReader {
    pub fn new(text: &str) -> Self {
        Self {
            reader: TokenReader::new(text),
        }
    }

    /// Reset the termination flag left by the previous statement and
    /// report whether another statement begins. A trailing `;` yields no
    /// further statement.
    pub fn has_next(&mut self) -> Result<bool> {
        self.reader.reset_terminated();
        Ok(self.reader.peek()?.is_some())
    }

    /// The reader positioned at the current statement.
    pub fn reader(&mut self) -> &mut TokenReader {
        &mut self.reader
    }
}

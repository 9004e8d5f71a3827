//! Lexeme readers
//!
//! Two layers live here. [`LexemeReader`] groups raw characters into
//! lexemes: words, quoted identifiers, string literals, numbers,
//! multi-character operators, parameters, dollar-quoted strings, and the
//! comment markers themselves. It is comment-unaware; `--` and `/*` come
//! back as ordinary lexemes. [`CommentSkippingReader`] wraps it and
//! discards line and nested block comments so the token reader above never
//! sees them.

use crate::error::{Error, Result};
use crate::scanner::CharacterScanner;

/// Multi-character operators resolved by lookahead, longest first.
const COMPOUND_OPERATORS: &[&str] = &[
    "->>", "#>>", "||", "::", "->", "#>", "--", "/*", "*/",
];

/// Characters that may continue a symbol run started by `+-*/%<>!=`.
const SYMBOL_CHARS: &[char] = &[
    '+', '-', '*', '/', '%', '<', '>', '!', '=', '|', '&', '^', '~', '#',
];

/// Characters that end a word lexeme. A leading `&` is allowed inside a
/// word (literal-prefix usage), so `&` is deliberately absent here.
fn is_word_terminator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '.' | ','
                | '('
                | ')'
                | ';'
                | '['
                | ']'
                | '\''
                | '"'
                | '`'
                | '+'
                | '-'
                | '*'
                | '/'
                | '%'
                | '<'
                | '>'
                | '!'
                | '='
                | '|'
                | ':'
                | '?'
                | '$'
                | '#'
                | '^'
                | '~'
        )
}

/// Groups characters into raw lexemes.
///
/// Quoted forms keep their delimiters and their interior verbatim, so a
/// string literal like `'it''s'` is one lexeme with the doubled quote
/// preserved. Classification priority follows the scanner rules: quotes,
/// compound operators, dollar forms, numbers, symbol runs, then words.
#[derive(Debug)]
pub struct LexemeReader {
    scanner: CharacterScanner,
    previous: Option<String>,
}

impl LexemeReader {
    pub fn new(text: &str) -> Self {
        Self {
            scanner: CharacterScanner::new(text),
            previous: None,
        }
    }

    /// Read the next lexeme, or `None` at end of input.
    pub fn read(&mut self) -> Result<Option<String>> {
        let lexeme = self.read_raw()?;
        self.previous = lexeme.clone();
        Ok(lexeme)
    }

    fn read_raw(&mut self) -> Result<Option<String>> {
        self.skip_whitespace();
        if self.scanner.is_at_end() {
            return Ok(None);
        }

        let c = self.scanner.peek();

        // Quoted identifiers keep their delimiters.
        match c {
            '"' | '`' => {
                self.scanner.advance();
                let body = self.scanner.scan_quoted(c, false, "quoted identifier")?;
                return Ok(Some(format!("{c}{body}{c}")));
            }
            '[' if !self.follows_array_keyword() => {
                self.scanner.advance();
                let body = self.scanner.scan_quoted(']', false, "quoted identifier")?;
                return Ok(Some(format!("[{body}]")));
            }
            '\'' => {
                self.scanner.advance();
                let body = self.scanner.scan_quoted('\'', true, "string literal")?;
                return Ok(Some(format!("'{body}'")));
            }
            _ => {}
        }

        if let Some(op) = self.try_compound_operator() {
            return Ok(Some(op));
        }

        if c == '$' {
            return self.read_dollar_form().map(Some);
        }

        // Named and positional parameters.
        if (c == ':' && is_word_char(self.scanner.peek_next()))
            || (c == '@' && is_word_char(self.scanner.peek_next()))
        {
            let prefix = self.scanner.advance();
            let name = self.scanner.scan_while(is_word_char);
            return Ok(Some(format!("{prefix}{name}")));
        }
        if c == '?' {
            self.scanner.advance();
            return Ok(Some("?".to_string()));
        }

        // Numbers consume digits and dots only; no exponent or hex forms.
        if c.is_ascii_digit() {
            let number = self
                .scanner
                .scan_while(|c| c.is_ascii_digit() || c == '.');
            return Ok(Some(number));
        }

        if SYMBOL_CHARS.contains(&c) && !matches!(c, '&') {
            return Ok(Some(self.read_symbol_run()));
        }

        if matches!(c, '.' | ',' | '(' | ')' | ';' | ']' | ':') {
            return Ok(Some(self.scanner.advance().to_string()));
        }

        // Everything else is a word lexeme.
        let word = self.scanner.scan_while(|c| !is_word_terminator(c));
        if word.is_empty() {
            // An isolated character outside every class, e.g. a stray '}'.
            return Ok(Some(self.scanner.advance().to_string()));
        }
        Ok(Some(word))
    }

    fn skip_whitespace(&mut self) {
        self.scanner
            .scan_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    }

    /// `[` opens a quoted identifier except immediately after the `array`
    /// keyword, where it is the subscript bracket of an array constructor.
    fn follows_array_keyword(&self) -> bool {
        self.previous
            .as_deref()
            .is_some_and(|w| w.eq_ignore_ascii_case("array"))
    }

    fn try_compound_operator(&mut self) -> Option<String> {
        let first = self.scanner.peek();
        let second = self.scanner.peek_next();
        for op in COMPOUND_OPERATORS {
            let mut chars = op.chars();
            if chars.next() != Some(first) {
                continue;
            }
            if chars.next() != Some(second) {
                continue;
            }
            if let Some(third) = chars.next() {
                // Three-character operators need one more char of lookahead;
                // re-check after consuming two.
                if self.peek_at(2) != third {
                    continue;
                }
                self.scanner.advance();
                self.scanner.advance();
                self.scanner.advance();
            } else {
                self.scanner.advance();
                self.scanner.advance();
            }
            return Some((*op).to_string());
        }
        None
    }

    fn peek_at(&self, offset: usize) -> char {
        self.scanner.peek_ahead(offset)
    }

    /// Dollar forms: `$1` positional parameters, `${name}` placeholders,
    /// and `$tag$ ... $tag$` dollar-quoted strings.
    fn read_dollar_form(&mut self) -> Result<String> {
        self.scanner.advance(); // $
        if self.scanner.peek().is_ascii_digit() {
            let n = self.scanner.scan_while(|c| c.is_ascii_digit());
            return Ok(format!("${n}"));
        }
        if self.scanner.peek() == '{' {
            self.scanner.advance();
            let name = self.scanner.scan_until('}', "placeholder")?;
            return Ok(format!("${{{name}}}"));
        }

        let tag = self.scanner.scan_while(is_word_char);
        if !self.scanner.advance_if('$') {
            return Err(Error::lexical(
                "malformed dollar quote tag",
                self.scanner.line(),
                self.scanner.column(),
            ));
        }
        let closing = format!("${tag}$");
        let mut body = String::new();
        loop {
            if self.scanner.is_at_end() {
                return Err(Error::lexical(
                    "unterminated dollar-quoted string",
                    self.scanner.line(),
                    self.scanner.column(),
                ));
            }
            body.push(self.scanner.advance());
            if body.ends_with(&closing) {
                body.truncate(body.len() - closing.len());
                return Ok(format!("${tag}${body}${tag}$"));
            }
        }
    }

    /// Greedily consume a symbol run, stopping before a comment-start
    /// sequence so `1--2` still yields a line comment.
    fn read_symbol_run(&mut self) -> String {
        let mut out = String::new();
        out.push(self.scanner.advance());
        while SYMBOL_CHARS.contains(&self.scanner.peek()) {
            let next = self.scanner.peek();
            let ahead = self.scanner.peek_next();
            if (next == '-' && ahead == '-') || (next == '/' && ahead == '*') {
                break;
            }
            // A lone trailing dash or slash that begins a comment pair with
            // the char already taken was handled by the compound table.
            out.push(self.scanner.advance());
        }
        out
    }

    /// Skip to end of line after a `--` marker.
    pub(crate) fn skip_line_comment(&mut self) {
        self.scanner.scan_while(|c| c != '\n');
    }

    /// Skip a block comment after its `/*` marker, handling nesting.
    /// Returns the maximum depth reached, which must come back to zero.
    pub(crate) fn skip_block_comment(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            if self.scanner.is_at_end() {
                return Err(Error::lexical(
                    "unterminated block comment",
                    self.scanner.line(),
                    self.scanner.column(),
                ));
            }
            let c = self.scanner.advance();
            if c == '/' && self.scanner.peek() == '*' {
                self.scanner.advance();
                depth += 1;
            } else if c == '*' && self.scanner.peek() == '/' {
                self.scanner.advance();
                depth -= 1;
            }
        }
        Ok(())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A lexeme stream with comments removed.
///
/// Line comments run to end of line; block comments nest, each inner `/*`
/// incrementing a depth counter that must return to zero before the
/// comment ends. The depth reached inside the most recent skip is
/// observable for diagnostics.
#[derive(Debug)]
pub struct CommentSkippingReader {
    inner: LexemeReader,
}

impl CommentSkippingReader {
    pub fn new(text: &str) -> Self {
        Self {
            inner: LexemeReader::new(text),
        }
    }

    /// Read the next non-comment lexeme.
    pub fn read(&mut self) -> Result<Option<String>> {
        loop {
            match self.inner.read()? {
                Some(lex) if lex == "--" => self.inner.skip_line_comment(),
                Some(lex) if lex == "/*" => self.inner.skip_block_comment()?,
                other => return Ok(other),
            }
        }
    }
}

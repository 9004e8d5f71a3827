//! Emission-side tokens
//!
//! Every AST node can emit a flat, pre-order sequence of [`Token`]s;
//! concatenating the sequence with the spacing rules in [`join_tokens`]
//! reproduces SQL text equivalent in meaning to the input. Tokens carry a
//! parent link so an external renderer can walk the structural chain for
//! indentation, and a reserved-word flag so keyword casing can be
//! normalized independently of the user's original capitalization.
//!
//! Emission is lazy: [`ToTokens::to_tokens`] returns a boxed iterator and
//! composite nodes chain their children's iterators, re-parented to the
//! token the composite introduces.

use std::fmt;
use std::rc::Rc;

/// One emitted token.
///
/// Cheap to clone; the text and parent link live behind an `Rc`. Equality
/// compares text and the reserved flag only, never parent identity, so two
/// independently emitted sequences of the same tree compare equal.
#[derive(Debug, Clone)]
pub struct Token {
    inner: Rc<TokenInner>,
}

#[derive(Debug)]
struct TokenInner {
    text: String,
    reserved: bool,
    parent: Option<Token>,
}

impl Token {
    /// A plain token: identifier, literal, symbol.
    pub fn word(text: impl Into<String>, parent: Option<&Token>) -> Self {
        Self {
            inner: Rc::new(TokenInner {
                text: text.into(),
                reserved: false,
                parent: parent.cloned(),
            }),
        }
    }

    /// A reserved-word token.
    pub fn reserved(text: impl Into<String>, parent: Option<&Token>) -> Self {
        Self {
            inner: Rc::new(TokenInner {
                text: text.into(),
                reserved: true,
                parent: parent.cloned(),
            }),
        }
    }

    pub fn text(&self) -> &str {
        &self.inner.text
    }

    pub fn is_reserved(&self) -> bool {
        self.inner.reserved
    }

    pub fn parent(&self) -> Option<&Token> {
        self.inner.parent.as_ref()
    }

    /// Number of ancestors in the parent chain.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(p) = current {
            depth += 1;
            current = p.parent();
        }
        depth
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.inner.text == other.inner.text && self.inner.reserved == other.inner.reserved
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A lazy token sequence borrowed from the emitting node.
pub type TokenIter<'a> = Box<dyn Iterator<Item = Token> + 'a>;

/// Emission surface implemented by every AST node family.
pub trait ToTokens {
    /// Emit this node's tokens in pre-order, parented to `parent` or to a
    /// structural token the node introduces.
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a>;

    /// Serialize to SQL text.
    fn to_text(&self) -> String {
        join_tokens(self.to_tokens(None))
    }
}

/// Concatenate a token sequence into SQL text.
///
/// Tokens are separated by single spaces except around attaching
/// punctuation: nothing before `,` `)` `]` `;` `.` `::`, nothing after
/// `(` `.` `::` `[`, and `(` attaches directly to a preceding
/// non-reserved word (or `cast`, whose parens are call-style) so
/// function calls render as `count(*)` while keyword-introduced groups
/// render as `in (...)`.
pub fn join_tokens(tokens: impl Iterator<Item = Token>) -> String {
    let mut out = String::new();
    let mut prev: Option<Token> = None;
    for token in tokens {
        if let Some(p) = &prev {
            if needs_space(p, &token) {
                out.push(' ');
            }
        }
        out.push_str(token.text());
        prev = Some(token);
    }
    out
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    match next.text() {
        "," | ")" | "]" | ";" | "." | "::" => return false,
        "(" => {
            // Function-call parens attach to the name; keyword-introduced
            // parens get a space.
            if matches!(prev.text(), "(" | "." | "[") {
                return false;
            }
            if prev.is_reserved() {
                // cast parens are call-style: cast(x as t)
                return prev.text() != "cast";
            }
            return !prev
                .text()
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '"' | '`'));
        }
        "[" => return false,
        _ => {}
    }
    !matches!(prev.text(), "(" | "." | "::" | "[")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(parts: &[(&str, bool)]) -> Vec<Token> {
        parts
            .iter()
            .map(|(t, r)| {
                if *r {
                    Token::reserved(*t, None)
                } else {
                    Token::word(*t, None)
                }
            })
            .collect()
    }

    #[test]
    fn test_parent_chain() {
        let root = Token::reserved("select", None);
        let child = Token::word("a", Some(&root));
        let grandchild = Token::word("b", Some(&child));
        assert_eq!(grandchild.depth(), 2);
        assert_eq!(grandchild.parent().unwrap().text(), "a");
        assert_eq!(root.depth(), 0);
    }

    #[test]
    fn test_equality_ignores_parent() {
        let root = Token::reserved("select", None);
        let a = Token::word("x", Some(&root));
        let b = Token::word("x", None);
        assert_eq!(a, b);
        assert_ne!(Token::word("x", None), Token::reserved("x", None));
    }

    #[test]
    fn test_join_function_call() {
        let tokens = seq(&[
            ("select", true),
            ("count", false),
            ("(", false),
            ("*", false),
            (")", false),
            ("from", true),
            ("t", false),
        ]);
        assert_eq!(join_tokens(tokens.into_iter()), "select count(*) from t");
    }

    #[test]
    fn test_join_keyword_paren_gets_space() {
        let tokens = seq(&[
            ("a", false),
            ("in", true),
            ("(", false),
            ("1", false),
            (",", false),
            ("2", false),
            (")", false),
        ]);
        assert_eq!(join_tokens(tokens.into_iter()), "a in (1, 2)");
    }

    #[test]
    fn test_join_qualified_name_and_cast() {
        let tokens = seq(&[
            ("a", false),
            (".", false),
            ("id", false),
            ("::", false),
            ("text", false),
        ]);
        assert_eq!(join_tokens(tokens.into_iter()), "a.id::text");
    }

    #[test]
    fn test_join_array_brackets() {
        let tokens = seq(&[
            ("array", true),
            ("[", false),
            ("1", false),
            (",", false),
            ("2", false),
            ("]", false),
        ]);
        assert_eq!(join_tokens(tokens.into_iter()), "array[1, 2]");
    }
}

//! The fixed meta-symbol vocabulary shared by both pipelines.

use std::fmt;

/// Explicit concatenation operator, inserted by the regex translator.
pub const CONCAT: char = '·';
pub const UNION: char = '|';
pub const CLOSURE: char = '*';
pub const GROUP_LEFT: char = '(';
pub const GROUP_RIGHT: char = ')';
/// The epsilon literal accepted in regexes and grammar files.
pub const EPSILON: char = 'ε';
/// Reserved end-of-input marker used in FOLLOW sets and parsing tables.
pub const END_MARKER: char = '#';
/// Production separator in grammar files.
pub const ARROW: char = '→';
/// Mark appended to a nonterminal name to derive a synthetic alias.
pub const ALIAS_MARK: char = '\'';
/// Dot marker of an LR(0) item.
pub const DOT: char = '.';

/// Binding priority of a regex operator; `None` for everything else
/// (in particular for `(`, which stops the shunting-yard pop loop).
pub fn priority(op: char) -> Option<u8> {
    match op {
        UNION => Some(1),
        CONCAT => Some(2),
        CLOSURE => Some(3),
        _ => None,
    }
}

/// A grammar symbol. The uppercase-means-nonterminal convention of the input
/// format is applied once, here; all downstream code matches on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// Any non-uppercase printable character.
    Terminal(char),
    /// An uppercase ASCII letter, optionally followed by one or more alias
    /// marks. Identity is the full string.
    Nonterminal(String),
}

impl Symbol {
    /// Whether `ch` opens a nonterminal name.
    pub fn starts_nonterminal(ch: char) -> bool {
        ch.is_ascii_uppercase()
    }

    pub fn nonterminal(name: impl Into<String>) -> Self {
        Self::Nonterminal(name.into())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(..))
    }

    pub fn as_nonterminal(&self) -> Option<&str> {
        match self {
            Self::Nonterminal(name) => Some(name),
            Self::Terminal(..) => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(ch) => write!(f, "{}", ch),
            Self::Nonterminal(name) => f.write_str(name),
        }
    }
}

/// Derive a fresh alias for `base`, appending marks until `taken` rejects
/// the candidate.
pub fn fresh_alias(base: &str, mut taken: impl FnMut(&str) -> bool) -> String {
    let mut name = format!("{}{}", base, ALIAS_MARK);
    while taken(&name) {
        name.push(ALIAS_MARK);
    }
    name
}

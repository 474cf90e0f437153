//! Context-free grammar values and the line-oriented input format.

use crate::symbol::{Symbol, ALIAS_MARK, ARROW, EPSILON, UNION};
use crate::types::Set;
use crate::util::display_fn;
use std::fmt;

/// One right-hand side. The epsilon literal of the input format becomes the
/// empty alternative.
pub type Alternative = Vec<Symbol>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: String,
    pub alternatives: Vec<Alternative>,
}

/// An ordered production list; the first production's left-hand side is the
/// start symbol. Grammars are immutable values: every transformation phase
/// returns a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub productions: Vec<Production>,
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("line {line}: missing `→` separator")]
    MissingArrow { line: usize },

    #[error("the grammar has no productions")]
    Empty,
}

impl Grammar {
    /// Parse the `LHS → RHS₁ | RHS₂ | …` format: one production per line,
    /// whitespace and control characters stripped, blank lines ignored.
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        let mut productions = vec![];
        for (index, raw) in text.lines().enumerate() {
            let line: String = raw
                .chars()
                .filter(|ch| !ch.is_whitespace() && !ch.is_control())
                .collect();
            if line.is_empty() {
                continue;
            }
            let (lhs, rhs) = line
                .split_once(ARROW)
                .ok_or(GrammarError::MissingArrow { line: index + 1 })?;
            let lhs = match tokenize(lhs).into_iter().next() {
                Some(Symbol::Nonterminal(name)) => name,
                _ => return Err(GrammarError::MissingArrow { line: index + 1 }),
            };
            let alternatives = rhs.split(UNION).map(tokenize).collect();
            productions.push(Production { lhs, alternatives });
        }
        if productions.is_empty() {
            return Err(GrammarError::Empty);
        }
        Ok(Self { productions })
    }

    pub fn start_symbol(&self) -> &str {
        &self.productions[0].lhs
    }

    pub fn index_of(&self, nonterminal: &str) -> Option<usize> {
        self.productions.iter().position(|p| p.lhs == nonterminal)
    }

    pub fn production(&self, nonterminal: &str) -> Option<&Production> {
        self.productions.iter().find(|p| p.lhs == nonterminal)
    }

    /// Terminal vocabulary in first-occurrence order.
    pub fn terminals(&self) -> Set<char> {
        let mut terminals = Set::default();
        for production in &self.productions {
            for alternative in &production.alternatives {
                for symbol in alternative {
                    if let Symbol::Terminal(ch) = symbol {
                        terminals.insert(*ch);
                    }
                }
            }
        }
        terminals
    }

    /// Nonterminal vocabulary in first-occurrence order, left-hand sides
    /// first.
    pub fn nonterminals(&self) -> Set<String> {
        let mut nonterminals = Set::default();
        for production in &self.productions {
            nonterminals.insert(production.lhs.clone());
        }
        for production in &self.productions {
            for alternative in &production.alternatives {
                for symbol in alternative {
                    if let Symbol::Nonterminal(name) = symbol {
                        nonterminals.insert(name.clone());
                    }
                }
            }
        }
        nonterminals
    }
}

/// Tokenize a right-hand side string, folding alias marks into the
/// preceding nonterminal. The epsilon literal contributes no symbol.
fn tokenize(text: &str) -> Alternative {
    let mut symbols: Alternative = vec![];
    for ch in text.chars() {
        if Symbol::starts_nonterminal(ch) {
            symbols.push(Symbol::Nonterminal(ch.to_string()));
        } else if ch == ALIAS_MARK {
            if let Some(Symbol::Nonterminal(name)) = symbols.last_mut() {
                name.push(ALIAS_MARK);
            } else {
                symbols.push(Symbol::Terminal(ch));
            }
        } else if ch != EPSILON {
            symbols.push(Symbol::Terminal(ch));
        }
    }
    symbols
}

/// `"bS'"`, or `"ε"` for the empty alternative.
pub fn display_alternative(alternative: &Alternative) -> impl fmt::Display + '_ {
    display_fn(move |f| {
        if alternative.is_empty() {
            return write!(f, "{}", EPSILON);
        }
        for symbol in alternative {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    })
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.lhs, ARROW)?;
        for (i, alternative) in self.alternatives.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", UNION)?;
            }
            write!(f, "{}", display_alternative(alternative))?;
        }
        Ok(())
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.productions {
            writeln!(f, "{}", production)?;
        }
        Ok(())
    }
}

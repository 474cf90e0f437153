//! FIRST and FOLLOW set computation.
//!
//! Everything is a monotone fixpoint over growing sets: a nullable pass,
//! FIRST saturation, then FOLLOW with direct contributions followed by
//! saturation of the inheritance obligations. The lattice is finite, so
//! every loop terminates when a full pass adds nothing.

use crate::grammar::Grammar;
use crate::symbol::{Symbol, ALIAS_MARK, END_MARKER, EPSILON};
use crate::types::{Map, Set};
use crate::util::display_fn;
use std::fmt;

/// FIRST and FOLLOW of a single nonterminal. `first` may contain the
/// epsilon literal; `follow` contains terminals and possibly the
/// end-marker, never epsilon.
#[derive(Debug, Clone)]
pub struct Record {
    pub base: String,
    pub first: Set<char>,
    pub follow: Set<char>,
}

#[derive(Debug, Clone)]
pub struct FirstFollowTable {
    pub records: Vec<Record>,
}

impl FirstFollowTable {
    pub fn record(&self, base: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.base == base)
    }

    /// Drop records of alias-named nonterminals; the SLR(1) report only
    /// shows the user-written vocabulary.
    pub fn without_aliases(self) -> Self {
        Self {
            records: self
                .records
                .into_iter()
                .filter(|r| !r.base.contains(ALIAS_MARK))
                .collect(),
        }
    }
}

/// Compute FIRST/FOLLOW records for every production of `grammar`, in
/// production order. FOLLOW of the start symbol is seeded with the
/// end-marker.
pub fn compute(grammar: &Grammar) -> FirstFollowTable {
    let nullable = nullable_set(grammar);
    let first = first_sets(grammar, &nullable);
    let follow = follow_sets(grammar, &nullable, &first);

    let records = grammar
        .productions
        .iter()
        .map(|production| {
            let base = production.lhs.clone();
            let mut first: Set<char> = first.get(&base).cloned().unwrap_or_default();
            if nullable.contains(&base) {
                first.insert(EPSILON);
            }
            let follow = follow.get(&base).cloned().unwrap_or_default();
            Record { base, first, follow }
        })
        .collect();

    FirstFollowTable { records }
}

/// The set of nonterminals that derive epsilon.
fn nullable_set(grammar: &Grammar) -> Set<String> {
    let mut nullable: Set<String> = Set::default();
    loop {
        let mut changed = false;
        for production in &grammar.productions {
            if nullable.contains(&production.lhs) {
                continue;
            }
            let derives_epsilon = production.alternatives.iter().any(|alternative| {
                alternative
                    .iter()
                    .all(|s| matches!(s, Symbol::Nonterminal(n) if nullable.contains(n)))
            });
            if derives_epsilon {
                nullable.insert(production.lhs.clone());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    nullable
}

/// FIRST terminals per nonterminal (epsilon is tracked by `nullable`).
fn first_sets(grammar: &Grammar, nullable: &Set<String>) -> Map<String, Set<char>> {
    let mut first: Map<String, Set<char>> = Map::default();
    for production in &grammar.productions {
        first.entry(production.lhs.clone()).or_default();
    }

    loop {
        let mut changed = false;
        for production in &grammar.productions {
            for alternative in &production.alternatives {
                let mut gathered: Set<char> = Set::default();
                for symbol in alternative {
                    match symbol {
                        Symbol::Terminal(ch) => {
                            gathered.insert(*ch);
                            break;
                        }
                        Symbol::Nonterminal(name) => {
                            if let Some(inner) = first.get(name) {
                                gathered.extend(inner.iter().copied());
                            }
                            if !nullable.contains(name) {
                                break;
                            }
                        }
                    }
                }
                let target = first.entry(production.lhs.clone()).or_default();
                for ch in gathered {
                    changed |= target.insert(ch);
                }
            }
        }
        if !changed {
            break;
        }
    }
    first
}

/// FIRST of a symbol sequence: terminals reachable through nullable
/// prefixes, plus a flag for "the whole sequence can vanish".
fn first_of_sequence(
    sequence: &[Symbol],
    first: &Map<String, Set<char>>,
    nullable: &Set<String>,
) -> (Set<char>, bool) {
    let mut gathered: Set<char> = Set::default();
    for symbol in sequence {
        match symbol {
            Symbol::Terminal(ch) => {
                gathered.insert(*ch);
                return (gathered, false);
            }
            Symbol::Nonterminal(name) => {
                if let Some(inner) = first.get(name) {
                    gathered.extend(inner.iter().copied());
                }
                if !nullable.contains(name) {
                    return (gathered, false);
                }
            }
        }
    }
    (gathered, true)
}

fn follow_sets(
    grammar: &Grammar,
    nullable: &Set<String>,
    first: &Map<String, Set<char>>,
) -> Map<String, Set<char>> {
    let mut follow: Map<String, Set<char>> = Map::default();
    follow
        .entry(grammar.start_symbol().to_owned())
        .or_default()
        .insert(END_MARKER);

    // rule 2 contributions, and the deferred rule 3 obligations
    // FOLLOW(lhs) ⊆ FOLLOW(name)
    let mut obligations: Vec<(String, String)> = vec![];
    for production in &grammar.productions {
        for alternative in &production.alternatives {
            for (position, symbol) in alternative.iter().enumerate() {
                let name = match symbol {
                    Symbol::Nonterminal(name) => name,
                    Symbol::Terminal(..) => continue,
                };
                let (beta_first, beta_vanishes) =
                    first_of_sequence(&alternative[position + 1..], first, nullable);
                let entry = follow.entry(name.clone()).or_default();
                entry.extend(beta_first.iter().copied());
                if beta_vanishes && production.lhs != *name {
                    obligations.push((production.lhs.clone(), name.clone()));
                }
            }
        }
    }

    // saturate until no follow set grows
    loop {
        let mut changed = false;
        for (source, target) in &obligations {
            let inherited: Vec<char> = follow
                .get(source)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            let entry = follow.entry(target.clone()).or_default();
            for ch in inherited {
                changed |= entry.insert(ch);
            }
        }
        if !changed {
            break;
        }
    }
    follow
}

impl fmt::Display for FirstFollowTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(
                f,
                "{:>4}:  first = {{{}}}  follow = {{{}}}",
                record.base,
                chars(&record.first),
                chars(&record.follow),
            )?;
        }
        Ok(())
    }
}

fn chars(set: &Set<char>) -> impl fmt::Display + '_ {
    display_fn(move |f| {
        for (i, ch) in set.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", ch)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{eliminate_left_recursion, left_factor};

    fn table_for(text: &str) -> FirstFollowTable {
        let grammar = Grammar::parse(text).unwrap();
        compute(&left_factor(&eliminate_left_recursion(&grammar)))
    }

    fn set(chars: &[char]) -> Set<char> {
        chars.iter().copied().collect()
    }

    #[test]
    fn arithmetic_grammar() {
        // E → E+T | T, T → a becomes E → TE', E' → +TE' | ε, T → a
        let table = table_for("E → E+T | T\nT → a");
        let e = table.record("E").unwrap();
        assert_eq!(e.first, set(&['a']));
        assert_eq!(e.follow, set(&[END_MARKER]));
        let e_alias = table.record("E'").unwrap();
        assert_eq!(e_alias.first, set(&['+', EPSILON]));
        assert_eq!(e_alias.follow, set(&[END_MARKER]));
        let t = table.record("T").unwrap();
        assert_eq!(t.first, set(&['a']));
        assert_eq!(t.follow, set(&['+', END_MARKER]));
    }

    #[test]
    fn follow_of_start_contains_end_marker() {
        let table = table_for("S → aS | b");
        assert!(table.record("S").unwrap().follow.contains(&END_MARKER));
    }

    #[test]
    fn epsilon_chains_through_all_nullable_alternatives() {
        let table = table_for("S → AB\nA → a | ε\nB → b | ε");
        let s = table.record("S").unwrap();
        assert_eq!(s.first, set(&['a', 'b', EPSILON]));
        // FOLLOW(A) picks up FIRST(B) and, since B can vanish, FOLLOW(S)
        let a = table.record("A").unwrap();
        assert_eq!(a.follow, set(&['b', END_MARKER]));
    }

    #[test]
    fn first_never_retains_a_nonterminal() {
        let table = table_for("S → Ab\nA → c | d");
        let s = table.record("S").unwrap();
        assert_eq!(s.first, set(&['c', 'd']));
    }

    #[test]
    fn alias_records_can_be_filtered() {
        let table = table_for("E → E+T | T\nT → a").without_aliases();
        assert!(table.record("E'").is_none());
        assert!(table.record("E").is_some());
    }
}

//! Grammar normalization: left-recursion elimination and left factoring.
//!
//! Every phase takes a grammar value and returns a new one, so each can be
//! tested in isolation and no intermediate state leaks between phases.

use crate::grammar::{Alternative, Grammar, Production};
use crate::symbol::{fresh_alias, Symbol};
use crate::types::{Map, Set};

/// Remove left recursion: expose indirect recursion by substitution, rewrite
/// direct recursion with alias productions, then prune what became
/// unreachable from the start symbol.
pub fn eliminate_left_recursion(grammar: &Grammar) -> Grammar {
    let exposed = expose_indirect_recursion(grammar.clone());
    let rewritten = remove_direct_recursion(exposed);
    let pruned = prune_unreachable(rewritten);
    tracing::debug!(productions = pruned.productions.len(), "left recursion eliminated");
    pruned
}

/// Substitute the right-hand sides of an earlier-declared nonterminal into
/// every alternative it heads, exposing recursion that is not syntactically
/// direct. A head declared *later* than the referencing production is left
/// alone: single top-down pass, by design of the reference procedure. The
/// substitution source is the grammar as it was on entry, and heads whose
/// production has no nonterminal-headed alternative are skipped (they cannot
/// contribute recursion).
fn expose_indirect_recursion(mut grammar: Grammar) -> Grammar {
    let snapshot = grammar.clone();
    for i in 0..grammar.productions.len() {
        let mut j = 0;
        while j < grammar.productions[i].alternatives.len() {
            let head = match grammar.productions[i].alternatives[j].first() {
                Some(Symbol::Nonterminal(name)) => name.clone(),
                _ => {
                    j += 1;
                    continue;
                }
            };
            let referenced = match snapshot.index_of(&head) {
                Some(k) if k < i => &snapshot.productions[k],
                _ => {
                    j += 1;
                    continue;
                }
            };
            let may_recurse = referenced
                .alternatives
                .iter()
                .any(|alt| matches!(alt.first(), Some(Symbol::Nonterminal(..))));
            if !may_recurse {
                j += 1;
                continue;
            }

            let suffix: Alternative = grammar.productions[i].alternatives[j][1..].to_vec();
            let expansions: Vec<Alternative> = referenced
                .alternatives
                .iter()
                .map(|alt| {
                    let mut expanded = alt.clone();
                    expanded.extend(suffix.iter().cloned());
                    expanded
                })
                .collect();
            grammar.productions[i]
                .alternatives
                .splice(j..j + 1, expansions);
            j += 1;
        }
    }
    grammar
}

/// `A → Aα₁ | … | Aαₙ | β₁ | … | βₘ` becomes `A → β₁A' | … | βₘA'` plus
/// `A' → α₁A' | … | αₙA' | ε`. Appended alias productions are scanned too.
fn remove_direct_recursion(mut grammar: Grammar) -> Grammar {
    let mut i = 0;
    while i < grammar.productions.len() {
        let lhs = grammar.productions[i].lhs.clone();
        let mut recursive: Vec<Alternative> = vec![];
        let mut others: Vec<Alternative> = vec![];
        for alternative in &grammar.productions[i].alternatives {
            match alternative.first() {
                Some(Symbol::Nonterminal(head)) if *head == lhs => {
                    recursive.push(alternative[1..].to_vec());
                }
                _ => others.push(alternative.clone()),
            }
        }
        if !recursive.is_empty() {
            let alias = fresh_alias(&lhs, |name| grammar.index_of(name).is_some());
            let alias_symbol = Symbol::nonterminal(alias.clone());

            grammar.productions[i].alternatives = others
                .into_iter()
                .map(|mut beta| {
                    beta.push(alias_symbol.clone());
                    beta
                })
                .collect();

            let mut alias_alternatives: Vec<Alternative> = recursive
                .into_iter()
                .map(|mut alpha| {
                    alpha.push(alias_symbol.clone());
                    alpha
                })
                .collect();
            alias_alternatives.push(vec![]);
            grammar.productions.push(Production {
                lhs: alias,
                alternatives: alias_alternatives,
            });
        }
        i += 1;
    }
    grammar
}

/// Keep only productions whose left-hand side is reachable from the start
/// symbol; a nonterminal becomes reachable when a reachable alternative
/// mentions it, iterated to closure.
fn prune_unreachable(grammar: Grammar) -> Grammar {
    let mut reachable: Set<String> = Set::default();
    reachable.insert(grammar.start_symbol().to_owned());
    loop {
        let mut changed = false;
        for production in &grammar.productions {
            if !reachable.contains(&production.lhs) {
                continue;
            }
            for alternative in &production.alternatives {
                for symbol in alternative {
                    if let Symbol::Nonterminal(name) = symbol {
                        changed |= reachable.insert(name.clone());
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    Grammar {
        productions: grammar
            .productions
            .into_iter()
            .filter(|p| reachable.contains(&p.lhs))
            .collect(),
    }
}

/// Factor the longest common prefix out of every production until no two
/// alternatives share one; divergent suffixes move to a fresh alias
/// production, with ε standing in for an empty suffix.
pub fn left_factor(grammar: &Grammar) -> Grammar {
    let mut grammar = grammar.clone();
    let mut i = 0;
    while i < grammar.productions.len() {
        while let Some(prefix) = longest_common_prefix(&grammar.productions[i].alternatives) {
            let lhs = grammar.productions[i].lhs.clone();
            let alias = fresh_alias(&lhs, |name| grammar.index_of(name).is_some());
            let alias_symbol = Symbol::nonterminal(alias.clone());

            let mut suffixes: Vec<Alternative> = vec![];
            {
                let alternatives = &mut grammar.productions[i].alternatives;
                let mut j = alternatives.len();
                while j > 0 {
                    j -= 1;
                    if alternatives[j].starts_with(&prefix) {
                        suffixes.push(alternatives[j][prefix.len()..].to_vec());
                        alternatives.remove(j);
                    }
                }
                let mut replacement = prefix;
                replacement.push(alias_symbol);
                alternatives.push(replacement);
            }
            grammar.productions.push(Production {
                lhs: alias,
                alternatives: suffixes,
            });
        }
        i += 1;
    }
    tracing::debug!(productions = grammar.productions.len(), "left factoring done");
    grammar
}

/// The longest symbol prefix shared by at least two alternatives, if any.
fn longest_common_prefix(alternatives: &[Alternative]) -> Option<Alternative> {
    let mut counts: Map<Alternative, usize> = Map::default();
    for alternative in alternatives {
        for len in 1..=alternative.len() {
            *counts.entry(alternative[..len].to_vec()).or_default() += 1;
        }
    }
    let mut best: Option<Alternative> = None;
    for (prefix, count) in counts {
        if count > 1 && prefix.len() > best.as_ref().map_or(0, Vec::len) {
            best = Some(prefix);
        }
    }
    best
}

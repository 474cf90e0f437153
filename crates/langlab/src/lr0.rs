//! Grammar augmentation and the canonical LR(0) collection.

use crate::grammar::{Alternative, Grammar, Production};
use crate::symbol::{fresh_alias, Symbol, DOT};
use crate::types::Map;
use crate::util::display_fn;
use std::{collections::VecDeque, fmt};

/// Prepend a fresh start production `S' → S` so acceptance is a single
/// reduction. The alias name is derived from the current start symbol.
pub fn augment(grammar: &Grammar) -> Grammar {
    let start = grammar.start_symbol().to_owned();
    let alias = fresh_alias(&start, |name| grammar.index_of(name).is_some());
    let mut productions = vec![Production {
        lhs: alias,
        alternatives: vec![vec![Symbol::nonterminal(start)]],
    }];
    productions.extend(grammar.productions.iter().cloned());
    Grammar { productions }
}

/// A dotted production. The dot sits before `body[dot]`; `dot == body.len()`
/// marks a completed item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub left: String,
    pub body: Alternative,
    pub dot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// The dot precedes a nonterminal.
    Pending,
    /// The dot precedes a terminal.
    Shift,
    /// The dot is at the end of the body.
    Reduce,
}

impl Item {
    pub fn expected(&self) -> Option<&Symbol> {
        self.body.get(self.dot)
    }

    pub fn kind(&self) -> ItemKind {
        match self.expected() {
            None => ItemKind::Reduce,
            Some(Symbol::Terminal(..)) => ItemKind::Shift,
            Some(Symbol::Nonterminal(..)) => ItemKind::Pending,
        }
    }

    fn advanced(&self) -> Self {
        Self {
            left: self.left.clone(),
            body: self.body.clone(),
            dot: self.dot + 1,
        }
    }
}

/// One state of the collection: its closed item set plus the goto edges.
#[derive(Debug, Clone)]
pub struct LrState {
    pub items: Vec<Item>,
    pub transitions: Map<Symbol, usize>,
}

#[derive(Debug, Clone)]
pub struct CanonicalCollection {
    pub states: Vec<LrState>,
}

/// Close `kernel` under item derivation: whenever the dot precedes a
/// nonterminal, all of its alternatives join as fresh dot-zero items.
fn closure(grammar: &Grammar, kernel: &[Item]) -> Vec<Item> {
    let mut items: Vec<Item> = kernel.to_vec();
    let mut cursor = 0;
    while cursor < items.len() {
        if let Some(Symbol::Nonterminal(name)) = items[cursor].expected() {
            if let Some(production) = grammar.production(name) {
                for alternative in &production.alternatives {
                    let item = Item {
                        left: production.lhs.clone(),
                        body: alternative.clone(),
                        dot: 0,
                    };
                    if !items.contains(&item) {
                        items.push(item);
                    }
                }
            }
        }
        cursor += 1;
    }
    items
}

/// Build the canonical LR(0) collection of an augmented grammar.
///
/// States are discovered breadth first and deduplicated by their sorted
/// kernel, so two goto edges reaching the same item set share one state and
/// ids are dense in discovery order.
pub fn canonical_collection(grammar: &Grammar) -> CanonicalCollection {
    let start_kernel = vec![Item {
        left: grammar.start_symbol().to_owned(),
        body: grammar.productions[0].alternatives[0].clone(),
        dot: 0,
    }];

    let mut ids: Map<Vec<Item>, usize> = Map::default();
    let mut pending: VecDeque<(usize, Vec<Item>)> = VecDeque::new();
    let mut states: Vec<LrState> = vec![];

    ids.insert(start_kernel.clone(), 0);
    pending.push_back((0, start_kernel));

    while let Some((id, kernel)) = pending.pop_front() {
        debug_assert_eq!(id, states.len());
        let items = closure(grammar, &kernel);

        // group advanceable items by the symbol after the dot
        let mut kernels: Map<Symbol, Vec<Item>> = Map::default();
        for item in &items {
            if let Some(symbol) = item.expected() {
                kernels
                    .entry(symbol.clone())
                    .or_default()
                    .push(item.advanced());
            }
        }

        let mut transitions = Map::default();
        for (symbol, mut kernel) in kernels {
            kernel.sort();
            kernel.dedup();
            let next = ids.len();
            let target = *ids.entry(kernel.clone()).or_insert_with(|| {
                pending.push_back((next, kernel));
                next
            });
            transitions.insert(symbol, target);
        }

        states.push(LrState { items, transitions });
    }

    tracing::debug!(states = states.len(), "canonical collection built");
    CanonicalCollection { states }
}

fn display_item(item: &Item) -> impl fmt::Display + '_ {
    display_fn(move |f| {
        write!(f, "{} {} ", item.left, crate::symbol::ARROW)?;
        for (position, symbol) in item.body.iter().enumerate() {
            if position == item.dot {
                write!(f, "{}", DOT)?;
            }
            write!(f, "{}", symbol)?;
        }
        if item.dot == item.body.len() {
            write!(f, "{}", DOT)?;
        }
        Ok(())
    })
}

impl fmt::Display for CanonicalCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, state) in self.states.iter().enumerate() {
            writeln!(f, "I{}:", id)?;
            for item in &state.items {
                writeln!(f, "  {}", display_item(item))?;
            }
            for (symbol, target) in &state.transitions {
                writeln!(f, "  goto({}) = I{}", symbol, target)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection_for(text: &str) -> CanonicalCollection {
        canonical_collection(&augment(&Grammar::parse(text).unwrap()))
    }

    #[test]
    fn augmentation_prepends_an_aliased_start() {
        let grammar = augment(&Grammar::parse("S → a").unwrap());
        assert_eq!(grammar.start_symbol(), "S'");
        assert_eq!(grammar.productions[0].to_string(), "S' → S");
        assert_eq!(grammar.productions.len(), 2);
    }

    #[test]
    fn small_grammar_has_five_states() {
        // E' → E, E → aA, A → b
        let collection = collection_for("E → aA\nA → b");
        assert_eq!(collection.states.len(), 5);

        let initial = &collection.states[0];
        assert_eq!(initial.items.len(), 2);
        assert_eq!(initial.transitions.len(), 2);
        let after_a = initial.transitions[&Symbol::Terminal('a')];
        // goto over `a` pulls in the A alternatives
        assert_eq!(collection.states[after_a].items.len(), 2);
    }

    #[test]
    fn states_are_deduplicated_by_kernel() {
        let collection = collection_for("S → aA | bA\nA → c");
        let mut kernels = std::collections::HashSet::new();
        for state in &collection.states {
            let mut sorted = state.items.clone();
            sorted.sort();
            assert!(kernels.insert(sorted), "duplicate item set");
        }
        // both aA· and bA· paths reach distinct states, but the closure of
        // A → ·c is shared structure, not a duplicated state
        let shifts_on_c = collection
            .states
            .iter()
            .filter(|s| s.transitions.contains_key(&Symbol::Terminal('c')))
            .count();
        assert_eq!(shifts_on_c, 2);
    }

    #[test]
    fn item_kinds_follow_the_dot() {
        let item = |dot| Item {
            left: "E".to_owned(),
            body: vec![Symbol::Terminal('a'), Symbol::nonterminal("A")],
            dot,
        };
        assert_eq!(item(0).kind(), ItemKind::Shift);
        assert_eq!(item(1).kind(), ItemKind::Pending);
        assert_eq!(item(2).kind(), ItemKind::Reduce);
    }
}

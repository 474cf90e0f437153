//! End-to-end checks across the pipelines, driving only the public API.

use langlab::analysis::{analyze_ll1, analyze_regex, analyze_slr1};
use langlab::automaton::{Nfa, StateId};
use langlab::grammar::Grammar;
use langlab::subset::Dfa;
use std::collections::HashSet;

/// Simulate the NFA directly, tracking the reachable state set.
fn nfa_accepts(nfa: &Nfa, input: &str) -> bool {
    fn close(nfa: &Nfa, seeds: impl IntoIterator<Item = StateId>) -> HashSet<StateId> {
        let mut members = HashSet::new();
        let mut stack: Vec<StateId> = seeds.into_iter().collect();
        while let Some(id) = stack.pop() {
            if members.insert(id) {
                stack.extend(nfa.state(id).epsilon.iter().copied());
            }
        }
        members
    }

    let mut current = close(nfa, [nfa.start()]);
    for ch in input.chars() {
        let seeds: Vec<StateId> = current
            .iter()
            .flat_map(|&id| nfa.state(id).transitions.get(&ch).into_iter().flatten())
            .copied()
            .collect();
        current = close(nfa, seeds);
        if current.is_empty() {
            return false;
        }
    }
    current.iter().any(|&id| nfa.state(id).is_end)
}

fn dfa_accepts(dfa: &Dfa, input: &str) -> bool {
    let mut state = dfa.start();
    for ch in input.chars() {
        match dfa.states[state].transitions.get(&ch) {
            Some(&target) => state = target,
            None => return false,
        }
    }
    dfa.states[state].is_end
}

/// All strings over `alphabet` up to `max_len` characters.
fn strings(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut next = vec![];
        for prefix in &frontier {
            for &ch in alphabet {
                let mut s = prefix.clone();
                s.push(ch);
                next.push(s);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}

#[test]
fn every_automaton_stage_recognizes_the_same_language() {
    for pattern in ["(a|b)*abb", "a·b|c*", "a*", "(a|b)*a", "ab|ε"] {
        let analysis = analyze_regex(pattern).expect(pattern);
        let alphabet: Vec<char> = analysis.nfa.alphabet().into_iter().collect();
        for input in strings(&alphabet, 5) {
            let by_nfa = nfa_accepts(&analysis.nfa, &input);
            let by_dfa = dfa_accepts(&analysis.dfa, &input);
            let by_min = dfa_accepts(&analysis.minimized, &input);
            assert_eq!(by_nfa, by_dfa, "{} on {:?}: NFA vs DFA", pattern, input);
            assert_eq!(by_dfa, by_min, "{} on {:?}: DFA vs minimal", pattern, input);
        }
    }
}

#[test]
fn minimal_automaton_size_is_stable_across_runs() {
    let first = analyze_regex("a·b|c*").unwrap();
    let second = analyze_regex("a·b|c*").unwrap();
    assert_eq!(first.minimized.states.len(), 4);
    assert_eq!(
        first.minimized.states.len(),
        second.minimized.states.len()
    );
}

#[test]
fn expression_grammar_end_to_end() {
    let grammar = Grammar::parse("E → E+T | T\nT → T*F | F\nF → (E) | a").unwrap();
    let analysis = analyze_ll1(&grammar);
    assert!(
        analysis.table.is_ll1(),
        "conflicts: {:?}",
        analysis.table.conflicts
    );
    for sentence in ["a", "a+a", "a*a+a", "(a+a)*a"] {
        assert!(
            analysis.table.simulate(sentence).accepted,
            "expected acceptance of {:?}",
            sentence
        );
    }
    for sentence in ["", "+", "a+", "a(", "(a"] {
        assert!(
            !analysis.table.simulate(sentence).accepted,
            "expected rejection of {:?}",
            sentence
        );
    }
}

#[test]
fn nullable_head_grammar_parses_end_to_end() {
    // FIRST(S) gains `b` only through the nullable A; the predictive cell
    // must still resolve and the sentence without the optional `c` parse
    let grammar = Grammar::parse("S → Ab\nA → c | ε").unwrap();
    let analysis = analyze_ll1(&grammar);
    assert!(
        analysis.table.is_ll1(),
        "conflicts: {:?}",
        analysis.table.conflicts
    );
    assert!(analysis.table.simulate("b").accepted);
    assert!(analysis.table.simulate("cb").accepted);
    assert!(!analysis.table.simulate("bb").accepted);
}

#[test]
fn slr1_collection_covers_left_recursive_items() {
    let grammar = Grammar::parse("E → E+T | T\nT → a").unwrap();
    let analysis = analyze_slr1(&grammar);
    assert_eq!(analysis.augmented.start_symbol(), "E'");
    // the left-recursive alternative survives into the item sets
    let has_recursive_item = analysis.collection.states.iter().any(|state| {
        state
            .items
            .iter()
            .any(|item| item.left == "E" && item.body.len() == 3)
    });
    assert!(has_recursive_item, "E → ·E+T missing from the collection");
}

#[test]
fn canonical_collection_shares_isomorphic_states() {
    let grammar = Grammar::parse("E → E+T | T\nT → a").unwrap();
    let analysis = analyze_slr1(&grammar);

    let mut seen = HashSet::new();
    for state in &analysis.collection.states {
        let mut items = state.items.clone();
        items.sort();
        assert!(seen.insert(items), "duplicate item set in the collection");
    }
    for state in &analysis.collection.states {
        for &target in state.transitions.values() {
            assert!(target < analysis.collection.states.len());
        }
    }
}

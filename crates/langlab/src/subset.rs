//! Subset construction: epsilon-closure union over an NFA.

use crate::automaton::{Nfa, StateId};
use crate::types::{Map, Set};
use std::{collections::VecDeque, fmt};

/// A deterministic state produced by subset construction or minimization.
/// `core` is the set of origin-automaton ids this state represents.
#[derive(Debug, Clone)]
pub struct DfaState {
    pub is_start: bool,
    pub is_end: bool,
    pub core: Vec<StateId>,
    pub transitions: Map<char, usize>,
}

#[derive(Debug)]
pub struct Dfa {
    pub states: Vec<DfaState>,
}

impl Dfa {
    /// All labels observed anywhere in the automaton, in first-seen order.
    pub fn alphabet(&self) -> Set<char> {
        self.states
            .iter()
            .flat_map(|s| s.transitions.keys().copied())
            .collect()
    }

    pub fn start(&self) -> usize {
        self.states
            .iter()
            .position(|s| s.is_start)
            .unwrap_or_default()
    }
}

/// The epsilon closure of `seeds`, as a sorted id set. The scratch visited
/// flags live here instead of on the nodes, so no reset pass is needed
/// between calls.
fn epsilon_closure(nfa: &Nfa, seeds: &[StateId]) -> Vec<StateId> {
    let mut visited = vec![false; nfa.len()];
    let mut members = vec![];
    let mut stack = seeds.to_vec();
    while let Some(id) = stack.pop() {
        if std::mem::replace(&mut visited[id.0], true) {
            continue;
        }
        members.push(id);
        stack.extend(nfa.state(id).epsilon.iter().copied());
    }
    members.sort_unstable();
    members
}

/// Build the subset-construction DFA of `nfa`.
///
/// The worklist is keyed by the sorted pre-closure core of each state, so a
/// core is expanded at most once; ids are assigned densely in worklist
/// order, making a separate renumbering pass unnecessary. Termination is
/// bounded by the number of distinct cores.
pub fn subset_construction(nfa: &Nfa) -> Dfa {
    let mut ids: Map<Vec<StateId>, usize> = Map::default();
    let mut pending: VecDeque<(usize, Vec<StateId>)> = VecDeque::new();
    let mut states: Vec<DfaState> = vec![];

    let start_core = vec![nfa.start()];
    ids.insert(start_core.clone(), 0);
    pending.push_back((0, start_core));

    while let Some((id, core)) = pending.pop_front() {
        debug_assert_eq!(id, states.len());
        let members = epsilon_closure(nfa, &core);
        let is_end = members.iter().any(|&m| nfa.state(m).is_end);

        // merge the labeled transitions of every closure member
        let mut merged: Map<char, Set<StateId>> = Map::default();
        for &member in &members {
            for (&label, targets) in &nfa.state(member).transitions {
                merged.entry(label).or_default().extend(targets.iter().copied());
            }
        }

        let mut transitions = Map::default();
        for (label, targets) in merged {
            let mut target_core: Vec<StateId> = targets.into_iter().collect();
            target_core.sort_unstable();
            let next = ids.len();
            let target = *ids.entry(target_core.clone()).or_insert_with(|| {
                pending.push_back((next, target_core));
                next
            });
            transitions.insert(label, target);
        }

        states.push(DfaState {
            is_start: id == 0,
            is_end,
            core,
            transitions,
        });
    }

    tracing::debug!(nfa_states = nfa.len(), dfa_states = states.len(), "subset construction done");
    Dfa { states }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alphabet = self.alphabet();
        for (id, state) in self.states.iter().enumerate() {
            let start = if state.is_start { '>' } else { ' ' };
            let end = if state.is_end { '*' } else { ' ' };
            write!(f, "{}{}{:>3}:", start, end, id)?;
            for &label in &alphabet {
                match state.transitions.get(&label) {
                    Some(target) => write!(f, "  {} -> {}", label, target)?,
                    None => write!(f, "  {} -> -", label)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{automaton::thompson, regex::translate};

    fn dfa_for(pattern: &str) -> Dfa {
        subset_construction(&thompson(&translate(pattern)).unwrap())
    }

    #[test]
    fn single_letter() {
        let dfa = dfa_for("a");
        assert_eq!(dfa.states.len(), 2);
        assert!(dfa.states[0].is_start);
        assert!(!dfa.states[0].is_end);
        assert!(dfa.states[1].is_end);
        assert_eq!(dfa.states[0].transitions.get(&'a'), Some(&1));
    }

    #[test]
    fn closure_start_state_accepts() {
        // ε is in the language of a*, so the start state is accepting
        let dfa = dfa_for("a*");
        assert!(dfa.states[dfa.start()].is_end);
    }

    #[test]
    fn transition_function_is_deterministic() {
        let dfa = dfa_for("(a|b)*abb");
        for state in &dfa.states {
            for (&label, &target) in &state.transitions {
                assert!(target < dfa.states.len(), "dangling target on {}", label);
            }
        }
    }

    #[test]
    fn cores_are_disjoint_keys() {
        let dfa = dfa_for("(a|b)*a");
        let mut seen = std::collections::HashSet::new();
        for state in &dfa.states {
            assert!(seen.insert(state.core.clone()), "duplicate core produced");
        }
    }
}

//! DFA minimization by partition refinement.

use crate::automaton::StateId;
use crate::subset::{Dfa, DfaState};
use crate::types::Map;

/// One refinement round: split every block by successor signature. Two
/// states stay together iff, for every symbol, their successors are either
/// both absent or lie in the same current block; the test is
/// partition-relative, never on raw ids.
fn refine(dfa: &Dfa, partition: &[Vec<usize>], block_of: &[usize]) -> Vec<Vec<usize>> {
    let alphabet = dfa.alphabet();
    let mut next = vec![];
    for block in partition {
        let mut groups: Map<Vec<Option<usize>>, Vec<usize>> = Map::default();
        for &state in block {
            let signature: Vec<Option<usize>> = alphabet
                .iter()
                .map(|label| {
                    dfa.states[state]
                        .transitions
                        .get(label)
                        .map(|&target| block_of[target])
                })
                .collect();
            groups.entry(signature).or_default().push(state);
        }
        next.extend(groups.into_values());
    }
    next
}

/// Minimize `dfa`: start from the accepting/non-accepting split and refine
/// until stable, then merge each block into a single state. Merged states
/// inherit their flags by OR and the transition shape of a representative
/// member, retargeted at block ids; epsilon bookkeeping is gone already and
/// `core` records the member ids of the block.
pub fn minimize(dfa: &Dfa) -> Dfa {
    let accepting: Vec<usize> = (0..dfa.states.len())
        .filter(|&i| dfa.states[i].is_end)
        .collect();
    let rejecting: Vec<usize> = (0..dfa.states.len())
        .filter(|&i| !dfa.states[i].is_end)
        .collect();
    let mut partition: Vec<Vec<usize>> = [accepting, rejecting]
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect();

    loop {
        let block_of = block_index(dfa.states.len(), &partition);
        let next = refine(dfa, &partition, &block_of);
        if next.len() == partition.len() {
            break;
        }
        partition = next;
    }

    let block_of = block_index(dfa.states.len(), &partition);
    let states = partition
        .iter()
        .map(|block| {
            let representative = &dfa.states[block[0]];
            DfaState {
                is_start: block.iter().any(|&m| dfa.states[m].is_start),
                is_end: block.iter().any(|&m| dfa.states[m].is_end),
                core: block.iter().map(|&m| StateId(m)).collect(),
                transitions: representative
                    .transitions
                    .iter()
                    .map(|(&label, &target)| (label, block_of[target]))
                    .collect(),
            }
        })
        .collect();

    tracing::debug!(before = dfa.states.len(), after = partition.len(), "minimization done");
    Dfa { states }
}

fn block_index(len: usize, partition: &[Vec<usize>]) -> Vec<usize> {
    let mut block_of = vec![0; len];
    for (index, block) in partition.iter().enumerate() {
        for &member in block {
            block_of[member] = index;
        }
    }
    block_of
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{automaton::thompson, regex::translate, subset::subset_construction};

    fn minimal_dfa(pattern: &str) -> Dfa {
        minimize(&subset_construction(&thompson(&translate(pattern)).unwrap()))
    }

    #[test]
    fn dragon_book_example() {
        // (a|b)*abb has a four-state minimal DFA
        let dfa = minimal_dfa("(a|b)*abb");
        assert_eq!(dfa.states.len(), 4);
    }

    #[test]
    fn minimization_is_idempotent() {
        let once = minimal_dfa("(a|b)*abb");
        let twice = minimize(&once);
        assert_eq!(once.states.len(), twice.states.len());
        for (a, b) in once.states.iter().zip(&twice.states) {
            assert_eq!(a.is_end, b.is_end);
            assert_eq!(a.transitions.len(), b.transitions.len());
        }
    }

    #[test]
    fn flags_are_inherited_by_or() {
        let dfa = minimal_dfa("a*");
        assert_eq!(dfa.states.iter().filter(|s| s.is_start).count(), 1);
        assert!(dfa.states.iter().any(|s| s.is_end));
    }
}

//! Automaton state graph and Thompson construction.
//!
//! States live in an arena indexed by [`StateId`]; edges are id references,
//! so the cyclic epsilon structure of a Thompson NFA needs no shared
//! ownership. Traversal scratch flags are allocated per walk instead of
//! being stored on the nodes.

use crate::types::{Map, Set};
use crate::{
    symbol::{EPSILON, GROUP_LEFT, GROUP_RIGHT},
    util::display_fn,
};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateId(pub(crate) usize);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single automaton node. In an NFA a labeled edge may have several
/// successors and `epsilon` may be non-empty; both collapse after subset
/// construction.
#[derive(Debug, Default, Clone)]
pub struct State {
    pub is_start: bool,
    pub is_end: bool,
    pub transitions: Map<char, Vec<StateId>>,
    pub epsilon: Vec<StateId>,
}

impl State {
    fn new(is_start: bool, is_end: bool) -> Self {
        Self {
            is_start,
            is_end,
            ..Self::default()
        }
    }

    fn add_transition(&mut self, label: char, to: StateId) {
        self.transitions.entry(label).or_default().push(to);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegexError {
    #[error("malformed expression: unbalanced `{0}`")]
    UnbalancedGroup(char),

    #[error("malformed expression: operator `{0}` is missing an operand")]
    MissingOperand(char),

    #[error("malformed expression: {0} fragments left after evaluation")]
    DanglingFragments(usize),
}

/// A single-entry/single-exit NFA fragment delimited by its boundary states.
#[derive(Debug, Copy, Clone)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// The finished NFA: an arena of states with one start and one accepting
/// state, ids densely renumbered in depth-first discovery order.
#[derive(Debug)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
}

impl Nfa {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> + '_ {
        self.states.iter().enumerate().map(|(i, s)| (StateId(i), s))
    }

    /// All labels observed anywhere in the automaton, in first-seen order.
    pub fn alphabet(&self) -> Set<char> {
        self.states
            .iter()
            .flat_map(|s| s.transitions.keys().copied())
            .collect()
    }
}

struct Builder {
    states: Vec<State>,
}

impl Builder {
    fn alloc(&mut self, is_start: bool, is_end: bool) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(State::new(is_start, is_end));
        id
    }

    fn state(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.0]
    }

    /// A two-state fragment with one labeled (or epsilon) edge.
    fn literal(&mut self, label: Option<char>) -> Fragment {
        let start = self.alloc(true, false);
        let end = self.alloc(false, true);
        match label {
            Some(ch) => self.state(start).add_transition(ch, end),
            None => self.state(start).epsilon.push(end),
        }
        Fragment { start, end }
    }

    /// `a|b`: a fresh wrapper carries the boundary flags, the operands are
    /// reached and left through epsilon edges.
    fn union(&mut self, a: Fragment, b: Fragment) -> Fragment {
        let start = self.alloc(true, false);
        let end = self.alloc(false, true);
        self.state(start).epsilon.extend([a.start, b.start]);
        for operand in [a, b] {
            self.state(operand.start).is_start = false;
            let op_end = self.state(operand.end);
            op_end.epsilon.push(end);
            op_end.is_end = false;
        }
        Fragment { start, end }
    }

    /// `a*`: bypass and feedback epsilon edges around the operand.
    fn closure(&mut self, a: Fragment) -> Fragment {
        let start = self.alloc(true, false);
        let end = self.alloc(false, true);
        self.state(start).epsilon.extend([a.start, end]);
        let op_end = self.state(a.end);
        op_end.epsilon.extend([a.start, end]);
        op_end.is_end = false;
        self.state(a.start).is_start = false;
        Fragment { start, end }
    }

    /// `a·b`: no new states, only a bridging epsilon edge.
    fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
        let a_end = self.state(a.end);
        a_end.epsilon.push(b.start);
        a_end.is_end = false;
        self.state(b.start).is_start = false;
        Fragment {
            start: a.start,
            end: b.end,
        }
    }
}

/// Evaluate a postfix expression into an NFA by Thompson construction.
pub fn thompson(postfix: &str) -> Result<Nfa, RegexError> {
    use crate::symbol::{CLOSURE, CONCAT, UNION};

    let mut builder = Builder { states: vec![] };
    let mut stack: Vec<Fragment> = vec![];
    for token in postfix.chars() {
        match token {
            GROUP_LEFT | GROUP_RIGHT => return Err(RegexError::UnbalancedGroup(token)),
            UNION | CONCAT => {
                let b = stack.pop().ok_or(RegexError::MissingOperand(token))?;
                let a = stack.pop().ok_or(RegexError::MissingOperand(token))?;
                let fragment = if token == UNION {
                    builder.union(a, b)
                } else {
                    builder.concat(a, b)
                };
                stack.push(fragment);
            }
            CLOSURE => {
                let a = stack.pop().ok_or(RegexError::MissingOperand(token))?;
                let fragment = builder.closure(a);
                stack.push(fragment);
            }
            EPSILON => stack.push(builder.literal(None)),
            literal => stack.push(builder.literal(Some(literal))),
        }
    }

    let leftover = stack.len();
    let fragment = match stack.pop() {
        Some(fragment) if leftover == 1 => fragment,
        _ => return Err(RegexError::DanglingFragments(leftover)),
    };
    tracing::debug!(states = builder.states.len(), "thompson construction done");

    Ok(renumber(builder.states, fragment.start))
}

/// Reorder the arena so that ids follow depth-first discovery order from the
/// start state, labeled transitions before epsilon transitions. Unreachable
/// states are dropped.
fn renumber(states: Vec<State>, start: StateId) -> Nfa {
    let mut order: Vec<StateId> = vec![];
    let mut visited = vec![false; states.len()];
    dfs(&states, start, &mut visited, &mut order);

    let mut remap: Map<StateId, StateId> = Map::default();
    for (new, &old) in order.iter().enumerate() {
        remap.insert(old, StateId(new));
    }

    let renumbered = order
        .iter()
        .map(|&old| {
            let state = &states[old.0];
            State {
                is_start: state.is_start,
                is_end: state.is_end,
                transitions: state
                    .transitions
                    .iter()
                    .map(|(&label, targets)| {
                        (label, targets.iter().map(|t| remap[t]).collect())
                    })
                    .collect(),
                epsilon: state.epsilon.iter().map(|t| remap[t]).collect(),
            }
        })
        .collect();

    Nfa {
        states: renumbered,
        start: remap[&start],
    }
}

fn dfs(states: &[State], id: StateId, visited: &mut [bool], order: &mut Vec<StateId>) {
    if visited[id.0] {
        return;
    }
    visited[id.0] = true;
    order.push(id);
    let state = &states[id.0];
    for targets in state.transitions.values() {
        for &next in targets {
            dfs(states, next, visited, order);
        }
    }
    for &next in &state.epsilon {
        dfs(states, next, visited, order);
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alphabet = self.alphabet();
        for (id, state) in self.states() {
            write!(f, "{}{}{:>3}:", flag(state.is_start, '>'), flag(state.is_end, '*'), id)?;
            for &label in &alphabet {
                match state.transitions.get(&label) {
                    Some(targets) => {
                        write!(f, "  {} -> {{{}}}", label, ids(targets))?;
                    }
                    None => write!(f, "  {} -> {{}}", label)?,
                }
            }
            writeln!(f, "  {} -> {{{}}}", EPSILON, ids(&state.epsilon))?;
        }
        Ok(())
    }
}

fn flag(on: bool, mark: char) -> char {
    if on {
        mark
    } else {
        ' '
    }
}

fn ids(targets: &[StateId]) -> impl fmt::Display + '_ {
    display_fn(move |f| {
        for (i, id) in targets.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    })
}

//! LL(1) predictive table construction and table-driven derivation.

use crate::first_follow::FirstFollowTable;
use crate::grammar::{display_alternative, Alternative, Grammar};
use crate::symbol::{Symbol, END_MARKER, EPSILON};
use crate::types::{Map, Set};
use std::fmt;

/// One table row: the cells of a single nonterminal, keyed by lookahead.
/// A cell holding more than one alternative is a conflict.
#[derive(Debug, Clone)]
pub struct Ll1Row {
    pub base: String,
    pub cells: Map<char, Vec<Alternative>>,
}

#[derive(Debug, Clone)]
pub struct Ll1Table {
    pub start: String,
    pub columns: Set<char>,
    pub rows: Vec<Ll1Row>,
    pub conflicts: Vec<String>,
}

impl Ll1Table {
    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
            && self
                .rows
                .iter()
                .all(|row| row.cells.values().all(|cell| cell.len() <= 1))
    }

    pub fn cell(&self, base: &str, lookahead: char) -> Option<&[Alternative]> {
        self.rows
            .iter()
            .find(|row| row.base == base)
            .and_then(|row| row.cells.get(&lookahead))
            .map(Vec::as_slice)
    }

    /// The single applicable alternative, or `None` when the cell is empty
    /// or ambiguous.
    fn entry(&self, base: &str, lookahead: char) -> Option<&Alternative> {
        match self.cell(base, lookahead) {
            Some([alternative]) => Some(alternative),
            _ => None,
        }
    }
}

/// Build the predictive table of `grammar` from its FIRST/FOLLOW records.
///
/// A terminal in FIRST of a nonterminal selects the alternative it can
/// begin; when several alternatives can begin with the same terminal the
/// cell is unresolvable and a conflict is recorded instead. An epsilon in
/// FIRST routes the vanishing alternative into every FOLLOW column, which
/// may collide with a FIRST entry; such collisions surface as multi-entry
/// cells.
pub fn build(grammar: &Grammar, table: &FirstFollowTable) -> Ll1Table {
    let mut columns = grammar.terminals();
    columns.shift_remove(&EPSILON);
    columns.insert(END_MARKER);

    let mut rows = vec![];
    let mut conflicts = vec![];
    for production in &grammar.productions {
        let record = match table.record(&production.lhs) {
            Some(record) => record,
            None => continue,
        };
        let mut cells: Map<char, Vec<Alternative>> = Map::default();

        for &lookahead in &record.first {
            if lookahead == EPSILON {
                continue;
            }
            match alternative_for_first(&production.alternatives, lookahead, table) {
                Some(alternative) => {
                    cells.entry(lookahead).or_default().push(alternative.clone());
                }
                None => conflicts.push(format!(
                    "{}: several alternatives can begin with `{}`",
                    production.lhs, lookahead
                )),
            }
        }

        if record.first.contains(&EPSILON) {
            if let Some(vanishing) = production
                .alternatives
                .iter()
                .find(|alternative| vanishes(alternative, table))
            {
                for &lookahead in &record.follow {
                    cells.entry(lookahead).or_default().push(vanishing.clone());
                }
            }
        }

        for (lookahead, cell) in &cells {
            if cell.len() > 1 {
                conflicts.push(format!(
                    "{}: FIRST/FOLLOW collision on `{}`",
                    production.lhs, lookahead
                ));
            }
        }
        rows.push(Ll1Row {
            base: production.lhs.clone(),
            cells,
        });
    }

    Ll1Table {
        start: grammar.start_symbol().to_owned(),
        columns,
        rows,
        conflicts,
    }
}

/// The unique alternative able to begin with `lookahead`, judged by its
/// leading symbol. Two candidates mean the grammar needs factoring first,
/// so the result is deliberately `None` rather than an arbitrary pick.
///
/// A lookahead can sit in FIRST of the left-hand side without sitting in
/// any leading symbol's FIRST: it was contributed through a nullable head.
/// When the direct match fails, the sole nonterminal-headed alternative is
/// taken as the fallback; several such candidates stay unresolvable.
fn alternative_for_first<'a>(
    alternatives: &'a [Alternative],
    lookahead: char,
    table: &FirstFollowTable,
) -> Option<&'a Alternative> {
    let mut found = None;
    for alternative in alternatives {
        let begins = match alternative.first() {
            Some(Symbol::Terminal(ch)) => *ch == lookahead,
            Some(Symbol::Nonterminal(name)) => table
                .record(name)
                .map_or(false, |record| record.first.contains(&lookahead)),
            None => false,
        };
        if begins {
            if found.is_some() {
                return None;
            }
            found = Some(alternative);
        }
    }
    if found.is_none() {
        let mut candidates = alternatives
            .iter()
            .filter(|alt| matches!(alt.first(), Some(Symbol::Nonterminal(..))));
        if let (Some(candidate), None) = (candidates.next(), candidates.next()) {
            found = Some(candidate);
        }
    }
    found
}

fn vanishes(alternative: &Alternative, table: &FirstFollowTable) -> bool {
    alternative.iter().all(|symbol| {
        matches!(symbol, Symbol::Nonterminal(name)
            if table.record(name).map_or(false, |r| r.first.contains(&EPSILON)))
    })
}

/// One line of a predictive derivation trace.
#[derive(Debug, Clone)]
pub struct TraceRow {
    pub stack: String,
    pub rest: String,
    pub action: String,
}

#[derive(Debug, Clone)]
pub struct Trace {
    pub rows: Vec<TraceRow>,
    pub accepted: bool,
}

// cycles through vanishing productions would otherwise spin forever
const TRACE_STEP_LIMIT: usize = 10_000;

impl Ll1Table {
    /// Run the predictive automaton over `sentence`. The stack starts as
    /// end-marker plus start symbol, the input ends with the end-marker,
    /// and every step appends one trace row; the trace ends with `accept`
    /// or `reject`.
    pub fn simulate(&self, sentence: &str) -> Trace {
        let mut stack: Vec<Symbol> = vec![
            Symbol::Terminal(END_MARKER),
            Symbol::nonterminal(self.start.clone()),
        ];
        let input: Vec<char> = sentence.chars().chain([END_MARKER]).collect();
        let mut position = 0;
        let mut rows = vec![];

        for _ in 0..TRACE_STEP_LIMIT {
            let stack_text: String = stack.iter().map(ToString::to_string).collect();
            let rest_text: String = input[position..].iter().collect();
            let lookahead = input[position];

            let top = match stack.pop() {
                Some(top) => top,
                None => break,
            };
            match top {
                Symbol::Terminal(expected) if expected == lookahead => {
                    if expected == END_MARKER {
                        rows.push(TraceRow {
                            stack: stack_text,
                            rest: rest_text,
                            action: "accept".to_owned(),
                        });
                        return Trace { rows, accepted: true };
                    }
                    position += 1;
                    rows.push(TraceRow {
                        stack: stack_text,
                        rest: rest_text,
                        action: format!("match `{}`", expected),
                    });
                }
                Symbol::Terminal(expected) => {
                    rows.push(TraceRow {
                        stack: stack_text,
                        rest: rest_text,
                        action: format!("reject: expected `{}`, saw `{}`", expected, lookahead),
                    });
                    return Trace { rows, accepted: false };
                }
                Symbol::Nonterminal(base) => match self.entry(&base, lookahead) {
                    Some(alternative) => {
                        rows.push(TraceRow {
                            stack: stack_text,
                            rest: rest_text,
                            action: format!(
                                "apply {} → {}",
                                base,
                                display_alternative(alternative)
                            ),
                        });
                        stack.extend(alternative.iter().rev().cloned());
                    }
                    None => {
                        rows.push(TraceRow {
                            stack: stack_text,
                            rest: rest_text,
                            action: format!("reject: no entry for ({}, `{}`)", base, lookahead),
                        });
                        return Trace { rows, accepted: false };
                    }
                },
            }
        }
        Trace { rows, accepted: false }
    }
}

impl fmt::Display for Ll1Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}", "")?;
        for &column in &self.columns {
            write!(f, "  {:<12}", column)?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:>4}", row.base)?;
            for &column in &self.columns {
                match row.cells.get(&column) {
                    Some(cell) => {
                        let rendered = cell
                            .iter()
                            .map(|alt| display_alternative(alt).to_string())
                            .collect::<Vec<_>>()
                            .join("/");
                        write!(f, "  {:<12}", rendered)?;
                    }
                    None => write!(f, "  {:<12}", "-")?,
                }
            }
            writeln!(f)?;
        }
        if !self.conflicts.is_empty() {
            writeln!(f, "not LL(1):")?;
            for conflict in &self.conflicts {
                writeln!(f, "  {}", conflict)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{:<16} {:>12}   {}", row.stack, row.rest, row.action)?;
        }
        writeln!(f, "{}", if self.accepted { "accepted" } else { "rejected" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_follow;
    use crate::normalize::{eliminate_left_recursion, left_factor};

    fn table_for(text: &str) -> Ll1Table {
        let grammar = left_factor(&eliminate_left_recursion(
            &Grammar::parse(text).unwrap(),
        ));
        build(&grammar, &first_follow::compute(&grammar))
    }

    #[test]
    fn arithmetic_grammar_is_ll1() {
        let table = table_for("E → E+T | T\nT → a");
        assert!(table.is_ll1(), "conflicts: {:?}", table.conflicts);
        assert_eq!(table.cell("E", 'a').map(<[_]>::len), Some(1));
        // the epsilon alternative of E' lands in its FOLLOW column
        assert_eq!(table.cell("E'", END_MARKER).map(<[_]>::len), Some(1));
        assert!(table.cell("E", '+').is_none());
    }

    #[test]
    fn trace_accepts_a_sentence() {
        let table = table_for("E → E+T | T\nT → a");
        let trace = table.simulate("a+a");
        assert!(trace.accepted);
        assert_eq!(trace.rows.last().unwrap().action, "accept");
    }

    #[test]
    fn trace_rejects_a_malformed_sentence() {
        let table = table_for("E → E+T | T\nT → a");
        assert!(!table.simulate("a+").accepted);
        assert!(!table.simulate("+a").accepted);
    }

    #[test]
    fn shared_leading_nonterminal_is_not_ll1() {
        // both alternatives of S can begin with `a`, and A is not a common
        // prefix the factoring pass can see through
        let grammar = Grammar::parse("S → Ab | Ac\nA → a").unwrap();
        let table = build(&grammar, &first_follow::compute(&grammar));
        assert!(!table.is_ll1());
        assert!(table.cell("S", 'a').is_none());
    }

    #[test]
    fn nullable_head_resolves_through_the_fallback() {
        // `b` reaches FIRST(S) through the nullable A, so the direct
        // leading-symbol match fails and the sole nonterminal-headed
        // alternative must be taken
        let grammar = Grammar::parse("S → Ab\nA → c | ε").unwrap();
        let table = build(&grammar, &first_follow::compute(&grammar));
        assert!(table.is_ll1(), "conflicts: {:?}", table.conflicts);
        assert_eq!(table.cell("S", 'b').map(<[_]>::len), Some(1));
        assert!(table.simulate("b").accepted);
        assert!(table.simulate("cb").accepted);
        assert!(!table.simulate("c").accepted);
    }

    #[test]
    fn first_follow_collision_is_not_ll1() {
        // FIRST(A) and FOLLOW(A) both contain `b`
        let grammar = Grammar::parse("S → Ab\nA → b | ε").unwrap();
        let table = build(&grammar, &first_follow::compute(&grammar));
        assert!(!table.is_ll1());
        assert_eq!(table.cell("A", 'b').map(<[_]>::len), Some(2));
    }
}

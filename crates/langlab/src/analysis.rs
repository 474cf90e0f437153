//! End-to-end pipelines tying the stages together.

use crate::automaton::{thompson, Nfa, RegexError};
use crate::first_follow::{self, FirstFollowTable};
use crate::grammar::Grammar;
use crate::ll1::{self, Ll1Table};
use crate::lr0::{augment, canonical_collection, CanonicalCollection};
use crate::minimize::minimize;
use crate::normalize::{eliminate_left_recursion, left_factor};
use crate::regex::translate;
use crate::subset::{subset_construction, Dfa};

/// Every stage of the regex pipeline, kept so callers can print any of
/// them.
pub struct RegexAnalysis {
    pub postfix: String,
    pub nfa: Nfa,
    pub dfa: Dfa,
    pub minimized: Dfa,
}

/// Pattern → postfix → NFA → DFA → minimal DFA.
pub fn analyze_regex(pattern: &str) -> Result<RegexAnalysis, RegexError> {
    let postfix = translate(pattern);
    let nfa = thompson(&postfix)?;
    let dfa = subset_construction(&nfa);
    let minimized = minimize(&dfa);
    Ok(RegexAnalysis {
        postfix,
        nfa,
        dfa,
        minimized,
    })
}

pub struct Ll1Analysis {
    /// The grammar after left-recursion elimination and left factoring.
    pub normalized: Grammar,
    pub sets: FirstFollowTable,
    pub table: Ll1Table,
}

/// Normalize a grammar and build its predictive table. The table may
/// carry conflicts; callers decide whether that is fatal.
pub fn analyze_ll1(grammar: &Grammar) -> Ll1Analysis {
    let normalized = left_factor(&eliminate_left_recursion(grammar));
    let sets = first_follow::compute(&normalized);
    let table = ll1::build(&normalized, &sets);
    Ll1Analysis {
        normalized,
        sets,
        table,
    }
}

pub struct Slr1Analysis {
    /// The grammar as written, with the fresh start production.
    pub augmented: Grammar,
    /// FIRST/FOLLOW over the user-written vocabulary only.
    pub sets: FirstFollowTable,
    pub collection: CanonicalCollection,
}

/// Augment a grammar and build its canonical LR(0) collection. LR item
/// sets handle left recursion natively, so the collection is built over
/// the grammar as written; only the FIRST/FOLLOW side data goes through
/// left-recursion elimination, with the alias records filtered out of
/// the report.
pub fn analyze_slr1(grammar: &Grammar) -> Slr1Analysis {
    let sets = first_follow::compute(&eliminate_left_recursion(grammar)).without_aliases();
    let augmented = augment(grammar);
    let collection = canonical_collection(&augmented);
    Slr1Analysis {
        augmented,
        sets,
        collection,
    }
}

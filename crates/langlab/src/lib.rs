//! A workbench for the front-end constructions of a compiler course:
//! regular expressions down to minimal DFAs, and context-free grammars
//! through normalization, FIRST/FOLLOW, LL(1) prediction, and the
//! canonical LR(0) collection used by SLR(1).
//!
//! The single-character symbol conventions of the input formats live in
//! [`symbol`]; [`analysis`] wires the individual stages into the three
//! pipelines the CLI exposes.

pub mod analysis;
pub mod automaton;
pub mod first_follow;
pub mod grammar;
pub mod ll1;
pub mod lr0;
pub mod minimize;
pub mod normalize;
pub mod regex;
pub mod subset;
pub mod symbol;
pub mod types;

mod util;

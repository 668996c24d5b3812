//! Control flow automata over C statement trees.
//!
//! This module provides:
//! - An arena-backed graph ADT ([`Cfa`]) with labeled edges, deferred node
//!   registration and exit tracking
//! - A builder walking `tree-sitter-c` statement trees into graphs whose
//!   nodes are anchored syntax nodes ([`Cfa::from_syntax`])
//!
//! # Design notes
//!
//! - **Registration order is the iteration order**: nodes join the graph at
//!   their first edge, and every downstream pass (probe planning in
//!   particular) depends on that order being stable.
//! - **One node per flow point, not per statement**: a statement can anchor
//!   two nodes (a loop condition re-anchored after an absorbing body end),
//!   and empty blocks anchor nodes of their own.

mod builder;
mod graph;
mod node;

pub use graph::{Cfa, Edge, EdgeLabel, NodeId};
pub use node::Draft;

#[cfg(test)]
mod tests;

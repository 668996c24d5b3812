//! Control-flow instrumentation of C sources for mutation testing.
//!
//! `tattler` builds a control flow automaton from a `tree-sitter-c` parse
//! tree, plants location probes into the source text so a run reports the
//! basic blocks it passed, and maps recorded probe sequences back onto
//! graph paths:
//! - [`cfa`]: the graph ADT and the statement-tree builder
//! - [`instrument`]: probe placement and text patching
//! - [`locate`]: propagating probe ids over the graph after a re-parse
//! - [`trace`]: following and splitting recorded probe sequences
//! - [`draw`]: DOT rendering for inspection
//!
//! # Pipeline
//!
//! The intended round trip is: parse, build a [`Cfa`], instrument with an
//! [`Instrumentor`], hand the patched text to the compiler under test,
//! re-parse it, rebuild the graph, and [`locate::localize`] it so recorded
//! runs can be followed with [`trace::follow`].
//!
//! # Design Principles
//!
//! - **The graph mirrors flow, not syntax**: one node per flow point,
//!   empty blocks included, placeholders spliced out before the graph is
//!   handed over
//! - **Patching is text-only**: edits are byte-offset inserts into the
//!   unpatched source string; the parse tree is never mutated in place
//! - **One automaton per unit**: a translation unit or a single function
//!   body, never across file boundaries

pub mod cfa;
pub mod draw;
pub mod error;
pub mod instrument;
pub mod locate;
pub mod probes;
pub mod syntax;
pub mod trace;

pub use cfa::{Cfa, Draft, Edge, EdgeLabel, NodeId};
pub use error::{BuildError, EditError};
pub use instrument::{Edit, EditKind, Instrumentor};
pub use locate::{localize, LocalizedCfa, LocalizedNode};
pub use probes::{LocationProbeFactory, ProbeDialect, ProbeFactory};

//! Probe dialect, location counter, and probe recognition.
//!
//! Instrumentation splices probe statements of the form `NAME(id);` into
//! the source. The dialect owns the `NAME` part, the counter hands out
//! ids in allocation order, and the matcher recovers ids from already
//! instrumented trees.

use std::fmt;

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::syntax::{self, NodeKind};

const DEFAULT_PROBE_NAME: &str = "TATTLE_LOCATION";

fn default_probe_name() -> String {
    DEFAULT_PROBE_NAME.to_owned()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// Names the probe function spliced into instrumented sources.
pub struct ProbeDialect {
    /// The probe function name, `TATTLE_LOCATION` unless overridden.
    #[serde(default = "default_probe_name")]
    pub name: String,
}

impl Default for ProbeDialect {
    fn default() -> Self {
        Self {
            name: default_probe_name(),
        }
    }
}

impl ProbeDialect {
    /// A dialect with a custom probe function name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }

    /// The prefix that opens every probe statement, `NAME(`.
    #[must_use]
    pub fn marker(&self) -> String {
        format!("{}(", self.name)
    }

    /// Renders one probe statement, `NAME(location);`.
    #[must_use]
    pub fn probe(&self, location: impl fmt::Display) -> String {
        format!("{}({});", self.name, location)
    }

    /// Whether `node` is a probe statement.
    ///
    /// Labeled statements are matched on their trailing statement, so
    /// `L: NAME(0);` counts as a probe.
    #[must_use]
    pub fn is_location_probe(&self, node: Node<'_>, source: &str) -> bool {
        if NodeKind::of(node) == NodeKind::Labeled {
            return syntax::named_children(node)
                .last()
                .is_some_and(|inner| self.is_location_probe(inner, source));
        }
        syntax::text(node, source).starts_with(&self.marker())
    }

    /// The location id carried by a probe statement: the text between
    /// the final `NAME(` and the closing `);`.
    ///
    /// Ids are free-form text; anything between the parentheses survives,
    /// including non-ASCII characters. `None` when `node` is not an
    /// expression statement matching the dialect.
    #[must_use]
    pub fn extract_location<'s>(&self, node: Node<'_>, source: &'s str) -> Option<&'s str> {
        if NodeKind::of(node) == NodeKind::Labeled {
            let inner = syntax::named_children(node).last()?;
            return self.extract_location(inner, source);
        }
        if NodeKind::of(node) != NodeKind::Expression {
            return None;
        }
        if !self.is_location_probe(node, source) {
            return None;
        }
        let text = syntax::text(node, source);
        let marker = self.marker();
        let at = text.rfind(&marker)?;
        let suffix = &text[at + marker.len()..];
        // Trim the closing ");" char-wise so multi-byte ids survive.
        let mut chars = suffix.chars();
        chars.next_back()?;
        chars.next_back()?;
        Some(chars.as_str())
    }
}

/// Hands out location ids in allocation order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProbeCounter {
    current: u64,
}

impl ProbeCounter {
    /// A counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current id; advances the counter.
    pub fn next(&mut self) -> u64 {
        let location = self.current;
        self.current += 1;
        location
    }

    /// Rewinds the counter to zero.
    pub fn reset(&mut self) {
        self.current = 0;
    }
}

/// Renders the probe statements the planner splices in.
///
/// The instrumentation plan only decides *where* probes go; what a probe
/// looks like is the factory's business, so tests can swap in constant
/// probes without touching the planner.
pub trait ProbeFactory {
    /// The next location probe statement.
    fn location_probe(&mut self) -> String;
}

/// The standard factory: numbered probes in a dialect, counted from zero.
#[derive(Debug, Default, Clone)]
pub struct LocationProbeFactory {
    dialect: ProbeDialect,
    counter: ProbeCounter,
}

impl LocationProbeFactory {
    /// A factory rendering probes in `dialect`, counting from zero.
    #[must_use]
    pub fn new(dialect: ProbeDialect) -> Self {
        Self {
            dialect,
            counter: ProbeCounter::new(),
        }
    }

    /// The dialect this factory renders.
    #[must_use]
    pub fn dialect(&self) -> &ProbeDialect {
        &self.dialect
    }

    /// Rewinds the location counter to zero.
    pub fn reset(&mut self) {
        self.counter.reset();
    }
}

impl ProbeFactory for LocationProbeFactory {
    fn location_probe(&mut self) -> String {
        let location = self.counter.next();
        self.dialect.probe(location)
    }
}

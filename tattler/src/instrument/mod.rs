//! Probe instrumentation: site discovery, edit planning, and patching.
//!
//! The pipeline runs in three steps. [`discover`] maps a flow graph to
//! the statements that need probes. [`Instrumentor::plan`] turns each
//! site into text edits, rendering probe statements through a
//! [`ProbeFactory`]. [`apply`] splices the edits into the source in one
//! pass; the caller re-parses the patched source once and rebuilds the
//! graph from the new tree.

mod edits;
mod sites;

pub use edits::{apply, Edit, EditKind};
pub use sites::discover;

use tree_sitter::Node;

use crate::cfa::Cfa;
use crate::error::EditError;
use crate::probes::{LocationProbeFactory, ProbeDialect, ProbeFactory};
use crate::syntax::{self, NodeKind};

/// Plans and applies probe edits for a flow graph.
///
/// The factory is stateful (it numbers probes), so planning twice with
/// the same instrumentor continues the numbering of the first plan.
#[derive(Debug)]
pub struct Instrumentor<F> {
    factory: F,
}

impl Instrumentor<LocationProbeFactory> {
    /// An instrumentor rendering numbered probes in `dialect`.
    #[must_use]
    pub fn with_dialect(dialect: ProbeDialect) -> Self {
        Self::new(LocationProbeFactory::new(dialect))
    }
}

impl<F: ProbeFactory> Instrumentor<F> {
    /// An instrumentor rendering probes through `factory`.
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Patches `source` with probes for every site of `cfa`.
    ///
    /// # Errors
    ///
    /// Fails when the planned edits do not fit `source`, see [`apply`].
    pub fn instrument(&mut self, source: &str, cfa: &Cfa<Node<'_>>) -> Result<String, EditError> {
        let plan = self.plan(cfa);
        apply(&plan, source)
    }

    /// The edits instrumenting every site of `cfa`, in planning order.
    pub fn plan(&mut self, cfa: &Cfa<Node<'_>>) -> Vec<Edit> {
        let mut plan = Vec::new();
        for site in discover(cfa) {
            match NodeKind::of(site) {
                NodeKind::If => self.if_edits(site, &mut plan),
                NodeKind::While => self.while_edits(site, &mut plan),
                NodeKind::Do => self.do_edits(site, &mut plan),
                NodeKind::For => self.for_edits(site, &mut plan),
                NodeKind::Switch => self.switch_edits(site, &mut plan),
                NodeKind::Labeled => self.labeled_edits(site, &mut plan),
                NodeKind::Goto => self.goto_edits(site, &mut plan),
                NodeKind::FunctionDefinition => self.function_edits(site, &mut plan),
                NodeKind::TranslationUnit => self.unit_edits(site, &mut plan),
                // Plain statements are covered by the probes of their
                // surrounding flow, they carry none of their own.
                _ => {}
            }
        }
        plan
    }

    /// An `if` closes first: the probe after the whole statement (or after
    /// the terminal else block) is allocated before the probes opening the
    /// arms. An `else if` arm is left to the inner statement's own site.
    fn if_edits(&mut self, statement: Node<'_>, plan: &mut Vec<Edit>) {
        let Some(consequence) = syntax::consequence(statement) else {
            return;
        };
        let alternative = syntax::else_body(statement);
        let else_if = syntax::has_else_if(statement);

        let mut consequence_close = String::new();
        let mut alternative_close = String::new();
        if alternative.is_none() {
            consequence_close = self.factory.location_probe();
        } else if !else_if {
            alternative_close = self.factory.location_probe();
        }

        let open = self.factory.location_probe();
        body_edits(consequence, &open, &consequence_close, plan);

        if let Some(alternative) = alternative {
            if !else_if {
                let open = self.factory.location_probe();
                body_edits(alternative, &open, &alternative_close, plan);
            }
        }
    }

    fn while_edits(&mut self, statement: Node<'_>, plan: &mut Vec<Edit>) {
        let Some(body) = syntax::body(statement) else {
            return;
        };
        let open = self.factory.location_probe();
        let close = self.factory.location_probe();
        body_edits(body, &open, &close, plan);
    }

    /// The body closes after the whole `do ... while(...);`, past the
    /// condition, so a trace leaves the loop through that probe.
    fn do_edits(&mut self, statement: Node<'_>, plan: &mut Vec<Edit>) {
        let Some(body) = syntax::body(statement) else {
            return;
        };
        let open = self.factory.location_probe();
        body_edits(body, &open, "", plan);
        let close = self.factory.location_probe();
        plan.extend(Edit::append(statement, close));
    }

    fn for_edits(&mut self, statement: Node<'_>, plan: &mut Vec<Edit>) {
        let Some(body) = syntax::for_body(statement) else {
            return;
        };
        let open = self.factory.location_probe();
        let close = self.factory.location_probe();
        body_edits(body, &open, &close, plan);
    }

    /// Every case arm gets a probe right after its colon; one more probe
    /// lands after the whole switch.
    fn switch_edits(&mut self, statement: Node<'_>, plan: &mut Vec<Edit>) {
        let Some(body) = syntax::body(statement) else {
            return;
        };
        for case in syntax::named_children(body) {
            if NodeKind::of(case) != NodeKind::Case {
                continue;
            }
            // The colon is the child after `default`, or after `case` and
            // its value expression.
            let colon = if syntax::is_default_case(case) {
                case.child(1)
            } else {
                case.child(2)
            };
            if let Some(colon) = colon {
                let probe = self.factory.location_probe();
                plan.extend(Edit::append(colon, probe));
            }
        }
        let close = self.factory.location_probe();
        plan.extend(Edit::append(statement, close));
    }

    fn labeled_edits(&mut self, statement: Node<'_>, plan: &mut Vec<Edit>) {
        if let Some(colon) = statement.child(1) {
            let probe = self.factory.location_probe();
            plan.extend(Edit::append(colon, probe));
        }
    }

    fn goto_edits(&mut self, statement: Node<'_>, plan: &mut Vec<Edit>) {
        let probe = self.factory.location_probe();
        plan.extend(Edit::insert(statement, probe));
    }

    fn function_edits(&mut self, definition: Node<'_>, plan: &mut Vec<Edit>) {
        let Some(body) = syntax::body(definition) else {
            return;
        };
        if let Some(brace) = body.child(0) {
            let probe = self.factory.location_probe();
            plan.extend(Edit::append(brace, probe));
        }
    }

    /// The prologue probe for the whole file sits ahead of its first
    /// statement rather than at byte zero.
    fn unit_edits(&mut self, unit: Node<'_>, plan: &mut Vec<Edit>) {
        let Some(lead) = syntax::named_children(unit).next() else {
            return;
        };
        let probe = self.factory.location_probe();
        plan.extend(Edit::insert(lead, probe));
    }
}

/// Probes a statement body: `open` lands just inside the block, `close`
/// right after it. A non-compound body is braced on the way, `{open`
/// before and `}close` after, so the probe cannot detach the statement
/// from its owner.
fn body_edits(body: Node<'_>, open: &str, close: &str, plan: &mut Vec<Edit>) {
    if NodeKind::of(body) == NodeKind::Compound {
        if let Some(brace) = body.child(0) {
            plan.extend(Edit::append(brace, open));
        }
        plan.extend(Edit::append(body, close));
    } else {
        plan.extend(Edit::insert(body, format!("{{{open}")));
        plan.extend(Edit::append(body, format!("}}{close}")));
    }
}

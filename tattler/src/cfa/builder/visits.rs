//! Per-construct walk rules.
//!
//! Every handler returns the node its construct's flow ends on, which is
//! also where the cursor rests afterwards, except a switch without cases
//! (the result stays unregistered and the cursor remains on the
//! condition). Unhandled kinds (comments, preprocessor directives) yield
//! `None` and leave the cursor alone.

use tree_sitter::Node;

use super::{CfaBuilder, Frame};
use crate::cfa::{EdgeLabel, NodeId};
use crate::error::BuildError;
use crate::syntax::{self, NodeKind};

fn missing(kind: &'static str, field: &'static str) -> BuildError {
    BuildError::Structural { kind, field }
}

impl<'tree> CfaBuilder<'tree, '_> {
    pub(super) fn accept(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        match NodeKind::of(node) {
            NodeKind::TranslationUnit => self.visit_unit(node),
            NodeKind::FunctionDefinition => self.visit_function(node),
            NodeKind::Compound => self.visit_compound(node),
            NodeKind::Expression | NodeKind::Declaration => Ok(Some(self.visit_plain(node))),
            NodeKind::If => self.visit_if(node),
            NodeKind::While => self.visit_while(node),
            NodeKind::Do => self.visit_do(node),
            NodeKind::For => self.visit_for(node),
            NodeKind::Switch => self.visit_switch(node),
            NodeKind::Break => Ok(Some(self.visit_break(node))),
            NodeKind::Continue => Ok(Some(self.visit_continue(node))),
            NodeKind::Return => Ok(Some(self.visit_return(node))),
            NodeKind::Labeled => self.visit_labeled(node),
            NodeKind::Goto => self.visit_goto(node),
            NodeKind::Case
            | NodeKind::ElseClause
            | NodeKind::Comment
            | NodeKind::Other => Ok(None),
        }
    }

    fn accept_children(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        let mut last = None;
        for child in syntax::named_children(node) {
            last = self.accept(child)?;
        }
        Ok(last)
    }

    fn accept_named_siblings(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        let mut last = None;
        let mut sibling = node.next_named_sibling();
        while let Some(next) = sibling {
            last = self.accept(next)?;
            sibling = next.next_named_sibling();
        }
        Ok(last)
    }

    fn visit_unit(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        self.accept_children(node)
    }

    fn visit_function(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        let body = syntax::body(node).ok_or_else(|| missing("function_definition", "body"))?;
        self.accept(body)
    }

    fn visit_compound(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        // An empty block still carries a node of its own.
        if node.named_child_count() == 0 {
            return Ok(Some(self.visit_plain(node)));
        }
        self.accept_children(node)
    }

    fn visit_plain(&mut self, node: Node<'tree>) -> NodeId {
        let id = self.anchored(node);
        self.advance(id)
    }

    fn visit_if(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        // Arm entries and the join start as placeholders: either arm, and
        // the flow after the statement, may hold no statements at all.
        let condition =
            syntax::condition(node).ok_or_else(|| missing("if_statement", "condition"))?;
        let condition_id = self.anchored(condition);
        let p = self.advance(condition_id);
        let s = self.pending();

        if let Some(consequence) = syntax::consequence(node) {
            let j = self.pending();
            self.branch_to(p, j, Some(EdgeLabel::True));
            let c = self.accept(consequence)?;
            if self.is_pending(j) {
                self.cfa.remove(j);
                self.branch_to(p, s, Some(EdgeLabel::True));
            } else {
                let end = c.unwrap_or(self.current);
                self.branch_to(end, s, None);
            }
            if let Some(c) = c {
                if self.is_pending(c) {
                    self.cfa.remove(c);
                }
            }
        }

        match syntax::else_body(node) {
            Some(alternative) => {
                let i = self.pending();
                self.branch_to(p, i, Some(EdgeLabel::False));
                let a = self.accept(alternative)?;
                if self.is_pending(i) {
                    self.cfa.remove(i);
                    self.branch_to(p, s, Some(EdgeLabel::False));
                } else {
                    let end = a.unwrap_or(self.current);
                    self.branch_to(end, s, None);
                }
                if let Some(a) = a {
                    if self.is_pending(a) {
                        self.cfa.remove(a);
                    }
                }
            }
            None => {
                self.branch_to(p, s, Some(EdgeLabel::False));
            }
        }
        Ok(Some(self.advance(s)))
    }

    fn visit_while(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        let condition =
            syntax::condition(node).ok_or_else(|| missing("while_statement", "condition"))?;
        let body = syntax::body(node).ok_or_else(|| missing("while_statement", "body"))?;
        let condition_id = self.anchored(condition);
        let p = self.advance(condition_id);
        let s = self.pending();

        self.frames.push(Frame {
            continue_target: Some(p),
            break_target: s,
        });
        let j = self.pending();
        self.branch_to(p, j, Some(EdgeLabel::True));
        self.accept(body)?;
        self.advance(p);
        self.frames.pop();

        Ok(Some(self.branch_to(p, s, Some(EdgeLabel::False))))
    }

    fn visit_do(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        let body = syntax::body(node).ok_or_else(|| missing("do_statement", "body"))?;
        let condition =
            syntax::condition(node).ok_or_else(|| missing("do_statement", "condition"))?;
        let entry = self.pending();
        let i = self.advance(entry);
        let c = self.anchored(condition);
        let s = self.pending();

        self.frames.push(Frame {
            continue_target: Some(c),
            break_target: s,
        });
        self.accept(body)?;
        self.frames.pop();

        // A pending body end absorbs the condition anchor here; `c` then
        // registers separately at the branch below, as a second
        // condition-anchored node.
        self.advance(c);
        self.branch_to(c, i, Some(EdgeLabel::True));
        Ok(Some(self.branch_to(c, s, Some(EdgeLabel::False))))
    }

    fn visit_for(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        let exit = self.pending();
        let body = syntax::for_body(node).ok_or_else(|| missing("for_statement", "body"))?;

        if let Some(initializer) = syntax::for_initializer(node) {
            let init = self.anchored(initializer);
            self.advance(init);
        }

        // Four wirings by presence of condition and update. Without a
        // condition the loop is unconditional and the exit is reachable
        // only through break edges.
        match (syntax::for_condition(node), syntax::for_update(node)) {
            (Some(condition), Some(update)) => {
                let c = self.anchored(condition);
                let p = self.advance(c);
                let u = self.anchored(update);
                let j = self.pending();
                self.branch_to(p, j, Some(EdgeLabel::True));

                self.frames.push(Frame {
                    continue_target: Some(u),
                    break_target: exit,
                });
                self.accept(body)?;
                self.frames.pop();

                let end = self.advance(u);
                self.branch_to(end, c, None);
                Ok(Some(self.branch_to(c, exit, Some(EdgeLabel::False))))
            }
            (Some(condition), None) => {
                let c = self.anchored(condition);
                let p = self.advance(c);
                let j = self.pending();
                self.branch_to(p, j, Some(EdgeLabel::True));

                self.frames.push(Frame {
                    continue_target: Some(j),
                    break_target: exit,
                });
                let l = self.accept(body)?.unwrap_or(self.current);
                self.frames.pop();

                self.branch_to(l, j, None);
                if self.is_pending(l) {
                    self.cfa.remove(l);
                }
                Ok(Some(self.branch_to(c, exit, Some(EdgeLabel::False))))
            }
            (None, None) => {
                let head = self.pending();
                let j = self.advance(head);

                self.frames.push(Frame {
                    continue_target: Some(j),
                    break_target: exit,
                });
                let l = self.accept(body)?.unwrap_or(self.current);
                self.frames.pop();

                let q = self.branch_to(l, j, None);
                if self.is_pending(l) {
                    self.cfa.remove(l);
                }
                Ok(Some(self.branch_to(q, exit, None)))
            }
            (None, Some(update)) => {
                let u = self.anchored(update);
                let head = self.pending();
                let j = self.advance(head);

                self.frames.push(Frame {
                    continue_target: Some(j),
                    break_target: exit,
                });
                self.accept(body)?;
                self.frames.pop();

                let end = self.advance(u);
                Ok(Some(self.branch_to(end, j, None)))
            }
        }
    }

    fn visit_switch(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        // Fallthrough chains each case's end to the next case's entry;
        // every case end additionally reaches the exit placeholder.
        let condition =
            syntax::condition(node).ok_or_else(|| missing("switch_statement", "condition"))?;
        let body = syntax::body(node).ok_or_else(|| missing("switch_statement", "body"))?;
        let condition_id = self.anchored(condition);
        let p = self.advance(condition_id);
        let s = self.pending();

        self.frames.push(Frame {
            continue_target: None,
            break_target: s,
        });

        let mut cases: Vec<(NodeId, NodeId)> = Vec::new();
        for case_stmt in syntax::named_children(body) {
            if NodeKind::of(case_stmt) != NodeKind::Case {
                continue;
            }
            let empty = syntax::is_empty_case(case_stmt);
            let (entry, end) = match syntax::case_value(case_stmt) {
                Some(value) if empty => {
                    let v = self.anchored(value);
                    self.branch_to(p, v, Some(EdgeLabel::Case));
                    (v, v)
                }
                Some(value) => {
                    let v = self.anchored(value);
                    self.branch_to(p, v, Some(EdgeLabel::Case));
                    // The case body may be a bare statement sequence, so
                    // every named sibling of the value is visited.
                    let end = self.accept_named_siblings(value)?.unwrap_or(self.current);
                    (v, end)
                }
                None if empty => {
                    let v = self.anchored(case_stmt);
                    self.branch_to(p, v, Some(EdgeLabel::Default));
                    (v, v)
                }
                None => {
                    let v = self.pending();
                    self.branch_to(p, v, Some(EdgeLabel::Default));
                    let end = self.accept_children(case_stmt)?.unwrap_or(self.current);
                    (v, end)
                }
            };
            cases.push((entry, end));
        }

        for idx in 0..cases.len().saturating_sub(1) {
            let previous_end = cases[idx].1;
            let next_entry = cases[idx + 1].0;
            self.branch_to(previous_end, next_entry, None);
        }
        for &(_, end) in &cases {
            self.branch_to(end, s, None);
        }

        self.frames.pop();
        Ok(Some(s))
    }

    fn visit_break(&mut self, node: Node<'tree>) -> NodeId {
        let break_stmt = self.anchored(node);
        let saved = self.current;
        self.wire_break(break_stmt);
        self.current = saved;
        self.advance(break_stmt)
    }

    fn visit_continue(&mut self, node: Node<'tree>) -> NodeId {
        let continue_stmt = self.anchored(node);
        let saved = self.current;
        self.wire_continue(continue_stmt);
        self.current = saved;
        self.advance(continue_stmt)
    }

    fn visit_return(&mut self, node: Node<'tree>) -> NodeId {
        let return_id = self.anchored(node);
        let return_stmt = self.advance(return_id);
        self.cfa.add_final(return_stmt, None);
        return_stmt
    }

    fn visit_labeled(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        // The whole labeled statement is one atomic flow node; its body is
        // not walked separately.
        let label = syntax::label(node).ok_or_else(|| missing("labeled_statement", "label"))?;
        let stmt_id = self.anchored(node);
        let label_stmt = self.advance(stmt_id);
        let name = self.text(label).to_owned();
        self.note_label(&name, label_stmt);
        Ok(Some(label_stmt))
    }

    fn visit_goto(&mut self, node: Node<'tree>) -> Result<Option<NodeId>, BuildError> {
        let label = syntax::label(node).ok_or_else(|| missing("goto_statement", "label"))?;
        let goto_stmt = self.anchored(node);
        let name = self.text(label).to_owned();
        self.note_goto(&name, goto_stmt);
        // The cursor rests on the goto; a following statement is still
        // wired after it even though real flow never falls through.
        Ok(Some(self.advance(goto_stmt)))
    }
}

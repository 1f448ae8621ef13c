//! Working stacks shared by the assemblers.
//!
//! Every pop goes through a helper here so an empty stack always turns
//! into a `BuildError::Structural` carrying the caller's location.

use std::collections::VecDeque;

use crate::ast::Expr;
use crate::error::BuildError;
use crate::location::NodeLocation;
use crate::model::Annotation;
use crate::symbol::SymbolName;
use crate::types::Type;

use super::frames::{AnnotationFrame, BlockFrame, IfElseFrame};

#[derive(Debug, Default)]
pub(crate) struct BuildContext {
    pub(crate) exprs: Vec<Expr>,
    pub(crate) expr_lists: Vec<Vec<Expr>>,
    pub(crate) key_values: Vec<Expr>,
    pub(crate) key_value_lists: Vec<Vec<Expr>>,
    pub(crate) annotations: Vec<AnnotationFrame>,
    pub(crate) annotation_lists: Vec<Vec<Annotation>>,
    pub(crate) blocks: Vec<BlockFrame>,
    pub(crate) if_elses: Vec<IfElseFrame>,
    pub(crate) types: VecDeque<Type>,
    pub(crate) package_names: Vec<String>,
    pub(crate) symbol_names: Vec<SymbolName>,
}

fn pop<T>(stack: &mut Vec<T>, what: &str, at: &NodeLocation) -> Result<T, BuildError> {
    stack
        .pop()
        .ok_or_else(|| BuildError::structural(format!("{what} stack is empty"), Some(at)))
}

fn top<'a, T>(stack: &'a mut [T], what: &str, at: &NodeLocation) -> Result<&'a mut T, BuildError> {
    stack
        .last_mut()
        .ok_or_else(|| BuildError::structural(format!("no open {what}"), Some(at)))
}

/// Moves the `n` most recent items of `stack` into `into`, earliest first.
///
/// The item pushed first (leftmost in source) is appended first. The
/// caller has already checked that `n` items are available.
fn pop_in_source_order<T>(stack: &mut Vec<T>, into: &mut Vec<T>, n: usize) {
    let start = stack.len().saturating_sub(n);
    into.extend(stack.drain(start..));
}

impl BuildContext {
    pub(crate) fn pop_expr(&mut self, at: &NodeLocation) -> Result<Expr, BuildError> {
        pop(&mut self.exprs, "expression", at)
    }

    pub(crate) fn pop_expr_list(&mut self, at: &NodeLocation) -> Result<Vec<Expr>, BuildError> {
        pop(&mut self.expr_lists, "expression list", at)
    }

    pub(crate) fn pop_key_value_list(
        &mut self,
        at: &NodeLocation,
    ) -> Result<Vec<Expr>, BuildError> {
        pop(&mut self.key_value_lists, "key-value list", at)
    }

    pub(crate) fn pop_annotation(&mut self, at: &NodeLocation) -> Result<AnnotationFrame, BuildError> {
        pop(&mut self.annotations, "annotation", at)
    }

    pub(crate) fn top_annotation(
        &mut self,
        at: &NodeLocation,
    ) -> Result<&mut AnnotationFrame, BuildError> {
        top(&mut self.annotations, "annotation", at)
    }

    pub(crate) fn pop_annotation_list(
        &mut self,
        at: &NodeLocation,
    ) -> Result<Vec<Annotation>, BuildError> {
        pop(&mut self.annotation_lists, "annotation list", at)
    }

    pub(crate) fn top_annotation_list(
        &mut self,
        at: &NodeLocation,
    ) -> Result<&mut Vec<Annotation>, BuildError> {
        top(&mut self.annotation_lists, "annotation list", at)
    }

    pub(crate) fn pop_block(&mut self, at: &NodeLocation) -> Result<BlockFrame, BuildError> {
        pop(&mut self.blocks, "block", at)
    }

    pub(crate) fn top_block(&mut self, at: &NodeLocation) -> Result<&mut BlockFrame, BuildError> {
        top(&mut self.blocks, "block", at)
    }

    pub(crate) fn pop_if_else(&mut self, at: &NodeLocation) -> Result<IfElseFrame, BuildError> {
        pop(&mut self.if_elses, "if/else", at)
    }

    pub(crate) fn top_if_else(&mut self, at: &NodeLocation) -> Result<&mut IfElseFrame, BuildError> {
        top(&mut self.if_elses, "if/else", at)
    }

    pub(crate) fn pop_package_name(&mut self, at: &NodeLocation) -> Result<String, BuildError> {
        pop(&mut self.package_names, "package name", at)
    }

    pub(crate) fn pop_symbol_name(&mut self, at: &NodeLocation) -> Result<SymbolName, BuildError> {
        pop(&mut self.symbol_names, "symbol name", at)
    }

    /// Takes the oldest queued type; types are consumed in declaration order.
    pub(crate) fn take_type(&mut self, at: &NodeLocation) -> Result<Type, BuildError> {
        self.types
            .pop_front()
            .ok_or_else(|| BuildError::structural("type queue is empty", Some(at)))
    }

    /// Takes the most recently queued type, the one named by the
    /// innermost construct still being built.
    pub(crate) fn take_last_type(&mut self, at: &NodeLocation) -> Result<Type, BuildError> {
        self.types
            .pop_back()
            .ok_or_else(|| BuildError::structural("type queue is empty", Some(at)))
    }

    /// Closes the last `count` expressions into the open expression list.
    pub(crate) fn end_expr_list(&mut self, count: usize, at: &NodeLocation) -> Result<(), BuildError> {
        if self.expr_lists.is_empty() {
            return Err(BuildError::structural("no open expression list", Some(at)));
        }
        check_depth(self.exprs.len(), count, "expression", at)?;
        let mut items = Vec::with_capacity(count);
        pop_in_source_order(&mut self.exprs, &mut items, count);
        top(&mut self.expr_lists, "expression list", at)?.extend(items);
        Ok(())
    }

    /// Closes the last `count` key-value pairs into the open key-value list.
    pub(crate) fn end_key_value_list(
        &mut self,
        count: usize,
        at: &NodeLocation,
    ) -> Result<(), BuildError> {
        if self.key_value_lists.is_empty() {
            return Err(BuildError::structural("no open key-value list", Some(at)));
        }
        check_depth(self.key_values.len(), count, "key-value", at)?;
        let mut items = Vec::with_capacity(count);
        pop_in_source_order(&mut self.key_values, &mut items, count);
        top(&mut self.key_value_lists, "key-value list", at)?.extend(items);
        Ok(())
    }

    /// Describes every non-empty stack, or `None` when all are balanced.
    pub(crate) fn leftovers(&self) -> Option<String> {
        let counts = [
            ("expression", self.exprs.len()),
            ("expression list", self.expr_lists.len()),
            ("key-value", self.key_values.len()),
            ("key-value list", self.key_value_lists.len()),
            ("annotation", self.annotations.len()),
            ("annotation list", self.annotation_lists.len()),
            ("block", self.blocks.len()),
            ("if/else", self.if_elses.len()),
            ("type", self.types.len()),
            ("package name", self.package_names.len()),
            ("symbol name", self.symbol_names.len()),
        ];
        let pending: Vec<String> = counts
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(what, n)| format!("{n} {what}"))
            .collect();
        if pending.is_empty() {
            None
        } else {
            Some(pending.join(", "))
        }
    }
}

fn check_depth(available: usize, count: usize, what: &str, at: &NodeLocation) -> Result<(), BuildError> {
    if count > available {
        return Err(BuildError::structural(
            format!("list of {count} {what}(s) requested but only {available} available"),
            Some(at),
        ));
    }
    Ok(())
}

use crate::ast::{Stmt, StmtKind};
use crate::error::BuildError;
use crate::location::NodeLocation;

use super::ModelBuilder;
use super::frames::{BlockFrame, IfElseFrame};

impl ModelBuilder {
    // -----------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------

    /// Opens a nested `{ ... }` block inside the current block.
    pub(crate) fn start_block(&mut self, location: &NodeLocation) {
        self.ctx.blocks.push(BlockFrame::new(location.clone()));
    }

    pub(crate) fn end_block(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let block = self.ctx.pop_block(location)?.finish();
        self.add_statement(StmtKind::Block(block), location)
    }

    /// Appends a statement to the innermost open block.
    pub(crate) fn add_statement(&mut self, kind: StmtKind, location: &NodeLocation) -> Result<(), BuildError> {
        let stmt = Stmt {
            kind,
            location: location.clone(),
        };
        self.ctx.top_block(location)?.push(stmt);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Simple statements
    // -----------------------------------------------------------------

    /// `a, b = expr;` The target list was pushed before the value.
    pub(crate) fn create_assignment_stmt(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let value = self.ctx.pop_expr(location)?;
        let targets = self.ctx.pop_expr_list(location)?;
        self.add_statement(StmtKind::Assign { targets, value }, location)
    }

    pub(crate) fn create_return_stmt(
        &mut self,
        values_available: bool,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        let values = if values_available {
            self.ctx.pop_expr_list(location)?
        } else {
            Vec::new()
        };
        self.add_statement(StmtKind::Return(values), location)
    }

    pub(crate) fn create_reply_stmt(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let value = self.ctx.pop_expr(location)?;
        self.add_statement(StmtKind::Reply(value), location)
    }

    pub(crate) fn create_function_invocation_stmt(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let invocation = self.pop_invocation(location)?;
        self.add_statement(StmtKind::FunctionInvocation(invocation), location)
    }

    pub(crate) fn create_action_invocation_stmt(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let invocation = self.pop_invocation(location)?;
        self.add_statement(StmtKind::ActionInvocation(invocation), location)
    }

    // -----------------------------------------------------------------
    // Loops
    // -----------------------------------------------------------------

    pub(crate) fn start_while_stmt(&mut self, location: &NodeLocation) {
        self.ctx.blocks.push(BlockFrame::new(location.clone()));
    }

    /// The loop condition is the expression on top of the stack.
    pub(crate) fn end_while_stmt(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let condition = self.ctx.pop_expr(location)?;
        let body = self.ctx.pop_block(location)?.finish();
        self.add_statement(StmtKind::While { condition, body }, location)
    }

    // -----------------------------------------------------------------
    // if / else if / else
    // -----------------------------------------------------------------

    /// Opens the chain and the block of its primary `then` branch.
    pub(crate) fn start_if_else_stmt(&mut self, location: &NodeLocation) {
        self.ctx.if_elses.push(IfElseFrame::new(location.clone()));
        self.ctx.blocks.push(BlockFrame::new(location.clone()));
    }

    pub(crate) fn start_else_if_clause(&mut self, location: &NodeLocation) {
        self.ctx.blocks.push(BlockFrame::new(location.clone()));
    }

    /// Closes an `else if` clause, pairing its block with the condition
    /// completed most recently.
    pub(crate) fn end_else_if_clause(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        self.ctx.top_if_else(location)?;
        let body = self.ctx.pop_block(location)?.finish();
        let condition = self.ctx.pop_expr(location)?;
        self.ctx.top_if_else(location)?.add_else_if(condition, body);
        Ok(())
    }

    pub(crate) fn start_else_clause(&mut self, location: &NodeLocation) {
        self.ctx.blocks.push(BlockFrame::new(location.clone()));
    }

    pub(crate) fn end_else_clause(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        self.ctx.top_if_else(location)?;
        let body = self.ctx.pop_block(location)?.finish();
        self.ctx.top_if_else(location)?.set_else(body)
    }

    /// Finishes the chain: the primary condition was pushed before any
    /// `else if` condition, so it is the one left on the stack.
    pub(crate) fn end_if_else_stmt(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let frame = self.ctx.pop_if_else(location)?;
        let condition = self.ctx.pop_expr(location)?;
        let then_body = self.ctx.pop_block(location)?.finish();
        let chain_location = frame.location().clone();
        let chain = frame.finish(condition, then_body);
        self.add_statement(StmtKind::IfElse(chain), &chain_location)
    }
}

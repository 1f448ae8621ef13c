use tracing::{debug, warn};

use crate::ast::{BinaryOp, Expr, ExprKind, FieldAccess, Invocation, UnaryOp};
use crate::error::BuildError;
use crate::literal::{self, LiteralKind};
use crate::location::NodeLocation;
use crate::symbol::SymbolName;
use crate::types::Type;

use super::ModelBuilder;

impl ModelBuilder {
    // -----------------------------------------------------------------
    // Expression lists
    // -----------------------------------------------------------------

    pub(crate) fn start_expr_list(&mut self, _location: &NodeLocation) {
        self.ctx.expr_lists.push(Vec::new());
    }

    /// Moves the last `count` expressions into the open list, keeping
    /// their source order.
    pub(crate) fn end_expr_list(&mut self, count: usize, location: &NodeLocation) -> Result<(), BuildError> {
        self.ctx.end_expr_list(count, location)
    }

    /// Left-hand side of an assignment; same mechanics as an expression list.
    pub(crate) fn start_var_ref_list(&mut self, location: &NodeLocation) {
        self.start_expr_list(location);
    }

    pub(crate) fn end_var_ref_list(&mut self, count: usize, location: &NodeLocation) -> Result<(), BuildError> {
        self.ctx.end_expr_list(count, location)
    }

    // -----------------------------------------------------------------
    // Literals and references
    // -----------------------------------------------------------------

    pub(crate) fn create_literal(
        &mut self,
        kind: LiteralKind,
        text: &str,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        let value = literal::parse_literal(kind, text, location)?;
        let ty = value.ty();
        self.push_expr(ExprKind::Literal(value), Some(ty), location);
        Ok(())
    }

    pub(crate) fn create_var_ref(&mut self, name: &str, location: &NodeLocation) {
        self.push_expr(ExprKind::VariableRef(SymbolName::new(name)), None, location);
    }

    /// `name[index]`; the index expression is on top of the stack.
    pub(crate) fn create_map_array_var_ref(
        &mut self,
        name: &str,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        let index = self.ctx.pop_expr(location)?;
        let symbol = SymbolName::new(name);
        let base = Expr::new(ExprKind::VariableRef(symbol.clone()), None, location.clone());
        self.push_expr(
            ExprKind::ArrayMapAccess {
                name: symbol,
                base: Box::new(base),
                index: Box::new(index),
            },
            None,
            location,
        );
        Ok(())
    }

    /// Links the two topmost reference expressions as `parent.field`.
    ///
    /// With fewer than two expressions available this does nothing.
    pub(crate) fn create_struct_field_ref(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        if self.ctx.exprs.len() < 2 {
            debug!(%location, "struct field access with fewer than two operands ignored");
            return Ok(());
        }
        let field = self.ctx.pop_expr(location)?;
        let field = if matches!(field.kind, ExprKind::StructFieldAccess(_)) {
            field
        } else {
            field_access(field, None, location)?
        };
        let parent = self.ctx.pop_expr(location)?;
        let parent = field_access(parent, Some(field), location)?;
        self.ctx.exprs.push(parent);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Operators
    // -----------------------------------------------------------------

    pub(crate) fn create_binary_expr(&mut self, op: &str, location: &NodeLocation) -> Result<(), BuildError> {
        // The right operand completed last, so it sits on top.
        let rhs = self.ctx.pop_expr(location)?;
        let lhs = self.ctx.pop_expr(location)?;
        let op = BinaryOp::from_symbol(op).ok_or_else(|| unsupported_operator(op, location))?;
        self.push_expr(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            None,
            location,
        );
        Ok(())
    }

    pub(crate) fn create_unary_expr(&mut self, op: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let operand = self.ctx.pop_expr(location)?;
        let op = UnaryOp::from_symbol(op).ok_or_else(|| unsupported_operator(op, location))?;
        self.push_expr(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            None,
            location,
        );
        Ok(())
    }

    pub(crate) fn create_backtick_expr(&mut self, token: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let text = literal::template_text(token).ok_or_else(|| {
            BuildError::source(format!("malformed template literal {token}"), location)
        })?;
        self.push_expr(ExprKind::Template(text.to_string()), None, location);
        Ok(())
    }

    /// Casts the expression on top of the stack to the most recently
    /// queued type. In `(int)(float) x` both names are queued before `x`
    /// completes, so the inner cast owns the later one.
    pub(crate) fn create_type_cast_expr(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let target = self.ctx.take_last_type(location)?;
        let expr = self.ctx.pop_expr(location)?;
        self.push_expr(
            ExprKind::TypeCast {
                target: target.clone(),
                expr: Box::new(expr),
            },
            Some(target),
            location,
        );
        Ok(())
    }

    // -----------------------------------------------------------------
    // Invocations
    // -----------------------------------------------------------------

    pub(crate) fn create_function_invocation_expr(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let invocation = self.pop_invocation(location)?;
        self.push_expr(ExprKind::FunctionInvocation(invocation), None, location);
        Ok(())
    }

    pub(crate) fn create_action_invocation_expr(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let invocation = self.pop_invocation(location)?;
        self.push_expr(ExprKind::ActionInvocation(invocation), None, location);
        Ok(())
    }

    /// Arguments and callee name of a call. The callee name was pushed
    /// before any argument was evaluated.
    pub(crate) fn pop_invocation(&mut self, location: &NodeLocation) -> Result<Invocation, BuildError> {
        let args = self.ctx.pop_expr_list(location)?;
        let name = self.ctx.pop_symbol_name(location)?;
        Ok(Invocation { name, args })
    }

    // -----------------------------------------------------------------
    // Instance creation and initializers
    // -----------------------------------------------------------------

    /// `new T(args)`.
    ///
    /// Non-struct types known to the registry produce an instance
    /// creation. Anything else is treated as a struct initializer, even
    /// if the struct is never declared; that is checked by a later pass.
    pub(crate) fn create_instance_creation_expr(
        &mut self,
        type_name: &str,
        args_available: bool,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        if args_available {
            let args = self.ctx.pop_expr_list(location)?;
            if !args.is_empty() {
                warn!(
                    %location,
                    type_name,
                    count = args.len(),
                    "constructor arguments are not supported yet, ignoring them"
                );
            }
        }
        let known = self
            .registry
            .lookup(type_name)
            .filter(|ty| !ty.is_struct())
            .cloned();
        match known {
            Some(ty) => self.push_expr(ExprKind::InstanceCreation, Some(ty), location),
            None => self.create_struct_init_expr(type_name, location),
        }
        Ok(())
    }

    pub(crate) fn create_struct_init_expr(&mut self, name: &str, location: &NodeLocation) {
        self.push_expr(
            ExprKind::StructInit {
                name: SymbolName::new(name),
            },
            Some(Type::Struct(name.to_string())),
            location,
        );
    }

    pub(crate) fn create_array_init_expr(
        &mut self,
        elements_available: bool,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        let elements = if elements_available {
            self.ctx.pop_expr_list(location)?
        } else {
            Vec::new()
        };
        self.push_expr(ExprKind::ArrayInit(elements), None, location);
        Ok(())
    }

    pub(crate) fn start_map_init_key_value(&mut self, _location: &NodeLocation) {
        self.ctx.key_value_lists.push(Vec::new());
    }

    pub(crate) fn end_map_init_key_value(&mut self, count: usize, location: &NodeLocation) -> Result<(), BuildError> {
        self.ctx.end_key_value_list(count, location)
    }

    /// Pairs `key` with the expression on top of the stack.
    pub(crate) fn create_map_init_key_value(&mut self, key: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let value = self.ctx.pop_expr(location)?;
        let pair = Expr::new(
            ExprKind::KeyValue {
                key: key.to_string(),
                value: Box::new(value),
            },
            None,
            location.clone(),
        );
        self.ctx.key_values.push(pair);
        Ok(())
    }

    pub(crate) fn create_map_init_expr(
        &mut self,
        entries_available: bool,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        let entries = if entries_available {
            self.ctx.pop_key_value_list(location)?
        } else {
            Vec::new()
        };
        self.push_expr(ExprKind::MapInit(entries), Some(Type::Map), location);
        Ok(())
    }

    fn push_expr(&mut self, kind: ExprKind, ty: Option<Type>, location: &NodeLocation) {
        self.ctx.exprs.push(Expr::new(kind, ty, location.clone()));
    }
}

fn field_access(
    reference: Expr,
    field: Option<Expr>,
    location: &NodeLocation,
) -> Result<Expr, BuildError> {
    let name = reference.reference_name().cloned().ok_or_else(|| {
        BuildError::structural("struct field access on a non-reference expression", Some(location))
    })?;
    Ok(Expr::new(
        ExprKind::StructFieldAccess(FieldAccess {
            name,
            reference: Box::new(reference),
            field: field.map(Box::new),
        }),
        None,
        location.clone(),
    ))
}

fn unsupported_operator(op: &str, location: &NodeLocation) -> BuildError {
    BuildError::source(format!("unsupported operator '{op}'"), location)
}

//! Partially built constructs.
//!
//! A frame is owned by exactly one stack or builder slot while it is
//! open. Finishing a frame consumes it and yields the immutable node.

use tracing::debug;

use crate::ast::{Block, Expr, IfBranch, IfElse, Stmt};
use crate::error::BuildError;
use crate::location::NodeLocation;
use crate::model::{
    Annotation, AnnotationKeyValue, CallableUnit, CallableUnitGroup, CallableUnitKind,
    ConnectorDecl, GroupKind, Parameter, Struct, VariableDecl,
};
use crate::symbol::SymbolName;

#[derive(Debug)]
pub(crate) struct BlockFrame {
    location: NodeLocation,
    statements: Vec<Stmt>,
}

impl BlockFrame {
    pub(crate) fn new(location: NodeLocation) -> Self {
        BlockFrame {
            location,
            statements: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, stmt: Stmt) {
        self.statements.push(stmt);
    }

    pub(crate) fn finish(self) -> Block {
        Block {
            statements: self.statements,
            location: self.location,
        }
    }
}

#[derive(Debug)]
pub(crate) struct IfElseFrame {
    location: NodeLocation,
    else_ifs: Vec<IfBranch>,
    else_body: Option<Block>,
}

impl IfElseFrame {
    pub(crate) fn new(location: NodeLocation) -> Self {
        IfElseFrame {
            location,
            else_ifs: Vec::new(),
            else_body: None,
        }
    }

    pub(crate) fn location(&self) -> &NodeLocation {
        &self.location
    }

    pub(crate) fn add_else_if(&mut self, condition: Expr, body: Block) {
        let location = body.location.clone();
        self.else_ifs.push(IfBranch {
            condition,
            body,
            location,
        });
    }

    pub(crate) fn set_else(&mut self, body: Block) -> Result<(), BuildError> {
        if self.else_body.is_some() {
            return Err(BuildError::structural(
                "if/else already has an else clause",
                Some(&body.location),
            ));
        }
        self.else_body = Some(body);
        Ok(())
    }

    /// Puts the primary branch in front of the `else if` branches.
    pub(crate) fn finish(self, condition: Expr, then_body: Block) -> IfElse {
        let mut branches = Vec::with_capacity(self.else_ifs.len() + 1);
        branches.push(IfBranch {
            condition,
            body: then_body,
            location: self.location,
        });
        branches.extend(self.else_ifs);
        IfElse {
            branches,
            else_body: self.else_body,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct AnnotationFrame {
    key_values: Vec<AnnotationKeyValue>,
}

impl AnnotationFrame {
    pub(crate) fn add_key_value(&mut self, key: &str, value: String) {
        self.key_values.push(AnnotationKeyValue {
            key: key.to_string(),
            value,
        });
    }

    pub(crate) fn finish(self, name: &str, value: Option<String>, location: NodeLocation) -> Annotation {
        Annotation {
            name: SymbolName::new(name),
            value,
            key_values: self.key_values,
            location,
        }
    }
}

/// Function, action, resource or type converter under construction.
#[derive(Debug)]
pub(crate) struct CallableUnitFrame {
    location: NodeLocation,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) return_parameters: Vec<Parameter>,
    pub(crate) connector_decls: Vec<ConnectorDecl>,
    pub(crate) body: Option<Block>,
}

impl CallableUnitFrame {
    pub(crate) fn new(location: NodeLocation) -> Self {
        CallableUnitFrame {
            location,
            parameters: Vec::new(),
            return_parameters: Vec::new(),
            connector_decls: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn finish(
        self,
        kind: CallableUnitKind,
        name: SymbolName,
        is_public: bool,
        annotations: Vec<Annotation>,
        location: NodeLocation,
    ) -> CallableUnit {
        let body = self.body.unwrap_or_else(|| Block {
            statements: Vec::new(),
            location: self.location.clone(),
        });
        debug!(
            kind = ?kind,
            name = %name,
            params = self.parameters.len(),
            statements = body.statements.len(),
            "callable unit finalized"
        );
        CallableUnit {
            kind,
            name,
            is_public,
            annotations,
            parameters: self.parameters,
            return_parameters: self.return_parameters,
            connector_decls: self.connector_decls,
            body,
            frame_size: 0,
            location,
        }
    }
}

/// Service or connector under construction.
#[derive(Debug)]
pub(crate) struct GroupFrame {
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) connector_decls: Vec<ConnectorDecl>,
    pub(crate) variable_decls: Vec<VariableDecl>,
    pub(crate) units: Vec<CallableUnit>,
}

impl GroupFrame {
    pub(crate) fn new() -> Self {
        GroupFrame {
            parameters: Vec::new(),
            connector_decls: Vec::new(),
            variable_decls: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Builds the group. A connector stamps its own name onto every
    /// contained action, which was finalized before that name was known.
    pub(crate) fn finish(
        mut self,
        kind: GroupKind,
        name: SymbolName,
        annotations: Vec<Annotation>,
        location: NodeLocation,
    ) -> CallableUnitGroup {
        if kind == GroupKind::Connector {
            for unit in &mut self.units {
                if unit.kind == CallableUnitKind::Action {
                    unit.name.bind_connector(name.name());
                }
            }
        }
        debug!(kind = ?kind, name = %name, units = self.units.len(), "group finalized");
        CallableUnitGroup {
            kind,
            name,
            annotations,
            parameters: self.parameters,
            connector_decls: self.connector_decls,
            variable_decls: self.variable_decls,
            units: self.units,
            location,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StructFrame {
    pub(crate) fields: Vec<VariableDecl>,
}

impl StructFrame {
    pub(crate) fn finish(self, name: SymbolName, is_public: bool, location: NodeLocation) -> Struct {
        debug!(name = %name, fields = self.fields.len(), "struct finalized");
        Struct {
            name,
            is_public,
            fields: self.fields,
            location,
        }
    }
}

//! Declarations and the compilation unit.
//!
//! These are the finalized, top-level pieces of a program: callable
//! units (functions, actions, resources, type converters), groups of
//! them (services, connectors), structs, constants and imports.

use serde::Serialize;

use crate::ast::{Block, Expr};
use crate::location::NodeLocation;
use crate::symbol::SymbolName;
use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub name: SymbolName,
    /// Positional value: `@Path("/echo")`.
    pub value: Option<String>,
    pub key_values: Vec<AnnotationKeyValue>,
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationKeyValue {
    pub key: String,
    pub value: String,
}

/// Parameter or return parameter. Return parameters may be unnamed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: Option<SymbolName>,
    pub ty: Type,
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDecl {
    pub name: SymbolName,
    pub ty: Type,
    pub location: NodeLocation,
}

/// `Connector c = new Connector(args);`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorDecl {
    pub connector: SymbolName,
    pub var_name: SymbolName,
    pub args: Vec<Expr>,
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Const {
    pub name: SymbolName,
    pub ty: Type,
    pub value: Expr,
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportPackage {
    pub path: String,
    /// Alias if given, otherwise the last segment of `path`.
    pub name: String,
    pub location: NodeLocation,
}

impl ImportPackage {
    pub fn new(path: impl Into<String>, alias: Option<&str>, location: NodeLocation) -> Self {
        let path = path.into();
        let name = match alias {
            Some(alias) => alias.to_string(),
            None => path.rsplit('.').next().unwrap_or(&path).to_string(),
        };
        ImportPackage {
            path,
            name,
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Struct {
    pub name: SymbolName,
    pub is_public: bool,
    pub fields: Vec<VariableDecl>,
    pub location: NodeLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CallableUnitKind {
    Function,
    Action,
    Resource,
    TypeConverter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallableUnit {
    pub kind: CallableUnitKind,
    pub name: SymbolName,
    pub is_public: bool,
    pub annotations: Vec<Annotation>,
    pub parameters: Vec<Parameter>,
    pub return_parameters: Vec<Parameter>,
    pub connector_decls: Vec<ConnectorDecl>,
    pub body: Block,
    /// Filled in by the pass that lays out stack frames.
    pub frame_size: usize,
    pub location: NodeLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupKind {
    Service,
    Connector,
}

/// A service (of resources) or a connector (of actions).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallableUnitGroup {
    pub kind: GroupKind,
    pub name: SymbolName,
    pub annotations: Vec<Annotation>,
    pub parameters: Vec<Parameter>,
    pub connector_decls: Vec<ConnectorDecl>,
    pub variable_decls: Vec<VariableDecl>,
    pub units: Vec<CallableUnit>,
    pub location: NodeLocation,
}

impl CallableUnitGroup {
    pub fn find_unit(&self, name: &str) -> Option<&CallableUnit> {
        self.units.iter().find(|unit| unit.name.name() == name)
    }
}

/// Root of one built file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<ImportPackage>,
    pub consts: Vec<Const>,
    pub structs: Vec<Struct>,
    pub services: Vec<CallableUnitGroup>,
    pub connectors: Vec<CallableUnitGroup>,
    pub functions: Vec<CallableUnit>,
    pub type_converters: Vec<CallableUnit>,
}

impl CompilationUnit {
    pub fn find_function(&self, name: &str) -> Option<&CallableUnit> {
        self.functions.iter().find(|f| f.name.name() == name)
    }

    pub fn find_connector(&self, name: &str) -> Option<&CallableUnitGroup> {
        self.connectors.iter().find(|c| c.name.name() == name)
    }

    pub fn find_service(&self, name: &str) -> Option<&CallableUnitGroup> {
        self.services.iter().find(|s| s.name.name() == name)
    }
}

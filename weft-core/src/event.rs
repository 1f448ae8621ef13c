//! Construction events as values.
//!
//! Each variant names one builder operation and carries its arguments
//! plus the source location of the production that triggered it. Event
//! scripts are sequences of these, one JSON object per line:
//!
//! ```text
//! {"event":"create_literal","kind":"int","text":"1","location":{"file":"a.bal","line":3}}
//! ```

use serde::Deserialize;
use tracing::trace;

use crate::builder::{ModelBuilder, aborted_error};
use crate::error::BuildError;
use crate::literal::LiteralKind;
use crate::location::NodeLocation;
use crate::model::CompilationUnit;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    // identifiers and packages
    CreateSymbolName { name: String, location: NodeLocation },
    CreateConnectorSymbolName { connector: String, action: String, location: NodeLocation },
    CreatePackageName { name: String, location: NodeLocation },
    CreatePackageDecl { location: NodeLocation },
    AddImportPackage {
        #[serde(default)]
        alias: Option<String>,
        location: NodeLocation,
    },

    // types
    CreateType { name: String, location: NodeLocation },
    CreateArrayType { name: String, location: NodeLocation },
    RegisterConnectorType { name: String, location: NodeLocation },

    // annotations
    StartAnnotation { location: NodeLocation },
    CreateAnnotationKeyValue { key: String, location: NodeLocation },
    EndAnnotation {
        name: String,
        #[serde(default)]
        value_available: bool,
        location: NodeLocation,
    },

    // parameters and declarations
    CreateParam { name: String, location: NodeLocation },
    CreateReturnTypes { location: NodeLocation },
    CreateNamedReturnParam { name: String, location: NodeLocation },
    CreateConstant { name: String, location: NodeLocation },
    CreateVariableDecl { name: String, location: NodeLocation },
    CreateConnectorDecl { name: String, location: NodeLocation },

    // lists
    StartExprList { location: NodeLocation },
    EndExprList { count: usize, location: NodeLocation },
    StartVarRefList { location: NodeLocation },
    EndVarRefList { count: usize, location: NodeLocation },
    StartMapInitKeyValue { location: NodeLocation },
    EndMapInitKeyValue { count: usize, location: NodeLocation },

    // expressions
    CreateLiteral { kind: LiteralKind, text: String, location: NodeLocation },
    CreateVarRef { name: String, location: NodeLocation },
    CreateMapArrayVarRef { name: String, location: NodeLocation },
    CreateStructFieldRef { location: NodeLocation },
    CreateBinaryExpr { op: String, location: NodeLocation },
    CreateUnaryExpr { op: String, location: NodeLocation },
    CreateBacktickExpr { text: String, location: NodeLocation },
    CreateFunctionInvocationExpr { location: NodeLocation },
    CreateActionInvocationExpr { location: NodeLocation },
    CreateTypeCastExpr { location: NodeLocation },
    CreateInstanceCreationExpr {
        type_name: String,
        #[serde(default)]
        args_available: bool,
        location: NodeLocation,
    },
    CreateStructInitExpr { name: String, location: NodeLocation },
    CreateArrayInitExpr {
        #[serde(default)]
        elements_available: bool,
        location: NodeLocation,
    },
    CreateMapInitKeyValue { key: String, location: NodeLocation },
    CreateMapInitExpr {
        #[serde(default)]
        entries_available: bool,
        location: NodeLocation,
    },

    // statements
    CreateAssignmentStmt { location: NodeLocation },
    CreateReturnStmt {
        #[serde(default)]
        values_available: bool,
        location: NodeLocation,
    },
    CreateReplyStmt { location: NodeLocation },
    StartWhileStmt { location: NodeLocation },
    EndWhileStmt { location: NodeLocation },
    StartIfElseStmt { location: NodeLocation },
    StartElseIfClause { location: NodeLocation },
    EndElseIfClause { location: NodeLocation },
    StartElseClause { location: NodeLocation },
    EndElseClause { location: NodeLocation },
    EndIfElseStmt { location: NodeLocation },
    StartBlock { location: NodeLocation },
    EndBlock { location: NodeLocation },
    CreateFunctionInvocationStmt { location: NodeLocation },
    CreateActionInvocationStmt { location: NodeLocation },

    // callable units and groups
    StartCallableUnit { location: NodeLocation },
    StartCallableUnitBody { location: NodeLocation },
    EndCallableUnitBody { location: NodeLocation },
    CreateFunction {
        name: String,
        #[serde(default)]
        is_public: bool,
        location: NodeLocation,
    },
    CreateTypeConverter {
        name: String,
        #[serde(default)]
        is_public: bool,
        location: NodeLocation,
    },
    CreateResource { name: String, location: NodeLocation },
    CreateAction { name: String, location: NodeLocation },
    StartCallableUnitGroup { location: NodeLocation },
    CreateService { name: String, location: NodeLocation },
    CreateConnector { name: String, location: NodeLocation },

    // structs
    StartStruct { location: NodeLocation },
    CreateStructField { name: String, location: NodeLocation },
    CreateStructDefinition {
        name: String,
        #[serde(default)]
        is_public: bool,
        location: NodeLocation,
    },
}

impl Event {
    pub fn location(&self) -> &NodeLocation {
        use Event::*;
        match self {
            CreateSymbolName { location, .. }
            | CreateConnectorSymbolName { location, .. }
            | CreatePackageName { location, .. }
            | CreatePackageDecl { location }
            | AddImportPackage { location, .. }
            | CreateType { location, .. }
            | CreateArrayType { location, .. }
            | RegisterConnectorType { location, .. }
            | StartAnnotation { location }
            | CreateAnnotationKeyValue { location, .. }
            | EndAnnotation { location, .. }
            | CreateParam { location, .. }
            | CreateReturnTypes { location }
            | CreateNamedReturnParam { location, .. }
            | CreateConstant { location, .. }
            | CreateVariableDecl { location, .. }
            | CreateConnectorDecl { location, .. }
            | StartExprList { location }
            | EndExprList { location, .. }
            | StartVarRefList { location }
            | EndVarRefList { location, .. }
            | StartMapInitKeyValue { location }
            | EndMapInitKeyValue { location, .. }
            | CreateLiteral { location, .. }
            | CreateVarRef { location, .. }
            | CreateMapArrayVarRef { location, .. }
            | CreateStructFieldRef { location }
            | CreateBinaryExpr { location, .. }
            | CreateUnaryExpr { location, .. }
            | CreateBacktickExpr { location, .. }
            | CreateFunctionInvocationExpr { location }
            | CreateActionInvocationExpr { location }
            | CreateTypeCastExpr { location }
            | CreateInstanceCreationExpr { location, .. }
            | CreateStructInitExpr { location, .. }
            | CreateArrayInitExpr { location, .. }
            | CreateMapInitKeyValue { location, .. }
            | CreateMapInitExpr { location, .. }
            | CreateAssignmentStmt { location }
            | CreateReturnStmt { location, .. }
            | CreateReplyStmt { location }
            | StartWhileStmt { location }
            | EndWhileStmt { location }
            | StartIfElseStmt { location }
            | StartElseIfClause { location }
            | EndElseIfClause { location }
            | StartElseClause { location }
            | EndElseClause { location }
            | EndIfElseStmt { location }
            | StartBlock { location }
            | EndBlock { location }
            | CreateFunctionInvocationStmt { location }
            | CreateActionInvocationStmt { location }
            | StartCallableUnit { location }
            | StartCallableUnitBody { location }
            | EndCallableUnitBody { location }
            | CreateFunction { location, .. }
            | CreateTypeConverter { location, .. }
            | CreateResource { location, .. }
            | CreateAction { location, .. }
            | StartCallableUnitGroup { location }
            | CreateService { location, .. }
            | CreateConnector { location, .. }
            | StartStruct { location }
            | CreateStructField { location, .. }
            | CreateStructDefinition { location, .. } => location,
        }
    }
}

impl ModelBuilder {
    /// Dispatches one event to its assembler.
    ///
    /// A failed event aborts the builder: every later `apply` and the
    /// final `build` fail without touching the stacks again.
    pub fn apply(&mut self, event: &Event) -> Result<(), BuildError> {
        if self.is_aborted() {
            return Err(aborted_error());
        }
        trace!(?event, "apply");
        let result = self.dispatch(event);
        if result.is_err() {
            self.abort();
        }
        result
    }

    fn dispatch(&mut self, event: &Event) -> Result<(), BuildError> {
        use Event::*;
        match event {
            CreateSymbolName { name, location } => self.create_symbol_name(name, location),
            CreateConnectorSymbolName { connector, action, location } => {
                self.create_connector_symbol_name(connector, action, location)
            }
            CreatePackageName { name, location } => self.create_package_name(name, location),
            CreatePackageDecl { location } => return self.create_package_decl(location),
            AddImportPackage { alias, location } => {
                return self.add_import_package(alias.as_deref(), location);
            }

            CreateType { name, location } => self.create_type(name, location),
            CreateArrayType { name, location } => self.create_array_type(name, location),
            RegisterConnectorType { name, location } => self.register_connector_type(name, location),

            StartAnnotation { location } => self.start_annotation(location),
            CreateAnnotationKeyValue { key, location } => {
                return self.create_annotation_key_value(key, location);
            }
            EndAnnotation { name, value_available, location } => {
                return self.end_annotation(name, *value_available, location);
            }

            CreateParam { name, location } => return self.create_param(name, location),
            CreateReturnTypes { location } => return self.create_return_types(location),
            CreateNamedReturnParam { name, location } => {
                return self.create_named_return_param(name, location);
            }
            CreateConstant { name, location } => return self.create_constant(name, location),
            CreateVariableDecl { name, location } => return self.create_variable_decl(name, location),
            CreateConnectorDecl { name, location } => return self.create_connector_decl(name, location),

            StartExprList { location } => self.start_expr_list(location),
            EndExprList { count, location } => return self.end_expr_list(*count, location),
            StartVarRefList { location } => self.start_var_ref_list(location),
            EndVarRefList { count, location } => return self.end_var_ref_list(*count, location),
            StartMapInitKeyValue { location } => self.start_map_init_key_value(location),
            EndMapInitKeyValue { count, location } => {
                return self.end_map_init_key_value(*count, location);
            }

            CreateLiteral { kind, text, location } => return self.create_literal(*kind, text, location),
            CreateVarRef { name, location } => self.create_var_ref(name, location),
            CreateMapArrayVarRef { name, location } => return self.create_map_array_var_ref(name, location),
            CreateStructFieldRef { location } => return self.create_struct_field_ref(location),
            CreateBinaryExpr { op, location } => return self.create_binary_expr(op, location),
            CreateUnaryExpr { op, location } => return self.create_unary_expr(op, location),
            CreateBacktickExpr { text, location } => return self.create_backtick_expr(text, location),
            CreateFunctionInvocationExpr { location } => {
                return self.create_function_invocation_expr(location);
            }
            CreateActionInvocationExpr { location } => return self.create_action_invocation_expr(location),
            CreateTypeCastExpr { location } => return self.create_type_cast_expr(location),
            CreateInstanceCreationExpr { type_name, args_available, location } => {
                return self.create_instance_creation_expr(type_name, *args_available, location);
            }
            CreateStructInitExpr { name, location } => self.create_struct_init_expr(name, location),
            CreateArrayInitExpr { elements_available, location } => {
                return self.create_array_init_expr(*elements_available, location);
            }
            CreateMapInitKeyValue { key, location } => return self.create_map_init_key_value(key, location),
            CreateMapInitExpr { entries_available, location } => {
                return self.create_map_init_expr(*entries_available, location);
            }

            CreateAssignmentStmt { location } => return self.create_assignment_stmt(location),
            CreateReturnStmt { values_available, location } => {
                return self.create_return_stmt(*values_available, location);
            }
            CreateReplyStmt { location } => return self.create_reply_stmt(location),
            StartWhileStmt { location } => self.start_while_stmt(location),
            EndWhileStmt { location } => return self.end_while_stmt(location),
            StartIfElseStmt { location } => self.start_if_else_stmt(location),
            StartElseIfClause { location } => self.start_else_if_clause(location),
            EndElseIfClause { location } => return self.end_else_if_clause(location),
            StartElseClause { location } => self.start_else_clause(location),
            EndElseClause { location } => return self.end_else_clause(location),
            EndIfElseStmt { location } => return self.end_if_else_stmt(location),
            StartBlock { location } => self.start_block(location),
            EndBlock { location } => return self.end_block(location),
            CreateFunctionInvocationStmt { location } => {
                return self.create_function_invocation_stmt(location);
            }
            CreateActionInvocationStmt { location } => return self.create_action_invocation_stmt(location),

            StartCallableUnit { location } => return self.start_callable_unit(location),
            StartCallableUnitBody { location } => self.start_callable_unit_body(location),
            EndCallableUnitBody { location } => return self.end_callable_unit_body(location),
            CreateFunction { name, is_public, location } => {
                return self.create_function(name, *is_public, location);
            }
            CreateTypeConverter { name, is_public, location } => {
                return self.create_type_converter(name, *is_public, location);
            }
            CreateResource { name, location } => return self.create_resource(name, location),
            CreateAction { name, location } => return self.create_action(name, location),
            StartCallableUnitGroup { location } => return self.start_callable_unit_group(location),
            CreateService { name, location } => return self.create_service(name, location),
            CreateConnector { name, location } => return self.create_connector(name, location),

            StartStruct { location } => return self.start_struct(location),
            CreateStructField { name, location } => return self.create_struct_field(name, location),
            CreateStructDefinition { name, is_public, location } => {
                return self.create_struct_definition(name, *is_public, location);
            }
        }
        Ok(())
    }
}

/// Drives a fresh builder through `events` and returns the finished root.
pub fn replay<I>(events: I) -> Result<CompilationUnit, BuildError>
where
    I: IntoIterator<Item = Event>,
{
    let mut builder = ModelBuilder::new();
    for event in events {
        builder.apply(&event)?;
    }
    builder.build()
}

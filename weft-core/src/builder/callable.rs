use crate::ast::{Expr, StmtKind};
use crate::error::BuildError;
use crate::location::NodeLocation;
use crate::model::{
    CallableUnit, CallableUnitGroup, CallableUnitKind, ConnectorDecl, Const, GroupKind, Parameter,
    VariableDecl,
};
use crate::symbol::SymbolName;

use super::ModelBuilder;
use super::frames::{AnnotationFrame, BlockFrame, CallableUnitFrame, GroupFrame, StructFrame};

impl ModelBuilder {
    // -----------------------------------------------------------------
    // Annotations
    // -----------------------------------------------------------------

    pub(crate) fn start_annotation(&mut self, _location: &NodeLocation) {
        self.ctx.annotations.push(AnnotationFrame::default());
    }

    /// `key = "value"` inside the open annotation.
    pub(crate) fn create_annotation_key_value(&mut self, key: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let value = self.ctx.pop_expr(location)?;
        let value = annotation_value(value, location)?;
        self.ctx.top_annotation(location)?.add_key_value(key, value);
        Ok(())
    }

    /// Closes the open annotation and appends it to the current
    /// annotation list. A positional value must be a string literal.
    pub(crate) fn end_annotation(
        &mut self,
        name: &str,
        value_available: bool,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        let frame = self.ctx.pop_annotation(location)?;
        let value = if value_available {
            let expr = self.ctx.pop_expr(location)?;
            Some(annotation_value(expr, location)?)
        } else {
            None
        };
        let annotation = frame.finish(name, value, location.clone());
        self.ctx.top_annotation_list(location)?.push(annotation);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Parameters
    // -----------------------------------------------------------------

    /// Parameter of the open callable unit, or of the open group when no
    /// callable unit is active.
    pub(crate) fn create_param(&mut self, name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let ty = self.ctx.take_type(location)?;
        let param = Parameter {
            name: Some(SymbolName::new(name)),
            ty,
            location: location.clone(),
        };
        if let Some(unit) = self.unit.as_mut() {
            unit.parameters.push(param);
        } else if let Some(group) = self.group.as_mut() {
            group.parameters.push(param);
        } else {
            return Err(outside("parameter", "a callable unit or group", location));
        }
        Ok(())
    }

    /// Unnamed return parameters: drains every queued type in order.
    pub(crate) fn create_return_types(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let unit = self
            .unit
            .as_mut()
            .ok_or_else(|| outside("return types", "a callable unit", location))?;
        while let Some(ty) = self.ctx.types.pop_front() {
            unit.return_parameters.push(Parameter {
                name: None,
                ty,
                location: location.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn create_named_return_param(&mut self, name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let ty = self.ctx.take_type(location)?;
        let unit = self
            .unit
            .as_mut()
            .ok_or_else(|| outside("return parameter", "a callable unit", location))?;
        unit.return_parameters.push(Parameter {
            name: Some(SymbolName::new(name)),
            ty,
            location: location.clone(),
        });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------

    pub(crate) fn create_constant(&mut self, name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let ty = self.ctx.take_type(location)?;
        let value = self.ctx.pop_expr(location)?;
        self.file.consts.push(Const {
            name: self.qualified(name),
            ty,
            value,
            location: location.clone(),
        });
        Ok(())
    }

    /// Inside a callable unit the declaration becomes a statement of the
    /// current block; inside a group it belongs to the group.
    pub(crate) fn create_variable_decl(&mut self, name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let ty = self.ctx.take_type(location)?;
        let decl = VariableDecl {
            name: SymbolName::new(name),
            ty,
            location: location.clone(),
        };
        if self.unit.is_some() {
            self.add_statement(StmtKind::VariableDef(decl), location)
        } else if let Some(group) = self.group.as_mut() {
            group.variable_decls.push(decl);
            Ok(())
        } else {
            Err(outside("variable declaration", "a callable unit or group", location))
        }
    }

    /// `Conn c = new Conn(args);` The connector name was pushed twice, once
    /// for the declared type and once for the constructor.
    pub(crate) fn create_connector_decl(&mut self, var_name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        if self.ctx.symbol_names.len() < 2 {
            return Err(BuildError::structural(
                format!("connector declaration {var_name} needs two symbol names"),
                Some(location),
            ));
        }
        self.ctx.pop_symbol_name(location)?;
        let connector = self.ctx.pop_symbol_name(location)?;
        let args = self.ctx.pop_expr_list(location)?;
        let decl = ConnectorDecl {
            connector,
            var_name: SymbolName::new(var_name),
            args,
            location: location.clone(),
        };
        if let Some(unit) = self.unit.as_mut() {
            unit.connector_decls.push(decl);
        } else if let Some(group) = self.group.as_mut() {
            group.connector_decls.push(decl);
        } else {
            return Err(outside("connector declaration", "a callable unit or group", location));
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Functions, actions, resources and type converters
    // -----------------------------------------------------------------

    pub(crate) fn start_callable_unit(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        if self.unit.is_some() {
            return Err(BuildError::structural(
                "callable unit started while another is open",
                Some(location),
            ));
        }
        self.unit = Some(CallableUnitFrame::new(location.clone()));
        self.ctx.annotation_lists.push(Vec::new());
        Ok(())
    }

    pub(crate) fn start_callable_unit_body(&mut self, location: &NodeLocation) {
        self.ctx.blocks.push(BlockFrame::new(location.clone()));
    }

    pub(crate) fn end_callable_unit_body(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let body = self.ctx.pop_block(location)?.finish();
        let unit = self
            .unit
            .as_mut()
            .ok_or_else(|| outside("callable unit body", "a callable unit", location))?;
        unit.body = Some(body);
        Ok(())
    }

    pub(crate) fn create_function(&mut self, name: &str, is_public: bool, location: &NodeLocation) -> Result<(), BuildError> {
        let function = self.finish_unit(CallableUnitKind::Function, name, is_public, location)?;
        self.file.functions.push(function);
        Ok(())
    }

    pub(crate) fn create_type_converter(
        &mut self,
        name: &str,
        is_public: bool,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        let converter = self.finish_unit(CallableUnitKind::TypeConverter, name, is_public, location)?;
        self.file.type_converters.push(converter);
        Ok(())
    }

    pub(crate) fn create_resource(&mut self, name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        self.finish_grouped_unit(CallableUnitKind::Resource, name, location)
    }

    /// The action is finalized without a connector qualifier; the
    /// enclosing connector stamps it when it finalizes.
    pub(crate) fn create_action(&mut self, name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        self.finish_grouped_unit(CallableUnitKind::Action, name, location)
    }

    fn finish_grouped_unit(
        &mut self,
        kind: CallableUnitKind,
        name: &str,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        if self.group.is_none() {
            return Err(outside("resource or action", "a service or connector", location));
        }
        let unit = self.finish_unit(kind, name, false, location)?;
        if let Some(group) = self.group.as_mut() {
            group.units.push(unit);
        }
        Ok(())
    }

    fn finish_unit(
        &mut self,
        kind: CallableUnitKind,
        name: &str,
        is_public: bool,
        location: &NodeLocation,
    ) -> Result<CallableUnit, BuildError> {
        let frame = self
            .unit
            .take()
            .ok_or_else(|| BuildError::structural(format!("no open callable unit for {name}"), Some(location)))?;
        let annotations = self.ctx.pop_annotation_list(location)?;
        let name = self.qualified(name);
        Ok(frame.finish(kind, name, is_public, annotations, location.clone()))
    }

    // -----------------------------------------------------------------
    // Services and connectors
    // -----------------------------------------------------------------

    pub(crate) fn start_callable_unit_group(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        if self.group.is_some() {
            return Err(BuildError::structural(
                "service or connector started while another is open",
                Some(location),
            ));
        }
        self.group = Some(GroupFrame::new());
        self.ctx.annotation_lists.push(Vec::new());
        Ok(())
    }

    pub(crate) fn create_service(&mut self, name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let service = self.finish_group(GroupKind::Service, name, location)?;
        self.file.services.push(service);
        Ok(())
    }

    pub(crate) fn create_connector(&mut self, name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let connector = self.finish_group(GroupKind::Connector, name, location)?;
        self.file.connectors.push(connector);
        Ok(())
    }

    fn finish_group(
        &mut self,
        kind: GroupKind,
        name: &str,
        location: &NodeLocation,
    ) -> Result<CallableUnitGroup, BuildError> {
        if self.unit.is_some() {
            return Err(BuildError::structural(
                format!("{name} finalized while one of its callable units is still open"),
                Some(location),
            ));
        }
        let frame = self
            .group
            .take()
            .ok_or_else(|| BuildError::structural(format!("no open service or connector for {name}"), Some(location)))?;
        let annotations = self.ctx.pop_annotation_list(location)?;
        let name = self.qualified(name);
        Ok(frame.finish(kind, name, annotations, location.clone()))
    }

    // -----------------------------------------------------------------
    // Structs
    // -----------------------------------------------------------------

    pub(crate) fn start_struct(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        if self.structure.is_some() {
            return Err(BuildError::structural("struct started while another is open", Some(location)));
        }
        self.structure = Some(StructFrame::default());
        Ok(())
    }

    pub(crate) fn create_struct_field(&mut self, name: &str, location: &NodeLocation) -> Result<(), BuildError> {
        let ty = self.ctx.take_type(location)?;
        let structure = self
            .structure
            .as_mut()
            .ok_or_else(|| outside("struct field", "a struct", location))?;
        structure.fields.push(VariableDecl {
            name: SymbolName::new(name),
            ty,
            location: location.clone(),
        });
        Ok(())
    }

    /// Finalizes the struct and registers its name as a type.
    pub(crate) fn create_struct_definition(
        &mut self,
        name: &str,
        is_public: bool,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        let frame = self
            .structure
            .take()
            .ok_or_else(|| BuildError::structural(format!("no open struct for {name}"), Some(location)))?;
        let structure = frame.finish(self.qualified(name), is_public, location.clone());
        self.file.structs.push(structure);
        self.registry.register_struct(name);
        Ok(())
    }
}

fn annotation_value(expr: Expr, location: &NodeLocation) -> Result<String, BuildError> {
    match expr.as_literal().and_then(|lit| lit.as_str()) {
        Some(value) => Ok(value.to_string()),
        None => Err(BuildError::source(
            "annotation values other than string literals are not supported",
            location,
        )),
    }
}

fn outside(what: &str, container: &str, location: &NodeLocation) -> BuildError {
    BuildError::structural(format!("{what} outside {container}"), Some(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::LiteralKind;
    use crate::types::Type;

    fn at(line: u32) -> NodeLocation {
        NodeLocation::new("callable.bal", line)
    }

    fn string(builder: &mut ModelBuilder, text: &str) {
        builder
            .create_literal(LiteralKind::String, text, &at(1))
            .expect("literal");
    }

    fn empty_action(builder: &mut ModelBuilder, name: &str, line: u32) {
        builder.start_callable_unit(&at(line)).expect("start");
        builder.start_callable_unit_body(&at(line));
        builder.end_callable_unit_body(&at(line)).expect("body");
        builder.create_action(name, &at(line)).expect("action");
    }

    #[test]
    fn function_collects_params_returns_and_annotations() {
        let mut builder = ModelBuilder::new();
        builder.create_package_name("samples", &at(1));
        builder.create_package_decl(&at(1)).expect("package");

        builder.start_callable_unit(&at(2)).expect("start");
        builder.start_annotation(&at(2));
        string(&mut builder, "/sum");
        builder.end_annotation("Path", true, &at(2)).expect("annotation");
        builder.create_type("int", &at(3));
        builder.create_param("a", &at(3)).expect("param a");
        builder.create_type("int", &at(3));
        builder.create_param("b", &at(3)).expect("param b");
        builder.create_type("int", &at(3));
        builder.create_type("string", &at(3));
        builder.create_return_types(&at(3)).expect("returns");
        builder.start_callable_unit_body(&at(4));
        builder.end_callable_unit_body(&at(5)).expect("body");
        builder.create_function("sum", true, &at(2)).expect("function");

        let unit = builder.build().expect("build");
        let function = unit.find_function("sum").expect("sum");
        assert_eq!(function.kind, CallableUnitKind::Function);
        assert_eq!(function.name.qualified_name(), "samples:sum");
        assert!(function.is_public);
        let params: Vec<_> = function
            .parameters
            .iter()
            .filter_map(|p| p.name.as_ref().map(|n| n.name()))
            .collect();
        assert_eq!(params, vec!["a", "b"]);
        let returns: Vec<_> = function.return_parameters.iter().map(|p| p.ty.clone()).collect();
        assert_eq!(returns, vec![Type::Int, Type::String]);
        assert!(function.return_parameters.iter().all(|p| p.name.is_none()));
        assert_eq!(function.annotations.len(), 1);
        assert_eq!(function.annotations[0].value.as_deref(), Some("/sum"));
    }

    #[test]
    fn named_return_params_take_one_type_each() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit(&at(1)).expect("start");
        builder.create_type("boolean", &at(1));
        builder.create_named_return_param("ok", &at(1)).expect("ok");
        builder.create_type("string", &at(1));
        builder.create_named_return_param("reason", &at(1)).expect("reason");
        builder.create_function("check", false, &at(1)).expect("function");
        let unit = builder.build().expect("build");
        let returns = &unit.functions[0].return_parameters;
        assert_eq!(returns[0].name.as_ref().map(SymbolName::name), Some("ok"));
        assert_eq!(returns[1].ty, Type::String);
    }

    #[test]
    fn connector_backfills_action_qualifiers() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit_group(&at(1)).expect("group");
        empty_action(&mut builder, "get", 2);
        empty_action(&mut builder, "post", 5);
        builder.create_connector("HttpClient", &at(1)).expect("connector");
        let unit = builder.build().expect("build");
        let connector = unit.find_connector("HttpClient").expect("connector");
        assert_eq!(connector.units.len(), 2);
        for action in &connector.units {
            assert_eq!(action.kind, CallableUnitKind::Action);
            assert_eq!(action.name.connector_name(), Some("HttpClient"));
        }
        assert_eq!(connector.find_unit("post").map(|a| a.name.qualified_name()), Some("HttpClient.post".into()));
    }

    #[test]
    fn service_gathers_resources_and_declarations() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit_group(&at(1)).expect("group");
        builder.create_type("int", &at(2));
        builder.create_variable_decl("count", &at(2)).expect("service variable");

        builder.create_symbol_name("HttpClient", &at(3));
        builder.create_symbol_name("HttpClient", &at(3));
        builder.start_expr_list(&at(3));
        string(&mut builder, "http://localhost");
        builder.end_expr_list(1, &at(3)).expect("args");
        builder.create_connector_decl("client", &at(3)).expect("connector decl");

        builder.start_callable_unit(&at(4)).expect("resource");
        builder.start_annotation(&at(4));
        string(&mut builder, "GET");
        builder.create_annotation_key_value("method", &at(4)).expect("kv");
        builder.end_annotation("Http", false, &at(4)).expect("annotation");
        builder.create_type("message", &at(5));
        builder.create_param("m", &at(5)).expect("param");
        builder.start_callable_unit_body(&at(5));
        builder.create_var_ref("m", &at(6));
        builder.create_reply_stmt(&at(6)).expect("reply");
        builder.end_callable_unit_body(&at(7)).expect("body");
        builder.create_resource("echo", &at(4)).expect("resource");
        builder.create_service("Echo", &at(1)).expect("service");

        let unit = builder.build().expect("build");
        let service = unit.find_service("Echo").expect("service");
        assert_eq!(service.variable_decls[0].name.name(), "count");
        assert_eq!(service.connector_decls[0].connector.name(), "HttpClient");
        assert_eq!(service.connector_decls[0].var_name.name(), "client");
        assert_eq!(service.connector_decls[0].args.len(), 1);
        let resource = service.find_unit("echo").expect("resource");
        assert_eq!(resource.kind, CallableUnitKind::Resource);
        assert_eq!(resource.name.connector_name(), None);
        assert_eq!(resource.body.len(), 1);
        let annotation = &resource.annotations[0];
        assert_eq!(annotation.name.name(), "Http");
        assert_eq!(annotation.value, None);
        assert_eq!(annotation.key_values[0].key, "method");
        assert_eq!(annotation.key_values[0].value, "GET");
    }

    #[test]
    fn group_parameters_when_no_unit_is_open() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit_group(&at(1)).expect("group");
        builder.create_type("string", &at(1));
        builder.create_param("baseUrl", &at(1)).expect("param");
        builder.create_connector("Api", &at(1)).expect("connector");
        let unit = builder.build().expect("build");
        assert_eq!(unit.connectors[0].parameters[0].ty, Type::String);
    }

    #[test]
    fn connector_decl_inside_function_attaches_to_function() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit(&at(1)).expect("start");
        builder.start_callable_unit_body(&at(1));
        builder.create_symbol_name("Db", &at(2));
        builder.create_symbol_name("Db", &at(2));
        builder.start_expr_list(&at(2));
        builder.end_expr_list(0, &at(2)).expect("args");
        builder.create_connector_decl("db", &at(2)).expect("decl");
        builder.end_callable_unit_body(&at(3)).expect("body");
        builder.create_function("query", false, &at(1)).expect("function");
        let unit = builder.build().expect("build");
        assert_eq!(unit.functions[0].connector_decls[0].var_name.name(), "db");
    }

    #[test]
    fn connector_decl_with_one_symbol_is_structural() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit_group(&at(1)).expect("group");
        builder.create_symbol_name("Db", &at(2));
        builder.start_expr_list(&at(2));
        let err = builder.create_connector_decl("db", &at(2)).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn non_string_annotation_value_is_a_source_error() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit(&at(1)).expect("start");
        builder.start_annotation(&at(1));
        builder
            .create_literal(LiteralKind::Int, "5", &at(1))
            .expect("literal");
        let err = builder.end_annotation("Retry", true, &at(1)).unwrap_err();
        assert!(matches!(err, BuildError::Source { .. }));
        assert_eq!(err.location(), Some(&at(1)));
    }

    #[test]
    fn action_outside_group_is_structural() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit(&at(1)).expect("start");
        assert!(builder.create_action("orphan", &at(1)).unwrap_err().is_structural());
    }

    #[test]
    fn create_without_start_is_structural() {
        let mut builder = ModelBuilder::new();
        assert!(builder.create_function("f", false, &at(1)).unwrap_err().is_structural());
        assert!(builder.create_service("S", &at(1)).unwrap_err().is_structural());
        assert!(builder.create_struct_definition("T", false, &at(1)).unwrap_err().is_structural());
    }

    #[test]
    fn type_converter_pops_its_annotation_list() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit(&at(1)).expect("start");
        builder.create_type("xml", &at(1));
        builder.create_param("input", &at(1)).expect("param");
        builder.create_type("json", &at(1));
        builder.create_return_types(&at(1)).expect("returns");
        builder.create_type_converter("xmlToJson", false, &at(1)).expect("converter");
        let unit = builder.build().expect("balanced build");
        assert_eq!(unit.type_converters[0].kind, CallableUnitKind::TypeConverter);
    }

    #[test]
    fn struct_definition_registers_type() {
        let mut builder = ModelBuilder::new();
        builder.start_struct(&at(1)).expect("struct");
        builder.create_type("string", &at(2));
        builder.create_struct_field("name", &at(2)).expect("field");
        builder.create_type("Address", &at(3));
        builder.create_struct_field("home", &at(3)).expect("field");
        builder.create_struct_definition("Person", true, &at(1)).expect("definition");
        assert_eq!(builder.registry().lookup("Person"), Some(&Type::Struct("Person".into())));

        let unit = builder.build().expect("build");
        let person = &unit.structs[0];
        assert!(person.is_public);
        let fields: Vec<_> = person.fields.iter().map(|f| (f.name.name(), f.ty.clone())).collect();
        assert_eq!(
            fields,
            vec![("name", Type::String), ("home", Type::Struct("Address".into()))]
        );
    }

    #[test]
    fn constants_are_file_level() {
        let mut builder = ModelBuilder::new();
        builder.create_type("int", &at(1));
        builder
            .create_literal(LiteralKind::Int, "3", &at(1))
            .expect("literal");
        builder.create_constant("RETRIES", &at(1)).expect("const");
        let unit = builder.build().expect("build");
        assert_eq!(unit.consts[0].name.name(), "RETRIES");
        assert_eq!(unit.consts[0].ty, Type::Int);
    }

    #[test]
    fn variable_decl_outside_any_container_is_structural() {
        let mut builder = ModelBuilder::new();
        builder.create_type("int", &at(1));
        assert!(builder.create_variable_decl("x", &at(1)).unwrap_err().is_structural());
    }

    #[test]
    fn overlapping_callable_units_are_structural() {
        let mut builder = ModelBuilder::new();
        builder.start_callable_unit(&at(1)).expect("first");
        assert!(builder.start_callable_unit(&at(2)).unwrap_err().is_structural());
    }

    #[test]
    fn unfinished_unit_fails_the_build() {
        let mut builder = ModelBuilder::new();
        builder.start_struct(&at(1)).expect("struct");
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("unfinished struct"));
    }
}

//! The model builder: working stacks plus one assembler per construct.
//!
//! A parser drives a `ModelBuilder` by applying one `Event` per recognized
//! production, in source order. `apply` is the only way in; it dispatches
//! to a crate-private assembler, and each assembler touches only the
//! stacks of its own construct. Expressions are left on the expression stack until a
//! consumer pops them; statements go into the innermost open block;
//! callable units, groups and structs are collected into the root
//! `CompilationUnit`, which `build` hands out once every stack is empty.
//!
//! The assemblers are split by concern:
//! - `expr`     expressions, lists and literals
//! - `stmt`     statements and blocks
//! - `callable` annotations, parameters, declarations, callable units,
//!   services, connectors and structs

mod callable;
mod context;
mod expr;
mod frames;
mod stmt;

use crate::error::BuildError;
use crate::location::NodeLocation;
use crate::model::{CompilationUnit, ImportPackage};
use crate::symbol::SymbolName;
use crate::types::TypeRegistry;

use context::BuildContext;
use frames::{CallableUnitFrame, GroupFrame, StructFrame};

/// Folds construction events into a `CompilationUnit`.
///
/// The builder owns every piece of partial state, including the type
/// registry; nothing is shared with other builds.
#[derive(Debug)]
pub struct ModelBuilder {
    ctx: BuildContext,
    registry: TypeRegistry,
    /// Package declared by the file, used to qualify top-level names.
    package: Option<String>,
    unit: Option<CallableUnitFrame>,
    group: Option<GroupFrame>,
    structure: Option<StructFrame>,
    file: CompilationUnit,
    aborted: bool,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        ModelBuilder::new()
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        ModelBuilder::with_registry(TypeRegistry::new())
    }

    /// Starts a build over a caller-supplied registry, e.g. one pre-seeded
    /// with types from already-built files.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        ModelBuilder {
            ctx: BuildContext::default(),
            registry,
            package: None,
            unit: None,
            group: None,
            structure: None,
            file: CompilationUnit::default(),
            aborted: false,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Number of expressions waiting on the expression stack.
    pub fn pending_exprs(&self) -> usize {
        self.ctx.exprs.len()
    }

    pub(crate) fn abort(&mut self) {
        self.aborted = true;
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Hands out the finished compilation unit.
    ///
    /// Fails if an earlier event failed, or if any stack, queue or
    /// builder slot still holds partial state.
    pub fn build(self) -> Result<CompilationUnit, BuildError> {
        self.into_parts().map(|(unit, _)| unit)
    }

    /// Like `build`, but also hands back the type registry so it can be
    /// `reset` and reused, or carried into the next file's build.
    pub fn into_parts(self) -> Result<(CompilationUnit, TypeRegistry), BuildError> {
        if self.aborted {
            return Err(aborted_error());
        }
        if let Some(pending) = self.ctx.leftovers() {
            return Err(BuildError::structural(
                format!("unbalanced build, still pending: {pending}"),
                None,
            ));
        }
        let open = [
            ("callable unit", self.unit.is_some()),
            ("service or connector", self.group.is_some()),
            ("struct", self.structure.is_some()),
        ];
        if let Some((what, _)) = open.iter().find(|(_, is_open)| *is_open) {
            return Err(BuildError::structural(
                format!("unfinished {what} at end of build"),
                None,
            ));
        }
        Ok((self.file, self.registry))
    }

    // -----------------------------------------------------------------
    // Identifiers
    // -----------------------------------------------------------------

    /// Pushes a symbol name, qualified by a pending package name if any.
    pub(crate) fn create_symbol_name(&mut self, name: &str, _location: &NodeLocation) {
        let pkg = self.ctx.package_names.pop();
        self.ctx.symbol_names.push(SymbolName::with_package(name, pkg));
    }

    /// Pushes the name of an action reached through a connector.
    pub(crate) fn create_connector_symbol_name(
        &mut self,
        connector: &str,
        action: &str,
        _location: &NodeLocation,
    ) {
        let pkg = self.ctx.package_names.pop();
        self.ctx
            .symbol_names
            .push(SymbolName::for_action(connector, action, pkg));
    }

    // -----------------------------------------------------------------
    // Packages and imports
    // -----------------------------------------------------------------

    pub(crate) fn create_package_name(&mut self, name: &str, _location: &NodeLocation) {
        self.ctx.package_names.push(name.to_string());
    }

    pub(crate) fn create_package_decl(&mut self, location: &NodeLocation) -> Result<(), BuildError> {
        let name = self.ctx.pop_package_name(location)?;
        self.package = Some(name.clone());
        self.file.package = Some(name);
        Ok(())
    }

    pub(crate) fn add_import_package(
        &mut self,
        alias: Option<&str>,
        location: &NodeLocation,
    ) -> Result<(), BuildError> {
        let path = self.ctx.pop_package_name(location)?;
        self.file
            .imports
            .push(ImportPackage::new(path, alias, location.clone()));
        Ok(())
    }

    // -----------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------

    /// Queues a type; unknown names are taken to be structs declared later.
    pub(crate) fn create_type(&mut self, name: &str, _location: &NodeLocation) {
        let ty = self.registry.resolve_or_struct(name);
        self.ctx.types.push_back(ty);
    }

    pub(crate) fn create_array_type(&mut self, element: &str, _location: &NodeLocation) {
        let ty = self.registry.array_of(element);
        self.ctx.types.push_back(ty);
    }

    pub(crate) fn register_connector_type(&mut self, name: &str, _location: &NodeLocation) {
        self.registry.register_connector(name);
    }

    /// Package name used to qualify top-level declarations.
    fn qualified(&self, name: &str) -> SymbolName {
        SymbolName::with_package(name, self.package.clone())
    }
}

pub(crate) fn aborted_error() -> BuildError {
    BuildError::structural("builder aborted by an earlier error", None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn at(line: u32) -> NodeLocation {
        NodeLocation::new("mod.bal", line)
    }

    #[test]
    fn empty_build_yields_empty_unit() {
        let unit = ModelBuilder::new().build().expect("build");
        assert_eq!(unit, CompilationUnit::default());
    }

    #[test]
    fn package_declaration_names_the_file() {
        let mut builder = ModelBuilder::new();
        builder.create_package_name("samples.echo", &at(1));
        builder.create_package_decl(&at(1)).expect("package");
        let unit = builder.build().expect("build");
        assert_eq!(unit.package.as_deref(), Some("samples.echo"));
    }

    #[test]
    fn imports_consume_package_names() {
        let mut builder = ModelBuilder::new();
        builder.create_package_name("ballerina.net.http", &at(2));
        builder.add_import_package(None, &at(2)).expect("import");
        builder.create_package_name("ballerina.lang.system", &at(3));
        builder.add_import_package(Some("sys"), &at(3)).expect("import");
        let unit = builder.build().expect("build");
        let names: Vec<_> = unit.imports.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["http", "sys"]);
        assert_eq!(unit.imports[1].path, "ballerina.lang.system");
    }

    #[test]
    fn import_without_package_name_is_structural() {
        let mut builder = ModelBuilder::new();
        let err = builder.add_import_package(None, &at(4)).unwrap_err();
        assert!(err.is_structural());
        assert_eq!(err.location(), Some(&at(4)));
    }

    #[test]
    fn unmatched_package_name_fails_the_build() {
        let mut builder = ModelBuilder::new();
        builder.create_package_name("dangling", &at(1));
        let err = builder.build().unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("package name"));
    }

    #[test]
    fn symbol_names_take_pending_package() {
        let mut builder = ModelBuilder::new();
        builder.create_package_name("system", &at(5));
        builder.create_symbol_name("println", &at(5));
        builder.create_symbol_name("local", &at(6));
        let local = builder.ctx.pop_symbol_name(&at(6)).expect("local");
        let println = builder.ctx.pop_symbol_name(&at(6)).expect("println");
        assert_eq!(local.pkg_path(), None);
        assert_eq!(println.qualified_name(), "system:println");
    }

    #[test]
    fn connector_symbol_names_carry_qualifier() {
        let mut builder = ModelBuilder::new();
        builder.create_package_name("http", &at(7));
        builder.create_connector_symbol_name("HTTPConnector", "get", &at(7));
        let name = builder.ctx.pop_symbol_name(&at(7)).expect("name");
        assert_eq!(name.qualified_name(), "http:HTTPConnector.get");
    }

    #[test]
    fn types_resolve_through_registry() {
        let mut builder = ModelBuilder::new();
        builder.create_type("int", &at(8));
        builder.create_type("Person", &at(8));
        builder.create_array_type("string", &at(8));
        builder.register_connector_type("Twitter", &at(9));
        builder.create_type("Twitter", &at(9));
        let queued: Vec<_> = builder.ctx.types.drain(..).collect();
        assert_eq!(
            queued,
            vec![
                Type::Int,
                Type::Struct("Person".into()),
                Type::array_of(Type::String),
                Type::Connector("Twitter".into()),
            ]
        );
        assert_eq!(
            builder.registry().lookup("Twitter"),
            Some(&Type::Connector("Twitter".into()))
        );
    }

    #[test]
    fn registry_is_handed_back_for_reuse() {
        let mut builder = ModelBuilder::new();
        builder.start_struct(&at(1)).expect("struct");
        builder.create_struct_definition("Invoice", false, &at(1)).expect("definition");
        let (unit, registry) = builder.into_parts().expect("build");
        assert_eq!(unit.structs.len(), 1);
        assert_eq!(registry.lookup("Invoice"), Some(&Type::Struct("Invoice".into())));

        let carried = ModelBuilder::with_registry(registry.clone());
        assert!(carried.registry().lookup("Invoice").is_some());

        let mut registry = registry;
        registry.reset();
        let fresh = ModelBuilder::with_registry(registry);
        assert_eq!(fresh.registry().lookup("Invoice"), None);
        assert_eq!(fresh.registry().lookup("int"), Some(&Type::Int));
    }

    #[test]
    fn aborted_builder_keeps_nothing() {
        let mut builder = ModelBuilder::new();
        builder.abort();
        assert!(builder.into_parts().unwrap_err().to_string().contains("aborted"));
    }

    #[test]
    fn leftover_types_fail_the_build() {
        let mut builder = ModelBuilder::new();
        builder.create_type("int", &at(1));
        assert!(builder.build().unwrap_err().is_structural());
    }
}

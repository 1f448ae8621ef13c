//! Qualified symbol names.
//!
//! A `SymbolName` couples a bare identifier with the package it lives in
//! and, for actions, the connector that owns it. Only the connector
//! qualifier may change after construction, and only once: actions are
//! built before their enclosing connector's name is known.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SymbolName {
    name: String,
    pkg_path: Option<String>,
    connector_name: Option<String>,
}

impl SymbolName {
    pub fn new(name: impl Into<String>) -> Self {
        SymbolName {
            name: name.into(),
            pkg_path: None,
            connector_name: None,
        }
    }

    pub fn with_package(name: impl Into<String>, pkg_path: Option<String>) -> Self {
        SymbolName {
            name: name.into(),
            pkg_path,
            connector_name: None,
        }
    }

    /// Name of an action reached through a connector, e.g. `http:HTTPConnector.get`.
    pub fn for_action(
        connector: impl Into<String>,
        action: impl Into<String>,
        pkg_path: Option<String>,
    ) -> Self {
        SymbolName {
            name: action.into(),
            pkg_path,
            connector_name: Some(connector.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pkg_path(&self) -> Option<&str> {
        self.pkg_path.as_deref()
    }

    pub fn connector_name(&self) -> Option<&str> {
        self.connector_name.as_deref()
    }

    /// Canonical `pkg:connector.name` form; absent parts are omitted.
    pub fn qualified_name(&self) -> String {
        let mut out = String::new();
        if let Some(pkg) = &self.pkg_path {
            out.push_str(pkg);
            out.push(':');
        }
        if let Some(connector) = &self.connector_name {
            out.push_str(connector);
            out.push('.');
        }
        out.push_str(&self.name);
        out
    }

    /// Stamps the owning connector onto an action name.
    ///
    /// Returns `false` and leaves the name untouched if a qualifier is
    /// already present.
    pub(crate) fn bind_connector(&mut self, connector: &str) -> bool {
        if self.connector_name.is_some() {
            return false;
        }
        self.connector_name = Some(connector.to_string());
        true
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

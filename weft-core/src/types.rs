//! Type descriptors and the per-build type registry.
//!
//! The registry maps type names to canonical `Type` values. It is owned
//! by one build and threaded through the builder explicitly; two builds
//! never share one.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Types of values and expressions in Weft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    // Built-in value types
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,

    // Built-in reference types
    Message,
    Map,
    Xml,
    Json,

    /// `T[]`, derived on demand from the element type's name.
    Array(Box<Type>),

    /// User-defined struct.
    ///
    /// May name a struct whose declaration has not been seen yet; such
    /// forward references are resolved by a later pass.
    Struct(String),

    /// User-defined connector.
    Connector(String),
}

/// Names seeded into every fresh registry.
fn primitives() -> [(&'static str, Type); 10] {
    [
        ("int", Type::Int),
        ("long", Type::Long),
        ("float", Type::Float),
        ("double", Type::Double),
        ("boolean", Type::Boolean),
        ("string", Type::String),
        ("message", Type::Message),
        ("map", Type::Map),
        ("xml", Type::Xml),
        ("json", Type::Json),
    ]
}

impl Type {
    pub fn array_of(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(_))
    }

    /// Source-level spelling of the type, e.g. `int[]`.
    pub fn name(&self) -> String {
        match self {
            Type::Int => "int".into(),
            Type::Long => "long".into(),
            Type::Float => "float".into(),
            Type::Double => "double".into(),
            Type::Boolean => "boolean".into(),
            Type::String => "string".into(),
            Type::Message => "message".into(),
            Type::Map => "map".into(),
            Type::Xml => "xml".into(),
            Type::Json => "json".into(),
            Type::Array(element) => format!("{}[]", element.name()),
            Type::Struct(name) | Type::Connector(name) => name.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Name-keyed table of known types.
///
/// Append-only within a build, first write wins. Conflicting
/// registrations are not reported here; detecting duplicate declarations
/// belongs to semantic analysis.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: HashMap<String, Type>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new()
    }
}

impl TypeRegistry {
    /// Creates a registry seeded with the primitive types.
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            entries: HashMap::new(),
        };
        registry.seed();
        registry
    }

    fn seed(&mut self) {
        for (name, ty) in primitives() {
            self.entries.insert(name.to_string(), ty);
        }
    }

    /// Drops every user registration and restores the primitive seed.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.seed();
    }

    /// Looks up a type by name. `None` means "not known yet".
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.entries.get(name)
    }

    /// Resolves `name`, assuming a not-yet-declared struct on a miss.
    pub fn resolve_or_struct(&self, name: &str) -> Type {
        self.lookup(name)
            .cloned()
            .unwrap_or_else(|| Type::Struct(name.to_string()))
    }

    /// Returns `element[]`, memoizing it under that name.
    pub fn array_of(&mut self, element: &str) -> Type {
        let key = format!("{element}[]");
        if let Some(ty) = self.entries.get(&key) {
            return ty.clone();
        }
        let ty = Type::array_of(self.resolve_or_struct(element));
        self.entries.insert(key, ty.clone());
        ty
    }

    /// Registers a user struct. Returns `false` if the name was taken.
    pub fn register_struct(&mut self, name: &str) -> bool {
        self.register(name, Type::Struct(name.to_string()))
    }

    /// Registers a user connector. Returns `false` if the name was taken.
    pub fn register_connector(&mut self, name: &str) -> bool {
        self.register(name, Type::Connector(name.to_string()))
    }

    fn register(&mut self, name: &str, ty: Type) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), ty);
        true
    }
}

//! Introspection capabilities consumed by the descriptor builders.
//!
//! [`Introspectable`] is the seam: anything that can report its class shape
//! and read/write fields by name can be described. [`Record`] is the
//! schema-registered implementation used by the CLI and by serializers that
//! need to build instances of types they only know by name, via
//! [`Registry`].

use crate::error::{Error, Result};
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Declared shape of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    /// Raw documentation attached to the field, possibly empty.
    pub doc: String,
    /// Statically declared type, if the language or schema gave one.
    pub declared_type: Option<String>,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn declared(mut self, ty: impl Into<String>) -> Self {
        self.declared_type = Some(ty.into());
        self
    }
}

/// Declared shape of a model type: simple name, namespace, class
/// documentation and fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub namespace: String,
    pub doc: String,
    pub fields: Vec<FieldInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    /// `namespace::Name`, or just `Name` at the root namespace.
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

pub(crate) fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", namespace, name)
    }
}

/// A model instance whose shape and fields can be inspected by name.
pub trait Introspectable {
    fn class_info(&self) -> &ClassInfo;

    /// Current value of `field`; `None` if it was never assigned.
    fn field_value(&self, field: &str) -> Option<Value>;

    fn set_field_value(&mut self, field: &str, value: Value) -> Result<()>;
}

/// Produces blank instances of a type known only by name.
pub trait InstanceProvider {
    type Instance: Introspectable;
    type Error: std::error::Error;

    /// A new instance with every field unassigned.
    fn instantiate(&self, type_name: &str) -> Result<Self::Instance, Self::Error>;
}

/// Instance of a registered [`ClassInfo`]; fields start out unassigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(skip)]
    class: Arc<ClassInfo>,
    #[serde(flatten)]
    values: IndexMap<String, Value>,
}

impl Record {
    pub fn new(class: Arc<ClassInfo>) -> Self {
        Self {
            class,
            values: IndexMap::new(),
        }
    }

    pub fn class(&self) -> &Arc<ClassInfo> {
        &self.class
    }

    /// Assigned fields in assignment order.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }
}

impl Introspectable for Record {
    fn class_info(&self) -> &ClassInfo {
        &self.class
    }

    fn field_value(&self, field: &str) -> Option<Value> {
        self.values.get(field).cloned()
    }

    fn set_field_value(&mut self, field: &str, value: Value) -> Result<()> {
        if !self.class.fields.iter().any(|f| f.name == field) {
            return Err(Error::invalid(format!(
                "{} has no field {}",
                self.class.qualified_name(),
                field
            )));
        }
        self.values.insert(field.to_string(), value);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("type {0} is not registered")]
    UnknownType(String),
    #[error("type name {0} is ambiguous; qualify it with its namespace")]
    Ambiguous(String),
}

/// Model types known by qualified name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    classes: IndexMap<String, Arc<ClassInfo>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class`, replacing any earlier type with the same
    /// qualified name.
    pub fn register(&mut self, class: ClassInfo) -> Arc<ClassInfo> {
        let class = Arc::new(class);
        self.classes.insert(class.qualified_name(), class.clone());
        class
    }

    /// Find a type by qualified name, falling back to a unique simple name.
    pub fn lookup(&self, type_name: &str) -> Result<&Arc<ClassInfo>, RegistryError> {
        let type_name = type_name.trim_start_matches("::");
        if let Some(class) = self.classes.get(type_name) {
            return Ok(class);
        }
        let mut matches = self.classes.values().filter(|c| c.name == type_name);
        match (matches.next(), matches.next()) {
            (Some(class), None) => Ok(class),
            (Some(_), Some(_)) => Err(RegistryError::Ambiguous(type_name.to_string())),
            _ => Err(RegistryError::UnknownType(type_name.to_string())),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassInfo>> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl InstanceProvider for Registry {
    type Instance = Record;
    type Error = RegistryError;

    fn instantiate(&self, type_name: &str) -> Result<Record, RegistryError> {
        self.lookup(type_name).map(|class| Record::new(class.clone()))
    }
}

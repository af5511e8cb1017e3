//! Per-type descriptor: root element name, encoding and ordered properties.

use crate::annotation::{self, AnnotationTable, AnnotationTag};
use crate::error::{Error, Result};
use crate::introspect::{InstanceProvider, Introspectable};
use crate::property::ModelProperty;
use crate::value::Value;
use serde::Serialize;
use tracing::debug;

/// Descriptor for a model type, built from one of its instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelClass {
    class_name: String,
    namespace: String,
    root_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    root_encoding: Option<String>,
    properties: Vec<ModelProperty>,
    #[serde(skip)]
    annotations: AnnotationTable,
}

impl ModelClass {
    /// Describe the type of `model` and each of its fields, in declaration
    /// order.
    ///
    /// Fails with [`Error::InvalidInput`] when the type has no fields or a
    /// field is malformed; no partial descriptor is returned.
    pub fn build(model: &dyn Introspectable) -> Result<Self> {
        let info = model.class_info();
        let class_name = info.qualified_name();
        let annotations = annotation::parse(info.doc.as_str());

        if info.fields.is_empty() {
            return Err(Error::invalid(format!(
                "the model class {} has no properties defined",
                class_name
            )));
        }

        let root_name = annotations
            .first_non_empty(AnnotationTag::XmlRoot)
            .map(str::to_string)
            .unwrap_or_else(|| lower_first(&info.name));
        let root_encoding = annotations
            .first_non_empty(AnnotationTag::XmlEncoding)
            .map(str::to_string);

        let properties = info
            .fields
            .iter()
            .map(|field| ModelProperty::build(field, model, &info.namespace))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            class = %class_name,
            root = %root_name,
            properties = properties.len(),
            "built model descriptor"
        );

        Ok(Self {
            class_name,
            namespace: info.namespace.clone(),
            root_name,
            root_encoding,
            properties,
            annotations,
        })
    }

    /// Describe a dynamic value, which must be a model instance.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(record) => Self::build(record),
            other => Err(Error::invalid(format!(
                "a model must be an object, got {}",
                other.kind_name()
            ))),
        }
    }

    /// A blank instance of `type_name`, for a decoder to fill in through
    /// [`ModelProperty::set_value`].
    pub fn instantiate<P: InstanceProvider>(provider: &P, type_name: &str) -> Result<P::Instance> {
        provider.instantiate(type_name).map_err(|e| {
            Error::invalid(format!("could not instantiate model {}: {}", type_name, e))
        })
    }

    /// Namespace-qualified type name.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Documented `@xmlEncoding`, passed through unchecked.
    pub fn root_encoding(&self) -> Option<&str> {
        self.root_encoding.as_deref()
    }

    pub fn properties(&self) -> &[ModelProperty] {
        &self.properties
    }

    /// Look up a property by declared name.
    pub fn property(&self, declared_name: &str) -> Option<&ModelProperty> {
        self.properties
            .iter()
            .find(|p| p.declared_name() == declared_name)
    }

    pub fn annotations(&self) -> &AnnotationTable {
        &self.annotations
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

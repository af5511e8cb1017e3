//! Per-field descriptor: external name, type, requiredness and rules.

use crate::annotation::{self, AnnotationTable, AnnotationTag};
use crate::error::{Error, Result};
use crate::introspect::{FieldInfo, Introspectable};
use crate::types::TypeDescriptor;
use crate::value::{ScalarKind, Value};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

// identifier, then an optional parenthesized argument list closing the text
static RE_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)[[:space:]]*(?:\(([^()]*)\))?$").unwrap()
});

/// A validation directive from `@rule name(arg, ...)`. Not evaluated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSpec {
    rule_name: String,
    args: Vec<String>,
}

impl RuleSpec {
    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    /// Arguments as written, trimmed; empty for a bare rule.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Split `@rule` text into a name and its comma-separated arguments.
    ///
    /// Text that is not `identifier` or `identifier(args)` (unbalanced or
    /// nested parentheses, trailing garbage) keeps only the leading name
    /// and drops the arguments.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(caps) = RE_RULE.captures(text) {
            let args = match caps.get(2) {
                Some(list) if !list.as_str().trim().is_empty() => list
                    .as_str()
                    .split(',')
                    .map(|arg| arg.trim().to_string())
                    .collect(),
                _ => Vec::new(),
            };
            return Self {
                rule_name: caps[1].to_string(),
                args,
            };
        }

        let end = text
            .find(|c: char| c == '(' || c.is_whitespace())
            .unwrap_or(text.len());
        Self {
            rule_name: text[..end].to_string(),
            args: Vec::new(),
        }
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.rule_name)
        } else {
            write!(f, "{}({})", self.rule_name, self.args.join(", "))
        }
    }
}

/// Descriptor for one field of a model type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelProperty {
    declared_name: String,
    external_name: String,
    #[serde(rename = "type")]
    ty: TypeDescriptor,
    is_required: bool,
    required_contexts: Vec<String>,
    rule_specs: Vec<RuleSpec>,
    is_attribute: bool,
    parent_class_name: String,
    #[serde(skip)]
    annotations: AnnotationTable,
}

impl ModelProperty {
    /// Describe `field` of `instance`.
    ///
    /// `instance` supplies the runtime kind of untyped fields and the parent
    /// class name; `parent_namespace` anchors unqualified class types.
    pub fn build(
        field: &FieldInfo,
        instance: &dyn Introspectable,
        parent_namespace: &str,
    ) -> Result<Self> {
        if field.name.trim().is_empty() {
            return Err(Error::invalid(format!(
                "field of {} has no name",
                instance.class_info().qualified_name()
            )));
        }

        let annotations = annotation::parse(field.doc.as_str());

        let external_name = annotations
            .first_non_empty(AnnotationTag::Name)
            .or_else(|| annotations.first_non_empty(AnnotationTag::Alias))
            .unwrap_or(&field.name)
            .to_string();

        let runtime_kind = instance
            .field_value(&field.name)
            .map(|v| v.kind_name())
            .unwrap_or("null");
        let ty = TypeDescriptor::build(
            field.declared_type.as_deref(),
            runtime_kind,
            annotations.first(AnnotationTag::Var),
            parent_namespace,
        );

        let required_contexts = annotations.get(AnnotationTag::Required).to_vec();
        let rule_specs = annotations
            .get(AnnotationTag::Rule)
            .iter()
            .map(|text| RuleSpec::parse(text))
            .collect();

        Ok(Self {
            declared_name: field.name.clone(),
            external_name,
            ty,
            is_required: annotations.has(AnnotationTag::Required),
            required_contexts,
            rule_specs,
            is_attribute: annotations.has(AnnotationTag::Attribute),
            parent_class_name: instance.class_info().qualified_name(),
            annotations,
        })
    }

    /// Field name as declared on the model.
    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    /// Name used on the wire: `@name`, else `@alias`, else the declared name.
    pub fn external_name(&self) -> &str {
        &self.external_name
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Raw `@required` arguments; `""` means required in every context.
    pub fn required_contexts(&self) -> &[String] {
        &self.required_contexts
    }

    pub fn rule_specs(&self) -> &[RuleSpec] {
        &self.rule_specs
    }

    /// Whether the field maps to an attribute rather than a child element.
    pub fn is_attribute(&self) -> bool {
        self.is_attribute
    }

    pub fn parent_class_name(&self) -> &str {
        &self.parent_class_name
    }

    pub fn annotations(&self) -> &AnnotationTable {
        &self.annotations
    }

    /// Read the field from `instance`; `None` if it was never assigned.
    pub fn value(&self, instance: &dyn Introspectable) -> Option<Value> {
        instance.field_value(&self.declared_name)
    }

    /// Assign `value` to the field on `instance`, coercing it to the field's
    /// type first.
    ///
    /// Scalars are coerced when the type is a built-in kind; arrays are
    /// coerced element by element when the type is `kind[]`. Class-typed
    /// and untyped fields take the value as-is.
    pub fn set_value(&self, instance: &mut dyn Introspectable, value: Value) -> Result<()> {
        let class_name = instance.class_info().qualified_name();
        if class_name != self.parent_class_name {
            return Err(Error::invalid(format!(
                "{}.{} cannot be assigned on an instance of {}",
                self.parent_class_name, self.declared_name, class_name
            )));
        }
        let value = self.coerce(value)?;
        instance.set_field_value(&self.declared_name, value)
    }

    fn coerce(&self, value: Value) -> Result<Value> {
        let Some(kind) = self.coercion_kind() else {
            return Ok(value);
        };
        let value = match value {
            Value::Array(items) if self.ty.is_array() => Value::Array(
                items
                    .into_iter()
                    .map(|item| coerce_scalar(kind, item))
                    .collect::<Result<_>>()?,
            ),
            scalar if !self.ty.is_array() => coerce_scalar(kind, scalar)?,
            other => other,
        };
        Ok(value)
    }

    fn coercion_kind(&self) -> Option<ScalarKind> {
        if self.ty.is_untyped() {
            return None;
        }
        self.ty.scalar_kind()
    }
}

fn coerce_scalar(kind: ScalarKind, value: Value) -> Result<Value> {
    if value.is_scalar() {
        Ok(kind.coerce(value)?)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{ClassInfo, Record};
    use std::sync::Arc;

    fn record(fields: Vec<FieldInfo>) -> Record {
        let class = fields
            .into_iter()
            .fold(ClassInfo::new("Order").namespace("shop"), ClassInfo::field);
        Record::new(Arc::new(class))
    }

    fn property(doc: &str) -> ModelProperty {
        let field = FieldInfo::new("total").doc(doc);
        let instance = record(vec![field.clone()]);
        ModelProperty::build(&field, &instance, "shop").unwrap()
    }

    #[test]
    fn rule_with_arguments() {
        let rule = RuleSpec::parse("email(10, 99, asdf)");
        assert_eq!(rule.rule_name(), "email");
        assert_eq!(rule.args(), ["10", "99", "asdf"]);
    }

    #[test]
    fn rule_without_parentheses() {
        let rule = RuleSpec::parse("email");
        assert_eq!(rule.rule_name(), "email");
        assert!(rule.args().is_empty());
        assert!(RuleSpec::parse("required( )").args().is_empty());
    }

    #[test]
    fn malformed_rule_keeps_name_only() {
        for text in ["between(1, 2", "between(1, (2))", "between(1) extra", "between 1 2"] {
            let rule = RuleSpec::parse(text);
            assert_eq!(rule.rule_name(), "between", "{}", text);
            assert!(rule.args().is_empty(), "{}", text);
        }
        assert_eq!(RuleSpec::parse("").rule_name(), "");
    }

    #[test]
    fn rule_display() {
        assert_eq!(RuleSpec::parse("between( 1 ,2 )").to_string(), "between(1, 2)");
        assert_eq!(RuleSpec::parse("email").to_string(), "email");
    }

    #[test]
    fn name_beats_alias() {
        let prop = property("@alias bar\n@name foo");
        assert_eq!(prop.external_name(), "foo");
        assert_eq!(prop.declared_name(), "total");
    }

    #[test]
    fn alias_when_no_name() {
        assert_eq!(property("@alias bar").external_name(), "bar");
        assert_eq!(property("@name\n@alias bar").external_name(), "bar");
        assert_eq!(property("@name").external_name(), "total");
    }

    #[test]
    fn bare_required() {
        let prop = property("@required\n@var boolean");
        assert!(prop.is_required());
        assert_eq!(prop.required_contexts(), [""]);
    }

    #[test]
    fn required_contexts_in_order() {
        let prop = property("@required create\n@required update");
        assert_eq!(prop.required_contexts(), ["create", "update"]);
        assert!(!property("@var string").is_required());
        assert!(property("@var string").required_contexts().is_empty());
    }

    #[test]
    fn duplicate_rules_are_kept() {
        let prop = property("@rule string\n@rule email\n@rule string");
        let names: Vec<_> = prop.rule_specs().iter().map(|r| r.rule_name()).collect();
        assert_eq!(names, ["string", "email", "string"]);
    }

    #[test]
    fn attribute_flag() {
        assert!(property("@attribute\n@var string").is_attribute());
        assert!(!property("@var string").is_attribute());
    }

    #[test]
    fn nameless_field_is_invalid() {
        let field = FieldInfo::new(" ");
        let instance = record(vec![FieldInfo::new("total")]);
        let err = ModelProperty::build(&field, &instance, "shop").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn untyped_field_uses_current_value_kind() {
        let field = FieldInfo::new("total");
        let mut instance = record(vec![field.clone()]);
        instance.set_field_value("total", Value::Int(3)).unwrap();
        let prop = ModelProperty::build(&field, &instance, "shop").unwrap();
        assert!(prop.ty().is_untyped());
        assert_eq!(prop.ty().runtime_kind(), "integer");
        assert_eq!(prop.parent_class_name(), "shop::Order");
    }

    #[test]
    fn set_value_coerces_scalars() {
        let field = FieldInfo::new("total").doc("@var integer");
        let mut instance = record(vec![field.clone()]);
        let prop = ModelProperty::build(&field, &instance, "shop").unwrap();
        prop.set_value(&mut instance, "5".into()).unwrap();
        assert_eq!(prop.value(&instance), Some(Value::Int(5)));
    }

    #[test]
    fn set_value_coerces_array_elements() {
        let field = FieldInfo::new("total").doc("@var integer[]|null");
        let mut instance = record(vec![field.clone()]);
        let prop = ModelProperty::build(&field, &instance, "shop").unwrap();
        prop.set_value(&mut instance, vec!["1", "2"].into()).unwrap();
        assert_eq!(prop.value(&instance), Some(vec![1, 2].into()));
        prop.set_value(&mut instance, Value::Null).unwrap();
        assert_eq!(prop.value(&instance), Some(Value::Null));
    }

    #[test]
    fn class_typed_values_pass_through() {
        let field = FieldInfo::new("total").doc("@var Money");
        let mut instance = record(vec![field.clone()]);
        let prop = ModelProperty::build(&field, &instance, "shop").unwrap();
        prop.set_value(&mut instance, "12.50 EUR".into()).unwrap();
        assert_eq!(prop.value(&instance), Some("12.50 EUR".into()));
    }

    #[test]
    fn absent_is_not_falsy() {
        let field = FieldInfo::new("total").doc("@var integer");
        let mut instance = record(vec![field.clone()]);
        let prop = ModelProperty::build(&field, &instance, "shop").unwrap();
        assert_eq!(prop.value(&instance), None);
        prop.set_value(&mut instance, Value::Int(0)).unwrap();
        assert_eq!(prop.value(&instance), Some(Value::Int(0)));
    }

    #[test]
    fn failed_coercion_leaves_field_unassigned() {
        let field = FieldInfo::new("total").doc("@var float");
        let mut instance = record(vec![field.clone()]);
        let prop = ModelProperty::build(&field, &instance, "shop").unwrap();
        let err = prop.set_value(&mut instance, "lots".into()).unwrap_err();
        assert!(matches!(err, Error::Coercion(_)));
        assert_eq!(prop.value(&instance), None);
    }

    #[test]
    fn set_value_rejects_foreign_instance() {
        let field = FieldInfo::new("total");
        let instance = record(vec![field.clone()]);
        let prop = ModelProperty::build(&field, &instance, "shop").unwrap();
        let mut other = Record::new(Arc::new(ClassInfo::new("Invoice").field(field)));
        assert!(prop.set_value(&mut other, Value::Int(1)).is_err());
    }
}

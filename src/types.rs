//! Type reconciliation between a field's declared type and its `@var`
//! documentation.

use crate::introspect::qualify;
use crate::value::ScalarKind;
use serde::Serialize;
use std::fmt;

/// Base type of a field with neither a declared nor a documented type.
pub const ANY: &str = "any";
/// Base type left behind when a documented type is only `null`.
pub const NULL: &str = "null";

/// Normalized description of a field's type.
///
/// `base_type` never carries nullable (`|null`, `?`) or array (`[]`)
/// markers; those are reported through `is_nullable` and `is_array`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    base_type: String,
    runtime_kind: String,
    is_array: bool,
    is_nullable: bool,
    is_untyped: bool,
    source_namespace: String,
}

impl TypeDescriptor {
    /// Reconcile a declared type with a documented one.
    ///
    /// A non-empty `documented` type always wins. Without either,
    /// the descriptor is untyped: `base_type` is [`ANY`] and
    /// `runtime_fallback_kind` (the kind of the field's current value) is
    /// kept as `runtime_kind`.
    pub fn build(
        declared: Option<&str>,
        runtime_fallback_kind: &str,
        documented: Option<&str>,
        namespace: &str,
    ) -> Self {
        let declared = declared.map(strip_whitespace).filter(|t| !t.is_empty());
        let documented = documented.map(strip_whitespace).filter(|t| !t.is_empty());

        let runtime_kind = declared
            .clone()
            .unwrap_or_else(|| runtime_fallback_kind.to_string());
        let is_untyped = declared.is_none() && documented.is_none();
        let raw = documented.or(declared).unwrap_or_else(|| ANY.to_string());

        // nullable union first, so `string[]|null` is a nullable array
        let (without_null, is_nullable) = strip_nullable(&raw);
        let (base_type, is_array) = match without_null.strip_suffix("[]") {
            Some(element) => (element.to_string(), true),
            None => (without_null, false),
        };

        Self {
            base_type,
            runtime_kind,
            is_array,
            is_nullable,
            is_untyped,
            source_namespace: namespace.to_string(),
        }
    }

    /// Element type name, e.g. `string` for `string[]|null`.
    pub fn base_type(&self) -> &str {
        &self.base_type
    }

    /// Declared type, or the kind of the current value for untyped fields.
    pub fn runtime_kind(&self) -> &str {
        &self.runtime_kind
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_nullable(&self) -> bool {
        self.is_nullable
    }

    pub fn is_untyped(&self) -> bool {
        self.is_untyped
    }

    /// Namespace of the model the field belongs to.
    pub fn source_namespace(&self) -> &str {
        &self.source_namespace
    }

    /// True when the documented type was only `null`; such a descriptor
    /// carries no usable type.
    pub fn is_null_marker(&self) -> bool {
        self.base_type.eq_ignore_ascii_case(NULL)
    }

    /// Coercible kind of the base type, if it is one of the built-in kinds.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        ScalarKind::from_type_name(&self.base_type)
    }

    /// Namespace-qualified class name for model-typed fields.
    ///
    /// Unqualified names are taken relative to the enclosing namespace. The
    /// type is not looked up.
    pub fn class_name(&self) -> Option<String> {
        let base = self.base_type.as_str();
        if self.is_untyped
            || self.is_null_marker()
            || self.scalar_kind().is_some()
            || base.contains('|')
        {
            return None;
        }
        match base.strip_prefix("::") {
            Some(absolute) => Some(absolute.to_string()),
            None if base.contains("::") => Some(base.to_string()),
            None => Some(qualify(&self.source_namespace, base)),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    /// `string[]|null` style, with `?` marking untyped fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_untyped {
            return write!(f, "{}?", ANY);
        }
        f.write_str(&self.base_type)?;
        if self.is_array {
            f.write_str("[]")?;
        }
        if self.is_nullable && !self.is_null_marker() {
            f.write_str("|null")?;
        }
        Ok(())
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Remove every `null` member from a `|` union, and a leading `?`.
///
/// Members are compared whole and case-insensitively, so `nullable` stays.
fn strip_nullable(raw: &str) -> (String, bool) {
    let (raw, mut nullable) = match raw.strip_prefix('?') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };

    let members: Vec<&str> = raw
        .split('|')
        .filter(|member| {
            let is_null = member.eq_ignore_ascii_case(NULL);
            nullable |= is_null;
            !is_null
        })
        .collect();

    if members.is_empty() {
        (NULL.to_string(), nullable)
    } else {
        (members.join("|"), nullable)
    }
}

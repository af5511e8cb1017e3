//! GitHub-flavored markdown renderer — one section and table per model.

use crate::render::Renderer;
use anyhow::Result;
use modeldoc::{ModelClass, ModelProperty};

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, models: &[ModelClass]) -> Result<String> {
        let mut output = String::new();

        if models.len() > 1 {
            output.push_str("## Index\n\n");
            for model in models {
                output.push_str(&format!("* [{}](#{})\n", model.class_name(), anchor(model)));
            }
            output.push('\n');
        }

        for model in models {
            output.push_str(&render_model(model));
            output.push('\n');
        }

        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

fn render_model(model: &ModelClass) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("### {}\n", model.class_name()));
    lines.push(format!("* Root element: `{}`", model.root_name()));
    if let Some(encoding) = model.root_encoding() {
        lines.push(format!("* Encoding: `{}`", encoding));
    }
    lines.push(String::new());

    lines.push("| Field | Name | Type | Required | Rules |".to_string());
    lines.push("|---|---|---|---|---|".to_string());
    for prop in model.properties() {
        lines.push(render_property(prop));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_property(prop: &ModelProperty) -> String {
    let name = if prop.is_attribute() {
        format!("@{}", prop.external_name())
    } else {
        prop.external_name().to_string()
    };
    let rules: Vec<String> = prop.rule_specs().iter().map(|r| format!("`{}`", r)).collect();
    format!(
        "| {} | {} | `{}` | {} | {} |",
        prop.declared_name(),
        name,
        prop.ty().to_string().replace('|', "\\|"),
        required_cell(prop),
        rules.join(", ")
    )
}

/// "yes" for unconditional, the context list otherwise.
fn required_cell(prop: &ModelProperty) -> String {
    if !prop.is_required() {
        return String::new();
    }
    let contexts: Vec<&str> = prop
        .required_contexts()
        .iter()
        .map(String::as_str)
        .filter(|c| !c.is_empty())
        .collect();
    if contexts.len() < prop.required_contexts().len() || contexts.is_empty() {
        "yes".to_string()
    } else {
        contexts.join(", ")
    }
}

/// GitHub heading anchor for `### shop::Order` → `shoporder`.
fn anchor(model: &ModelClass) -> String {
    model
        .class_name()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeldoc::{ClassInfo, FieldInfo, Record};
    use std::sync::Arc;

    fn model(name: &str, fields: Vec<FieldInfo>) -> ModelClass {
        let class = fields
            .into_iter()
            .fold(ClassInfo::new(name).namespace("shop"), ClassInfo::field);
        ModelClass::build(&Record::new(Arc::new(class))).unwrap()
    }

    #[test]
    fn renders_property_table() {
        let out = MarkdownRenderer
            .render(&[model(
                "Order",
                vec![
                    FieldInfo::new("id").doc("@name orderId\n@required\n@attribute"),
                    FieldInfo::new("tags").doc("@var string[]|null\n@rule length(1, 20)\n@required create"),
                ],
            )])
            .unwrap();
        assert!(out.contains("### shop::Order"));
        assert!(out.contains("* Root element: `order`"));
        assert!(out.contains("| id | @orderId | `any?` | yes |  |"));
        assert!(out.contains("| tags | tags | `string[]\\|null` | create | `length(1, 20)` |"));
        assert!(!out.contains("## Index"));
    }

    #[test]
    fn index_for_multiple_models() {
        let out = MarkdownRenderer
            .render(&[
                model("Order", vec![FieldInfo::new("id")]),
                model("Item", vec![FieldInfo::new("sku")]),
            ])
            .unwrap();
        assert!(out.starts_with("## Index\n\n* [shop::Order](#shoporder)\n"));
    }

    #[test]
    fn mixed_required_contexts_are_unconditional() {
        let m = model("Order", vec![FieldInfo::new("id").doc("@required\n@required update")]);
        assert_eq!(required_cell(&m.properties()[0]), "yes");
    }
}

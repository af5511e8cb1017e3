//! Rust source scanner — turns annotated structs into [`ClassInfo`]s.
//!
//! Extracts from `.rs` files:
//! - `///` runs and `/** ... */` blocks before a `struct` → class doc
//! - the same before a named field → field doc
//! - the field's Rust type → declared type hint (`Option<Vec<u32>>` →
//!   `integer[]|null`)
//!
//! Tuple and unit structs are reported with no fields.

use crate::introspect::{ClassInfo, FieldInfo};
use regex::Regex;
use std::sync::LazyLock;

static RE_DOC_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^///(?:[^/]|$)").unwrap());

static RE_STRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?struct\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:<[^{;(]*>)?\s*(\{|\(|;)?")
        .unwrap()
});

static RE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?(?:r#)?([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(.+?)\s*,?$").unwrap()
});

#[derive(Default)]
struct ScanState {
    classes: Vec<ClassInfo>,
    // doc lines collected since the last item
    doc: Vec<String>,
    in_block_doc: bool,
    // struct whose body is being read
    current: Option<ClassInfo>,
    // struct header seen, `{` expected on a later line
    pending: Option<ClassInfo>,
}

impl ScanState {
    fn take_doc(&mut self) -> String {
        let doc = self.doc.join("\n");
        self.doc.clear();
        doc
    }
}

/// Scan Rust source for structs; every class is placed in `namespace`.
pub fn parse(input: &str, namespace: &str) -> Vec<ClassInfo> {
    let mut s = ScanState::default();

    for line in input.lines() {
        process_line(&mut s, line.trim(), namespace);
    }

    if let Some(class) = s.current.take().or_else(|| s.pending.take()) {
        s.classes.push(class);
    }
    s.classes
}

fn process_line(s: &mut ScanState, line: &str, namespace: &str) {
    // 1. inside a /** ... */ block
    if s.in_block_doc {
        s.doc.push(line.to_string());
        if line.ends_with("*/") {
            s.in_block_doc = false;
        }
        return;
    }
    if line.starts_with("/**") && !line.starts_with("/**/") {
        s.doc.push(line.to_string());
        s.in_block_doc = !line[3..].ends_with("*/");
        return;
    }

    // 2. /// doc comment
    if RE_DOC_LINE.is_match(line) {
        s.doc.push(line.to_string());
        return;
    }

    // 3. attributes and blank lines keep the pending doc
    if line.is_empty() || line.starts_with("#[") {
        return;
    }

    // 4. plain comments are skipped without touching the doc
    if line.starts_with("//") {
        return;
    }

    // 5. struct header whose body starts on a later line (where clauses)
    if let Some(class) = s.pending.take() {
        if line.starts_with('{') || line.ends_with('{') {
            s.current = Some(class);
        } else if line.starts_with('(') || line.ends_with(';') {
            s.classes.push(class);
        } else {
            s.pending = Some(class);
        }
        return;
    }

    // 6. inside a struct body
    if s.current.is_some() {
        if line.starts_with('}') {
            if let Some(class) = s.current.take() {
                s.classes.push(class);
            }
            s.doc.clear();
            return;
        }
        let code = line.find("//").map_or(line, |i| line[..i].trim_end());
        let doc = s.take_doc();
        if let (Some(field), Some(class)) = (parse_field(code, doc), s.current.as_mut()) {
            class.fields.push(field);
        }
        return;
    }

    // 7. struct declaration
    if let Some(caps) = RE_STRUCT.captures(line) {
        let class = ClassInfo::new(&caps[1])
            .namespace(namespace)
            .doc(s.take_doc());
        let rest = caps.get(2).map_or("", |m| &line[m.end()..]);
        match caps.get(2).map(|m| m.as_str()) {
            // `struct Point { x: u8, y: u8 }` on a single line
            Some("{") => {
                let code = rest.find("//").map_or(rest, |i| &rest[..i]);
                let (body, closed) = match code.rfind('}') {
                    Some(end) => (&code[..end], true),
                    None => (code, false),
                };
                let mut class = class;
                class
                    .fields
                    .extend(split_fields(body).filter_map(|f| parse_field(f, String::new())));
                if closed {
                    s.classes.push(class);
                } else {
                    s.current = Some(class);
                }
            }
            Some(_) => s.classes.push(class),
            None if line.ends_with('{') => s.current = Some(class),
            None if line.ends_with(';') => s.classes.push(class),
            None => s.pending = Some(class),
        }
        return;
    }

    // any other item ends the doc run
    s.doc.clear();
}

fn parse_field(code: &str, doc: String) -> Option<FieldInfo> {
    let caps = RE_FIELD.captures(code.trim())?;
    let mut field = FieldInfo::new(&caps[1]).doc(doc);
    field.declared_type = rust_type_hint(&caps[2]);
    Some(field)
}

/// Split `x: u8, m: HashMap<String, u8>` at top-level commas only.
fn split_fields(body: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0i32;
    let mut start = 0;
    let mut parts = Vec::new();
    for (i, c) in body.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts.into_iter().map(str::trim).filter(|p| !p.is_empty())
}

/// Map a Rust field type to a documented-style type hint.
///
/// Returns `None` for types that carry no usable type (`serde_json::Value`,
/// trait objects), leaving the field untyped unless `@var` says otherwise.
pub fn rust_type_hint(ty: &str) -> Option<String> {
    let ty = ty.trim().trim_start_matches('&');
    let ty = strip_lifetime(ty).trim_start();
    let ty = ty.strip_prefix("mut ").unwrap_or(ty).trim_start();

    if ty.starts_with("dyn ") || ty.starts_with("impl ") || ty.starts_with('(') {
        return None;
    }

    if let Some(inner) = ty.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        let element = inner.split(';').next().unwrap_or(inner);
        return rust_type_hint(element).map(array_of);
    }

    let (outer, inner) = split_generic(ty);
    let outer = outer.rsplit("::").next().unwrap_or(outer).trim();
    match (outer, inner) {
        ("Option", Some(inner)) => rust_type_hint(inner).map(|t| format!("{}|null", t)),
        ("Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "IndexSet", Some(inner)) => {
            rust_type_hint(inner).map(array_of)
        }
        ("Box" | "Arc" | "Rc" | "Cow", Some(inner)) => rust_type_hint(inner),
        ("HashMap" | "BTreeMap" | "IndexMap" | "Map", _) => Some("object".to_string()),
        ("String" | "str" | "char", _) => Some("string".to_string()),
        ("bool", _) => Some("boolean".to_string()),
        ("f32" | "f64", _) => Some("float".to_string()),
        ("i8" | "i16" | "i32" | "i64" | "i128" | "isize", _)
        | ("u8" | "u16" | "u32" | "u64" | "u128" | "usize", _) => Some("integer".to_string()),
        ("Value", _) => None,
        _ => {
            let path = ty.split('<').next().unwrap_or(ty).trim();
            Some(path.trim_start_matches("crate::").to_string())
        }
    }
}

fn array_of(element: String) -> String {
    // an element's own `|null` cannot be expressed on a `T[]` hint
    let element = element.strip_suffix("|null").unwrap_or(&element);
    format!("{}[]", element)
}

fn strip_lifetime(ty: &str) -> &str {
    match ty.strip_prefix('\'') {
        Some(rest) => {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            &rest[end..]
        }
        None => ty,
    }
}

/// `Vec<Option<u8>>` → (`Vec`, `Some("Option<u8>")`).
fn split_generic(ty: &str) -> (&str, Option<&str>) {
    match (ty.find('<'), ty.rfind('>')) {
        (Some(open), Some(close)) if close > open => {
            (&ty[..open], Some(ty[open + 1..close].trim()))
        }
        _ => (ty, None),
    }
}

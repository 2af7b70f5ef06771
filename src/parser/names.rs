//! Name resolution over Python expressions.
//!
//! Base classes, decorators, callees and annotations are reduced to a
//! dotted textual name. Expressions with no such reading (subscripts,
//! lambdas, f-strings, ...) resolve to `None`; callers skip them.

use tree_sitter::Node;

/// Source text of a node, or `""` for invalid UTF-8.
pub fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Text of a field child, if present and non-empty.
pub fn field_text(node: Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| node_text(n, source).to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve an expression to a dotted name.
///
/// - `Base` -> `Base`
/// - `pkg.Base` -> `pkg.Base` (chains resolve recursively)
/// - `factory(x)` -> `factory` (arguments ignored)
/// - `"text"`, `42`, `None` -> their literal value
pub fn resolve_name(node: Node, source: &[u8]) -> Option<String> {
    let name = match node.kind() {
        "identifier" => node_text(node, source).to_string(),
        "attribute" => {
            let attr = field_text(node, "attribute", source)?;
            match node
                .child_by_field_name("object")
                .and_then(|obj| resolve_name(obj, source))
            {
                Some(object) => format!("{object}.{attr}"),
                None => attr,
            }
        }
        "call" => return resolve_name(node.child_by_field_name("function")?, source),
        "parenthesized_expression" | "type" => return resolve_name(first_named(node)?, source),
        "string" | "concatenated_string" => string_value(node, source)?,
        "integer" => integer_value(node_text(node, source)),
        "float" => node_text(node, source).replace('_', ""),
        "true" => "True".to_string(),
        "false" => "False".to_string(),
        "none" => "None".to_string(),
        "ellipsis" => "Ellipsis".to_string(),
        _ => return None,
    };
    Some(name).filter(|n| !n.is_empty())
}

/// Resolve a dotted import path (`os.path`) without any surrounding whitespace.
pub fn dotted_name(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "dotted_name" => {
            let mut cursor = node.walk();
            let parts: Vec<&str> = node
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "identifier")
                .map(|c| node_text(c, source))
                .collect();
            Some(parts.join(".")).filter(|s| !s.is_empty())
        }
        "aliased_import" => dotted_name(node.child_by_field_name("name")?, source),
        "identifier" => Some(node_text(node, source).to_string()),
        _ => None,
    }
}

/// Value of a string literal, or `None` if it is an f-string.
///
/// Bytes literals keep their Python repr (`b'..'`). Escape sequences are
/// left as written.
pub fn string_value(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "concatenated_string" => {
            let mut cursor = node.walk();
            let parts: Option<Vec<String>> = node
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "string")
                .map(|c| string_value(c, source))
                .collect();
            Some(parts?.concat())
        }
        "string" => {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            if children.iter().any(|c| c.kind() == "interpolation") {
                return None;
            }
            let start = children.iter().find(|c| c.kind() == "string_start")?;
            let end = children.iter().rev().find(|c| c.kind() == "string_end")?;
            if is_bytes_literal(node, source) {
                return Some(node_text(node, source).to_string());
            }
            let body = source.get(start.end_byte()..end.start_byte())?;
            Some(String::from_utf8_lossy(body).to_string())
        }
        _ => None,
    }
}

/// Docstring of a block: its first statement, if that is a plain string.
///
/// Cleaned the way `inspect.cleandoc` does.
pub fn docstring(body: Node, source: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let expr = first_named(first)?;
    if !matches!(expr.kind(), "string" | "concatenated_string") {
        return None;
    }
    if expr.kind() == "string" && is_bytes_literal(expr, source) {
        return None;
    }
    let raw = string_value(expr, source)?;
    Some(clean_docstring(&raw))
}

/// Strip the common indentation of all lines but the first, plus leading
/// and trailing blank lines. Indentation is counted in characters after
/// expanding tabs to 8-column stops.
pub fn clean_docstring(raw: &str) -> String {
    let expanded = expand_tabs(raw, 8);
    let lines: Vec<&str> = expanded.lines().collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min();

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    if let Some(first) = lines.first() {
        cleaned.push(first.trim_start().to_string());
    }
    for line in lines.iter().skip(1) {
        let stripped: String = match margin {
            Some(m) => line.chars().skip(m).collect(),
            None => line.to_string(),
        };
        cleaned.push(stripped);
    }

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|l| l.trim().is_empty()).count();
    cleaned.drain(..leading);
    cleaned.join("\n")
}

/// `str.expandtabs`: each tab advances to the next multiple of `width`,
/// columns restart after every newline.
fn expand_tabs(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = width - column % width;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

fn is_bytes_literal(string: Node, source: &[u8]) -> bool {
    let mut cursor = string.walk();
    let is_bytes = string
        .children(&mut cursor)
        .find(|c| c.kind() == "string_start")
        .is_some_and(|start| node_text(start, source).contains(&['b', 'B'][..]));
    is_bytes
}

fn first_named(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let first = node
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    first
}

/// Python's `str(int)`: radix prefixes and underscores normalised away.
fn integer_value(text: &str) -> String {
    let digits = text.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        u128::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u128::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u128::from_str_radix(bin, 2).ok()
    } else {
        lower.parse::<u128>().ok()
    };
    parsed.map(|n| n.to_string()).unwrap_or(digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use std::path::Path;

    /// Resolve the first base class of `class C(<expr>): pass`.
    fn resolve_base(expr: &str) -> Option<String> {
        let source = format!("class C({expr}):\n    pass\n");
        let tree = parse_source(Path::new("t.py"), &source).unwrap();
        let class = tree.root_node().named_child(0).unwrap();
        let bases = class.child_by_field_name("superclasses").unwrap();
        let first = first_named(bases).unwrap();
        resolve_name(first, source.as_bytes())
    }

    #[test]
    fn test_resolve_identifier_and_attribute() {
        assert_eq!(resolve_base("Base").as_deref(), Some("Base"));
        assert_eq!(resolve_base("pkg.mod.Base").as_deref(), Some("pkg.mod.Base"));
        assert_eq!(resolve_base("(pkg).Base").as_deref(), Some("pkg.Base"));
    }

    #[test]
    fn test_resolve_call_ignores_arguments() {
        assert_eq!(resolve_base("make_base(1, x=2)").as_deref(), Some("make_base"));
        assert_eq!(resolve_base("six.with_metaclass(Meta)").as_deref(), Some("six.with_metaclass"));
        assert_eq!(resolve_base("factory().Base").as_deref(), Some("factory.Base"));
    }

    #[test]
    fn test_resolve_literals() {
        assert_eq!(resolve_base("'Named'").as_deref(), Some("Named"));
        assert_eq!(resolve_base("0x10").as_deref(), Some("16"));
        assert_eq!(resolve_base("None").as_deref(), Some("None"));
        assert_eq!(resolve_base("True").as_deref(), Some("True"));
    }

    #[test]
    fn test_unresolvable_expressions() {
        assert_eq!(resolve_base("bases[0]"), None);
        assert_eq!(resolve_base("f'{x}'"), None);
        assert_eq!(resolve_base("''"), None);
        assert_eq!(resolve_base("bases[0].Mixin").as_deref(), Some("Mixin"));
    }

    #[test]
    fn test_clean_docstring() {
        assert_eq!(clean_docstring("Return a greeting."), "Return a greeting.");
        assert_eq!(
            clean_docstring("Summary.\n\n    Details here.\n      Indented.\n    "),
            "Summary.\n\nDetails here.\n  Indented."
        );
        assert_eq!(clean_docstring("\n    Leading blank.\n"), "Leading blank.");
    }

    #[test]
    fn test_clean_docstring_counts_characters() {
        assert_eq!(
            clean_docstring("Summary.\n\u{3000}\u{3000}Body line.\n\u{3000}\u{3000}  Indented."),
            "Summary.\nBody line.\n  Indented."
        );
        assert_eq!(
            clean_docstring("Summary.\n\tBody.\n  \tMore.\n"),
            "Summary.\nBody.\nMore."
        );
        assert_eq!(expand_tabs("a\tb\n\tc", 8), "a       b\n        c");
    }

    #[test]
    fn test_docstring_of_block() {
        let source = "def f():\n    # note\n    \"\"\"Doc line.\"\"\"\n    return 1\n";
        let tree = parse_source(Path::new("t.py"), source).unwrap();
        let func = tree.root_node().named_child(0).unwrap();
        let body = func.child_by_field_name("body").unwrap();
        assert_eq!(docstring(body, source.as_bytes()).as_deref(), Some("Doc line."));

        let source = "def g():\n    x = 1\n    \"\"\"Not a docstring.\"\"\"\n";
        let tree = parse_source(Path::new("t.py"), source).unwrap();
        let func = tree.root_node().named_child(0).unwrap();
        let body = func.child_by_field_name("body").unwrap();
        assert_eq!(docstring(body, source.as_bytes()), None);
    }
}

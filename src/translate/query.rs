//! Typed builder for backend GraphQL documents.
//!
//! Backend operations are assembled from named fields, argument trees, and
//! variable bindings instead of string templates, so a renamed backend field
//! only ever has to change in one place.

use serde_json::{Map, Value};

/// Argument value in a backend document.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// `$name` variable reference
    Var(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Bare enum literal, e.g. `ASC`
    Enum(String),
    List(Vec<Arg>),
    Object(Vec<(String, Arg)>),
}

impl Arg {
    pub fn var(name: impl Into<String>) -> Self {
        Arg::Var(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Arg::Str(value.into())
    }

    pub fn enumeration(value: impl Into<String>) -> Self {
        Arg::Enum(value.into())
    }

    pub fn object<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Arg)>,
    {
        Arg::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn render(&self, out: &mut String) {
        match self {
            Arg::Var(name) => {
                out.push('$');
                out.push_str(name);
            }
            Arg::Str(value) => {
                out.push('"');
                for ch in value.chars() {
                    match ch {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        _ => out.push(ch),
                    }
                }
                out.push('"');
            }
            Arg::Int(value) => out.push_str(&value.to_string()),
            Arg::Float(value) => out.push_str(&value.to_string()),
            Arg::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
            Arg::Enum(value) => out.push_str(value),
            Arg::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render(out);
                }
                out.push(']');
            }
            Arg::Object(entries) => {
                out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(key);
                    out.push_str(": ");
                    value.render(out);
                }
                out.push('}');
            }
        }
    }
}

/// A field selection with optional alias, arguments, and sub-selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    alias: Option<String>,
    args: Vec<(String, Arg)>,
    children: Vec<Field>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            args: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn arg(mut self, name: impl Into<String>, value: Arg) -> Self {
        self.args.push((name.into(), value));
        self
    }

    pub fn select<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        self.children.extend(children);
        self
    }

    fn render(&self, out: &mut String) {
        if let Some(alias) = &self.alias {
            out.push_str(alias);
            out.push_str(": ");
        }
        out.push_str(&self.name);
        if !self.args.is_empty() {
            out.push('(');
            for (i, (name, value)) in self.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(name);
                out.push_str(": ");
                value.render(out);
            }
            out.push(')');
        }
        if !self.children.is_empty() {
            out.push_str(" { ");
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                child.render(out);
            }
            out.push_str(" }");
        }
    }
}

/// Leaf fields by name, for compact selection lists.
pub fn fields<const N: usize>(names: [&str; N]) -> Vec<Field> {
    names.into_iter().map(Field::new).collect()
}

/// A complete backend document: operation kind + name, variable definitions,
/// root selection.
#[derive(Debug, Clone)]
pub struct Document {
    kind: &'static str,
    name: String,
    variables: Vec<(String, String)>,
    roots: Vec<Field>,
}

impl Document {
    pub fn query(name: impl Into<String>) -> Self {
        Self {
            kind: "query",
            name: name.into(),
            variables: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn mutation(name: impl Into<String>) -> Self {
        Self {
            kind: "mutation",
            name: name.into(),
            variables: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Declare a variable binding, e.g. `("slug", "String!")`.
    pub fn variable(mut self, name: impl Into<String>, gql_type: impl Into<String>) -> Self {
        self.variables.push((name.into(), gql_type.into()));
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.roots.push(field);
        self
    }

    pub fn operation_name(&self) -> &str {
        &self.name
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(self.kind);
        out.push(' ');
        out.push_str(&self.name);
        if !self.variables.is_empty() {
            out.push('(');
            for (i, (name, gql_type)) in self.variables.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push('$');
                out.push_str(name);
                out.push_str(": ");
                out.push_str(gql_type);
            }
            out.push(')');
        }
        out.push_str(" { ");
        for (i, root) in self.roots.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            root.render(&mut out);
        }
        out.push_str(" }");
        out
    }

    /// Finish into a backend request with the given variable values.
    pub fn into_request(self, variables: Map<String, Value>) -> crate::backend::BackendRequest {
        crate::backend::BackendRequest {
            operation_name: Some(self.name.clone()),
            query: self.render(),
            variables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_query_with_variables_and_nesting() {
        let doc = Document::query("ProductBySlug")
            .variable("slug", "String!")
            .field(
                Field::new("products")
                    .arg(
                        "filter",
                        Arg::object([("url_key", Arg::object([("eq", Arg::var("slug"))]))]),
                    )
                    .arg("pageSize", Arg::Int(1))
                    .select([Field::new("items").select(fields(["id", "sku", "name"]))]),
            );
        assert_eq!(
            doc.render(),
            "query ProductBySlug($slug: String!) { products(filter: {url_key: {eq: $slug}}, \
             pageSize: 1) { items { id sku name } } }"
        );
    }

    #[test]
    fn renders_mutation_with_enum_and_list() {
        let doc = Document::mutation("SetSort").field(
            Field::new("apply")
                .arg("sort", Arg::object([("price", Arg::enumeration("DESC"))]))
                .arg("ids", Arg::List(vec![Arg::Int(1), Arg::Int(2)]))
                .select(fields(["ok"])),
        );
        assert_eq!(
            doc.render(),
            "mutation SetSort { apply(sort: {price: DESC}, ids: [1, 2]) { ok } }"
        );
    }

    #[test]
    fn escapes_string_arguments() {
        let doc =
            Document::query("Q").field(Field::new("f").arg("s", Arg::string("a\"b\\c")).select(
                fields(["ok"]),
            ));
        assert_eq!(doc.render(), r#"query Q { f(s: "a\"b\\c") { ok } }"#);
    }

    #[test]
    fn aliases_render_before_field_name() {
        let doc = Document::query("Q").field(
            Field::new("categoryList")
                .alias("roots")
                .select(fields(["id"])),
        );
        assert_eq!(doc.render(), "query Q { roots: categoryList { id } }");
    }
}

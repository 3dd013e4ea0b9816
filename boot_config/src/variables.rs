//! Runtime variable environment and `${run:…}` placeholder substitution.
//!
//! The environment is a read-only JSON tree supplied by the launcher for one
//! session (node name, transports, ports, credentials). Paths are dotted:
//! `node.shell-port`, `transport-xmpp.xmpp-server`. A missing key is not an
//! error: lookups report [`Lookup::Absent`], which renders as `None`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::{Entry, Item, Node, parse_node};
use crate::error::{BootError, BootResult};

#[expect(clippy::expect_used, reason = "the pattern is a compile-time constant")]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{run:([^}]*)\}").expect("placeholder pattern compiles"));

/// Text a missing value renders as.
pub const ABSENT_TEXT: &str = "None";

/// Outcome of a variable lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The path leads to a non-null value.
    Found(&'a Value),
    /// Some step of the path is missing, or the leaf is `null`.
    Absent,
}

impl Lookup<'_> {
    /// Renders the outcome the way embedded placeholders are rendered.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Found(value) => render_value(value),
            Self::Absent => ABSENT_TEXT.to_owned(),
        }
    }

    /// Whether the lookup found nothing.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Renders a variable value as text.
///
/// Strings are copied verbatim, booleans become `True`/`False`, `null`
/// becomes `None`, and arrays and objects use compact JSON.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(true) => "True".to_owned(),
        Value::Bool(false) => "False".to_owned(),
        Value::Null => ABSENT_TEXT.to_owned(),
        Value::Number(number) => number.to_string(),
        composite => composite.to_string(),
    }
}

/// Read-only variable tree for one session.
///
/// # Examples
///
/// ```
/// use boot_config::Variables;
/// use serde_json::json;
///
/// let vars = Variables::new(json!({"node": {"shell-port": 4000}}));
/// assert_eq!(vars.substitute("${run:node.shell-port}"), json!(4000));
/// assert_eq!(vars.substitute("port=${run:node.shell-port}"), json!("port=4000"));
/// assert_eq!(vars.substitute("${run:node.name}"), json!(null));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    root: Value,
}

impl Variables {
    /// Wraps a JSON tree.
    #[must_use]
    pub const fn new(root: Value) -> Self {
        Self { root }
    }

    /// An environment where every lookup is absent.
    #[must_use]
    pub const fn empty() -> Self {
        Self { root: Value::Null }
    }

    /// Builds an environment from any serialisable launch-parameter type.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::MalformedDocument`] when `params` cannot be
    /// represented as JSON.
    pub fn from_serializable<T: Serialize>(params: &T) -> BootResult<Self> {
        serde_json::to_value(params)
            .map(Self::new)
            .map_err(|err| BootError::malformed("launch parameters", "root", err.to_string()))
    }

    /// Parses launch parameters written in the fragment syntax (`run.js`).
    ///
    /// Comments and trailing commas are accepted; directives are not
    /// interpreted.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::MalformedDocument`] naming `name` on syntax errors.
    pub fn parse(name: &str, text: &str) -> BootResult<Self> {
        let node = parse_node(text)
            .map_err(|err| BootError::malformed(name, err.location(), err.message))?;
        Ok(Self::new(node_to_value(node)))
    }

    /// The underlying tree.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    /// Looks up a dotted path.
    ///
    /// Numeric segments index into arrays. An empty path is absent.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Lookup<'_> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Lookup::Absent;
        }
        let mut cursor = &self.root;
        for segment in trimmed.split('.') {
            let next = match cursor {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => cursor = value,
                None => return Lookup::Absent,
            }
        }
        if cursor.is_null() {
            Lookup::Absent
        } else {
            Lookup::Found(cursor)
        }
    }

    /// Sets the value at a dotted path, creating intermediate objects.
    ///
    /// A non-object found on the way is replaced by an object.
    pub fn set(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.trim().split('.').collect();
        set_path(&mut self.root, &segments, value);
    }

    /// If `text` is exactly one placeholder, returns its path.
    #[must_use]
    pub fn sole_placeholder(text: &str) -> Option<&str> {
        let captures = PLACEHOLDER.captures(text)?;
        let whole = captures.get(0)?;
        if whole.start() == 0 && whole.end() == text.len() {
            captures.get(1).map(|path| path.as_str())
        } else {
            None
        }
    }

    /// Substitutes placeholders in a string scalar.
    ///
    /// A scalar made of exactly one placeholder becomes the looked-up value
    /// itself, keeping its JSON type (`null` when absent). Otherwise every
    /// placeholder is rendered as text and spliced into the string.
    #[must_use]
    pub fn substitute(&self, text: &str) -> Value {
        if let Some(path) = Self::sole_placeholder(text) {
            return match self.lookup(path) {
                Lookup::Found(value) => value.clone(),
                Lookup::Absent => Value::Null,
            };
        }
        Value::String(self.render(text).into_owned())
    }

    /// Renders every placeholder in `text` as text.
    #[must_use]
    pub fn render<'t>(&self, text: &'t str) -> Cow<'t, str> {
        PLACEHOLDER.replace_all(text, |captures: &Captures<'_>| {
            captures
                .get(1)
                .map_or_else(|| ABSENT_TEXT.to_owned(), |path| self.lookup(path.as_str()).render())
        })
    }
}

impl From<Value> for Variables {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

fn set_path(target: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *target = value;
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        let slot = map.entry((*first).to_owned()).or_insert(Value::Null);
        set_path(slot, rest, value);
    }
}

/// Converts a directive-free parsed tree to JSON; the last duplicate key wins.
pub(crate) fn node_to_value(node: Node) -> Value {
    match node {
        Node::Null => Value::Null,
        Node::Bool(flag) => Value::Bool(flag),
        Node::Number(number) => Value::Number(number),
        Node::String(text) => Value::String(text),
        Node::Array(items) => Value::Array(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Item::Value(value) => Some(node_to_value(value)),
                    Item::Include(_) => None,
                })
                .collect(),
        ),
        Node::Object(entries) => {
            let mut map = Map::new();
            for entry in entries {
                if let Entry::Field(key, value) = entry {
                    map.insert(key, node_to_value(value));
                }
            }
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lookup, Variables, render_value};
    use anyhow::{Result, ensure};
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    #[fixture]
    fn vars() -> Variables {
        Variables::new(json!({
            "node": {"shell-port": 4000, "top-composer": true, "name": "n1", "gone": null},
            "transport": ["http", "xmpp"],
            "transport-xmpp": {"xmpp-server": "im.example.org", "xmpp-port": 5222}
        }))
    }

    #[rstest]
    #[case("node.shell-port", Some(json!(4000)))]
    #[case("transport-xmpp.xmpp-server", Some(json!("im.example.org")))]
    #[case("transport.1", Some(json!("xmpp")))]
    #[case("node.missing", None)]
    #[case("missing.key", None)]
    #[case("node.shell-port.deeper", None)]
    #[case("node.gone", None)]
    #[case("", None)]
    fn looks_up_dotted_paths(
        vars: Variables,
        #[case] path: &str,
        #[case] expected: Option<Value>,
    ) -> Result<()> {
        let found = match vars.lookup(path) {
            Lookup::Found(value) => Some(value.clone()),
            Lookup::Absent => None,
        };
        ensure!(found == expected, "lookup {path} gave {found:?}");
        Ok(())
    }

    #[rstest]
    #[case("${run:node.shell-port}", json!(4000))]
    #[case("${run:node.top-composer}", json!(true))]
    #[case("${run:missing.key}", Value::Null)]
    #[case("${run:transport}", json!(["http", "xmpp"]))]
    #[case("port ${run:node.shell-port}", json!("port 4000"))]
    #[case("${run:missing.key}!", json!("None!"))]
    #[case(
        "${run:transport-xmpp.xmpp-server}:${run:transport-xmpp.xmpp-port}",
        json!("im.example.org:5222")
    )]
    #[case("${run:node.top-composer}-x", json!("True-x"))]
    #[case("${env:HOME}", json!("${env:HOME}"))]
    #[case("plain", json!("plain"))]
    fn substitutes_placeholders(
        vars: Variables,
        #[case] text: &str,
        #[case] expected: Value,
    ) -> Result<()> {
        let substituted = vars.substitute(text);
        ensure!(substituted == expected, "{text} became {substituted}");
        Ok(())
    }

    #[test]
    fn renders_composites_as_compact_json() {
        assert_eq!(render_value(&json!(["http", "xmpp"])), r#"["http","xmpp"]"#);
        assert_eq!(render_value(&json!(false)), "False");
    }

    #[test]
    fn set_creates_intermediate_objects() -> Result<()> {
        let mut vars = Variables::empty();
        vars.set("node.shell-port", json!(16000));
        vars.set("transport", json!("http"));
        ensure!(vars.root() == &json!({"node": {"shell-port": 16000}, "transport": "http"}));
        Ok(())
    }

    #[test]
    fn parses_launch_parameters_with_comments() -> Result<()> {
        let text = r#"{
            // launcher output
            "node": { "name": "node-a", "top-composer": false, },
            "transport": ["http"],
        }"#;
        let vars = Variables::parse("run.js", text).map_err(|err| anyhow::anyhow!("{err}"))?;
        ensure!(vars.lookup("node.name") == Lookup::Found(&json!("node-a")));
        Ok(())
    }
}

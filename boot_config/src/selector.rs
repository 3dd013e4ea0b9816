//! `<document>#<pointer>` references and node selection.
//!
//! Pointers are dotted key paths with optional bracket suffixes:
//! `composition`, `bundles[*]`, `composition[0].properties`. A `[*]` step
//! expands every element of an array, so a trailing wildcard yields the
//! elements themselves rather than the array holding them.

use std::fmt;

use serde_json::Value;

/// One step of a [`Pointer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member lookup.
    Key(String),
    /// Array element lookup.
    Index(usize),
    /// Every element of an array.
    Each,
}

/// Parsed pointer into a resolved document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pointer {
    segments: Vec<Segment>,
}

impl Pointer {
    /// Parses pointer text. An empty pointer selects the document root.
    ///
    /// # Errors
    ///
    /// Returns a description of the first malformed step.
    ///
    /// # Examples
    ///
    /// ```
    /// use boot_config::selector::{Pointer, Segment};
    ///
    /// let pointer = Pointer::parse("composition[*]").expect("valid pointer");
    /// assert_eq!(
    ///     pointer.segments(),
    ///     [Segment::Key("composition".into()), Segment::Each]
    /// );
    /// ```
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        if text.trim().is_empty() {
            return Ok(Self { segments });
        }
        for part in text.split('.') {
            parse_part(part, &mut segments)?;
        }
        Ok(Self { segments })
    }

    /// Steps of the pointer, in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Selects the nodes addressed by this pointer inside `root`.
    ///
    /// # Errors
    ///
    /// Returns a description of the step that matched nothing: a missing
    /// key, an index out of range, or a step applied to the wrong kind of
    /// node.
    ///
    /// # Examples
    ///
    /// ```
    /// use boot_config::selector::Pointer;
    /// use serde_json::json;
    ///
    /// let doc = json!({"bundles": [{"name": "a"}, {"name": "b"}]});
    /// let pointer = Pointer::parse("bundles[*]").expect("valid pointer");
    /// let selected = pointer.select(&doc).expect("bundles exist");
    /// assert_eq!(selected, vec![json!({"name": "a"}), json!({"name": "b"})]);
    /// ```
    pub fn select(&self, root: &Value) -> Result<Vec<Value>, String> {
        let mut current: Vec<&Value> = vec![root];
        for (step, segment) in self.segments.iter().enumerate() {
            let mut next = Vec::with_capacity(current.len());
            for node in current {
                apply(segment, node, &mut next).map_err(|reason| {
                    format!("{reason} at step {} of '{self}'", step + 1)
                })?;
            }
            current = next;
        }
        Ok(current.into_iter().cloned().collect())
    }
}

fn apply<'a>(segment: &Segment, node: &'a Value, out: &mut Vec<&'a Value>) -> Result<(), String> {
    match (segment, node) {
        (Segment::Key(key), Value::Object(map)) => {
            let found = map.get(key).ok_or_else(|| format!("key '{key}' is missing"))?;
            out.push(found);
        }
        (Segment::Index(index), Value::Array(items)) => {
            let found = items
                .get(*index)
                .ok_or_else(|| format!("index {index} is out of range ({} elements)", items.len()))?;
            out.push(found);
        }
        (Segment::Each, Value::Array(items)) => out.extend(items.iter()),
        (Segment::Key(key), _) => return Err(format!("cannot look up key '{key}' in a non-object")),
        (Segment::Index(index), _) => return Err(format!("cannot take index {index} of a non-array")),
        (Segment::Each, _) => return Err("cannot expand '[*]' on a non-array".to_owned()),
    }
    Ok(())
}

fn parse_part(part: &str, segments: &mut Vec<Segment>) -> Result<(), String> {
    let (key, mut rest) = part.find('[').map_or((part, ""), |at| part.split_at(at));
    let name = key.trim();
    if name.is_empty() && segments.is_empty() && rest.is_empty() {
        return Err("empty pointer step".to_owned());
    }
    if name.is_empty() && !segments.is_empty() {
        return Err(format!("empty key before '{rest}'"));
    }
    if name.contains(']') {
        return Err(format!("unbalanced ']' in '{part}'"));
    }
    if !name.is_empty() {
        segments.push(Segment::Key(name.to_owned()));
    }
    while !rest.is_empty() {
        let inner = rest
            .strip_prefix('[')
            .and_then(|open| open.split_once(']'))
            .ok_or_else(|| format!("malformed bracket in '{part}'"))?;
        let (selector, remainder) = inner;
        segments.push(match selector.trim() {
            "*" => Segment::Each,
            digits => Segment::Index(
                digits
                    .parse()
                    .map_err(|_| format!("'{digits}' is not '*' or an array index"))?,
            ),
        });
        rest = remainder;
    }
    Ok(())
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if position == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Each => write!(f, "[*]")?,
            }
        }
        Ok(())
    }
}

/// A `"<document>#<pointer>"` reference from an `$include` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    document: String,
    pointer: Pointer,
    text: String,
}

impl Reference {
    /// Parses a reference. Without `#`, the whole document is selected.
    ///
    /// # Errors
    ///
    /// Returns a description when the document part is empty or the pointer
    /// is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use boot_config::selector::Reference;
    ///
    /// let reference = Reference::parse("composer/python-top.js#bundles[*]").expect("valid");
    /// assert_eq!(reference.document(), "composer/python-top.js");
    /// assert_eq!(reference.pointer().to_string(), "bundles[*]");
    /// ```
    pub fn parse(text: &str) -> Result<Self, String> {
        let (document, pointer) = text.split_once('#').unwrap_or((text, ""));
        let name = document.trim();
        if name.is_empty() {
            return Err("missing document name before '#'".to_owned());
        }
        Ok(Self {
            document: name.to_owned(),
            pointer: Pointer::parse(pointer)?,
            text: text.to_owned(),
        })
    }

    /// Document part, as written.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Pointer part.
    #[must_use]
    pub const fn pointer(&self) -> &Pointer {
        &self.pointer
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::{Pointer, Reference, Segment};
    use anyhow::{Result, anyhow, ensure};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn corpus_doc() -> Value {
        json!({
            "bundles": [{"name": "a"}, {"name": "b"}],
            "composition": [
                {"name": "x", "properties": {"port": 1}},
                {"name": "y"}
            ],
            "properties": {"herald.local": true}
        })
    }

    #[rstest]
    #[case("composition", vec![Segment::Key("composition".into())])]
    #[case("bundles[*]", vec![Segment::Key("bundles".into()), Segment::Each])]
    #[case(
        "composition[0].properties",
        vec![
            Segment::Key("composition".into()),
            Segment::Index(0),
            Segment::Key("properties".into()),
        ]
    )]
    #[case("", vec![])]
    fn parses_pointer_forms(#[case] text: &str, #[case] expected: Vec<Segment>) -> Result<()> {
        let pointer = Pointer::parse(text).map_err(|err| anyhow!(err))?;
        ensure!(pointer.segments() == expected, "unexpected segments {pointer:?}");
        ensure!(pointer.to_string() == text, "display mismatch for {text}");
        Ok(())
    }

    #[rstest]
    #[case("bundles[x]")]
    #[case("bundles[*")]
    #[case("a..b")]
    #[case("bundles]")]
    fn rejects_malformed_pointers(#[case] text: &str) {
        assert!(Pointer::parse(text).is_err(), "{text} should be rejected");
    }

    #[test]
    fn trailing_wildcard_splices_elements() -> Result<()> {
        let pointer = Pointer::parse("bundles[*]").map_err(|err| anyhow!(err))?;
        let selected = pointer.select(&corpus_doc()).map_err(|err| anyhow!(err))?;
        ensure!(selected == vec![json!({"name": "a"}), json!({"name": "b"})]);
        Ok(())
    }

    #[test]
    fn plain_key_selects_single_node() -> Result<()> {
        let pointer = Pointer::parse("properties").map_err(|err| anyhow!(err))?;
        let selected = pointer.select(&corpus_doc()).map_err(|err| anyhow!(err))?;
        ensure!(selected == vec![json!({"herald.local": true})]);
        Ok(())
    }

    #[test]
    fn wildcard_in_the_middle_maps_each_element() -> Result<()> {
        let pointer = Pointer::parse("composition[*].name").map_err(|err| anyhow!(err))?;
        let selected = pointer.select(&corpus_doc()).map_err(|err| anyhow!(err))?;
        ensure!(selected == vec![json!("x"), json!("y")]);
        Ok(())
    }

    #[rstest]
    #[case("missing", "key 'missing' is missing")]
    #[case("composition[5]", "index 5 is out of range")]
    #[case("properties[*]", "non-array")]
    #[case("composition[*].properties", "key 'properties' is missing")]
    fn reports_misses(#[case] text: &str, #[case] fragment: &str) -> Result<()> {
        let pointer = Pointer::parse(text).map_err(|err| anyhow!(err))?;
        match pointer.select(&corpus_doc()) {
            Ok(found) => Err(anyhow!("expected a miss for {text}, got {found:?}")),
            Err(reason) => {
                ensure!(reason.contains(fragment), "unexpected reason {reason}");
                Ok(())
            }
        }
    }

    #[test]
    fn reference_without_pointer_selects_root() -> Result<()> {
        let reference = Reference::parse("all-xmpp.js").map_err(|err| anyhow!(err))?;
        ensure!(reference.document() == "all-xmpp.js");
        ensure!(reference.pointer().segments().is_empty());
        Ok(())
    }

    #[test]
    fn reference_requires_document_name() {
        assert!(Reference::parse("#bundles").is_err());
    }
}

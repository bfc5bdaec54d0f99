//! Parsed drift data documents.
//!
//! A drift data file maps region tag names to entries:
//!
//! ```yaml
//! storage_upload_file:
//!   ../tests/upload_test.py:
//!   tested: false
//! storage_list_buckets:
//!   additions:
//!     - storage_list_buckets_async
//! ```
//!
//! Entry keys that are not reserved name test files, relative to the
//! directory holding the drift data file. Mapping order is preserved because
//! validation messages and "first reserved key" selection depend on it.

use anyhow::{Context, Result};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_yaml::Value;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::config::ReservedKeys;

/// Reserved key marking a tag the source parser cannot detect.
pub const TESTED_KEY: &str = "tested";

/// One tag's metadata, keys in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagEntry {
    pub fields: Vec<(String, Value)>,
}

impl TagEntry {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// True only for a literal boolean `tested: false`.
    pub fn is_marked_untested(&self) -> bool {
        matches!(self.get(TESTED_KEY), Some(Value::Bool(false)))
    }

    /// The first reserved key in entry order.
    pub fn first_reserved_key<'e>(&'e self, reserved: ReservedKeys<'_>) -> Option<&'e str> {
        reserved.first_in(self.keys())
    }

    /// Keys that are not reserved, i.e. declared test file paths.
    pub fn test_paths<'e>(&'e self, reserved: ReservedKeys<'e>) -> impl Iterator<Item = &'e str> + 'e {
        self.keys().filter(move |k| !reserved.contains(k))
    }

    fn from_node(tag: &str, node: RawNode<Value>) -> Result<Self> {
        match node {
            RawNode::Other(Value::Null) => Ok(Self::default()),
            RawNode::Pairs(pairs) => {
                let fields = string_keyed(pairs)
                    .with_context(|| format!("Entry for region tag {} has a non-string key", tag))?;
                Ok(Self { fields })
            }
            RawNode::Other(other) => anyhow::bail!(
                "Entry for region tag {} must be a mapping, got {}",
                tag,
                render_value(&other)
            ),
        }
    }
}

/// A single parsed drift data file.
#[derive(Debug, Clone)]
pub struct DriftDocument {
    pub path: PathBuf,
    pub entries: Vec<(String, TagEntry)>,
}

impl DriftDocument {
    /// Read and parse the drift data file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read drift data file {}", path.display()))?;

        Self::parse(path, &content)
            .with_context(|| format!("Failed to parse drift data file {}", path.display()))
    }

    /// Parse drift data content. `path` is recorded for messages and
    /// relative test path resolution only.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        if is_blank(content) {
            return Ok(Self {
                path: path.to_path_buf(),
                entries: Vec::new(),
            });
        }

        // Repeated tags are kept so that uniqueness is reported, not fatal
        let node: RawNode<RawNode<Value>> =
            serde_yaml::from_str(content).context("Malformed YAML")?;

        let entries = match node {
            RawNode::Other(Value::Null) => Vec::new(),
            RawNode::Pairs(pairs) => string_keyed(pairs)
                .context("Region tag names must be strings")?
                .into_iter()
                .map(|(tag, node)| {
                    let entry = TagEntry::from_node(&tag, node)?;
                    Ok((tag, entry))
                })
                .collect::<Result<Vec<_>>>()?,
            RawNode::Other(other) => anyhow::bail!(
                "Top level must map region tags to entries, got {}",
                render_value(&other)
            ),
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Directory that relative test paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Resolve a test path key against [`Self::base_dir`] unless absolute.
    pub fn resolve_test_path(&self, test_path: &str) -> PathBuf {
        let path = Path::new(test_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }
}

/// No content besides whitespace and comments.
fn is_blank(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

fn string_keyed<V>(pairs: Vec<(Value, V)>) -> Result<Vec<(String, V)>> {
    pairs
        .into_iter()
        .map(|(key, value)| match key {
            Value::String(key) => Ok((key, value)),
            other => anyhow::bail!("expected a string key, got {}", render_value(&other)),
        })
        .collect()
}

/// A YAML node whose mapping form keeps every key in document order,
/// repeated keys included. Any other node is kept as a plain value.
enum RawNode<V> {
    Pairs(Vec<(Value, V)>),
    Other(Value),
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for RawNode<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawNodeVisitor(PhantomData))
    }
}

struct RawNodeVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for RawNodeVisitor<V> {
    type Value = RawNode<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML mapping, sequence or scalar")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(pair) = map.next_entry::<Value, V>()? {
            pairs.push(pair);
        }
        Ok(RawNode::Pairs(pairs))
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(RawNode::Other(Value::Sequence(items)))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(RawNode::Other(Value::Null))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(RawNode::Other(Value::Null))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
        Ok(RawNode::Other(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(RawNode::Other(Value::Number(v.into())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        Ok(RawNode::Other(Value::Number(v.into())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        Ok(RawNode::Other(Value::Number(v.into())))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(RawNode::Other(Value::String(v.to_owned())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
        Ok(RawNode::Other(Value::String(v)))
    }
}

/// Render a YAML value inline for diagnostics (`false`, `1`, `[a, b]`).
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let items: Vec<_> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(mapping) => {
            let pairs: Vec<_> = mapping
                .iter()
                .map(|(k, v)| format!("{}: {}", render_value(k), render_value(v)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, render_value(&tagged.value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn parse(content: &str) -> DriftDocument {
        DriftDocument::parse(Path::new("/repo/storage/.drift-data.yml"), content).unwrap()
    }

    #[test]
    fn test_parse_preserves_order() {
        let doc = parse(
            r#"
zeta_tag:
  tested: false
alpha_tag:
  b_test.py:
  a_test.py:
"#,
        );

        let tags: Vec<_> = doc.entries.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tags, vec!["zeta_tag", "alpha_tag"]);

        let keys: Vec<_> = doc.entries[1].1.keys().collect();
        assert_eq!(keys, vec!["b_test.py", "a_test.py"]);
    }

    #[test]
    fn test_empty_document_has_no_entries() {
        assert!(parse("").entries.is_empty());
        assert!(parse("# only a comment\n").entries.is_empty());
    }

    #[test]
    fn test_null_entry_is_empty() {
        let doc = parse("lonely_tag:\n");
        assert_eq!(doc.entries.len(), 1);
        assert!(doc.entries[0].1.fields.is_empty());
        assert!(!doc.entries[0].1.is_marked_untested());
    }

    #[test]
    fn test_is_marked_untested_requires_boolean_false() {
        let doc = parse(
            r#"
a:
  tested: false
b:
  tested: "false"
c:
  tested: true
d:
  tested: 0
"#,
        );

        let flags: Vec<_> = doc
            .entries
            .iter()
            .map(|(_, e)| e.is_marked_untested())
            .collect();
        assert_eq!(flags, vec![true, false, false, false]);
    }

    #[test]
    fn test_test_paths_skip_reserved_keys() {
        let config = Config::default();
        let reserved = config.reserved();
        let doc = parse(
            r#"
tag:
  tested: false
  ../tests/a_test.py:
  additions: [x]
  /abs/b_test.py:
"#,
        );

        let entry = &doc.entries[0].1;
        let paths: Vec<_> = entry.test_paths(reserved).collect();
        assert_eq!(paths, vec!["../tests/a_test.py", "/abs/b_test.py"]);
        assert_eq!(entry.first_reserved_key(reserved), Some("tested"));
    }

    #[test]
    fn test_resolve_test_path() {
        let doc = parse("tag:\n");
        assert_eq!(
            doc.resolve_test_path("tests/a_test.py"),
            PathBuf::from("/repo/storage/tests/a_test.py")
        );
        assert_eq!(
            doc.resolve_test_path("/elsewhere/b_test.py"),
            PathBuf::from("/elsewhere/b_test.py")
        );
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let result = DriftDocument::parse(Path::new(".drift-data.yml"), "tag: [unclosed\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_repeated_tag_keeps_both_entries() {
        let doc = parse(
            r#"
tagX:
  tested: false
tagY:
tagX:
  a_test.py:
"#,
        );

        let tags: Vec<_> = doc.entries.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tags, vec!["tagX", "tagY", "tagX"]);
        assert!(doc.entries[0].1.is_marked_untested());
        assert_eq!(doc.entries[2].1.keys().collect::<Vec<_>>(), vec!["a_test.py"]);
    }

    #[test]
    fn test_repeated_key_within_entry_is_kept() {
        let doc = parse("tagX:\n  a_test.py:\n  a_test.py:\n");
        assert_eq!(doc.entries[0].1.fields.len(), 2);
    }

    #[test]
    fn test_entry_scalar_kinds_are_rejected() {
        for content in ["tag: text\n", "tag: true\n", "tag: -3\n", "tag: 1.5\n", "tag: [a]\n"] {
            let err = DriftDocument::parse(Path::new(".drift-data.yml"), content).unwrap_err();
            assert!(err.to_string().contains("must be a mapping"), "{}", content);
        }
    }

    #[test]
    fn test_non_string_tag_is_error() {
        let err = DriftDocument::parse(Path::new(".drift-data.yml"), "42:\n  tested: false\n")
            .unwrap_err();
        assert!(err.to_string().contains("must be strings"));
    }

    #[test]
    fn test_scalar_top_level_is_error() {
        let err = DriftDocument::parse(Path::new(".drift-data.yml"), "just a string\n").unwrap_err();
        assert!(err.to_string().contains("Top level"));
    }

    #[test]
    fn test_scalar_entry_is_error() {
        let err = DriftDocument::parse(Path::new(".drift-data.yml"), "tag: 42\n").unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::Bool(false)), "false");
        let number: Value = serde_yaml::from_str("3").unwrap();
        assert_eq!(render_value(&number), "3");
        assert_eq!(render_value(&Value::from("abc")), "abc");
        let seq: Value = serde_yaml::from_str("[a, 1]").unwrap();
        assert_eq!(render_value(&seq), "[a, 1]");
    }
}

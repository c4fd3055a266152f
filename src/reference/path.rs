use super::ReferenceRoot;
use std::fmt;

/// Path segment that projects the following accessor across every array element.
pub const WILDCARD: &str = "*";

/// A deferred value, identified by the dotted/bracketed path the remote engine
/// will resolve at execution time.
///
/// Handles are immutable: every accessor returns a fresh `Reference` whose path
/// strictly extends this one, so prefixes are never lost or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    path: String,
}

impl Reference {
    /// Creates a handle for an arbitrary path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The root handle returned by `define_params`.
    pub fn params() -> Self {
        Self::new("params")
    }

    /// The output of a single step.
    pub fn step_output(step_name: &str) -> Self {
        Self::new(format!("steps.{}.output", step_name))
    }

    /// The per-item result array of an iterated step.
    pub fn step_results(step_name: &str) -> Self {
        Self::new(format!("steps.{}.results", step_name))
    }

    /// The current element inside an iteration body.
    pub fn foreach_item() -> Self {
        Self::new("foreach.item")
    }

    /// The current position inside an iteration body.
    pub fn foreach_index() -> Self {
        Self::new("foreach.index")
    }

    /// Field access: `path.key`.
    pub fn field(&self, key: &str) -> Self {
        Self::new(format!("{}.{}", self.path, key))
    }

    /// Wildcard projection: `path[*]`.
    pub fn each(&self) -> Self {
        Self::new(format!("{}[{}]", self.path, WILDCARD))
    }

    /// Bracket access. `"*"` projects over the array, any other key is a field.
    pub fn index(&self, key: &str) -> Self {
        if key == WILDCARD {
            self.each()
        } else {
            self.field(key)
        }
    }

    /// Follows a dotted sequence of fields, e.g. `output.field_path("a.b")`.
    pub fn field_path(&self, dotted: &str) -> Self {
        dotted
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self.clone(), |reference, segment| reference.index(segment))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The bare path, used when a reference is a parameter's direct value.
    pub fn to_plain_path(&self) -> String {
        self.path.clone()
    }

    /// The `{{path}}` encoding embedded in literal values.
    pub fn to_template_string(&self) -> String {
        format!("{{{{{}}}}}", self.path)
    }

    /// The path as a JavaScript expression with null-safe accessors, for
    /// generated inline code only.
    ///
    /// Fields that are not identifiers use bracket access, and a wildcard
    /// projection becomes a `map` over the array:
    /// `steps.my-step.output.list[*].text` renders as
    /// `steps?.["my-step"]?.output?.list?.map((_$$item) => _$$item?.text)`.
    pub fn to_optional_path(&self) -> String {
        render_optional(&self.segments(), String::new())
    }

    /// Splits the path into its field and wildcard accessors.
    pub fn segments(&self) -> Vec<PathSegment<'_>> {
        let mut segments = Vec::new();
        let mut rest = self.path.as_str();
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                let end = after.find(']').unwrap_or(after.len());
                let key = &after[..end];
                segments.push(if key == WILDCARD {
                    PathSegment::Each
                } else {
                    PathSegment::Field(key.trim_matches('"'))
                });
                rest = after.get(end + 1..).unwrap_or("");
            } else {
                let field = rest.strip_prefix('.').unwrap_or(rest);
                let end = field
                    .find(|c: char| c == '.' || c == '[')
                    .unwrap_or(field.len());
                if end > 0 {
                    segments.push(PathSegment::Field(&field[..end]));
                }
                rest = &field[end..];
            }
        }
        segments
    }

    /// Classifies the handle by the root it hangs from.
    pub fn root(&self) -> ReferenceRoot {
        ReferenceRoot::classify(&self.path)
    }

    /// The step this handle points into, for `steps.<name>.*` paths.
    pub fn step_name(&self) -> Option<&str> {
        let rest = self.path.strip_prefix("steps.")?;
        let end = rest
            .find(|c: char| c == '.' || c == '[')
            .unwrap_or(rest.len());
        Some(&rest[..end]).filter(|name| !name.is_empty())
    }
}

/// One accessor of a reference path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Field(&'a str),
    /// `[*]`
    Each,
}

const ITEM_BINDING: &str = "_$$item";

fn render_optional(segments: &[PathSegment<'_>], mut rendered: String) -> String {
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            PathSegment::Field(name) if rendered.is_empty() => rendered.push_str(name),
            PathSegment::Field(name) if is_identifier(name) => {
                rendered.push_str("?.");
                rendered.push_str(name);
            }
            PathSegment::Field(name) => {
                let key = serde_json::Value::String(name.to_string());
                rendered.push_str(&format!("?.[{}]", key));
            }
            PathSegment::Each => {
                let rest = &segments[i + 1..];
                if rest.is_empty() {
                    return rendered;
                }
                let mapped = render_optional(rest, ITEM_BINDING.to_string());
                return format!("{}?.map(({}) => {})", rendered, ITEM_BINDING, mapped);
            }
        }
    }
    rendered
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl From<&Reference> for Reference {
    fn from(reference: &Reference) -> Self {
        reference.clone()
    }
}

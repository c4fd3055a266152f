use std::fmt;

/// The namespace a reference path is rooted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceRoot {
    Params,
    StepOutput,
    StepResults,
    ForeachItem,
    ForeachIndex,
    Other,
}

impl ReferenceRoot {
    pub fn classify(path: &str) -> Self {
        if has_root(path, "params") {
            return ReferenceRoot::Params;
        }
        if has_root(path, "foreach.item") {
            return ReferenceRoot::ForeachItem;
        }
        if has_root(path, "foreach.index") {
            return ReferenceRoot::ForeachIndex;
        }
        if let Some(rest) = path.strip_prefix("steps.") {
            let mut segments = rest.splitn(2, '.');
            let name = segments.next().unwrap_or_default();
            let tail = segments.next().unwrap_or_default();
            if !name.is_empty() {
                if has_root(tail, "output") {
                    return ReferenceRoot::StepOutput;
                }
                if has_root(tail, "results") {
                    return ReferenceRoot::StepResults;
                }
            }
        }
        ReferenceRoot::Other
    }

    /// Whether the root only resolves inside an iteration body.
    pub fn is_iteration_scoped(&self) -> bool {
        matches!(self, ReferenceRoot::ForeachItem | ReferenceRoot::ForeachIndex)
    }
}

/// `path` equals `root` or continues it with a separator.
fn has_root(path: &str, root: &str) -> bool {
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
        None => false,
    }
}

impl fmt::Display for ReferenceRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReferenceRoot::Params => "params",
            ReferenceRoot::StepOutput => "steps.<name>.output",
            ReferenceRoot::StepResults => "steps.<name>.results",
            ReferenceRoot::ForeachItem => "foreach.item",
            ReferenceRoot::ForeachIndex => "foreach.index",
            ReferenceRoot::Other => "other",
        };
        write!(f, "{}", label)
    }
}

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One node of hierarchical input data, before tree construction.
///
/// Accepts the common "flare.json" shape: internal nodes carry `children`,
/// leaves carry `size` (or `value`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default)]
    pub name: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CompactString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<CompactString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeSpec>>,
}

impl NodeSpec {
    pub fn leaf(name: &str, value: f64) -> Self {
        Self {
            name: CompactString::new(name),
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn branch(name: &str, children: Vec<NodeSpec>) -> Self {
        Self {
            name: CompactString::new(name),
            children: Some(children),
            ..Self::default()
        }
    }

    /// Whether this spec has at least one child.
    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// How leaf weights are read from [`NodeSpec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueMode {
    /// `value`, falling back to `size`.
    #[default]
    Value,
    /// `size`, falling back to `value`.
    Size,
    /// Every leaf weighs 1.
    Count,
}

impl ValueMode {
    /// Leaf weight for a spec; missing weights are 0.
    pub fn weight(self, spec: &NodeSpec) -> f64 {
        match self {
            ValueMode::Value => spec.value.or(spec.size).unwrap_or(0.0),
            ValueMode::Size => spec.size.or(spec.value).unwrap_or(0.0),
            ValueMode::Count => 1.0,
        }
    }
}

impl std::str::FromStr for ValueMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "value" => Ok(ValueMode::Value),
            "size" => Ok(ValueMode::Size),
            "count" => Ok(ValueMode::Count),
            other => Err(format!("unknown value mode '{other}' (expected value, size or count)")),
        }
    }
}

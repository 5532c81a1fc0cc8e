use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which side of the family a branch descends from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lineage {
    Maternal,
    Paternal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Role {
    #[default]
    Generic,
    Root,
    Patriarch,
    Matriarch,
    MaternalRoot,
    PaternalRoot,
    RootAncestor,
    MaternalGroup,
    Cluster,
    UnionLink,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Root => "root",
            Self::Patriarch => "patriarch",
            Self::Matriarch => "matriarch",
            Self::MaternalRoot => "maternal_root",
            Self::PaternalRoot => "paternal_root",
            Self::RootAncestor => "root_ancestor",
            Self::MaternalGroup => "maternal_group",
            Self::Cluster => "cluster",
            Self::UnionLink => "union_link",
        }
    }

    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "root" => Self::Root,
            "patriarch" => Self::Patriarch,
            "matriarch" => Self::Matriarch,
            "maternal_root" => Self::MaternalRoot,
            "paternal_root" => Self::PaternalRoot,
            "root_ancestor" => Self::RootAncestor,
            "maternal_group" => Self::MaternalGroup,
            "cluster" => Self::Cluster,
            "union_link" => Self::UnionLink,
            _ => Self::Generic,
        }
    }

    /// Lineage carried by the tag itself ("maternal" wins if both would match).
    pub fn lineage(self) -> Option<Lineage> {
        let tag = self.as_str();
        if tag.contains("maternal") {
            Some(Lineage::Maternal)
        } else if tag.contains("paternal") {
            Some(Lineage::Paternal)
        } else {
            None
        }
    }

    /// Label text shown under a member's name; generic members show none.
    pub fn display_name(self) -> Option<String> {
        match self {
            Self::Generic => None,
            other => Some(other.as_str().replace('_', " ")),
        }
    }
}

impl From<Option<String>> for Role {
    fn from(tag: Option<String>) -> Self {
        tag.as_deref().map(Role::parse).unwrap_or_default()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse: Option<String>,
    #[serde(rename = "type", default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<SourceNode>>,
}

impl SourceNode {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            spouse: None,
            role,
            children: Vec::new(),
        }
    }

    pub fn with_spouse(mut self, spouse: impl Into<String>) -> Self {
        self.spouse = Some(spouse.into());
        self
    }

    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of members in this subtree, including `self`.
    pub fn member_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.member_count())
            .sum::<usize>()
    }

    /// Every descendant in pre-order, excluding `self`.
    pub fn descendants(&self) -> Vec<Arc<SourceNode>> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Deepest generation index below this node (a leaf is 0).
    pub fn max_depth(&self) -> u32 {
        self.children
            .iter()
            .map(|c| c.max_depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

fn collect_descendants(node: &SourceNode, out: &mut Vec<Arc<SourceNode>>) {
    for child in &node.children {
        out.push(child.clone());
        collect_descendants(child, out);
    }
}

pub fn from_json_str(s: &str) -> serde_json::Result<Arc<SourceNode>> {
    serde_json::from_str::<SourceNode>(s).map(Arc::new)
}

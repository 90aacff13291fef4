use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Sex {
    M,
    F,
    #[default]
    U,
}

impl Sex {
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "M" | "m" => Self::M,
            "F" | "f" => Self::F,
            _ => Self::U,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::M => "M",
            Self::F => "F",
            Self::U => "U",
        }
    }

    /// Theme key of the sector background for this sex.
    pub fn color_key(self) -> &'static str {
        match self {
            Self::M => "chart-background-m",
            Self::F => "chart-background-f",
            Self::U => "chart-background-u",
        }
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_token).unwrap_or_default())
    }
}

/// One individual as handed over by the repository.
///
/// `birth` and `death` are only `Some` when the underlying date is valid;
/// the value is the year of the earliest possible date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonRecord {
    pub xref: String,
    pub sex: Sex,
    pub name: String,
    pub alternate_name: Option<String>,
    pub birth: Option<i32>,
    pub death: Option<i32>,
    pub deceased: bool,
    pub child_family: Option<String>,
    pub restricted: bool,
}

impl PersonRecord {
    pub fn new(xref: &str, sex: Sex, name: &str) -> Self {
        Self {
            xref: xref.to_string(),
            sex,
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FamilyRecord {
    pub xref: String,
    pub husband: Option<String>,
    pub wife: Option<String>,
}

impl FamilyRecord {
    pub fn new(xref: &str, husband: Option<&str>, wife: Option<&str>) -> Self {
        Self {
            xref: xref.to_string(),
            husband: husband.map(str::to_string),
            wife: wife.map(str::to_string),
        }
    }
}

/// Display record for one chart sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AncestorNode {
    pub id: u32,
    pub xref: String,
    pub generation: u32,
    pub name: String,
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    pub preferred_name: String,
    pub alternative_names: Vec<String>,
    pub is_alt_rtl: bool,
    pub sex: Sex,
    pub timespan: String,
    pub color: String,
    pub colors: [Vec<String>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<AncestorNode>>,
}

impl AncestorNode {
    pub fn children(&self) -> &[AncestorNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Highest generation present in this subtree.
    pub fn depth(&self) -> u32 {
        self.iter()
            .map(|node| node.generation)
            .max()
            .unwrap_or(self.generation)
    }

    /// Pre-order walk: node, father subtree, mother subtree.
    pub fn iter(&self) -> AncestorIter<'_> {
        AncestorIter { stack: vec![self] }
    }
}

#[derive(Debug)]
pub struct AncestorIter<'a> {
    stack: Vec<&'a AncestorNode>,
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = &'a AncestorNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

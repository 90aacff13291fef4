use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::ir::{FamilyRecord, PersonRecord};

/// Read access to individuals and families of one tree.
pub trait Repository {
    fn person(&self, xref: &str) -> Option<PersonRecord>;

    fn family(&self, xref: &str) -> Option<FamilyRecord>;

    /// The family in which `person` is registered as a child.
    fn child_family(&self, person: &PersonRecord) -> Option<FamilyRecord> {
        person
            .child_family
            .as_deref()
            .and_then(|xref| self.family(xref))
    }

    fn can_show(&self, person: &PersonRecord) -> bool {
        !person.restricted
    }
}

/// On-disk tree document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeFile {
    pub name: String,
    pub individuals: Vec<PersonRecord>,
    pub families: Vec<FamilyRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    pub name: String,
    individuals: HashMap<String, PersonRecord>,
    families: HashMap<String, FamilyRecord>,
}

impl MemoryRepository {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn from_tree_file(file: TreeFile) -> Self {
        let mut repo = Self::new(&file.name);
        for person in file.individuals {
            repo.insert_person(person);
        }
        for family in file.families {
            repo.insert_family(family);
        }
        repo
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let file: TreeFile = serde_json::from_str(input).context("invalid tree document")?;
        Ok(Self::from_tree_file(file))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tree file {}", path.display()))?;
        let repo = Self::from_json_str(&contents)?;
        log::debug!(
            "loaded tree '{}' with {} individuals and {} families",
            repo.name,
            repo.individuals.len(),
            repo.families.len()
        );
        Ok(repo)
    }

    pub fn insert_person(&mut self, person: PersonRecord) {
        self.individuals.insert(person.xref.clone(), person);
    }

    pub fn insert_family(&mut self, family: FamilyRecord) {
        self.families.insert(family.xref.clone(), family);
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

impl Repository for MemoryRepository {
    fn person(&self, xref: &str) -> Option<PersonRecord> {
        self.individuals.get(xref).cloned()
    }

    fn family(&self, xref: &str) -> Option<FamilyRecord> {
        self.families.get(xref).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Sex;

    #[test]
    fn loads_tree_document() {
        let input = r#"{
            "name": "demo",
            "individuals": [
                {"xref": "I1", "sex": "M", "name": "Max", "childFamily": "F1"},
                {"xref": "I2", "sex": "M", "name": "Otto"}
            ],
            "families": [{"xref": "F1", "husband": "I2"}]
        }"#;
        let repo = MemoryRepository::from_json_str(input).unwrap();
        assert_eq!(repo.name, "demo");
        assert_eq!(repo.len(), 2);
        let child = repo.person("I1").unwrap();
        let family = repo.child_family(&child).unwrap();
        assert_eq!(family.husband.as_deref(), Some("I2"));
        assert_eq!(family.wife, None);
        assert!(repo.child_family(&repo.person("I2").unwrap()).is_none());
    }

    #[test]
    fn dangling_family_reference_resolves_to_none() {
        let mut repo = MemoryRepository::new("t");
        let mut person = PersonRecord::new("I1", Sex::F, "Ann");
        person.child_family = Some("F404".to_string());
        repo.insert_person(person.clone());
        assert!(repo.child_family(&person).is_none());
    }

    #[test]
    fn restricted_people_are_hidden() {
        let repo = MemoryRepository::new("t");
        let mut person = PersonRecord::new("I1", Sex::U, "");
        assert!(repo.can_show(&person));
        person.restricted = true;
        assert!(!repo.can_show(&person));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(MemoryRepository::from_json_str("{\"individuals\": 3}").is_err());
    }
}

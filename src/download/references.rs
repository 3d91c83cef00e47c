use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::ReferenceSource;
use crate::error::Result;
use crate::schema::EntityKind;

/// Canonical spellings per entity kind, fetched once per cleaning run.
///
/// Trainers have no canonical list and are never spell-corrected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceNames {
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub pokemon: Vec<String>,
}

impl ReferenceNames {
    /// Fetch every list from `source`
    pub fn fetch(source: &impl ReferenceSource) -> Result<Self> {
        Ok(Self {
            types: source.fetch_names(EntityKind::Type)?,
            abilities: source.fetch_names(EntityKind::Ability)?,
            pokemon: source.fetch_names(EntityKind::Pokemon)?,
        })
    }

    pub fn for_kind(&self, kind: EntityKind) -> Option<&[String]> {
        match kind {
            EntityKind::Type => Some(&self.types),
            EntityKind::Ability => Some(&self.abilities),
            EntityKind::Pokemon => Some(&self.pokemon),
            EntityKind::Trainer => None,
        }
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read reference names: {:?}", path))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse reference names: {:?}", path))
    }

    pub fn write_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;

    struct Recording(RefCell<Vec<EntityKind>>);

    impl ReferenceSource for Recording {
        fn fetch_names(&self, kind: EntityKind) -> Result<Vec<String>> {
            self.0.borrow_mut().push(kind);
            match kind {
                EntityKind::Trainer => Err(Error::Validation("no list".into())),
                other => Ok(vec![other.table().to_string()]),
            }
        }
    }

    #[test]
    fn test_fetch_asks_each_listed_kind_once() {
        let source = Recording(RefCell::new(Vec::new()));
        let refs = ReferenceNames::fetch(&source).unwrap();

        assert_eq!(
            *source.0.borrow(),
            vec![EntityKind::Type, EntityKind::Ability, EntityKind::Pokemon]
        );
        assert_eq!(refs.for_kind(EntityKind::Ability).unwrap(), ["abilities"]);
        assert!(refs.for_kind(EntityKind::Trainer).is_none());
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let refs: ReferenceNames = serde_json::from_str(r#"{"types": ["fire"]}"#).unwrap();
        assert_eq!(refs.types, vec!["fire"]);
        assert!(refs.pokemon.is_empty());
    }
}

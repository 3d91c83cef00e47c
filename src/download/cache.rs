use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

use super::references::ReferenceNames;

const REFERENCES_FILE: &str = "references.json";

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "pokedex-sqlite")
                    .context("Could not determine cache directory")?;
                proj_dirs.cache_dir().to_path_buf()
            }
        };

        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    pub fn references_path(&self) -> PathBuf {
        self.cache_dir.join(REFERENCES_FILE)
    }

    /// Check if reference lists are already cached
    pub fn is_cached(&self) -> bool {
        self.references_path().exists()
    }

    pub fn load_references(&self) -> Result<ReferenceNames> {
        ReferenceNames::from_json_file(&self.references_path())
    }

    pub fn store_references(&self, references: &ReferenceNames) -> Result<()> {
        references.write_json_file(&self.references_path())
    }
}

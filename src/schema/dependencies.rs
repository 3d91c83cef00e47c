use super::tables::{get_table, ALL_TABLES};
use super::types::TableSchema;
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Resolves the order in which tables must be processed
pub struct DependencyResolver {
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
    /// Map of table name -> tables that depend on it
    reverse_deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let mut deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        let mut reverse_deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();

        for table in ALL_TABLES {
            let table_deps = table.dependencies();
            deps.insert(table.name, table_deps.clone());

            for dep in table_deps {
                reverse_deps.entry(dep).or_default().insert(table.name);
            }
        }

        Self { deps, reverse_deps }
    }

    /// Tables holding foreign keys into `table`
    pub fn referencing_tables(&self, table: &str) -> Vec<&'static TableSchema> {
        let mut tables: Vec<_> = self
            .reverse_deps
            .get(table)
            .into_iter()
            .flatten()
            .filter_map(|name| get_table(name))
            .collect();
        tables.sort_by_key(|t| t.name);
        tables
    }

    /// Return the requested tables in dependency order (parents before children)
    pub fn resolve(&self, requested: &[&str]) -> Result<Vec<&'static TableSchema>> {
        for name in requested {
            if get_table(name).is_none() {
                return Err(Error::Validation(format!("Unknown table: {}", name)));
            }
        }
        let included: HashSet<&str> = requested.iter().copied().collect();
        self.topological_sort(&included)
    }

    /// Return all tables in dependency order
    pub fn all_tables_ordered(&self) -> Result<Vec<&'static TableSchema>> {
        let included: HashSet<&str> = ALL_TABLES.iter().map(|t| t.name).collect();
        self.topological_sort(&included)
    }

    /// Topological sort of tables by dependencies.
    ///
    /// Roots are visited in `ALL_TABLES` order so the result is stable.
    fn topological_sort(&self, included: &HashSet<&str>) -> Result<Vec<&'static TableSchema>> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table in ALL_TABLES {
            if included.contains(table.name) && !visited.contains(table.name) {
                self.visit(
                    table.name,
                    included,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                )?;
            }
        }

        Ok(result)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        included: &HashSet<&'a str>,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<()> {
        if temp_visited.contains(name) {
            return Err(Error::Validation(format!(
                "Circular dependency detected at: {}",
                name
            )));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            let mut deps: Vec<_> = deps.iter().copied().collect();
            deps.sort_unstable();
            for dep in deps {
                if dep != name && included.contains(dep) {
                    self.visit(dep, included, visited, temp_visited, result)?;
                }
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        if let Some(table) = get_table(name) {
            result.push(table);
        }

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

use crate::error::{Error, Result};
use crate::schema::EntityKind;

/// Resolves which kinds to clean from `--only` / `--skip`, in cleaning order
pub fn resolve_kinds(only: Option<Vec<String>>, skip: Option<Vec<String>>) -> Result<Vec<EntityKind>> {
    let order = EntityKind::cleaning_order()?;

    match (only, skip) {
        (Some(_), Some(_)) => Err(Error::Validation(
            "Cannot use both --only and --skip at the same time".to_string(),
        )),
        (Some(only), None) => {
            let wanted = parse_kinds(&only)?;
            let kinds: Vec<_> = order.into_iter().filter(|k| wanted.contains(k)).collect();
            tracing::info!(kinds = ?kinds, "cleaning selected kinds");
            Ok(kinds)
        }
        (None, Some(skip)) => {
            let skipped = parse_kinds(&skip)?;
            let kinds: Vec<_> = order.into_iter().filter(|k| !skipped.contains(k)).collect();
            tracing::info!(skipped = ?skipped, "skipping kinds");
            Ok(kinds)
        }
        (None, None) => Ok(order),
    }
}

fn parse_kinds(names: &[String]) -> Result<Vec<EntityKind>> {
    names.iter().map(|n| n.parse()).collect()
}

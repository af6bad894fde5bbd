//! Seed the menu from a YAML file.
//!
//! ```yaml
//! items:
//!   - name: Pizza Margherita
//!     description: Molho de tomate, mussarela e manjericão
//!     price: "45.00"
//!     category: pizzas
//!     prepMinutes: 25
//! ```
//!
//! Every entry is validated before anything is written. Items whose name is
//! already on the menu are skipped, so the command can be re-run.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{error, info};

use delivery_core::menu::{MenuFilter, MenuItemDraft, MenuItemInput};
use delivery_core::store::Stores;

use super::{CliError, connect};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MenuSeed {
    items: Vec<MenuItemInput>,
}

/// Validate every entry, logging each failure.
fn parse_menu(content: &str) -> Result<Vec<MenuItemDraft>, CliError> {
    let seed: MenuSeed = serde_yaml::from_str(content)?;

    let mut drafts = Vec::with_capacity(seed.items.len());
    let mut invalid = 0;
    for (i, item) in seed.items.iter().enumerate() {
        match item.validate() {
            Ok(draft) => drafts.push(draft),
            Err(errors) => {
                error!(index = i, name = %item.name, "Invalid menu item: {errors}");
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(CliError::InvalidSeed(invalid));
    }
    Ok(drafts)
}

/// Insert menu items from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, any entry is invalid, or a
/// database operation fails.
pub async fn menu(file_path: &str) -> Result<(), CliError> {
    info!(path = %file_path, "Loading menu from file");
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let drafts = parse_menu(&content)?;
    info!(items = drafts.len(), "Menu file validated");

    let stores = Stores::postgres(connect().await?);
    let mut existing: HashSet<String> = stores
        .menu
        .list(&MenuFilter::default())
        .await?
        .into_iter()
        .map(|item| item.name.to_lowercase())
        .collect();

    let (mut inserted, mut skipped) = (0_usize, 0_usize);
    for draft in drafts {
        if !existing.insert(draft.name.to_lowercase()) {
            skipped += 1;
            continue;
        }
        let item = stores.menu.create(draft).await?;
        info!(menu_item_id = %item.id, name = %item.name, "Menu item inserted");
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Items inserted: {inserted}");
    info!("  Items skipped (already on the menu): {skipped}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_menu_is_valid() {
        let drafts = parse_menu(include_str!("../../../../data/menu.yaml")).unwrap();
        assert!(!drafts.is_empty());
    }

    #[test]
    fn test_invalid_entries_are_counted() {
        let content = r#"
items:
  - name: ""
    description: Sem nome
    price: "10.00"
    category: snacks
  - name: Brinde
    description: Preço zero
    price: "0"
    category: desserts
  - name: Coxinha
    description: Frango com catupiry
    price: "8.50"
    category: snacks
"#;
        assert!(matches!(parse_menu(content), Err(CliError::InvalidSeed(2))));
    }

    #[test]
    fn test_client_only_fields_rejected() {
        let content = r#"
items:
  - name: Coxinha
    description: Frango
    price: "8.50"
    category: snacks
    id: 7
"#;
        assert!(matches!(parse_menu(content), Err(CliError::Yaml(_))));
    }
}

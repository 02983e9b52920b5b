use comfy_table::{Cell, Table};

use crate::error::{Result, TallyError};
use crate::normalize::normalize_type;
use crate::settings::get_data_dir;
use crate::store::{create_category, get_connection, init_db, load_catalog};

pub fn add(name: &str, category_type: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TallyError::Other("Name is required".into()));
    }
    let kind = normalize_type(category_type).ok_or_else(|| {
        TallyError::Other(format!(
            "Invalid category type: {category_type} (must be 'income' or 'expense')"
        ))
    })?;
    let conn = get_connection(&get_data_dir().join("tally.db"))?;
    init_db(&conn)?;
    create_category(&conn, name.trim(), kind)?;
    println!("Added category: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("tally.db"))?;
    init_db(&conn)?;
    let catalog = load_catalog(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type"]);
    for category in &catalog.categories {
        table.add_row(vec![
            Cell::new(category.id),
            Cell::new(&category.name),
            Cell::new(category.kind.map(|k| k.as_str()).unwrap_or("-")),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

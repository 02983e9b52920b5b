use comfy_table::{Cell, Table};

use crate::error::{Result, TallyError};
use crate::settings::get_data_dir;
use crate::store::{create_tag, get_connection, init_db, load_catalog};

pub fn add(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TallyError::Other("Name is required".into()));
    }
    let conn = get_connection(&get_data_dir().join("tally.db"))?;
    init_db(&conn)?;
    create_tag(&conn, name.trim())?;
    println!("Added tag: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("tally.db"))?;
    init_db(&conn)?;
    let catalog = load_catalog(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name"]);
    for tag in &catalog.tags {
        table.add_row(vec![Cell::new(tag.id), Cell::new(&tag.name)]);
    }
    println!("Tags\n{table}");
    Ok(())
}

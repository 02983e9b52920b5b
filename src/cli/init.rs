use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{load_settings, save_settings};
use crate::store::{get_connection, init_db};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    let dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&dir)?;

    let conn = get_connection(&dir.join("tally.db"))?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Data dir:  {}", dir.display());
    println!("Database:  {}", dir.join("tally.db").display());
    println!("Run `tally template` for an example spreadsheet, then `tally import <file>`.");
    Ok(())
}

use crate::error::Result;
use crate::settings::{get_data_dir, load_settings};
use crate::store::get_connection;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = get_data_dir();
    let db_path = data_dir.join("tally.db");

    println!("Account:    {}", settings.default_account);
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let categories: i64 = conn.query_row("SELECT count(*) FROM categories", [], |r| r.get(0))?;
        let tags: i64 = conn.query_row("SELECT count(*) FROM tags", [], |r| r.get(0))?;
        let transactions: i64 =
            conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
        let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;

        println!();
        println!("Categories:    {categories}");
        println!("Tags:          {tags}");
        println!("Transactions:  {transactions}");
        println!("Imports:       {imports}");
    } else {
        println!();
        println!("Database not found. Run `tally init` to set up.");
    }

    Ok(())
}

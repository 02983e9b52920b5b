use std::path::PathBuf;

use crate::error::Result;
use crate::template::write_template;

pub fn run(output: Option<String>) -> Result<()> {
    let dir = output.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;
    let (transactions, categories) = write_template(&dir)?;
    println!("Wrote {}", transactions.display());
    println!("Wrote {}", categories.display());
    println!("Fill in the transactions file and run `tally import <file>`.");
    Ok(())
}

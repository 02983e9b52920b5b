pub mod categories;
pub mod import;
pub mod init;
pub mod status;
pub mod tags;
pub mod template;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Spreadsheet import and reconciliation for personal finance."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize the database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a CSV/XLSX spreadsheet of transactions.
    Import {
        /// Path to the CSV or XLSX file to import
        file: String,
        /// Account name to attach imported transactions to
        #[arg(long)]
        account: Option<String>,
        /// File format: csv or xlsx (default: by extension)
        #[arg(long)]
        format: Option<String>,
        /// CSV delimiter: ',', ';' or 'tab'
        #[arg(long)]
        delimiter: Option<String>,
        /// Treat the first row as data instead of a header
        #[arg(long = "no-header")]
        no_header: bool,
        /// Decimal separator used by amounts: '.' or ','
        #[arg(long = "decimal-separator")]
        decimal_separator: Option<String>,
        /// Override a column mapping, 1-based: COLUMN=FIELD (e.g. 3=amount)
        #[arg(long = "map")]
        map: Vec<String>,
        /// Run the whole pipeline and show the report without committing
        #[arg(long)]
        preview: bool,
        /// When the report has blocking errors, commit the valid rows anyway
        #[arg(long = "valid-only")]
        valid_only: bool,
        /// Print reconciliation decisions and the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write example transaction/category template files.
    Template {
        /// Output directory (default: current directory)
        #[arg(long)]
        output: Option<String>,
    },
    /// Manage the category catalog.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage the tag catalog.
    Tags {
        #[command(subcommand)]
        command: TagsCommands,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category.
    Add {
        /// Category name, e.g. 'Alimentação'
        name: String,
        /// Category type: income/receita or expense/despesa
        #[arg(long = "type")]
        category_type: String,
    },
    /// List all categories.
    List,
}

#[derive(Subcommand)]
pub enum TagsCommands {
    /// Add a tag.
    Add {
        /// Tag name, e.g. 'viagem'
        name: String,
    },
    /// List all tags.
    List,
}

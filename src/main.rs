mod cli;
mod decoder;
mod error;
mod extractor;
mod fmt;
mod mapper;
mod matcher;
mod models;
mod normalize;
mod pipeline;
mod rowparse;
mod settings;
mod store;
mod template;
mod validator;

use clap::Parser;

use cli::{CategoriesCommands, Cli, Commands, TagsCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import {
            file,
            account,
            format,
            delimiter,
            no_header,
            decimal_separator,
            map,
            preview,
            valid_only,
            json,
        } => cli::import::run(
            &file,
            account.as_deref(),
            format.as_deref(),
            delimiter.as_deref(),
            no_header,
            decimal_separator.as_deref(),
            &map,
            preview,
            valid_only,
            json,
        ),
        Commands::Template { output } => cli::template::run(output),
        Commands::Categories { command } => match command {
            CategoriesCommands::Add {
                name,
                category_type,
            } => cli::categories::add(&name, &category_type),
            CategoriesCommands::List => cli::categories::list(),
        },
        Commands::Tags { command } => match command {
            TagsCommands::Add { name } => cli::tags::add(&name),
            TagsCommands::List => cli::tags::list(),
        },
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

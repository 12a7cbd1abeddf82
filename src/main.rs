use clap::Parser;
use scribble::cli::{
    handle_add, handle_delete, handle_favourite, handle_get, handle_list, handle_serve,
    handle_update, Cli, Commands,
};
use scribble::{logging, Config, Result};

fn run(cli: Cli) -> Result<()> {
    let bind = match &cli.command {
        Commands::Serve { bind } => bind.clone(),
        _ => None,
    };
    let cwd = std::env::current_dir()?;
    let config = Config::load(cli.config.as_deref(), &cwd)?.with_overrides(cli.data, bind);

    logging::init(&config.log_level);
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Commands::Serve { .. } => handle_serve(&config),
        Commands::List {
            view,
            search,
            json,
        } => handle_list(&config, view, search, json),
        Commands::Get { id, json } => handle_get(&config, id, json),
        Commands::Add {
            title,
            content,
            stdin,
            priority,
            draft,
            favourite,
            json,
        } => handle_add(&config, title, content, stdin, priority, draft, favourite, json),
        Commands::Update {
            id,
            title,
            content,
            stdin,
            priority,
            draft,
            favourite,
            json,
        } => handle_update(
            &config, id, title, content, stdin, priority, draft, favourite, json,
        ),
        Commands::Favourite { id, json } => handle_favourite(&config, id, json),
        Commands::Delete { id, force } => handle_delete(&config, id, force),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

use clap::Parser;
use notedeck::cli::{
    handle_delete, handle_edit, handle_list, handle_new, handle_shell, handle_show, Cli, Commands,
    Context,
};

fn main() {
    let cli = Cli::parse();

    let result = Context::load(cli.data_dir).and_then(|ctx| {
        notedeck::logging::init(&ctx.config.log_level);

        match cli.command {
            Commands::List { search, json } => handle_list(&ctx, search, json),
            Commands::New { title, stdin, json } => handle_new(&ctx, title, stdin, json),
            Commands::Show { id, json } => handle_show(&ctx, id, json),
            Commands::Edit {
                id,
                title,
                content,
                stdin,
                json,
            } => handle_edit(&ctx, id, title, content, stdin, json),
            Commands::Delete { id, force } => handle_delete(&ctx, id, force),
            Commands::Shell => handle_shell(&ctx),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

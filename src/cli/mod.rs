mod commands;
mod handlers;
mod shell;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_delete, handle_edit, handle_list, handle_new, handle_shell, handle_show, Context,
};
pub use shell::run_shell;

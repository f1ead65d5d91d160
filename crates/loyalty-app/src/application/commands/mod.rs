pub mod check_in_commands;
pub mod command_handler;
pub mod handlers;

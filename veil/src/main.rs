use colored::Colorize;
use commands::command_argument_builder;
use veil_core::print_banner;

mod commands;

#[path = "handlers.rs"]
mod handlers;
use handlers::{handle_capture, handle_init, handle_open};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner and usage hint
        if !quiet {
            print_banner();
        }
        println!("Run {} for usage.", "veil --help".bright_white().bold());
        return;
    }

    match chosen_command.subcommand() {
        Some(("init", primary_command)) => {
            if !quiet {
                print_banner();
            }
            handle_init(primary_command)
        }
        // open and capture keep stdout clean for piping; no banner
        Some(("open", primary_command)) => handle_open(primary_command).await,
        Some(("capture", primary_command)) => handle_capture(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

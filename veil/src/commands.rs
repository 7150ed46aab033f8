use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("veil")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("veil")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a default veil.toml configuration file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to place veil.toml in")
                        .default_value("~/.config/veil/"),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite an existing configuration without prompting")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("open")
                .about("Fetch a page, optionally filter it through the local model, and emit the HTML")
                .arg(arg!(<URL>).help("The page to load"))
                .arg(
                    arg!(--"filter")
                        .required(false)
                        .help("Filter the page even when the config disables filtering")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with("no-filter"),
                )
                .arg(
                    arg!(--"no-filter")
                        .required(false)
                        .help("Skip filtering even when the config enables it")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with("filter"),
                )
                .arg(
                    arg!(--"summary")
                        .required(false)
                        .help("Replace the page with a per-section summary view")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Path to veil.toml (default: ./veil.toml, then ~/.config/veil/veil.toml)"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the HTML to a file instead of printing it")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("capture")
                .about("Render a page in a headless browser and save a PNG screenshot")
                .arg(arg!(<URL>).help("The page to capture"))
                .arg(
                    arg!(--"filtered")
                        .required(false)
                        .help("Filter the page through the local model before capturing")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"extract" <MODE>)
                        .required(false)
                        .help("Read the saved screenshot with a vision model and print the result")
                        .value_parser(["text", "headlines"]),
                )
                .arg(
                    arg!(--"width" <PIXELS>)
                        .required(false)
                        .help("Viewport width (default: from config)")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    arg!(--"height" <PIXELS>)
                        .required(false)
                        .help("Viewport height (default: from config)")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    arg!(-t --"timeout" <SECONDS>)
                        .required(false)
                        .help("Capture timeout in seconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Path to veil.toml"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Output file (default: ./veil_<timestamp>.png)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
}

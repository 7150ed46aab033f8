pub mod config;
pub mod media;
pub mod page;
pub mod pipeline;
pub mod summary;

pub use config::Config;
pub use page::{LoadPhase, LoadedPage, PageRequest};
pub use pipeline::{LoadProgressCallback, filter_endpoint_available, load_page};

use colored::Colorize;

const BANNER: &str = r#"
            _ _
 __   _____(_) |
 \ \ / / _ \ | |
  \ V /  __/ | |
   \_/ \___|_|_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_blue().bold());
    println!(
        "  {} v{} - a topic-filtering page loader\n",
        "veil".bright_white().bold(),
        env!("CARGO_PKG_VERSION")
    );
}

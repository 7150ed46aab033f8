use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber;
use url::Url;
use veil_capture::{CaptureOptions, VisionClient};
use veil_core::config::DEFAULT_CONFIG_TOML;
use veil_core::{Config, LoadProgressCallback, PageRequest};

const CONFIG_FILE_NAME: &str = "veil.toml";

// Helper functions shared by the open and capture handlers

/// Normalize user-typed input into a fetchable URL, prepending `https://`
/// when no scheme was given. Returns `None` for input that cannot become a
/// valid http(s) URL.
pub fn normalize_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Try to parse as-is
    if let Ok(url) = Url::parse(trimmed)
        && matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some()
    {
        return Some(url.to_string());
    }

    // Bare "example.com" style input: try adding https://
    if !trimmed.contains("://") {
        let with_scheme = format!("https://{}", trimmed);
        if let Ok(url) = Url::parse(&with_scheme)
            && url.host_str().is_some()
        {
            return Some(url.to_string());
        }
    }

    None
}

/// Resolve the config file path: an explicit `--config` wins, then a
/// `veil.toml` in the working directory, then the per-user default.
pub fn resolve_config_path(explicit: Option<&String>) -> PathBuf {
    if let Some(path) = explicit {
        let expanded = shellexpand::tilde(path);
        return PathBuf::from(expanded.as_ref());
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }

    let expanded = shellexpand::tilde("~/.config/veil/veil.toml");
    PathBuf::from(expanded.as_ref())
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush().unwrap();
    let mut response = String::new();
    io::stdin().read_line(&mut response).unwrap();
    response.trim().to_lowercase()
}

pub fn handle_init(args: &ArgMatches) {
    let target_dir = args.get_one::<String>("PATH").unwrap();
    let force = args.get_flag("force");
    let expanded_config_dir = shellexpand::tilde(target_dir);
    let config_dir = Path::new(expanded_config_dir.as_ref());
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    println!(
        "{} Target: {}",
        "→".blue(),
        config_path.display().to_string().bright_white()
    );

    if config_path.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!(
            "A configuration file already exists at {}",
            config_path.display().to_string().bright_white()
        );

        let response = print_prompt("Overwrite it? [y/N]:");
        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return;
        }
        println!("{} Proceeding with overwrite", "→".yellow().bold());
    }

    fs::create_dir_all(config_dir).expect("Failed to create config directory");
    fs::write(&config_path, DEFAULT_CONFIG_TOML).expect("Failed to write config file");

    println!(
        "{} Config written: {}",
        "✓".green().bold(),
        config_path.display().to_string().bright_white()
    );
    println!(
        "{} Edit the {} list to choose what gets filtered out.",
        "ℹ".blue(),
        "topics".bright_white()
    );
}

pub async fn handle_open(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let raw_url = sub_matches.get_one::<String>("URL").unwrap();
    let filter_flag = sub_matches.get_flag("filter");
    let no_filter_flag = sub_matches.get_flag("no-filter");
    let summary = sub_matches.get_flag("summary");
    let output = sub_matches.get_one::<PathBuf>("output");

    let url = match normalize_url(raw_url) {
        Some(url) => url,
        None => {
            eprintln!("{} Invalid URL: {}", "✗".red().bold(), raw_url);
            std::process::exit(1);
        }
    };

    let config_path = resolve_config_path(sub_matches.get_one::<String>("config"));
    let mut config = Config::load(&config_path);
    if summary {
        config.display.summary_view = true;
    }

    let filter_override = if filter_flag {
        Some(true)
    } else if no_filter_flag {
        Some(false)
    } else {
        None
    };

    // Probe the endpoint up front so the warning lands before the wait
    let mut probe_config = config.clone();
    if let Some(enabled) = filter_override {
        probe_config.filtering.enabled = enabled;
    }
    if !veil_core::filter_endpoint_available(&probe_config).await {
        eprintln!(
            "{} Cannot reach {} - pages will load unfiltered",
            "⚠".yellow().bold(),
            probe_config.ollama.api_url.bright_white()
        );
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let spinner_clone = spinner.clone();
    let progress: LoadProgressCallback = Arc::new(move |phase| {
        spinner_clone.set_message(phase.to_string());
    });

    let request = PageRequest::new(&url);
    let result = veil_core::load_page(request, &config, filter_override, Some(progress)).await;
    spinner.finish_and_clear();

    match result {
        Ok(page) => {
            if let Some(warning) = &page.filter_warning {
                eprintln!("{} {}", "⚠".yellow().bold(), warning);
            }
            match output {
                Some(path) => {
                    if let Err(e) = fs::write(path, &page.html) {
                        eprintln!("{} Failed to write {}: {}", "✗".red().bold(), path.display(), e);
                        std::process::exit(1);
                    }
                    println!(
                        "{} Saved {} to {}",
                        "✓".green().bold(),
                        page.final_url.bright_white(),
                        path.display().to_string().bright_white()
                    );
                }
                None => {
                    print!("{}", page.html);
                }
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_capture(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let raw_url = sub_matches.get_one::<String>("URL").unwrap();
    let filtered = sub_matches.get_flag("filtered");
    let extract = sub_matches.get_one::<String>("extract");
    let output = sub_matches.get_one::<PathBuf>("output");

    let url = match normalize_url(raw_url) {
        Some(url) => url,
        None => {
            eprintln!("{} Invalid URL: {}", "✗".red().bold(), raw_url);
            std::process::exit(1);
        }
    };

    let config_path = resolve_config_path(sub_matches.get_one::<String>("config"));
    let config = Config::load(&config_path);

    let mut options = CaptureOptions {
        width: config.capture.width,
        height: config.capture.height,
        timeout_secs: config.capture.timeout_secs,
    };
    if let Some(width) = sub_matches.get_one::<u32>("width") {
        options.width = *width;
    }
    if let Some(height) = sub_matches.get_one::<u32>("height") {
        options.height = *height;
    }
    if let Some(timeout) = sub_matches.get_one::<u64>("timeout") {
        options.timeout_secs = *timeout;
    }

    let output_path = match output {
        Some(path) => path.clone(),
        None => veil_capture::default_output_path(Path::new(".")),
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let captured = if filtered {
        // Load through the filter pipeline, then render the rewritten HTML
        let spinner_clone = spinner.clone();
        let progress: LoadProgressCallback = Arc::new(move |phase| {
            spinner_clone.set_message(phase.to_string());
        });

        let request = PageRequest::new(&url);
        let page = match veil_core::load_page(request, &config, Some(true), Some(progress)).await {
            Ok(page) => page,
            Err(e) => {
                spinner.finish_and_clear();
                eprintln!("{} {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        };
        if let Some(warning) = &page.filter_warning {
            spinner.println(format!("{} {}", "⚠".yellow().bold(), warning));
        }

        spinner.set_message("Capturing screenshot...");
        veil_capture::capture_html(&page.html, &output_path, &options).await
    } else {
        spinner.set_message("Capturing screenshot...");
        veil_capture::capture_url(&url, &output_path, &options).await
    };
    spinner.finish_and_clear();

    let saved = match captured {
        Ok(path) => {
            eprintln!(
                "{} Screenshot saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
            path
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Some(mode) = extract {
        extract_from_screenshot(&saved, mode, &config).await;
    }
}

/// Read a saved screenshot back through the vision model and print the
/// result. The screenshot is already on disk; an extraction failure exits
/// non-zero but never removes it.
async fn extract_from_screenshot(path: &Path, mode: &str, config: &Config) {
    let image = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("{} Failed to read {}: {}", "✗".red().bold(), path.display(), e);
            std::process::exit(1);
        }
    };

    let model = if mode == "text" {
        &config.vision.ocr_model
    } else {
        &config.vision.model
    };
    let client = VisionClient::new(&config.ollama.api_url, model, config.vision.timeout_secs);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Reading screenshot...");

    let result = if mode == "text" {
        client.extract_text(&image).await
    } else {
        client.extract_headlines(&image).await
    };
    spinner.finish_and_clear();

    match result {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

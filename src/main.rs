use clap::{Parser, Subcommand};
use std::path::PathBuf;
use studio_site::api::HttpApi;
use studio_site::config::{self, SiteConfig};
use studio_site::lightbox::MemoryScroll;
use studio_site::prefs::FilePreferences;
use studio_site::route::{parse_route, route_to_path};
use studio_site::shell::Shell;
use studio_site::{output, render};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "studio-site")]
#[command(about = "Content client for a CMS-driven photography studio site")]
#[command(long_about = "\
Content client for a CMS-driven photography studio site

Every page, menu, collection and translation comes from the CMS API.
This tool parses routes, renders a route to a complete HTML document,
and submits contact messages.

Routes:

  /                          home page
  /{slug}/                   CMS page
  /expeditions/              expedition index
  /expeditions/{slug}/       expedition detail
  /focus/  /focus/{slug}/    focus areas
  /stories/  /stories/{slug}/

Set RUST_LOG (e.g. RUST_LOG=studio_site=debug) for diagnostics.
Run 'studio-site gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding site.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// CMS API root (overrides api_base from site.toml)
    #[arg(long, global = true)]
    api: Option<String>,

    /// Preference store file (theme, locale)
    #[arg(long, default_value = ".studio-site/prefs.json", global = true)]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a path and print its route and canonical form
    Route {
        /// Path to parse, e.g. /expeditions/glacier/
        path: String,
    },
    /// Load one route from the CMS and render it to HTML
    Render {
        /// Path to render
        #[arg(default_value = "/")]
        path: String,
        /// Locale to render in
        #[arg(long)]
        lang: Option<String>,
        /// Write the document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Submit a message through the contact endpoint
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Route { ref path } => {
            let route = parse_route(path);
            let canonical = route_to_path(&route, &[route.page_slug()]);
            output::print_route_output(&route, &canonical);
        }
        Command::Render {
            ref path,
            ref lang,
            ref out,
        } => {
            let mut shell = open_shell(&cli, &render_url(path, lang.as_deref()))?;
            shell.refresh();
            let document = render::render_document(&shell).into_string();
            let view = shell.view();
            let warnings = shell.errors();
            match out {
                Some(out) => {
                    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &document)?;
                    let destination = out.display().to_string();
                    output::print_render_output(&view, Some(&destination), &warnings);
                }
                None => {
                    println!("{document}");
                    for warning in warnings {
                        tracing::warn!("{warning}");
                    }
                }
            }
        }
        Command::Contact {
            ref name,
            ref email,
            ref message,
        } => {
            let mut shell = open_shell(&cli, "/")?;
            let form = shell.contact_mut();
            form.name = name.clone();
            form.email = email.clone();
            form.message = message.clone();
            let status = shell.submit_contact();
            output::print_contact_output(&status);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the log subscriber. `RUST_LOG` wins; otherwise warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render_url(path: &str, lang: Option<&str>) -> String {
    match lang {
        Some(lang) => format!("{path}?lang={}", urlencoding::encode(lang)),
        None => path.to_string(),
    }
}

fn load_site_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut site = config::load_config(&cli.config)?;
    if let Some(api) = &cli.api {
        site.api_base = api.clone();
        site.validate()?;
    }
    Ok(site)
}

fn open_shell(
    cli: &Cli,
    url: &str,
) -> Result<Shell<HttpApi, FilePreferences, MemoryScroll>, Box<dyn std::error::Error>> {
    let site = load_site_config(cli)?;
    let api = HttpApi::new(&site.api_base, site.http.timeout())?;
    let prefs = FilePreferences::load(&cli.state);
    Ok(Shell::new(site, api, prefs, MemoryScroll::new(""), url))
}

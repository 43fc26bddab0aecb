mod helpers;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use cloud_image_platforms::{
    CatalogProvider, DriverConfig, ImageRequest, ImageSelection, PlatformDescriptor, Resolver,
    SearchQuery, families,
};
use helpers::{choose_one, progress::spinner};

#[derive(Parser, Debug)]
#[command(name = "cloud-image-platforms", version, about = "Resolve platform names to machine images")]
struct Cli {
    /// Driver config file (JSON)
    #[arg(long, short, global = true, env = "CLOUD_IMAGE_PLATFORMS_CONFIG")]
    config: Option<PathBuf>,

    /// Image catalog: file path or http(s) URL of a describe-images document
    #[arg(long, global = true, env = "CLOUD_IMAGE_PLATFORMS_CATALOG")]
    catalog: Option<String>,

    /// Debug logging for this crate
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a platform (or explicit search) to an image id
    Resolve {
        platform: Option<String>,
        /// Explicit filter NAME=VALUE; repeatable, bypasses the platform
        #[arg(long = "search", value_parser = parse_filter)]
        search: Vec<(String, String)>,
    },
    /// Print the filters a platform searches with
    Search { platform: String },
    /// Infer the platform of an image id
    Infer { image_id: String },
    /// List registered families and their login users
    Families,
    /// Parse a platform string
    Parse { platform: String },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}

/// Merge repeated `--search` flags into one query, one filter per name.
fn search_from_flags(flags: &[(String, String)]) -> SearchQuery {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for (name, value) in flags {
        match grouped.iter_mut().find(|(existing, _)| *existing == name.as_str()) {
            Some((_, values)) => values.push(value.as_str()),
            None => grouped.push((name.as_str(), vec![value.as_str()])),
        }
    }
    grouped
        .into_iter()
        .fold(SearchQuery::new(), |query, (name, values)| query.filter_values(name, values))
}

fn load_config(cli: &Cli) -> Result<DriverConfig> {
    let mut config = match &cli.config {
        Some(path) => DriverConfig::from_file(path)
            .with_context(|| format!("read config {}", path.display()))?,
        None => DriverConfig::default(),
    };
    if let Some(catalog) = &cli.catalog {
        config.set_catalog(catalog);
    }
    Ok(config)
}

async fn load_provider(config: &DriverConfig) -> Result<CatalogProvider> {
    let Some(source) = config.catalog() else {
        bail!("no image catalog configured (use --catalog or the config's \"catalog\" key)");
    };
    let pb = spinner(format!("Loading image catalog {source}"));
    let provider = CatalogProvider::load(source).await;
    pb.finish_and_clear();
    provider.with_context(|| format!("load image catalog {source}"))
}

async fn resolve(mut config: DriverConfig, platform: Option<String>, search: Vec<(String, String)>) -> Result<()> {
    if let Some(platform) = platform {
        config.set_platform(platform);
    }
    if !search.is_empty() {
        config.set_image_search(&search_from_flags(&search));
    }
    if config.image_selection() == ImageSelection::Unspecified {
        let names = families::registry().names();
        let family = choose_one("Select Platform Family", names)?;
        config.set_platform(family);
    }

    let request: ImageRequest = match config.image_selection() {
        ImageSelection::Fixed(id) => {
            println!("{id}");
            return Ok(());
        }
        ImageSelection::Resolve(request) => request,
        ImageSelection::Unspecified => bail!("no platform, image_search or image_id given"),
    };

    let resolver = Resolver::new(load_provider(&config).await?);
    let pb = spinner("Searching images");
    let resolved = resolver.resolve(request).await;
    pb.finish_and_clear();

    match resolved? {
        Some(image_id) => {
            println!("{image_id}");
            if let Some(username) = config.username(families::registry()) {
                eprintln!("username: {username}");
            }
            Ok(())
        }
        None => bail!("unresolved: no image matched; set image_id explicitly"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    helpers::logging::init(cli.verbose);
    families::init().context("initialize family registry")?;

    let config = load_config(&cli)?;

    match cli.command {
        Command::Resolve { platform, search } => resolve(config, platform, search).await,
        Command::Search { platform } => {
            let resolver = Resolver::new(CatalogProvider::default());
            match resolver.search_for(&ImageRequest::Platform(platform.clone())) {
                Some(query) => {
                    println!("{}", serde_json::to_string_pretty(&query)?);
                    Ok(())
                }
                None => bail!("unknown platform family in '{platform}'"),
            }
        }
        Command::Infer { image_id } => {
            let resolver = Resolver::new(load_provider(&config).await?);
            match resolver.infer_image_id(&image_id).await? {
                Some(descriptor) => {
                    println!("{descriptor}");
                    Ok(())
                }
                None => bail!("could not infer a platform for {image_id}"),
            }
        }
        Command::Families => {
            for (name, family) in families::registry().iter() {
                println!("{name:<10} {}", family.strategy().username(None));
            }
            Ok(())
        }
        Command::Parse { platform } => {
            let descriptor = PlatformDescriptor::parse(&platform);
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
            Ok(())
        }
    }
}

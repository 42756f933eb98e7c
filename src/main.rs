use clap::{Parser, Subcommand};
use spacetraveling::prismic::PrismicClient;
use spacetraveling::{config, fetch, generate, logging, output};
use std::path::{Path, PathBuf};

/// Shared flags for commands that write HTML.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the render cache and re-render every post page
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(about = "Static blog generator for Prismic-hosted posts")]
#[command(long_about = "\
Static blog generator for Prismic-hosted posts

Posts live in a Prismic repository as documents of one custom type. The build
reads them through the REST API and writes a plain static site:

  dist/
  ├── index.html                   # First listing page
  ├── page/2/index.html            # Listing with more posts (\"Carregar mais posts\")
  ├── post/<uid>/index.html        # One page per post
  ├── 404.html
  └── favicon.png                  # Copied from the assets directory

Post documents need a uid, a title, and a repeatable group of content sections
(heading + rich text body). Subtitle, author, and banner are optional.

The API endpoint and access token can come from PRISMIC_API_ENDPOINT and
PRISMIC_ACCESS_TOKEN instead of config.toml.

Run 'spacetraveling gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory holding config.toml and the assets directory
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".spacetraveling-temp", global = true)]
    temp_dir: PathBuf,

    /// Log requests and cache decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all posts from the content API into a manifest
    Fetch,
    /// Produce the HTML site from the fetched manifest
    Generate(CacheArgs),
    /// Run the full pipeline: fetch → generate
    Build(CacheArgs),
    /// Re-fetch one post by uid, update the manifest, and regenerate
    Refresh {
        /// Uid of the post that changed
        uid: String,
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Fetch and validate content without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let manifest_path = cli.temp_dir.join("manifest.json");

    match cli.command {
        Command::Fetch => {
            let manifest = run_fetch(&cli.config_dir)?;
            fetch::save_manifest(&manifest_path, &manifest)?;
            output::print_fetch_output(&manifest);
        }
        Command::Generate(cache_args) => {
            let manifest = fetch::load_manifest(&manifest_path)?;
            run_generate(&manifest, &cli.config_dir, &cli.output, &cache_args)?;
        }
        Command::Build(cache_args) => {
            println!("==> Stage 1: Fetching posts");
            let manifest = run_fetch(&cli.config_dir)?;
            fetch::save_manifest(&manifest_path, &manifest)?;
            output::print_fetch_output(&manifest);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            run_generate(&manifest, &cli.config_dir, &cli.output, &cache_args)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Refresh { uid, cache } => {
            let config = config::load_config(&cli.config_dir)?;
            let client = PrismicClient::new(&config.api)?;
            let mut manifest = fetch::load_manifest(&manifest_path)?;
            // The stored config lacks the access token; take the current one.
            manifest.config = config;
            let outcome = fetch::refresh_post(&client, &mut manifest, &uid)?;
            fetch::save_manifest(&manifest_path, &manifest)?;
            output::print_refresh_output(&uid, outcome);

            run_generate(&manifest, &cli.config_dir, &cli.output, &cache)?;
        }
        Command::Check => {
            println!("==> Checking {}", cli.config_dir.join("config.toml").display());
            let manifest = run_fetch(&cli.config_dir)?;
            output::print_check_output(&manifest);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_fetch(config_dir: &Path) -> Result<fetch::Manifest, Box<dyn std::error::Error>> {
    let config = config::load_config(config_dir)?;
    let client = PrismicClient::new(&config.api)?;
    Ok(fetch::fetch(&client, &config)?)
}

fn run_generate(
    manifest: &fetch::Manifest,
    config_dir: &Path,
    output_dir: &Path,
    cache_args: &CacheArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let assets_dir = config_dir.join(&manifest.config.assets_dir);
    let result = generate::generate(
        manifest,
        output_dir,
        Some(&assets_dir),
        !cache_args.no_cache,
    )?;
    output::print_generate_output(&result);
    Ok(())
}

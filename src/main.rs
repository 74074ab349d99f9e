use clap::{Parser, Subcommand};
use folio::{config, generate, output, process, scan};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that process images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the processing cache — force re-encoding of all images
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
            // Called once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Static builder for a single-page personal home page")]
#[command(long_about = "\
Static builder for a single-page personal home page

Profile, records and prose live in plain files; photos are encoded at several
widths and formats and served as responsive backgrounds.

Content structure:

  content/
  ├── config.toml                  # Profile, asset settings, colors
  ├── education.json               # [{degree, university, advisor: {name, url}}]
  ├── publications.json            # [{title, url, authors, conference}]
  ├── sections/
  │   ├── 010-About-Me.md          # Prose section (numbered = on the page)
  │   ├── 030-Background.md
  │   └── notes.md                 # No number prefix = left off the page
  └── assets/
      ├── background.jpg           # Page background
      ├── header.jpg               # Name card background
      ├── content.png              # Tile behind the main column
      └── headshot.jpg

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest, processed images)
    #[arg(long, default_value = ".folio-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Encode every asset at its configured widths and formats
    Process(CacheArgs),
    /// Produce the final page from processed assets
    Generate,
    /// Run the full pipeline: scan → process → generate
    Build(CacheArgs),
    /// Validate content directory without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Scan => {
            run_scan(&cli.source, &cli.temp_dir)?;
        }
        Command::Process(cache_args) => {
            let scan_manifest_path = cli.temp_dir.join("manifest.json");
            let manifest_content = std::fs::read_to_string(&scan_manifest_path)?;
            let input_manifest: serde_json::Value = serde_json::from_str(&manifest_content)?;
            let site_config: config::SiteConfig =
                serde_json::from_value(input_manifest.get("config").cloned().unwrap_or_default())?;
            run_process(
                &site_config,
                &cli.source,
                &cli.temp_dir,
                !cache_args.no_cache,
            )?;
        }
        Command::Generate => {
            run_generate(&cli.temp_dir, &cli.output)?;
        }
        Command::Build(cache_args) => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = run_scan(&cli.source, &cli.temp_dir)?;

            println!("==> Stage 2: Processing images");
            run_process(
                &manifest.config,
                &cli.source,
                &cli.temp_dir,
                !cache_args.no_cache,
            )?;

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            run_generate(&cli.temp_dir, &cli.output)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_scan(
    source: &Path,
    temp_dir: &Path,
) -> Result<scan::Manifest, Box<dyn std::error::Error>> {
    let manifest = scan::scan(source)?;
    std::fs::create_dir_all(temp_dir)?;
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(temp_dir.join("manifest.json"), json)?;
    output::print_scan_output(&manifest, source);
    Ok(manifest)
}

fn run_process(
    site_config: &config::SiteConfig,
    source: &Path,
    temp_dir: &Path,
    use_cache: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&site_config.processing);
    let processed_dir = temp_dir.join("processed");
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(
        &temp_dir.join("manifest.json"),
        source,
        &processed_dir,
        use_cache,
        Some(tx),
    );
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let result = result?;

    let json = serde_json::to_string_pretty(&result.manifest)?;
    std::fs::write(processed_dir.join("manifest.json"), &json)?;
    println!("Cache: {}", result.cache_stats);
    Ok(())
}

fn run_generate(temp_dir: &Path, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let processed_dir = temp_dir.join("processed");
    let report = generate::generate(
        &processed_dir.join("manifest.json"),
        &processed_dir,
        output_dir,
    )?;
    output::print_generate_output(&report);
    Ok(())
}

/// Diagnostics go to stderr so they never mix with the progress output.
///
/// `FOLIO_LOG` takes an `EnvFilter` directive (default `folio=warn`);
/// `FOLIO_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("FOLIO_LOG")
        .unwrap_or_else(|_| EnvFilter::new("folio=warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if std::env::var("FOLIO_LOG_FORMAT").is_ok_and(|f| f == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

use clap::{Parser, Subcommand};
use folio_assets::{config, output, pipeline};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio-assets")]
#[command(about = "Derive AVIF and WebP thumbnails for portfolio projects")]
#[command(long_about = "\
Derive AVIF and WebP thumbnails for portfolio projects

Every project directory under the content root may hold a canonical
thumbnail and a gallery folder. Each source gets an AVIF and a WebP
derivative, cover-fitted and written next to it. Derivatives that are
already newer than their source are left alone, so re-running is cheap.

Content structure:

  content/projects/
  ├── config.toml              # Optional overrides
  ├── alpha/
  │   ├── thumbnail.jpg        # → thumbnail.avif, thumbnail.webp (300x400)
  │   └── images/
  │       ├── a.jpg            # → a_thumb.avif, a_thumb.webp (300x300)
  │       └── b.png
  ├── .drafts/                 # Hidden: skipped
  └── old.zip                  # Archive: skipped

Run 'folio-assets gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content root holding one directory per project
    #[arg(long, default_value = "content/projects", global = true)]
    source: PathBuf,

    /// Maximum parallel transcode workers (overrides config)
    #[arg(long, short, global = true)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Regenerate missing or stale derivatives (default)
    Build,
    /// List stale derivatives without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Build);

    if let Command::GenConfig = command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut pipeline_config = config::load_config(&cli.source)?;
    if let Some(jobs) = cli.jobs {
        pipeline_config.processing.max_processes = Some(jobs);
    }

    match command {
        Command::Build => {
            println!(
                "==> Deriving assets in {} ({} workers)",
                cli.source.display(),
                config::effective_threads(&pipeline_config.processing)
            );
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_event(&event);
                }
            });
            let result = pipeline::run(&cli.source, &pipeline_config, Some(tx));
            // The sender is dropped once `run` returns, which ends the printer
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let report = result?;
            output::print_report(&report);
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let plan = pipeline::plan(&cli.source, &pipeline_config)?;
            output::print_plan(&plan, &cli.source);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

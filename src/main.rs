use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strip_index::config::{self, IdMode, Overrides};
use strip_index::types::VariantTag;
use strip_index::{output, pipeline};

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
#[command(name = "strip-index")]
#[command(about = "Pair strip images with their masks and write a JSON index")]
#[command(long_about = "\
Pair strip images with their masks and write a JSON index

A strip directory holds one primary image per item plus derived variants
that share its name and add a suffix:

  strip2/
  ├── strip-index.toml         # Optional config
  ├── S2_00017.jpg             # primary
  ├── S2_00017_mask.png        # mask (suffix _mask, any case)
  ├── S2_00018.jpg
  ├── S2_00018_an.jpg          # annotation (suffix _an)
  └── S2_00020.jpg

Files sharing a logical key form a group. Groups carrying exactly the
required variants (default: primary + mask) are written to the index; all
others are reported and skipped.

IDs are sequential (1..N in key order) or extracted from a numeric field of
the key (S2_00017 → 00017), sorted numerically.

Run 'strip-index gen-config' to generate a documented strip-index.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Strip directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Config file (default: <source>/strip-index.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that build an index.
#[derive(clap::Args, Clone)]
struct IndexArgs {
    /// URL prefix for every file in the index
    #[arg(long)]
    base_url: Option<String>,

    /// Index file path, relative to the source directory
    #[arg(long)]
    output: Option<String>,

    /// How IDs are assigned
    #[arg(long, value_enum)]
    id_mode: Option<IdMode>,

    /// Variant tags a group must carry, e.g. primary,mask
    #[arg(long, value_delimiter = ',')]
    require: Option<Vec<VariantTag>>,

    /// Rename indexed files to their IDs
    #[arg(long)]
    rename: bool,
}

impl IndexArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            output: self.output.clone(),
            id_mode: self.id_mode,
            required: self.require.clone(),
            rename: self.rename,
            gaps_output: None,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Group variants, assign IDs and write the JSON index
    Index(IndexArgs),
    /// Report contiguous runs and gaps in the numeric IDs
    Gaps {
        /// Report file path, relative to the source directory
        #[arg(long)]
        output: Option<String>,
    },
    /// Compare the file names in two folders
    Compare {
        first: PathBuf,
        second: PathBuf,
        /// Also write the report to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show what `index` would write, without writing or renaming
    Check(IndexArgs),
    /// Print a stock strip-index.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    match cli.command {
        Command::Index(args) => {
            let mut config = config::load_config(&cli.source, cli.config.as_deref())?;
            config.apply(&args.overrides())?;
            println!("==> Indexing {}", cli.source.display());
            let run = pipeline::build_index(&cli.source, &config)?;
            output::print_index_output(&run);
        }
        Command::Gaps { output: report } => {
            let mut config = config::load_config(&cli.source, cli.config.as_deref())?;
            config.apply(&Overrides {
                gaps_output: report,
                ..Overrides::default()
            })?;
            let run = pipeline::find_gaps(&cli.source, &config)?;
            let written = pipeline::write_gap_report(&cli.source, &config, &run)?;
            output::print_gap_output(&run, Some(&written));
        }
        Command::Compare {
            first,
            second,
            output: report,
        } => {
            let cmp = pipeline::compare(&first, &second, report.as_deref())?;
            output::print_compare_output(&cmp, report.as_deref());
        }
        Command::Check(args) => {
            let mut config = config::load_config(&cli.source, cli.config.as_deref())?;
            config.apply(&args.overrides())?;
            println!("==> Checking {}", cli.source.display());
            let plan = pipeline::plan_index(&cli.source, &config)?;
            output::print_check_output(&plan);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

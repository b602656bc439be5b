mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;
use vgoroot_lib::consts::OVERLAY_PREFIX;

/// vgoroot - virtual library roots and toolchain archives
#[derive(Parser)]
#[command(name = "vgoroot")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Merge a vanilla source tree with an overlay into a new directory
  Merge {
    /// Root of the unmodified source tree
    #[arg(long)]
    vanilla: PathBuf,

    /// Directory holding the overlay sources
    #[arg(long)]
    overlay: PathBuf,

    /// Directory to write the merged tree to
    #[arg(long)]
    out: PathBuf,

    /// Prefix for overlay files in merged directories
    #[arg(long, default_value = OVERLAY_PREFIX)]
    prefix: String,

    /// Maximum number of directories augmented in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Build (or reuse) a virtual root and print its path
  Vroot {
    /// The real library root
    #[arg(long)]
    goroot: PathBuf,

    /// Toolchain version the library root belongs to
    #[arg(long)]
    go_version: String,

    /// Directory holding the overlay sources
    #[arg(long)]
    overlay: PathBuf,

    /// Directory to create virtual roots in (default: $VGOROOT_DIR or the temp dir)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Rebuild even if the existing root is up to date
    #[arg(short, long)]
    force: bool,

    /// Maximum number of directories augmented in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Inspect and create archive files
  Ar {
    #[command(subcommand)]
    command: ArCommands,
  },
}

#[derive(Subcommand)]
enum ArCommands {
  /// List the entries of an archive
  List {
    /// Archive file
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Extract one entry of an archive
  Extract {
    /// Archive file
    file: PathBuf,

    /// Name of the entry
    name: String,

    /// Where to write the entry (default: the entry name)
    #[arg(short, long)]
    out: Option<PathBuf>,
  },

  /// Create an archive from files, one entry per file
  Create {
    /// Archive file to write
    out: PathBuf,

    /// Files to store, named by their file name
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Merge {
      vanilla,
      overlay,
      out,
      prefix,
      jobs,
      output,
    } => cmd::cmd_merge(&vanilla, &overlay, &out, prefix, jobs, output),
    Commands::Vroot {
      goroot,
      go_version,
      overlay,
      base_dir,
      force,
      jobs,
      output,
    } => cmd::cmd_vroot(cmd::VrootArgs {
      goroot,
      go_version,
      overlay,
      base_dir,
      force,
      jobs,
      output,
    }),
    Commands::Ar { command } => match command {
      ArCommands::List { file, output } => cmd::cmd_ar_list(&file, output),
      ArCommands::Extract { file, name, out } => cmd::cmd_ar_extract(&file, &name, out.as_deref()),
      ArCommands::Create { out, inputs } => cmd::cmd_ar_create(&out, &inputs),
    },
  }
}

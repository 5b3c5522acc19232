use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::LevelFilter;

const EXAMPLES: &str = "\
Examples:
  jpeg-dedup -v /path/to/images /another/path/to/images /path/to/destination
      Copy the unique JPEGs of both trees into /path/to/destination with
      per-file output.

  jpeg-dedup image1.jpg image2.jpg /path/to/more/images /path/to/destination
      Copy the unique JPEGs among three files and a directory.";

#[derive(Parser)]
#[command(
    name = "jpeg-dedup",
    version,
    about = "Copy one version of every distinct JPEG, named by its EXIF capture time",
    long_about = "Scans files and directories recursively for .jpg files, drops byte-identical \
                  duplicates (first one found wins) and copies the rest into the destination \
                  directory as YYYYMMDD_HHMMSS.jpg. Files without an EXIF capture time use \
                  their modification time. Copies get that time as their mtime and atime.",
    after_help = EXAMPLES
)]
struct Cli {
    /// Print every file visited, its digest, duplicates skipped and copies made
    #[arg(short, long)]
    verbose: bool,

    /// Source files or directories, followed by the existing destination directory
    #[arg(required = true, num_args = 2.., value_name = "PATHS")]
    paths: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument | ErrorKind::TooFewValues
            ) =>
        {
            // Too few paths: show usage and do nothing
            Cli::command().print_long_help()?;
            return Ok(());
        }
        Err(e) => e.exit(),
    };

    init_logging(cli.verbose);
    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let Some((destination, sources)) = cli.paths.split_last() else {
        Cli::command().print_long_help()?;
        return Ok(());
    };

    let options = jpeg_dedup_core::ProcessOptions {
        sources: sources.to_vec(),
        destination: destination.clone(),
        verbose: cli.verbose,
    };

    jpeg_dedup_core::process(&options)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("jpeg_dedup_core", level)
        .filter_module("jpeg_dedup", level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

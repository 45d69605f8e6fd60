//! pdfsplice - Split and merge PDF files while keeping their bookmarks.

use std::ops::ControlFlow;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use pdfsplice::SpliceError;
use pdfsplice::cli::{Cli, Command, MergeArgs, OutlineArgs, SplitArgs};
use pdfsplice::config::OverwriteMode;
use pdfsplice::io::{PdfReader, PdfWriter};
use pdfsplice::merge::Merger;
use pdfsplice::outline::{OutlineExtractor, count_nodes, render_tree};
use pdfsplice::output::{
    OutputFormatter, ProgressBar, ProgressStyle, display_merge_statistics,
    display_split_statistics,
};
use pdfsplice::split::Splitter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<SpliceError>()
            .map_or(1, SpliceError::exit_code);
        process::exit(code);
    }
}

/// Route `log` records to stderr. `RUST_LOG` overrides the default level.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Split(args) => run_split(&cli, args).await,
        Command::Merge(args) => run_merge(&cli, args).await,
        Command::Outline(args) => run_outline(&cli, args).await,
    }
}

async fn run_split(cli: &Cli, args: &SplitArgs) -> Result<()> {
    let config = cli.split_config(args)?;
    let formatter = OutputFormatter::for_split(&config);

    let source = PdfReader::new().load(&config.input).await?;
    formatter.info(&format!(
        "Splitting {} ({} page(s)) by {}...",
        source.name,
        source.page_count,
        config.options.mode.describe()
    ));

    let splitter = Splitter::with_writer(PdfWriter::with_compression(config.compression));
    let mut bar = progress_bar(&formatter, "Splitting");
    let outcome = splitter
        .split(&source, &config.options, |progress| {
            bar.observe(progress);
            ControlFlow::Continue(())
        })
        .await?;
    bar.finish();

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|source| SpliceError::FailedToCreateOutput {
            path: config.output_dir.clone(),
            source,
        })?;

    let writer = PdfWriter::with_compression(config.compression);
    for (index, part) in outcome.results.into_iter().enumerate() {
        let path = config.output_dir.join(&part.name);
        handle_output_overwrite(&path, config.overwrite_mode, &formatter).await?;
        let stats = writer.save_bytes(part.data, &path).await?;
        formatter.list_item(
            index + 1,
            &format!(
                "{} (pages {}, {})",
                path.display(),
                part.page_range,
                stats.format_file_size()
            ),
        );
    }

    display_split_statistics(&formatter, &outcome.statistics);

    match outcome.failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

async fn run_merge(cli: &Cli, args: &MergeArgs) -> Result<()> {
    let config = cli.merge_config(args).await?;
    let formatter = OutputFormatter::for_merge(&config);

    handle_output_overwrite(&config.output, config.overwrite_mode, &formatter).await?;

    formatter.info(&format!("Merging {} file(s)...", config.inputs.len()));
    let writer = PdfWriter::with_compression(config.compression);
    let merger = Merger::with_writer(writer.clone());

    let items = merger.load(&config).await?;
    for item in &items {
        formatter.debug(&format!(
            "Loaded {} ({} page(s), {})",
            item.pdf.name,
            item.pdf.page_count,
            pdfsplice::utils::format_file_size(item.pdf.file_size)
        ));
    }

    let mut bar = progress_bar(&formatter, "Merging");
    let output = merger
        .merge(&items, |progress| {
            bar.observe(progress);
            ControlFlow::Continue(())
        })
        .await?;
    bar.finish();

    let stats = writer.save_bytes(output.data, &config.output).await?;
    display_merge_statistics(&formatter, &output.statistics);
    formatter.success(&format!(
        "Created {} ({})",
        config.output.display(),
        stats.format_file_size()
    ));

    Ok(())
}

async fn run_outline(cli: &Cli, args: &OutlineArgs) -> Result<()> {
    let formatter = OutputFormatter::new(cli.quiet, cli.verbose);
    let source = PdfReader::new().load(&args.file).await?;
    let forest = OutlineExtractor::new().extract(&source.document);

    if args.json {
        let json = serde_json::to_string_pretty(&forest).context("Failed to encode outline")?;
        println!("{json}");
        return Ok(());
    }

    if forest.is_empty() {
        formatter.info(&format!("{} has no bookmarks", source.name));
    } else {
        formatter.debug(&format!(
            "{} bookmark(s) in {}",
            count_nodes(&forest),
            source.name
        ));
        print!("{}", render_tree(&forest));
    }
    Ok(())
}

fn progress_bar(formatter: &OutputFormatter, message: &str) -> ProgressBar {
    if formatter.is_quiet() {
        return ProgressBar::disabled();
    }
    let mut bar = ProgressBar::new(0, ProgressStyle::Bar);
    bar.set_message(message);
    bar
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    path: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
) -> Result<(), SpliceError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(());
    }

    match mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(SpliceError::output_exists(path.to_path_buf())),
        OverwriteMode::Prompt => {
            // No one to ask in quiet mode
            if formatter.is_quiet() {
                return Err(SpliceError::output_exists(path.to_path_buf()));
            }

            formatter.warning(&format!("Output file already exists: {}", path.display()));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| SpliceError::other(format!("Failed to read input: {err}")))?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(()),
                _ => Err(SpliceError::Cancelled),
            }
        }
    }
}

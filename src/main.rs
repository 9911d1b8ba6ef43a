//! Main entry point for the httpio CLI application.
//!
//! Copies a byte range of a remote (or local) file to stdout, reading it
//! through a block-cached [`FileStream`].

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, BufReader, Read, SeekFrom, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use httpio::{Cli, FileStream, RangeSource};

/// Application entry point.
///
/// Parses command-line arguments and dispatches on whether the source is an
/// HTTP URL or a local file.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.is_http_url() {
        let mut stream = httpio::open(&cli.source, cli.block_size(), cli.http_options()?)
            .with_context(|| format!("cannot open {}", cli.source))?;

        copy_range(&mut stream, &cli)?;

        // Only HTTP sources count transferred bytes.
        if !cli.is_quiet() {
            let transferred = stream.source()?.transferred_bytes();
            eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
        }
    } else {
        let mut stream = httpio::open_file(Path::new(&cli.source), cli.block_size())?;
        copy_range(&mut stream, &cli)?;
    }

    Ok(())
}

/// Copy the range selected by `--offset`/`--length` to stdout.
///
/// In `--lines` mode the range is split on newlines and written back as
/// text, with invalid UTF-8 replaced.
fn copy_range<S: RangeSource>(stream: &mut FileStream<S>, cli: &Cli) -> Result<()> {
    let start = match u64::try_from(cli.offset) {
        Ok(offset) => SeekFrom::Start(offset),
        Err(_) => SeekFrom::End(cli.offset),
    };
    stream
        .seek(start)
        .with_context(|| format!("cannot seek to offset {}", cli.offset))?;

    let remaining = stream.len() - stream.tell()?;
    let length = cli.length.map_or(remaining, |n| n.min(remaining));
    let mut range = stream.by_ref().take(length);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.lines {
        for line in BufReader::new(range).split(b'\n') {
            writeln!(out, "{}", String::from_utf8_lossy(&line?))?;
        }
    } else {
        std::io::copy(&mut range, &mut out)?;
    }

    out.flush()?;
    Ok(())
}

/// Render a byte count in binary units for the transfer summary.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

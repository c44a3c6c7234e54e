//! Input, output and logging plumbing shared by the console harnesses.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pagecut_core::api::PageGeometry;
use pagecut_core::layout::SegmentationParams;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// A document is either one page or a list of pages.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Pages(Vec<PageGeometry>),
    Page(PageGeometry),
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `-d`.
pub fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

/// Loads parameters from a JSON file, defaults when no file is given.
pub fn load_params(path: Option<&Path>) -> Result<SegmentationParams> {
    let Some(path) = path else {
        return Ok(SegmentationParams::default());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read parameters from {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("invalid parameters in {}", path.display()))
}

/// Reads pages from every input, `-` being stdin. Pages keep the order of
/// the inputs.
pub fn read_pages(inputs: &[PathBuf]) -> Result<Vec<PageGeometry>> {
    let mut pages = Vec::new();
    for input in inputs {
        let data = if input.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read pages from stdin")?;
            buf
        } else {
            fs::read_to_string(input)
                .with_context(|| format!("failed to read {}", input.display()))?
        };
        let document: Document = serde_json::from_str(&data)
            .with_context(|| format!("invalid page geometry in {}", input.display()))?;
        match document {
            Document::Pages(more) => pages.extend(more),
            Document::Page(page) => pages.push(page),
        }
    }
    tracing::debug!(pages = pages.len(), "pages loaded");
    Ok(pages)
}

/// Writes `value` as pretty JSON to `outfile`, `-` being stdout.
pub fn write_json<T: Serialize>(outfile: &str, value: &T) -> Result<()> {
    let mut output: Box<dyn Write> = if outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(outfile)
            .with_context(|| format!("failed to create output file {outfile}"))?;
        Box::new(BufWriter::new(file))
    };
    serde_json::to_writer_pretty(&mut output, value).context("failed to write output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

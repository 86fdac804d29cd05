//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::args::{AtlasArgs, OutputFormat};
use crate::error::Result;
use crate::query::RankedResult;

/// Summary of an offline neighbor computation.
#[derive(Debug, Serialize)]
pub struct NeighborsSummary {
    pub documents: usize,
    pub rows_computed: usize,
    pub neighbors: usize,
    pub complete: bool,
    pub elapsed_ms: f64,
    pub graph_path: String,
    pub export_path: String,
    pub ids_path: String,
}

/// Results of a semantic query.
#[derive(Debug, Serialize)]
pub struct QueryOutput {
    pub query: String,
    pub category: String,
    pub reranked: bool,
    pub duration_ms: u64,
    pub results: Vec<RankedResult>,
}

/// A stored abstract.
#[derive(Debug, Serialize)]
pub struct AbstractOutput {
    pub id: String,
    pub category: String,
    pub content: String,
}

/// Related papers of one id.
#[derive(Debug, Serialize)]
pub struct RelatedOutput {
    pub id: String,
    pub related: Vec<RelatedPaper>,
}

/// One related paper with its similarity.
#[derive(Debug, Serialize)]
pub struct RelatedPaper {
    pub id: String,
    pub similarity: f32,
}

/// Anything the CLI can print in either output format.
pub trait Render: Serialize {
    /// Write the human-readable form.
    fn render_human<W: Write>(&self, out: &mut W, args: &AtlasArgs) -> io::Result<()>;
}

impl Render for NeighborsSummary {
    fn render_human<W: Write>(&self, out: &mut W, args: &AtlasArgs) -> io::Result<()> {
        if self.complete {
            writeln!(
                out,
                "Computed {} neighbors for {} documents in {:.1} ms",
                self.neighbors, self.documents, self.elapsed_ms
            )?;
        } else {
            writeln!(
                out,
                "Interrupted: {} of {} rows computed in {:.1} ms",
                self.rows_computed, self.documents, self.elapsed_ms
            )?;
        }
        if args.verbosity() > 0 {
            writeln!(out, "  graph:  {}", self.graph_path)?;
            writeln!(out, "  export: {}", self.export_path)?;
            writeln!(out, "  ids:    {}", self.ids_path)?;
        }
        Ok(())
    }
}

impl Render for QueryOutput {
    fn render_human<W: Write>(&self, out: &mut W, args: &AtlasArgs) -> io::Result<()> {
        if args.verbosity() > 0 {
            writeln!(
                out,
                "{} results for {:?} in {} ({} ms{})",
                self.results.len(),
                self.query,
                self.category,
                self.duration_ms,
                if self.reranked { ", reranked" } else { "" }
            )?;
            writeln!(out)?;
        }

        if self.results.is_empty() {
            writeln!(out, "No results found.")?;
            return Ok(());
        }

        for (rank, result) in self.results.iter().enumerate() {
            writeln!(
                out,
                "{}. [{:.3}] {} ({})",
                rank + 1,
                result.score,
                result.metadata.title,
                result.id
            )?;
            writeln!(out, "   {}", result.metadata.authors)?;
            writeln!(
                out,
                "   {} | {:04}-{:02}-{:02}",
                result.metadata.categories,
                result.metadata.year,
                result.metadata.month,
                result.metadata.day
            )?;
            if args.verbosity() > 1 {
                writeln!(out, "   distance: {:.4}", result.distance)?;
                writeln!(out, "   {}", result.content)?;
            }
        }
        Ok(())
    }
}

impl Render for AbstractOutput {
    fn render_human<W: Write>(&self, out: &mut W, args: &AtlasArgs) -> io::Result<()> {
        if args.verbosity() > 1 {
            writeln!(out, "{} ({})", self.id, self.category)?;
        }
        writeln!(out, "{}", self.content)
    }
}

impl Render for RelatedOutput {
    fn render_human<W: Write>(&self, out: &mut W, _args: &AtlasArgs) -> io::Result<()> {
        if self.related.is_empty() {
            return writeln!(out, "No related papers for {}", self.id);
        }
        writeln!(out, "Related to {}:", self.id)?;
        for paper in &self.related {
            writeln!(out, "  {:>5.1}%  {}", paper.similarity * 100.0, paper.id)?;
        }
        Ok(())
    }
}

/// Output a result in the requested format.
pub fn output_result<T: Render>(result: &T, args: &AtlasArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, result, args)
}

/// Write a result in the requested format to `out`.
pub fn write_result<W: Write, T: Render>(out: &mut W, result: &T, args: &AtlasArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => result.render_human(out, args)?,
        OutputFormat::Json => {
            if args.pretty {
                serde_json::to_writer_pretty(&mut *out, result)?;
            } else {
                serde_json::to_writer(&mut *out, result)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

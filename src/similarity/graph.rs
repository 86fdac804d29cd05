//! Neighbor graph produced by the offline similarity job.
//!
//! The graph stores, for each computed row, a fixed-width list of neighbor
//! row indices and their cosine similarities at half precision. Two on-disk
//! forms are supported:
//!
//! - a checksummed binary file ([`NeighborGraph::save`] / [`NeighborGraph::load`])
//! - a plain-text percentage export consumed by the visualization front-end
//!   ([`NeighborGraph::write_percent_export`] / [`parse_percent_export`])

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use half::f16;
use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};

const GRAPH_MAGIC: &[u8; 4] = b"ATNG";
const GRAPH_VERSION: u32 = 1;

/// A directed edge from a document to one of its nearest neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborEdge {
    /// Row index of the source document.
    pub source: u32,
    /// Row index of the neighbor.
    pub target: u32,
    /// Cosine similarity in [-1, 1].
    pub score: f32,
}

/// Top-K neighbor lists for a collection.
///
/// Every row has exactly `width` entries, where `width = min(K, N - 1)`.
/// A graph produced by an interrupted run covers only the first
/// [`rows`](Self::rows) documents; neighbor indices still refer to the full
/// id list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborGraph {
    ids: Vec<String>,
    width: usize,
    rows: usize,
    indices: Vec<u32>,
    scores: Vec<f16>,
    created_at: DateTime<Utc>,
}

impl NeighborGraph {
    pub(crate) fn from_parts(
        ids: Vec<String>,
        width: usize,
        rows: usize,
        mut indices: Vec<u32>,
        mut scores: Vec<f16>,
    ) -> Self {
        indices.truncate(rows * width);
        scores.truncate(rows * width);
        Self {
            ids,
            width,
            rows,
            indices,
            scores,
            created_at: Utc::now(),
        }
    }

    /// Document ids of the whole collection, in row order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Neighbors per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows with computed neighbor lists.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Whether every document in the collection has a neighbor list.
    pub fn is_complete(&self) -> bool {
        self.rows == self.ids.len()
    }

    /// When the graph was computed.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Neighbor row indices of `row`, best first.
    pub fn neighbors(&self, row: usize) -> &[u32] {
        if row >= self.rows {
            return &[];
        }
        &self.indices[row * self.width..(row + 1) * self.width]
    }

    /// Similarities of `row`'s neighbors, aligned with [`neighbors`](Self::neighbors).
    pub fn scores(&self, row: usize) -> &[f16] {
        if row >= self.rows {
            return &[];
        }
        &self.scores[row * self.width..(row + 1) * self.width]
    }

    /// Edges leaving `row`, best first.
    pub fn edges(&self, row: usize) -> impl Iterator<Item = NeighborEdge> + '_ {
        self.neighbors(row)
            .iter()
            .zip(self.scores(row))
            .map(move |(&target, score)| NeighborEdge {
                source: row as u32,
                target,
                score: score.to_f32(),
            })
    }

    /// Neighbors of a document looked up by id, as `(id, similarity)` pairs.
    pub fn related(&self, id: &str) -> Option<Vec<(&str, f32)>> {
        let row = self.ids.iter().position(|candidate| candidate == id)?;
        if row >= self.rows {
            return None;
        }
        Some(
            self.edges(row)
                .map(|edge| (self.ids[edge.target as usize].as_str(), edge.score))
                .collect(),
        )
    }

    /// Save the graph to a checksummed binary file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let payload = bincode::serialize(self)?;
        let checksum = crc32fast::hash(&payload);

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(GRAPH_MAGIC)?;
        writer.write_u32::<LittleEndian>(GRAPH_VERSION)?;
        writer.write_u64::<LittleEndian>(payload.len() as u64)?;
        writer.write_u32::<LittleEndian>(checksum)?;
        writer.write_all(&payload)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a graph written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != GRAPH_MAGIC {
            return Err(AtlasError::storage("Not a neighbor graph file"));
        }

        let version = reader.read_u32::<LittleEndian>()?;
        if version != GRAPH_VERSION {
            return Err(AtlasError::storage(format!(
                "Unsupported neighbor graph version {version}"
            )));
        }

        let len = reader.read_u64::<LittleEndian>()? as usize;
        let expected = reader.read_u32::<LittleEndian>()?;
        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload)?;

        let actual = crc32fast::hash(&payload);
        if actual != expected {
            return Err(AtlasError::storage(format!(
                "Neighbor graph checksum mismatch: expected {expected:08x}, got {actual:08x}"
            )));
        }

        let graph: NeighborGraph = bincode::deserialize(&payload)?;
        if graph.indices.len() != graph.rows * graph.width
            || graph.scores.len() != graph.indices.len()
            || graph.rows > graph.ids.len()
        {
            return Err(AtlasError::storage("Neighbor graph payload is inconsistent"));
        }
        Ok(graph)
    }

    /// Render the first `limit` neighbors of every row as text.
    ///
    /// One line per computed row; each line is a `;`-separated list of
    /// `<neighbor>,<percent>` pairs where the percentage is the similarity
    /// rounded to two decimals, scaled to 0-100.
    pub fn to_percent_export(&self, limit: usize) -> String {
        let take = limit.min(self.width);
        let mut lines = Vec::with_capacity(self.rows);
        for row in 0..self.rows {
            let line = self
                .edges(row)
                .take(take)
                .map(|edge| format!("{},{}", edge.target, to_percent(edge.score)))
                .collect::<Vec<_>>()
                .join(";");
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Write [`to_percent_export`](Self::to_percent_export) to a file.
    pub fn write_percent_export<P: AsRef<Path>>(&self, path: P, limit: usize) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(self.to_percent_export(limit).as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Convert a similarity into an integer percentage in 0..=100.
///
/// Halves round to even, so `0.625` becomes `62`.
pub fn to_percent(score: f32) -> u8 {
    let rounded = (score * 100.0).round_ties_even();
    rounded.clamp(0.0, 100.0) as u8
}

/// Parse a percentage export back into `(neighbor, percent)` lists.
pub fn parse_percent_export(text: &str) -> Result<Vec<Vec<(u32, u8)>>> {
    let mut rows = Vec::new();
    for (line_num, line) in text.lines().enumerate() {
        let mut row = Vec::new();
        for pair in line.split(';').filter(|p| !p.is_empty()) {
            let (target, percent) = pair.split_once(',').ok_or_else(|| {
                AtlasError::serialization(format!("line {}: malformed pair {pair:?}", line_num + 1))
            })?;
            let target = target.parse::<u32>().map_err(|e| {
                AtlasError::serialization(format!("line {}: {e}", line_num + 1))
            })?;
            let percent = percent.parse::<u8>().map_err(|e| {
                AtlasError::serialization(format!("line {}: {e}", line_num + 1))
            })?;
            if percent > 100 {
                return Err(AtlasError::serialization(format!(
                    "line {}: percentage {percent} out of range",
                    line_num + 1
                )));
            }
            row.push((target, percent));
        }
        rows.push(row);
    }
    Ok(rows)
}

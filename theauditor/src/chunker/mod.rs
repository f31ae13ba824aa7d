//! Report Chunker: splits a correlated report into size-bounded JSON chunks
//! for consumption by LLM context windows. Each chunk is self-contained and
//! never splits a single finding or convergence point across chunks.

use serde::Serialize;
use serde_json::Value;

/// Default byte budget per chunk (~60 KB), matching the spec's default.
pub const DEFAULT_CHUNK_BYTE_BUDGET: usize = 60 * 1024;

/// Metadata every chunk carries, plus its JSON payload for that slice of
/// the report.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub chunk_number: usize,
    pub total_chunks: usize,
    pub content_type: String,
    pub payload: Value,
}

/// One logical unit of the report: a named content type plus the list of
/// JSON items that type contains (findings, hotspots, convergence points,
/// correlation matches, ...). A unit is never split across chunks; if a
/// single item within it exceeds the byte budget on its own, it still gets
/// its own chunk (never silently dropped or truncated).
#[derive(Debug, Clone)]
pub struct Unit {
    pub content_type: String,
    pub items: Vec<Value>,
}

impl Unit {
    #[must_use]
    pub fn new(content_type: impl Into<String>, items: Vec<Value>) -> Self {
        Self { content_type: content_type.into(), items }
    }

    #[must_use]
    pub fn from_serializable<T: Serialize>(content_type: impl Into<String>, items: &[T]) -> Self {
        let items = items
            .iter()
            .map(|item| serde_json::to_value(item).unwrap_or(Value::Null))
            .collect();
        Self::new(content_type, items)
    }
}

fn item_byte_len(item: &Value) -> usize {
    serde_json::to_string(item).map_or(0, |s| s.len())
}

/// Packs a sequence of [`Unit`]s into byte-bounded chunks. Items from
/// different units are never merged into the same chunk's payload array;
/// each chunk's payload is `{content_type: [items...]}` for exactly one
/// unit's content type, so a chunk never needs to disambiguate mixed
/// content. Greedily fills each chunk up to `byte_budget`, starting a new
/// chunk whenever the next item would exceed it (unless the chunk is still
/// empty, in which case the oversized item gets a chunk of its own).
#[must_use]
pub fn chunk(units: &[Unit], byte_budget: usize) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();

    for unit in units {
        let mut current: Vec<Value> = Vec::new();
        let mut current_bytes = 0usize;

        for item in &unit.items {
            let item_bytes = item_byte_len(item);
            if !current.is_empty() && current_bytes + item_bytes > byte_budget {
                chunks.push(build_chunk(&unit.content_type, std::mem::take(&mut current)));
                current_bytes = 0;
            }
            current_bytes += item_bytes;
            current.push(item.clone());
        }

        if !current.is_empty() {
            chunks.push(build_chunk(&unit.content_type, current));
        } else if unit.items.is_empty() {
            // An empty unit still yields one (empty) chunk, so a consumer
            // querying "what content types exist in this report" sees it.
            chunks.push(build_chunk(&unit.content_type, Vec::new()));
        }
    }

    let total_chunks = chunks.len();
    for (index, chunk) in chunks.iter_mut().enumerate() {
        chunk.chunk_number = index + 1;
        chunk.total_chunks = total_chunks;
    }
    chunks
}

fn build_chunk(content_type: &str, items: Vec<Value>) -> Chunk {
    Chunk {
        chunk_number: 0,
        total_chunks: 0,
        content_type: content_type.to_owned(),
        payload: Value::Array(items),
    }
}

/// Reconstructs the concatenated item list for one content type, in
/// `chunk_number` order, from a chunked set. Used by the round-trip
/// property test and by any consumer reassembling a full report.
#[must_use]
pub fn reassemble(chunks: &[Chunk], content_type: &str) -> Vec<Value> {
    let mut ordered: Vec<&Chunk> = chunks.iter().filter(|c| c.content_type == content_type).collect();
    ordered.sort_by_key(|c| c.chunk_number);
    ordered
        .into_iter()
        .flat_map(|c| match &c.payload {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        })
        .collect()
}

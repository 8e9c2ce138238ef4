//! Decodes JTL-style CSV result logs into a `Samples` batch.

use crate::error::{Error, Result};
use crate::model::{Sample, Samples};
use crate::parsing::columns::{self, Column};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-decode-pass string pool. Repeated labels, thread names and status
/// strings collapse to one shared allocation each.
struct InternPool {
    strings: HashMap<String, Arc<str>>,
}

impl InternPool {
    fn new() -> Self {
        Self { strings: HashMap::new() }
    }

    fn intern(&mut self, raw: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(raw) {
            return Arc::clone(existing);
        }
        let shared: Arc<str> = Arc::from(raw);
        self.strings.insert(raw.to_string(), Arc::clone(&shared));
        shared
    }
}

/// One row mid-decode, still carrying its absolute timestamp.
struct RowDraft {
    timestamp: i64,
    elapsed: i64,
    label: Arc<str>,
    thread_name: Arc<str>,
    status_code: Arc<str>,
    status_message: Arc<str>,
    success: bool,
    response_bytes: i64,
    sent_bytes: i64,
    total_threads: i32,
}

impl RowDraft {
    fn new(pool: &mut InternPool) -> Self {
        let empty = pool.intern("");
        Self {
            timestamp: 0,
            elapsed: 0,
            label: Arc::clone(&empty),
            thread_name: Arc::clone(&empty),
            status_code: Arc::clone(&empty),
            status_message: Arc::clone(&empty),
            success: false,
            response_bytes: -1,
            sent_bytes: -1,
            total_threads: 0,
        }
    }
}

/// Parses one cell into the draft. Returns `None` when the cell cannot
/// parse, which drops the whole row. Recognized columns the sample model
/// does not carry are ignored.
fn assign(draft: &mut RowDraft, column: Column, raw: &str, pool: &mut InternPool) -> Option<()> {
    match column {
        Column::TimeStamp => draft.timestamp = columns::parse_long(raw)?,
        Column::Elapsed => draft.elapsed = columns::parse_long(raw)?,
        Column::Label => draft.label = pool.intern(raw),
        Column::ResponseCode => draft.status_code = pool.intern(raw),
        Column::ResponseMessage => draft.status_message = pool.intern(raw),
        Column::ThreadName => draft.thread_name = pool.intern(raw),
        Column::Success => draft.success = columns::parse_bool(raw)?,
        Column::Bytes => draft.response_bytes = columns::parse_long(raw)?,
        Column::SentBytes => {
            if !raw.trim().is_empty() {
                draft.sent_bytes = columns::parse_long(raw)?;
            }
        }
        Column::AllThreads => draft.total_threads = columns::parse_int(raw)?,
        _ => {}
    }
    Some(())
}

/// Decodes an entire CSV stream into a batch with normalized offsets.
///
/// The first row decides the layout: a recognized header row maps columns by
/// name, otherwise the row must fit the 12-column headerless layout and is
/// itself decoded as data. Rows with the wrong cell count or unparseable
/// cells are skipped with a warning.
pub fn decode_samples<R: Read>(reader: R) -> Result<Samples> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let first = match records.next() {
        Some(record) => record?,
        None => return Err(Error::ClientInput("log has no rows".to_string())),
    };
    let first_cells: Vec<&str> = first.iter().collect();

    let mut pool = InternPool::new();
    let mut drafts: Vec<RowDraft> = Vec::new();
    let mut skipped = 0u64;
    let mut row_number = 1u64;

    let layout: Vec<Option<Column>> = if columns::is_header_row(&first_cells) {
        layout_from_header(&first_cells)?
    } else if columns::matches_default_layout(&first_cells) {
        let layout: Vec<Option<Column>> =
            columns::DEFAULT_LAYOUT.iter().map(|&c| Some(c)).collect();
        if let Some(draft) = decode_row(&first_cells, &layout, &mut pool) {
            drafts.push(draft);
        } else {
            skipped += 1;
            warn!("skipping row 1: unparseable cell");
        }
        layout
    } else {
        return Err(Error::ClientInput(
            "first row is neither a header nor a default-layout sample".to_string(),
        ));
    };

    for record in records {
        let record = record?;
        row_number += 1;
        let cells: Vec<&str> = record.iter().collect();
        if cells.len() != layout.len() {
            skipped += 1;
            warn!(
                "skipping row {}: expected {} columns, found {}",
                row_number,
                layout.len(),
                cells.len()
            );
            continue;
        }
        match decode_row(&cells, &layout, &mut pool) {
            Some(draft) => drafts.push(draft),
            None => {
                skipped += 1;
                warn!("skipping row {}: unparseable cell", row_number);
            }
        }
        if row_number % 1_000_000 == 0 {
            debug!("decoded {} rows so far", row_number);
        }
    }

    if drafts.is_empty() {
        return Err(Error::ClientInput("log has no decodable rows".to_string()));
    }

    let earliest = drafts.iter().map(|d| d.timestamp).min().unwrap_or(0);
    let latest = drafts
        .iter()
        .map(|d| d.timestamp.max(d.timestamp + d.elapsed))
        .max()
        .unwrap_or(earliest);

    let samples: Vec<Sample> = drafts
        .into_iter()
        .map(|d| Sample {
            offset_millis: d.timestamp - earliest,
            duration_millis: d.elapsed,
            label: d.label,
            thread_name: d.thread_name,
            status_code: d.status_code,
            status_message: d.status_message,
            success: d.success,
            response_bytes: d.response_bytes,
            sent_bytes: d.sent_bytes,
            total_threads: d.total_threads,
        })
        .collect();

    debug!("decoded {} samples, skipped {} rows", samples.len(), skipped);

    Ok(Samples { samples, earliest_millis: earliest, latest_millis: latest })
}

/// Decodes a CSV file from disk.
pub fn decode_file(path: &Path) -> Result<Samples> {
    let file = File::open(path)?;
    decode_samples(file)
}

fn layout_from_header(cells: &[&str]) -> Result<Vec<Option<Column>>> {
    let layout: Vec<Option<Column>> = cells
        .iter()
        .map(|cell| {
            let column = columns::column_for(cell);
            if column.is_none() {
                warn!("unrecognized column \"{}\" will be ignored", cell);
            }
            column
        })
        .collect();
    for required in columns::REQUIRED {
        if !layout.contains(&Some(required)) {
            return Err(Error::ClientInput(format!(
                "required column \"{}\" is missing",
                columns::name_of(required)
            )));
        }
    }
    Ok(layout)
}

fn decode_row(
    cells: &[&str],
    layout: &[Option<Column>],
    pool: &mut InternPool,
) -> Option<RowDraft> {
    let mut draft = RowDraft::new(pool);
    for (cell, column) in cells.iter().zip(layout.iter()) {
        if let Some(column) = column {
            assign(&mut draft, *column, cell, pool)?;
        }
    }
    Some(draft)
}

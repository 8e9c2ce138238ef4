//! Column catalog for JTL-style CSV result logs.
//!
//! The catalog is a plain data table: each entry pairs the canonical CSV
//! header name with the column identity and its value kind. Matching is
//! case-insensitive. Behavior (parsing a cell and assigning it to a row)
//! lives in one dispatch function in the decoder, not on the column type.

/// Identity of a recognized CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    TimeStamp,
    Elapsed,
    Label,
    ResponseCode,
    ResponseMessage,
    ThreadName,
    DataType,
    Success,
    FailureMessage,
    Bytes,
    SentBytes,
    GrpThreads,
    AllThreads,
    Url,
    Filename,
    Latency,
    Connect,
    Encoding,
    SampleCount,
    ErrorCount,
    Hostname,
    IdleTime,
    Variables,
}

/// How a column's cells parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Long,
    Int,
    Bool,
    Text,
}

/// One catalog entry: canonical header name, identity, value kind.
pub struct ColumnSpec {
    pub name: &'static str,
    pub column: Column,
    pub kind: ValueKind,
}

/// Every column a JTL export can carry, in canonical order.
pub const CATALOG: [ColumnSpec; 23] = [
    ColumnSpec { name: "timeStamp", column: Column::TimeStamp, kind: ValueKind::Long },
    ColumnSpec { name: "elapsed", column: Column::Elapsed, kind: ValueKind::Long },
    ColumnSpec { name: "label", column: Column::Label, kind: ValueKind::Text },
    ColumnSpec { name: "responseCode", column: Column::ResponseCode, kind: ValueKind::Text },
    ColumnSpec { name: "responseMessage", column: Column::ResponseMessage, kind: ValueKind::Text },
    ColumnSpec { name: "threadName", column: Column::ThreadName, kind: ValueKind::Text },
    ColumnSpec { name: "dataType", column: Column::DataType, kind: ValueKind::Text },
    ColumnSpec { name: "success", column: Column::Success, kind: ValueKind::Bool },
    ColumnSpec { name: "failureMessage", column: Column::FailureMessage, kind: ValueKind::Text },
    ColumnSpec { name: "bytes", column: Column::Bytes, kind: ValueKind::Long },
    ColumnSpec { name: "sentBytes", column: Column::SentBytes, kind: ValueKind::Long },
    ColumnSpec { name: "grpThreads", column: Column::GrpThreads, kind: ValueKind::Int },
    ColumnSpec { name: "allThreads", column: Column::AllThreads, kind: ValueKind::Int },
    ColumnSpec { name: "URL", column: Column::Url, kind: ValueKind::Text },
    ColumnSpec { name: "Filename", column: Column::Filename, kind: ValueKind::Text },
    ColumnSpec { name: "Latency", column: Column::Latency, kind: ValueKind::Long },
    ColumnSpec { name: "connect", column: Column::Connect, kind: ValueKind::Long },
    ColumnSpec { name: "encoding", column: Column::Encoding, kind: ValueKind::Text },
    ColumnSpec { name: "SampleCount", column: Column::SampleCount, kind: ValueKind::Int },
    ColumnSpec { name: "ErrorCount", column: Column::ErrorCount, kind: ValueKind::Int },
    ColumnSpec { name: "Hostname", column: Column::Hostname, kind: ValueKind::Text },
    ColumnSpec { name: "IdleTime", column: Column::IdleTime, kind: ValueKind::Long },
    ColumnSpec { name: "Variables", column: Column::Variables, kind: ValueKind::Text },
];

/// Columns a source must provide for conversion to succeed.
pub const REQUIRED: [Column; 8] = [
    Column::TimeStamp,
    Column::Elapsed,
    Column::Label,
    Column::ResponseCode,
    Column::ThreadName,
    Column::Success,
    Column::Bytes,
    Column::AllThreads,
];

/// Column layout assumed for headerless 12-column exports.
pub const DEFAULT_LAYOUT: [Column; 12] = [
    Column::TimeStamp,
    Column::Elapsed,
    Column::Label,
    Column::ResponseCode,
    Column::ResponseMessage,
    Column::ThreadName,
    Column::DataType,
    Column::Success,
    Column::Bytes,
    Column::GrpThreads,
    Column::AllThreads,
    Column::Latency,
];

/// Looks up a header cell in the catalog, ignoring case.
pub fn column_for(name: &str) -> Option<Column> {
    CATALOG
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name.trim()))
        .map(|spec| spec.column)
}

/// The canonical header name for a column.
pub fn name_of(column: Column) -> &'static str {
    // The catalog covers every variant, so the lookup cannot miss.
    CATALOG
        .iter()
        .find(|spec| spec.column == column)
        .map_or("", |spec| spec.name)
}

/// Decides whether the first row of a file is a header. A row where every
/// cell names a known column is certainly a header; three or more known
/// names is taken as a header with extra custom columns mixed in.
pub fn is_header_row(cells: &[&str]) -> bool {
    if cells.is_empty() {
        return false;
    }
    let known = cells.iter().filter(|cell| column_for(cell).is_some()).count();
    known == cells.len() || known >= 3
}

/// Checks whether a headerless first row is plausibly the 12-column default
/// layout: the numeric positions hold integers and the success position
/// holds a boolean.
pub fn matches_default_layout(cells: &[&str]) -> bool {
    if cells.len() != DEFAULT_LAYOUT.len() {
        return false;
    }
    let numeric_positions = [0usize, 1, 8, 9, 10, 11];
    numeric_positions.iter().all(|&i| parse_long(cells[i]).is_some())
        && parse_bool(cells[7]).is_some()
}

/// Strict integer parse. Overflow or stray characters yield `None`.
pub fn parse_long(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

pub fn parse_int(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

/// Case-insensitive `true`/`false` only. Anything else is a parse defect,
/// not a silent `false`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

//! Memory Access Traces.
//!
//! A trace holds one access per line: a hexadecimal address, the operation
//! (`READ` or `WRITE`), and the execution time in nanoseconds since the
//! previous access of the same task. Fields may be separated by any run of
//! non-alphanumeric characters. A blank line ends the trace.

use std::path::{Path, PathBuf};

use crate::common::data::Operation;
use crate::common::error::{Error, Result};

/// One line of a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub address: u64,
    pub op: Operation,
    /// Execution time since the previous access, in nanoseconds.
    pub gap: u64,
}

/// A fully loaded trace.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    path: PathBuf,
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new(path: impl Into<PathBuf>, entries: Vec<TraceEntry>) -> Self {
        Self {
            path: path.into(),
            entries,
        }
    }

    /// Parses trace text. `path` is only used for error messages.
    pub fn parse(input: &str, path: &Path) -> Result<Self> {
        let mut entries = Vec::new();

        for (idx, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                break;
            }
            let entry = parse_line(line).map_err(|reason| Error::MalformedTrace {
                path: path.to_path_buf(),
                line: idx + 1,
                reason,
            })?;
            entries.push(entry);
        }

        Ok(Self::new(path, entries))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&TraceEntry> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_line(line: &str) -> std::result::Result<TraceEntry, String> {
    let mut fields = line
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|f| !f.is_empty());

    let addr = fields.next().ok_or("missing address")?;
    let op = fields.next().ok_or("missing operation")?;
    let gap = fields.next().ok_or("missing timestamp")?;

    let digits = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    let address =
        u64::from_str_radix(digits, 16).map_err(|e| format!("bad address {:?}: {}", addr, e))?;
    let op = op.parse::<Operation>().map_err(|e| e.to_string())?;
    let gap = gap
        .parse::<u64>()
        .map_err(|e| format!("bad timestamp {:?}: {}", gap, e))?;

    Ok(TraceEntry { address, op, gap })
}

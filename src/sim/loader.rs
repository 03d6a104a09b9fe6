//! Input File Loaders.
//!
//! Reads the device timing file, individual traces, and trace lists from disk
//! and hands their contents to the parsers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::{Error, Result};
use crate::dram::timing::TimingModel;
use crate::sim::trace::Trace;

/// Reads a text file, tagging failures with the path.
pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a device timing file.
pub fn load_timing(path: &Path, read_latency: u32, write_latency: u32) -> Result<TimingModel> {
    let timing = TimingModel::parse(&read_file(path)?, read_latency, write_latency)?;
    log::info!(
        "[Loader] Device {}: tCK={}ps tRC={}ps tRCD={}ps tFAW={}ps",
        path.display(),
        timing.t_ck,
        timing.t_rc,
        timing.t_rcd,
        timing.t_faw
    );
    Ok(timing)
}

/// Loads a single trace.
pub fn load_trace(path: &Path) -> Result<Trace> {
    let trace = Trace::parse(&read_file(path)?, path)?;
    log::info!("[Loader] Trace {}: {} accesses", path.display(), trace.len());
    Ok(trace)
}

/// Reads a trace list: one trace path per non-blank line.
pub fn read_trace_list(path: &Path) -> Result<Vec<PathBuf>> {
    Ok(read_file(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Loads every trace named in a trace list.
///
/// # Returns
///
/// [`Error::TraceCountMismatch`] unless the list names exactly `expected` traces.
pub fn load_trace_list(path: &Path, expected: usize) -> Result<Vec<Trace>> {
    let paths = read_trace_list(path)?;
    if paths.len() != expected {
        return Err(Error::TraceCountMismatch {
            expected,
            found: paths.len(),
        });
    }
    paths.iter().map(|p| load_trace(p)).collect()
}

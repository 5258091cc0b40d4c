//! Writers that flush collected stats to an external sink.
use crate::{collector::Collector, data::Snapshot};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

mod file;
mod prometheus;

pub use self::{file::FileExporter, prometheus::PrometheusExporter};

/// A destination for collected stats.
pub trait Exporter {
    /// Exports a snapshot of stats.
    fn export(&self, snapshot: &Snapshot) -> io::Result<()>;

    /// Exports every stat currently held by a collector.
    fn export_collector(&self, collector: &Collector) -> io::Result<()> { self.export(&collector.get_all_stats()) }
}

/// Builds `dir/filename.extension`.
pub(crate) fn output_path(dir: &Path, filename: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", filename, extension))
}

/// Replaces the contents of `path` with `contents`.
pub(crate) fn write_output(path: &Path, contents: &str) -> io::Result<()> { fs::write(path, contents) }

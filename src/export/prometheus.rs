use super::{output_path, write_output, Exporter};
use crate::{data::Snapshot, namespace::SEPARATOR};
use log::{debug, warn};
use std::{
    fmt::Write,
    io,
    path::{Path, PathBuf},
};

/// Writes stats in the Prometheus text exposition format.
///
/// Namespaces become metric names by replacing `.` with `_`, so `milky_way.planets` is written as
/// `milky_way_planets`.  Only numeric values can be exported; anything else is skipped.  Every
/// export overwrites the file, which suits the node exporter's textfile collector.
#[derive(Clone, Debug)]
pub struct PrometheusExporter {
    filename: String,
    dir: PathBuf,
}

impl PrometheusExporter {
    /// File extension of the output file.
    pub const EXTENSION: &'static str = "prom";

    /// Creates an exporter writing to `dir/filename.prom`.
    pub fn new<P: AsRef<Path>>(filename: &str, dir: P) -> PrometheusExporter {
        PrometheusExporter {
            filename: filename.to_owned(),
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Gets the path of the output file.
    pub fn path(&self) -> PathBuf { output_path(&self.dir, &self.filename, Self::EXTENSION) }

    /// Renders a snapshot the way it would be written to the output file.
    pub fn render(&self, snapshot: &Snapshot) -> String {
        let mut output = String::new();
        for (namespace, stat) in snapshot.iter() {
            let name = metric_name(namespace);
            for value in stat.values() {
                match value.as_number() {
                    Some(n) => {
                        let _ = writeln!(output, "{} {}", name, n);
                    },
                    None => warn!("skipping non-numeric value for metric {}", name),
                }
            }
        }
        output
    }
}

impl Exporter for PrometheusExporter {
    fn export(&self, snapshot: &Snapshot) -> io::Result<()> {
        let path = self.path();
        write_output(&path, &self.render(snapshot))?;
        debug!("exported {} stats to {}", snapshot.len(), path.display());
        Ok(())
    }
}

fn metric_name(namespace: &str) -> String { namespace.replace(SEPARATOR, "_") }

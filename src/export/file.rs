use super::{output_path, write_output, Exporter};
use crate::data::Snapshot;
use log::debug;
use std::{
    fmt::Write,
    io,
    path::{Path, PathBuf},
};

/// Writes stats to a plain text file, one `namespace=value` line per value.
///
/// Compound stats are written as one line per value, all under the same namespace.  Every export
/// overwrites the file.
#[derive(Clone, Debug)]
pub struct FileExporter {
    filename: String,
    dir: PathBuf,
    separator: String,
}

impl FileExporter {
    /// File extension of the output file.
    pub const EXTENSION: &'static str = "stats";

    /// Creates an exporter writing to `dir/filename.stats`.
    pub fn new<P: AsRef<Path>>(filename: &str, dir: P) -> FileExporter {
        FileExporter {
            filename: filename.to_owned(),
            dir: dir.as_ref().to_path_buf(),
            separator: "=".to_owned(),
        }
    }

    /// Sets the separator between namespace and value.
    ///
    /// Defaults to `=`.
    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_owned();
        self
    }

    /// Gets the path of the output file.
    pub fn path(&self) -> PathBuf { output_path(&self.dir, &self.filename, Self::EXTENSION) }

    /// Renders a snapshot the way it would be written to the output file.
    pub fn render(&self, snapshot: &Snapshot) -> String {
        let mut output = String::new();
        for (namespace, stat) in snapshot.iter() {
            for value in stat.values() {
                let _ = writeln!(output, "{}{}{}", namespace, self.separator, value);
            }
        }
        output
    }
}

impl Exporter for FileExporter {
    fn export(&self, snapshot: &Snapshot) -> io::Result<()> {
        let path = self.path();
        write_output(&path, &self.render(snapshot))?;
        debug!("exported {} stats to {}", snapshot.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FileExporter;
    use crate::{collector::Collector, export::Exporter};
    use std::fs;

    #[test]
    fn test_render() {
        let mut c = Collector::new();
        c.set_namespace("milky_way");
        c.add_stat("planets", 8).unwrap();
        c.add_stat("constants", vec![1.5, 2.5]).unwrap();
        c.add_stat("name", "galaxy").unwrap();

        let exporter = FileExporter::new("output", ".");
        assert_eq!(
            exporter.render(&c.get_all_stats()),
            "milky_way.constants=1.5\nmilky_way.constants=2.5\nmilky_way.name=galaxy\nmilky_way.planets=8\n"
        );

        let exporter = exporter.separator(": ");
        assert_eq!(
            exporter.render(&c.get_all_stats()).lines().next(),
            Some("milky_way.constants: 1.5")
        );
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = FileExporter::new("test_stats", dir.path());
        let path = dir.path().join("test_stats.stats");
        assert_eq!(exporter.path(), path);
        assert!(!path.exists());

        let mut c = Collector::new();
        c.set_namespace("test_namespace");
        c.add_stat("test", 1).unwrap();
        exporter.export_collector(&c).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "test_namespace.test=1\n");

        // Each export replaces the previous output.
        c.add_stat("test", 2).unwrap();
        exporter.export_collector(&c).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "test_namespace.test=1\ntest_namespace.test=2\n"
        );
    }

    #[test]
    fn test_export_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = FileExporter::new("test_stats", dir.path().join("nope"));
        assert!(exporter.export_collector(&Collector::new()).is_err());
    }
}

use crate::error::ReportError;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes chart payloads as JSON files named after their chart title.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

#[derive(Serialize)]
struct Artifact<'a, T: Serialize> {
    name: &'a str,
    report: &'a str,
    data: &'a T,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The file a chart named `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", file_stem(name)))
    }

    /// Serializes `data` under `<output_dir>/<name>.json`, replacing any previous file.
    pub fn write<T: Serialize>(&self, name: &str, report: &str, data: &T) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.path_for(name);
        let file = File::create(&path).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &Artifact { name, report, data })?;
        writer.flush().map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), report, "Chart artifact written.");
        Ok(path)
    }
}

/// Chart titles become file names; path separators are the only characters replaced.
fn file_stem(name: &str) -> String {
    name.trim().replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_deterministic_and_path_safe() {
        let writer = ArtifactWriter::new("/tmp/out");
        assert_eq!(
            writer.path_for("RTX 3080 7 Day Rolling Average - % MSRP"),
            PathBuf::from("/tmp/out/RTX 3080 7 Day Rolling Average - % MSRP.json")
        );
        assert_eq!(writer.path_for("A/B Test"), PathBuf::from("/tmp/out/A_B Test.json"));
    }

    #[test]
    fn writes_envelope_with_payload() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().join("nested"));
        let path = writer.write("Chart", "sales", &vec![1, 2, 3]).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["name"], "Chart");
        assert_eq!(json["report"], "sales");
        assert_eq!(json["data"][2], 3);
    }
}

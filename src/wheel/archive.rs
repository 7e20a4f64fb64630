//! Wheel archive writer
//!
//! Packs a staged build tree into `{dist}-{version}-{tag}.whl` together with
//! the `.dist-info` metadata files. The archive is written to a temporary
//! file first and renamed into place once complete.

use super::tag::TagTriple;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Version of the wheel format written
pub const WHEEL_FORMAT_VERSION: &str = "1.0";

/// Version of the core metadata format written
pub const METADATA_VERSION: &str = "2.1";

#[derive(Debug, Error)]
pub enum WheelError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write wheel archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Describes one wheel and writes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelBuilder {
    name: String,
    version: String,
    tag: TagTriple,
    summary: Option<String>,
    requires_python: Option<String>,
}

impl WheelBuilder {
    #[must_use]
    pub fn new(name: &str, version: &str, tag: TagTriple) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            tag,
            summary: None,
            requires_python: None,
        }
    }

    #[must_use]
    pub fn summary(mut self, summary: Option<&str>) -> Self {
        self.summary = summary.map(str::to_string);
        self
    }

    #[must_use]
    pub fn requires_python(mut self, requires_python: Option<&str>) -> Self {
        self.requires_python = requires_python.map(str::to_string);
        self
    }

    #[must_use]
    pub const fn tag(&self) -> &TagTriple {
        &self.tag
    }

    /// Distribution name as it appears in file names (`tree-sitter-x` -> `tree_sitter_x`)
    #[must_use]
    pub fn dist_name(&self) -> String {
        self.name.replace('-', "_")
    }

    /// `{dist}-{version}-{interpreter}-{abi}-{platform}.whl`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}-{}-{}.whl", self.dist_name(), self.version, self.tag)
    }

    #[must_use]
    pub fn dist_info_dir(&self) -> String {
        format!("{}-{}.dist-info", self.dist_name(), self.version)
    }

    /// Wheels without compiled code install into purelib
    fn root_is_purelib(&self) -> bool {
        self.tag == TagTriple::pure()
    }

    /// Contents of `.dist-info/WHEEL`
    #[must_use]
    pub fn wheel_file(&self) -> String {
        format!(
            "Wheel-Version: {WHEEL_FORMAT_VERSION}\n\
             Generator: wheelwright {}\n\
             Root-Is-Purelib: {}\n\
             Tag: {}\n",
            env!("CARGO_PKG_VERSION"),
            self.root_is_purelib(),
            self.tag
        )
    }

    /// Contents of `.dist-info/METADATA`
    #[must_use]
    pub fn metadata(&self) -> String {
        let mut lines = vec![
            format!("Metadata-Version: {METADATA_VERSION}"),
            format!("Name: {}", self.name),
            format!("Version: {}", self.version),
        ];
        if let Some(summary) = &self.summary {
            lines.push(format!("Summary: {summary}"));
        }
        if let Some(requires) = &self.requires_python {
            lines.push(format!("Requires-Python: {requires}"));
        }
        lines.push(String::new());
        lines.join("\n")
    }

    /// Pack `staging` into a wheel inside `dist_dir`, returning the wheel path
    pub fn build(&self, staging: &Path, dist_dir: &Path) -> Result<PathBuf, WheelError> {
        fs::create_dir_all(dist_dir).map_err(|source| WheelError::Io {
            path: dist_dir.to_path_buf(),
            source,
        })?;

        // Unpersisted temp files are removed on drop, so a failed pack leaves nothing
        let target = dist_dir.join(self.file_name());
        let file = NamedTempFile::new_in(dist_dir).map_err(|source| WheelError::Io {
            path: dist_dir.to_path_buf(),
            source,
        })?;

        let mut writer = RecordingWriter::new(ZipWriter::new(file));

        for entry in WalkDir::new(staging).sort_by_file_name() {
            let entry = entry.map_err(|e| WheelError::Io {
                path: staging.to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(staging).unwrap_or(entry.path());
            let data = fs::read(entry.path()).map_err(|source| WheelError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            writer.add(&archive_name(relative), &data)?;
        }

        let dist_info = self.dist_info_dir();
        writer.add(&format!("{dist_info}/METADATA"), self.metadata().as_bytes())?;
        writer.add(&format!("{dist_info}/WHEEL"), self.wheel_file().as_bytes())?;
        let file = writer.finish(&format!("{dist_info}/RECORD"))?;

        file.persist(&target).map_err(|e| WheelError::Io {
            path: target.clone(),
            source: e.error,
        })?;

        crate::debug!("wrote {}", target.display());
        Ok(target)
    }
}

/// Zip writer that remembers a RECORD row for every file it adds
struct RecordingWriter {
    zip: ZipWriter<NamedTempFile>,
    record: Vec<String>,
}

impl RecordingWriter {
    const fn new(zip: ZipWriter<NamedTempFile>) -> Self {
        Self {
            zip,
            record: Vec::new(),
        }
    }

    fn add(&mut self, name: &str, data: &[u8]) -> Result<(), WheelError> {
        self.zip.start_file(name, file_options(name))?;
        self.zip.write_all(data).map_err(|source| WheelError::Io {
            path: PathBuf::from(name),
            source,
        })?;
        self.record.push(format!(
            "{},{},{}",
            csv_field(name),
            record_hash(data),
            data.len()
        ));
        Ok(())
    }

    /// Write RECORD (listing itself without hash or size) and close the archive
    fn finish(mut self, record_name: &str) -> Result<NamedTempFile, WheelError> {
        self.record.push(format!("{},,", csv_field(record_name)));
        let mut record = self.record.join("\n");
        record.push('\n');

        self.zip.start_file(record_name, file_options(record_name))?;
        self.zip
            .write_all(record.as_bytes())
            .map_err(|source| WheelError::Io {
                path: PathBuf::from(record_name),
                source,
            })?;
        Ok(self.zip.finish()?)
    }
}

impl std::fmt::Debug for RecordingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingWriter")
            .field("entries", &self.record.len())
            .finish_non_exhaustive()
    }
}

fn file_options(name: &str) -> SimpleFileOptions {
    let mode = if name.ends_with(".so") || name.ends_with(".pyd") {
        0o755
    } else {
        0o644
    };
    SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(mode)
}

/// `sha256=<urlsafe base64, no padding>` as RECORD expects
#[must_use]
pub fn record_hash(data: &[u8]) -> String {
    format!("sha256={}", URL_SAFE_NO_PAD.encode(Sha256::digest(data)))
}

/// Forward-slash archive path for a staged file
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

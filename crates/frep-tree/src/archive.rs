use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Tree;

/// Format tag written into every archive.
pub const ARCHIVE_FORMAT: &str = "frep";

/// Current archive layout version.
pub const ARCHIVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("archive decoding failed: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("unsupported archive format {format:?} version {version}")]
    Unsupported { format: String, version: u32 },
    #[error("archive contains no shapes")]
    Empty,
    #[error("shape {shape} holds non-finite constant {value}")]
    NonFinite { shape: usize, value: f32 },
}

/// Serializes shapes to and from a byte stream.
///
/// The viewer only ever writes single-shape archives; reading is provided so
/// exported shapes can be fed back into benchmarks and tools.
pub trait ShapeArchive {
    fn write_shapes(&self, shapes: &[&Tree], out: &mut dyn Write) -> Result<(), ArchiveError>;

    fn read_shapes(&self, input: &mut dyn Read) -> Result<Vec<Tree>, ArchiveError>;

    fn write_shape(&self, shape: &Tree, out: &mut dyn Write) -> Result<(), ArchiveError> {
        self.write_shapes(&[shape], out)
    }

    /// Reads an archive and returns its first shape.
    fn read_first(&self, input: &mut dyn Read) -> Result<Tree, ArchiveError> {
        self.read_shapes(input)?
            .into_iter()
            .next()
            .ok_or(ArchiveError::Empty)
    }
}

#[derive(Serialize)]
struct ArchiveOut<'a> {
    format: &'a str,
    version: u32,
    shapes: &'a [&'a Tree],
}

#[derive(Deserialize)]
struct ArchiveIn {
    format: String,
    version: u32,
    shapes: Vec<Tree>,
}

/// JSON archive: `{"format":"frep","version":1,"shapes":[...]}`.
#[derive(Debug, Copy, Clone, Default)]
pub struct JsonArchive {
    pub pretty: bool,
}

impl JsonArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ShapeArchive for JsonArchive {
    fn write_shapes(&self, shapes: &[&Tree], out: &mut dyn Write) -> Result<(), ArchiveError> {
        // JSON has no encoding for NaN or infinity.
        for (shape, tree) in shapes.iter().enumerate() {
            if let Some(value) = tree.non_finite_constant() {
                return Err(ArchiveError::NonFinite { shape, value });
            }
        }

        let doc = ArchiveOut {
            format: ARCHIVE_FORMAT,
            version: ARCHIVE_VERSION,
            shapes,
        };
        if self.pretty {
            serde_json::to_writer_pretty(out, &doc).map_err(ArchiveError::Encode)
        } else {
            serde_json::to_writer(out, &doc).map_err(ArchiveError::Encode)
        }
    }

    fn read_shapes(&self, input: &mut dyn Read) -> Result<Vec<Tree>, ArchiveError> {
        // Folded unions nest far past serde_json's default depth of 128.
        let mut json = serde_json::Deserializer::from_reader(input);
        json.disable_recursion_limit();
        let doc = ArchiveIn::deserialize(serde_stacker::Deserializer::new(&mut json))
            .map_err(ArchiveError::Decode)?;
        json.end().map_err(ArchiveError::Decode)?;

        if doc.format != ARCHIVE_FORMAT || doc.version != ARCHIVE_VERSION {
            return Err(ArchiveError::Unsupported {
                format: doc.format,
                version: doc.version,
            });
        }
        Ok(doc.shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_shape_archive_reads_back() {
        let archive = JsonArchive::new();
        let shape = Tree::sphere(0.25, 0.5, 0.0, 0.0).min(Tree::sphere(0.25, -0.5, 0.0, 0.0));

        let mut bytes = Vec::new();
        archive.write_shape(&shape, &mut bytes).unwrap();

        let read = archive.read_first(&mut bytes.as_slice()).unwrap();
        assert_eq!(read, shape);
    }

    #[test]
    fn deep_union_reads_back() {
        let archive = JsonArchive::new();
        let shape = (1..200)
            .map(|i| Tree::sphere(0.1, i as f32 * 0.05, 0.0, 0.0))
            .fold(Tree::sphere(0.1, 0.0, 0.0, 0.0), Tree::min);

        let mut bytes = Vec::new();
        archive.write_shape(&shape, &mut bytes).unwrap();

        let read = archive.read_first(&mut bytes.as_slice()).unwrap();
        assert_eq!(read.node_count(), shape.node_count());
        assert_eq!(read, shape);
    }

    #[test]
    fn non_finite_constant_is_not_written() {
        let shape = Tree::sphere(1.0, 0.0, 0.0, 0.0).max(Tree::constant(f32::INFINITY));

        let mut bytes = Vec::new();
        let err = JsonArchive::new().write_shapes(&[&Tree::X, &shape], &mut bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::NonFinite { shape: 1, value } if value.is_infinite()));
        assert!(bytes.is_empty());
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let text = br#"{"format":"frep","version":1,"shapes":["x"]} junk"#;
        let err = JsonArchive::new().read_first(&mut text.as_slice()).unwrap_err();
        assert!(matches!(err, ArchiveError::Decode(_)));
    }

    #[test]
    fn envelope_carries_format_and_version() {
        let mut bytes = Vec::new();
        JsonArchive::new().write_shape(&Tree::X, &mut bytes).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["format"], "frep");
        assert_eq!(value["version"], 1);
        assert_eq!(value["shapes"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn rejects_foreign_format() {
        let text = br#"{"format":"stl","version":1,"shapes":["x"]}"#;
        let err = JsonArchive::new().read_first(&mut text.as_slice()).unwrap_err();
        assert!(matches!(err, ArchiveError::Unsupported { .. }));
    }

    #[test]
    fn empty_archive_has_no_first_shape() {
        let text = br#"{"format":"frep","version":1,"shapes":[]}"#;
        let err = JsonArchive::new().read_first(&mut text.as_slice()).unwrap_err();
        assert!(matches!(err, ArchiveError::Empty));
    }
}

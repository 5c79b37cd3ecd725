//! Access to the lines backend.
//!
//! The editor never talks HTTP directly; it goes through [`LineRepository`].
//! [`HttpLineRepository`] is the production implementation,
//! [`MemoryLineRepository`] keeps the same semantics in process.

pub mod http;
pub mod memory;

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use atomo_api_types::{EtaEntry, Line, LineIdentifier, NewLine, OcrImport, Stop, StopPatch};

use crate::error::Result;

pub use http::HttpLineRepository;
pub use memory::MemoryLineRepository;

pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Remote source of truth for lines.
///
/// Every method is a single request. Implementations do not retry.
pub trait LineRepository: Send + Sync {
    fn list_lines(&self) -> RepositoryFuture<'_, Vec<Line>>;

    /// Create a line and return the identity the backend assigned to it.
    fn create_line<'a>(&'a self, line: &'a NewLine) -> RepositoryFuture<'a, LineIdentifier>;

    /// Append a stop after all existing stops of the line.
    fn append_stop<'a>(&'a self, line: &'a LineIdentifier, stop: &'a Stop) -> RepositoryFuture<'a, ()>;

    fn patch_stop<'a>(
        &'a self,
        line: &'a LineIdentifier,
        index: usize,
        patch: &'a StopPatch,
    ) -> RepositoryFuture<'a, ()>;

    fn delete_stop<'a>(&'a self, line: &'a LineIdentifier, index: usize) -> RepositoryFuture<'a, ()>;

    /// Overwrite the whole schedule list of the line.
    fn replace_schedules<'a>(
        &'a self,
        line: &'a LineIdentifier,
        schedules: &'a [String],
    ) -> RepositoryFuture<'a, ()>;

    /// Send a timetable photo to the recognition service.
    fn recognize_timetable<'a>(&'a self, image: &'a ImageUpload) -> RepositoryFuture<'a, OcrImport>;

    fn line_etas<'a>(
        &'a self,
        line: &'a LineIdentifier,
        from_stop_index: usize,
    ) -> RepositoryFuture<'a, Vec<EtaEntry>>;
}

/// An image file ready to be sent as a multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self::new(file_name, content_type_for(path), bytes))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("timetable.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("a/b/photo.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("scan.tiff")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("no_extension")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_image_upload_from_path() {
        let path = std::env::temp_dir().join(format!("atomo-upload-{}.webp", std::process::id()));
        tokio::fs::write(&path, b"RIFF....WEBP").await.unwrap();

        let upload = ImageUpload::from_path(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(upload.content_type, "image/webp");
        assert_eq!(upload.bytes, b"RIFF....WEBP");
        assert!(upload.file_name.ends_with(".webp"));
    }

    #[tokio::test]
    async fn test_image_upload_missing_file_is_io_error() {
        let err = ImageUpload::from_path("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, crate::EditorError::Io(_)));
    }
}

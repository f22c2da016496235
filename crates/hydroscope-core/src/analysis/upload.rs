//! Framework-independent view of an uploaded file.

use async_trait::async_trait;
use std::io;

/// An uploaded file: a declared content type plus a body that can be read once.
///
/// HTTP frameworks adapt their native upload type to this; see
/// `server::upload::MultipartUpload` for the axum one.
#[async_trait]
pub trait ImageUpload: Send {
    /// Declared MIME type, `None` when the part carried no Content-Type.
    fn content_type(&self) -> Option<&str>;

    /// Read the entire body into memory.
    async fn read_all(&mut self) -> io::Result<Vec<u8>>;
}

/// An upload whose body is already in memory.
#[derive(Debug, Clone)]
pub struct BufferedUpload {
    content_type: Option<String>,
    data: Option<Vec<u8>>,
}

impl BufferedUpload {
    pub fn new(content_type: Option<&str>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.map(String::from),
            data: Some(data.into()),
        }
    }
}

#[async_trait]
impl ImageUpload for BufferedUpload {
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        self.data.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "upload body already consumed")
        })
    }
}

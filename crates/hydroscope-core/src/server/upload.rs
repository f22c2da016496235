//! Adapter from axum's multipart field to [`ImageUpload`].

use crate::analysis::ImageUpload;
use async_trait::async_trait;
use axum::extract::multipart::Field;
use std::io;

/// One multipart field, read on demand.
pub struct MultipartUpload<'a> {
    content_type: Option<String>,
    field: Option<Field<'a>>,
}

impl<'a> MultipartUpload<'a> {
    pub fn new(field: Field<'a>) -> Self {
        Self {
            content_type: field.content_type().map(String::from),
            field: Some(field),
        }
    }
}

#[async_trait]
impl<'a> ImageUpload for MultipartUpload<'a> {
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let field = self.field.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "upload body already consumed")
        })?;
        let bytes = field.bytes().await.map_err(io::Error::other)?;
        Ok(bytes.to_vec())
    }
}

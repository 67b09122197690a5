//! Multipart form intake shared by the upload-bearing handlers.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;

use super::ApiError;

/// One uploaded file from a multipart request.
#[derive(Debug, Clone)]
pub(crate) struct UploadedFile {
    /// Client-supplied file name (used only for its extension).
    pub filename: String,
    /// File contents.
    pub data: Bytes,
}

/// Collected multipart fields: repeated text values and named files.
#[derive(Debug, Default)]
pub(crate) struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Drain a multipart stream into memory.
    ///
    /// Body size is already bounded by the router's body limit; per-file
    /// caps are enforced where the file is consumed.
    pub(crate) async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(filename) = field.file_name().map(str::to_string) {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid file field: {e}")))?;
                form.files.insert(name, UploadedFile { filename, data });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid text field: {e}")))?;
                form.fields.entry(name).or_default().push(text);
            }
        }

        Ok(form)
    }

    /// First value of a text field.
    pub(crate) fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values of a repeated text field.
    pub(crate) fn values(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }

    /// A named file field.
    pub(crate) fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    /// Required text field.
    pub(crate) fn require(&self, name: &'static str) -> Result<&str, ApiError> {
        self.value(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest(format!("Field \"{name}\" is required")))
    }
}

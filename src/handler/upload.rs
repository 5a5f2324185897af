use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::BytesMut;
use tracing::{debug, error};

use crate::dto::quote_dto::File;
use crate::util::error::HandlerError;

/// Field carrying the uploaded binary; every other field is read as text
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<File>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn require_file(&mut self) -> Result<File, HandlerError> {
        self.file
            .take()
            .ok_or_else(|| HandlerError::bad_request(format!("Missing multipart field '{}'", FILE_FIELD)))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
    }
}

pub async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, HandlerError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        error!("Error getting next multipart field: {}", e);
        HandlerError::bad_request(format!("Failed to read multipart body: {}", e))
    })? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if name == FILE_FIELD {
            let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let mut buf = BytesMut::new();
            while let Some(chunk) = field.chunk().await.map_err(|e| {
                error!("Error reading file chunk: {}", e);
                HandlerError::bad_request(format!("Failed to read file chunk: {}", e))
            })? {
                buf.extend_from_slice(&chunk);
            }
            debug!("Received file: {} ({} bytes)", filename, buf.len());
            form.file = Some(File {
                filename,
                content_type,
                size: buf.len(),
                content: buf.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| HandlerError::bad_request(format!("Failed to read field {}: {}", name, e)))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

//! ExtractionRequest - documents plus manual-data payloads for one submission.

use std::collections::BTreeMap;
use uuid::Uuid;

use super::file_blob::FileBlob;
use crate::domain::foundation::SectionName;

/// Multipart field name shared by every uploaded document.
pub const DEFAULT_FILE_FIELD: &str = "file";

/// One submission, consumed by the transport exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    id: Uuid,
    files: Vec<FileBlob>,
    manual_data: BTreeMap<SectionName, String>,
    file_field: String,
}

/// One field of the outbound multipart body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPart {
    File {
        field: String,
        filename: String,
        content_type: &'static str,
        bytes: Vec<u8>,
    },
    Text {
        field: String,
        value: String,
    },
}

impl RequestPart {
    pub fn field(&self) -> &str {
        match self {
            RequestPart::File { field, .. } | RequestPart::Text { field, .. } => field,
        }
    }
}

impl ExtractionRequest {
    /// Builds a request. Empty or whitespace-only payloads are dropped so
    /// "no manual data" is never sent as an empty field.
    pub fn new<I>(files: Vec<FileBlob>, payloads: I) -> Self
    where
        I: IntoIterator<Item = (SectionName, String)>,
    {
        let manual_data = payloads
            .into_iter()
            .filter(|(_, payload)| !payload.trim().is_empty())
            .collect();
        Self {
            id: Uuid::new_v4(),
            files,
            manual_data,
            file_field: DEFAULT_FILE_FIELD.to_string(),
        }
    }

    pub fn with_file_field(mut self, field: impl Into<String>) -> Self {
        self.file_field = field.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn files(&self) -> &[FileBlob] {
        &self.files
    }

    pub fn manual_data(&self) -> &BTreeMap<SectionName, String> {
        &self.manual_data
    }

    pub fn file_field(&self) -> &str {
        &self.file_field
    }

    /// Total bytes of all documents.
    pub fn upload_size(&self) -> usize {
        self.files.iter().map(FileBlob::len).sum()
    }

    /// Multipart fields in wire order: documents as given, then one text
    /// field per section in report order.
    pub fn into_parts(self) -> Vec<RequestPart> {
        let file_field = self.file_field;
        let files = self.files.into_iter().map(|blob| RequestPart::File {
            field: file_field.clone(),
            filename: blob.filename().to_string(),
            content_type: blob.content_type(),
            bytes: blob.into_bytes(),
        });
        let texts = self
            .manual_data
            .into_iter()
            .map(|(section, value)| RequestPart::Text {
                field: section.manual_data_field(),
                value,
            });
        files.chain(texts).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_blank_payloads() {
        let request = ExtractionRequest::new(
            vec![FileBlob::new("a.pdf", vec![1])],
            vec![
                (SectionName::SectionA, "{\"contactName\":\"x\"}".to_string()),
                (SectionName::SectionB, String::new()),
                (SectionName::Principle2, "   ".to_string()),
            ],
        );
        assert_eq!(request.manual_data().len(), 1);
        assert!(request.manual_data().contains_key(&SectionName::SectionA));
    }

    #[test]
    fn parts_keep_file_order_and_duplicates() {
        let request = ExtractionRequest::new(
            vec![
                FileBlob::new("b.xlsx", vec![2]),
                FileBlob::new("a.pdf", vec![1]),
                FileBlob::new("b.xlsx", vec![3]),
            ],
            vec![
                (SectionName::Principle3, "{}".to_string()),
                (SectionName::SectionA, "{\"a\":1}".to_string()),
            ],
        );

        let parts = request.into_parts();
        let fields: Vec<_> = parts.iter().map(RequestPart::field).collect();
        assert_eq!(
            fields,
            vec!["file", "file", "file", "manual_data_sectionA", "manual_data_principle3"]
        );
        match &parts[2] {
            RequestPart::File { filename, bytes, .. } => {
                assert_eq!(filename, "b.xlsx");
                assert_eq!(bytes, &vec![3]);
            }
            other => panic!("expected file part, got {:?}", other),
        }
    }

    #[test]
    fn custom_file_field_applies_to_every_document() {
        let parts = ExtractionRequest::new(
            vec![FileBlob::new("a.pdf", vec![]), FileBlob::new("b.pdf", vec![])],
            Vec::new(),
        )
        .with_file_field("files")
        .into_parts();
        assert!(parts.iter().all(|p| p.field() == "files"));
    }

    #[test]
    fn each_request_gets_its_own_id() {
        let a = ExtractionRequest::new(Vec::new(), Vec::new());
        let b = ExtractionRequest::new(Vec::new(), Vec::new());
        assert_ne!(a.id(), b.id());
    }
}

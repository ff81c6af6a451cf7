//! Extraction module - what is sent to the extraction service and what comes back.

mod file_blob;
mod request;
mod result;

pub use file_blob::FileBlob;
pub use request::{ExtractionRequest, RequestPart, DEFAULT_FILE_FIELD};
pub use result::{
    ExtractionFailure, ExtractionResult, ExtractionSuccess, FailureKind, INVALID_SUCCESS_BODY_DETAIL,
    MISSING_ERROR_DETAIL, UNPARSABLE_ERROR_DETAIL,
};

use axum::extract::Multipart;
use reqmatch_core::has_extension;

use crate::error::ApiError;

pub const INVALID_FORMAT: &str = "Invalid file format. Only PDFs are allowed.";

/// An uploaded file with its data and metadata.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parse the multipart upload form and return the `pdf` file part.
///
/// The file must carry the configured candidate `extension` so the upload
/// lands in the corpus it is compared against.
pub async fn parse_multipart(
    mut multipart: Multipart,
    extension: &str,
) -> Result<UploadedFile, ApiError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "pdf" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?
                    .to_vec();
                file = Some(UploadedFile { filename, data });
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("No file part".to_string()))?;
    validate_upload(&file.filename, &file.data, extension)?;
    Ok(file)
}

fn is_pdf_extension(extension: &str) -> bool {
    extension.trim_start_matches('.').eq_ignore_ascii_case("pdf")
}

/// Accept only named uploads carrying `extension`. PDFs must also start with
/// the PDF magic.
pub fn validate_upload(filename: &str, data: &[u8], extension: &str) -> Result<(), ApiError> {
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No selected file".to_string()));
    }
    let is_pdf = is_pdf_extension(extension);
    if !has_extension(filename, extension) || (is_pdf && !data.starts_with(b"%PDF-")) {
        let message = if is_pdf {
            INVALID_FORMAT.to_string()
        } else {
            format!(
                "Invalid file format. Only .{} files are allowed.",
                extension.trim_start_matches('.')
            )
        };
        return Err(ApiError::BadRequest(message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), ApiError>) -> String {
        match result {
            Err(ApiError::BadRequest(m)) => m,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn accepts_real_pdf() {
        assert!(validate_upload("spec.pdf", b"%PDF-1.7\n...", "pdf").is_ok());
        assert!(validate_upload("SPEC.PDF", b"%PDF-1.4", "pdf").is_ok());
    }

    #[test]
    fn empty_name_is_no_selected_file() {
        assert_eq!(message(validate_upload("", b"%PDF-1.7", "pdf")), "No selected file");
    }

    #[test]
    fn wrong_extension_or_magic_is_rejected() {
        assert_eq!(message(validate_upload("notes.txt", b"%PDF-1.7", "pdf")), INVALID_FORMAT);
        assert_eq!(message(validate_upload("fake.pdf", b"PK\x03\x04", "pdf")), INVALID_FORMAT);
    }

    #[test]
    fn follows_the_configured_extension() {
        assert!(validate_upload("notes.txt", b"plain text", "txt").is_ok());
        assert!(validate_upload("notes.TXT", b"plain text", ".txt").is_ok());
        assert_eq!(
            message(validate_upload("spec.pdf", b"%PDF-1.7", "txt")),
            "Invalid file format. Only .txt files are allowed."
        );
    }
}

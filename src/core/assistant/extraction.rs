// =============================================================================
// FILE CONTENT EXTRACTION
// =============================================================================
//
// Turns the files of the shared folder into one grounding context:
// 1. Decide per MIME type whether a file can be read as text at all
// 2. Export readable files (falling back to a raw download)
// 3. Run all extractions concurrently and glue the texts together in
//    listing order
//
// A file that cannot be read contributes nothing. It never fails the request.

use super::assistant_models::DriveFile;
use super::assistant_ports::DriveStore;
use futures::future::join_all;
use std::error::Error;

/// Placed between the texts of consecutive files.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

const NATIVE_PREFIX: &str = "application/vnd.google-apps.";
const NATIVE_SPREADSHEET: &str = "application/vnd.google-apps.spreadsheet";
const NATIVE_FOLDER: &str = "application/vnd.google-apps.folder";
const NATIVE_SHORTCUT: &str = "application/vnd.google-apps.shortcut";

/// Which MIME type to export a file as, or `None` when the file is not text.
///
/// Native documents become plain text (spreadsheets become CSV, the only
/// text format the drive offers for them). `text/*` files are exported as
/// themselves. Everything else is skipped without touching the network.
pub fn export_mime_type(mime_type: &str) -> Option<&str> {
    if mime_type == NATIVE_SPREADSHEET {
        Some("text/csv")
    } else if mime_type == NATIVE_FOLDER || mime_type == NATIVE_SHORTCUT {
        None
    } else if mime_type.starts_with(NATIVE_PREFIX) {
        Some("text/plain")
    } else if mime_type.starts_with("text/") {
        Some(mime_type)
    } else {
        None
    }
}

/// Reads one file as text.
///
/// Unsupported types yield an empty string. An export failure falls back to
/// a raw download of the same file; if that fails too the error is returned
/// and the caller decides what to do with it.
pub async fn extract_text<D: DriveStore + ?Sized>(
    drive: &D,
    access_token: &str,
    file: &DriveFile,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let Some(export_as) = export_mime_type(&file.mime_type) else {
        tracing::debug!(file = %file.name, mime_type = %file.mime_type, "Skipping non-text file");
        return Ok(String::new());
    };

    match drive.export(access_token, &file.id, export_as).await {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::debug!(file = %file.name, "Export failed ({}), trying raw download", e);
            drive.download(access_token, &file.id).await
        }
    }
}

/// Extracts every file concurrently and joins the results in listing order.
///
/// Each extraction settles on its own: a failure becomes an empty
/// contribution and does not cancel its siblings.
pub async fn gather_context<D: DriveStore + ?Sized>(
    drive: &D,
    access_token: &str,
    files: &[DriveFile],
) -> String {
    let extractions = files.iter().map(|file| async move {
        match extract_text(drive, access_token, file).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %file.name, "Could not read file: {}", e);
                String::new()
            }
        }
    });

    let texts = join_all(extractions).await;
    join_context(&texts)
}

/// Joins non-empty texts with `CONTEXT_SEPARATOR`.
pub fn join_context(texts: &[String]) -> String {
    texts
        .iter()
        .filter(|text| !text.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

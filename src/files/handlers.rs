use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

const ALLOWED_MIME_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/csv",
];

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file: String,
}

/// Extension and declared MIME type must both match a spreadsheet type.
fn is_allowed_upload(file_name: &str, content_type: &str) -> bool {
    let extension_ok = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let ext = e.to_ascii_lowercase();
            ext == "xlsx" || ext == "csv"
        })
        .unwrap_or(false);
    extension_ok && ALLOWED_MIME_TYPES.contains(&content_type)
}

#[instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(|n| n.to_string())
            .ok_or_else(|| ApiError::Validation("file name is required".into()))?;
        let content_type = field
            .content_type()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());

        if !is_allowed_upload(&file_name, &content_type) {
            warn!(file = %file_name, content_type = %content_type, "rejected upload");
            return Err(ApiError::Validation(
                "Only .xlsx and .csv files are allowed!".into(),
            ));
        }

        let body = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let stored = state.files.save(&file_name, body).await?;
        return Ok(Json(UploadResponse {
            message: "File uploaded successfully".into(),
            file: stored,
        }));
    }
    Err(ApiError::Validation("file is required".into()))
}

#[instrument(skip(state))]
pub async fn list_files(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<String>>, ApiError> {
    let names = state.files.list().await?;
    Ok(Json(names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_spreadsheet_uploads() {
        assert!(is_allowed_upload(
            "members.xlsx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ));
        assert!(is_allowed_upload("trainers.csv", "text/csv"));
        assert!(is_allowed_upload("UPPER.CSV", "text/csv"));
    }

    #[test]
    fn rejects_wrong_extension_or_mime() {
        assert!(!is_allowed_upload("script.exe", "text/csv"));
        assert!(!is_allowed_upload("members.xlsx", "application/pdf"));
        assert!(!is_allowed_upload("notes.txt", "text/plain"));
        assert!(!is_allowed_upload("noextension", "text/csv"));
    }
}

use std::path::{Component, Path, PathBuf};

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::{AppState, error::AppError};

/// Directory the frontend build lands in, relative to the working directory.
pub const DIST_DIR: &str = "dist";
/// Entry document returned for every unmatched GET (client-side routing).
pub const INDEX_FILE: &str = "index.html";

/// Serves the SPA bundle: a file under the dist directory wins, every other
/// GET falls back to the entry document.
#[tracing::instrument(skip_all, fields(path = %uri.path()))]
pub async fn serve_spa(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, AppError> {
    if method != Method::GET {
        return Err(AppError::Status(StatusCode::NOT_FOUND));
    }

    if let Some(file) = resolve(&state.dist_dir, uri.path()) {
        if let Ok(contents) = tokio::fs::read(&file).await {
            let mime = mime_guess::from_path(&file).first_or_octet_stream();
            return Ok(([(header::CONTENT_TYPE, mime.to_string())], contents).into_response());
        }
    }

    let index = state.dist_dir.join(INDEX_FILE);
    let contents = tokio::fs::read(&index).await.map_err(|e| {
        error!(message = "Failed to read SPA entry document", path = %index.display(), error = %e);
        AppError::Status(StatusCode::INTERNAL_SERVER_ERROR)
    })?;
    let mime = mime_guess::from_path(&index).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], contents).into_response())
}

// Only plain path components may reach the filesystem; anything else falls
// through to the entry document.
fn resolve(dist: &Path, path: &str) -> Option<PathBuf> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    let relative = Path::new(relative);
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(dist.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router;
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const INDEX_BODY: &str = "<!doctype html><title>ISS Tracker</title>";

    fn dist_fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(INDEX_FILE), INDEX_BODY).unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/app.css"), "body { margin: 0 }").unwrap();
        dir
    }

    fn state_with_dist(dist_dir: PathBuf) -> AppState {
        AppState {
            client: reqwest::Client::new(),
            upstream_url: "http://127.0.0.1:9/unused".to_string(),
            dist_dir,
        }
    }

    fn state_for(dist: &TempDir) -> AppState {
        state_with_dist(dist.path().to_path_buf())
    }

    async fn get(app: axum::Router, path: &str) -> Response {
        app.oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn content_type(response: &Response) -> &str {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn serves_built_assets_with_inferred_type() {
        let dist = dist_fixture();
        let response = get(router(state_for(&dist)), "/assets/app.css").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "text/css");
        assert_eq!(body_string(response).await, "body { margin: 0 }");
    }

    #[tokio::test]
    async fn root_serves_entry_document() {
        let dist = dist_fixture();
        let response = get(router(state_for(&dist)), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "text/html");
        assert_eq!(body_string(response).await, INDEX_BODY);
    }

    #[tokio::test]
    async fn unmatched_route_falls_back_to_entry_document() {
        let dist = dist_fixture();
        let response = get(router(state_for(&dist)), "/orbit/details").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, INDEX_BODY);
    }

    #[tokio::test]
    async fn parent_components_never_reach_the_filesystem() {
        let root = TempDir::new().unwrap();
        let dist_dir = root.path().join("dist");
        fs::create_dir(&dist_dir).unwrap();
        fs::write(dist_dir.join(INDEX_FILE), INDEX_BODY).unwrap();
        fs::write(root.path().join("secret.txt"), "secret").unwrap();

        let response = get(router(state_with_dist(dist_dir)), "/../secret.txt").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, INDEX_BODY);
    }

    #[tokio::test]
    async fn non_get_is_not_found() {
        let dist = dist_fixture();
        let response = router(state_for(&dist))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/orbit")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_entry_document_is_an_error() {
        let dist = TempDir::new().unwrap();
        let response = get(router(state_for(&dist)), "/anywhere").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

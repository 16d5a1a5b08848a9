//! Static file serving for the bundled UI.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::state::AppState;

/// Document served for `/`
const INDEX: &str = "/index.html";

/// Handle GET: serve a file from the static root.
pub async fn serve_file(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let path = match uri.path() {
        "/" => INDEX,
        other => other,
    };

    let Some(file) = resolve(&state.http.root, path) else {
        debug!(path, "rejected path outside static root");
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&file).await {
        Ok(contents) => (
            [(header::CONTENT_TYPE, state.http.content_type(path).to_string())],
            contents,
        )
            .into_response(),
        Err(e) => {
            debug!(path, error = %e, "static file not found");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Map a request path onto the static root. Paths that would climb out of
/// the root resolve to nothing.
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_under_root() {
        let root = Path::new("/srv/public");
        assert_eq!(
            resolve(root, "/css/site.css"),
            Some(PathBuf::from("/srv/public/css/site.css"))
        );
        assert_eq!(
            resolve(root, "/./index.html"),
            Some(PathBuf::from("/srv/public/index.html"))
        );
    }

    #[test]
    fn test_resolve_rejects_parent_dirs() {
        let root = Path::new("/srv/public");
        assert_eq!(resolve(root, "/../secret.txt"), None);
        assert_eq!(resolve(root, "/css/../../etc/passwd"), None);
    }
}

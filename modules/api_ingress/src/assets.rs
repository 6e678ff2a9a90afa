use std::path::Path;

use tower_http::services::ServeDir;

/// Static file service for item images. Missing files answer 404.
pub fn image_service(dir: &Path) -> ServeDir {
    if !dir.is_dir() {
        tracing::warn!(
            "Assets directory {} does not exist; /images will answer 404",
            dir.display()
        );
    }
    ServeDir::new(dir)
}

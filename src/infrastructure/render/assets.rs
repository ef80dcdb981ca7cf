use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::domain::DomainError;

/// Image file as a `data:` URI, `None` when the file does not exist
pub async fn image_to_data_uri(path: &Path) -> Result<Option<String>, DomainError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(DomainError::render(format!(
                "Failed to read image {}: {}",
                path.display(),
                e
            )));
        }
    };

    let mime = mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "image/png".to_string());

    Ok(Some(format!("data:{};base64,{}", mime, STANDARD.encode(bytes))))
}

/// Optional artwork supplied with a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailerAssets {
    pub top_banner: Option<String>,
    pub bottom_banner: Option<String>,
    pub right_side_image: Option<String>,
}

impl MailerAssets {
    /// Embed whichever image files are given
    pub async fn load(
        top_banner: Option<&Path>,
        bottom_banner: Option<&Path>,
        right_side_image: Option<&Path>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            top_banner: load_optional(top_banner).await?,
            bottom_banner: load_optional(bottom_banner).await?,
            right_side_image: load_optional(right_side_image).await?,
        })
    }
}

async fn load_optional(path: Option<&Path>) -> Result<Option<String>, DomainError> {
    match path {
        Some(path) => image_to_data_uri(path).await,
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_png_data_uri() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("banner.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let uri = image_to_data_uri(&path).await.unwrap().unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn test_jpeg_mime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agent.JPG");
        std::fs::write(&path, b"jpeg").unwrap();

        let uri = image_to_data_uri(&path).await.unwrap().unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_unknown_extension_defaults_to_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("artwork.bin");
        std::fs::write(&path, b"x").unwrap();

        let uri = image_to_data_uri(&path).await.unwrap().unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(image_to_data_uri(&dir.path().join("nope.png")).await.unwrap().is_none());

        let assets = MailerAssets::load(None, Some(&dir.path().join("nope.gif")), None)
            .await
            .unwrap();
        assert_eq!(assets, MailerAssets::default());
    }
}

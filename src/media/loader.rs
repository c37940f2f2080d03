/// Picture loading
///
/// Fetching happens on the async runtime; decoding is CPU-bound and runs
/// on the blocking pool so the UI thread never stalls on a large photo.

use std::path::PathBuf;

use image::DynamicImage;
use tokio::task;

use super::data_url;
use super::MediaError;

/// Where a card picture lives
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    DataUrl(String),
    Remote(String),
    File(PathBuf),
}

impl ImageSource {
    /// Classify a stored picture reference
    pub fn parse(reference: &str) -> Result<Self, MediaError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(MediaError::Empty);
        }
        if data_url::is_data_url(reference) {
            return Ok(Self::DataUrl(reference.to_string()));
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(Self::Remote(reference.to_string()));
        }
        if let Some(path) = reference.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }
        if reference.contains("://") {
            return Err(MediaError::Unsupported(reference.to_string()));
        }
        Ok(Self::File(PathBuf::from(reference)))
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::DataUrl(_))
    }
}

/// Fetch the encoded bytes behind a picture reference
pub async fn load_bytes(reference: &str, client: &reqwest::Client) -> Result<Vec<u8>, MediaError> {
    match ImageSource::parse(reference)? {
        ImageSource::DataUrl(url) => Ok(data_url::decode(&url)?.bytes),
        ImageSource::Remote(url) => {
            let response = client.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(MediaError::HttpStatus(status.as_u16()));
            }
            Ok(response.bytes().await?.to_vec())
        }
        ImageSource::File(path) => Ok(tokio::fs::read(&path).await?),
    }
}

/// Fetch and decode a picture
pub async fn load_image(reference: String, client: reqwest::Client) -> Result<DynamicImage, MediaError> {
    let bytes = load_bytes(&reference, &client).await?;
    let image = task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| MediaError::Join(e.to_string()))??;

    log::debug!("🖼️  Decoded picture: {}x{}", image.width(), image.height());
    Ok(image)
}

/// Rewrite a picture reference as a self-contained `data:` URL
pub async fn inline_reference(reference: &str, client: &reqwest::Client) -> Result<String, MediaError> {
    if data_url::is_data_url(reference) {
        return Ok(reference.to_string());
    }
    let bytes = load_bytes(reference, client).await?;
    Ok(data_url::encode(data_url::sniff_mime(&bytes), &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 2, Rgba([255, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_parse_sources() {
        assert!(ImageSource::parse("data:image/png;base64,AAAA").unwrap().is_inline());
        assert_eq!(
            ImageSource::parse("https://cdn.example.com/a.png").unwrap(),
            ImageSource::Remote("https://cdn.example.com/a.png".into())
        );
        assert_eq!(
            ImageSource::parse("file:///tmp/a.png").unwrap(),
            ImageSource::File(PathBuf::from("/tmp/a.png"))
        );
        assert_eq!(
            ImageSource::parse("pictures/cat.png").unwrap(),
            ImageSource::File(PathBuf::from("pictures/cat.png"))
        );
        assert!(matches!(ImageSource::parse("  "), Err(MediaError::Empty)));
        assert!(matches!(ImageSource::parse("ftp://x/y.png"), Err(MediaError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_load_image_from_data_url() {
        let url = data_url::encode("image/png", &png_bytes());
        let image = load_image(url, reqwest::Client::new()).await.unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[tokio::test]
    async fn test_load_image_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let image = load_image(path.display().to_string(), reqwest::Client::new())
            .await
            .unwrap();
        assert_eq!(image.width(), 3);
    }

    #[tokio::test]
    async fn test_undecodable_bytes_fail() {
        let url = data_url::encode("image/png", b"not a picture");
        let result = load_image(url, reqwest::Client::new()).await;
        assert!(matches!(result, Err(MediaError::Decode(_))));
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let result = load_image("/definitely/not/here.png".into(), reqwest::Client::new()).await;
        assert!(matches!(result, Err(MediaError::Io(_))));
    }

    #[tokio::test]
    async fn test_inline_reference_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let url = inline_reference(&path.display().to_string(), &reqwest::Client::new())
            .await
            .unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let already = "data:image/png;base64,AAAA";
        assert_eq!(inline_reference(already, &reqwest::Client::new()).await.unwrap(), already);
    }
}

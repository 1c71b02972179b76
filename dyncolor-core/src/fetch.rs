use image::RgbaImage;
use log::debug;
use std::time::Duration;
use thiserror::Error;

/// A remote image decoded into memory, remembering where it came from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub url: String,
    pub bitmap: RgbaImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: attohttpc::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode image from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}

/// Retrieves an image and decodes it. Implementations may block; the apply
/// workflow only ever calls them from its worker thread.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<DecodedImage, FetchError>;
}

pub struct HttpImageFetcher {
    timeout: Duration,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<DecodedImage, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = attohttpc::get(url)
            .timeout(self.timeout)
            .send()
            .map_err(transport)?;

        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().map_err(transport)?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        decode_image(url, &bytes)
    }
}

pub fn decode_image(url: &str, bytes: &[u8]) -> Result<DecodedImage, FetchError> {
    let img = image::load_from_memory(bytes).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })?;

    Ok(DecodedImage {
        url: url.to_string(),
        bitmap: img.to_rgba8(),
    })
}

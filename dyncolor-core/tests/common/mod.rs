#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dyncolor_core::fetch::decode_image;
use dyncolor_core::{
    DecodedImage, FetchError, ImageFetcher, Notification, Notify, WallpaperError, WallpaperSetter,
};
use image::{ImageFormat, Rgba, RgbaImage};

pub const WAIT: Duration = Duration::from_secs(5);

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 120, 40, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Serves canned bodies; unknown URLs fail to decode. Requests for URLs with a
/// gate block until the gate is opened.
#[derive(Default)]
pub struct FakeFetcher {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    gates: Mutex<HashMap<String, Receiver<()>>>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn serving(url: &str, body: Vec<u8>) -> Self {
        let fetcher = Self::default();
        fetcher.serve(url, body);
        fetcher
    }

    pub fn serve(&self, url: &str, body: Vec<u8>) {
        self.bodies.lock().unwrap().insert(url.to_string(), body);
    }

    /// Makes requests for `url` wait until the returned sender fires.
    pub fn gate(&self, url: &str) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().insert(url.to_string(), rx);
        tx
    }
}

impl ImageFetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<DecodedImage, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        let gate = self.gates.lock().unwrap().remove(url);
        if let Some(gate) = gate {
            let _ = gate.recv_timeout(WAIT);
        }

        let body = self.bodies.lock().unwrap().get(url).cloned().unwrap_or_default();
        decode_image(url, &body)
    }
}

/// Records which images reached the wallpaper facility.
#[derive(Default)]
pub struct RecordingSetter {
    pub applied: Mutex<Vec<String>>,
    reject: bool,
}

impl RecordingSetter {
    pub fn rejecting() -> Self {
        Self {
            applied: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }
}

impl WallpaperSetter for RecordingSetter {
    fn set_wallpaper(&self, image: &DecodedImage) -> Result<(), WallpaperError> {
        self.applied.lock().unwrap().push(image.url.clone());
        if self.reject {
            return Err(WallpaperError::Platform("refused".to_string()));
        }
        Ok(())
    }
}

pub fn channel_notifier() -> (Arc<dyn Notify>, Receiver<Notification>) {
    let (tx, rx) = mpsc::channel();
    let notifier = move |notification: Notification| {
        let _ = tx.send(notification);
    };
    (Arc::new(notifier), rx)
}

//! CAPTCHA recognition service
//!
//! Responsibilities:
//! - turn raw CAPTCHA image bytes into best-effort text
//! - no network access, no retries (retry policy belongs to the job)
//!
//! An empty string means "no confident read, fetch a fresh challenge";
//! `Err` means the OCR engine itself broke.

use crate::config::Config;
use crate::error::{AppResult, CaptchaError};
use async_trait::async_trait;
use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Characters the portal's CAPTCHAs are drawn from
const RECOGNITION_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Binarization cutoff: pixels above become white, below become black
const BINARIZE_THRESHOLD: u8 = 128;

/// Best-effort CAPTCHA recognition.
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    /// Recognize the text in `image`. Deterministic for identical bytes
    /// and engine version. Returns an empty string when no confident
    /// read is possible; `Err` only for engine failures.
    async fn solve(&self, image: &[u8]) -> AppResult<String>;
}

/// Production solver: preprocessing with the `image` crate, recognition
/// by the Tesseract CLI.
pub struct TesseractSolver {
    cmd: String,
}

impl TesseractSolver {
    pub fn new(config: &Config) -> Self {
        Self {
            cmd: config.tesseract_cmd.clone(),
        }
    }

    /// Grayscale, fixed-threshold binarization, 3x3 median denoise.
    /// Re-encoded as PNG for the engine.
    fn preprocess(image: &[u8]) -> Result<Vec<u8>, CaptchaError> {
        let decoded = image::load_from_memory(image)
            .map_err(|e| CaptchaError::ImageDecodeFailed { source: Box::new(e) })?;

        let gray = decoded.to_luma8();
        let binarized = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            if gray.get_pixel(x, y)[0] > BINARIZE_THRESHOLD {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        let cleaned = median_3x3(&binarized);

        let mut out = Vec::new();
        image::DynamicImage::ImageLuma8(cleaned)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(|e| CaptchaError::ImageDecodeFailed { source: Box::new(e) })?;
        Ok(out)
    }
}

#[async_trait]
impl CaptchaSolver for TesseractSolver {
    async fn solve(&self, image: &[u8]) -> AppResult<String> {
        let png = Self::preprocess(image)?;

        // Single-word page segmentation, restricted to the portal's alphabet
        let mut child = Command::new(&self.cmd)
            .arg("stdin")
            .arg("stdout")
            .arg("--psm")
            .arg("8")
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", RECOGNITION_ALPHABET))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CaptchaError::EngineSpawnFailed {
                cmd: self.cmd.clone(),
                source: Box::new(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .await
                .map_err(|e| CaptchaError::EngineFailed {
                    detail: format!("cannot feed image to engine: {}", e),
                })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CaptchaError::EngineFailed {
                detail: format!("engine did not exit cleanly: {}", e),
            })?;

        if !output.status.success() {
            return Err(CaptchaError::EngineFailed {
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        // Whitespace inside the read is as good as a misread character
        let text: String = String::from_utf8_lossy(&output.stdout)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        debug!("captcha solved as '{}'", text);
        Ok(text)
    }
}

/// 3x3 median filter over a grayscale image. Border pixels keep their
/// value (the CAPTCHA glyphs never touch the border).
fn median_3x3(image: &GrayImage) -> GrayImage {
    let (w, h) = image.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
            return *image.get_pixel(x, y);
        }
        let mut window = [0u8; 9];
        let mut i = 0;
        for dy in 0..3 {
            for dx in 0..3 {
                window[i] = image.get_pixel(x + dx - 1, y + dy - 1)[0];
                i += 1;
            }
        }
        window.sort_unstable();
        Luma([window[4]])
    })
}

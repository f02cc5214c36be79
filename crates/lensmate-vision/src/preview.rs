//! 백엔드 첨부용 프리뷰 인코더.
//!
//! ≤640×480으로 축소 → JPEG(품질 60) → base64.
//! 멀티모달 요청 페이로드 크기를 작게 유지한다.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use lensmate_core::config::PreviewConfig;
use lensmate_core::error::CoreError;
use lensmate_core::models::frame::Frame;
use lensmate_core::ports::reasoning::InlineImage;
use tracing::debug;

use crate::resize;

/// 첨부 이미지 MIME 타입
pub const PREVIEW_MIME_TYPE: &str = "image/jpeg";

/// 프리뷰 인코더
#[derive(Debug, Clone)]
pub struct PreviewEncoder {
    max_width: u32,
    max_height: u32,
    quality: u8,
}

impl PreviewEncoder {
    pub fn new(max_width: u32, max_height: u32, quality: u8) -> Self {
        Self {
            max_width,
            max_height,
            quality: quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &PreviewConfig) -> Self {
        Self::new(config.max_width, config.max_height, config.jpeg_quality)
    }

    /// JPEG 바이트로 인코딩
    pub fn encode_jpeg(&self, frame: &Frame) -> Result<Vec<u8>, CoreError> {
        let rgba = resize::frame_to_rgba(frame)?;
        let scaled = resize::downscale_within(rgba, self.max_width, self.max_height)?;
        // JPEG은 알파 채널을 지원하지 않음
        let rgb = DynamicImage::ImageRgba8(scaled).to_rgb8();

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.quality)
            .encode_image(&rgb)
            .map_err(|e| CoreError::Image(format!("JPEG 인코딩 실패: {e}")))?;

        debug!(
            "프리뷰 인코딩: {}x{} → {}x{}, {}KB",
            frame.width,
            frame.height,
            rgb.width(),
            rgb.height(),
            buf.len() / 1024
        );
        Ok(buf)
    }

    /// 요청 첨부용 인라인 이미지로 인코딩
    pub fn encode(&self, frame: &Frame) -> Result<InlineImage, CoreError> {
        let jpeg = self.encode_jpeg(frame)?;
        Ok(InlineImage {
            mime_type: PREVIEW_MIME_TYPE.to_string(),
            data: B64.encode(jpeg),
        })
    }
}

impl Default for PreviewEncoder {
    fn default() -> Self {
        Self::from_config(&PreviewConfig::default())
    }
}

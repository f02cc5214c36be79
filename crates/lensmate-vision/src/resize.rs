//! 프레임 변환 및 고속 리사이즈.
//!
//! fast_image_resize 기반. 분석 전 축소와 백엔드 첨부용 프리뷰 축소에 공통으로 쓰인다.

use fast_image_resize::{images::Image as FirImage, ResizeAlg, ResizeOptions, Resizer};
use image::RgbaImage;
use lensmate_core::error::CoreError;
use lensmate_core::models::frame::Frame;
use tracing::debug;

/// 코어 프레임 → RGBA 이미지
pub fn frame_to_rgba(frame: &Frame) -> Result<RgbaImage, CoreError> {
    if frame.is_empty() {
        return Err(CoreError::Image("빈 프레임".to_string()));
    }
    RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .ok_or_else(|| CoreError::Image("프레임 버퍼 크기 불일치".to_string()))
}

/// RGBA 이미지 → 코어 프레임
pub fn rgba_to_frame(image: RgbaImage) -> Frame {
    let (width, height) = image.dimensions();
    Frame {
        width,
        height,
        rgba: image.into_raw(),
    }
}

/// 비율을 유지하며 최대 크기 안에 들어가는 크기 계산 (확대하지 않음)
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);
    let w = ((width as f64 * scale) as u32).max(1);
    let h = ((height as f64 * scale) as u32).max(1);
    (w, h)
}

/// 고속 리사이즈 (Bilinear 컨볼루션)
pub fn fast_resize(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, CoreError> {
    let (src_w, src_h) = image.dimensions();

    if src_w == width && src_h == height {
        return Ok(image.clone());
    }
    if src_w == 0 || src_h == 0 {
        return Err(CoreError::Image("소스 이미지 크기 0".to_string()));
    }
    if width == 0 || height == 0 {
        return Err(CoreError::Image("목표 이미지 크기 0".to_string()));
    }

    let src_image = FirImage::from_vec_u8(
        src_w,
        src_h,
        image.as_raw().clone(),
        fast_image_resize::PixelType::U8x4,
    )
    .map_err(|e| CoreError::Image(format!("소스 이미지 생성 실패: {e}")))?;

    let mut dst_image = FirImage::new(width, height, fast_image_resize::PixelType::U8x4);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));

    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CoreError::Image(format!("리사이즈 실패: {e}")))?;

    debug!("리사이즈: {}x{} → {}x{}", src_w, src_h, width, height);

    RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| CoreError::Image("결과 이미지 생성 실패".to_string()))
}

/// 최대 크기를 넘으면 비율 유지 축소, 아니면 그대로
pub fn downscale_within(
    image: RgbaImage,
    max_width: u32,
    max_height: u32,
) -> Result<RgbaImage, CoreError> {
    let (w, h) = image.dimensions();
    let (tw, th) = fit_within(w, h, max_width, max_height);
    if (tw, th) == (w, h) {
        return Ok(image);
    }
    fast_resize(&image, tw, th)
}

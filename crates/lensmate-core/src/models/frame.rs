//! 프리뷰 프레임 모델.
//!
//! 카메라 프리뷰에서 샘플링한 한 장의 디코딩된 이미지.
//! 코어는 이미지 crate에 의존하지 않으므로 RGBA8 원시 버퍼로만 표현한다.

use crate::error::CoreError;

/// 디코딩된 프리뷰 프레임 (RGBA8, row-major)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 너비 (픽셀)
    pub width: u32,
    /// 높이 (픽셀)
    pub height: u32,
    /// RGBA8 픽셀 데이터 (`width * height * 4` 바이트)
    pub rgba: Vec<u8>,
}

impl Frame {
    /// 버퍼 길이를 검증하며 프레임 생성
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CoreError::Validation {
                field: "rgba".to_string(),
                message: format!("버퍼 길이 불일치: expected={expected}, actual={}", rgba.len()),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// 단색 프레임 (테스트/시뮬레이션용)
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    /// 픽셀 수
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 비어있는지 (0 크기)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_rejects_wrong_length() {
        assert!(Frame::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(Frame::from_rgba(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn solid_fills_every_pixel() {
        let frame = Frame::solid(3, 2, [10, 20, 30, 255]);
        assert_eq!(frame.rgba.len(), 24);
        assert_eq!(&frame.rgba[20..24], &[10, 20, 30, 255]);
        assert_eq!(frame.pixel_count(), 6);
        assert!(!frame.is_empty());
    }
}

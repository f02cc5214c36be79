//! SCRFD 얼굴 검출 전후처리.
//!
//! 입력 레터박스/텐서 변환과 출력 디코딩(앵커 중심 + 거리 예측, NMS)은
//! 추론 런타임과 무관하므로 항상 빌드한다.
//! OpenVINO로 모델을 돌리는 [`ScrfdFaceDetector`]는 `scrfd` 기능에서만 제공된다.

use image::{Rgba, RgbaImage};
use lensmate_core::error::CoreError;

use crate::resize;

#[cfg(feature = "scrfd")]
mod scrfd;

#[cfg(feature = "scrfd")]
pub use scrfd::ScrfdFaceDetector;

/// 모델 입력 한 변 (정사각)
pub const INPUT_SIZE: u32 = 640;

/// 중복 박스 제거 IoU 기준
pub const NMS_IOU: f32 = 0.4;

/// 입력 좌표계 얼굴 박스
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
}

impl FaceBox {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// 교집합 / 합집합
    pub fn iou(&self, other: &FaceBox) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let inter = w * h;
        let union = self.area() + other.area() - inter;
        if union > 0.0 {
            inter / union
        } else {
            0.0
        }
    }
}

// ============================================================
// 출력 구성
// ============================================================

const STRIDES_3: &[u32] = &[8, 16, 32];
const STRIDES_5: &[u32] = &[8, 16, 32, 64, 128];

/// 출력 텐서 수로 판별한 SCRFD 변형
///
/// 출력 순서는 `[점수 × 레벨, 박스 × 레벨, (키포인트 × 레벨)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrfdLayout {
    pub strides: &'static [u32],
    pub anchors_per_cell: usize,
    pub has_keypoints: bool,
}

impl ScrfdLayout {
    pub fn from_output_count(count: usize) -> Option<Self> {
        let (strides, anchors_per_cell, has_keypoints) = match count {
            6 => (STRIDES_3, 2, false),
            9 => (STRIDES_3, 2, true),
            10 => (STRIDES_5, 1, false),
            15 => (STRIDES_5, 1, true),
            _ => return None,
        };
        Some(Self {
            strides,
            anchors_per_cell,
            has_keypoints,
        })
    }

    /// 레벨별 (점수 출력, 박스 출력) 인덱스
    pub fn output_indices(&self, level: usize) -> (usize, usize) {
        (level, level + self.strides.len())
    }
}

// ============================================================
// 전처리
// ============================================================

/// 비율 유지 축소/확대 후 `size × size` 검은 캔버스 가운데에 배치
pub fn letterbox(image: &RgbaImage, size: u32) -> Result<RgbaImage, CoreError> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(CoreError::Image("빈 이미지는 레터박스 불가".to_string()));
    }
    let scale = f64::min(size as f64 / w as f64, size as f64 / h as f64);
    let nw = ((w as f64 * scale) as u32).clamp(1, size);
    let nh = ((h as f64 * scale) as u32).clamp(1, size);

    let scaled = resize::fast_resize(image, nw, nh)?;
    let mut canvas = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 255]));
    image::imageops::overlay(
        &mut canvas,
        &scaled,
        ((size - nw) / 2) as i64,
        ((size - nh) / 2) as i64,
    );
    Ok(canvas)
}

/// NCHW 평면, BGR 순서, `(v - 127.5) / 128` 정규화
pub fn to_input_tensor(image: &RgbaImage) -> Vec<f32> {
    let plane = (image.width() * image.height()) as usize;
    let norm = |v: u8| (v as f32 - 127.5) / 128.0;

    let mut data = vec![0.0f32; plane * 3];
    for (i, p) in image.pixels().enumerate() {
        let [r, g, b, _] = p.0;
        data[i] = norm(b);
        data[plane + i] = norm(g);
        data[2 * plane + i] = norm(r);
    }
    data
}

// ============================================================
// 후처리
// ============================================================

/// 한 stride 레벨 디코딩
///
/// `distances`는 앵커마다 (left, top, right, bottom)을 stride 단위로 담는다.
pub fn decode_level(
    scores: &[f32],
    distances: &[f32],
    stride: u32,
    anchors_per_cell: usize,
    threshold: f32,
) -> Vec<FaceBox> {
    let cells = (INPUT_SIZE / stride) as usize;
    let anchors = cells * cells * anchors_per_cell.max(1);
    let s = stride as f32;

    scores
        .iter()
        .take(anchors)
        .enumerate()
        .filter(|(_, &score)| score >= threshold)
        .filter_map(|(i, &score)| {
            let d = distances.get(i * 4..i * 4 + 4)?;
            let cell = i / anchors_per_cell.max(1);
            let cx = (cell % cells) as f32 * s;
            let cy = (cell / cells) as f32 * s;
            Some(FaceBox {
                x1: cx - d[0] * s,
                y1: cy - d[1] * s,
                x2: cx + d[2] * s,
                y2: cy + d[3] * s,
                score,
            })
        })
        .collect()
}

/// 점수 내림차순으로 겹치는 박스 제거
pub fn non_max_suppression(mut boxes: Vec<FaceBox>, iou_threshold: f32) -> Vec<FaceBox> {
    boxes.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut keep: Vec<FaceBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        if keep.iter().all(|k| k.iou(&candidate) <= iou_threshold) {
            keep.push(candidate);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> FaceBox {
        FaceBox {
            x1,
            y1,
            x2,
            y2,
            score,
        }
    }

    #[test]
    fn iou_of_offset_squares() {
        let a = face(0.0, 0.0, 10.0, 10.0, 0.9);
        let b = face(5.0, 5.0, 15.0, 15.0, 0.8);
        // 25 / (100 + 100 - 25)
        assert!((a.iou(&b) - 25.0 / 175.0).abs() < 1e-4);
        assert_eq!(a.iou(&face(20.0, 20.0, 30.0, 30.0, 0.5)), 0.0);
    }

    #[test]
    fn layout_from_output_count() {
        let l = ScrfdLayout::from_output_count(9).unwrap();
        assert_eq!(l.strides, &[8, 16, 32]);
        assert_eq!(l.anchors_per_cell, 2);
        assert!(l.has_keypoints);
        assert_eq!(l.output_indices(2), (2, 5));

        let l = ScrfdLayout::from_output_count(10).unwrap();
        assert_eq!(l.strides.len(), 5);
        assert_eq!(l.output_indices(0), (0, 5));

        assert!(ScrfdLayout::from_output_count(7).is_none());
    }

    #[test]
    fn decode_places_box_around_anchor_center() {
        // stride 8 → 80×80 셀, 셀 (x=3, y=1)의 두 번째 앵커
        let index = (80 + 3) * 2 + 1;
        let mut scores = vec![0.0f32; 80 * 80 * 2];
        let mut distances = vec![0.0f32; scores.len() * 4];
        scores[index] = 0.9;
        distances[index * 4..index * 4 + 4].copy_from_slice(&[1.0, 0.5, 2.0, 1.5]);

        let boxes = decode_level(&scores, &distances, 8, 2, 0.5);
        assert_eq!(boxes, vec![face(16.0, 4.0, 40.0, 20.0, 0.9)]);
    }

    #[test]
    fn decode_skips_low_scores_and_truncated_boxes() {
        let scores = vec![0.2, 0.95];
        let distances = vec![1.0; 6];
        assert!(decode_level(&scores, &distances, 32, 2, 0.5).is_empty());
    }

    #[test]
    fn nms_keeps_best_of_overlapping_and_all_disjoint() {
        let boxes = vec![
            face(0.0, 0.0, 10.0, 10.0, 0.7),
            face(1.0, 1.0, 11.0, 11.0, 0.9),
            face(100.0, 100.0, 120.0, 120.0, 0.6),
        ];
        let kept = non_max_suppression(boxes, NMS_IOU);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.9);
        assert_eq!(kept[1].score, 0.6);
    }

    #[test]
    fn letterbox_centers_and_pads_black() {
        let img = RgbaImage::from_pixel(200, 100, Rgba([255, 255, 255, 255]));
        let boxed = letterbox(&img, 64).unwrap();

        assert_eq!(boxed.dimensions(), (64, 64));
        assert_eq!(boxed.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(boxed.get_pixel(32, 32).0, [255, 255, 255, 255]);
        assert_eq!(boxed.get_pixel(32, 63).0, [0, 0, 0, 255]);
    }

    #[test]
    fn tensor_is_planar_bgr() {
        let img = RgbaImage::from_pixel(2, 1, Rgba([255, 128, 0, 255]));
        let t = to_input_tensor(&img);

        assert_eq!(t.len(), 6);
        // B, G, R 평면 순서
        assert!((t[0] - (-127.5 / 128.0)).abs() < 1e-6);
        assert!((t[2] - (0.5 / 128.0)).abs() < 1e-6);
        assert!((t[4] - (127.5 / 128.0)).abs() < 1e-6);
    }
}

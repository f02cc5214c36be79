//! 프레임 지표 계산.
//!
//! 모든 함수는 입력 이미지만 읽는 순수 함수이며 개별적으로 실패할 수 있다.
//! 실패 시 대체값 적용은 호출 측(`analyzer`)의 책임이다.

use image::{GrayImage, RgbaImage};
use imageproc::edges::canny;
use imageproc::filter::{gaussian_blur_f32, laplacian_filter};
use imageproc::hough::{detect_lines, LineDetectionOptions};
use lensmate_core::config::AnalysisThresholds;
use lensmate_core::error::CoreError;
use lensmate_core::models::analysis::{BackgroundType, ColorBalance, ContrastLevel};

/// Hough 누적 투표 임계값
const HOUGH_VOTE_THRESHOLD: u32 = 100;

/// Hough 비최대 억제 반경
const HOUGH_SUPPRESSION_RADIUS: u32 = 8;

/// 수평선으로 인정하는 최대 기울기 (도)
const NEAR_HORIZONTAL_DEG: f64 = 45.0;

/// 구도 점수 창 크기 / 가장자리 여백
const COMPOSITION_WINDOW: u32 = 50;

/// 3분할 점수 창 반경
const THIRDS_RADIUS: u32 = 30;

/// 노이즈 추정용 가우시안 σ (3×3 커널 상당)
const NOISE_BLUR_SIGMA: f32 = 0.8;

fn too_small(what: &str, image_w: u32, image_h: u32) -> CoreError {
    CoreError::Image(format!("{what}: 이미지가 너무 작음 ({image_w}x{image_h})"))
}

// ============================================================
// 엣지 맵
// ============================================================

/// 공유 엣지 맵 (Canny 두 가지 임계값)
pub struct EdgeMaps {
    /// Canny(100, 200): 구도/3분할
    pub strong: GrayImage,
    /// Canny(50, 150): 수평선/배경/피사체 위치
    pub soft: GrayImage,
}

impl EdgeMaps {
    pub fn compute(gray: &GrayImage) -> Result<Self, CoreError> {
        let (w, h) = gray.dimensions();
        if w < 3 || h < 3 {
            return Err(too_small("엣지 검출", w, h));
        }
        Ok(Self {
            strong: canny(gray, 100.0, 200.0),
            soft: canny(gray, 50.0, 150.0),
        })
    }
}

// ============================================================
// 밝기 / 선명도 / 노출
// ============================================================

/// 영역 평균 (빈 영역이면 None)
fn region_mean(gray: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) -> Option<f64> {
    let (w, h) = gray.dimensions();
    let (x1, y1) = (x1.min(w), y1.min(h));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    let mut sum = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            sum += gray.get_pixel(x, y)[0] as u64;
        }
    }
    let count = (x1 - x0) as u64 * (y1 - y0) as u64;
    Some(sum as f64 / count as f64)
}

/// 평균 밝기 (0 ~ 255)
pub fn brightness(gray: &GrayImage) -> Result<f64, CoreError> {
    let (w, h) = gray.dimensions();
    region_mean(gray, 0, 0, w, h).ok_or_else(|| too_small("밝기", w, h))
}

/// 라플라시안 분산 (모분산)
pub fn laplacian_variance(gray: &GrayImage) -> Result<f64, CoreError> {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return Err(too_small("라플라시안", w, h));
    }
    let laplacian = laplacian_filter(gray);
    let n = (w as f64) * (h as f64);
    let (mut sum, mut sum_sq) = (0.0f64, 0.0f64);
    for p in laplacian.pixels() {
        let v = p[0] as f64;
        sum += v;
        sum_sq += v * v;
    }
    let mean = sum / n;
    Ok((sum_sq / n - mean * mean).max(0.0))
}

/// 256구간 그레이스케일 히스토그램
pub fn histogram(gray: &GrayImage) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for p in gray.pixels() {
        bins[p[0] as usize] += 1;
    }
    bins
}

/// 노출 판정 결과
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exposure {
    pub overexposed: bool,
    pub underexposed: bool,
    /// 히스토그램 평균
    pub dynamic_range: f64,
}

/// 히스토그램 양 끝 구간 비율로 노출 판정
pub fn exposure(gray: &GrayImage, thresholds: &AnalysisThresholds) -> Result<Exposure, CoreError> {
    let (w, h) = gray.dimensions();
    let total = w as f64 * h as f64;
    if total == 0.0 {
        return Err(too_small("노출", w, h));
    }
    let bins = histogram(gray);
    Ok(Exposure {
        overexposed: bins[255] as f64 > total * thresholds.overexposed_ratio,
        underexposed: bins[0] as f64 > total * thresholds.underexposed_ratio,
        dynamic_range: bins.iter().sum::<u64>() as f64 / bins.len() as f64,
    })
}

/// 상단 띠가 중앙 영역보다 임계값 이상 밝으면 역광
pub fn backlit(gray: &GrayImage, delta: f64) -> Result<bool, CoreError> {
    let (w, h) = gray.dimensions();
    let center = region_mean(gray, w / 4, h / 4, 3 * w / 4, 3 * h / 4);
    let top = region_mean(gray, 0, 0, w, h / 4);
    match (center, top) {
        (Some(center), Some(top)) => Ok(top - center > delta),
        _ => Err(too_small("역광", w, h)),
    }
}

/// 중앙 1/3 영역 평균이 100 초과
pub fn subject_centered(gray: &GrayImage) -> Result<bool, CoreError> {
    let (w, h) = gray.dimensions();
    let (cx, cy) = (w / 2, h / 2);
    region_mean(gray, cx - w / 6, cy - h / 6, cx + w / 6, cy + h / 6)
        .map(|mean| mean > 100.0)
        .ok_or_else(|| too_small("중앙 피사체", w, h))
}

/// 그레이스케일 표준편차 기반 대비
pub fn contrast(gray: &GrayImage) -> Result<ContrastLevel, CoreError> {
    let (w, h) = gray.dimensions();
    let n = w as f64 * h as f64;
    if n == 0.0 {
        return Err(too_small("대비", w, h));
    }
    let mean = gray.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
    let variance = gray
        .pixels()
        .map(|p| (p[0] as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();
    Ok(match std_dev {
        s if s > 60.0 => ContrastLevel::High,
        s if s > 30.0 => ContrastLevel::Normal,
        _ => ContrastLevel::Low,
    })
}

/// 가우시안 블러와의 평균 절대 차이
pub fn noise_level(gray: &GrayImage) -> Result<f64, CoreError> {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return Err(too_small("노이즈", w, h));
    }
    let blurred = gaussian_blur_f32(gray, NOISE_BLUR_SIGMA);
    let total: f64 = gray
        .pixels()
        .zip(blurred.pixels())
        .map(|(a, b)| (a[0] as f64 - b[0] as f64).abs())
        .sum();
    Ok(total / (w as f64 * h as f64))
}

// ============================================================
// 색 균형
// ============================================================

/// 채널 평균 기반 색 균형
pub fn color_balance(rgba: &RgbaImage) -> Result<ColorBalance, CoreError> {
    let (w, h) = rgba.dimensions();
    let n = w as f64 * h as f64;
    if n == 0.0 {
        return Err(too_small("색 균형", w, h));
    }
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for p in rgba.pixels() {
        r += p[0] as u64;
        g += p[1] as u64;
        b += p[2] as u64;
    }
    let (r, g, b) = (r as f64 / n, g as f64 / n, b as f64 / n);

    Ok(if r > g + 20.0 && r > b + 20.0 {
        ColorBalance::Warm
    } else if b > r + 20.0 && b > g + 10.0 {
        ColorBalance::Cool
    } else if (r - g).abs() < 10.0 && (g - b).abs() < 10.0 {
        ColorBalance::Balanced
    } else {
        ColorBalance::Neutral
    })
}

// ============================================================
// 엣지 기반 지표
// ============================================================

/// 엣지 픽셀 비율
pub fn edge_ratio(edges: &GrayImage) -> f64 {
    let (w, h) = edges.dimensions();
    let total = w as f64 * h as f64;
    if total == 0.0 {
        return 0.0;
    }
    edges.pixels().filter(|p| p[0] > 0).count() as f64 / total
}

/// 엣지 비율로 배경 복잡도 분류
pub fn background_type(edges: &GrayImage, thresholds: &AnalysisThresholds) -> BackgroundType {
    match edge_ratio(edges) {
        r if r > thresholds.cluttered_edge_ratio => BackgroundType::Cluttered,
        r if r > thresholds.busy_edge_ratio => BackgroundType::Busy,
        _ => BackgroundType::Clean,
    }
}

/// 3분할 교차점 네 곳의 엣지 밀도 평균
///
/// `margin` 안쪽에 있는 교차점만 `[p - half, p + half)` 창으로 측정하고,
/// 벗어난 교차점은 0으로 계산하되 분모(4)에는 포함한다.
fn thirds_density(edges: &GrayImage, half: u32, margin: u32) -> f64 {
    let (w, h) = edges.dimensions();
    let points = [
        (w / 3, h / 3),
        (2 * w / 3, h / 3),
        (w / 3, 2 * h / 3),
        (2 * w / 3, 2 * h / 3),
    ];

    let total: f64 = points
        .iter()
        .filter(|&&(x, y)| x > margin && y > margin && x < w.saturating_sub(margin) && y < h.saturating_sub(margin))
        .filter_map(|&(x, y)| region_mean(edges, x - half, y - half, x + half, y + half))
        .map(|mean| mean / 255.0)
        .sum();

    total / points.len() as f64
}

/// 구도 점수 (50px 창)
pub fn composition_score(edges: &EdgeMaps) -> f64 {
    thirds_density(&edges.strong, COMPOSITION_WINDOW / 2, COMPOSITION_WINDOW)
}

/// 3분할 점수 (반경 30 창)
pub fn rule_of_thirds_score(edges: &EdgeMaps) -> f64 {
    thirds_density(&edges.strong, THIRDS_RADIUS, THIRDS_RADIUS)
}

/// 수평에 가까운 Hough 직선들의 평균 기울기 (없으면 0)
pub fn horizon_tilt(edges: &EdgeMaps) -> f64 {
    let lines = detect_lines(
        &edges.soft,
        LineDetectionOptions {
            vote_threshold: HOUGH_VOTE_THRESHOLD,
            suppression_radius: HOUGH_SUPPRESSION_RADIUS,
        },
    );

    // 법선 각도 90° = 수평선
    let tilts: Vec<f64> = lines
        .iter()
        .map(|line| line.angle_in_degrees as f64 - 90.0)
        .filter(|tilt| tilt.abs() < NEAR_HORIZONTAL_DEG)
        .collect();

    if tilts.is_empty() {
        0.0
    } else {
        tilts.iter().sum::<f64>() / tilts.len() as f64
    }
}

/// 엣지 맵 모멘트 중심 (정규화, 엣지 없으면 중앙)
pub fn subject_position(edges: &EdgeMaps) -> (f64, f64) {
    let (w, h) = edges.soft.dimensions();
    let (mut m00, mut m10, mut m01) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y, p) in edges.soft.enumerate_pixels() {
        let v = p[0] as f64;
        if v > 0.0 {
            m00 += v;
            m10 += x as f64 * v;
            m01 += y as f64 * v;
        }
    }
    if m00 == 0.0 || w == 0 || h == 0 {
        return (0.5, 0.5);
    }
    (m10 / m00 / w as f64, m01 / m00 / h as f64)
}

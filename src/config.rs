use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LaneDetectionResult, LaneError};

/// 차선 검출기 한 인스턴스에 고정되는 전체 설정입니다.
///
/// 모든 값은 경험적으로 정한 튜닝 값이며, YAML 파일에서 일부만 지정해도
/// 나머지는 기본값으로 채워집니다.
///
/// ```yaml
/// smoothing:
///   window_capacity: 30
/// overlay:
///   thickness: 12
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    pub classifier: ClassifierConfig,
    pub projection: ProjectionConfig,
    pub smoothing: SmoothingConfig,
    pub overlay: OverlayStyle,
    pub preprocess: PreprocessConfig,
}

/// 좌/우 선분 분류에 사용하는 기울기 범위 (양 끝 제외, 개구간)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub left_slope_min: f64,
    pub left_slope_max: f64,
    pub right_slope_min: f64,
    pub right_slope_max: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            left_slope_min: -100.0,
            left_slope_max: 0.0,
            right_slope_min: 0.0,
            right_slope_max: 100.0,
        }
    }
}

/// 기울기가 거의 0인 직선을 투영할 때의 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearFlatPolicy {
    /// 해당 프레임에서 직선을 버림
    #[default]
    Drop,
    /// 부호를 유지한 채 기울기 크기를 `min_abs_slope`로 올림
    Clamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// 위쪽 끝점의 행 위치 = 프레임 높이 * y_far_ratio
    pub y_far_ratio: f64,
    pub min_abs_slope: f64,
    pub near_flat: NearFlatPolicy,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            y_far_ratio: 0.6,
            min_abs_slope: 1e-3,
            near_flat: NearFlatPolicy::Drop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// 좌/우 각각 보관할 최근 프레임 수(N)
    pub window_capacity: usize,
    /// 새 관측 없이 이 프레임 수를 넘기면 출력을 멈춥니다. `None`이면 계속 이전 평균을 출력.
    pub max_stale_frames: Option<usize>,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_capacity: 50,
            max_stale_frames: None,
        }
    }
}

/// 차선 오버레이 스타일.
///
/// # 필드
/// * `color` - BGR 순서 (OpenCV 기본 채널 순서)
/// * `thickness` - 선 두께(px)
/// * `alpha`, `beta` - 합성 가중치. `결과 = alpha * 원본 + beta * 오버레이`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub color: [f64; 3],
    pub thickness: i32,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 255.0],
            thickness: 20,
            alpha: 1.0,
            beta: 0.95,
        }
    }
}

/// 선분 추출(색 마스크 → 블러 → 캐니 → ROI → Hough) 단계의 파라미터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// HLS 공간에서 흰색 차선 범위 (하한, 상한)
    pub white_hls: [[f64; 3]; 2],
    /// HLS 공간에서 노란색 차선 범위 (하한, 상한)
    pub yellow_hls: [[f64; 3]; 2],
    /// 가우시안 블러 커널 크기 (홀수)
    pub blur_kernel: i32,
    pub canny_low: f64,
    pub canny_high: f64,
    /// 관심영역 다각형 꼭짓점 (프레임 가로/세로 대비 비율)
    pub roi: Vec<[f64; 2]>,
    pub hough_rho: f64,
    pub hough_theta_deg: f64,
    pub hough_threshold: i32,
    pub hough_min_line_length: f64,
    pub hough_max_line_gap: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            white_hls: [[0.0, 180.0, 0.0], [255.0, 255.0, 255.0]],
            yellow_hls: [[10.0, 0.0, 100.0], [40.0, 255.0, 255.0]],
            blur_kernel: 15,
            canny_low: 50.0,
            canny_high: 150.0,
            // 좌하, 좌상, 우상, 우하
            roi: vec![[0.1, 0.9], [0.35, 0.7], [0.65, 0.7], [0.9, 0.9]],
            hough_rho: 1.0,
            hough_theta_deg: 1.0,
            hough_threshold: 20,
            hough_min_line_length: 20.0,
            hough_max_line_gap: 300.0,
        }
    }
}

impl LaneConfig {
    /// YAML 설정 파일을 읽어 검증까지 마친 설정을 반환합니다.
    pub fn load(path: impl AsRef<Path>) -> LaneDetectionResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> LaneDetectionResult<Self> {
        let config: LaneConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// 설정 값의 범위를 확인합니다.
    ///
    /// 좌측 범위는 음수 쪽, 우측 범위는 양수 쪽에 있어야 하며
    /// 기울기 0은 어느 쪽에도 포함되지 않아야 합니다.
    pub fn validate(&self) -> LaneDetectionResult<()> {
        let c = &self.classifier;
        if !(c.left_slope_min < c.left_slope_max && c.left_slope_max <= 0.0) {
            return Err(invalid(format!(
                "left slope bounds must satisfy min < max <= 0 (got ({}, {}))",
                c.left_slope_min, c.left_slope_max
            )));
        }
        if !(0.0 <= c.right_slope_min && c.right_slope_min < c.right_slope_max) {
            return Err(invalid(format!(
                "right slope bounds must satisfy 0 <= min < max (got ({}, {}))",
                c.right_slope_min, c.right_slope_max
            )));
        }

        let p = &self.projection;
        if !(p.y_far_ratio > 0.0 && p.y_far_ratio <= 1.0) {
            return Err(invalid(format!(
                "y_far_ratio must be in (0, 1] (got {})",
                p.y_far_ratio
            )));
        }
        if !(p.min_abs_slope >= 0.0 && p.min_abs_slope.is_finite()) {
            return Err(invalid(format!(
                "min_abs_slope must be a finite non-negative number (got {})",
                p.min_abs_slope
            )));
        }
        if p.near_flat == NearFlatPolicy::Clamp && p.min_abs_slope == 0.0 {
            return Err(invalid("near_flat = clamp requires min_abs_slope > 0"));
        }

        if self.smoothing.window_capacity == 0 {
            return Err(invalid("window_capacity must be at least 1"));
        }

        let o = &self.overlay;
        if o.thickness <= 0 {
            return Err(invalid(format!("thickness must be positive (got {})", o.thickness)));
        }
        if !(o.alpha.is_finite() && o.beta.is_finite()) {
            return Err(invalid("blend weights must be finite"));
        }

        let pre = &self.preprocess;
        if pre.blur_kernel <= 0 || pre.blur_kernel % 2 == 0 {
            return Err(invalid(format!(
                "blur_kernel must be a positive odd number (got {})",
                pre.blur_kernel
            )));
        }
        if pre.roi.len() < 3 {
            return Err(invalid("roi polygon needs at least 3 vertices"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> LaneError {
    LaneError::InvalidConfig(msg.into())
}

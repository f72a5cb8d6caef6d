use tracing::debug;

use crate::config::{NearFlatPolicy, ProjectionConfig};
use crate::geometry::{FittedLine, LinePoints, PixelPoint};

/// 직선 (slope, intercept)를 고정된 두 행(y_near, y_far)에서의 픽셀 끝점으로 바꿉니다.
#[derive(Debug, Clone)]
pub struct LineProjector {
    config: ProjectionConfig,
}

impl LineProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// 프레임 높이에 대한 (y_near, y_far)
    ///
    /// y_near는 화면 맨 아래, y_far는 높이의 `y_far_ratio` 지점입니다.
    pub fn target_rows(&self, frame_height: i32) -> (f64, f64) {
        let y_near = frame_height as f64;
        (y_near, y_near * self.config.y_far_ratio)
    }

    /// 프레임 높이를 기준으로 직선을 투영합니다.
    pub fn project(&self, line: Option<FittedLine>, frame_height: i32) -> Option<LinePoints> {
        let (y_near, y_far) = self.target_rows(frame_height);
        self.project_rows(line, y_near, y_far)
    }

    /// 직선을 두 행에서의 끝점으로 투영합니다.
    ///
    /// # 인자
    /// * `line` - 대표 직선 (없으면 결과도 `None`)
    /// * `y_near`, `y_far` - 끝점을 구할 행
    ///
    /// # 반환
    /// * x = (y - intercept) / slope 를 반올림한 정수 좌표 쌍.
    ///   소수점을 버리지 않고 가장 가까운 정수로 반올림하므로(0.5는 0에서 먼 쪽),
    ///   정수 변환 시 버림을 쓰는 구현과 1px 차이가 날 수 있습니다 (예: 66.67 → 67).
    ///   기울기가 `min_abs_slope`보다 작고 정책이 `Drop`이거나, 계산된 좌표가
    ///   i32 범위를 벗어나면 `None`
    pub fn project_rows(
        &self,
        line: Option<FittedLine>,
        y_near: f64,
        y_far: f64,
    ) -> Option<LinePoints> {
        let line = self.guard_slope(line?)?;

        let near = to_pixel(line.x_at(y_near), y_near)?;
        let far = to_pixel(line.x_at(y_far), y_far)?;
        Some(LinePoints::new(near, far))
    }

    fn guard_slope(&self, line: FittedLine) -> Option<FittedLine> {
        let eps = self.config.min_abs_slope;
        if line.slope.abs() >= eps && line.slope != 0.0 {
            return Some(line);
        }

        match self.config.near_flat {
            NearFlatPolicy::Drop => {
                debug!(slope = line.slope, "dropping near-flat line");
                None
            }
            NearFlatPolicy::Clamp => {
                // 기울기 0은 방향을 알 수 없으므로 clamp 대상이 아님
                if line.slope == 0.0 {
                    return None;
                }
                Some(FittedLine {
                    slope: eps.copysign(line.slope),
                    intercept: line.intercept,
                })
            }
        }
    }
}

impl Default for LineProjector {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}

fn to_pixel(x: f64, y: f64) -> Option<PixelPoint> {
    Some(PixelPoint::new(round_to_i32(x)?, round_to_i32(y)?))
}

/// 반올림 후 i32 범위에 들어오는 경우에만 변환합니다.
pub(crate) fn round_to_i32(v: f64) -> Option<i32> {
    let r = v.round();
    if r.is_finite() && r >= i32::MIN as f64 && r <= i32::MAX as f64 {
        Some(r as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(slope: f64, intercept: f64) -> Option<FittedLine> {
        Some(FittedLine { slope, intercept })
    }

    #[test]
    fn projects_onto_frame_rows() {
        let projector = LineProjector::default();
        let points = projector.project(line(-1.0, 600.0), 540).unwrap();
        assert_eq!(points.near, PixelPoint::new(60, 540));
        assert_eq!(points.far, PixelPoint::new(276, 324));
    }

    #[test]
    fn no_line_gives_no_endpoints() {
        let projector = LineProjector::default();
        assert_eq!(projector.project(None, 540), None);
    }

    #[test]
    fn rounds_to_nearest_pixel() {
        let projector = LineProjector::default();
        // x = (100 - 0) / 3 = 33.33.., x = (60 - 0) / 3 = 20
        let points = projector.project_rows(line(3.0, 0.0), 100.0, 60.0).unwrap();
        assert_eq!(points.near, PixelPoint::new(33, 100));
        assert_eq!(points.far, PixelPoint::new(20, 60));

        // x = 200 / 3 = 66.67 -> 67
        let points = projector.project_rows(line(3.0, 0.0), 200.0, 60.0).unwrap();
        assert_eq!(points.near.x, 67);
    }

    #[test]
    fn near_flat_line_is_dropped_by_default() {
        let projector = LineProjector::default();
        assert_eq!(projector.project(line(-1e-6, 300.0), 540), None);
        assert_eq!(projector.project(line(0.0, 300.0), 540), None);
    }

    #[test]
    fn near_flat_line_is_clamped_when_configured() {
        let projector = LineProjector::new(ProjectionConfig {
            min_abs_slope: 0.5,
            near_flat: NearFlatPolicy::Clamp,
            ..ProjectionConfig::default()
        });
        // slope -0.1 -> -0.5; x = (540 - 600) / -0.5 = 120, (324 - 600) / -0.5 = 552
        let points = projector.project(line(-0.1, 600.0), 540).unwrap();
        assert_eq!(points.near, PixelPoint::new(120, 540));
        assert_eq!(points.far, PixelPoint::new(552, 324));
    }

    #[test]
    fn overflowing_coordinates_are_dropped() {
        let projector = LineProjector::new(ProjectionConfig {
            min_abs_slope: 0.0,
            ..ProjectionConfig::default()
        });
        assert_eq!(projector.project(line(1e-12, 0.0), 540), None);
    }
}

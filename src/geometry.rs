use opencv::core::{Point, Vec4i};

use crate::error::{LaneDetectionResult, LaneError};

/// 상위 단계(Hough 변환 등)에서 검출된 짧은 직선 선분입니다.
///
/// 좌표는 픽셀 단위이며, y축은 아래로 갈수록 증가합니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// `[x1, y1, x2, y2]` 형태의 좌표 슬라이스로부터 선분을 만듭니다.
    ///
    /// # 에러
    /// * 좌표 개수가 정확히 4개가 아니면 `LaneError::InvalidSegment`
    pub fn from_slice(coords: &[f64]) -> LaneDetectionResult<Self> {
        Self::from_row(0, coords)
    }

    /// 좌표 행 목록을 한 번에 선분으로 변환합니다.
    ///
    /// # 에러
    /// * 좌표 개수가 4개가 아닌 첫 행의 인덱스와 함께 `LaneError::InvalidSegment`
    pub fn from_rows(rows: &[&[f64]]) -> LaneDetectionResult<Vec<Self>> {
        rows.iter()
            .enumerate()
            .map(|(index, coords)| Self::from_row(index, coords))
            .collect()
    }

    fn from_row(index: usize, coords: &[f64]) -> LaneDetectionResult<Self> {
        match coords {
            &[x1, y1, x2, y2] => Ok(Self::new(x1, y1, x2, y2)),
            _ => Err(LaneError::InvalidSegment {
                index,
                reason: format!("expected 4 coordinates, got {}", coords.len()),
            }),
        }
    }

    /// 네 좌표가 모두 유한한 값인지 확인합니다.
    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    /// 수직 선분(x1 == x2)은 기울기가 정의되지 않습니다.
    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }

    /// 기울기 `(y2 - y1) / (x2 - x1)`. 수직 선분이면 `None`.
    pub fn slope(&self) -> Option<f64> {
        if self.is_vertical() {
            return None;
        }
        Some((self.y2 - self.y1) / (self.x2 - self.x1))
    }

    /// 절편 `y1 - slope * x1`. 수직 선분이면 `None`.
    pub fn intercept(&self) -> Option<f64> {
        self.slope().map(|slope| self.y1 - slope * self.x1)
    }

    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }
}

impl From<Vec4i> for Segment {
    fn from(v: Vec4i) -> Self {
        Self::new(v[0] as f64, v[1] as f64, v[2] as f64, v[3] as f64)
    }
}

/// 좌/우 분류를 마친 선분. 가중치는 선분 길이입니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub slope: f64,
    pub intercept: f64,
    pub weight: f64,
}

/// 한 프레임에서 한쪽 차선을 대표하는 직선 `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedLine {
    pub slope: f64,
    pub intercept: f64,
}

impl FittedLine {
    /// 주어진 y(행)에서의 x좌표. 기울기가 0이면 정의되지 않습니다.
    pub fn x_at(&self, y: f64) -> f64 {
        (y - self.intercept) / self.slope
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<PixelPoint> for Point {
    fn from(p: PixelPoint) -> Self {
        Point::new(p.x, p.y)
    }
}

/// 화면에 그릴 직선의 두 끝점.
///
/// * `near` - 화면 하단(y_near) 쪽 점
/// * `far` - 화면 위쪽(y_far) 점
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinePoints {
    pub near: PixelPoint,
    pub far: PixelPoint,
}

impl LinePoints {
    pub fn new(near: PixelPoint, far: PixelPoint) -> Self {
        Self { near, far }
    }
}

/// 한 프레임의 좌/우 차선 결과. 검출되지 않은 쪽은 `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaneLines {
    pub left: Option<LinePoints>,
    pub right: Option<LinePoints>,
}

impl LaneLines {
    pub fn new(left: Option<LinePoints>, right: Option<LinePoints>) -> Self {
        Self { left, right }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// 그려야 할 직선들(존재하는 쪽만)
    pub fn iter(&self) -> impl Iterator<Item = &LinePoints> {
        self.left.iter().chain(self.right.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slope_intercept_and_length() {
        let seg = Segment::new(100.0, 500.0, 200.0, 400.0);
        assert_relative_eq!(seg.slope().unwrap(), -1.0);
        assert_relative_eq!(seg.intercept().unwrap(), 600.0);
        assert_relative_eq!(seg.length(), 141.421356, epsilon = 1e-5);
    }

    #[test]
    fn vertical_segment_has_no_slope() {
        let seg = Segment::new(10.0, 0.0, 10.0, 50.0);
        assert!(seg.is_vertical());
        assert!(seg.slope().is_none());
        assert!(seg.intercept().is_none());
    }

    #[test]
    fn from_slice_requires_four_coordinates() {
        assert!(Segment::from_slice(&[1.0, 2.0, 3.0, 4.0]).is_ok());
        assert!(matches!(
            Segment::from_slice(&[1.0, 2.0, 3.0]),
            Err(LaneError::InvalidSegment { .. })
        ));
        assert!(Segment::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_err());
    }

    #[test]
    fn from_rows_reports_failing_row() {
        let rows: [&[f64]; 3] = [&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0], &[9.0, 10.0]];
        match Segment::from_rows(&rows) {
            Err(LaneError::InvalidSegment { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected InvalidSegment, got {:?}", other),
        }

        let segments = Segment::from_rows(&rows[..2]).unwrap();
        assert_eq!(segments[1], Segment::new(5.0, 6.0, 7.0, 8.0));
    }

    #[test]
    fn converts_from_hough_output() {
        let seg = Segment::from(Vec4i::new(1, 2, 3, 4));
        assert_eq!(seg, Segment::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn lane_lines_iterates_present_sides_only() {
        let line = LinePoints::new(PixelPoint::new(0, 10), PixelPoint::new(5, 6));
        let lines = LaneLines::new(None, Some(line));
        assert!(!lines.is_empty());
        assert_eq!(lines.iter().count(), 1);
        assert!(LaneLines::default().is_empty());
    }
}

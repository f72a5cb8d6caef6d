use tracing::trace;

use crate::config::ClassifierConfig;
use crate::error::{LaneDetectionResult, LaneError};
use crate::geometry::{Candidate, Segment};

/// 선분들을 기울기 부호에 따라 왼쪽/오른쪽 차선 후보로 나눕니다.
///
/// 영상 좌표계는 y가 아래로 증가하므로 왼쪽 차선은 음의 기울기,
/// 오른쪽 차선은 양의 기울기를 가집니다.
#[derive(Debug, Clone)]
pub struct SegmentClassifier {
    config: ClassifierConfig,
}

impl SegmentClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// 한 프레임의 선분 목록을 분류합니다.
    ///
    /// # 동작
    /// - 수직 선분(x1 == x2)은 조용히 제외
    /// - `left_slope_min < slope < left_slope_max` → 왼쪽 후보
    /// - `right_slope_min < slope < right_slope_max` → 오른쪽 후보
    /// - 그 외(수평에 가깝거나 지나치게 가파른 선분)는 버림
    ///
    /// # 반환
    /// * `(왼쪽 후보, 오른쪽 후보)` - 비어 있을 수 있음
    ///
    /// # 에러
    /// * 좌표에 NaN/inf가 있으면 해당 인덱스와 함께 `LaneError::InvalidSegment`
    pub fn classify(
        &self,
        segments: &[Segment],
    ) -> LaneDetectionResult<(Vec<Candidate>, Vec<Candidate>)> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut discarded = 0usize;

        for (index, seg) in segments.iter().enumerate() {
            if !seg.is_finite() {
                return Err(LaneError::InvalidSegment {
                    index,
                    reason: format!("non-finite coordinates {:?}", seg),
                });
            }

            let slope = match seg.slope() {
                Some(slope) => slope,
                None => continue,
            };
            let candidate = Candidate {
                slope,
                intercept: seg.y1 - slope * seg.x1,
                weight: seg.length(),
            };

            let c = &self.config;
            if c.left_slope_min < slope && slope < c.left_slope_max {
                left.push(candidate);
            } else if c.right_slope_min < slope && slope < c.right_slope_max {
                right.push(candidate);
            } else {
                discarded += 1;
            }
        }

        trace!(
            total = segments.len(),
            left = left.len(),
            right = right.len(),
            discarded,
            "classified segments"
        );
        Ok((left, right))
    }
}

impl Default for SegmentClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vertical_segments_are_excluded() {
        let classifier = SegmentClassifier::default();
        let segments = [
            Segment::new(50.0, 0.0, 50.0, 100.0),
            Segment::new(300.0, 540.0, 300.0, 200.0),
        ];
        let (left, right) = classifier.classify(&segments).unwrap();
        assert!(left.is_empty());
        assert!(right.is_empty());
    }

    #[test]
    fn routes_by_slope_sign() {
        let classifier = SegmentClassifier::default();
        let segments = [
            Segment::new(100.0, 500.0, 200.0, 400.0), // -1
            Segment::new(600.0, 400.0, 700.0, 500.0), // +1
        ];
        let (left, right) = classifier.classify(&segments).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 1);
        assert_relative_eq!(left[0].slope, -1.0);
        assert_relative_eq!(left[0].intercept, 600.0);
        assert_relative_eq!(left[0].weight, 100.0 * 2f64.sqrt());
        assert_relative_eq!(right[0].slope, 1.0);
        assert_relative_eq!(right[0].intercept, -200.0);
    }

    #[test]
    fn horizontal_and_too_steep_segments_are_discarded() {
        let classifier = SegmentClassifier::default();
        let segments = [
            Segment::new(0.0, 300.0, 100.0, 300.0),  // slope 0
            Segment::new(10.0, 0.0, 11.0, 200.0),    // slope 200
            Segment::new(10.0, 200.0, 11.0, 0.0),    // slope -200
            Segment::new(10.0, 100.0, 11.0, 200.0),  // slope exactly 100
            Segment::new(10.0, 200.0, 11.0, 100.0),  // slope exactly -100
        ];
        let (left, right) = classifier.classify(&segments).unwrap();
        assert!(left.is_empty());
        assert!(right.is_empty());
    }

    #[test]
    fn custom_bounds_are_respected() {
        let classifier = SegmentClassifier::new(ClassifierConfig {
            left_slope_min: -2.0,
            left_slope_max: -0.5,
            right_slope_min: 0.5,
            right_slope_max: 2.0,
        });
        let segments = [
            Segment::new(0.0, 100.0, 100.0, 90.0), // -0.1, too flat
            Segment::new(0.0, 100.0, 100.0, 0.0),  // -1
            Segment::new(0.0, 0.0, 10.0, 50.0),    // 5, too steep
        ];
        let (left, right) = classifier.classify(&segments).unwrap();
        assert_eq!(left.len(), 1);
        assert!(right.is_empty());
    }

    #[test]
    fn non_finite_segment_fails_fast() {
        let classifier = SegmentClassifier::default();
        let segments = [
            Segment::new(100.0, 500.0, 200.0, 400.0),
            Segment::new(f64::NAN, 1.0, 2.0, 3.0),
        ];
        match classifier.classify(&segments) {
            Err(LaneError::InvalidSegment { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidSegment, got {:?}", other),
        }

        let infinite = [Segment::new(0.0, 0.0, f64::INFINITY, 3.0)];
        assert!(classifier.classify(&infinite).is_err());
    }
}

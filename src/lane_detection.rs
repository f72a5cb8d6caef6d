use opencv::{core::Mat, prelude::*};
use tracing::debug;

use crate::classifier::SegmentClassifier;
use crate::config::LaneConfig;
use crate::error::LaneDetectionResult;
use crate::fitter::fit_weighted;
use crate::geometry::{LaneLines, Segment};
use crate::preprocessing::SegmentExtractor;
use crate::projector::LineProjector;
use crate::renderer::LaneRenderer;
use crate::smoother::TemporalSmoother;

/// 영상 스트림 하나에 대응하는 차선 검출기입니다.
///
/// # 주요 멤버
///
/// - `classifier`: 선분을 좌/우 후보로 분류
/// - `projector`: 대표 직선을 고정된 두 행의 끝점으로 변환
/// - `smoother`: 좌/우 최근 N 프레임 이력 (프레임 사이에 유지되는 유일한 상태)
/// - `renderer`: 결과 직선을 원본 프레임에 합성
/// - `extractor`: 원본 프레임에서 선분을 뽑는 전처리
///
/// 스트림마다 별도의 인스턴스를 만들어야 하며, 프레임은 반드시 순서대로 넣어야 합니다.
/// 서로 다른 스트림의 검출기는 상태를 공유하지 않으므로 각각 다른 스레드에서 돌려도 됩니다.
#[derive(Debug, Clone)]
pub struct LaneDetector {
    classifier: SegmentClassifier,
    projector: LineProjector,
    smoother: TemporalSmoother,
    renderer: LaneRenderer,
    extractor: SegmentExtractor,
    frame_index: u64,
}

impl LaneDetector {
    /// 설정을 검증한 뒤 새 검출기를 만듭니다.
    pub fn new(config: LaneConfig) -> LaneDetectionResult<Self> {
        config.validate()?;
        Ok(Self {
            classifier: SegmentClassifier::new(config.classifier),
            projector: LineProjector::new(config.projection),
            smoother: TemporalSmoother::new(&config.smoothing),
            renderer: LaneRenderer::new(config.overlay),
            extractor: SegmentExtractor::new(config.preprocess),
            frame_index: 0,
        })
    }

    /// 평활화 없이 이번 프레임의 선분만으로 좌/우 차선을 계산합니다.
    ///
    /// 상태를 바꾸지 않으므로 단일 이미지 처리에 사용할 수 있습니다.
    ///
    /// # 인자
    /// * `segments` - 이번 프레임의 선분
    /// * `frame_height` - 프레임 세로 크기 (y_near / y_far 기준)
    pub fn raw_lines(&self, segments: &[Segment], frame_height: i32) -> LaneDetectionResult<LaneLines> {
        // -------------------------------------------
        // 1) 좌/우 분류 (잘못된 좌표는 여기서 에러)
        // -------------------------------------------
        let (left_candidates, right_candidates) = self.classifier.classify(segments)?;

        // -------------------------------------------
        // 2) 길이 가중 평균 직선
        // -------------------------------------------
        let left_line = fit_weighted(&left_candidates);
        let right_line = fit_weighted(&right_candidates);

        // -------------------------------------------
        // 3) 고정 행으로 투영
        // -------------------------------------------
        Ok(LaneLines::new(
            self.projector.project(left_line, frame_height),
            self.projector.project(right_line, frame_height),
        ))
    }

    /// 한 프레임을 처리하고 평활화된 좌/우 차선을 반환합니다.
    ///
    /// 입력 검증에 실패하면 평활화 이력은 변경되지 않습니다.
    pub fn detect(&mut self, segments: &[Segment], frame_height: i32) -> LaneDetectionResult<LaneLines> {
        let raw = self.raw_lines(segments, frame_height)?;
        let smoothed = self.smoother.update(raw);

        debug!(
            frame = self.frame_index,
            segments = segments.len(),
            left_detected = raw.left.is_some(),
            right_detected = raw.right.is_some(),
            "processed frame"
        );
        self.frame_index += 1;
        Ok(smoothed)
    }

    /// 외부에서 구한 선분으로 한 프레임을 처리하고 차선을 합성한 영상을 반환합니다.
    pub fn process_segments(&mut self, frame: &Mat, segments: &[Segment]) -> LaneDetectionResult<Mat> {
        let lines = self.detect(segments, frame.rows())?;
        self.renderer.render(frame, &lines)
    }

    /// 원본 프레임에서 선분 추출부터 합성까지 전체 과정을 수행합니다.
    pub fn process_frame(&mut self, frame: &Mat) -> LaneDetectionResult<Mat> {
        let segments = self.extractor.extract(frame)?;
        self.process_segments(frame, &segments)
    }

    pub fn renderer(&self) -> &LaneRenderer {
        &self.renderer
    }

    pub fn smoother(&self) -> &TemporalSmoother {
        &self.smoother
    }

    /// 지금까지 처리한 프레임 수
    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }
}

impl Default for LaneDetector {
    fn default() -> Self {
        Self {
            classifier: SegmentClassifier::default(),
            projector: LineProjector::default(),
            smoother: TemporalSmoother::default(),
            renderer: LaneRenderer::default(),
            extractor: SegmentExtractor::default(),
            frame_index: 0,
        }
    }
}

use std::f64::consts::PI;

use opencv::{
    core::{self, Mat, Point, Scalar, Size, Vec4i, Vector},
    imgproc,
    prelude::*,
};
use opencv::core::AlgorithmHint::ALGO_HINT_DEFAULT;
use tracing::trace;

use crate::config::PreprocessConfig;
use crate::error::LaneDetectionResult;
use crate::geometry::Segment;

/// 원본 BGR 프레임에서 차선 후보 선분을 뽑아내는 전처리 단계입니다.
///
/// 흰색/노란색 마스크 → 그레이 변환 → 가우시안 블러 → 캐니 엣지 → ROI → 확률적 Hough
///
/// 결과 선분은 `LaneDetector`의 입력으로 쓰입니다.
#[derive(Debug, Clone, Default)]
pub struct SegmentExtractor {
    config: PreprocessConfig,
}

impl SegmentExtractor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// 한 프레임에서 선분을 추출합니다.
    ///
    /// # 인자
    /// * `frame` - BGR 색상 영상
    ///
    /// # 반환
    /// * Hough 변환으로 찾은 선분 목록 (없으면 빈 벡터)
    pub fn extract(&self, frame: &Mat) -> LaneDetectionResult<Vec<Segment>> {
        // 1) 흰색/노란색 영역만 남김
        let white_yellow = self.select_white_yellow(frame)?;

        // 2) 그레이 변환
        let gray = self.gray_scale(&white_yellow)?;

        // 3) 가우시안 블러
        let blur = self.noise_removal(&gray)?;

        // 4) 캐니 엣지
        let edges = self.edge_detection(&blur)?;

        // 5) ROI
        let roi_img = self.roi(&edges)?;

        // 6) Hough
        let segments = self.hough_lines(&roi_img)?;
        trace!(count = segments.len(), "extracted segments");
        Ok(segments)
    }

    /// HLS 색공간에서 흰색과 노란색 범위에 드는 픽셀만 남깁니다.
    ///
    /// 밝기(L) 채널로 흰색을, 색상(H) 채널로 노란색을 구분하므로 그림자나
    /// 조명 변화에 RGB 임계값보다 덜 민감합니다.
    pub fn select_white_yellow(&self, img: &Mat) -> LaneDetectionResult<Mat> {
        let mut hls = Mat::default();
        imgproc::cvt_color(img, &mut hls, imgproc::COLOR_BGR2HLS, 0, ALGO_HINT_DEFAULT)?;

        let [white_lo, white_hi] = self.config.white_hls;
        let mut white_mask = Mat::default();
        core::in_range(&hls, &to_scalar(white_lo), &to_scalar(white_hi), &mut white_mask)?;

        let [yellow_lo, yellow_hi] = self.config.yellow_hls;
        let mut yellow_mask = Mat::default();
        core::in_range(&hls, &to_scalar(yellow_lo), &to_scalar(yellow_hi), &mut yellow_mask)?;

        let mut mask = Mat::default();
        core::bitwise_or(&white_mask, &yellow_mask, &mut mask, &core::no_array())?;

        let mut masked = Mat::default();
        core::bitwise_and(img, img, &mut masked, &mask)?;
        Ok(masked)
    }

    /// 입력 영상을 그레이스케일로 변환합니다.
    pub fn gray_scale(&self, img: &Mat) -> LaneDetectionResult<Mat> {
        let mut gray = Mat::default();
        imgproc::cvt_color(img, &mut gray, imgproc::COLOR_BGR2GRAY, 0, ALGO_HINT_DEFAULT)?;
        Ok(gray)
    }

    /// 가우시안 블러를 적용하여 영상 노이즈를 줄입니다.
    pub fn noise_removal(&self, img: &Mat) -> LaneDetectionResult<Mat> {
        let k = self.config.blur_kernel;
        let mut dst = Mat::default();
        imgproc::gaussian_blur(
            img,
            &mut dst,
            Size::new(k, k),
            0.0,
            0.0,
            core::BORDER_DEFAULT,
            ALGO_HINT_DEFAULT,
        )?;
        Ok(dst)
    }

    /// 캐니(Canny) 엣지 검출. 결과는 0/255 이진 영상입니다.
    pub fn edge_detection(&self, img: &Mat) -> LaneDetectionResult<Mat> {
        let mut edges = Mat::default();
        imgproc::canny(
            img,
            &mut edges,
            self.config.canny_low,
            self.config.canny_high,
            3,
            false,
        )?;
        Ok(edges)
    }

    /// 관심영역(ROI)만 남기고 외부 영역을 제거합니다.
    ///
    /// 꼭짓점은 프레임 크기에 대한 비율로 지정되어 있어 해상도와 무관하게 동작합니다.
    pub fn roi(&self, img: &Mat) -> LaneDetectionResult<Mat> {
        let (rows, cols) = (img.rows() as f64, img.cols() as f64);

        // 영상과 동일한 크기의 검정색 마스크 생성
        let mut mask = Mat::zeros(img.rows(), img.cols(), img.typ())?.to_mat()?;
        {
            let polygon: Vector<Point> = self
                .config
                .roi
                .iter()
                .map(|&[fx, fy]| Point::new((cols * fx) as i32, (rows * fy) as i32))
                .collect();
            let mut contours: Vector<Vector<Point>> = Vector::new();
            contours.push(polygon);

            // 마스크에 흰색으로 폴리곤(ROI) 영역을 채움
            imgproc::fill_poly(
                &mut mask,
                &contours,
                Scalar::all(255.0),
                imgproc::LINE_8,
                0,
                Point::new(0, 0),
            )?;
        }

        let mut masked_img = Mat::default();
        core::bitwise_and(img, &mask, &mut masked_img, &core::no_array())?;
        Ok(masked_img)
    }

    /// 이진 엣지 영상에서 확률적 Hough 변환으로 선분을 찾습니다.
    pub fn hough_lines(&self, img: &Mat) -> LaneDetectionResult<Vec<Segment>> {
        let mut lines: Vector<Vec4i> = Vector::new();
        imgproc::hough_lines_p(
            img,
            &mut lines,
            self.config.hough_rho,
            self.config.hough_theta_deg * PI / 180.0,
            self.config.hough_threshold,
            self.config.hough_min_line_length,
            self.config.hough_max_line_gap,
        )?;
        Ok(lines.iter().map(Segment::from).collect())
    }
}

fn to_scalar(v: [f64; 3]) -> Scalar {
    Scalar::new(v[0], v[1], v[2], 0.0)
}

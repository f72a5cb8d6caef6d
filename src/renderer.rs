use opencv::{
    core::{self, Mat, Scalar},
    imgproc,
    prelude::*,
};

use crate::config::OverlayStyle;
use crate::error::LaneDetectionResult;
use crate::geometry::LaneLines;

/// 평활화된 차선을 원본 프레임 위에 합성합니다.
#[derive(Debug, Clone, Default)]
pub struct LaneRenderer {
    style: OverlayStyle,
}

impl LaneRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// 차선을 그린 새 영상을 반환합니다. 입력 프레임은 수정하지 않습니다.
    ///
    /// # 동작
    /// 1. 원본과 같은 크기/타입의 검정색 오버레이 생성
    /// 2. 존재하는 직선(좌/우)만 오버레이에 그림
    /// 3. `결과 = alpha * 원본 + beta * 오버레이`
    ///
    /// # 인자
    /// * `frame` - 원본 영상 (읽기 전용)
    /// * `lines` - 평활화된 좌/우 차선
    pub fn render(&self, frame: &Mat, lines: &LaneLines) -> LaneDetectionResult<Mat> {
        let mut overlay = Mat::zeros(frame.rows(), frame.cols(), frame.typ())?.to_mat()?;

        let [b, g, r] = self.style.color;
        let color = Scalar::new(b, g, r, 0.0);
        for line in lines.iter() {
            imgproc::line(
                &mut overlay,
                line.near.into(),
                line.far.into(),
                color,
                self.style.thickness,
                imgproc::LINE_8,
                0,
            )?;
        }

        let mut blended = Mat::default();
        core::add_weighted(
            frame,
            self.style.alpha,
            &overlay,
            self.style.beta,
            0.0,
            &mut blended,
            -1,
        )?;
        Ok(blended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{LinePoints, PixelPoint};
    use opencv::core::{Vec3b, CV_8UC3};

    fn gray_frame() -> Mat {
        Mat::new_rows_cols_with_default(120, 160, CV_8UC3, Scalar::all(40.0)).unwrap()
    }

    fn both_lines() -> LaneLines {
        LaneLines::new(
            Some(LinePoints::new(PixelPoint::new(20, 120), PixelPoint::new(60, 72))),
            Some(LinePoints::new(PixelPoint::new(140, 120), PixelPoint::new(100, 72))),
        )
    }

    fn bytes(m: &Mat) -> Vec<u8> {
        m.data_bytes().unwrap().to_vec()
    }

    #[test]
    fn zero_beta_leaves_frame_unchanged() {
        let frame = gray_frame();
        let renderer = LaneRenderer::new(OverlayStyle {
            alpha: 1.0,
            beta: 0.0,
            ..OverlayStyle::default()
        });
        let out = renderer.render(&frame, &both_lines()).unwrap();
        assert_eq!(bytes(&out), bytes(&frame));
    }

    #[test]
    fn no_lines_leaves_frame_unchanged() {
        let frame = gray_frame();
        let out = LaneRenderer::default()
            .render(&frame, &LaneLines::default())
            .unwrap();
        assert_eq!(out.size().unwrap(), frame.size().unwrap());
        assert_eq!(bytes(&out), bytes(&frame));
    }

    #[test]
    fn draws_lines_without_touching_input() {
        let frame = gray_frame();
        let before = bytes(&frame);
        let out = LaneRenderer::default().render(&frame, &both_lines()).unwrap();

        assert_eq!(bytes(&frame), before);
        assert_eq!(out.typ(), frame.typ());

        // 선 위의 픽셀은 빨간 채널만 증가 (40 + 0.95 * 255 -> 255 포화)
        let on_line = *out.at_2d::<Vec3b>(119, 20).unwrap();
        assert_eq!(on_line[0], 40);
        assert_eq!(on_line[1], 40);
        assert_eq!(on_line[2], 255);

        // 선에서 먼 픽셀은 그대로
        let far_away = *out.at_2d::<Vec3b>(5, 80).unwrap();
        assert_eq!((far_away[0], far_away[1], far_away[2]), (40, 40, 40));
    }
}

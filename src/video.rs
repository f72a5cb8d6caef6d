use std::path::Path;
use std::time::Instant;

use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use tracing::{info, warn};

use crate::config::LaneConfig;
use crate::error::{LaneDetectionResult, LaneError};
use crate::lane_detection::LaneDetector;

/// 영상 하나를 처리한 결과 요약
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoStats {
    pub frames: u64,
    pub elapsed_secs: f64,
}

impl VideoStats {
    pub fn fps(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.frames as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

/// 입력 영상의 모든 프레임에 차선을 합성하여 출력 영상으로 저장합니다.
///
/// 영상 하나에 검출기 하나를 새로 만들어 사용하므로, 여러 영상을 처리할 때
/// 이전 영상의 이력이 섞이지 않습니다.
///
/// # 인자
/// * `input` - 입력 영상 경로
/// * `output` - 출력 영상 경로 (mp4v 코덱)
/// * `config` - 검출기 설정
pub fn process_video(
    input: &Path,
    output: &Path,
    config: &LaneConfig,
) -> LaneDetectionResult<VideoStats> {
    let mut detector = LaneDetector::new(config.clone())?;

    // 캡처 소스 준비
    let mut cap = VideoCapture::from_file(&path_str(input)?, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        return Err(LaneError::VideoOpen(input.display().to_string()));
    }

    let fps = cap.get(videoio::CAP_PROP_FPS)?;
    let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
    let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
    info!(
        "Input {}: {}x{} @ {:.1} FPS",
        input.display(),
        width,
        height,
        fps
    );

    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
    let mut writer = VideoWriter::new(
        &path_str(output)?,
        fourcc,
        if fps > 0.0 { fps } else { 25.0 },
        Size::new(width, height),
        true,
    )?;
    if !writer.is_opened()? {
        return Err(LaneError::VideoOpen(output.display().to_string()));
    }

    let start_time = Instant::now();
    let mut frames = 0u64;
    loop {
        let mut frame = Mat::default();
        let read = cap.read(&mut frame);
        if !has_frame(read, &frame, frames)? {
            // 더 이상 프레임이 없음
            break;
        }

        let processed = detector.process_frame(&frame)?;
        writer.write(&processed)?;
        frames += 1;

        if frames % 100 == 0 {
            info!("{} frames processed", frames);
        }
    }
    writer.release()?;

    let stats = VideoStats {
        frames,
        elapsed_secs: start_time.elapsed().as_secs_f64(),
    };
    info!(
        "Wrote {} ({} frames, {:.1} FPS)",
        output.display(),
        stats.frames,
        stats.fps()
    );
    Ok(stats)
}

/// 프레임 읽기 결과를 해석합니다.
///
/// # 반환
/// * `Ok(true)` - 처리할 프레임이 있음
/// * `Ok(false)` - 영상 끝
///
/// # 에러
/// * 디코딩 실패는 `LaneError::OpenCv`로 그대로 전파
fn has_frame(read: opencv::Result<bool>, frame: &Mat, index: u64) -> LaneDetectionResult<bool> {
    match read {
        Ok(is_read) => Ok(is_read && !frame.empty()),
        Err(e) => {
            warn!("Failed to read frame {}: {}", index, e);
            Err(e.into())
        }
    }
}

fn path_str(path: &Path) -> LaneDetectionResult<String> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| LaneError::VideoOpen(format!("non UTF-8 path: {}", path.display())))
}

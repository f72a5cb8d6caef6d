use thiserror::Error;

/// 차선 검출 파이프라인 전체에서 사용하는 에러 타입입니다.
///
/// 차선이 "검출되지 않은" 상황은 에러가 아니라 `Option::None`으로 표현합니다.
/// 여기에는 입력 자체가 잘못되었거나 외부 자원(OpenCV, 파일)이 실패한 경우만 담습니다.
#[derive(Debug, Error)]
pub enum LaneError {
    /// 선분 좌표 개수가 4개가 아니거나, 유한하지 않은(NaN/inf) 좌표가 포함된 경우
    #[error("invalid segment #{index}: {reason}")]
    InvalidSegment { index: usize, reason: String },

    /// 설정 값이 허용 범위를 벗어난 경우
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),

    /// 입력 영상(또는 출력 영상)을 열 수 없는 경우
    #[error("failed to open video: {0}")]
    VideoOpen(String),
}

/// 파이프라인 함수들에서 공통으로 사용할 `Result` 타입 별칭입니다.
pub type LaneDetectionResult<T> = std::result::Result<T, LaneError>;

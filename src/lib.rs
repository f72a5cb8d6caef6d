//! 영상 프레임마다 검출된 짧은 선분들로부터 현재 주행 차선의 좌/우 경계선을
//! 추정하고, 최근 프레임 이력으로 평활화하여 흔들림 없는 차선을 그려줍니다.
//!
//! 처리 순서: 선분 → 분류(`classifier`) → 가중 평균(`fitter`) → 투영(`projector`)
//! → 시간적 평활화(`smoother`) → 합성(`renderer`)

pub mod classifier;
pub mod config;
pub mod error;
pub mod fitter;
pub mod geometry;
pub mod lane_detection;
pub mod preprocessing;
pub mod projector;
pub mod renderer;
pub mod smoother;
pub mod video;

pub use config::LaneConfig;
pub use error::{LaneDetectionResult, LaneError};
pub use geometry::{LaneLines, LinePoints, PixelPoint, Segment};
pub use lane_detection::LaneDetector;

use std::collections::VecDeque;

use tracing::debug;

use crate::config::SmoothingConfig;
use crate::geometry::{LaneLines, LinePoints, PixelPoint};
use crate::projector::round_to_i32;

/// 최근 N개의 끝점 쌍만 보관하는 고정 용량 FIFO.
///
/// 가득 찬 상태에서 새 값을 넣으면 가장 오래된 값이 빠집니다. 비우는 연산은 없으므로
/// 한 번 값이 들어가면 인스턴스가 살아있는 동안 비어있지 않습니다.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    entries: VecDeque<LinePoints>,
    capacity: usize,
}

impl SlidingWindow {
    /// `capacity`는 1 이상이어야 합니다 (설정 검증에서 보장).
    ///
    /// 버퍼는 미리 할당하지 않고 값이 들어올 때마다 최대 `capacity`개까지 늘어납니다.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: LinePoints) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 오래된 것부터 최신 순서
    pub fn iter(&self) -> impl Iterator<Item = &LinePoints> {
        self.entries.iter()
    }

    /// 보관 중인 끝점 쌍들의 좌표별 산술 평균(반올림). 비어 있으면 `None`.
    pub fn mean(&self) -> Option<LinePoints> {
        if self.entries.is_empty() {
            return None;
        }

        let n = self.entries.len() as f64;
        let mut sum = [0.0f64; 4];
        for line in &self.entries {
            sum[0] += line.near.x as f64;
            sum[1] += line.near.y as f64;
            sum[2] += line.far.x as f64;
            sum[3] += line.far.y as f64;
        }

        // 입력이 모두 i32이므로 평균도 항상 i32 범위 안에 있음
        let avg = |s: f64| round_to_i32(s / n).unwrap_or_default();
        Some(LinePoints::new(
            PixelPoint::new(avg(sum[0]), avg(sum[1])),
            PixelPoint::new(avg(sum[2]), avg(sum[3])),
        ))
    }
}

/// 한쪽(왼쪽 또는 오른쪽) 차선의 시간적 평활화 상태
#[derive(Debug, Clone)]
pub struct SideTracker {
    window: SlidingWindow,
    /// 마지막 관측 이후 연속으로 관측이 없던 프레임 수
    frames_since_seen: usize,
    max_stale_frames: Option<usize>,
}

impl SideTracker {
    pub fn new(config: &SmoothingConfig) -> Self {
        Self {
            window: SlidingWindow::new(config.window_capacity),
            frames_since_seen: 0,
            max_stale_frames: config.max_stale_frames,
        }
    }

    /// 현재 프레임의 관측값을 반영하고 평활화된 직선을 돌려줍니다.
    ///
    /// # 동작
    /// 1. 관측값이 있으면 윈도우에 추가 (가득 차면 가장 오래된 값 제거)
    /// 2. 윈도우가 비어있지 않으면 평균을 출력 (이번 프레임에 관측이 없어도)
    /// 3. 한 번도 관측된 적이 없으면 `None`
    ///
    /// `max_stale_frames`가 설정되어 있고 관측 없이 그 이상 지나면 출력만 멈추며,
    /// 윈도우 내용은 그대로 유지됩니다.
    pub fn observe(&mut self, observed: Option<LinePoints>) -> Option<LinePoints> {
        match observed {
            Some(line) => {
                self.window.push(line);
                self.frames_since_seen = 0;
            }
            None => {
                self.frames_since_seen = self.frames_since_seen.saturating_add(1);
            }
        }

        if let Some(limit) = self.max_stale_frames {
            if !self.window.is_empty() && self.frames_since_seen > limit {
                return None;
            }
        }
        self.window.mean()
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn frames_since_seen(&self) -> usize {
        self.frames_since_seen
    }
}

/// 좌/우 차선 각각의 슬라이딩 윈도우를 관리합니다.
///
/// 프레임 N의 결과는 그 이전 모든 프레임의 순서에 의존하므로, 하나의 영상
/// 스트림에 하나의 인스턴스를 두고 프레임 순서대로만 호출해야 합니다.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    left: SideTracker,
    right: SideTracker,
}

impl TemporalSmoother {
    pub fn new(config: &SmoothingConfig) -> Self {
        Self {
            left: SideTracker::new(config),
            right: SideTracker::new(config),
        }
    }

    /// 한 프레임의 투영 결과를 넣고 평활화된 좌/우 직선을 받습니다.
    pub fn update(&mut self, frame: LaneLines) -> LaneLines {
        let smoothed = LaneLines::new(self.left.observe(frame.left), self.right.observe(frame.right));

        if frame.left.is_some() != smoothed.left.is_some()
            || frame.right.is_some() != smoothed.right.is_some()
        {
            debug!(
                left_history = self.left.window().len(),
                right_history = self.right.window().len(),
                left_stale = self.left.frames_since_seen(),
                right_stale = self.right.frames_since_seen(),
                "smoothed output differs from raw detection"
            );
        }
        smoothed
    }

    pub fn left(&self) -> &SideTracker {
        &self.left
    }

    pub fn right(&self) -> &SideTracker {
        &self.right
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(&SmoothingConfig::default())
    }
}

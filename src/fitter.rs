use crate::geometry::{Candidate, FittedLine};

/// 후보 선분들을 길이 가중 평균하여 하나의 대표 직선으로 만듭니다.
///
/// 긴 선분일수록 신뢰도가 높다고 보고 더 큰 비중을 줍니다. 짧은 잡음 선분은
/// 버리지 않고 영향만 줄어듭니다.
///
/// # 반환
/// * 후보가 없으면(또는 가중치 합이 0이면) `None`
pub fn fit_weighted(candidates: &[Candidate]) -> Option<FittedLine> {
    let total_weight: f64 = candidates.iter().map(|c| c.weight).sum();
    if candidates.is_empty() || total_weight <= 0.0 {
        return None;
    }

    let slope = candidates.iter().map(|c| c.weight * c.slope).sum::<f64>() / total_weight;
    let intercept = candidates
        .iter()
        .map(|c| c.weight * c.intercept)
        .sum::<f64>()
        / total_weight;

    Some(FittedLine { slope, intercept })
}

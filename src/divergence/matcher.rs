use log::{debug, trace};

use crate::model::{DetectionResult, DivergenceType, Pivot};

/// 두 피벗이 지정된 유형의 다이버전스를 이루는지 확인
///
/// * 상승: 가격 저점 하락 + RSI 저점 상승
/// * 하락: 가격 고점 상승 + RSI 고점 하락
pub fn is_divergence(current: &Pivot, previous: &Pivot, divergence_type: DivergenceType) -> bool {
    match divergence_type {
        DivergenceType::Bullish => current.price < previous.price && current.rsi > previous.rsi,
        DivergenceType::Bearish => current.price > previous.price && current.rsi < previous.rsi,
        DivergenceType::None => false,
    }
}

/// 알림용 설명 문자열 생성
fn describe(current: &Pivot, previous: &Pivot, divergence_type: DivergenceType) -> String {
    format!(
        "{}: Price {:.2}->{:.2}, RSI {:.2}->{:.2}, Date {}->{}",
        divergence_type.label(),
        previous.price,
        current.price,
        previous.rsi,
        current.rsi,
        previous.date,
        current.date
    )
}

/// 피벗 쌍에서 다이버전스 탐색
///
/// 피벗을 인덱스 내림차순(최신 우선)으로 정렬한 뒤 인접한 쌍 `(current, previous)`를
/// 차례로 검사합니다. 봉 간격이 `[range_min, range_max]`를 벗어나는 쌍은 건너뛰고,
/// 조건을 만족하는 첫 번째 쌍에서 즉시 반환합니다 (그보다 오래된 쌍은 보지 않음).
///
/// # Arguments
/// * `pivots` - 피벗 목록 (순서 무관, 원본은 변경하지 않음)
/// * `divergence_type` - 찾을 다이버전스 유형
/// * `range_min` - 최소 봉 간격
/// * `range_max` - 최대 봉 간격
///
/// # Returns
/// * `DetectionResult` - 탐지 결과 (현재 가격/RSI는 호출자가 채움)
pub fn match_divergence(
    pivots: &[Pivot],
    divergence_type: DivergenceType,
    range_min: usize,
    range_max: usize,
) -> DetectionResult {
    if pivots.len() < 2 || !divergence_type.has_divergence() {
        return DetectionResult::none();
    }

    let mut ordered: Vec<&Pivot> = pivots.iter().collect();
    ordered.sort_by(|a, b| b.index.cmp(&a.index));

    for pair in ordered.windows(2) {
        let (current, previous) = (pair[0], pair[1]);
        let bars_between = current.index - previous.index;

        if bars_between < range_min || bars_between > range_max {
            trace!(
                "범위 밖 피벗 쌍 건너뜀: #{} -> #{} ({}봉)",
                previous.index, current.index, bars_between
            );
            continue;
        }

        if is_divergence(current, previous, divergence_type) {
            debug!(
                "{} 다이버전스 일치: #{} -> #{} ({}봉)",
                divergence_type.label(),
                previous.index,
                current.index,
                bars_between
            );
            return DetectionResult::divergence(
                divergence_type,
                describe(current, previous, divergence_type),
            );
        }
    }

    DetectionResult::none()
}

use crate::indicator::rsi::RsiSeries;
use crate::model::{Pivot, PivotKind, PriceRsiNode, PricePoint};

/// 가격 데이터와 RSI 시계열을 인덱스 기준으로 결합
///
/// 두 시퀀스 중 짧은 쪽 길이에 맞춥니다.
/// RSI 시계열이 비어 있으면 빈 목록을 반환합니다.
pub fn create_nodes(points: &[PricePoint], rsi: &RsiSeries) -> Vec<PriceRsiNode> {
    points
        .iter()
        .take(rsi.len())
        .enumerate()
        .map(|(index, point)| PriceRsiNode::new(index, point.date, point.close, rsi.get(index)))
        .collect()
}

/// 이웃 값이 중심 값을 무효화하는지 확인 (동일 값도 무효)
fn disqualifies(kind: PivotKind, center: f64, neighbor: f64) -> bool {
    match kind {
        PivotKind::High => neighbor >= center,
        PivotKind::Low => neighbor <= center,
    }
}

/// 인덱스 `i`가 피벗인지 확인
///
/// 우측 윈도우는 마지막 인덱스에서 잘립니다 (부분 윈도우도 평가).
/// RSI가 없는 이웃은 비교에서 제외합니다.
fn is_pivot(
    nodes: &[PriceRsiNode],
    i: usize,
    kind: PivotKind,
    lookback_left: usize,
    lookback_right: usize,
) -> Option<f64> {
    let center = nodes[i].rsi?;
    let right_end = i.saturating_add(lookback_right).saturating_add(1).min(nodes.len());

    let left = &nodes[i - lookback_left..i];
    let right = &nodes[i + 1..right_end];

    let beaten = left
        .iter()
        .chain(right.iter())
        .filter_map(|node| node.rsi)
        .any(|neighbor| disqualifies(kind, center, neighbor));

    if beaten { None } else { Some(center) }
}

/// RSI 피벗 탐지
///
/// # Arguments
/// * `nodes` - 인덱스 순으로 정렬된 가격/RSI 노드
/// * `kind` - 찾을 피벗 종류 (고점/저점)
/// * `lookback_left` - 좌측 확인 봉 수
/// * `lookback_right` - 우측 확인 봉 수
///
/// # Returns
/// * `Vec<Pivot>` - 인덱스 오름차순 피벗 목록.
///   `nodes.len() < lookback_left + lookback_right + 1`이면 빈 목록
pub fn find_pivots(
    nodes: &[PriceRsiNode],
    kind: PivotKind,
    lookback_left: usize,
    lookback_right: usize,
) -> Vec<Pivot> {
    let window = lookback_left
        .checked_add(lookback_right)
        .and_then(|n| n.checked_add(1));
    if window.is_none_or(|w| nodes.len() < w) {
        return Vec::new();
    }

    (lookback_left..nodes.len())
        .filter_map(|i| {
            is_pivot(nodes, i, kind, lookback_left, lookback_right).map(|rsi| Pivot {
                index: nodes[i].index,
                price: nodes[i].price,
                rsi,
                date: nodes[i].date,
                kind,
            })
        })
        .collect()
}

/// RSI 피벗 고점 탐지
pub fn find_pivot_highs(
    nodes: &[PriceRsiNode],
    lookback_left: usize,
    lookback_right: usize,
) -> Vec<Pivot> {
    find_pivots(nodes, PivotKind::High, lookback_left, lookback_right)
}

/// RSI 피벗 저점 탐지
pub fn find_pivot_lows(
    nodes: &[PriceRsiNode],
    lookback_left: usize,
    lookback_right: usize,
) -> Vec<Pivot> {
    find_pivots(nodes, PivotKind::Low, lookback_left, lookback_right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::rsi::compute_rsi;
    use chrono::{Days, NaiveDate};

    fn nodes_from(rsi: &[Option<f64>]) -> Vec<PriceRsiNode> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        rsi.iter()
            .enumerate()
            .map(|(i, value)| {
                PriceRsiNode::new(
                    i,
                    start.checked_add_days(Days::new(i as u64)).unwrap(),
                    100.0 + i as f64,
                    *value,
                )
            })
            .collect()
    }

    fn defined(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn indices(pivots: &[Pivot]) -> Vec<usize> {
        pivots.iter().map(|p| p.index).collect()
    }

    #[test]
    fn test_simple_pivot_high_and_low() {
        let nodes = nodes_from(&defined(&[40.0, 45.0, 60.0, 50.0, 30.0, 35.0, 42.0]));

        // 마지막 봉(42)은 우측 윈도우가 비어 있어 좌측 조건만으로 고점이 됨
        let highs = find_pivot_highs(&nodes, 2, 2);
        assert_eq!(indices(&highs), vec![2, 6]);
        assert_eq!(highs[0].kind, PivotKind::High);
        assert_eq!(highs[0].rsi, 60.0);
        assert_eq!(highs[0].price, 102.0);

        let lows = find_pivot_lows(&nodes, 2, 2);
        assert_eq!(indices(&lows), vec![4]);
        assert_eq!(lows[0].kind, PivotKind::Low);
    }

    #[test]
    fn test_plateau_produces_no_pivot() {
        let nodes = nodes_from(&defined(&[40.0, 50.0, 60.0, 60.0, 60.0, 50.0, 40.0]));
        assert!(find_pivot_highs(&nodes, 1, 1).is_empty());
        assert!(find_pivot_highs(&nodes, 2, 2).is_empty());

        let lows = nodes_from(&defined(&[60.0, 50.0, 40.0, 40.0, 40.0, 50.0, 60.0]));
        assert!(find_pivot_lows(&lows, 1, 1).is_empty());
    }

    #[test]
    fn test_too_short_returns_empty() {
        let nodes = nodes_from(&defined(&[40.0, 60.0, 40.0, 30.0]));
        assert!(find_pivot_highs(&nodes, 2, 2).is_empty());
        assert!(find_pivot_lows(&nodes, 2, 2).is_empty());
        assert_eq!(indices(&find_pivot_highs(&nodes, 1, 1)), vec![1]);
    }

    #[test]
    fn test_oversized_lookbacks_return_empty() {
        let nodes = nodes_from(&defined(&[40.0, 60.0, 40.0, 30.0, 50.0]));
        let huge = usize::MAX / 2 + 1;
        assert!(find_pivot_highs(&nodes, huge, huge).is_empty());
        assert!(find_pivot_lows(&nodes, 1, usize::MAX).is_empty());
        assert!(find_pivot_lows(&nodes, usize::MAX, 1).is_empty());
    }

    #[test]
    fn test_right_window_is_clamped() {
        // 우측 3봉 중 2봉만 존재해도 평가
        let nodes = nodes_from(&defined(&[50.0, 40.0, 45.0, 48.0, 70.0, 65.0, 60.0]));
        assert_eq!(indices(&find_pivot_highs(&nodes, 2, 3)), vec![4]);

        // 마지막 봉은 우측 윈도우가 비어 있어도 좌측 조건만으로 평가
        let nodes = nodes_from(&defined(&[50.0, 40.0, 45.0, 48.0, 70.0, 65.0, 60.0, 75.0]));
        assert_eq!(indices(&find_pivot_highs(&nodes, 2, 3)), vec![7]);
    }

    #[test]
    fn test_undefined_rsi_is_skipped() {
        let mut values = vec![None, None, None];
        values.extend(defined(&[50.0, 30.0, 45.0, 55.0, 40.0, 52.0]));
        let nodes = nodes_from(&values);

        let lows = find_pivot_lows(&nodes, 2, 2);
        assert_eq!(indices(&lows), vec![4, 7]);

        // 인덱스 3은 좌측 이웃이 모두 None이라 우측 비교만으로 고점이 됨
        let highs = find_pivot_highs(&nodes, 2, 2);
        assert_eq!(indices(&highs), vec![3, 6]);

        // None 중심은 절대 피벗이 아님
        assert!(highs.iter().chain(lows.iter()).all(|p| p.index >= 3));
    }

    #[test]
    fn test_ascending_order() {
        let nodes = nodes_from(&defined(&[
            50.0, 40.0, 55.0, 35.0, 60.0, 30.0, 65.0, 25.0, 70.0, 20.0,
        ]));
        let highs = find_pivot_highs(&nodes, 1, 1);
        assert_eq!(indices(&highs), vec![2, 4, 6, 8]);
        let lows = find_pivot_lows(&nodes, 1, 1);
        assert_eq!(indices(&lows), vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_smaller_window_never_finds_fewer_pivots() {
        let values: Vec<f64> = (0..80)
            .map(|i| 50.0 + ((i * 29 % 23) as f64 - 11.0) * 1.5 + ((i % 7) as f64))
            .collect();
        let nodes = nodes_from(&defined(&values));

        for kind in [PivotKind::High, PivotKind::Low] {
            for (large, small) in [((5, 5), (3, 3)), ((4, 2), (2, 2)), ((3, 6), (3, 1))] {
                let wide = find_pivots(&nodes, kind, large.0, large.1);
                let narrow = find_pivots(&nodes, kind, small.0, small.1);
                assert!(narrow.len() >= wide.len());
                for pivot in &wide {
                    assert!(narrow.iter().any(|p| p.index == pivot.index));
                }
            }
        }
    }

    #[test]
    fn test_create_nodes_aligns_with_rsi() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points: Vec<PricePoint> = (0..6)
            .map(|i| {
                let close = 10.0 + i as f64;
                PricePoint::new(
                    start.checked_add_days(Days::new(i)).unwrap(),
                    close,
                    close,
                    close,
                    100,
                )
            })
            .collect();
        let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
        let rsi = compute_rsi(&closes, 3);

        let nodes = create_nodes(&points, &rsi);
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes[2].rsi, None);
        assert_eq!(nodes[3].rsi, Some(100.0));
        assert_eq!(nodes[5].index, 5);
        assert_eq!(nodes[5].price, 15.0);

        let empty = create_nodes(&points, &compute_rsi(&closes, 10));
        assert!(empty.is_empty());
    }
}

//! RSI 다이버전스 탐지
//!
//! 가격 데이터 → RSI → 가격/RSI 노드 → 피벗 → 다이버전스 판정 순으로 동작하는
//! 상태 없는 파이프라인입니다. 각 단계는 이전 단계의 출력을 읽기만 합니다.

pub mod config;
pub mod matcher;
pub mod pivot;

pub use config::{DEFAULT_RSI_PERIOD, DetectorConfig};
pub use matcher::{is_divergence, match_divergence};
pub use pivot::{create_nodes, find_pivot_highs, find_pivot_lows, find_pivots};

use log::{debug, info};
use std::fmt::Display;

use crate::indicator::rsi::compute_rsi;
use crate::model::{DetectionResult, DivergenceType, PriceRsiNode, PricePoint};
use crate::price_history::PriceHistory;

/// 다이버전스 탐지기
///
/// 설정만 보관하며 호출 간 상태를 공유하지 않으므로 여러 스레드에서 동시에 사용해도 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Display for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Detector({})", self.config)
    }
}

impl Detector {
    /// 검증된 설정으로 탐지기 생성
    pub fn new(config: DetectorConfig) -> Detector {
        Detector { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// 가격 데이터에서 다이버전스 탐지
    ///
    /// # Arguments
    /// * `points` - 시간순(오래된 데이터 먼저) 가격 데이터
    /// * `divergence_type` - 찾을 다이버전스 유형
    ///
    /// # Returns
    /// * `DetectionResult` - 데이터가 `min_history_len()`보다 적으면 즉시 `found == false`
    pub fn detect(&self, points: &[PricePoint], divergence_type: DivergenceType) -> DetectionResult {
        let required = self.config.min_history_len();
        if points.len() < required {
            debug!(
                "가격 데이터 부족으로 탐지 생략: 필요 {}개, 실제 {}개",
                required,
                points.len()
            );
            return DetectionResult::none();
        }

        let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
        let rsi = compute_rsi(&closes, self.config.rsi_period());
        debug!("RSI 계산 완료: {}", rsi);

        let nodes = create_nodes(points, &rsi);
        self.detect_nodes(&nodes, divergence_type)
    }

    /// 검증된 가격 이력에서 다이버전스 탐지
    pub fn detect_history(
        &self,
        history: &PriceHistory,
        divergence_type: DivergenceType,
    ) -> DetectionResult {
        self.detect(history.points(), divergence_type)
    }

    /// 이미 계산된 가격/RSI 노드에서 다이버전스 탐지
    ///
    /// 현재 가격과 RSI는 마지막 노드에서 가져옵니다.
    pub fn detect_nodes(
        &self,
        nodes: &[PriceRsiNode],
        divergence_type: DivergenceType,
    ) -> DetectionResult {
        let Some(last) = nodes.last() else {
            return DetectionResult::none();
        };

        let Some(kind) = divergence_type.pivot_kind() else {
            return DetectionResult::none().with_current(last.price, last.rsi);
        };

        let pivots = find_pivots(
            nodes,
            kind,
            self.config.lookback_left(),
            self.config.lookback_right(),
        );
        debug!("{:?} 피벗 {}개 발견", kind, pivots.len());

        let result = match_divergence(
            &pivots,
            divergence_type,
            self.config.range_min(),
            self.config.range_max(),
        )
        .with_current(last.price, last.rsi);

        if result.found {
            info!("{}", result);
        } else {
            debug!("{} 다이버전스 없음", divergence_type.label());
        }

        result
    }
}

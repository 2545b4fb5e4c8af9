use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{DivergenceError, DivergenceResult};

/// 기본 RSI 계산 기간
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// 직렬화용 원본 설정 형태
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawDetectorConfig {
    lookback_left: usize,
    lookback_right: usize,
    range_min: usize,
    range_max: usize,
    #[serde(default = "default_rsi_period")]
    rsi_period: usize,
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

/// 다이버전스 탐지 설정 (불변 값 객체)
///
/// 생성 시점에 검증되며, 이후 모든 파이프라인 단계에서 읽기 전용으로 공유됩니다.
/// 역직렬화도 같은 검증을 거칩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDetectorConfig", into = "RawDetectorConfig")]
pub struct DetectorConfig {
    lookback_left: usize,
    lookback_right: usize,
    range_min: usize,
    range_max: usize,
    rsi_period: usize,
}

impl DetectorConfig {
    /// 검증된 설정 생성
    ///
    /// # Arguments
    /// * `lookback_left` - 피벗 좌측 확인 봉 수 (1 이상)
    /// * `lookback_right` - 피벗 우측 확인 봉 수 (1 이상)
    /// * `range_min` - 두 피벗 사이 최소 봉 수
    /// * `range_max` - 두 피벗 사이 최대 봉 수 (`range_min` 이상)
    /// * `rsi_period` - RSI 계산 기간 (1 이상)
    ///
    /// # Returns
    /// * `DivergenceResult<DetectorConfig>` - 설정 또는 `InvalidConfig` 오류
    pub fn new(
        lookback_left: usize,
        lookback_right: usize,
        range_min: usize,
        range_max: usize,
        rsi_period: usize,
    ) -> DivergenceResult<DetectorConfig> {
        if lookback_left == 0 {
            return Err(DivergenceError::InvalidConfig(
                "lookback_left는 0보다 커야 합니다".to_string(),
            ));
        }
        if lookback_right == 0 {
            return Err(DivergenceError::InvalidConfig(
                "lookback_right는 0보다 커야 합니다".to_string(),
            ));
        }
        if rsi_period == 0 {
            return Err(DivergenceError::InvalidConfig(
                "rsi_period는 0보다 커야 합니다".to_string(),
            ));
        }
        if range_min > range_max {
            return Err(DivergenceError::InvalidConfig(format!(
                "range_min({})은 range_max({})보다 클 수 없습니다",
                range_min, range_max
            )));
        }
        if required_history_len(rsi_period, lookback_left, lookback_right).is_none() {
            return Err(DivergenceError::InvalidConfig(format!(
                "rsi_period({}) + lookback_left({}) + lookback_right({})가 너무 큽니다",
                rsi_period, lookback_left, lookback_right
            )));
        }

        Ok(DetectorConfig {
            lookback_left,
            lookback_right,
            range_min,
            range_max,
            rsi_period,
        })
    }

    /// 피벗 좌측 확인 봉 수
    pub fn lookback_left(&self) -> usize {
        self.lookback_left
    }

    /// 피벗 우측 확인 봉 수
    pub fn lookback_right(&self) -> usize {
        self.lookback_right
    }

    /// 두 피벗 사이 최소 봉 수
    pub fn range_min(&self) -> usize {
        self.range_min
    }

    /// 두 피벗 사이 최대 봉 수
    pub fn range_max(&self) -> usize {
        self.range_max
    }

    /// RSI 계산 기간
    pub fn rsi_period(&self) -> usize {
        self.rsi_period
    }

    /// 모든 단계가 피벗 2개 이상을 만들 수 있는 최소 가격 데이터 수
    pub fn min_history_len(&self) -> usize {
        required_history_len(self.rsi_period, self.lookback_left, self.lookback_right)
            .unwrap_or(usize::MAX)
    }
}

/// 탐지에 필요한 최소 가격 데이터 수 (`usize` 범위를 넘으면 `None`)
pub fn required_history_len(
    rsi_period: usize,
    lookback_left: usize,
    lookback_right: usize,
) -> Option<usize> {
    rsi_period
        .checked_add(lookback_left)?
        .checked_add(lookback_right)?
        .checked_add(2)
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            lookback_left: 5,
            lookback_right: 5,
            range_min: 5,
            range_max: 60,
            rsi_period: DEFAULT_RSI_PERIOD,
        }
    }
}

impl Display for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DetectorConfig(rsi={}, lookback={}/{}, range={}..={})",
            self.rsi_period, self.lookback_left, self.lookback_right, self.range_min, self.range_max
        )
    }
}

impl TryFrom<RawDetectorConfig> for DetectorConfig {
    type Error = DivergenceError;

    fn try_from(raw: RawDetectorConfig) -> Result<Self, Self::Error> {
        DetectorConfig::new(
            raw.lookback_left,
            raw.lookback_right,
            raw.range_min,
            raw.range_max,
            raw.rsi_period,
        )
    }
}

impl From<DetectorConfig> for RawDetectorConfig {
    fn from(config: DetectorConfig) -> Self {
        RawDetectorConfig {
            lookback_left: config.lookback_left,
            lookback_right: config.lookback_right,
            range_min: config.range_min,
            range_max: config.range_max,
            rsi_period: config.rsi_period,
        }
    }
}

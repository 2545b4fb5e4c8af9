use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config_loader::{ConfigResult, ConfigValidation, collect_violations};
use crate::divergence::config::required_history_len;
use crate::divergence::{DEFAULT_RSI_PERIOD, DetectorConfig};
use crate::error::{DivergenceError, DivergenceResult};
use crate::market::{DateRange, Interval, MAX_RANGE_DAYS, Symbol};
use crate::model::DivergenceType;

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_start_date_offset() -> u64 {
    200
}

fn default_intervals() -> Vec<String> {
    vec![Interval::OneDay.to_string()]
}

/// 다이버전스 탐지 파라미터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceSettings {
    pub lookback_left: usize,
    pub lookback_right: usize,
    pub range_min: usize,
    pub range_max: usize,
    /// 분석에 사용할 최근 봉 수
    pub indices_recent: usize,
}

impl Default for DivergenceSettings {
    fn default() -> Self {
        DivergenceSettings {
            lookback_left: 5,
            lookback_right: 5,
            range_min: 5,
            range_max: 60,
            indices_recent: 100,
        }
    }
}

/// 분석 설정 파일
///
/// ```toml
/// rsi_period = 14
/// bullish_symbols = ["AAPL"]
/// intervals = ["1D", "1W"]
///
/// [divergence]
/// lookback_left = 5
/// lookback_right = 5
/// range_min = 5
/// range_max = 60
/// indices_recent = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    /// 조회 시작일 (오늘 기준 과거 일수)
    #[serde(default = "default_start_date_offset")]
    pub start_date_offset: u64,
    pub divergence: DivergenceSettings,
    /// 매수 신호 감시 종목
    #[serde(default)]
    pub bullish_symbols: Vec<String>,
    /// 매도 신호 감시 종목 (보유 종목)
    #[serde(default)]
    pub bearish_symbols: Vec<String>,
    #[serde(default = "default_intervals")]
    pub intervals: Vec<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            rsi_period: DEFAULT_RSI_PERIOD,
            start_date_offset: default_start_date_offset(),
            divergence: DivergenceSettings::default(),
            bullish_symbols: Vec::new(),
            bearish_symbols: Vec::new(),
            intervals: default_intervals(),
        }
    }
}

impl ConfigValidation for AnalysisSettings {
    fn validate(&self) -> ConfigResult<()> {
        let mut violations = Vec::new();
        let d = &self.divergence;

        if self.rsi_period == 0 {
            violations.push("rsi_period는 1 이상이어야 합니다".to_string());
        }
        if self.start_date_offset == 0 || self.start_date_offset > MAX_RANGE_DAYS as u64 {
            violations.push(format!(
                "start_date_offset는 1~{} 사이여야 합니다",
                MAX_RANGE_DAYS
            ));
        }
        if d.lookback_left == 0 {
            violations.push("divergence.lookback_left는 1 이상이어야 합니다".to_string());
        }
        if d.lookback_right == 0 {
            violations.push("divergence.lookback_right는 1 이상이어야 합니다".to_string());
        }
        if d.range_min > d.range_max {
            violations.push("divergence.range_min은 range_max 이하여야 합니다".to_string());
        }

        match required_history_len(self.rsi_period, d.lookback_left, d.lookback_right) {
            Some(required) if d.indices_recent < required => violations.push(format!(
                "divergence.indices_recent는 {} 이상이어야 합니다 (현재 {})",
                required, d.indices_recent
            )),
            Some(_) => {}
            None => violations.push(
                "rsi_period + divergence.lookback_left + divergence.lookback_right가 너무 큽니다"
                    .to_string(),
            ),
        }

        if self.bullish_symbols.is_empty() && self.bearish_symbols.is_empty() {
            violations.push("bullish_symbols 또는 bearish_symbols 중 하나 이상 필요합니다".to_string());
        }
        for symbol in self.bullish_symbols.iter().chain(&self.bearish_symbols) {
            if let Err(e) = Symbol::new(symbol) {
                violations.push(e.to_string());
            }
        }

        if self.intervals.is_empty() {
            violations.push("intervals는 비어 있을 수 없습니다".to_string());
        }
        for interval in &self.intervals {
            if let Err(e) = interval.parse::<Interval>() {
                violations.push(e.to_string());
            }
        }

        collect_violations(violations)
    }
}

impl AnalysisSettings {
    /// 탐지기 설정 생성
    pub fn detector_config(&self) -> DivergenceResult<DetectorConfig> {
        DetectorConfig::new(
            self.divergence.lookback_left,
            self.divergence.lookback_right,
            self.divergence.range_min,
            self.divergence.range_max,
            self.rsi_period,
        )
    }

    /// 다이버전스 유형별 감시 종목
    pub fn symbols_for(&self, divergence_type: DivergenceType) -> DivergenceResult<Vec<Symbol>> {
        let symbols = match divergence_type {
            DivergenceType::Bullish => &self.bullish_symbols,
            DivergenceType::Bearish => &self.bearish_symbols,
            DivergenceType::None => return Ok(Vec::new()),
        };

        symbols.iter().map(|s| Symbol::new(s)).collect()
    }

    /// 분석 대상 간격 목록
    pub fn intervals(&self) -> DivergenceResult<Vec<Interval>> {
        self.intervals.iter().map(|s| s.parse()).collect()
    }

    /// 기준일로부터 `start_date_offset`일 전까지의 조회 기간
    pub fn date_range_as_of(&self, today: NaiveDate) -> DivergenceResult<DateRange> {
        let start = today
            .checked_sub_days(Days::new(self.start_date_offset))
            .ok_or_else(|| DivergenceError::InvalidConfig("start_date_offset 범위 초과".to_string()))?;
        DateRange::from_dates(start, today, today)
    }
}

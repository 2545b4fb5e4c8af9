use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::DivergenceError;

/// 종목 지표 (호출자가 계산하여 공급)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StockMetrics {
    pub symbol: String,
    /// 거래소 (예: HOSE, HNX, UPCOM)
    pub exchange: String,
    /// 1개월 상대강도 백분위 (1~99, 데이터 부족 시 0)
    pub rs_1m: u8,
    pub rs_3m: u8,
    pub rs_6m: u8,
    pub rs_9m: u8,
    pub rs_52w: u8,
    /// 당일 거래량
    pub current_volume: u64,
    /// 20일 거래량 단순이동평균
    pub volume_sma20: u64,
}

impl StockMetrics {
    /// 20일 평균 대비 당일 거래량 비율 (%)
    ///
    /// 평균이 0이면 0
    pub fn volume_vs_sma(&self) -> f64 {
        if self.volume_sma20 == 0 {
            return 0.0;
        }
        (self.current_volume as f64 - self.volume_sma20 as f64) / self.volume_sma20 as f64 * 100.0
    }

    /// 필드 값 조회
    pub fn value(&self, field: MetricField) -> f64 {
        match field {
            MetricField::Rs1m => self.rs_1m as f64,
            MetricField::Rs3m => self.rs_3m as f64,
            MetricField::Rs6m => self.rs_6m as f64,
            MetricField::Rs9m => self.rs_9m as f64,
            MetricField::Rs52w => self.rs_52w as f64,
            MetricField::VolumeVsSma => self.volume_vs_sma(),
            MetricField::CurrentVolume => self.current_volume as f64,
            MetricField::VolumeSma20 => self.volume_sma20 as f64,
        }
    }

    /// 단일 조건 만족 여부
    pub fn matches_condition(&self, condition: &FilterCondition) -> bool {
        condition
            .operator
            .compare(self.value(condition.field), condition.value)
    }

    /// 필터 요청 만족 여부
    ///
    /// 거래소 조건은 항상 AND로 적용되며, 필드 조건이 없으면 거래소 조건만 봅니다.
    pub fn matches_filter(&self, request: &FilterRequest) -> bool {
        if !request.exchanges.is_empty() && !request.exchanges.contains(&self.exchange) {
            return false;
        }

        if request.conditions.is_empty() {
            return true;
        }

        match request.logic {
            FilterLogic::And => request.conditions.iter().all(|c| self.matches_condition(c)),
            FilterLogic::Or => request.conditions.iter().any(|c| self.matches_condition(c)),
        }
    }
}

/// 필터 가능한 지표 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetricField {
    Rs1m,
    Rs3m,
    Rs6m,
    Rs9m,
    Rs52w,
    VolumeVsSma,
    CurrentVolume,
    VolumeSma20,
}

impl MetricField {
    pub const ALL: [MetricField; 8] = [
        MetricField::Rs1m,
        MetricField::Rs3m,
        MetricField::Rs6m,
        MetricField::Rs9m,
        MetricField::Rs52w,
        MetricField::VolumeVsSma,
        MetricField::CurrentVolume,
        MetricField::VolumeSma20,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::Rs1m => "rs_1m",
            MetricField::Rs3m => "rs_3m",
            MetricField::Rs6m => "rs_6m",
            MetricField::Rs9m => "rs_9m",
            MetricField::Rs52w => "rs_52w",
            MetricField::VolumeVsSma => "volume_vs_sma",
            MetricField::CurrentVolume => "current_volume",
            MetricField::VolumeSma20 => "volume_sma20",
        }
    }
}

impl Display for MetricField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricField {
    type Err = DivergenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricField::ALL
            .iter()
            .find(|field| field.as_str() == s)
            .copied()
            .ok_or_else(|| DivergenceError::UnknownField(s.to_string()))
    }
}

impl TryFrom<String> for MetricField {
    type Error = DivergenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MetricField> for String {
    fn from(field: MetricField) -> Self {
        field.as_str().to_string()
    }
}

/// 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "=")]
    Equal,
}

impl FilterOperator {
    pub fn compare(&self, actual: f64, threshold: f64) -> bool {
        match self {
            FilterOperator::GreaterEqual => actual >= threshold,
            FilterOperator::LessEqual => actual <= threshold,
            FilterOperator::Greater => actual > threshold,
            FilterOperator::Less => actual < threshold,
            FilterOperator::Equal => actual == threshold,
        }
    }
}

/// 조건 결합 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLogic {
    #[default]
    And,
    Or,
}

/// 단일 필터 조건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: MetricField,
    #[serde(rename = "op")]
    pub operator: FilterOperator,
    pub value: f64,
}

/// 필터 요청
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(rename = "filters", default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub logic: FilterLogic,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exchanges: Vec<String>,
}

/// 필터를 만족하는 종목만 반환 (입력 순서 유지)
pub fn filter_stocks<'a>(stocks: &'a [StockMetrics], request: &FilterRequest) -> Vec<&'a StockMetrics> {
    stocks.iter().filter(|s| s.matches_filter(request)).collect()
}

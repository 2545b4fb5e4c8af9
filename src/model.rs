use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::DivergenceError;

/// 단일 가격 데이터 (외부에서 공급)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    pub close: f64,
    /// 고가 (종가 이상)
    pub high: f64,
    /// 저가 (종가 이하)
    pub low: f64,
    /// 거래량
    pub volume: u64,
}

impl PricePoint {
    /// 새 가격 데이터 생성
    pub fn new(date: NaiveDate, close: f64, high: f64, low: f64, volume: u64) -> Self {
        PricePoint {
            date,
            close,
            high,
            low,
            volume,
        }
    }
}

impl Display for PricePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PricePoint({}, c={:.2}, h={:.2}, l={:.2}, v={})",
            self.date, self.close, self.high, self.low, self.volume
        )
    }
}

/// 다이버전스 유형
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DivergenceType {
    /// 다이버전스 없음
    #[default]
    None,
    /// 상승 다이버전스 (가격 저점 하락 + RSI 저점 상승)
    Bullish,
    /// 하락 다이버전스 (가격 고점 상승 + RSI 고점 하락)
    Bearish,
}

impl DivergenceType {
    /// 다이버전스가 존재하는 유형인지 확인
    pub fn has_divergence(&self) -> bool {
        *self != DivergenceType::None
    }

    /// 알림 및 설명 문자열에 쓰이는 표시 이름
    pub fn label(&self) -> &'static str {
        match self {
            DivergenceType::None => "None",
            DivergenceType::Bullish => "Bullish",
            DivergenceType::Bearish => "Bearish",
        }
    }

    /// 해당 유형의 탐지에 사용되는 피벗 종류
    ///
    /// 상승 다이버전스는 피벗 저점, 하락 다이버전스는 피벗 고점에서 찾습니다.
    pub fn pivot_kind(&self) -> Option<PivotKind> {
        match self {
            DivergenceType::None => None,
            DivergenceType::Bullish => Some(PivotKind::Low),
            DivergenceType::Bearish => Some(PivotKind::High),
        }
    }
}

impl Display for DivergenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DivergenceType::None => write!(f, "none"),
            DivergenceType::Bullish => write!(f, "bullish"),
            DivergenceType::Bearish => write!(f, "bearish"),
        }
    }
}

impl FromStr for DivergenceType {
    type Err = DivergenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(DivergenceType::None),
            "bullish" => Ok(DivergenceType::Bullish),
            "bearish" => Ok(DivergenceType::Bearish),
            other => Err(DivergenceError::InvalidQuery(format!(
                "지원되지 않는 다이버전스 유형: {}",
                other
            ))),
        }
    }
}

/// 피벗 종류
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PivotKind {
    /// 피벗 고점 (RSI 국소 최대)
    High,
    /// 피벗 저점 (RSI 국소 최소)
    Low,
}

/// 가격과 RSI를 인덱스 기준으로 묶은 노드
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRsiNode {
    /// 정렬된 시퀀스 내 위치
    pub index: usize,
    pub date: NaiveDate,
    /// 종가
    pub price: f64,
    /// RSI 값 (워밍업 구간은 None)
    pub rsi: Option<f64>,
}

impl PriceRsiNode {
    pub fn new(index: usize, date: NaiveDate, price: f64, rsi: Option<f64>) -> Self {
        PriceRsiNode {
            index,
            date,
            price,
            rsi,
        }
    }
}

/// RSI 시계열에서 탐지된 국소 극값
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    pub index: usize,
    pub price: f64,
    pub rsi: f64,
    pub date: NaiveDate,
    pub kind: PivotKind,
}

impl Display for Pivot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pivot({:?} #{} {}, price={:.2}, rsi={:.2})",
            self.kind, self.index, self.date, self.price, self.rsi
        )
    }
}

/// 다이버전스 탐지 결과
///
/// `description`은 `found == true`일 때만 의미가 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub found: bool,
    pub divergence_type: DivergenceType,
    pub description: String,
    /// 마지막 봉의 종가
    pub current_price: f64,
    /// 마지막 봉의 RSI (계산 불가 시 None)
    pub current_rsi: Option<f64>,
}

impl DetectionResult {
    /// 다이버전스가 없는 결과 생성
    pub fn none() -> Self {
        DetectionResult {
            found: false,
            divergence_type: DivergenceType::None,
            description: String::new(),
            current_price: 0.0,
            current_rsi: None,
        }
    }

    /// 다이버전스가 발견된 결과 생성
    ///
    /// `DivergenceType::None`을 넘기면 다이버전스 없음 결과가 됩니다.
    pub fn divergence(divergence_type: DivergenceType, description: String) -> Self {
        if !divergence_type.has_divergence() {
            return Self::none();
        }

        DetectionResult {
            found: true,
            divergence_type,
            description,
            current_price: 0.0,
            current_rsi: None,
        }
    }

    /// 현재 가격과 RSI 설정
    pub fn with_current(mut self, price: f64, rsi: Option<f64>) -> Self {
        self.current_price = price;
        self.current_rsi = rsi;
        self
    }

    /// 특정 유형의 다이버전스가 발견되었는지 확인
    pub fn is_divergence_of_type(&self, divergence_type: DivergenceType) -> bool {
        self.found && self.divergence_type == divergence_type
    }
}

impl Default for DetectionResult {
    fn default() -> Self {
        Self::none()
    }
}

impl Display for DetectionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rsi = self
            .current_rsi
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());

        if self.found {
            write!(
                f,
                "{} 다이버전스 발견 (현재가: {:.2}, RSI: {}) - {}",
                self.divergence_type.label(),
                self.current_price,
                rsi,
                self.description
            )
        } else {
            write!(
                f,
                "다이버전스 없음 (현재가: {:.2}, RSI: {})",
                self.current_price, rsi
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divergence_type_parse() {
        assert_eq!(
            "Bullish".parse::<DivergenceType>().unwrap(),
            DivergenceType::Bullish
        );
        assert_eq!(
            " bearish ".parse::<DivergenceType>().unwrap(),
            DivergenceType::Bearish
        );
        assert!("sideways".parse::<DivergenceType>().is_err());
    }

    #[test]
    fn test_divergence_type_pivot_kind() {
        assert_eq!(DivergenceType::Bullish.pivot_kind(), Some(PivotKind::Low));
        assert_eq!(DivergenceType::Bearish.pivot_kind(), Some(PivotKind::High));
        assert_eq!(DivergenceType::None.pivot_kind(), None);
    }

    #[test]
    fn test_divergence_result_with_none_type_is_not_found() {
        let result = DetectionResult::divergence(DivergenceType::None, "무시됨".to_string());
        assert!(!result.found);
        assert!(result.description.is_empty());
    }

    #[test]
    fn test_is_divergence_of_type() {
        let result = DetectionResult::divergence(DivergenceType::Bearish, "desc".to_string())
            .with_current(10.0, Some(55.0));
        assert!(result.is_divergence_of_type(DivergenceType::Bearish));
        assert!(!result.is_divergence_of_type(DivergenceType::Bullish));
        assert_eq!(result.current_price, 10.0);
        assert_eq!(result.current_rsi, Some(55.0));
    }

    #[test]
    fn test_divergence_type_serde() {
        let json = serde_json::to_string(&DivergenceType::Bullish).unwrap();
        assert_eq!(json, "\"bullish\"");
        let parsed: DivergenceType = serde_json::from_str("\"bearish\"").unwrap();
        assert_eq!(parsed, DivergenceType::Bearish);
    }
}

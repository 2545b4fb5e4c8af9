use crate::error::{DivergenceError, DivergenceResult};
use crate::model::PricePoint;

/// 검증된 시간순 가격 이력
///
/// 날짜 기준 오름차순(가장 오래된 데이터가 먼저)으로 저장되며,
/// 생성 시점에 모든 데이터의 유효성을 검사합니다.
/// 거래가 없는 날의 공백은 허용됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    points: Vec<PricePoint>,
}

/// 단일 가격 데이터 유효성 검사
fn validate_point(index: usize, point: &PricePoint) -> DivergenceResult<()> {
    if !point.close.is_finite() || point.close < 0.0 {
        return Err(DivergenceError::InvalidPriceData(format!(
            "{}번째 데이터({})의 종가가 유효하지 않습니다: {}",
            index, point.date, point.close
        )));
    }

    if !point.high.is_finite() || point.high < point.close {
        return Err(DivergenceError::InvalidPriceData(format!(
            "{}번째 데이터({})의 고가({})가 종가({})보다 작습니다",
            index, point.date, point.high, point.close
        )));
    }

    if !point.low.is_finite() || point.low > point.close {
        return Err(DivergenceError::InvalidPriceData(format!(
            "{}번째 데이터({})의 저가({})가 종가({})보다 큽니다",
            index, point.date, point.low, point.close
        )));
    }

    Ok(())
}

impl PriceHistory {
    /// 새 가격 이력 생성
    ///
    /// # Arguments
    /// * `points` - 시간순으로 정렬된 가격 데이터
    ///
    /// # Returns
    /// * `DivergenceResult<PriceHistory>` - 검증된 가격 이력 또는 `InvalidPriceData` 오류
    pub fn new(points: Vec<PricePoint>) -> DivergenceResult<PriceHistory> {
        for (index, point) in points.iter().enumerate() {
            validate_point(index, point)?;
        }

        // 날짜는 엄격하게 증가해야 함
        if let Some(pos) = points.windows(2).position(|w| w[0].date >= w[1].date) {
            return Err(DivergenceError::InvalidPriceData(format!(
                "날짜가 시간순이 아닙니다: {} 다음에 {}",
                points[pos].date,
                points[pos + 1].date
            )));
        }

        Ok(PriceHistory { points })
    }

    /// 데이터 수 반환
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 비어 있는지 확인
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 전체 가격 데이터 슬라이스
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// 가장 최근 데이터
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// 종가 목록 (시간순)
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// 가장 최근 n개의 데이터 반환
    ///
    /// # Returns
    /// * `DivergenceResult<&[PricePoint]>` - 최근 n개 데이터, 부족하면 `InsufficientData`
    pub fn recent(&self, n: usize) -> DivergenceResult<&[PricePoint]> {
        if self.points.len() < n {
            return Err(DivergenceError::InsufficientData {
                required: n,
                actual: self.points.len(),
            });
        }

        Ok(&self.points[self.points.len() - n..])
    }
}

impl TryFrom<Vec<PricePoint>> for PriceHistory {
    type Error = DivergenceError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        PriceHistory::new(points)
    }
}

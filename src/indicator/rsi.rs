use std::fmt::Display;

/// RSI 시계열
///
/// 입력 가격과 인덱스로 정렬됩니다 (`get(i)`는 `price[i]`에 대응).
/// `period` 미만의 인덱스는 계산 불가 구간으로 `None`입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct RsiSeries {
    /// RSI 계산 기간
    period: usize,
    /// 인덱스별 RSI 값
    values: Vec<Option<f64>>,
}

impl RsiSeries {
    /// 빈 시계열 생성 (데이터 부족)
    pub fn empty(period: usize) -> Self {
        RsiSeries {
            period,
            values: Vec::new(),
        }
    }

    /// RSI 계산 기간 반환
    pub fn period(&self) -> usize {
        self.period
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 특정 인덱스의 RSI 값
    ///
    /// # Returns
    /// * `Option<f64>` - 범위를 벗어나거나 계산 불가 구간이면 None
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// 마지막 인덱스의 RSI 값
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    /// 인덱스별 RSI 값 슬라이스
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

impl Display for RsiSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.last() {
            Some(value) => write!(f, "RSI({}: {:.2}, n={})", self.period, value, self.len()),
            None => write!(f, "RSI({}: -, n={})", self.period, self.len()),
        }
    }
}

/// 인접 봉 사이의 상승폭/하락폭 계산
///
/// 변화가 없으면 둘 다 0입니다.
fn calculate_gains_and_losses(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            if change > 0.0 {
                (change, 0.0)
            } else if change < 0.0 {
                (0.0, -change)
            } else {
                (0.0, 0.0)
            }
        })
        .unzip()
}

/// 첫 `period`개 변화량의 단순 평균 (초기값)
fn initial_averages(gains: &[f64], losses: &[f64], period: usize) -> (f64, f64) {
    let avg_gain = gains.iter().take(period).sum::<f64>() / period as f64;
    let avg_loss = losses.iter().take(period).sum::<f64>() / period as f64;
    (avg_gain, avg_loss)
}

/// 와일더 평활 한 스텝
///
/// `(이전평균 * (period - 1) + 현재값) / period`
fn wilder_smooth(prev_avg: f64, current: f64, period: usize) -> f64 {
    (prev_avg * (period - 1) as f64 + current) / period as f64
}

/// 평균 상승폭/하락폭에서 RSI 값 계산
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }

    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}

/// 와일더 평활법으로 RSI 시계열 계산
///
/// # Arguments
/// * `closes` - 시간순 종가 목록
/// * `period` - RSI 계산 기간 (일반적으로 14)
///
/// # Returns
/// * `RsiSeries` - 입력과 같은 길이의 RSI 시계열.
///   `closes.len() < period + 1`이거나 `period == 0`이면 빈 시계열
pub fn compute_rsi(closes: &[f64], period: usize) -> RsiSeries {
    if period == 0 || closes.len() < period + 1 {
        return RsiSeries::empty(period);
    }

    let (gains, losses) = calculate_gains_and_losses(closes);
    let mut values = vec![None; closes.len()];

    let (mut avg_gain, mut avg_loss) = initial_averages(&gains, &losses, period);
    values[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in (period + 1)..closes.len() {
        avg_gain = wilder_smooth(avg_gain, gains[i - 1], period);
        avg_loss = wilder_smooth(avg_loss, losses[i - 1], period);
        values[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    RsiSeries { period, values }
}

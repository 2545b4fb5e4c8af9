use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{DivergenceError, DivergenceResult};

/// 날짜 문자열 형식
const DATE_FORMAT: &str = "%Y-%m-%d";
/// 시작일 미지정 시 종료일 기준 과거 일수
pub const DEFAULT_LOOKBACK_DAYS: u64 = 200;
/// 최대 조회 기간 (일)
pub const MAX_RANGE_DAYS: i64 = 365;
/// 분석에 필요한 최소 기간 (일)
pub const MIN_TRADING_DAYS: i64 = 14;

/// 종목 심볼
///
/// 앞뒤 공백을 제거하고 대문자로 정규화합니다. 2~10자의 영문/숫자만 허용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(value: &str) -> DivergenceResult<Symbol> {
        let value = value.trim().to_uppercase();

        if value.len() < 2 || value.len() > 10 {
            return Err(DivergenceError::InvalidQuery(format!(
                "심볼은 2~10자여야 합니다: '{}'",
                value
            )));
        }

        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DivergenceError::InvalidQuery(format!(
                "심볼에는 영문자와 숫자만 사용할 수 있습니다: '{}'",
                value
            )));
        }

        Ok(Symbol(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = DivergenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = DivergenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// 데이터 봉 간격
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    #[default]
    OneDay,
    OneWeek,
    OneMonth,
}

impl Interval {
    /// 지원되는 모든 간격
    pub const ALL: [Interval; 9] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::FourHours,
        Interval::OneDay,
        Interval::OneWeek,
        Interval::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1H",
            Interval::FourHours => "4H",
            Interval::OneDay => "1D",
            Interval::OneWeek => "1W",
            Interval::OneMonth => "1M",
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DivergenceError;

    /// 빈 문자열은 일봉(`1D`)으로 간주합니다. 대소문자를 구분합니다 (`1m` != `1M`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Interval::OneDay);
        }

        Interval::ALL
            .iter()
            .find(|interval| interval.as_str() == s)
            .copied()
            .ok_or_else(|| {
                DivergenceError::InvalidQuery(format!(
                    "지원되지 않는 간격 '{}': 1m, 5m, 15m, 30m, 1H, 4H, 1D, 1W, 1M 중 하나여야 합니다",
                    s
                ))
            })
    }
}

impl TryFrom<String> for Interval {
    type Error = DivergenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.as_str().to_string()
    }
}

/// 조회 기간 (양 끝 포함)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

fn parse_date(value: &str, field: &str) -> DivergenceResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        DivergenceError::InvalidQuery(format!(
            "{} 형식이 잘못되었습니다 '{}': YYYY-MM-DD 형식이어야 합니다",
            field, value
        ))
    })
}

impl DateRange {
    /// 문자열에서 조회 기간 생성 (오늘 기준)
    ///
    /// 종료일이 비어 있으면 오늘, 시작일이 비어 있으면 종료일 200일 전입니다.
    pub fn new(start: &str, end: &str) -> DivergenceResult<DateRange> {
        Self::new_as_of(start, end, Local::now().date_naive())
    }

    /// 기준일을 지정하여 조회 기간 생성
    pub fn new_as_of(start: &str, end: &str, today: NaiveDate) -> DivergenceResult<DateRange> {
        let end = if end.trim().is_empty() {
            today
        } else {
            parse_date(end, "end_date")?
        };

        let start = if start.trim().is_empty() {
            end.checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
                .ok_or_else(|| DivergenceError::InvalidQuery("시작일 계산 범위 초과".to_string()))?
        } else {
            parse_date(start, "start_date")?
        };

        Self::from_dates(start, end, today)
    }

    /// 날짜 값에서 조회 기간 생성
    pub fn from_dates(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> DivergenceResult<DateRange> {
        if start > end {
            return Err(DivergenceError::InvalidQuery(format!(
                "시작일({})이 종료일({})보다 늦습니다",
                start, end
            )));
        }

        if end > today {
            return Err(DivergenceError::InvalidQuery(format!(
                "종료일({})은 미래일 수 없습니다",
                end
            )));
        }

        if (end - start).num_days() > MAX_RANGE_DAYS {
            return Err(DivergenceError::InvalidQuery(format!(
                "조회 기간은 {}일을 초과할 수 없습니다",
                MAX_RANGE_DAYS
            )));
        }

        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 시작일과 종료일 사이 일수
    pub fn days_count(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// 날짜가 기간 안에 있는지 확인 (양 끝 포함)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// RSI 분석에 충분한 기간인지 확인
    pub fn is_valid_for_trading(&self) -> bool {
        self.days_count() >= MIN_TRADING_DAYS
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ~ {} ({}일)",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT),
            self.days_count()
        )
    }
}

/// 시장 데이터 조회 조건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDataQuery {
    pub symbol: Symbol,
    pub interval: Interval,
    pub date_range: DateRange,
}

impl MarketDataQuery {
    pub fn new(symbol: Symbol, interval: Interval, date_range: DateRange) -> Self {
        MarketDataQuery {
            symbol,
            interval,
            date_range,
        }
    }

    /// 문자열 입력에서 조회 조건 생성
    ///
    /// 각 값을 검증하며 처음 발견한 오류를 반환합니다.
    pub fn parse(symbol: &str, interval: &str, start: &str, end: &str) -> DivergenceResult<Self> {
        Ok(MarketDataQuery {
            symbol: symbol.parse()?,
            interval: interval.parse()?,
            date_range: DateRange::new(start, end)?,
        })
    }
}

impl Display for MarketDataQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.symbol, self.interval, self.date_range)
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::Display;
use std::time::Instant;

use crate::divergence::Detector;
use crate::error::{DivergenceError, DivergenceResult};
use crate::market::{Interval, MarketDataQuery, Symbol};
use crate::model::{DivergenceType, PricePoint};
use crate::price_history::PriceHistory;

/// 시장 데이터 공급자
///
/// 배치 분석에서 여러 스레드가 동시에 호출합니다.
pub trait MarketDataSource: Send + Sync {
    /// 조회 조건에 해당하는 시간순 가격 데이터 반환
    fn fetch_price_history(&self, query: &MarketDataQuery) -> DivergenceResult<Vec<PricePoint>>;
}

/// 단일 종목 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub symbol: Symbol,
    pub interval: Interval,
    /// 분석 요청 유형 (발견 여부와 무관)
    pub divergence_type: DivergenceType,
    pub found: bool,
    pub current_price: f64,
    pub current_rsi: Option<f64>,
    pub description: String,
    pub processing_time_ms: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rsi_period: usize,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn has_divergence(&self) -> bool {
        self.found
    }
}

impl Display for AnalysisResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rsi = self
            .current_rsi
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "[{} {}] {}: {} (가격: {:.2}, RSI: {}, {}ms)",
            self.symbol,
            self.interval,
            self.divergence_type.label(),
            if self.found { self.description.as_str() } else { "다이버전스 없음" },
            self.current_price,
            rsi,
            self.processing_time_ms
        )
    }
}

/// 배치 분석 결과
///
/// 성공과 실패를 입력 순서대로 분리해 담습니다.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<AnalysisResult>,
    pub failures: Vec<(Symbol, DivergenceError)>,
}

impl BatchOutcome {
    /// 다이버전스가 발견된 결과만 반환
    pub fn found(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| r.found)
    }
}

/// 다이버전스 분석 유스케이스
///
/// 데이터 조회 → 검증 → 최근 구간 선택 → 탐지 순으로 수행합니다.
#[derive(Debug)]
pub struct DivergenceAnalyzer<S: MarketDataSource> {
    source: S,
    detector: Detector,
    divergence_type: DivergenceType,
    indices_recent: usize,
}

impl<S: MarketDataSource> DivergenceAnalyzer<S> {
    /// 새 분석기 생성
    ///
    /// # Arguments
    /// * `source` - 시장 데이터 공급자
    /// * `detector` - 다이버전스 탐지기
    /// * `divergence_type` - 분석할 다이버전스 유형 (`None` 불가)
    /// * `indices_recent` - 분석에 사용할 최근 봉 수
    pub fn new(
        source: S,
        detector: Detector,
        divergence_type: DivergenceType,
        indices_recent: usize,
    ) -> DivergenceResult<Self> {
        if !divergence_type.has_divergence() {
            return Err(DivergenceError::InvalidConfig(
                "분석 유형은 bullish 또는 bearish여야 합니다".to_string(),
            ));
        }
        if indices_recent == 0 {
            return Err(DivergenceError::InvalidConfig(
                "indices_recent는 1 이상이어야 합니다".to_string(),
            ));
        }
        if indices_recent < detector.config().min_history_len() {
            warn!(
                "indices_recent({})가 최소 탐지 구간({})보다 작아 다이버전스를 찾을 수 없습니다",
                indices_recent,
                detector.config().min_history_len()
            );
        }

        Ok(DivergenceAnalyzer {
            source,
            detector,
            divergence_type,
            indices_recent,
        })
    }

    pub fn divergence_type(&self) -> DivergenceType {
        self.divergence_type
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// 단일 종목 분석
    pub fn analyze(&self, query: &MarketDataQuery) -> DivergenceResult<AnalysisResult> {
        let started = Instant::now();
        info!("{} 다이버전스 분석 시작: {}", self.divergence_type.label(), query);

        let points = self.source.fetch_price_history(query).inspect_err(|e| {
            error!("{} 가격 데이터 조회 실패: {}", query.symbol, e);
        })?;

        let history = PriceHistory::new(points).inspect_err(|e| {
            error!("{} 가격 데이터 검증 실패: {}", query.symbol, e);
        })?;

        let recent = history.recent(self.indices_recent).inspect_err(|e| {
            warn!("{} {}", query.symbol, e);
        })?;

        let detection = self.detector.detect(recent, self.divergence_type);
        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            "{} 다이버전스 분석 완료: {} (발견: {}, {}ms)",
            self.divergence_type.label(),
            query.symbol,
            detection.found,
            processing_time_ms
        );

        Ok(AnalysisResult {
            symbol: query.symbol.clone(),
            interval: query.interval,
            divergence_type: self.divergence_type,
            found: detection.found,
            current_price: detection.current_price,
            current_rsi: detection.current_rsi,
            description: detection.description,
            processing_time_ms,
            start_date: query.date_range.start(),
            end_date: query.date_range.end(),
            rsi_period: self.detector.config().rsi_period(),
            timestamp: Utc::now(),
        })
    }

    /// 여러 종목 병렬 분석
    ///
    /// 한 종목의 실패는 나머지 분석에 영향을 주지 않습니다.
    pub fn analyze_batch(&self, queries: &[MarketDataQuery]) -> BatchOutcome {
        let outcomes: Vec<(Symbol, DivergenceResult<AnalysisResult>)> = queries
            .par_iter()
            .map(|query| (query.symbol.clone(), self.analyze(query)))
            .collect();

        let mut batch = BatchOutcome::default();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(result) => batch.results.push(result),
                Err(e) => batch.failures.push((symbol, e)),
            }
        }

        info!(
            "배치 분석 완료: 성공 {}건, 실패 {}건, 발견 {}건",
            batch.results.len(),
            batch.failures.len(),
            batch.found().count()
        );
        batch
    }
}

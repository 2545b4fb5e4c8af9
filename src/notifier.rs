use log::{debug, info};
use serde::Serialize;

use crate::analysis::AnalysisResult;
use crate::error::{DivergenceError, DivergenceResult};
use crate::market::{Interval, Symbol};
use crate::model::DivergenceType;

/// 다이버전스 알림 내용
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivergenceAlert {
    pub divergence_type: DivergenceType,
    pub symbol: Symbol,
    pub interval: Interval,
    pub description: String,
}

/// 알림 본문 생성 (일반 텍스트)
pub fn format_alert(alert: &DivergenceAlert) -> String {
    let marker = match alert.divergence_type {
        DivergenceType::Bullish => "[매수]",
        DivergenceType::Bearish => "[매도]",
        DivergenceType::None => "[알림]",
    };

    format!(
        "{} {} Divergence Alert\n\nSymbol: {}\nInterval: {}\n{}\n",
        marker,
        alert.divergence_type.label(),
        alert.symbol,
        alert.interval,
        alert.description
    )
}

/// 알림 채널
pub trait Notifier: Send + Sync {
    /// 메시지 전송
    fn send_message(&self, message: &str) -> DivergenceResult<()>;

    /// 다이버전스 알림 전송
    fn send_divergence_alert(&self, alert: &DivergenceAlert) -> DivergenceResult<()> {
        self.send_message(&format_alert(alert))
    }

    /// 알림 활성화 여부
    fn is_enabled(&self) -> bool;
}

/// 분석 결과에 따라 알림 전송
///
/// 다이버전스가 발견되고 알림이 활성화된 경우에만 전송합니다.
///
/// # Returns
/// * `DivergenceResult<bool>` - 전송 여부, 전송 실패 시 `Notification` 오류
pub fn handle_divergence_result<N: Notifier + ?Sized>(
    notifier: &N,
    divergence_type: DivergenceType,
    interval: Interval,
    symbol: &Symbol,
    result: &AnalysisResult,
) -> DivergenceResult<bool> {
    if !result.found || !notifier.is_enabled() {
        debug!("{} [{}] 알림 생략", symbol, interval);
        return Ok(false);
    }

    let alert = DivergenceAlert {
        divergence_type,
        symbol: symbol.clone(),
        interval,
        description: result.description.clone(),
    };

    notifier.send_divergence_alert(&alert).map_err(|e| {
        DivergenceError::Notification(format!(
            "{} 알림 전송 실패 {} [{}]: {}",
            divergence_type.label(),
            symbol,
            interval,
            e
        ))
    })?;

    Ok(true)
}

/// 로그로 알림을 남기는 채널
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier {
    enabled: bool,
}

impl LogNotifier {
    pub fn new(enabled: bool) -> Self {
        LogNotifier { enabled }
    }
}

impl Notifier for LogNotifier {
    fn send_message(&self, message: &str) -> DivergenceResult<()> {
        if self.enabled {
            info!("{}", message);
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        enabled: bool,
        fail: bool,
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn send_message(&self, message: &str) -> DivergenceResult<()> {
            if self.fail {
                return Err(DivergenceError::Notification("채널 오류".to_string()));
            }
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    fn result(found: bool) -> AnalysisResult {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        AnalysisResult {
            symbol: Symbol::new("AAPL").unwrap(),
            interval: Interval::OneDay,
            divergence_type: DivergenceType::Bullish,
            found,
            current_price: 95.0,
            current_rsi: Some(38.0),
            description: "Bullish: Price 100.00->95.00, RSI 30.00->38.00".to_string(),
            processing_time_ms: 3,
            start_date: date,
            end_date: date,
            rsi_period: 14,
            timestamp: Utc::now(),
        }
    }

    fn handle(notifier: &RecordingNotifier, found: bool) -> DivergenceResult<bool> {
        let symbol = Symbol::new("AAPL").unwrap();
        handle_divergence_result(
            notifier,
            DivergenceType::Bullish,
            Interval::OneDay,
            &symbol,
            &result(found),
        )
    }

    #[test]
    fn test_sends_only_when_found_and_enabled() {
        let notifier = RecordingNotifier {
            enabled: true,
            ..Default::default()
        };
        assert_eq!(handle(&notifier, false), Ok(false));
        assert_eq!(handle(&notifier, true), Ok(true));

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Symbol: AAPL"));
        assert!(messages[0].contains("Interval: 1D"));
        assert!(messages[0].contains("Price 100.00->95.00"));
    }

    #[test]
    fn test_disabled_notifier_is_skipped() {
        let notifier = RecordingNotifier::default();
        assert_eq!(handle(&notifier, true), Ok(false));
        assert!(notifier.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_send_failure_is_wrapped() {
        let notifier = RecordingNotifier {
            enabled: true,
            fail: true,
            ..Default::default()
        };
        match handle(&notifier, true) {
            Err(DivergenceError::Notification(msg)) => assert!(msg.contains("AAPL")),
            other => panic!("Notification 오류가 발생해야 함: {other:?}"),
        }
    }

    #[test]
    fn test_format_alert() {
        let alert = DivergenceAlert {
            divergence_type: DivergenceType::Bearish,
            symbol: Symbol::new("TSLA").unwrap(),
            interval: Interval::FourHours,
            description: "desc".to_string(),
        };
        let text = format_alert(&alert);
        assert!(text.starts_with("[매도] Bearish Divergence Alert"));
        assert!(text.contains("Interval: 4H"));
    }

    #[test]
    fn test_format_alert_marker_per_type() {
        let alert = |divergence_type| DivergenceAlert {
            divergence_type,
            symbol: Symbol::new("VNM").unwrap(),
            interval: Interval::OneDay,
            description: "desc".to_string(),
        };

        assert!(format_alert(&alert(DivergenceType::Bullish)).starts_with("[매수] Bullish"));
        let neutral = format_alert(&alert(DivergenceType::None));
        assert!(neutral.starts_with("[알림]"));
        assert!(!neutral.contains("[매도]"));
    }

    #[test]
    fn test_log_notifier() {
        let notifier = LogNotifier::new(true);
        assert!(notifier.is_enabled());
        let symbol = Symbol::new("AAPL").unwrap();
        let sent = handle_divergence_result(
            &notifier,
            DivergenceType::Bullish,
            Interval::OneDay,
            &symbol,
            &result(true),
        );
        assert_eq!(sent, Ok(true));
        assert!(!LogNotifier::default().is_enabled());
    }
}

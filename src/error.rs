use thiserror::Error;

use crate::config_loader::ConfigError;

/// 다이버전스 분석 오류
///
/// "다이버전스 없음"은 오류가 아니며 `DetectionResult::found == false`로 표현됩니다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DivergenceError {
    /// 잘못된 설정 (Detector 생성 시점에만 발생)
    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    /// 데이터 부족 (호출자가 해당 심볼을 건너뛰면 복구 가능)
    #[error("가격 데이터 부족: 필요 {required}개, 실제 {actual}개")]
    InsufficientData { required: usize, actual: usize },

    /// 유효하지 않은 가격 데이터
    #[error("잘못된 가격 데이터: {0}")]
    InvalidPriceData(String),

    /// 유효하지 않은 조회 조건 (심볼, 인터벌, 날짜 범위)
    #[error("잘못된 조회 조건: {0}")]
    InvalidQuery(String),

    /// 알 수 없는 필터 필드
    #[error("알 수 없는 필드: {0}")]
    UnknownField(String),

    /// 외부 데이터 소스 오류
    #[error("데이터 소스 오류: {0}")]
    DataSource(String),

    /// 알림 전송 오류
    #[error("알림 전송 오류: {0}")]
    Notification(String),
}

/// 다이버전스 분석 결과 타입
pub type DivergenceResult<T> = Result<T, DivergenceError>;

impl From<ConfigError> for DivergenceError {
    fn from(err: ConfigError) -> Self {
        DivergenceError::InvalidConfig(err.to_string())
    }
}


use common_test_utils::*;
use rsi_divergence::config_loader::{ConfigError, ConfigFormat, ConfigLoader};
use rsi_divergence::settings::AnalysisSettings;
use rsi_divergence::{Detector, DivergenceError, DivergenceType, PriceHistory};
use std::io::Write;
use tempfile::Builder;

const SETTINGS: &str = r#"
rsi_period = 5
bullish_symbols = ["VNM"]
intervals = ["1D"]

[divergence]
lookback_left = 3
lookback_right = 3
range_min = 5
range_max = 40
indices_recent = 41
"#;

#[test]
fn test_settings_file_drives_detection() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(SETTINGS.as_bytes()).unwrap();

    let settings: AnalysisSettings =
        ConfigLoader::load_from_file(file.path(), ConfigFormat::Auto).unwrap();
    let detector = Detector::new(settings.detector_config().unwrap());

    let points = points_from_closes(&bullish_divergence_closes(), date(2024, 1, 1));
    assert_eq!(points.len(), settings.divergence.indices_recent);

    let result = detector.detect(&points, DivergenceType::Bullish);
    assert!(result.found);
}

#[test]
fn test_invalid_settings_file() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    let json = r#"{
        "rsi_period": 14,
        "divergence": {"lookback_left":0,"lookback_right":5,"range_min":50,"range_max":10,"indices_recent":100},
        "bearish_symbols": ["HPG"]
    }"#;
    file.write_all(json.as_bytes()).unwrap();

    let err = ConfigLoader::load_from_file::<AnalysisSettings>(file.path(), ConfigFormat::Auto)
        .unwrap_err();
    let message = match &err {
        ConfigError::ValidationError(msg) => msg.clone(),
        other => panic!("유효성 검사 오류가 발생해야 함: {other:?}"),
    };
    assert!(message.contains("lookback_left"));
    assert!(message.contains("range_min"));

    let converted: DivergenceError = err.into();
    assert!(matches!(converted, DivergenceError::InvalidConfig(_)));
}

#[test]
fn test_short_history_is_rejected_by_settings_window() {
    let settings: AnalysisSettings =
        ConfigLoader::load_from_string(SETTINGS, ConfigFormat::Toml).unwrap();
    let mut closes = bullish_divergence_closes();
    closes.pop();
    let history = PriceHistory::new(points_from_closes(&closes, date(2024, 1, 1))).unwrap();

    assert_eq!(
        history.recent(settings.divergence.indices_recent),
        Err(DivergenceError::InsufficientData {
            required: 41,
            actual: 40
        })
    );
}

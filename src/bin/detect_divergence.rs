use log::{debug, error, info};
use rsi_divergence::config_loader::{ConfigFormat, ConfigLoader};
use rsi_divergence::settings::AnalysisSettings;
use rsi_divergence::{Detector, DivergenceError, DivergenceType, PriceHistory, PricePoint};
use std::env;
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "사용법: detect_divergence <설정_파일.(json|toml)> <가격_파일.json> [bullish|bearish|both]";

/// 실행할 다이버전스 유형 목록
fn parse_types(arg: Option<&str>) -> Result<Vec<DivergenceType>, DivergenceError> {
    match arg.map(str::trim) {
        None | Some("both") => Ok(vec![DivergenceType::Bullish, DivergenceType::Bearish]),
        Some(value) => {
            let divergence_type: DivergenceType = value.parse()?;
            if divergence_type.has_divergence() {
                Ok(vec![divergence_type])
            } else {
                Err(DivergenceError::InvalidQuery(
                    "bullish, bearish, both 중 하나여야 합니다".to_string(),
                ))
            }
        }
    }
}

/// 가격 JSON 배열 로드
fn load_prices(path: &Path) -> Result<PriceHistory, DivergenceError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DivergenceError::DataSource(format!("{} 읽기 실패: {}", path.display(), e))
    })?;
    let points: Vec<PricePoint> = serde_json::from_str(&content).map_err(|e| {
        DivergenceError::InvalidPriceData(format!("{} 파싱 실패: {}", path.display(), e))
    })?;
    PriceHistory::new(points)
}

fn run(args: &[String]) -> Result<(), DivergenceError> {
    let settings: AnalysisSettings =
        ConfigLoader::load_from_file(Path::new(&args[1]), ConfigFormat::Auto)?;
    let detector = Detector::new(settings.detector_config()?);
    info!("탐지기 설정: {}", detector);

    let history = load_prices(Path::new(&args[2]))?;
    debug!("가격 데이터 {}개 로드", history.len());

    let window = history.recent(settings.divergence.indices_recent)?;

    for divergence_type in parse_types(args.get(3).map(String::as_str))? {
        let result = detector.detect(window, divergence_type);
        println!("[{}] {}", divergence_type.label(), result);
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    debug!("커맨드 라인 인수: {:?}", args);

    if args.len() < 3 {
        error!("인수가 충분하지 않습니다");
        println!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("다이버전스 탐지 실패: {}", err);
            println!("다이버전스 탐지 실패: {}", err);
            ExitCode::FAILURE
        }
    }
}

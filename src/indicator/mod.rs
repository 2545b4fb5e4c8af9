// 기술적 지표 모듈
// 다이버전스 탐지에 필요한 오실레이터를 제공합니다.

pub mod rsi;

pub use rsi::{RsiSeries, compute_rsi};

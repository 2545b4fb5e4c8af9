pub mod analysis;
pub mod divergence;
pub mod error;
pub mod indicator;
pub mod market;
pub mod model;
pub mod notifier;
pub mod price_history;
pub mod screener;
pub mod settings;

/// 설정 로더
pub mod config_loader;

pub use analysis::{AnalysisResult, BatchOutcome, DivergenceAnalyzer, MarketDataSource};
pub use divergence::{Detector, DetectorConfig};
pub use error::{DivergenceError, DivergenceResult};
pub use model::{DetectionResult, DivergenceType, Pivot, PivotKind, PricePoint, PriceRsiNode};
pub use price_history::PriceHistory;

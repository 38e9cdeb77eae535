pub mod analysis;

pub use analysis::{
    ActionItem, Analysis, AnalysisMetadata, AnalysisResult, KeyTerm, LevelCounts, RiskAssessment,
    RiskFactor, RiskLevel,
};

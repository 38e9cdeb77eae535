//! Server-side rendering of the input and result pages.
//!
//! The renderer trusts the shape produced by the response parser; it only
//! reshapes an [`AnalysisResult`] into view data and fills the templates.

pub mod charts;

use crate::error::AnalysisError;
use crate::models::{AnalysisResult, KeyTerm};
use askama::Template;
use charts::{capitalize, BarChart, DonutChart};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Presentation settings passed explicitly into every render call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderSettings {
    pub theme: Theme,
}

impl RenderSettings {
    pub fn new(theme: Option<Theme>) -> Self {
        Self {
            theme: theme.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiskFactorView {
    pub clause: String,
    pub level: &'static str,
    pub level_label: String,
    pub explanation: String,
    pub impact: String,
}

#[derive(Debug, Clone)]
pub struct ActionItemView {
    pub action: String,
    pub priority: &'static str,
    pub priority_label: String,
    pub deadline: Option<String>,
}

/// Everything the result template shows for a successful analysis.
#[derive(Debug, Clone)]
pub struct AnalysisView {
    pub simplified: String,
    pub overall_risk: &'static str,
    pub overall_label: String,
    pub risk_factors: Vec<RiskFactorView>,
    pub key_terms: Vec<KeyTerm>,
    pub action_items: Vec<ActionItemView>,
    pub warnings: Vec<String>,
    pub risk_chart: BarChart,
    pub priority_chart: DonutChart,
    pub text_length: usize,
    pub file_name: Option<String>,
    pub analyzed_at: String,
}

impl AnalysisView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let analysis = &result.analysis;
        let overall = analysis.risk_assessment.overall_risk;

        Self {
            simplified: analysis.simplified.clone(),
            overall_risk: overall.as_str(),
            overall_label: format!("{} Risk", capitalize(overall.as_str())),
            risk_factors: analysis
                .risk_assessment
                .risk_factors
                .iter()
                .map(|f| RiskFactorView {
                    clause: f.clause.clone(),
                    level: f.risk.as_str(),
                    level_label: capitalize(f.risk.as_str()),
                    explanation: f.explanation.clone(),
                    impact: f.impact.clone(),
                })
                .collect(),
            key_terms: analysis.key_terms.clone(),
            action_items: analysis
                .action_items
                .iter()
                .map(|a| ActionItemView {
                    action: a.action.clone(),
                    priority: a.priority.as_str(),
                    priority_label: capitalize(a.priority.as_str()),
                    deadline: a
                        .deadline
                        .as_ref()
                        .map(|d| d.trim().to_string())
                        .filter(|d| !d.is_empty()),
                })
                .collect(),
            warnings: analysis.warnings.clone(),
            risk_chart: BarChart::from_counts(analysis.risk_counts(), "Risk"),
            priority_chart: DonutChart::from_counts(analysis.priority_counts(), "Priority"),
            text_length: result.metadata.text_length,
            file_name: result.metadata.file_name.clone(),
            analyzed_at: result
                .metadata
                .timestamp
                .format("%Y-%m-%d %H:%M UTC")
                .to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub theme: &'static str,
    pub other_theme: &'static str,
    pub max_text_chars: usize,
    pub max_upload_mb: usize,
}

#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultPage {
    pub theme: &'static str,
    pub other_theme: &'static str,
    pub error: Option<String>,
    pub view: Option<AnalysisView>,
}

pub fn render_index(
    settings: &RenderSettings,
    max_text_chars: usize,
    max_upload_bytes: usize,
) -> Result<String, AnalysisError> {
    IndexPage {
        theme: settings.theme.as_str(),
        other_theme: settings.theme.toggled().as_str(),
        max_text_chars,
        max_upload_mb: max_upload_bytes / (1024 * 1024),
    }
    .render()
    .map_err(render_error)
}

/// Render the outcome of an analysis: the result, or the error panel.
pub fn render_outcome(
    outcome: &Result<AnalysisResult, AnalysisError>,
    settings: &RenderSettings,
) -> Result<String, AnalysisError> {
    let (error, view) = match outcome {
        Ok(result) => (None, Some(AnalysisView::from_result(result))),
        Err(err) => (Some(err.public_message()), None),
    };

    ResultPage {
        theme: settings.theme.as_str(),
        other_theme: settings.theme.toggled().as_str(),
        error,
        view,
    }
    .render()
    .map_err(render_error)
}

fn render_error(err: askama::Error) -> AnalysisError {
    AnalysisError::Internal(format!("Failed to render page: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActionItem, Analysis, AnalysisMetadata, RiskAssessment, RiskFactor, RiskLevel,
    };
    use chrono::Utc;

    fn result(analysis: Analysis) -> AnalysisResult {
        AnalysisResult {
            analysis,
            metadata: AnalysisMetadata {
                timestamp: Utc::now(),
                text_length: 72,
                file_name: None,
                file_size: None,
                has_query: Some(false),
            },
        }
    }

    fn renewal() -> Analysis {
        Analysis {
            simplified: "The contract renews by itself unless you cancel 90 days ahead.".into(),
            risk_assessment: RiskAssessment {
                overall_risk: RiskLevel::High,
                risk_factors: vec![RiskFactor {
                    clause: "Automatic renewal".into(),
                    risk: RiskLevel::High,
                    explanation: "Missing the window locks you in".into(),
                    impact: "Another full term of payments".into(),
                }],
            },
            key_terms: vec![],
            action_items: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn view_counts_risk_factors_by_level() {
        let view = AnalysisView::from_result(&result(renewal()));
        assert_eq!(view.risk_factors.len(), 1);
        assert_eq!(view.risk_chart.values, [1, 0, 0]);
        assert_eq!(view.priority_chart.values, [0, 0, 0]);
        assert_eq!(view.overall_label, "High Risk");
    }

    #[test]
    fn empty_sections_are_omitted() {
        let html = render_outcome(&Ok(result(renewal())), &RenderSettings::default()).unwrap();
        assert!(html.contains("Automatic renewal"));
        assert!(html.contains("High Risk"));
        assert!(!html.contains("id=\"key-terms\""));
        assert!(!html.contains("id=\"action-items\""));
        assert!(!html.contains("id=\"warnings\""));
        assert!(html.contains("data-values=\"1,0,0\""));
    }

    #[test]
    fn populated_sections_are_rendered() {
        let mut analysis = renewal();
        analysis.warnings = vec!["Renewal is automatic".into()];
        analysis.action_items = vec![
            ActionItem {
                action: "Set a calendar reminder".into(),
                priority: RiskLevel::High,
                deadline: Some("90 days before renewal".into()),
            },
            ActionItem {
                action: "Ask about early exit".into(),
                priority: RiskLevel::Low,
                deadline: None,
            },
        ];
        analysis.key_terms = vec![KeyTerm {
            term: "Renewal term".into(),
            definition: "The next contract period".into(),
            importance: "Sets how long you are bound".into(),
        }];

        let html = render_outcome(&Ok(result(analysis)), &RenderSettings::default()).unwrap();
        assert!(html.contains("id=\"key-terms\""));
        assert!(html.contains("id=\"action-items\""));
        assert!(html.contains("id=\"warnings\""));
        assert!(html.contains("90 days before renewal"));
        assert!(html.contains("Renewal is automatic"));
        assert!(html.contains("data-values=\"1,0,1\""));
    }

    #[test]
    fn errors_render_in_the_error_panel() {
        let outcome = Err(AnalysisError::Validation("Text is required".into()));
        let html = render_outcome(&outcome, &RenderSettings::default()).unwrap();
        assert!(html.contains("class=\"error-panel\""));
        assert!(html.contains("Text is required"));
        assert!(!html.contains("id=\"risk-chart\""));
    }

    #[test]
    fn output_is_html_escaped() {
        let mut analysis = renewal();
        analysis.simplified = "<script>alert(1)</script>".into();
        let html = render_outcome(&Ok(result(analysis)), &RenderSettings::default()).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn theme_comes_from_settings() {
        let settings = RenderSettings::new(Some(Theme::Dark));
        let html = render_index(&settings, 10_000, 10 * 1024 * 1024).unwrap();
        assert!(html.contains("class=\"theme-dark\""));
        assert!(html.contains("?theme=light"));
        assert!(html.contains("10 MB"));
    }
}

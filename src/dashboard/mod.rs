// src/dashboard/mod.rs
pub mod write;

pub use write::{write_document, DashboardDocument, DocumentStems};

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

use crate::chart::{ChartSpec, PipelineProfile};
use crate::error::Result;
use crate::pipeline::{run_pipeline, ChartSet};

/// Which pipeline output feeds a graph slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartRole {
    CountryCount,
    CountrySum,
    OperatorCount,
    OperatorSum,
}

impl ChartRole {
    fn pick(self, charts: &ChartSet) -> &ChartSpec {
        match self {
            ChartRole::CountryCount => &charts.country_count,
            ChartRole::CountrySum => &charts.country_sum,
            ChartRole::OperatorCount => &charts.operator_count,
            ChartRole::OperatorSum => &charts.operator_sum,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSlot {
    pub id: String,
    pub role: ChartRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingStyle {
    pub font_size: String,
    pub font_family: String,
    pub font_weight: String,
    pub margin_bottom: String,
}

impl Default for HeadingStyle {
    fn default() -> Self {
        Self {
            font_size: "40px".into(),
            font_family: "Arial".into(),
            font_weight: "bold".into(),
            margin_bottom: "30px".into(),
        }
    }
}

/// Context handed to the presentation layer at startup, one per dashboard.
/// Owns page metadata only; every refresh recomputes from the input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub name: String,
    pub heading: String,
    pub heading_style: HeadingStyle,
    /// Graph slots in page order (operators first, then countries).
    pub graphs: Vec<GraphSlot>,
    #[serde(skip)]
    profile: PipelineProfile,
}

/// What the page shows after a refresh: all four figures, or an explicit failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardView {
    Ready { figures: Vec<Figure> },
    Failed { error_kind: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub graph_id: String,
    pub chart: ChartSpec,
}

impl DashboardView {
    pub fn is_ready(&self) -> bool {
        matches!(self, DashboardView::Ready { .. })
    }

    pub fn figure(&self, graph_id: &str) -> Option<&ChartSpec> {
        match self {
            DashboardView::Ready { figures } => figures
                .iter()
                .find(|f| f.graph_id == graph_id)
                .map(|f| &f.chart),
            DashboardView::Failed { .. } => None,
        }
    }
}

impl Dashboard {
    pub fn new(profile: &PipelineProfile) -> Self {
        let prefix = profile.graph_prefix();
        let graphs = vec![
            GraphSlot {
                id: format!("{}-per-operator", prefix),
                role: ChartRole::OperatorCount,
            },
            GraphSlot {
                id: "subs-per-operator".into(),
                role: ChartRole::OperatorSum,
            },
            GraphSlot {
                id: format!("{}-per-country", prefix),
                role: ChartRole::CountryCount,
            },
            GraphSlot {
                id: "subs-per-country".into(),
                role: ChartRole::CountrySum,
            },
        ];
        Self {
            name: profile.dashboard_name.to_string(),
            heading: profile.heading(),
            heading_style: HeadingStyle::default(),
            graphs,
            profile: *profile,
        }
    }

    pub fn profile(&self) -> &PipelineProfile {
        &self.profile
    }

    /// Lay a finished chart set onto the graph slots.
    pub fn view(&self, charts: &ChartSet) -> DashboardView {
        let figures = self
            .graphs
            .iter()
            .map(|slot| Figure {
                graph_id: slot.id.clone(),
                chart: slot.role.pick(charts).clone(),
            })
            .collect();
        DashboardView::Ready { figures }
    }

    /// Turn a pipeline outcome into a view. Errors never yield partial figures.
    pub fn view_result(&self, result: Result<ChartSet>) -> DashboardView {
        match result {
            Ok(charts) => self.view(&charts),
            Err(e) => {
                error!(dashboard = %self.name, error = %e, "dashboard refresh failed");
                DashboardView::Failed {
                    error_kind: e.kind().to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Recompute every figure from `input`. Nothing is retained between calls.
    #[tracing::instrument(level = "info", skip(self, input), fields(dashboard = %self.name, path = %input.as_ref().display()))]
    pub fn refresh<P: AsRef<Path>>(&self, input: P) -> DashboardView {
        let view = self.view_result(run_pipeline(input.as_ref(), &self.profile));
        if view.is_ready() {
            info!("dashboard refreshed");
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn layout_order_differs_from_pipeline_order() {
        let dash = Dashboard::new(&PipelineProfile::OUTGOING);
        let ids: Vec<&str> = dash.graphs.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "vlrs-per-operator",
                "subs-per-operator",
                "vlrs-per-country",
                "subs-per-country"
            ]
        );
        assert_eq!(dash.name, "RoamingOutDash");
        assert_eq!(dash.heading, "VLR and Subscribers Statistics Dashboard");
    }

    #[test]
    fn refresh_maps_charts_to_slots() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"Country Name,Operator,Number of SUBS\nA,X,10\nB,Y,20\n")?;

        let dash = Dashboard::new(&PipelineProfile::INCOMING);
        let view = dash.refresh(tmp.path());
        assert!(view.is_ready());
        let chart = view.figure("hlrs-per-operator").expect("slot present");
        assert_eq!(chart.title, "Repartition of HLRs per Operator");
        let subs = view.figure("subs-per-country").expect("slot present");
        assert_eq!(subs.categories, vec!["B", "A"]);
        Ok(())
    }

    #[test]
    fn refresh_failure_is_explicit_and_empty() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"Country Name,Number of SUBS\nA,1\n")?;

        let dash = Dashboard::new(&PipelineProfile::OUTGOING);
        match dash.refresh(tmp.path()) {
            DashboardView::Failed { error_kind, .. } => assert_eq!(error_kind, "data_format"),
            other => panic!("expected failure, got {:?}", other),
        }
        Ok(())
    }
}

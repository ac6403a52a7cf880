// src/chart/mod.rs
pub mod build;
pub mod profile;

pub use build::ChartBuilder;
pub use profile::PipelineProfile;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Vertical bars, categories along x.
    Histogram,
    /// Horizontal bars, categories along y.
    HorizontalBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl ChartKind {
    /// Axis that carries the category labels.
    pub fn category_axis(&self) -> Axis {
        match self {
            ChartKind::Histogram => Axis::X,
            ChartKind::HorizontalBar => Axis::Y,
        }
    }

    pub fn value_axis(&self) -> Axis {
        match self {
            ChartKind::Histogram => Axis::Y,
            ChartKind::HorizontalBar => Axis::X,
        }
    }
}

/// How the renderer should order the category axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrder {
    /// Keep the order of `categories`.
    AsGiven,
    /// Order by value ascending, whatever the order of `categories`.
    TotalAscending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformText {
    pub min_size: u32,
    pub mode: String,
}

/// Cosmetic layout settings that travel with a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutStyle {
    pub title_font_size: u32,
    /// Horizontal title anchor, as a fraction of the plot width.
    pub title_x: f64,
    pub bar_gap: Option<f64>,
    pub axis_title_font_size: Option<u32>,
    pub font_size: Option<u32>,
    pub uniform_text: Option<UniformText>,
    pub marker_line_width: Option<f64>,
}

/// Declarative description of one chart. Renderer-agnostic; the values line
/// up index for index with the categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub hover_template: String,
    pub color: String,
    pub height: u32,
    pub category_order: CategoryOrder,
    pub layout: LayoutStyle,
}

impl ChartSpec {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.categories
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Categories in the order a renderer honouring `category_order` lays them
    /// out, starting at the axis origin (left for x, bottom for y).
    pub fn rendered_categories(&self) -> Vec<&str> {
        let mut points: Vec<(&str, f64)> = self.points().collect();
        if self.category_order == CategoryOrder::TotalAscending {
            points.sort_by(|a, b| a.1.total_cmp(&b.1));
        }
        points.into_iter().map(|(c, _)| c).collect()
    }
}

use std::collections::HashSet;

use super::{CategoryOrder, ChartKind, ChartSpec, LayoutStyle, PipelineProfile, UniformText};
use crate::aggregate::AggregateSeries;
use crate::error::{Result, RoamingError};

const HISTOGRAM_HEIGHT: u32 = 600;
const HISTOGRAM_BAR_GAP: f64 = 0.01;
const HISTOGRAM_TITLE_X: f64 = 0.435;
const BAR_HEIGHT: u32 = 800;
const BAR_TITLE_X: f64 = 0.5;
const TITLE_FONT_SIZE: u32 = 30;
const AXIS_TITLE_FONT_SIZE: u32 = 18;
const BAR_FONT_SIZE: u32 = 14;
const UNIFORM_TEXT_MIN_SIZE: u32 = 12;
const MARKER_LINE_WIDTH: f64 = 1.0;

/// Text that varies per chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub hover_template: String,
}

/// Turns aggregate series into chart specs using one profile's labels.
/// Pure: the same series always produces the same spec.
#[derive(Debug, Clone, Copy)]
pub struct ChartBuilder<'a> {
    profile: &'a PipelineProfile,
}

impl<'a> ChartBuilder<'a> {
    pub fn new(profile: &'a PipelineProfile) -> Self {
        Self { profile }
    }

    pub fn country_count(&self, series: &AggregateSeries) -> Result<ChartSpec> {
        let r = self.profile.registers();
        self.histogram(
            series,
            ChartLabels {
                title: format!("{} per Country", r),
                x_label: "Country".into(),
                y_label: format!("Number of {}", r),
                hover_template: format!("%{{y}} {} in %{{x}}<extra></extra>", r),
            },
        )
    }

    pub fn country_sum(&self, series: &AggregateSeries) -> Result<ChartSpec> {
        self.histogram(
            series,
            ChartLabels {
                title: "Subscribers per Country".into(),
                x_label: "Country".into(),
                y_label: self.profile.subscriber_axis_label.into(),
                hover_template: format!(
                    "%{{y}} {} in %{{x}}<extra></extra>",
                    self.profile.subscriber_hover_label
                ),
            },
        )
    }

    pub fn operator_count(&self, series: &AggregateSeries) -> Result<ChartSpec> {
        let r = self.profile.registers();
        self.horizontal_bar(
            series,
            ChartLabels {
                title: format!("Repartition of {} per Operator", r),
                x_label: format!("Number of {}", r),
                y_label: "Operator".into(),
                hover_template: format!("%{{x}} {} at %{{y}}<extra></extra>", r),
            },
        )
    }

    pub fn operator_sum(&self, series: &AggregateSeries) -> Result<ChartSpec> {
        self.horizontal_bar(
            series,
            ChartLabels {
                title: "Repartition of Subscribers per Operator".into(),
                x_label: "Number of Subscribers".into(),
                y_label: "Operator".into(),
                hover_template: "%{x} Subscribers at %{y}<extra></extra>".into(),
            },
        )
    }

    /// Dense vertical bars in series order (largest first, left to right).
    pub fn histogram(&self, series: &AggregateSeries, labels: ChartLabels) -> Result<ChartSpec> {
        let (categories, values) = split_series(series)?;
        Ok(ChartSpec {
            kind: ChartKind::Histogram,
            categories,
            values,
            title: labels.title,
            x_label: labels.x_label,
            y_label: labels.y_label,
            hover_template: labels.hover_template,
            color: self.profile.color.to_string(),
            height: HISTOGRAM_HEIGHT,
            category_order: CategoryOrder::AsGiven,
            layout: LayoutStyle {
                title_font_size: TITLE_FONT_SIZE,
                title_x: HISTOGRAM_TITLE_X,
                bar_gap: Some(HISTOGRAM_BAR_GAP),
                axis_title_font_size: None,
                font_size: None,
                uniform_text: Some(UniformText {
                    min_size: UNIFORM_TEXT_MIN_SIZE,
                    mode: "hide".into(),
                }),
                marker_line_width: None,
            },
        })
    }

    /// Horizontal bars. Categories stay in series order; the renderer is told
    /// to sort the y axis by total ascending so the largest bar sits on top.
    pub fn horizontal_bar(
        &self,
        series: &AggregateSeries,
        labels: ChartLabels,
    ) -> Result<ChartSpec> {
        let (categories, values) = split_series(series)?;
        Ok(ChartSpec {
            kind: ChartKind::HorizontalBar,
            categories,
            values,
            title: labels.title,
            x_label: labels.x_label,
            y_label: labels.y_label,
            hover_template: labels.hover_template,
            color: self.profile.color.to_string(),
            height: BAR_HEIGHT,
            category_order: CategoryOrder::TotalAscending,
            layout: LayoutStyle {
                title_font_size: TITLE_FONT_SIZE,
                title_x: BAR_TITLE_X,
                bar_gap: None,
                axis_title_font_size: Some(AXIS_TITLE_FONT_SIZE),
                font_size: Some(BAR_FONT_SIZE),
                uniform_text: None,
                marker_line_width: Some(MARKER_LINE_WIDTH),
            },
        })
    }
}

/// Validate a series and split it into parallel category/value vectors.
fn split_series(series: &AggregateSeries) -> Result<(Vec<String>, Vec<f64>)> {
    let mut seen = HashSet::with_capacity(series.len());
    let mut categories = Vec::with_capacity(series.len());
    let mut values = Vec::with_capacity(series.len());

    for (i, entry) in series.entries().iter().enumerate() {
        if entry.key.is_empty() {
            return Err(RoamingError::data_format(format!(
                "series `{}` has an empty key at position {}",
                series.group_column, i
            )));
        }
        if !seen.insert(entry.key.as_str()) {
            return Err(RoamingError::data_format(format!(
                "series `{}` repeats key `{}`",
                series.group_column, entry.key
            )));
        }
        if !entry.value.is_finite() {
            return Err(RoamingError::data_format(format!(
                "series `{}` has a non-finite value for `{}`",
                series.group_column, entry.key
            )));
        }
        categories.push(entry.key.clone());
        values.push(entry.value);
    }

    Ok((categories, values))
}

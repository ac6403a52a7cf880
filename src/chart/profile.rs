use crate::config::{ColumnNames, Direction};

pub const ACCENT_COLOR: &str = "#FF5E0E";

/// Display metadata that distinguishes the outgoing (VLR) and incoming (HLR)
/// dashboards. The aggregation itself is identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineProfile {
    pub direction: Direction,
    /// Register counted by the export: "VLR" or "HLR".
    pub register: &'static str,
    pub dashboard_name: &'static str,
    /// Value-axis label of the subscribers-per-country histogram.
    pub subscriber_axis_label: &'static str,
    /// Noun in the subscribers-per-country hover text.
    pub subscriber_hover_label: &'static str,
    pub color: &'static str,
    pub columns: ColumnNames,
}

impl PipelineProfile {
    pub const OUTGOING: PipelineProfile = PipelineProfile {
        direction: Direction::Outgoing,
        register: "VLR",
        dashboard_name: "RoamingOutDash",
        subscriber_axis_label: "Subscribers",
        subscriber_hover_label: "Subscribers",
        color: ACCENT_COLOR,
        columns: ColumnNames::DEFAULT,
    };

    pub const INCOMING: PipelineProfile = PipelineProfile {
        direction: Direction::Incoming,
        register: "HLR",
        dashboard_name: "RoamingInDash",
        subscriber_axis_label: "Number of Subscribers",
        subscriber_hover_label: "Subscriber",
        color: ACCENT_COLOR,
        columns: ColumnNames::DEFAULT,
    };

    pub fn for_direction(direction: Direction) -> &'static PipelineProfile {
        match direction {
            Direction::Outgoing => &Self::OUTGOING,
            Direction::Incoming => &Self::INCOMING,
        }
    }

    pub fn heading(&self) -> String {
        format!("{} and Subscribers Statistics Dashboard", self.register)
    }

    /// Plural register used in labels, e.g. "VLRs".
    pub fn registers(&self) -> String {
        format!("{}s", self.register)
    }

    /// Lowercase slug used in graph ids, e.g. "vlrs".
    pub fn graph_prefix(&self) -> String {
        self.registers().to_lowercase()
    }
}

// src/pipeline.rs
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{io::Read, path::Path, path::PathBuf};
use tracing::{info, warn};

use crate::aggregate::{count_by, sum_by};
use crate::chart::{ChartBuilder, ChartSpec, PipelineProfile};
use crate::config::Direction;
use crate::error::Result;
use crate::load::{load_table, read_table, Table};

/// The four charts of one dashboard, in the fixed pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    pub country_count: ChartSpec,
    pub country_sum: ChartSpec,
    pub operator_count: ChartSpec,
    pub operator_sum: ChartSpec,
}

impl ChartSet {
    pub fn into_tuple(self) -> (ChartSpec, ChartSpec, ChartSpec, ChartSpec) {
        (
            self.country_count,
            self.country_sum,
            self.operator_count,
            self.operator_sum,
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartSpec> {
        [
            &self.country_count,
            &self.country_sum,
            &self.operator_count,
            &self.operator_sum,
        ]
        .into_iter()
    }
}

/// Aggregate an already-loaded table and build its four charts.
pub fn build_charts(table: &Table, profile: &PipelineProfile) -> Result<ChartSet> {
    let cols = &profile.columns;
    let country_count = count_by(table, cols.country)?;
    let country_sum = sum_by(table, cols.country, cols.subscribers)?;
    let operator_count = count_by(table, cols.operator)?;
    let operator_sum = sum_by(table, cols.operator, cols.subscribers)?;

    let builder = ChartBuilder::new(profile);
    Ok(ChartSet {
        country_count: builder.country_count(&country_count)?,
        country_sum: builder.country_sum(&country_sum)?,
        operator_count: builder.operator_count(&operator_count)?,
        operator_sum: builder.operator_sum(&operator_sum)?,
    })
}

#[tracing::instrument(level = "info", skip(path, profile), fields(path = %path.as_ref().display(), direction = profile.direction.as_str()))]
pub fn run_pipeline<P: AsRef<Path>>(path: P, profile: &PipelineProfile) -> Result<ChartSet> {
    let table = load_table(path, &profile.columns.required())?;
    let charts = build_charts(&table, profile)?;
    info!(
        rows = table.len(),
        countries = charts.country_count.len(),
        operators = charts.operator_count.len(),
        "built charts"
    );
    Ok(charts)
}

pub fn run_pipeline_reader<R: Read>(reader: R, profile: &PipelineProfile) -> Result<ChartSet> {
    let table = read_table(reader, &profile.columns.required())?;
    build_charts(&table, profile)
}

/// Outgoing roaming export → VLR charts.
pub fn roaming_out<P: AsRef<Path>>(path: P) -> Result<ChartSet> {
    run_pipeline(path, &PipelineProfile::OUTGOING)
}

/// Incoming roaming export → HLR charts.
pub fn roaming_in<P: AsRef<Path>>(path: P) -> Result<ChartSet> {
    run_pipeline(path, &PipelineProfile::INCOMING)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub direction: Direction,
    pub input: PathBuf,
}

/// Run independent invocations in parallel. One result per job, in job order.
pub fn run_batch(jobs: &[Job]) -> Vec<Result<ChartSet>> {
    jobs.par_iter()
        .map(|job| {
            let profile = PipelineProfile::for_direction(job.direction);
            let res = run_pipeline(&job.input, profile);
            if let Err(e) = &res {
                warn!(input = %job.input.display(), error = %e, "pipeline failed");
            }
            res
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::init_test_logging;
    use anyhow::Result;
    use std::io::{Cursor, Write};
    use tempfile::{tempdir, NamedTempFile};

    const SAMPLE: &str = "\
Country Name,Operator,Number of SUBS
A,X,10
B,X,5
A,Y,3
";

    fn write_csv(content: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;
        Ok(tmp)
    }

    #[test]
    fn outgoing_pipeline_matches_worked_example() -> Result<()> {
        init_test_logging();
        let tmp = write_csv(SAMPLE)?;
        let (cc, cs, oc, os) = roaming_out(tmp.path())?.into_tuple();

        assert_eq!(cc.categories, vec!["A", "B"]);
        assert_eq!(cc.values, vec![2.0, 1.0]);
        assert_eq!(cs.values, vec![13.0, 5.0]);
        assert_eq!(oc.categories, vec!["X", "Y"]);
        assert_eq!(oc.values, vec![2.0, 1.0]);
        assert_eq!(os.values, vec![15.0, 3.0]);
        assert_eq!(cc.title, "VLRs per Country");
        Ok(())
    }

    #[test]
    fn incoming_pipeline_uses_hlr_labels() -> Result<()> {
        let tmp = write_csv(SAMPLE)?;
        let charts = roaming_in(tmp.path())?;
        let titles: Vec<&str> = charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "HLRs per Country",
                "Subscribers per Country",
                "Repartition of HLRs per Operator",
                "Repartition of Subscribers per Operator",
            ]
        );
        Ok(())
    }

    #[test]
    fn identical_input_gives_identical_output() -> Result<()> {
        let content = "Country Name,Operator,Number of SUBS\nC1,O1,1\nC2,O2,1\nC1,O3,1\nC3,O1,2\nC4,O2,2\n";
        let first = serde_json::to_vec(&run_pipeline_reader(
            Cursor::new(content),
            &PipelineProfile::OUTGOING,
        )?)?;
        let second = serde_json::to_vec(&run_pipeline_reader(
            Cursor::new(content),
            &PipelineProfile::OUTGOING,
        )?)?;
        assert_eq!(first, second);

        let charts = run_pipeline_reader(Cursor::new(content), &PipelineProfile::OUTGOING)?;
        assert_eq!(charts.country_count.categories, vec!["C1", "C2", "C3", "C4"]);
        assert_eq!(charts.country_sum.categories, vec!["C1", "C3", "C4", "C2"]);
        Ok(())
    }

    #[test]
    fn repeated_extra_column_does_not_block_aggregation() -> Result<()> {
        let charts = run_pipeline_reader(
            Cursor::new("Country Name,Operator,Number of SUBS,Note,Note\nA,X,10,a,b\n"),
            &PipelineProfile::OUTGOING,
        )?;
        assert_eq!(charts.country_count.categories, vec!["A"]);
        assert_eq!(charts.operator_sum.values, vec![10.0]);
        Ok(())
    }

    #[test]
    fn header_only_gives_four_empty_charts() -> Result<()> {
        let charts = run_pipeline_reader(
            Cursor::new("Country Name,Operator,Number of SUBS\n"),
            &PipelineProfile::INCOMING,
        )?;
        assert!(charts.iter().all(|c| c.is_empty() && c.values.is_empty()));
        Ok(())
    }

    #[test]
    fn missing_operator_column_fails_whole_run() {
        let err = run_pipeline_reader(
            Cursor::new("Country Name,Number of SUBS\nA,1\n"),
            &PipelineProfile::OUTGOING,
        )
        .unwrap_err();
        assert!(err.is_data_format());
    }

    #[test]
    fn batch_keeps_job_order_and_isolates_failures() -> Result<()> {
        let dir = tempdir()?;
        let good = dir.path().join("out.csv");
        std::fs::write(&good, SAMPLE)?;
        let jobs = vec![
            Job {
                direction: Direction::Outgoing,
                input: good.clone(),
            },
            Job {
                direction: Direction::Incoming,
                input: dir.path().join("missing.csv"),
            },
            Job {
                direction: Direction::Incoming,
                input: good,
            },
        ];

        let results = run_batch(&jobs);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().map(|c| c.country_count.title.clone()).ok(),
            Some("VLRs per Country".to_string())
        );
        assert!(results[1].as_ref().unwrap_err().is_not_found());
        assert_eq!(
            results[2].as_ref().map(|c| c.country_count.title.clone()).ok(),
            Some("HLRs per Country".to_string())
        );
        Ok(())
    }
}

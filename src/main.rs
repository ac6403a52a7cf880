use anyhow::{bail, Context, Result};
use roamstats::{
    config::{AppConfig, Direction, JobConfig},
    dashboard::{write_document, Dashboard, DocumentStems},
    pipeline::{run_batch, Job},
    PipelineProfile,
};
use std::{env, time::Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "usage: roamstats <outgoing|incoming> <input.csv|glob>...\n       roamstats --config <config.yaml>";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    // ─── 1) resolve config ───────────────────────────────────────────
    let cfg = parse_args(&args)?;

    // ─── 2) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_filter.as_str()));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
    info!(jobs = cfg.jobs.len(), output_dir = %cfg.output_dir.display(), "startup");

    // ─── 3) expand inputs ────────────────────────────────────────────
    let mut failures = 0usize;
    let mut jobs = Vec::new();
    for expanded in cfg.expand_jobs() {
        match expanded {
            Ok((direction, input)) => jobs.push(Job { direction, input }),
            Err(e) => {
                error!(error = %e, "no input");
                failures += 1;
            }
        }
    }
    if jobs.is_empty() {
        bail!("no input files to process");
    }

    // ─── 4) run pipelines in parallel ────────────────────────────────
    let start = Instant::now();
    let results = run_batch(&jobs);
    info!(elapsed = ?start.elapsed(), "pipelines finished");

    // ─── 5) publish one document per input ───────────────────────────
    let mut stems = DocumentStems::new();
    for (job, result) in jobs.iter().zip(results) {
        let dashboard = Dashboard::new(PipelineProfile::for_direction(job.direction));
        if result.is_err() {
            failures += 1;
        }
        let view = dashboard.view_result(result);
        let stem = stems.next_stem(&dashboard.name, &job.input);
        let path = write_document(&dashboard, &view, &job.input, &cfg.output_dir, &stem)
            .with_context(|| format!("writing dashboard for {}", job.input.display()))?;
        info!(path = %path.display(), ready = view.is_ready(), "published");
    }

    if failures > 0 {
        warn!(failures, "finished with failures");
        bail!("{} input(s) failed", failures);
    }
    info!("all done");
    Ok(())
}

/// `--config <file>` alone, or a direction followed by one or more inputs.
fn parse_args(args: &[String]) -> Result<AppConfig> {
    match args.first().map(String::as_str) {
        Some("--config") => {
            if args.len() != 2 {
                bail!(USAGE);
            }
            let path = &args[1];
            AppConfig::load(path).with_context(|| format!("loading config {}", path))
        }
        Some(dir) => {
            let direction = Direction::parse(dir)
                .with_context(|| format!("unknown direction `{}`\n{}", dir, USAGE))?;
            if args.len() < 2 {
                bail!(USAGE);
            }
            let mut cfg = AppConfig::from_env();
            cfg.jobs = args[1..]
                .iter()
                .map(|input| JobConfig {
                    direction,
                    input: input.clone(),
                })
                .collect();
            Ok(cfg)
        }
        None => bail!(USAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn config_flag_takes_exactly_one_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("roamstats.yaml");
        fs::write(&path, "jobs:\n  - direction: incoming\n    input: in.csv\n")?;
        let path = path.display().to_string();

        let cfg = parse_args(&args(&["--config", &path]))?;
        assert_eq!(cfg.jobs.len(), 1);

        let err = parse_args(&args(&["--config", &path, "extra.csv"])).unwrap_err();
        assert!(err.to_string().contains("usage"));
        assert!(parse_args(&args(&["--config"])).is_err());
        Ok(())
    }

    #[test]
    fn direction_args_become_jobs() -> Result<()> {
        let cfg = parse_args(&args(&["outgoing", "a.csv", "b/*.csv"]))?;
        assert_eq!(cfg.jobs.len(), 2);
        assert!(cfg.jobs.iter().all(|j| j.direction == Direction::Outgoing));
        assert!(parse_args(&args(&["outgoing"])).is_err());
        assert!(parse_args(&args(&["sideways", "a.csv"])).is_err());
        assert!(parse_args(&[]).is_err());
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    collections::HashSet,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::{Dashboard, DashboardView};
use crate::error::Result;

/// What gets handed to the page renderer: page metadata plus the latest view.
#[derive(Debug, Serialize)]
pub struct DashboardDocument<'a> {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub dashboard: &'a Dashboard,
    pub view: &'a DashboardView,
}

/// Serialize `view` for `dashboard` to `<dir>/<file_stem>.json` and return the path.
///
/// Written to a hidden temp file first, then renamed over the target, so a
/// reader never sees a half-written document.
pub fn write_document<P: AsRef<Path>>(
    dashboard: &Dashboard,
    view: &DashboardView,
    source: &Path,
    dir: P,
    file_stem: &str,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}.json", file_stem));
    let tmp_path = dir.join(format!(".{}.json.tmp", file_stem));

    let doc = DashboardDocument {
        generated_at: Utc::now(),
        source: source.display().to_string(),
        dashboard,
        view,
    };

    let written = write_json(&tmp_path, &doc)
        .and_then(|()| fs::rename(&tmp_path, &path).map_err(Into::into));
    if let Err(e) = written {
        if let Err(rm) = fs::remove_file(&tmp_path) {
            warn!(path = %tmp_path.display(), error = %rm, "could not remove temp document");
        }
        return Err(e);
    }

    debug!(path = %path.display(), "wrote dashboard document");
    Ok(path)
}

fn write_json(path: &Path, doc: &DashboardDocument<'_>) -> Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut out, doc)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Hands out one output file stem per input, `<dashboard>-<input stem>`.
/// A stem already handed out gets a `-2`, `-3`, ... suffix, so inputs that
/// share a file name in different directories never overwrite each other.
#[derive(Debug, Default)]
pub struct DocumentStems {
    used: HashSet<String>,
}

impl DocumentStems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_stem(&mut self, dashboard: &str, input: &Path) -> String {
        let input_stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "input".to_string());
        let base = format!("{}-{}", dashboard, input_stem);

        let mut candidate = base.clone();
        let mut n = 1;
        while !self.used.insert(candidate.clone()) {
            n += 1;
            candidate = format!("{}-{}", base, n);
        }
        candidate
    }
}

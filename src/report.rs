use serde_derive::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::{FilteredAggregate, PlayerSummary};
use crate::error::Error;

pub const REPORT_FILE_NAME: &str = "performance_report.txt";

/// Data behind one player's speed, endurance and agility charts.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub track_id: u32,
    pub speed: Vec<f32>,
    pub cumulative_distance: Vec<f32>,
    pub direction_changes: u32,
}

impl PlotSeries {
    pub fn new(track_id: u32, summary: &PlayerSummary) -> Self {
        Self {
            track_id,
            speed: summary.record.speed.clone(),
            cumulative_distance: summary.record.cumulative_distance(),
            direction_changes: summary.record.direction_changes,
        }
    }

    pub fn file_name(&self) -> String {
        format!("player_{}_metrics.json", self.track_id)
    }
}

/// Text report, one block per retained player separated by blank lines.
pub struct Report<'a>(pub &'a FilteredAggregate);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, p) in self.0.iter() {
            writeln!(f, "Player {}:", id)?;
            writeln!(f, "- Average Speed: {:.2} m/s", p.average_speed)?;
            writeln!(f, "- Total Distance Covered: {:.2} pixels", p.total_distance)?;
            writeln!(f, "- Agility Score: {}", p.record.direction_changes)?;
            writeln!(f, "- Performance Rating: {:.2}/10", p.performance_score)?;
            writeln!(f)?;
        }

        Ok(())
    }
}

pub fn render_report(aggregate: &FilteredAggregate) -> String {
    Report(aggregate).to_string()
}

pub fn plot_series(aggregate: &FilteredAggregate) -> Vec<PlotSeries> {
    aggregate
        .iter()
        .map(|(&id, summary)| PlotSeries::new(id, summary))
        .collect()
}

/// Writes the text report and one plot series file per player into `dir`.
/// Returns the paths written, report first.
pub fn emit<P: AsRef<Path>>(aggregate: &FilteredAggregate, dir: P) -> Result<Vec<PathBuf>, Error> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(aggregate.players.len() + 1);

    let report_path = dir.join(REPORT_FILE_NAME);
    fs::write(&report_path, render_report(aggregate))?;
    written.push(report_path);

    for series in plot_series(aggregate) {
        let path = dir.join(series.file_name());
        fs::write(&path, serde_json::to_string_pretty(&series)?)?;
        written.push(path);
    }

    log::info!("Performance metrics saved in {}", dir.display());

    Ok(written)
}

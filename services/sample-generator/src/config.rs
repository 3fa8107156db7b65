//! Sample generation jobs.
//!
//! Jobs come either from a built-in job set or from a YAML job file:
//!
//! ```yaml
//! output_dir: ${SAMPLE_OUTPUT_DIR:-/tmp}
//! format: netcdf4
//! jobs:
//!   - scenario: gbr4-v2
//!     start: 2014-12-01T00:00:00+10:00
//!     end: 2014-12-02T00:00:00+10:00
//!     outputs: [gbr4_v2_2014-12-01.nc]
//!     missing_data: false
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, TimeZone};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Offset of Australia/Brisbane, which has no daylight saving.
const BRISBANE_OFFSET_SECS: i32 = 10 * 3600;

// ============================================================================
// Scenarios
// ============================================================================

/// Kind of sample file a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// GBR 4km hydrodynamic model, hourly.
    Gbr4V2,
    /// GBR 1km hydrodynamic model, hourly.
    Gbr1V2,
    /// Two hypercubes with different grids in the same file.
    Gbr4V2MultiHypercubes,
    /// GBR 4km biogeochemical model, daily.
    Gbr4Bgc,
    /// NOAA WaveWatch III, every 3 hours. Writes a direction file and a height file.
    Noaa,
    /// 100x100 grid exercising every variable shape.
    Test,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Gbr4V2 => "gbr4-v2",
            Scenario::Gbr1V2 => "gbr1-v2",
            Scenario::Gbr4V2MultiHypercubes => "gbr4-v2-multi-hypercubes",
            Scenario::Gbr4Bgc => "gbr4-bgc",
            Scenario::Noaa => "noaa",
            Scenario::Test => "test",
        }
    }

    /// Number of files the scenario writes.
    pub fn output_count(&self) -> usize {
        match self {
            Scenario::Noaa => 2,
            _ => 1,
        }
    }

    /// Seed used when the job does not give one.
    pub fn default_seed(&self) -> u64 {
        match self {
            Scenario::Gbr4V2 => 4280,
            Scenario::Gbr1V2 => 9833,
            Scenario::Gbr4V2MultiHypercubes => 5610,
            Scenario::Gbr4Bgc => 3958,
            Scenario::Noaa => 9584,
            Scenario::Test => 6930,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Jobs
// ============================================================================

/// One generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub scenario: Scenario,

    /// First frame, inclusive.
    pub start: DateTime<FixedOffset>,

    /// Last frame, exclusive.
    pub end: DateTime<FixedOffset>,

    /// Output files, relative to the output directory unless absolute.
    pub outputs: Vec<String>,

    /// Drop some frames and some variables from some frames.
    #[serde(default)]
    pub missing_data: bool,

    #[serde(default)]
    pub seed: Option<u64>,
}

impl JobConfig {
    pub fn new(
        scenario: Scenario,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        outputs: &[&str],
    ) -> Self {
        Self {
            scenario,
            start,
            end,
            outputs: outputs.iter().map(|o| o.to_string()).collect(),
            missing_data: false,
            seed: None,
        }
    }

    pub fn with_missing_data(mut self) -> Self {
        self.missing_data = true;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| self.scenario.default_seed())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.start < self.end,
            "{} job: start {} is not before end {}",
            self.scenario,
            self.start,
            self.end
        );
        anyhow::ensure!(
            self.outputs.len() == self.scenario.output_count(),
            "{} job: expected {} output file(s), got {}",
            self.scenario,
            self.scenario.output_count(),
            self.outputs.len()
        );
        anyhow::ensure!(
            self.outputs.iter().all(|o| !o.trim().is_empty()),
            "{} job: output file names cannot be empty",
            self.scenario
        );
        Ok(())
    }
}

/// Contents of a YAML job file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub output_dir: Option<String>,

    /// `netcdf4` or `classic`.
    #[serde(default)]
    pub format: Option<String>,

    pub jobs: Vec<JobConfig>,
}

/// Built-in job collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobSet {
    /// Sample files for the animation generator tests.
    Ncanimate,
    /// Monthly GBR4 files for the download manager tests.
    DownloadManager,
    /// One large file using every variable shape.
    Test,
}

impl JobSet {
    pub fn jobs(self) -> Result<Vec<JobConfig>> {
        match self {
            JobSet::Ncanimate => ncanimate_jobs(),
            JobSet::DownloadManager => download_manager_jobs(),
            JobSet::Test => Ok(vec![JobConfig::new(
                Scenario::Test,
                brisbane(2019, 1, 1, 0)?,
                brisbane(2019, 1, 3, 0)?,
                &["test.nc"],
            )]),
        }
    }
}

/// Local time in Brisbane.
pub fn brisbane(year: i32, month: u32, day: u32, hour: u32) -> Result<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(BRISBANE_OFFSET_SECS).context("Invalid Brisbane offset")?;
    offset
        .with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .with_context(|| format!("Invalid date {}-{:02}-{:02} {:02}h", year, month, day, hour))
}

fn ncanimate_jobs() -> Result<Vec<JobConfig>> {
    Ok(vec![
        JobConfig::new(
            Scenario::Gbr4V2,
            brisbane(2014, 12, 1, 0)?,
            brisbane(2014, 12, 2, 0)?,
            &["gbr4_v2_2014-12-01.nc"],
        ),
        JobConfig::new(
            Scenario::Gbr4V2,
            brisbane(2014, 12, 2, 0)?,
            brisbane(2014, 12, 3, 0)?,
            &["gbr4_v2_2014-12-02_missingFrames.nc"],
        )
        .with_missing_data(),
        // Small replacement for a 2 hours file
        JobConfig::new(
            Scenario::Gbr4V2,
            brisbane(2010, 9, 1, 0)?,
            brisbane(2010, 9, 1, 2)?,
            &["gbr4_v2_2010-09-01_00h00-02h00.nc"],
        )
        .with_missing_data(),
        JobConfig::new(
            Scenario::Gbr1V2,
            brisbane(2014, 12, 1, 0)?,
            brisbane(2014, 12, 2, 0)?,
            &["gbr1_2014-12-01.nc"],
        ),
        JobConfig::new(
            Scenario::Gbr1V2,
            brisbane(2014, 12, 2, 0)?,
            brisbane(2014, 12, 3, 0)?,
            &["gbr1_2014-12-02.nc"],
        ),
        JobConfig::new(
            Scenario::Gbr4V2MultiHypercubes,
            brisbane(2000, 1, 1, 0)?,
            brisbane(2000, 1, 2, 0)?,
            &["gbr4_v2_2000-01-01_multiHypercubes.nc"],
        ),
        JobConfig::new(
            Scenario::Gbr4Bgc,
            brisbane(2014, 12, 1, 0)?,
            brisbane(2015, 1, 1, 0)?,
            &["gbr4_bgc_2014-12.nc"],
        ),
        JobConfig::new(
            Scenario::Noaa,
            brisbane(2014, 12, 1, 0)?,
            brisbane(2015, 1, 1, 0)?,
            &["multi_1.glo_30m.dp.201412.nc", "multi_1.glo_30m.hs.201412.nc"],
        ),
    ])
}

fn download_manager_jobs() -> Result<Vec<JobConfig>> {
    let mut jobs = Vec::new();
    for (year, month) in [(2018, 10), (2018, 11), (2018, 12), (2019, 1), (2019, 2)] {
        let name = format!("gbr4_simple_{}-{:02}.nc", year, month);
        jobs.push(JobConfig::new(
            Scenario::Gbr4V2,
            brisbane(year, month, 1, 0)?,
            brisbane(year, month, 2, 0)?,
            &[name.as_str()],
        ));

        // Same month, different values
        if (year, month) == (2018, 12) {
            jobs.push(
                JobConfig::new(
                    Scenario::Gbr4V2,
                    brisbane(year, month, 1, 0)?,
                    brisbane(year, month, 2, 0)?,
                    &["gbr4_simple_2018-12_modified.nc"],
                )
                .with_seed(1000),
            );
        }
    }
    Ok(jobs)
}

// ============================================================================
// Loading
// ============================================================================

/// Load a YAML job file, substituting `${VAR}` and `${VAR:-default}`.
pub fn load_job_file<P: AsRef<Path>>(path: P) -> Result<JobFile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file from {:?}", path))?;

    let expanded = shellexpand::env(&content)
        .with_context(|| format!("Failed to expand environment variables in {:?}", path))?;

    let file: JobFile = serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse job file {:?}", path))?;

    anyhow::ensure!(!file.jobs.is_empty(), "Job file {:?} lists no jobs", path);
    for job in &file.jobs {
        job.validate()?;
    }

    Ok(file)
}

/// Resolve an output name against the output directory, expanding `~` and
/// environment variables.
pub fn resolve_output(output_dir: &Path, output: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(output)
        .with_context(|| format!("Failed to expand output path {}", output))?;
    let path = PathBuf::from(expanded.into_owned());
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(output_dir.join(path))
    }
}

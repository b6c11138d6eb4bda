//! # Project Data Structures
//!
//! A `Project` groups the scaffold calculations for one site. Projects
//! serialize to `.sfp` files as human-readable JSON; inputs and results are
//! stored verbatim, exactly as the engine takes and returns them.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (format version, site, ids, timestamps)
//! ├── settings: EngineSettings (clearances, stage height, ...)
//! └── jobs: HashMap<Uuid, ScaffoldJob> (input + last result)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use scaffold_core::calculations::ScaffoldInput;
//! use scaffold_core::project::Project;
//!
//! let mut project = Project::new("Riverside Block C", "26-014", "Acme Builders");
//! let id = project.add_job("North wing", ScaffoldInput {
//!     width_ns: 10_010,
//!     width_ew: 9_100,
//!     standard_height: 6_000,
//!     ..ScaffoldInput::default()
//! });
//!
//! let result = project.run_job(&id).unwrap();
//! assert!(result.num_stages >= 1);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{calc_all_with, ScaffoldInput, ScaffoldResult};
use crate::settings::EngineSettings;

/// Layout version written to `.sfp` files; bump when a field changes meaning
pub const FORMAT_VERSION: u32 = 1;

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (format version, site, client)
    pub meta: ProjectMetadata,

    /// Engine settings every job in this project is calculated with
    #[serde(default)]
    pub settings: EngineSettings,

    /// All calculation jobs, keyed by UUID
    pub jobs: HashMap<Uuid, ScaffoldJob>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Arguments
    ///
    /// * `site_name` - Name of the building site
    /// * `project_id` - Project number (e.g., "26-014")
    /// * `client` - Client name
    pub fn new(site_name: impl Into<String>, project_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                format_version: FORMAT_VERSION,
                site_name: site_name.into(),
                project_id: project_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: EngineSettings::default(),
            jobs: HashMap::new(),
        }
    }

    /// Add a calculation job (not yet calculated). Returns its UUID.
    pub fn add_job(&mut self, label: impl Into<String>, input: ScaffoldInput) -> Uuid {
        let id = Uuid::new_v4();
        self.jobs.insert(id, ScaffoldJob::new(label, input));
        self.touch();
        id
    }

    /// Remove a job by UUID.
    pub fn remove_job(&mut self, id: &Uuid) -> Option<ScaffoldJob> {
        let job = self.jobs.remove(id);
        if job.is_some() {
            self.touch();
        }
        job
    }

    /// Get a job by UUID.
    pub fn get_job(&self, id: &Uuid) -> Option<&ScaffoldJob> {
        self.jobs.get(id)
    }

    /// Calculate one job with the project's settings and store the result.
    pub fn run_job(&mut self, id: &Uuid) -> Option<&ScaffoldResult> {
        let settings = &self.settings;
        let job = self.jobs.get_mut(id)?;
        job.run(settings);
        self.meta.modified = Utc::now();
        self.jobs.get(id).and_then(|job| job.result.as_ref())
    }

    /// Recalculate every job, e.g. after the settings changed.
    pub fn run_all(&mut self) {
        let settings = &self.settings;
        for job in self.jobs.values_mut() {
            job.run(settings);
        }
        self.touch();
    }

    /// Jobs sorted by label for stable listings
    pub fn jobs_by_label(&self) -> Vec<(&Uuid, &ScaffoldJob)> {
        let mut jobs: Vec<_> = self.jobs.iter().collect();
        jobs.sort_by(|a, b| a.1.label.cmp(&b.1.label));
        jobs
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// File layout version, see [`FORMAT_VERSION`]
    pub format_version: u32,

    /// Building site name
    pub site_name: String,

    /// Project number
    pub project_id: String,

    /// Client name
    pub client: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// One calculation: its input and the last result computed from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldJob {
    /// User label (e.g., "North wing")
    pub label: String,

    pub input: ScaffoldInput,

    /// Last result; `None` until the job is run
    pub result: Option<ScaffoldResult>,

    /// When `result` was computed
    pub calculated_at: Option<DateTime<Utc>>,
}

impl ScaffoldJob {
    pub fn new(label: impl Into<String>, input: ScaffoldInput) -> Self {
        ScaffoldJob {
            label: label.into(),
            input,
            result: None,
            calculated_at: None,
        }
    }

    /// Recalculate with the given settings
    pub fn run(&mut self, settings: &EngineSettings) {
        self.result = Some(calc_all_with(&self.input, settings));
        self.calculated_at = Some(Utc::now());
    }
}

//! # Project Files
//!
//! A `.sfp` file is one [`Project`] as pretty JSON. Saves write a sibling
//! `.sfp.tmp` and rename it over the target, so readers only ever see a
//! complete file.
//!
//! Read-only access goes through [`load_project`]. Changing jobs goes
//! through [`ProjectEditor`], which holds an exclusive OS lock on a sibling
//! `.sfp.lock` for as long as it lives. The lock belongs to the process, so
//! a crashed editor never leaves a project stuck.
//!
//! ```rust,no_run
//! use scaffold_core::calculations::ScaffoldInput;
//! use scaffold_core::file_io::{save_project, ProjectEditor};
//! use scaffold_core::project::Project;
//! use std::path::Path;
//!
//! let path = Path::new("riverside.sfp");
//! save_project(&Project::new("Riverside", "26-014", "Acme"), path)?;
//!
//! let mut editor = ProjectEditor::open(path)?;
//! let (_id, result) = editor.add_job("North wing", ScaffoldInput {
//!     width_ns: 10_010,
//!     width_ew: 9_100,
//!     standard_height: 6_000,
//!     ..ScaffoldInput::default()
//! })?;
//! println!("{}", result.ns_span_structure);
//! # Ok::<(), scaffold_core::errors::CalcError>(())
//! ```

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculations::{ScaffoldInput, ScaffoldResult};
use crate::errors::{CalcError, CalcResult};
use crate::project::{Project, FORMAT_VERSION};
use crate::settings::EngineSettings;

/// `riverside.sfp` -> `riverside.sfp<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Write a project atomically.
pub fn save_project(project: &Project, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(project).map_err(CalcError::serialization)?;
    let tmp = sibling(path, ".tmp");

    let written = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(CalcError::io("save", display(path), e));
    }

    debug!(path = %path.display(), jobs = project.job_count(), "project saved");
    Ok(())
}

/// Read a project, rejecting files from newer releases and settings the
/// engine cannot run with.
pub fn load_project(path: &Path) -> CalcResult<Project> {
    let text = fs::read_to_string(path).map_err(|e| CalcError::io("read", display(path), e))?;
    let project: Project = serde_json::from_str(&text)
        .map_err(|e| CalcError::serialization(format!("{}: {}", path.display(), e)))?;

    if project.meta.format_version > FORMAT_VERSION {
        return Err(CalcError::UnsupportedFormat {
            found: project.meta.format_version,
            supported: FORMAT_VERSION,
        });
    }
    project.settings.validate()?;

    debug!(path = %path.display(), jobs = project.job_count(), "project loaded");
    Ok(project)
}

/// A project opened for changes.
///
/// Every mutating call recalculates what it touched and saves before
/// returning, so the file on disk never holds a job without its result.
#[derive(Debug)]
pub struct ProjectEditor {
    path: PathBuf,
    project: Project,
    /// Released when dropped
    _lock: File,
}

impl ProjectEditor {
    /// Lock and load an existing project.
    ///
    /// Fails with [`CalcError::ProjectLocked`] while another editor, in
    /// this or any other process, has the same file open.
    pub fn open(path: &Path) -> CalcResult<Self> {
        let lock_path = sibling(path, ".lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| CalcError::io("create lock", display(&lock_path), e))?;

        lock.try_lock_exclusive().map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                CalcError::ProjectLocked { path: display(path) }
            } else {
                CalcError::io("lock", display(&lock_path), e)
            }
        })?;

        let project = load_project(path)?;
        Ok(ProjectEditor {
            path: path.to_path_buf(),
            project,
            _lock: lock,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Add a job, calculate it with the project's settings and save.
    pub fn add_job(&mut self, label: impl Into<String>, input: ScaffoldInput) -> CalcResult<(Uuid, ScaffoldResult)> {
        let id = self.project.add_job(label, input);
        let result = self
            .project
            .run_job(&id)
            .cloned()
            .ok_or_else(|| CalcError::Internal {
                message: format!("job {} missing right after insert", id),
            })?;
        self.save()?;

        info!(%id, path = %self.path.display(), "job added");
        Ok((id, result))
    }

    /// Remove a job and save. Returns whether it existed.
    pub fn remove_job(&mut self, id: &Uuid) -> CalcResult<bool> {
        if self.project.remove_job(id).is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Replace the project's settings, recalculate every job and save.
    pub fn apply_settings(&mut self, settings: EngineSettings) -> CalcResult<()> {
        settings.validate()?;
        self.project.settings = settings;
        self.project.run_all();
        self.save()?;

        info!(
            path = %self.path.display(),
            jobs = self.project.job_count(),
            "settings applied, jobs recalculated"
        );
        Ok(())
    }

    fn save(&self) -> CalcResult<()> {
        save_project(&self.project, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_project(name: &str) -> PathBuf {
        temp_dir().join(format!("scaffold_{}_{}.sfp", name, std::process::id()))
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_file(path);
        let _ = fs::remove_file(sibling(path, ".lock"));
    }

    fn building() -> ScaffoldInput {
        ScaffoldInput {
            width_ns: 10_010,
            width_ew: 9_100,
            eaves_n: 500,
            eaves_e: 500,
            eaves_s: 500,
            eaves_w: 500,
            boundary_n: Some(640),
            boundary_s: Some(600),
            standard_height: 6_000,
            ..ScaffoldInput::default()
        }
    }

    #[test]
    fn test_sibling_paths() {
        let path = Path::new("/sites/riverside.sfp");
        assert_eq!(sibling(path, ".lock"), Path::new("/sites/riverside.sfp.lock"));
        assert_eq!(sibling(path, ".tmp"), Path::new("/sites/riverside.sfp.tmp"));
    }

    #[test]
    fn test_save_load_keeps_results() {
        let path = temp_project("roundtrip");
        let mut project = Project::new("Harbour View", "26-042", "Client");
        let id = project.add_job("East wing", building());
        project.run_job(&id);
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.project_id, "26-042");
        let job = loaded.get_job(&id).unwrap();
        assert_eq!(job.input, building());
        assert_eq!(job.result, project.get_job(&id).unwrap().result);
        assert!(!sibling(&path, ".tmp").exists());

        cleanup(&path);
    }

    #[test]
    fn test_load_rejects_unrunnable_settings() {
        let path = temp_project("bad_settings");
        let mut project = Project::new("Site", "26-001", "Client");
        project.settings.jack_step_mm = 0;
        save_project(&project, &path).unwrap();

        assert_eq!(load_project(&path).unwrap_err().error_code(), "INVALID_INPUT");
        cleanup(&path);
    }

    #[test]
    fn test_load_rejects_newer_format() {
        let path = temp_project("newer_format");
        let mut project = Project::new("Site", "26-001", "Client");
        project.meta.format_version = FORMAT_VERSION + 1;
        save_project(&project, &path).unwrap();

        match load_project(&path) {
            Err(CalcError::UnsupportedFormat { found, supported }) => {
                assert_eq!(found, FORMAT_VERSION + 1);
                assert_eq!(supported, FORMAT_VERSION);
            }
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
        cleanup(&path);
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let path = temp_project("missing");
        assert_eq!(load_project(&path).unwrap_err().error_code(), "IO_ERROR");

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_project(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
        cleanup(&path);
    }

    #[test]
    fn test_editor_adds_and_removes_jobs() {
        let path = temp_project("editor_jobs");
        save_project(&Project::new("Site", "26-001", "Client"), &path).unwrap();

        let mut editor = ProjectEditor::open(&path).unwrap();
        let (id, result) = editor.add_job("North wing", building()).unwrap();
        assert_eq!(result.north_gap, "560 mm(+150)");
        drop(editor);

        let on_disk = load_project(&path).unwrap();
        let job = on_disk.get_job(&id).unwrap();
        assert_eq!(job.result.as_ref(), Some(&result));
        assert!(job.calculated_at.is_some());

        let mut editor = ProjectEditor::open(&path).unwrap();
        assert!(editor.remove_job(&id).unwrap());
        assert!(!editor.remove_job(&id).unwrap());
        assert_eq!(editor.project().job_count(), 0);
        drop(editor);
        assert_eq!(load_project(&path).unwrap().job_count(), 0);

        cleanup(&path);
    }

    #[test]
    fn test_apply_settings_recalculates_stored_jobs() {
        let path = temp_project("editor_settings");
        save_project(&Project::new("Site", "26-001", "Client"), &path).unwrap();

        let mut editor = ProjectEditor::open(&path).unwrap();
        let (id, before) = editor.add_job("Block A", building()).unwrap();
        assert_eq!(before.num_stages, 2);

        let mut settings = EngineSettings::default();
        settings.stage_height_mm = 1000;
        editor.apply_settings(settings.clone()).unwrap();

        let bad = EngineSettings {
            tie_final_step_mm: -1,
            ..EngineSettings::default()
        };
        assert!(editor.apply_settings(bad).is_err());
        assert_eq!(editor.project().settings, settings);
        drop(editor);

        let on_disk = load_project(&path).unwrap();
        let after = on_disk.get_job(&id).unwrap().result.clone().unwrap();
        assert!(after.num_stages > before.num_stages);
        assert_eq!(on_disk.settings, settings);

        cleanup(&path);
    }

    #[test]
    fn test_second_editor_is_refused_until_first_drops() {
        let path = temp_project("editor_lock");
        save_project(&Project::new("Site", "26-001", "Client"), &path).unwrap();

        let first = ProjectEditor::open(&path).unwrap();
        let err = ProjectEditor::open(&path).unwrap_err();
        assert_eq!(err.error_code(), "PROJECT_LOCKED");
        assert!(err.is_retryable());

        // Readers are never blocked
        assert!(load_project(&path).is_ok());

        drop(first);
        assert!(ProjectEditor::open(&path).is_ok());

        cleanup(&path);
    }
}

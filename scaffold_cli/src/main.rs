//! # Scaffold Planner CLI
//!
//! Terminal front end for the scaffold dimension engine.
//!
//! ```text
//! scaffold calc --input building.json
//! scaffold form --input form.json --json
//! scaffold demo
//! scaffold project new site.sfp --site "Riverside" --id 26-014
//! scaffold project add site.sfp --label "North wing" --input building.json
//! scaffold project settings site.sfp --settings tuned.json
//! scaffold project show site.sfp
//! ```
//!
//! Logging goes to stderr; `-v` raises the level, `RUST_LOG` overrides it.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use scaffold_core::calculations::{calc_all_with, RoofShape, ScaffoldInput, ScaffoldResult};
use scaffold_core::errors::{CalcError, CalcResult};
use scaffold_core::file_io::{load_project, save_project, ProjectEditor};
use scaffold_core::form::FormInput;
use scaffold_core::project::Project;
use scaffold_core::settings::EngineSettings;

#[derive(Parser, Debug)]
#[command(name = "scaffold", version, about = "Scaffold dimension and parts planner")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate from a scaffold input JSON file
    Calc(CalcArgs),

    /// Calculate from a raw form JSON file (text fields, boundary toggles)
    Form(CalcArgs),

    /// Run the built-in worked example
    Demo {
        /// Print the result as JSON only
        #[arg(long)]
        json: bool,
    },

    /// Create, extend and inspect project files
    #[command(subcommand)]
    Project(ProjectCommand),
}

#[derive(Args, Debug)]
struct CalcArgs {
    /// Input JSON file, or "-" for stdin
    #[arg(short, long)]
    input: String,

    /// Engine settings JSON file
    #[arg(short, long, env = "SCAFFOLD_SETTINGS")]
    settings: Option<PathBuf>,

    /// Print the result as JSON only
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Create an empty project file
    New {
        path: PathBuf,

        /// Building site name
        #[arg(long)]
        site: String,

        /// Project number
        #[arg(long)]
        id: String,

        #[arg(long, default_value = "")]
        client: String,
    },

    /// Calculate an input and store it as a job in the project
    Add {
        path: PathBuf,

        /// Job label
        #[arg(long)]
        label: String,

        /// Input JSON file, or "-" for stdin
        #[arg(short, long)]
        input: String,
    },

    /// Delete a job by id
    Remove { path: PathBuf, id: Uuid },

    /// Replace the project's engine settings and recalculate every job
    Settings {
        path: PathBuf,

        /// Engine settings JSON file
        #[arg(short, long)]
        settings: PathBuf,
    },

    /// List the jobs in a project with their headline results
    Show { path: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            if e.is_retryable() {
                eprintln!();
                eprintln!("Another scaffold process is editing this project; try again shortly.");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command) -> CalcResult<()> {
    match command {
        Command::Calc(args) => {
            let input: ScaffoldInput = read_json(&args.input)?;
            calculate_and_print(&input, args.settings.as_deref(), args.json)
        }
        Command::Form(args) => {
            let form: FormInput = read_json(&args.input)?;
            let input = form.to_input()?;
            calculate_and_print(&input, args.settings.as_deref(), args.json)
        }
        Command::Demo { json } => calculate_and_print(&worked_example(), None, json),
        Command::Project(command) => run_project(command),
    }
}

fn run_project(command: ProjectCommand) -> CalcResult<()> {
    match command {
        ProjectCommand::New {
            path,
            site,
            id,
            client,
        } => {
            if path.exists() {
                return Err(CalcError::io("create", path.display().to_string(), "File already exists"));
            }
            let project = Project::new(site, id, client);
            save_project(&project, &path)?;
            println!("Created {}", path.display());
            Ok(())
        }
        ProjectCommand::Add { path, label, input } => {
            if label.trim().is_empty() {
                return Err(CalcError::missing_field("label"));
            }
            let input: ScaffoldInput = read_json(&input)?;
            input.validate()?;

            let mut editor = ProjectEditor::open(&path)?;
            let (id, result) = editor.add_job(label, input.clone())?;
            drop(editor);

            println!("Added job {}", id);
            println!();
            print_report(&input, &result);
            Ok(())
        }
        ProjectCommand::Remove { path, id } => {
            let mut editor = ProjectEditor::open(&path)?;
            if !editor.remove_job(&id)? {
                return Err(CalcError::invalid_input("id", id.to_string(), "No such job in this project"));
            }
            println!("Removed job {}", id);
            Ok(())
        }
        ProjectCommand::Settings { path, settings } => {
            let settings = load_settings(&settings)?;
            let mut editor = ProjectEditor::open(&path)?;
            editor.apply_settings(settings)?;
            print_project(editor.project());
            Ok(())
        }
        ProjectCommand::Show { path } => {
            print_project(&load_project(&path)?);
            Ok(())
        }
    }
}

fn calculate_and_print(input: &ScaffoldInput, settings_path: Option<&Path>, json_only: bool) -> CalcResult<()> {
    input.validate()?;
    let settings = match settings_path {
        Some(path) => load_settings(path)?,
        None => EngineSettings::default(),
    };

    let result = calc_all_with(input, &settings);

    if json_only {
        println!("{}", to_json(&result)?);
        return Ok(());
    }

    print_report(input, &result);
    println!();
    println!("JSON Output (for storage/API use):");
    println!("{}", to_json(&result)?);
    Ok(())
}

fn load_settings(path: &Path) -> CalcResult<EngineSettings> {
    let settings: EngineSettings = read_json(&path.display().to_string())?;
    settings.validate()?;
    debug!(path = %path.display(), ?settings, "engine settings loaded");
    Ok(settings)
}

/// Read JSON from a file path, or from stdin when the path is "-"
fn read_json<T: DeserializeOwned>(source: &str) -> CalcResult<T> {
    let contents = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CalcError::io("read", "<stdin>", e))?;
        buf
    } else {
        fs::read_to_string(source).map_err(|e| CalcError::io("read", source, e))?
    };

    serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", source, e)))
}

fn to_json(result: &ScaffoldResult) -> CalcResult<String> {
    serde_json::to_string_pretty(result).map_err(CalcError::serialization)
}

fn print_report(input: &ScaffoldInput, result: &ScaffoldResult) {
    println!("═══════════════════════════════════════");
    println!("  SCAFFOLD CALCULATION RESULTS");
    println!("═══════════════════════════════════════");
    println!();
    println!("Input:");
    println!("  Footprint: {} x {} mm (N-S x E-W)", input.width_ns, input.width_ew);
    println!("  Height:    {} mm ({} roof)", input.standard_height, input.roof_shape);
    println!(
        "  Eaves:     N {} / E {} / S {} / W {} mm",
        input.eaves_n, input.eaves_e, input.eaves_s, input.eaves_w
    );
    println!(
        "  Boundary:  N {} / E {} / S {} / W {}",
        boundary_text(input.boundary_n),
        boundary_text(input.boundary_e),
        boundary_text(input.boundary_s),
        boundary_text(input.boundary_w)
    );
    println!();
    println!("Spans:");
    println!("  N-S: {:>6} mm  {}", result.ns_total_span, result.ns_span_structure);
    println!("  E-W: {:>6} mm  {}", result.ew_total_span, result.ew_span_structure);
    println!();
    println!("Gaps:");
    println!("  North: {}", result.north_gap);
    println!("  East:  {}", result.east_gap);
    println!("  South: {}", result.south_gap);
    println!("  West:  {}", result.west_gap);
    println!();
    println!("Staging:");
    println!("  Stages:      {}", result.num_stages);
    println!("  First layer: {} mm", result.first_layer_height);
    println!("  Jack-up:     {} mm", result.jack_up_height);
    println!("  Modules:     {}", result.modules_count);
    if result.tie_column_used {
        println!("  Tie-column:  {}", status_icon(result.tie_ok));
    } else {
        println!("  Tie-column:  not requested");
    }

    if !result.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }
    println!("═══════════════════════════════════════");
}

fn print_project(project: &Project) {
    println!("Project {} - {}", project.meta.project_id, project.meta.site_name);
    if !project.meta.client.is_empty() {
        println!("Client:   {}", project.meta.client);
    }
    println!("Modified: {}", project.meta.modified.to_rfc3339());
    println!("Jobs:     {}", project.job_count());

    for (id, job) in project.jobs_by_label() {
        println!();
        println!("  {} [{}]", job.label, id);
        match &job.result {
            Some(result) => {
                println!(
                    "    N-S {} mm ({}), E-W {} mm ({})",
                    result.ns_total_span, result.ns_span_structure, result.ew_total_span, result.ew_span_structure
                );
                println!(
                    "    {} stages, {} modules, tie-column {}",
                    result.num_stages,
                    result.modules_count,
                    if result.tie_column_used { status_icon(result.tie_ok) } else { "-" }
                );
            }
            None => println!("    (not calculated)"),
        }
    }
}

fn boundary_text(boundary: Option<i64>) -> String {
    match boundary {
        Some(mm) => format!("{} mm", mm),
        None => "none".to_string(),
    }
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}

/// Two-storey block with boundaries on the north and south sides
fn worked_example() -> ScaffoldInput {
    ScaffoldInput {
        width_ns: 10_010,
        width_ew: 9_100,
        eaves_n: 500,
        eaves_e: 500,
        eaves_s: 500,
        eaves_w: 500,
        boundary_n: Some(640),
        boundary_e: None,
        boundary_s: Some(600),
        boundary_w: None,
        standard_height: 6_000,
        roof_shape: RoofShape::Flat,
        tie_column: true,
        railing_count: 3,
        use_355_ns: 1,
        use_300_ns: 0,
        use_150_ns: 1,
        use_355_ew: 0,
        use_300_ew: 0,
        use_150_ew: 0,
        target_margin: 1_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_calc_args() {
        let cli = Cli::try_parse_from(["scaffold", "-vv", "calc", "--input", "b.json", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Calc(args) => {
                assert_eq!(args.input, "b.json");
                assert!(args.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_project_remove() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let cli = Cli::try_parse_from(["scaffold", "project", "remove", "site.sfp", id]).unwrap();
        match cli.command {
            Command::Project(ProjectCommand::Remove { path, id: parsed }) => {
                assert_eq!(path, PathBuf::from("site.sfp"));
                assert_eq!(parsed.to_string(), id);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["scaffold", "project", "remove", "site.sfp", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_demo_is_valid_input() {
        assert!(worked_example().validate().is_ok());
    }

    #[test]
    fn test_read_json_missing_file() {
        let err = read_json::<ScaffoldInput>("/nonexistent/input.json").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}

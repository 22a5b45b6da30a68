//! Pipeline orchestrator: extract → dbt transform → dbt docs.
//!
//! Phases are ordered lists of subprocess steps, each tagged required or
//! best-effort. A single runner executes them in order and halts the
//! pipeline at the first failing required step; best-effort failures are
//! logged and skipped over. Subprocesses run with no timeout; an
//! unresponsive tool hangs the pipeline.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// One subprocess invocation in the pipeline.
#[derive(Debug, Clone)]
pub struct Step {
    /// Label used in console output and errors.
    pub label: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// A failing required step halts the pipeline.
    pub required: bool,
    /// Capture stdout/stderr and replay them on failure instead of
    /// inheriting the parent's streams.
    pub capture: bool,
}

/// A named group of steps, executed in order.
#[derive(Debug)]
pub struct Phase {
    pub name: &'static str,
    pub steps: Vec<Step>,
}

/// Orchestrator knobs, assembled by the CLI.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// dbt project directory, passed to every dbt subcommand.
    pub dbt_project_dir: PathBuf,
    pub skip_extract: bool,
    pub skip_transform: bool,
    /// Extraction binary to spawn; defaults to the `kiln-extract` sibling
    /// of the current executable.
    pub extract_bin: Option<PathBuf>,
    /// Flags forwarded to the extraction binary (db path, limit, ...).
    pub extract_args: Vec<String>,
}

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Whether extract and transform (where not skipped) both succeeded.
    /// Docs generation never changes this.
    pub success: bool,
    pub duration: Duration,
}

/// Lay out the phases this configuration will run, in order. Skipped
/// phases are omitted entirely; their subprocesses are never spawned.
pub fn build_phases(config: &PipelineConfig) -> Result<Vec<Phase>> {
    let mut phases = Vec::new();

    if !config.skip_extract {
        phases.push(Phase {
            name: "extract",
            steps: vec![extract_step(config)?],
        });
    }

    if !config.skip_transform {
        phases.push(Phase {
            name: "transform",
            steps: transform_steps(&config.dbt_project_dir),
        });
    }

    phases.push(Phase {
        name: "docs",
        steps: vec![docs_step(&config.dbt_project_dir)],
    });

    Ok(phases)
}

fn extract_step(config: &PipelineConfig) -> Result<Step> {
    let program = match &config.extract_bin {
        Some(bin) => bin.clone(),
        None => std::env::current_exe()?.with_file_name("kiln-extract"),
    };
    Ok(Step {
        label: "extract".to_string(),
        program,
        args: config.extract_args.clone(),
        required: true,
        capture: true,
    })
}

/// The dbt sequence: connection check, dependency install, models, tests.
/// Only the dependency install is best-effort (a project without packages
/// is fine).
pub fn transform_steps(project_dir: &Path) -> Vec<Step> {
    let dir = project_dir.to_string_lossy().into_owned();
    vec![
        dbt_step("dbt debug", &["debug"], &dir, true),
        dbt_step("dbt deps", &["deps"], &dir, false),
        dbt_step("dbt run", &["run"], &dir, true),
        dbt_step("dbt test", &["test"], &dir, true),
    ]
}

/// Documentation generation; its failure never changes the pipeline result.
pub fn docs_step(project_dir: &Path) -> Step {
    let dir = project_dir.to_string_lossy().into_owned();
    dbt_step("dbt docs generate", &["docs", "generate"], &dir, false)
}

fn dbt_step(label: &str, subcommand: &[&str], project_dir: &str, required: bool) -> Step {
    let mut args: Vec<String> = subcommand.iter().map(|s| s.to_string()).collect();
    args.push("--project-dir".to_string());
    args.push(project_dir.to_string());
    Step {
        label: label.to_string(),
        program: PathBuf::from("dbt"),
        args,
        required,
        capture: false,
    }
}

/// Run one step to completion. `Ok(true)` on exit 0, `Ok(false)` when a
/// best-effort step fails, `Err` when a required step fails (non-zero exit
/// or failure to spawn).
fn run_step(step: &Step) -> Result<bool> {
    println!("\nRunning {}...", step.label);

    let mut command = Command::new(&step.program);
    command.args(&step.args);

    let status = if step.capture {
        let output = match command.output() {
            Ok(output) => output,
            Err(e) if !step.required => {
                eprintln!("⚠ {} could not start (continuing): {}", step.label, e);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        if !output.status.success() {
            print!("{}", String::from_utf8_lossy(&output.stdout));
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
        }
        output.status
    } else {
        match command.status() {
            Ok(status) => status,
            Err(e) if !step.required => {
                eprintln!("⚠ {} could not start (continuing): {}", step.label, e);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }
    };

    if status.success() {
        println!("✓ {} completed", step.label);
        Ok(true)
    } else if step.required {
        Err(Error::Subprocess {
            label: step.label.clone(),
            status,
        })
    } else {
        eprintln!("⚠ {} failed (continuing): {}", step.label, status);
        Ok(false)
    }
}

/// Run steps in order, halting at the first failing required step.
fn run_steps(steps: &[Step]) -> Result<()> {
    for step in steps {
        run_step(step)?;
    }
    Ok(())
}

/// Run the configured phases in order and report overall success and
/// wall-clock duration. A failed phase halts the pipeline; later phases
/// (docs included) are not attempted.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    let started = Instant::now();

    banner("POKEMON ELT PIPELINE");
    println!(
        "Start time: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    if config.skip_extract {
        println!("\n⊘ Skipping extract phase");
    }
    if config.skip_transform {
        println!("\n⊘ Skipping transform phase");
    }

    let mut success = true;
    for phase in build_phases(config)? {
        banner(&format!("PHASE: {}", phase.name.to_uppercase()));
        if let Err(e) = run_steps(&phase.steps) {
            eprintln!("\n✗ Pipeline failed at {} phase: {}", phase.name, e);
            success = false;
            break;
        }
    }

    let duration = started.elapsed();
    if success {
        banner("PIPELINE COMPLETED SUCCESSFULLY");
        println!("Duration: {:.2} seconds", duration.as_secs_f64());
        println!(
            "End time: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(PipelineReport { success, duration })
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(70));
    println!("{title}");
    println!("{}", "=".repeat(70));
}

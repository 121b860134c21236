//! One function per subcommand. Each takes the already-built `Engine` and
//! prints its own output; `run()` only maps the `Result` to an exit code.

use acp_checkpoint::RunMetadata;
use acp_engine::{Engine, EngineError, RunStatusView};
use acp_types::PhaseId;

use super::backend::{select_interaction_port, select_llm_backend};

pub async fn execute_init(engine: &Engine, force: bool) -> Result<(), EngineError> {
    engine.init(force)?;
    println!("initialized .acp/ (starter constitution at .acp/templates/constitution.md)");
    Ok(())
}

pub async fn execute_specify(
    engine: &Engine,
    description: &str,
    force: bool,
) -> Result<(), EngineError> {
    let started = engine.start_run(description)?;
    println!("started run {}", started.run_id);

    let llm = select_llm_backend();
    let interaction = select_interaction_port(force);
    let metadata = engine.specify(&started.run_id, llm.as_ref(), interaction.as_ref()).await?;
    print_metadata(&metadata);
    Ok(())
}

pub async fn execute_plan(
    engine: &Engine,
    run_id: Option<&str>,
    force: bool,
) -> Result<(), EngineError> {
    let run_id = resolve_run_id(engine, run_id)?;
    let llm = select_llm_backend();
    let interaction = select_interaction_port(force);
    let metadata = engine.plan(&run_id, llm.as_ref(), interaction.as_ref()).await?;
    print_metadata(&metadata);
    Ok(())
}

pub async fn execute_implement(
    engine: &Engine,
    run_id: Option<&str>,
    force: bool,
) -> Result<(), EngineError> {
    let run_id = resolve_run_id(engine, run_id)?;
    let llm = select_llm_backend();
    let interaction = select_interaction_port(force);
    let metadata = engine.implement(&run_id, llm.as_ref(), interaction.as_ref()).await?;
    print_metadata(&metadata);
    Ok(())
}

pub async fn execute_resume(
    engine: &Engine,
    run_id: Option<&str>,
    force: bool,
) -> Result<(), EngineError> {
    let llm = select_llm_backend();
    let interaction = select_interaction_port(force);
    let metadata = engine.resume(run_id, llm.as_ref(), interaction.as_ref()).await?;
    print_metadata(&metadata);
    Ok(())
}

pub fn execute_status(engine: &Engine, run_id: Option<&str>) -> Result<(), EngineError> {
    let run_id = resolve_run_id(engine, run_id)?;
    let view = engine.status(&run_id)?;
    print_status_view(&view);
    Ok(())
}

pub fn execute_history(engine: &Engine) -> Result<(), EngineError> {
    let runs = engine.history();
    if runs.is_empty() {
        return Err(EngineError::NoRuns);
    }
    for metadata in runs {
        println!(
            "{}  {:<11} {:<9} updated {}",
            metadata.run_id, metadata.phase, metadata.status, metadata.updated_at
        );
    }
    Ok(())
}

/// `None` resolves to the most recently updated run.
fn resolve_run_id(engine: &Engine, run_id: Option<&str>) -> Result<String, EngineError> {
    match run_id {
        Some(id) => Ok(id.to_string()),
        None => engine.history().into_iter().next().map(|m| m.run_id).ok_or(EngineError::NoRuns),
    }
}

fn print_metadata(metadata: &RunMetadata) {
    println!(
        "{}  phase={} status={} phases_completed=[{}]",
        metadata.run_id,
        metadata.phase,
        metadata.status,
        metadata
            .phases_completed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
}

fn print_status_view(view: &RunStatusView) {
    let metadata = &view.metadata;
    println!("run:              {}", metadata.run_id);
    println!("phase:            {}", metadata.phase);
    println!("status:           {}", metadata.status);
    println!(
        "phases completed: [{}]",
        metadata.phases_completed.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    );
    println!("created:          {}", metadata.created_at);
    println!("updated:          {}", metadata.updated_at);

    if let Some(last_error) = &view.state.control.last_error {
        println!("last error:       [{}] {}", last_error.node, last_error.message);
    }

    let pending: usize = view.state.violations.values().map(Vec::len).sum();
    if pending > 0 {
        println!("open violations:  {pending}");
    }

    let next_action = match metadata.phase {
        PhaseId::Init => "acp specify <description>",
        PhaseId::Specify => "acp plan",
        PhaseId::Plan => "acp implement",
        PhaseId::Implement | PhaseId::Complete => "(nothing - run is complete)",
    };
    println!("next action:      {next_action}");
}

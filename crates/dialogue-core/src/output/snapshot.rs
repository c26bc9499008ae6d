//! Run Snapshots
//!
//! Captures the simulator's state as a serializable [`RunSnapshot`].

use std::fs;
use std::path::Path;

use dialogue_events::{generate_run_id, AgentSnapshot, RunSnapshot};

use crate::components::agent::Agent;
use crate::output::stats::opinion_stats;
use crate::systems::dialogue::DialogueSimulator;

fn agent_snapshot(agent: &Agent) -> AgentSnapshot {
    let persona = agent.persona();
    AgentSnapshot {
        agent_id: agent.id().0,
        name: agent.name().to_string(),
        opinion: agent.opinion(),
        message_count: agent.messages().len(),
        age: persona.map(|p| p.age()),
        traits: persona.map(|p| p.traits().to_string()),
        status: persona.map(|p| p.status().to_string()),
    }
}

/// Snapshot under a fresh run id
pub fn generate_snapshot(simulator: &DialogueSimulator) -> RunSnapshot {
    generate_snapshot_with_id(simulator, generate_run_id())
}

/// Snapshot under a caller-chosen run id, so several snapshots of one run
/// can share it.
pub fn generate_snapshot_with_id(
    simulator: &DialogueSimulator,
    run_id: impl Into<String>,
) -> RunSnapshot {
    let agents = simulator.agents();
    RunSnapshot {
        run_id: run_id.into(),
        topic: simulator.topic().to_string(),
        step: simulator.step_count(),
        history_len: simulator.history().len(),
        agents: agents.iter().map(agent_snapshot).collect(),
        stats: opinion_stats(agents),
    }
}

/// Write snapshot to file as pretty JSON
pub fn write_snapshot(snapshot: &RunSnapshot, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = snapshot.to_json_pretty()?;
    fs::write(path, json)?;
    Ok(())
}

// crates/core/src/grouping/agent_progress.rs
//! Streamed `agent_progress` records, one group per agent id.
//!
//! Grouping is by identity, not adjacency: every progress record for an
//! agent joins the group led by that agent's first record, wherever it
//! appears in the transcript.

use std::collections::{BTreeSet, HashMap};

use transcript_view_types::{AgentProgressGroup, ProgressEntry};

use crate::classify::MessageFacts;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentProgressGrouping {
    /// Keyed by leader uuid.
    pub groups: HashMap<String, AgentProgressGroup>,
    pub member_to_leader: HashMap<String, String>,
}

pub fn group_agent_progress(facts: &[MessageFacts<'_>]) -> AgentProgressGrouping {
    let mut groups: HashMap<String, AgentProgressGroup> = HashMap::new();
    let mut leader_by_agent: HashMap<&str, String> = HashMap::new();
    let mut member_to_leader: HashMap<String, String> = HashMap::new();

    for fact in facts {
        let Some(progress) = fact.agent_progress else {
            continue;
        };
        let uuid = fact.uuid();
        let entry = ProgressEntry {
            data: progress.data.clone(),
            timestamp: fact.message.timestamp.clone(),
            uuid: uuid.to_string(),
        };

        if let Some(leader) = leader_by_agent.get(progress.agent_id).cloned() {
            if let Some(group) = groups.get_mut(&leader) {
                group.entries.push(entry);
                group.message_uuids.insert(uuid.to_string());
                member_to_leader.insert(uuid.to_string(), leader);
            }
            continue;
        }

        leader_by_agent.insert(progress.agent_id, uuid.to_string());
        groups.insert(
            uuid.to_string(),
            AgentProgressGroup {
                leader_uuid: uuid.to_string(),
                agent_id: progress.agent_id.to_string(),
                parent_tool_use_id: fact.message.parent_tool_use_id.clone(),
                entries: vec![entry],
                message_uuids: BTreeSet::from([uuid.to_string()]),
            },
        );
    }

    AgentProgressGrouping {
        groups,
        member_to_leader,
    }
}

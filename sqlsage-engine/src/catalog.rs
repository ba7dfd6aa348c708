//! Assembles the tool catalog and system prompt for one `chat()` call (spec
//! §4.6, §4.10). Neither is cached on `Agent`: both are rebuilt fresh every
//! turn so a newly connected tool server or a freshly discovered skill is
//! visible immediately, mirroring `build_system_prompt` being recomputed
//! per-turn in the teacher's `AgentRuntime::run_turn_streaming`.

use sqlsage_llm::LlmToolDefinition;
use sqlsage_tools::{ExternalServerTools, SkillSummary};

use crate::localize;
use crate::state::Agent;

impl Agent {
    /// Build this turn's full tool catalog: DB builtins, migration tools,
    /// interaction tools, every connected external server's tools, and
    /// every model-invocable skill.
    pub(crate) async fn build_catalog(&self) -> Vec<LlmToolDefinition> {
        let external_servers = match &self.mcp {
            Some(mcp) => group_by_server(mcp.list_tools().await),
            None => Vec::new(),
        };
        let skills = match &self.skills {
            Some(registry) => registry
                .model_invocable_tool_definitions()
                .into_iter()
                .map(|def| SkillSummary {
                    name: def.name.trim_start_matches(sqlsage_tools::SKILL_TOOL_PREFIX).to_string(),
                    description: def.description,
                })
                .collect(),
            None => Vec::new(),
        };
        sqlsage_tools::build_catalog(self.language, &external_servers, &skills)
    }

    /// Build this turn's system prompt: a base instruction block plus
    /// state-dependent notices (an open migration window).
    pub(crate) fn build_system_prompt(&self) -> String {
        let mut prompt = localize::base_system_prompt(self.language).to_string();
        if self.auto_execute_migration {
            prompt.push_str("\n\n");
            prompt.push_str(localize::auto_execute_migration_notice(self.language));
        }
        prompt
    }
}

fn group_by_server(tools: Vec<sqlsage_mcp::ToolDefinition>) -> Vec<ExternalServerTools> {
    let mut by_server: Vec<ExternalServerTools> = Vec::new();
    for tool in tools {
        let def = LlmToolDefinition::new(tool.name.clone())
            .with_description(tool.description.clone().unwrap_or_else(|| tool.name.clone()))
            .with_schema(tool.input_schema.clone());
        match by_server.iter_mut().find(|s| s.server_name == tool.server) {
            Some(existing) => existing.tools.push(def),
            None => by_server.push(ExternalServerTools {
                server_name: tool.server.clone(),
                tools: vec![def],
            }),
        }
    }
    by_server
}

//! Deterministic configuration scoring.
//!
//! Pure function of the agent profile, recomputed on every configuration
//! change. Three rubrics: instruction clarity (max 15), knowledge and
//! data mounting (max 15), environment trigger configuration (max 10).
//! Every missed rubric appends a human-readable improvement tip.

use agentforge_config::AgentProfile;
use tracing::debug;

/// Maximum static score.
pub const STATIC_SCORE_MAX: u8 = 40;

/// Result of the static rubric pass.
#[derive(Debug, Clone)]
pub struct StaticScore {
    pub score: u8,
    pub tips: Vec<String>,
}

/// Score the profile against the fixed rubrics.
pub fn calculate_static_score(profile: &AgentProfile) -> StaticScore {
    let mut score = 0u8;
    let mut tips = Vec::new();

    // Instruction clarity (max 15).
    let len = profile.instructions.chars().count();
    if len > 200 {
        score += 15;
    } else if len > 50 {
        score += 10;
        tips.push("提示词略显简短，建议补充更多角色背景和业务边界。".to_string());
    } else {
        score += 5;
        tips.push("提示词过于简短，AI 可能无法准确理解任务，请详细描述。".to_string());
    }

    // Knowledge and data mounting (max 15).
    let has_knowledge = profile.has_knowledge();
    let has_data = profile.has_data_fields();
    if has_knowledge && has_data {
        score += 15;
    } else if has_knowledge || has_data {
        score += 10;
        if !has_knowledge {
            tips.push("未挂载知识库。如果涉及专业领域，建议上传相关文档以减少幻觉。".to_string());
        }
        if !has_data {
            tips.push("未挂载业务数据。建议接入客户或产品数据以提供个性化服务。".to_string());
        }
    } else {
        tips.push("未挂载任何知识库或业务数据，智能体可能缺乏必要的业务上下文。".to_string());
    }

    // Environment trigger configuration (max 10).
    if profile.environment.is_complete() {
        score += 10;
    } else {
        tips.push("未配置环境感知（触发页面/展示位置），智能体可能无法在合适的时机出现。".to_string());
    }

    debug!(score, tips = tips.len(), "computed static score");
    StaticScore { score, tips }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentforge_config::{DataFieldConfig, EnvironmentConfig, KnowledgeConfig};

    fn full_profile() -> AgentProfile {
        AgentProfile {
            instructions: "你".repeat(250),
            knowledge: vec![KnowledgeConfig {
                id: "k1".into(),
                name: "问题产品清单".into(),
            }],
            data_fields: vec![DataFieldConfig {
                id: "f1".into(),
                category: "客户画像".into(),
                source_name: "CRM".into(),
                name: "风险等级".into(),
                key: "risk_grade".into(),
                data_type: "string".into(),
                sample_value: String::new(),
                description: String::new(),
            }],
            environment: EnvironmentConfig {
                trigger_page: "客户全景视图".into(),
                display_slot: "右侧助手栏".into(),
            },
            ..AgentProfile::default()
        }
    }

    #[test]
    fn fully_configured_profile_scores_forty_without_tips() {
        let result = calculate_static_score(&full_profile());
        assert_eq!(result.score, 40);
        assert!(result.tips.is_empty());
    }

    #[test]
    fn short_instructions_lose_points_with_tip() {
        let mut profile = full_profile();
        profile.instructions = "你".repeat(100);
        let result = calculate_static_score(&profile);
        assert_eq!(result.score, 35);
        assert!(result.tips[0].contains("略显简短"));
    }

    #[test]
    fn minimal_instructions_score_five() {
        let mut profile = full_profile();
        profile.instructions = "助手".into();
        let result = calculate_static_score(&profile);
        assert_eq!(result.score, 30);
        assert!(result.tips[0].contains("过于简短"));
    }

    #[test]
    fn knowledge_only_scores_ten_with_data_tip() {
        let mut profile = full_profile();
        profile.data_fields.clear();
        let result = calculate_static_score(&profile);
        assert_eq!(result.score, 35);
        assert!(result.tips.iter().any(|t| t.contains("未挂载业务数据")));
    }

    #[test]
    fn nothing_mounted_scores_zero_for_rubric() {
        let mut profile = full_profile();
        profile.knowledge.clear();
        profile.data_fields.clear();
        let result = calculate_static_score(&profile);
        assert_eq!(result.score, 25);
        assert!(result
            .tips
            .iter()
            .any(|t| t.contains("未挂载任何知识库或业务数据")));
    }

    #[test]
    fn incomplete_environment_loses_ten() {
        let mut profile = full_profile();
        profile.environment.display_slot.clear();
        let result = calculate_static_score(&profile);
        assert_eq!(result.score, 30);
        assert!(result.tips.iter().any(|t| t.contains("环境感知")));
    }
}

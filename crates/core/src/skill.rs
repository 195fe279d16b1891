//! Skill descriptors — the routable units of agent behavior.
//!
//! A skill is configured externally (name, trigger keywords, enabled
//! flag) and is read-only to the pipeline during one routing decision.

use serde::{Deserialize, Serialize};

/// A reusable skill the agent can route a user utterance to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Stable identifier (e.g., "s1").
    pub id: String,

    /// Display name, possibly with a parenthetical English suffix
    /// (e.g., "持仓分析 (Holdings Analysis)").
    pub name: String,

    /// Free-text description shown in configuration UIs.
    pub description: String,

    /// Ordered trigger keywords; an utterance containing any of them
    /// (as a substring) invokes this skill.
    pub trigger_keywords: Vec<String>,

    /// Whether the skill participates in routing.
    pub enabled: bool,
}

impl SkillDescriptor {
    /// Create an enabled skill with the given id, name, and keywords.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            trigger_keywords: keywords.into_iter().map(Into::into).collect(),
            enabled: true,
        }
    }

    /// The display name with any parenthetical suffix discarded.
    pub fn clean_name(&self) -> &str {
        self.name.split(" (").next().unwrap_or(&self.name).trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_strips_parenthetical() {
        let skill = SkillDescriptor::new("s1", "持仓分析 (Holdings Analysis)", ["持仓"]);
        assert_eq!(skill.clean_name(), "持仓分析");
    }

    #[test]
    fn clean_name_passthrough_without_suffix() {
        let skill = SkillDescriptor::new("s2", "行外吸金", ["行外"]);
        assert_eq!(skill.clean_name(), "行外吸金");
    }

    #[test]
    fn serialization_roundtrip() {
        let skill = SkillDescriptor::new("s1", "产品推荐 (Product Rec)", ["推荐", "理财"]);
        let json = serde_json::to_string(&skill).unwrap();
        let back: SkillDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "s1");
        assert_eq!(back.trigger_keywords.len(), 2);
        assert!(back.enabled);
    }
}

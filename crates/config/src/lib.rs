//! Agent profile loading and validation for AgentForge.
//!
//! An agent profile is the full builder-side configuration of one agent:
//! global instructions, skills, knowledge documents, data field bindings,
//! environment triggers, and generation settings. Profiles load from TOML
//! with environment variable overrides and are validated at load time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use agentforge_core::SkillDescriptor;

/// The root agent profile.
///
/// Maps directly to a profile TOML file.
#[derive(Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Display name of the agent.
    #[serde(default = "default_name")]
    pub name: String,

    /// One-line description shown in configuration UIs.
    #[serde(default)]
    pub description: String,

    /// Global system instructions (the full instruction document,
    /// including any scenario sections).
    #[serde(default)]
    pub instructions: String,

    /// Configured skills, in registration order. Order matters: the
    /// router honors it when resolving keyword matches.
    #[serde(default)]
    pub skills: Vec<SkillConfig>,

    /// Uploaded knowledge documents.
    #[serde(default)]
    pub knowledge: Vec<KnowledgeConfig>,

    /// Bound data fields from external sources.
    #[serde(default)]
    pub data_fields: Vec<DataFieldConfig>,

    /// Where the agent surfaces in the host application.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Generation backend settings.
    #[serde(default)]
    pub generation: GenerationConfig,
}

fn default_name() -> String {
    "未命名智能体".into()
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: String::new(),
            instructions: String::new(),
            skills: Vec::new(),
            knowledge: Vec::new(),
            data_fields: Vec::new(),
            environment: EnvironmentConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

/// One configured skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillConfig {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub trigger_keywords: Vec<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl From<&SkillConfig> for SkillDescriptor {
    fn from(cfg: &SkillConfig) -> Self {
        SkillDescriptor {
            id: cfg.id.clone(),
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            trigger_keywords: cfg.trigger_keywords.clone(),
            enabled: cfg.enabled,
        }
    }
}

/// A registered knowledge document (content lives in the document store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    pub id: String,
    pub name: String,
}

/// One bound data field from an external source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFieldConfig {
    pub id: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub source_name: String,

    pub name: String,

    /// Key under which the field appears in the subject record.
    pub key: String,

    #[serde(default)]
    pub data_type: String,

    #[serde(default)]
    pub sample_value: String,

    #[serde(default)]
    pub description: String,
}

/// Where the agent is triggered and displayed in the host application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub trigger_page: String,

    #[serde(default)]
    pub display_slot: String,
}

impl EnvironmentConfig {
    /// Both the trigger page and the display slot are configured.
    pub fn is_complete(&self) -> bool {
        !self.trigger_page.trim().is_empty() && !self.display_slot.trim().is_empty()
    }
}

/// Generation backend settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_url: None,
            api_key: None,
            temperature: default_temperature(),
        }
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl std::fmt::Debug for AgentProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentProfile")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("instructions_len", &self.instructions.len())
            .field("skills", &self.skills)
            .field("knowledge", &self.knowledge)
            .field("data_fields", &self.data_fields)
            .field("environment", &self.environment)
            .field("generation", &self.generation)
            .finish()
    }
}

impl AgentProfile {
    /// Load a profile from a TOML file.
    ///
    /// A missing file yields the default (empty) profile. The
    /// `AGENTFORGE_API_KEY` environment variable overrides any key in
    /// the file.
    pub fn load_from(path: &Path) -> Result<Self, ProfileError> {
        let mut profile = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ProfileError::ReadError {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            let profile: Self =
                toml::from_str(&content).map_err(|e| ProfileError::ParseError {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            profile
        } else {
            tracing::info!("No profile file found at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(key) = std::env::var("AGENTFORGE_API_KEY") {
            profile.generation.api_key = Some(key);
        }

        profile.validate()?;
        Ok(profile)
    }

    /// Validate the profile.
    ///
    /// Duplicate skill ids are an error; an empty instruction document
    /// only warns, since the readiness scorer reports it to the builder.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut seen = std::collections::HashSet::new();
        for skill in &self.skills {
            if !seen.insert(skill.id.as_str()) {
                return Err(ProfileError::ValidationError(format!(
                    "duplicate skill id: {}",
                    skill.id
                )));
            }
        }

        for field in &self.data_fields {
            if field.key.trim().is_empty() {
                return Err(ProfileError::ValidationError(format!(
                    "data field '{}' has an empty key",
                    field.id
                )));
            }
        }

        if self.instructions.trim().is_empty() {
            tracing::warn!("Profile '{}' has no global instructions", self.name);
        }

        Ok(())
    }

    /// The skills as core descriptors, in registration order.
    pub fn skill_descriptors(&self) -> Vec<SkillDescriptor> {
        self.skills.iter().map(SkillDescriptor::from).collect()
    }

    /// Whether any knowledge document is registered.
    pub fn has_knowledge(&self) -> bool {
        !self.knowledge.is_empty()
    }

    /// Whether any data field is bound.
    pub fn has_data_fields(&self) -> bool {
        !self.data_fields.is_empty()
    }
}

/// Profile loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Failed to read profile at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse profile at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Profile validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
name = "零售财富助手"
description = "面向客户经理的陪练智能体"
instructions = "你是一名专业的理财顾问。"

[[skills]]
id = "s1"
name = "持仓分析 (Holdings Analysis)"
trigger_keywords = ["持仓", "亏损"]

[[skills]]
id = "s2"
name = "产品推荐 (Product Rec)"
trigger_keywords = ["推荐"]
enabled = false

[[knowledge]]
id = "k1"
name = "全局问题产品清单"

[[data_fields]]
id = "f1"
category = "客户画像"
source_name = "CRM"
name = "风险等级"
key = "risk_grade"
data_type = "string"

[environment]
trigger_page = "持仓页"
display_slot = "右侧浮窗"

[generation]
model = "gemini-2.5-flash"
temperature = 0.4
"#;

    #[test]
    fn sample_profile_parses() {
        let profile: AgentProfile = toml::from_str(SAMPLE).unwrap();
        assert_eq!(profile.name, "零售财富助手");
        assert_eq!(profile.skills.len(), 2);
        assert!(profile.skills[0].enabled);
        assert!(!profile.skills[1].enabled);
        assert!(profile.has_knowledge());
        assert!(profile.has_data_fields());
        assert!(profile.environment.is_complete());
        assert_eq!(profile.generation.temperature, 0.4);
    }

    #[test]
    fn skill_descriptors_preserve_order() {
        let profile: AgentProfile = toml::from_str(SAMPLE).unwrap();
        let skills = profile.skill_descriptors();
        assert_eq!(skills[0].id, "s1");
        assert_eq!(skills[0].clean_name(), "持仓分析");
        assert_eq!(skills[1].id, "s2");
    }

    #[test]
    fn duplicate_skill_ids_rejected() {
        let toml_str = r#"
[[skills]]
id = "s1"
name = "A"

[[skills]]
id = "s1"
name = "B"
"#;
        let profile: AgentProfile = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::ValidationError(_))
        ));
    }

    #[test]
    fn empty_data_field_key_rejected() {
        let toml_str = r#"
[[data_fields]]
id = "f1"
name = "风险等级"
key = "  "
"#;
        let profile: AgentProfile = toml::from_str(toml_str).unwrap();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn missing_profile_file_returns_defaults() {
        let profile = AgentProfile::load_from(Path::new("/nonexistent/profile.toml")).unwrap();
        assert_eq!(profile.name, "未命名智能体");
        assert!(profile.skills.is_empty());
    }

    #[test]
    fn load_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let profile = AgentProfile::load_from(&path).unwrap();
        assert_eq!(profile.skills.len(), 2);
        assert_eq!(profile.environment.trigger_page, "持仓页");
    }

    #[test]
    fn incomplete_environment_detected() {
        let env = EnvironmentConfig {
            trigger_page: "持仓页".into(),
            display_slot: String::new(),
        };
        assert!(!env.is_complete());
    }

    #[test]
    fn api_key_redacted_in_debug() {
        let generation = GenerationConfig {
            api_key: Some("sk-secret".into()),
            ..GenerationConfig::default()
        };
        let debug = format!("{generation:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}

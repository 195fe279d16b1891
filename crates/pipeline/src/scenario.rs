//! Scenario extraction: pull the slice of a long instruction document
//! relevant to one named skill.
//!
//! Extraction is a pluggable strategy so alternate document conventions
//! can be substituted without touching callers. The default strategy
//! splits on the locale-specific scenario marker (场景 + ordinal + ：).

use regex_lite::Regex;

/// Returned when no scenario block mentions the skill.
pub const SCENARIO_NOT_FOUND: &str = "未找到与该技能匹配的场景，将使用全局指令。";

/// Header prefixed to an auto-extracted scenario slice.
const EXTRACTION_HEADER: &str = "## 当前执行场景要求（自动提取）：";

/// Strategy interface for scoping an instruction document to one skill.
pub trait ScenarioExtract: Send + Sync {
    /// Extract the instruction slice for `skill_name` from `document`.
    ///
    /// Idempotent and side-effect free. Returns [`SCENARIO_NOT_FOUND`]
    /// when no scenario block mentions the (normalized) skill name.
    fn extract(&self, document: &str, skill_name: &str) -> String;
}

/// Default strategy: marker-delimited scenario blocks.
///
/// The document is split on `场景<ordinal>：` markers; the first block
/// containing the normalized skill name wins and is truncated at the
/// trailing `# Format` section so formatting rules are not duplicated.
#[derive(Debug)]
pub struct MarkerScenarioExtractor {
    marker: Regex,
    format_section: Regex,
}

impl MarkerScenarioExtractor {
    pub fn new() -> Self {
        Self {
            marker: Regex::new(r"场景[一二三四五六七八九十\d]：").expect("static pattern"),
            format_section: Regex::new(r"#\s*Format").expect("static pattern"),
        }
    }

    /// Skill name with any ` (` parenthetical suffix discarded.
    fn normalize(skill_name: &str) -> &str {
        skill_name.split(" (").next().unwrap_or(skill_name).trim()
    }
}

impl Default for MarkerScenarioExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioExtract for MarkerScenarioExtractor {
    fn extract(&self, document: &str, skill_name: &str) -> String {
        let clean_name = Self::normalize(skill_name);
        if document.is_empty() || clean_name.is_empty() {
            return SCENARIO_NOT_FOUND.to_string();
        }

        let matched = self
            .marker
            .split(document)
            .find(|block| block.contains(clean_name));

        match matched {
            Some(block) => {
                let scoped = match self.format_section.find(block) {
                    Some(m) => &block[..m.start()],
                    None => block,
                };
                format!("{EXTRACTION_HEADER}\n{}", scoped.trim())
            }
            None => SCENARIO_NOT_FOUND.to_string(),
        }
    }
}

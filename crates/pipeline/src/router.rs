//! Intent routing: map a user utterance to one enabled skill.
//!
//! Keyword matching is first-match-wins in skill registration order, not
//! best-match. Explicit keyword matches always beat the fallback
//! heuristics; the fallbacks themselves are an ordered table evaluated
//! only when no keyword matched.

use agentforge_core::SkillDescriptor;
use tracing::debug;

/// Display label used when no skill matched.
pub const GENERAL_CHAT_LABEL: &str = "通用对话 (General Chat)";

/// Routing outcome for one utterance.
#[derive(Debug, Clone)]
pub enum Route {
    /// A configured skill handles this turn.
    Skill(SkillDescriptor),
    /// No skill matched; the turn proceeds as general chat.
    GeneralChat,
}

impl Route {
    pub fn skill(&self) -> Option<&SkillDescriptor> {
        match self {
            Route::Skill(s) => Some(s),
            Route::GeneralChat => None,
        }
    }

    /// Display name of the routed target.
    pub fn display_name(&self) -> &str {
        match self {
            Route::Skill(s) => &s.name,
            Route::GeneralChat => GENERAL_CHAT_LABEL,
        }
    }
}

/// A routing decision together with its trace log lines.
#[derive(Debug, Clone)]
pub struct RouteDecision {
    pub route: Route,
    pub log: Vec<String>,
}

/// A fallback rule: utterance wording that implies a skill whose name
/// contains one of the given needles.
struct FallbackRule {
    utterance_needles: &'static [&'static str],
    skill_name_needles: &'static [&'static str],
}

/// Ordered fallback table, evaluated only after keyword matching fails.
const FALLBACK_RULES: &[FallbackRule] = &[
    // Product-ish wording routes to a recommendation skill.
    FallbackRule {
        utterance_needles: &["推荐", "买"],
        skill_name_needles: &["推荐"],
    },
    // External-transfer wording routes to an acquisition skill.
    FallbackRule {
        utterance_needles: &["行外", "支付宝", "微信"],
        skill_name_needles: &["行外", "吸金"],
    },
];

/// Pure routing function over (utterance, skill registry).
#[derive(Debug, Default)]
pub struct IntentRouter;

impl IntentRouter {
    pub fn new() -> Self {
        Self
    }

    /// Route an utterance to the first enabled skill with a keyword hit,
    /// then through the fallback table, then to general chat.
    pub fn route(&self, utterance: &str, skills: &[SkillDescriptor]) -> RouteDecision {
        let matched = skills
            .iter()
            .filter(|s| s.enabled)
            .find(|s| s.trigger_keywords.iter().any(|kw| utterance.contains(kw)))
            .or_else(|| self.apply_fallbacks(utterance, skills));

        let route = match matched {
            Some(skill) => Route::Skill(skill.clone()),
            None => Route::GeneralChat,
        };

        debug!(target = route.display_name(), "routed utterance");

        let log = vec![
            format!("[D] User Input: \"{utterance}\""),
            format!("[S] Routed To: {}", route.display_name()),
        ];
        RouteDecision { route, log }
    }

    fn apply_fallbacks<'a>(
        &self,
        utterance: &str,
        skills: &'a [SkillDescriptor],
    ) -> Option<&'a SkillDescriptor> {
        for rule in FALLBACK_RULES {
            if rule.utterance_needles.iter().any(|n| utterance.contains(n)) {
                let hit = skills.iter().filter(|s| s.enabled).find(|s| {
                    rule.skill_name_needles.iter().any(|n| s.name.contains(n))
                });
                if hit.is_some() {
                    return hit;
                }
            }
        }
        None
    }
}

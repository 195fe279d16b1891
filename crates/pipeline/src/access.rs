//! Tiered access filtering for risk-gated catalogs.
//!
//! A subject's risk grade maps to a permitted set of catalog tiers;
//! access expands monotonically with tier. Unrecognized grades default
//! to the lowest tier (fail safe). Only lines carrying an explicit tier
//! tag are candidates; headers and prose are always excluded.

use regex_lite::Regex;

/// Catalog risk tiers, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskTier {
    R1,
    R2,
    R3,
    R4,
    R5,
}

impl RiskTier {
    pub const ALL: [RiskTier; 5] = [
        RiskTier::R1,
        RiskTier::R2,
        RiskTier::R3,
        RiskTier::R4,
        RiskTier::R5,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::R1 => "R1",
            RiskTier::R2 => "R2",
            RiskTier::R3 => "R3",
            RiskTier::R4 => "R4",
            RiskTier::R5 => "R5",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "R1" => Some(RiskTier::R1),
            "R2" => Some(RiskTier::R2),
            "R3" => Some(RiskTier::R3),
            "R4" => Some(RiskTier::R4),
            "R5" => Some(RiskTier::R5),
            _ => None,
        }
    }
}

/// Grade markers recognized in a free-text risk grade, lowest to highest.
/// Each entry maps a code and its qualitative descriptor to a tier.
const GRADE_TABLE: &[(&str, &str, RiskTier)] = &[
    ("A1", "保守", RiskTier::R1),
    ("A2", "稳健", RiskTier::R2),
    ("A3", "平衡", RiskTier::R3),
    ("A4", "进取", RiskTier::R4),
    ("A5", "激进", RiskTier::R5),
];

/// Result of filtering a tier-tagged catalog.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Tagged lines whose tier is permitted, in document order.
    pub lines: Vec<String>,
    /// The permitted tier set, lowest tier through the matched tier.
    pub permitted: Vec<RiskTier>,
}

/// Filters tier-tagged catalog lines by a subject's risk grade.
#[derive(Debug)]
pub struct AccessFilter {
    tag: Regex,
}

impl AccessFilter {
    pub fn new() -> Self {
        Self {
            tag: Regex::new(r"\[风险等级: (R\d)\]").expect("static pattern"),
        }
    }

    /// Map a free-text grade label to the permitted tier set.
    ///
    /// The highest recognized marker wins; access is `R1..=matched`.
    /// No recognized marker means `{R1}`.
    pub fn permitted_tiers(&self, grade_label: &str) -> Vec<RiskTier> {
        let mut matched = RiskTier::R1;
        for (code, descriptor, tier) in GRADE_TABLE {
            if grade_label.contains(code) || grade_label.contains(descriptor) {
                matched = matched.max(*tier);
            }
        }
        RiskTier::ALL
            .iter()
            .copied()
            .filter(|t| *t <= matched)
            .collect()
    }

    /// Filter a catalog document to the lines the grade may see.
    pub fn filter(&self, grade_label: &str, document: &str) -> FilterOutcome {
        let permitted = self.permitted_tiers(grade_label);
        let lines = document
            .lines()
            .filter(|line| {
                self.tag
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .and_then(|m| RiskTier::from_label(m.as_str()))
                    .is_some_and(|tier| permitted.contains(&tier))
            })
            .map(str::to_string)
            .collect();
        FilterOutcome { lines, permitted }
    }
}

impl Default for AccessFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = "# Q3 产品池\n\
1. 朝朝宝货币基金 [风险等级: R1]\n\
2. 招睿金葵定开 [风险等级: R2]\n\
3. 中证500指数增强 [风险等级: R3]\n\
4. 私募股权精选 [风险等级: R5]\n\
说明：以上产品均需双录。";

    #[test]
    fn a2_grade_permits_r1_and_r2_only() {
        let filter = AccessFilter::new();
        let outcome = filter.filter("A2 (稳健型)", CATALOG);
        assert_eq!(outcome.permitted, vec![RiskTier::R1, RiskTier::R2]);
        assert_eq!(outcome.lines.len(), 2);
        assert!(outcome.lines[0].contains("朝朝宝"));
        assert!(outcome.lines.iter().all(|l| !l.contains("R3")));
    }

    #[test]
    fn descriptor_alone_maps_to_tier() {
        let filter = AccessFilter::new();
        assert_eq!(
            filter.permitted_tiers("平衡"),
            vec![RiskTier::R1, RiskTier::R2, RiskTier::R3]
        );
    }

    #[test]
    fn unrecognized_grade_fails_safe_to_r1() {
        let filter = AccessFilter::new();
        assert_eq!(filter.permitted_tiers("VIP客户"), vec![RiskTier::R1]);
        let outcome = filter.filter("VIP客户", CATALOG);
        assert_eq!(outcome.lines.len(), 1);
    }

    #[test]
    fn permitted_set_is_monotonic() {
        let filter = AccessFilter::new();
        let grades = ["A1", "A2", "A3", "A4", "A5"];
        for pair in grades.windows(2) {
            let lower = filter.permitted_tiers(pair[0]);
            let higher = filter.permitted_tiers(pair[1]);
            assert!(
                lower.iter().all(|t| higher.contains(t)),
                "{} must see everything {} sees",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn untagged_lines_always_excluded() {
        let filter = AccessFilter::new();
        let outcome = filter.filter("A5 (激进型)", CATALOG);
        assert!(outcome.lines.iter().all(|l| l.contains("[风险等级:")));
        assert_eq!(outcome.lines.len(), 4);
    }
}

//! Context assembly: derive a minimal, skill-scoped context bundle from
//! the subject record and knowledge documents.
//!
//! Raw documents are never forwarded when a filtered or derived form
//! exists; the bundle carries only what generation needs. Every source
//! consulted leaves one tagged log entry for the trace panel.

use regex_lite::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use agentforge_core::record::parse_amount;
use agentforge_core::{DocumentStore, SubjectRecord};

use crate::access::AccessFilter;
use crate::router::Route;

/// Task markers carried in the bundle's `task` field.
pub const TASK_HOLDINGS_ANALYSIS: &str = "HOLDINGS_ANALYSIS";
pub const TASK_PRODUCT_RECOMMENDATION: &str = "PRODUCT_RECOMMENDATION";
pub const TASK_EXTERNAL_FUNDS: &str = "EXTERNAL_FUNDS";
pub const TASK_GENERAL_CHAT: &str = "GENERAL_CHAT";

/// Outflow above this amount upgrades the hook product tier.
const HIGH_VALUE_OUTFLOW: f64 = 50_000.0;

/// One-letter source categories for trace classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCategory {
    Framework,
    Knowledge,
    Data,
    Skill,
}

impl SourceCategory {
    pub fn tag(&self) -> char {
        match self {
            SourceCategory::Framework => 'F',
            SourceCategory::Knowledge => 'K',
            SourceCategory::Data => 'D',
            SourceCategory::Skill => 'S',
        }
    }
}

/// One consulted source, rendered as `[X] message` in the trace.
#[derive(Debug, Clone)]
pub struct SourceLogEntry {
    pub category: SourceCategory,
    pub message: String,
}

impl SourceLogEntry {
    fn new(category: SourceCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SourceLogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.category.tag(), self.message)
    }
}

/// The ephemeral per-turn context injected into the generation prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ContextBundle {
    pub task: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub knowledge: Value,
}

impl ContextBundle {
    fn general_chat() -> Self {
        Self {
            task: TASK_GENERAL_CHAT.to_string(),
            data: Value::Null,
            knowledge: Value::Null,
        }
    }
}

/// Bundle plus the source log produced while assembling it.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub bundle: ContextBundle,
    pub log: Vec<SourceLogEntry>,
}

/// Assembles skill-specific context bundles.
#[derive(Debug)]
pub struct ContextAssembler {
    access: AccessFilter,
    problem_chunk: Regex,
}

impl ContextAssembler {
    pub fn new() -> Self {
        Self {
            access: AccessFilter::new(),
            problem_chunk: Regex::new(r"\n\d+\.\s").expect("static pattern"),
        }
    }

    /// Assemble the bundle for one routed turn.
    pub fn assemble(
        &self,
        route: &Route,
        subject: &SubjectRecord,
        documents: &dyn DocumentStore,
    ) -> AssembledContext {
        let assembled = match route.skill() {
            Some(skill) if skill.name.contains("持仓分析") => {
                self.holdings_analysis(subject, documents)
            }
            Some(skill) if skill.name.contains("推荐") => {
                self.product_recommendation(subject, documents)
            }
            Some(skill) if skill.name.contains("行外") || skill.name.contains("吸金") => {
                self.external_funds(subject)
            }
            _ => Self::general_chat(),
        };
        debug!(task = %assembled.bundle.task, sources = assembled.log.len(), "assembled context");
        assembled
    }

    /// Match holdings against the problem list and aggregate market value.
    /// Risk flagging is computed here, not delegated to generation.
    fn holdings_analysis(
        &self,
        subject: &SubjectRecord,
        documents: &dyn DocumentStore,
    ) -> AssembledContext {
        let holdings_raw = subject.get_text("holdings_list_full");
        // JSON-stringified array of holding objects; non-JSON input
        // degrades to no holdings rather than a hard error.
        let holdings: Vec<Value> = serde_json::from_str(&holdings_raw).unwrap_or_default();

        let names: Vec<&str> = holdings
            .iter()
            .filter_map(|h| h["名称"].as_str())
            .collect();

        let total_market_value: f64 = holdings
            .iter()
            .map(|h| match &h["市值"] {
                Value::String(s) => parse_amount(s),
                Value::Number(n) => n.as_f64().unwrap_or(0.0),
                _ => 0.0,
            })
            .sum();

        let problem_list = if documents.contains("global_problem_list") {
            documents.lookup("global_problem_list")
        } else {
            String::new()
        };
        let hits: Vec<&str> = self
            .problem_chunk
            .split(&problem_list)
            .filter(|chunk| !chunk.trim().is_empty())
            .filter(|chunk| names.iter().any(|name| chunk.contains(name)))
            .collect();
        let matched_risk_info = hits.join("\n\n");

        let log = vec![
            SourceLogEntry::new(SourceCategory::Data, format!("引用数据: {holdings_raw}")),
            SourceLogEntry::new(
                SourceCategory::Knowledge,
                format!(
                    "知识检索: {}",
                    if matched_risk_info.is_empty() {
                        "无风险命中 (Safe)"
                    } else {
                        matched_risk_info.as_str()
                    }
                ),
            ),
            SourceLogEntry::new(
                SourceCategory::Framework,
                format!(
                    "动态框架: {}",
                    if hits.is_empty() {
                        "策略: 肯定模式"
                    } else {
                        "策略: 风险警示模式"
                    }
                ),
            ),
        ];

        let bundle = ContextBundle {
            task: TASK_HOLDINGS_ANALYSIS.to_string(),
            data: json!({
                "risk_count": hits.len(),
                "holdings_summary": holdings_raw,
                "total_market_value": total_market_value,
            }),
            knowledge: if matched_risk_info.is_empty() {
                json!("No risks found.")
            } else {
                json!(format!("Risk Details:\n{matched_risk_info}"))
            },
        };

        AssembledContext { bundle, log }
    }

    /// Filter the product pool by risk grade and load the communication
    /// guide for the subject's zodiac sign.
    fn product_recommendation(
        &self,
        subject: &SubjectRecord,
        documents: &dyn DocumentStore,
    ) -> AssembledContext {
        let risk_grade = subject.get_text("risk_grade");
        let zodiac_sign = subject.get_text("zodiac_sign");
        let zodiac_id = subject.get_text("zodiac_id");

        let zodiac_guide = if documents.contains(&zodiac_id) {
            documents.lookup(&zodiac_id)
        } else {
            documents.lookup("z_capricorn")
        };

        let pool = documents.lookup("product_pool_q3");
        let outcome = self.access.filter(&risk_grade, &pool);

        let log = vec![
            SourceLogEntry::new(
                SourceCategory::Data,
                format!("引用数据: 风险等级={risk_grade}, 星座={zodiac_sign}"),
            ),
            SourceLogEntry::new(
                SourceCategory::Knowledge,
                format!("知识检索 (话术): 《{zodiac_sign}沟通秘籍》..."),
            ),
            SourceLogEntry::new(
                SourceCategory::Knowledge,
                format!("知识检索 (产品): 筛选出 {} 个合规产品", outcome.lines.len()),
            ),
            SourceLogEntry::new(
                SourceCategory::Framework,
                "动态框架: \"必须从 valid_product_list 中推荐...\"",
            ),
        ];

        let bundle = ContextBundle {
            task: TASK_PRODUCT_RECOMMENDATION.to_string(),
            data: json!({
                "risk_grade": risk_grade,
                "zodiac": zodiac_sign,
            }),
            knowledge: json!({
                "valid_product_list": outcome.lines.join("\n"),
                "communication_style": zodiac_guide,
            }),
        };

        AssembledContext { bundle, log }
    }

    /// Size the detected outflow and pick the matching hook product.
    fn external_funds(&self, subject: &SubjectRecord) -> AssembledContext {
        let raw = subject.get_text("internet_invest_sum");
        let amount = parse_amount(&raw);
        let high_value = amount > HIGH_VALUE_OUTFLOW;
        let hook_product = if high_value {
            "私行专属稳健理财(3.6%)"
        } else {
            "新客专享固收+(3.2%)"
        };

        let log = vec![
            SourceLogEntry::new(
                SourceCategory::Data,
                format!("引用数据: 互联网平台投资累计={raw}"),
            ),
            SourceLogEntry::new(
                SourceCategory::Knowledge,
                format!("知识检索 (钩子产品): {hook_product}"),
            ),
            SourceLogEntry::new(
                SourceCategory::Framework,
                "动态框架: \"突出收益优势，引导客户将闲钱转入我行管理。\"",
            ),
        ];

        let bundle = ContextBundle {
            task: TASK_EXTERNAL_FUNDS.to_string(),
            data: json!({
                "detected_outflow_amt": raw,
                "competitor": "支付宝/余额宝",
            }),
            knowledge: json!({
                "hook_product": hook_product,
                "highlights": ["T+0到账", "业绩比较基准高出竞品40BP"],
            }),
        };

        AssembledContext { bundle, log }
    }

    fn general_chat() -> AssembledContext {
        AssembledContext {
            bundle: ContextBundle::general_chat(),
            log: vec![
                SourceLogEntry::new(SourceCategory::Framework, "Framework: General Chat Mode"),
                SourceLogEntry::new(SourceCategory::Knowledge, "Knowledge: None loaded"),
            ],
        }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentforge_core::{InMemoryDocumentStore, SkillDescriptor};

    fn subject() -> SubjectRecord {
        let mut rec = SubjectRecord::new();
        rec.set(
            "holdings_list_full",
            r#"[{"prodCode":"005827","名称":"易方达蓝筹精选","市值":"350,000"},{"prodCode":"QD001","名称":"纳斯达克100ETF","市值":"50,000"}]"#,
        );
        rec.set("risk_grade", "A2 (稳健型)");
        rec.set("zodiac_sign", "摩羯座");
        rec.set("zodiac_id", "z_capricorn");
        rec.set("internet_invest_sum", "800,000.00");
        rec
    }

    fn documents() -> InMemoryDocumentStore {
        let mut store = InMemoryDocumentStore::new();
        store.insert(
            "global_problem_list",
            "Q3重点调出清单\n1. 易方达蓝筹精选：赛道景气度下行。\n2. 中欧医疗健康：超额收益能力下降。",
        );
        store.insert(
            "product_pool_q3",
            "# Q3 产品池\n1. 朝朝宝 [风险等级: R1]\n2. 招睿金葵 [风险等级: R2]\n3. 指数增强 [风险等级: R3]",
        );
        store.insert("z_capricorn", "摩羯座客户注重安全感，沟通时先给结论再给数据。");
        store
    }

    fn route_for(name: &str) -> Route {
        Route::Skill(SkillDescriptor::new("s1", name, ["x"]))
    }

    #[test]
    fn holdings_analysis_flags_problem_products() {
        let assembler = ContextAssembler::new();
        let out = assembler.assemble(
            &route_for("持仓分析 (Holdings Analysis)"),
            &subject(),
            &documents(),
        );
        assert_eq!(out.bundle.task, TASK_HOLDINGS_ANALYSIS);
        assert_eq!(out.bundle.data["risk_count"], 1);
        assert_eq!(out.bundle.data["total_market_value"], 400_000.0);
        let knowledge = out.bundle.knowledge.as_str().unwrap();
        assert!(knowledge.contains("易方达蓝筹精选"));
        assert!(out.log.iter().any(|e| e.to_string().starts_with("[F]")
            && e.message.contains("风险警示模式")));
    }

    #[test]
    fn holdings_fields_extracted_from_json_quoted_keys() {
        let assembler = ContextAssembler::new();
        let mut rec = subject();
        rec.set(
            "holdings_list_full",
            r#"[{"名称":"中欧医疗健康","市值":"120,000"},{"名称":"朝朝宝","市值":30000}]"#,
        );
        let out = assembler.assemble(
            &route_for("持仓分析 (Holdings Analysis)"),
            &rec,
            &documents(),
        );
        // Quoted keys must not bleed into the extracted name.
        let knowledge = out.bundle.knowledge.as_str().unwrap();
        assert!(knowledge.contains("中欧医疗健康"));
        assert_eq!(out.bundle.data["risk_count"], 1);
        assert_eq!(out.bundle.data["total_market_value"], 150_000.0);
    }

    #[test]
    fn holdings_analysis_tolerates_non_json_payload() {
        let assembler = ContextAssembler::new();
        let mut rec = subject();
        rec.set("holdings_list_full", "暂无持仓数据");
        let out = assembler.assemble(
            &route_for("持仓分析 (Holdings Analysis)"),
            &rec,
            &documents(),
        );
        assert_eq!(out.bundle.data["risk_count"], 0);
        assert_eq!(out.bundle.data["total_market_value"], 0.0);
        assert!(out.log.iter().any(|e| e.message.contains("肯定模式")));
    }

    #[test]
    fn holdings_analysis_without_hits_is_affirmative() {
        let assembler = ContextAssembler::new();
        let mut rec = subject();
        rec.set(
            "holdings_list_full",
            r#"[{"名称":"朝朝宝","市值":"50,000"}]"#,
        );
        let out = assembler.assemble(
            &route_for("持仓分析 (Holdings Analysis)"),
            &rec,
            &documents(),
        );
        assert_eq!(out.bundle.data["risk_count"], 0);
        assert_eq!(out.bundle.knowledge, "No risks found.");
        assert!(out.log.iter().any(|e| e.message.contains("肯定模式")));
    }

    #[test]
    fn product_recommendation_filters_pool_by_grade() {
        let assembler = ContextAssembler::new();
        let out = assembler.assemble(
            &route_for("产品推荐 (Product Rec)"),
            &subject(),
            &documents(),
        );
        assert_eq!(out.bundle.task, TASK_PRODUCT_RECOMMENDATION);
        let list = out.bundle.knowledge["valid_product_list"].as_str().unwrap();
        assert!(list.contains("朝朝宝"));
        assert!(list.contains("招睿金葵"));
        assert!(!list.contains("指数增强"));
        assert_eq!(out.bundle.data["risk_grade"], "A2 (稳健型)");
        assert!(out
            .log
            .iter()
            .any(|e| e.message.contains("筛选出 2 个合规产品")));
    }

    #[test]
    fn unknown_zodiac_falls_back_to_default_guide() {
        let assembler = ContextAssembler::new();
        let mut rec = subject();
        rec.set("zodiac_id", "z_unknown");
        let out = assembler.assemble(&route_for("产品推荐"), &rec, &documents());
        let style = out.bundle.knowledge["communication_style"].as_str().unwrap();
        assert!(style.contains("摩羯座"));
    }

    #[test]
    fn external_funds_high_value_picks_private_banking_hook() {
        let assembler = ContextAssembler::new();
        let out = assembler.assemble(&route_for("行外吸金 (External Funds)"), &subject(), &documents());
        assert_eq!(out.bundle.task, TASK_EXTERNAL_FUNDS);
        assert_eq!(out.bundle.data["detected_outflow_amt"], "800,000.00");
        assert!(out.bundle.knowledge["hook_product"]
            .as_str()
            .unwrap()
            .contains("私行专属"));
    }

    #[test]
    fn external_funds_low_value_picks_entry_hook() {
        let assembler = ContextAssembler::new();
        let mut rec = subject();
        rec.set("internet_invest_sum", "2,000.00");
        let out = assembler.assemble(&route_for("行外吸金"), &rec, &documents());
        assert!(out.bundle.knowledge["hook_product"]
            .as_str()
            .unwrap()
            .contains("新客专享"));
    }

    #[test]
    fn general_chat_bundle_is_degenerate() {
        let assembler = ContextAssembler::new();
        let out = assembler.assemble(&Route::GeneralChat, &subject(), &documents());
        assert_eq!(out.bundle.task, TASK_GENERAL_CHAT);
        let json = serde_json::to_string(&out.bundle).unwrap();
        assert_eq!(json, r#"{"task":"GENERAL_CHAT"}"#);
        assert_eq!(out.log.len(), 2);
    }

    #[test]
    fn source_log_entries_render_with_category_tags() {
        let entry = SourceLogEntry::new(SourceCategory::Data, "引用数据: x");
        assert_eq!(entry.to_string(), "[D] 引用数据: x");
        assert_eq!(SourceCategory::Skill.tag(), 'S');
    }
}

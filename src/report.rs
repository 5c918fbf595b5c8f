use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::advice::{
    self, GrowthPhase, MonthlyStage, OverallSummary, Personality, StageTraits, TopicAdvice,
};
use crate::careability::{careability_index, CareabilityPoint};
use crate::cycle::Element;
use crate::error::{BaziError, Result};
use crate::llm::{
    generate_analysis, generate_monthly_guide, generate_overall_summary, AnalysisKind, LlmProvider,
};
use crate::scoring::Chart;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Canned,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaYinReading {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub chart: Chart,
    pub na_yin: NaYinReading,
    pub analysis_source: AnalysisSource,
    pub overall_analysis: String,
    pub summary_source: AnalysisSource,
    pub overall_summary: OverallSummary,
    pub personality: Personality,
    pub growth_phases: Vec<GrowthPhase>,
    pub stage_traits: Vec<StageTraits>,
    pub topic_advice: TopicAdvice,
    pub monthly_source: AnalysisSource,
    pub monthly_table: Vec<MonthlyStage>,
    pub careability: Vec<CareabilityPoint>,
}

/// Remote generation for the analysis, summary and monthly guide
pub struct RemoteAnalysis<'a> {
    pub provider: &'a dyn LlmProvider,
    pub kind: AnalysisKind,
    /// Name used in the prompts
    pub name: &'a str,
}

fn or_canned<T>(
    section: &str,
    generated: Option<Result<T>>,
    canned: impl FnOnce() -> T,
) -> (T, AnalysisSource) {
    match generated {
        Some(Ok(value)) => (value, AnalysisSource::Generated),
        Some(Err(e)) => {
            tracing::warn!(section, error = %e, "Remote generation failed, using canned text");
            (canned(), AnalysisSource::Canned)
        }
        None => (canned(), AnalysisSource::Canned),
    }
}

/// Assemble the full report. Each generated section falls back to its
/// canned version when the remote call fails.
pub fn build_report(chart: Chart, seed: u64, remote: Option<RemoteAnalysis<'_>>) -> Report {
    let profile = &chart.elemental_profile;

    let (overall_analysis, analysis_source) = or_canned(
        "overall_analysis",
        remote
            .as_ref()
            .map(|r| generate_analysis(r.provider, &chart, r.kind)),
        || advice::overall_analysis(&chart),
    );
    let (overall_summary, summary_source) = or_canned(
        "overall_summary",
        remote
            .as_ref()
            .map(|r| generate_overall_summary(r.provider, &chart, r.name)),
        || advice::overall_summary(profile),
    );
    // An empty guide is as useless as a failed call.
    let (monthly_table, monthly_source) = or_canned(
        "monthly_table",
        remote.as_ref().map(|r| {
            generate_monthly_guide(r.provider, &chart, r.name).and_then(|stages| {
                if stages.is_empty() {
                    Err(BaziError::RemoteService("monthly guide had no stages".into()))
                } else {
                    Ok(stages)
                }
            })
        }),
        || advice::monthly_table(profile, seed),
    );

    let [year, month, day, hour] = chart
        .pillars
        .na_yin()
        .map(|n| n.unwrap_or("未知").to_string());

    Report {
        generated_at: Utc::now(),
        seed,
        na_yin: NaYinReading {
            year,
            month,
            day,
            hour,
        },
        analysis_source,
        overall_analysis,
        summary_source,
        overall_summary,
        personality: advice::personality(&chart.pillars, profile),
        growth_phases: advice::growth_phases(profile),
        stage_traits: advice::stage_traits(profile),
        topic_advice: advice::topic_advice(profile),
        monthly_source,
        monthly_table,
        careability: careability_index(profile),
        chart,
    }
}

fn elements_line(elements: &[Element]) -> String {
    elements
        .iter()
        .map(|e| e.symbol())
        .collect::<Vec<_>>()
        .join("、")
}

fn push_list(out: &mut String, items: &[String]) {
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
}

pub fn render_chart_markdown(chart: &Chart) -> String {
    let p = &chart.pillars;
    let profile = &chart.elemental_profile;
    let mut out = String::new();

    out.push_str(&format!("# 八字 {}\n\n", p.symbol));
    out.push_str(&format!(
        "**出生:** {} {:02}時\n\n",
        chart.birth.date, chart.birth.hour
    ));
    out.push_str("| 年柱 | 月柱 | 日柱 | 時柱 |\n");
    out.push_str("|------|------|------|------|\n");
    out.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        p.year, p.month, p.day, p.hour
    ));

    out.push_str("## 五行\n\n");
    for element in Element::ALL {
        out.push_str(&format!(
            "- {}: {:.1} ({:.1}%)\n",
            element,
            profile.tally.get(element),
            profile.percentages.get(element)
        ));
    }
    out.push_str(&format!(
        "\n**日主:** {} ({}, {:.1}%)\n",
        profile.day_element,
        profile.strength.label(),
        profile.day_share
    ));
    out.push_str(&format!("**喜用:** {}\n", elements_line(&profile.favorable)));
    out.push_str(&format!("**忌:** {}\n", elements_line(&profile.unfavorable)));
    out
}

pub fn render_markdown(report: &Report) -> String {
    let mut out = render_chart_markdown(&report.chart);
    let n = &report.na_yin;

    out.push_str("\n## 納音\n\n");
    out.push_str(&format!(
        "年 {} · 月 {} · 日 {} · 時 {}\n",
        n.year, n.month, n.day, n.hour
    ));

    out.push_str("\n## 整體分析\n\n");
    out.push_str(&format!("{}\n", report.overall_analysis));

    let summary = &report.overall_summary;
    out.push_str("\n## 0-6歲摘要\n\n### 性格重點\n\n");
    push_list(&mut out, &summary.personality_highlights);
    for stage in &summary.age_stages {
        out.push_str(&format!("\n### {}\n\n{}\n", stage.age, stage.summary));
    }
    out.push_str("\n### 團體生活\n\n");
    push_list(&mut out, &summary.group_life_advice);

    out.push_str("\n## 性格\n\n");
    out.push_str(&format!("**標籤:** {}\n\n", report.personality.tags.join("、")));
    push_list(&mut out, &report.personality.details);
    out.push_str(&format!("\n{}\n", report.personality.summary));

    out.push_str("\n## 成長階段\n\n");
    for phase in &report.growth_phases {
        out.push_str(&format!(
            "### {} {}\n\n{}\n\n",
            phase.age, phase.title, phase.description
        ));
    }

    out.push_str("## 各階段特點\n");
    for stage in &report.stage_traits {
        out.push_str(&format!("\n### {}\n\n", stage.age));
        push_list(&mut out, &stage.traits);
    }

    let topics = &report.topic_advice;
    out.push_str("\n## 教育與健康\n\n### 學習方式\n\n");
    push_list(&mut out, &topics.learning_style);
    out.push_str("\n### 溝通方式\n\n");
    push_list(&mut out, &topics.communication);
    out.push_str("\n### 興趣培養\n\n");
    push_list(&mut out, &topics.interests);
    out.push_str(&format!(
        "\n### 健康\n\n{}\n\n{}\n\n{}\n",
        topics.constitution, topics.diet, topics.exercise
    ));

    out.push_str("\n## 0-12月指南\n\n");
    for stage in &report.monthly_table {
        out.push_str(&format!("### {} {}\n\n", stage.title, stage.period));
        out.push_str(&format!("**特色:** {}\n", stage.characteristics.join("；")));
        out.push_str(&format!("**挑戰:** {}\n", stage.challenges.join("；")));
        out.push_str(&format!("**照護:** {}\n\n", stage.care_advice.join("；")));
    }

    out.push_str("## 好帶指數\n\n| 月齡 | 指數 |\n|------|------|\n");
    for point in &report.careability {
        out.push_str(&format!("| {}M | {:.1} |\n", point.month, point.index));
    }

    out
}

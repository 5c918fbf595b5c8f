use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::advice::{infant_period, AgeStageSummary, MonthlyStage, OverallSummary};
use crate::config::LlmConfig;
use crate::cycle::Element;
use crate::error::{BaziError, Result};
use crate::scoring::Chart;

const SYSTEM_PROMPT: &str = "你是一位專業的八字命理師和兒童發展專家，擅長根據八字分析提供個性化的育兒建議。請用繁體中文回答，內容要專業、實用且溫暖。";

/// Topic of a generated analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Personality,
    Growth,
    Education,
    Health,
    General,
}

/// Trait for chat-completion providers. One attempt per call, no retry.
pub trait LlmProvider: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// OpenAI-compatible chat-completion client
pub struct OpenAiProvider {
    api_key: String,
    config: LlmConfig,
    client: reqwest::blocking::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, config: LlmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BaziError::RemoteService(format!("failed to build client: {}", e)))?;
        Ok(Self {
            api_key: api_key.trim().to_string(),
            config,
            client,
        })
    }
}

impl LlmProvider for OpenAiProvider {
    fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::info!(model = %self.config.model, url = %self.config.base_url, "Requesting chat completion");

        let res = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| BaziError::RemoteService(format!("request failed: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(BaziError::RemoteService(format!("status {}: {}", status, body)));
        }

        let parsed: ChatResponse = res
            .json()
            .map_err(|e| BaziError::RemoteService(format!("malformed response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BaziError::RemoteService("response had no choices".into()))
    }
}

/// Mock provider for deterministic testing
pub struct MockLlmProvider {
    calls: AtomicU32,
    fail: bool,
    reply: Option<String>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail: false,
            reply: None,
        }
    }

    /// Every call fails with a remote-service error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Every call returns `reply` verbatim
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for MockLlmProvider {
    fn generate(&self, prompt: &str) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BaziError::RemoteService("status 503: mock outage".into()));
        }
        if let Some(reply) = &self.reply {
            return Ok(reply.clone());
        }
        let first_line = prompt.lines().next().unwrap_or_default();
        Ok(format!("Mock analysis {} for: {}", n, first_line))
    }
}

fn join_elements(elements: &[Element]) -> String {
    elements
        .iter()
        .map(|e| e.symbol())
        .collect::<Vec<_>>()
        .join("、")
}

/// Prompt for a free-text analysis of the given kind
pub fn build_prompt(chart: &Chart, kind: AnalysisKind) -> String {
    let p = &chart.pillars;
    let profile = &chart.elemental_profile;
    let bazi_info = format!("八字: {} {} {} {}", p.year, p.month, p.day, p.hour);
    let element_info = format!(
        "日主五行: {}, 強度: {}, 喜用神: {}, 忌神: {}",
        profile.day_element,
        profile.strength.label(),
        join_elements(&profile.favorable),
        join_elements(&profile.unfavorable)
    );

    let (lead, ask) = match kind {
        AnalysisKind::Personality => (
            "根據以下八字信息，分析這位寶寶的性格特質、優勢和潛在挑戰，以及如何根據這些特質進行教育和引導。",
            "請提供詳細的性格分析，包括主要特質、情緒傾向、學習風格、人際關係特點等方面。分析應該具體、實用，並提供針對性的教育建議。",
        ),
        AnalysisKind::Growth => (
            "根據以下八字信息，分析這位寶寶在0-10歲各個成長階段的特點、挑戰和機遇，以及如何根據八字特質進行有針對性的培養。",
            "請分析0-3歲、4-6歲、7-10歲三個階段的成長特點，包括身心發展、學習能力、社交能力等方面，並提供具體的教育和培養建議。",
        ),
        AnalysisKind::Education => (
            "根據以下八字信息，分析這位寶寶的學習特點、適合的教育方式和可能的學習挑戰，以及如何根據八字特質進行有針對性的教育引導。",
            "請提供詳細的學習風格分析，包括認知方式、注意力特點、學習動機等方面，並提供具體的教育策略和方法建議。",
        ),
        AnalysisKind::Health => (
            "根據以下八字信息，分析這位寶寶的體質特點、可能的健康優勢和需要注意的健康問題，以及如何根據八字特質進行有針對性的健康管理。",
            "請提供詳細的體質分析，包括先天稟賦、免疫力特點、可能的敏感點等方面，並提供具體的健康管理和預防建議。",
        ),
        AnalysisKind::General => (
            "根據以下八字信息，進行全面分析，包括性格特質、成長發展、教育方式和健康管理等方面。",
            "請提供詳細、實用的分析和建議，幫助家長更好地理解和培養孩子。",
        ),
    };

    format!("{}\n\n{}\n{}\n\n{}", lead, bazi_info, element_info, ask)
}

pub fn generate_analysis(
    provider: &dyn LlmProvider,
    chart: &Chart,
    kind: AnalysisKind,
) -> Result<String> {
    let prompt = build_prompt(chart, kind);
    let text = provider.generate(&prompt)?;
    tracing::info!(kind = ?kind, chars = text.chars().count(), "Generated analysis");
    Ok(text)
}

/// Structured personality reading requested as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityInsight {
    pub traits: Vec<String>,
    pub description: String,
    pub strengths: Vec<String>,
    pub challenges: Vec<String>,
}

impl Default for PersonalityInsight {
    fn default() -> Self {
        Self {
            traits: ["溫和", "敏感", "好奇", "活潑", "聰明"].map(String::from).to_vec(),
            description: "根據八字分析，這個寶寶具有獨特的性格特質，需要細心的照護和引導。".into(),
            strengths: ["學習能力強", "適應力佳", "情感豐富"].map(String::from).to_vec(),
            challenges: ["需要更多安全感", "對環境變化敏感", "情緒表達需要引導"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Pillar and element block shared by the JSON prompts
fn chart_brief(chart: &Chart) -> String {
    let p = &chart.pillars;
    let profile = &chart.elemental_profile;
    format!(
        "八字信息：\n- 年柱：{}\n- 月柱：{}\n- 日柱：{}\n- 時柱：{}\n\n五行分析：\n- 日主五行：{}\n- 五行強弱：{}\n- 有利五行：{}",
        p.year,
        p.month,
        p.day,
        p.hour,
        profile.day_element,
        profile.strength.label(),
        join_elements(&profile.favorable),
    )
}

/// Body of a reply, without a surrounding ```json fence
fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim()
}

pub fn personality_prompt(chart: &Chart, name: &str) -> String {
    format!(
        r#"請根據以下八字信息為{name}提供個性化的性格分析：

{brief}

請提供以下內容（請以JSON格式回答）：
{{
  "traits": ["性格標籤1", "性格標籤2", "性格標籤3", "性格標籤4", "性格標籤5"],
  "description": "詳細的性格描述（100-150字）",
  "strengths": ["優勢1", "優勢2", "優勢3"],
  "challenges": ["挑戰1", "挑戰2", "挑戰3"]
}}"#,
        name = name,
        brief = chart_brief(chart),
    )
}

/// Parse a JSON personality reply, tolerating a ```json fence. Unparseable
/// replies fall back to the default reading.
pub fn parse_personality_response(text: &str) -> PersonalityInsight {
    match serde_json::from_str::<PersonalityInsight>(strip_json_fence(text)) {
        Ok(insight) => insight,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable personality reply, using default");
            PersonalityInsight::default()
        }
    }
}

pub fn monthly_guide_prompt(chart: &Chart, name: &str) -> String {
    format!(
        r#"請根據以下八字信息為{name}提供0-12個月的個性化育兒指南：

{brief}

請提供6個階段的指南（0-1月、2-3月、4-5月、6-7月、8-9月、10-12月），每個階段包含：
- 發展特色（3-4個）
- 主要挑戰（2-3個）
- 照護建議（3-4個）

請以JSON格式回答：
{{
  "stages": [
    {{
      "months": "0-1月",
      "characteristics": ["特色1", "特色2", "特色3"],
      "challenges": ["挑戰1", "挑戰2"],
      "advice": ["建議1", "建議2", "建議3"]
    }}
  ]
}}"#,
        name = name,
        brief = chart_brief(chart),
    )
}

#[derive(Deserialize)]
struct GuideReply {
    #[serde(default)]
    stages: Vec<GuideStageReply>,
}

#[derive(Deserialize)]
struct GuideStageReply {
    months: String,
    #[serde(default)]
    characteristics: Vec<String>,
    #[serde(default)]
    challenges: Vec<String>,
    #[serde(default)]
    advice: Vec<String>,
}

/// Month numbers in a span such as `10-12月` or `3月`
fn month_span(label: &str) -> Vec<u32> {
    let span = label.trim().trim_end_matches('月');
    let bounds: Option<(u32, u32)> = match span.split_once('-') {
        Some((from, to)) => from.trim().parse().ok().zip(to.trim().parse().ok()),
        None => span.parse().ok().map(|m| (m, m)),
    };
    match bounds {
        Some((from, to)) if from <= to => (from..=to).collect(),
        _ => Vec::new(),
    }
}

impl From<GuideStageReply> for MonthlyStage {
    fn from(reply: GuideStageReply) -> Self {
        let title = reply.months.trim().to_string();
        Self {
            period: infant_period(&title).unwrap_or_default().to_string(),
            months: month_span(&title),
            title,
            characteristics: reply.characteristics,
            challenges: reply.challenges,
            care_advice: reply.advice,
        }
    }
}

/// Parse a JSON monthly guide. Unparseable replies yield no stages.
pub fn parse_monthly_guide_response(text: &str) -> Vec<MonthlyStage> {
    match serde_json::from_str::<GuideReply>(strip_json_fence(text)) {
        Ok(reply) => reply.stages.into_iter().map(MonthlyStage::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable monthly guide reply");
            Vec::new()
        }
    }
}

pub fn generate_monthly_guide(
    provider: &dyn LlmProvider,
    chart: &Chart,
    name: &str,
) -> Result<Vec<MonthlyStage>> {
    let reply = provider.generate(&monthly_guide_prompt(chart, name))?;
    Ok(parse_monthly_guide_response(&reply))
}

pub fn overall_summary_prompt(chart: &Chart, name: &str) -> String {
    format!(
        r#"請根據以下八字信息為{name}提供0-6歲的整體成長摘要：

{brief}

請提供以下內容（請以JSON格式回答）：
{{
  "personalityHighlights": ["性格重點1", "性格重點2", "性格重點3"],
  "ageStages": {{
    "infant": "0-2歲階段摘要（50-80字）",
    "toddler": "3-4歲階段摘要（50-80字）",
    "preschool": "5-6歲階段摘要（50-80字）"
  }},
  "groupLifeAdvice": ["團體生活建議1", "團體生活建議2", "團體生活建議3"]
}}"#,
        name = name,
        brief = chart_brief(chart),
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryReply {
    personality_highlights: Vec<String>,
    age_stages: AgeStagesReply,
    group_life_advice: Vec<String>,
}

#[derive(Deserialize)]
struct AgeStagesReply {
    infant: String,
    toddler: String,
    preschool: String,
}

fn summary_from_parts(
    highlights: Vec<String>,
    [infant, toddler, preschool]: [String; 3],
    group_life_advice: Vec<String>,
) -> OverallSummary {
    let age_stages = [("0-2歲", infant), ("3-4歲", toddler), ("5-6歲", preschool)]
        .into_iter()
        .map(|(age, summary)| AgeStageSummary {
            age: age.into(),
            summary,
        })
        .collect();
    OverallSummary {
        personality_highlights: highlights,
        age_stages,
        group_life_advice,
    }
}

/// Summary used when a generated reply cannot be parsed
pub fn default_overall_summary() -> OverallSummary {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    summary_from_parts(
        owned(&["性格溫和", "學習能力強", "需要安全感"]),
        [
            "嬰兒期需要充分的愛與關懷，建立安全的依附關係。".into(),
            "幼兒期開始展現個性，需要耐心引導和適當的界限設定。".into(),
            "學齡前期好奇心旺盛，適合多元化的學習體驗。".into(),
        ],
        owned(&["培養社交技能", "學習分享合作", "建立規則意識"]),
    )
}

/// Parse a JSON overall summary, tolerating a ```json fence. Unparseable
/// replies fall back to the default summary.
pub fn parse_overall_summary_response(text: &str) -> OverallSummary {
    match serde_json::from_str::<SummaryReply>(strip_json_fence(text)) {
        Ok(reply) => {
            let ages = reply.age_stages;
            summary_from_parts(
                reply.personality_highlights,
                [ages.infant, ages.toddler, ages.preschool],
                reply.group_life_advice,
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable overall summary reply, using default");
            default_overall_summary()
        }
    }
}

pub fn generate_overall_summary(
    provider: &dyn LlmProvider,
    chart: &Chart,
    name: &str,
) -> Result<OverallSummary> {
    let reply = provider.generate(&overall_summary_prompt(chart, name))?;
    Ok(parse_overall_summary_response(&reply))
}

pub fn generate_personality_insight(
    provider: &dyn LlmProvider,
    chart: &Chart,
    name: &str,
) -> Result<PersonalityInsight> {
    let reply = provider.generate(&personality_prompt(chart, name))?;
    Ok(parse_personality_response(&reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::pillar::BirthMoment;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn make_chart() -> Chart {
        let birth = BirthMoment::new(1990, 1, 1, 8).unwrap();
        Chart::compute(birth, &AppConfig::default()).unwrap()
    }

    /// Serve one HTTP response on a local port and return the endpoint URL
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                let lower = line.to_ascii_lowercase();
                if let Some(v) = lower.strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        });

        format!("http://{}/v1/chat/completions", addr)
    }

    fn provider_for(url: String) -> OpenAiProvider {
        let config = LlmConfig {
            base_url: url,
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        OpenAiProvider::new("test-key", config).unwrap()
    }

    #[test]
    fn test_build_prompt_includes_chart() {
        let chart = make_chart();
        let prompt = build_prompt(&chart, AnalysisKind::Health);

        assert!(prompt.contains("八字: 庚午 丙寅 壬辰 甲辰"));
        assert!(prompt.contains("日主五行: 水, 強度: 中, 喜用神: 金、木, 忌神: 土、火"));
        assert!(prompt.contains("體質"));
    }

    #[test]
    fn test_each_kind_has_distinct_prompt() {
        let chart = make_chart();
        let kinds = [
            AnalysisKind::Personality,
            AnalysisKind::Growth,
            AnalysisKind::Education,
            AnalysisKind::Health,
            AnalysisKind::General,
        ];
        let prompts: Vec<String> = kinds.iter().map(|k| build_prompt(&chart, *k)).collect();
        for (i, a) in prompts.iter().enumerate() {
            for b in prompts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_mock_provider_generate() {
        let provider = MockLlmProvider::new();
        let chart = make_chart();

        let text = generate_analysis(&provider, &chart, AnalysisKind::General).unwrap();
        assert!(text.starts_with("Mock analysis 0"));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_mock_provider_failure_is_remote_error() {
        let provider = MockLlmProvider::failing();
        let result = generate_analysis(&provider, &make_chart(), AnalysisKind::Growth);
        assert!(matches!(result, Err(BaziError::RemoteService(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_parse_personality_response() {
        let reply = r#"```json
{
  "traits": ["好奇", "溫和", "專注", "敏感", "獨立"],
  "description": "測試描述",
  "strengths": ["觀察力"],
  "challenges": ["怕生"]
}
```"#;
        let insight = parse_personality_response(reply);
        assert_eq!(insight.traits.len(), 5);
        assert_eq!(insight.description, "測試描述");
        assert_eq!(insight.challenges, vec!["怕生".to_string()]);
    }

    #[test]
    fn test_parse_personality_response_falls_back() {
        let insight = parse_personality_response("not json at all");
        assert_eq!(insight, PersonalityInsight::default());
    }

    #[test]
    fn test_personality_insight_via_mock() {
        let provider = MockLlmProvider::with_reply(
            r#"{"traits":["a"],"description":"d","strengths":[],"challenges":[]}"#,
        );
        let insight = generate_personality_insight(&provider, &make_chart(), "小明").unwrap();
        assert_eq!(insight.traits, vec!["a".to_string()]);
    }

    #[test]
    fn test_monthly_guide_prompt_lists_stages() {
        let prompt = monthly_guide_prompt(&make_chart(), "小明");
        assert!(prompt.starts_with("請根據以下八字信息為小明提供0-12個月"));
        assert!(prompt.contains("- 年柱：庚午"));
        assert!(prompt.contains("10-12月"));
        assert!(prompt.contains("\"stages\""));
    }

    #[test]
    fn test_parse_monthly_guide_response() {
        let reply = r#"```json
{"stages":[
  {"months":"0-1月","characteristics":["睡得多"],"challenges":["夜醒"],"advice":["包巾"]},
  {"months":"10-12月","characteristics":["學步"],"challenges":[],"advice":[]}
]}
```"#;
        let stages = parse_monthly_guide_response(reply);

        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].title, "0-1月");
        assert_eq!(stages[0].period, "新生兒期");
        assert_eq!(stages[0].months, vec![0, 1]);
        assert_eq!(stages[0].care_advice, vec!["包巾".to_string()]);
        assert_eq!(stages[1].months, vec![10, 11, 12]);
    }

    #[test]
    fn test_parse_monthly_guide_response_unparseable_is_empty() {
        assert!(parse_monthly_guide_response("抱歉，我無法回答").is_empty());
        assert!(parse_monthly_guide_response("{}").is_empty());
    }

    #[test]
    fn test_month_span() {
        assert_eq!(month_span("2-3月"), vec![2, 3]);
        assert_eq!(month_span("5月"), vec![5]);
        assert!(month_span("幼兒期").is_empty());
        assert!(month_span("9-3月").is_empty());
    }

    #[test]
    fn test_generate_monthly_guide_via_mock() {
        let provider = MockLlmProvider::with_reply(
            r#"{"stages":[{"months":"4-5月","characteristics":["翻身"],"challenges":["長牙"],"advice":["陪玩"]}]}"#,
        );
        let stages = generate_monthly_guide(&provider, &make_chart(), "寶寶").unwrap();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].period, "互動期");

        let failing = MockLlmProvider::failing();
        assert!(generate_monthly_guide(&failing, &make_chart(), "寶寶").is_err());
    }

    #[test]
    fn test_overall_summary_prompt_asks_for_json() {
        let prompt = overall_summary_prompt(&make_chart(), "小華");
        assert!(prompt.starts_with("請根據以下八字信息為小華提供0-6歲"));
        assert!(prompt.contains("\"personalityHighlights\""));
        assert!(prompt.contains("- 有利五行：金、木"));
    }

    #[test]
    fn test_parse_overall_summary_response() {
        let reply = r#"{
  "personalityHighlights": ["敏銳", "溫和"],
  "ageStages": {"infant": "嬰兒", "toddler": "幼兒", "preschool": "學前"},
  "groupLifeAdvice": ["多交朋友"]
}"#;
        let summary = parse_overall_summary_response(reply);

        assert_eq!(summary.personality_highlights, vec!["敏銳".to_string(), "溫和".to_string()]);
        assert_eq!(summary.age_stages.len(), 3);
        assert_eq!(summary.age_stages[1].age, "3-4歲");
        assert_eq!(summary.age_stages[1].summary, "幼兒");
        assert_eq!(summary.group_life_advice, vec!["多交朋友".to_string()]);
    }

    #[test]
    fn test_parse_overall_summary_response_falls_back() {
        let summary = parse_overall_summary_response("```json\n{\"personalityHighlights\": 3}\n```");
        assert_eq!(summary, default_overall_summary());
        assert_eq!(summary.age_stages[0].age, "0-2歲");
        assert_eq!(summary.group_life_advice[2], "建立規則意識");
    }

    #[test]
    fn test_generate_overall_summary_failure_is_remote_error() {
        let provider = MockLlmProvider::failing();
        let result = generate_overall_summary(&provider, &make_chart(), "寶寶");
        assert!(matches!(result, Err(BaziError::RemoteService(_))));
    }

    #[test]
    fn test_personality_prompt_names_child() {
        let prompt = personality_prompt(&make_chart(), "小明");
        assert!(prompt.starts_with("請根據以下八字信息為小明"));
        assert!(prompt.contains("- 日柱：壬辰"));
        assert!(prompt.contains("\"traits\""));
    }

    #[test]
    fn test_openai_provider_success() {
        let url = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"生成的分析"}}]}"#,
        );
        let text = provider_for(url).generate("hello").unwrap();
        assert_eq!(text, "生成的分析");
    }

    #[test]
    fn test_openai_provider_non_2xx_is_remote_error() {
        let url = serve_once("HTTP/1.1 401 Unauthorized", r#"{"error":"bad key"}"#);
        let result = provider_for(url).generate("hello");
        match result {
            Err(BaziError::RemoteService(msg)) => assert!(msg.contains("401"), "{}", msg),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn test_openai_provider_empty_choices_is_remote_error() {
        let url = serve_once("HTTP/1.1 200 OK", r#"{"choices":[]}"#);
        let result = provider_for(url).generate("hello");
        assert!(matches!(result, Err(BaziError::RemoteService(_))));
    }

    #[test]
    fn test_openai_provider_connection_refused() {
        // Bind then drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{}/v1/chat/completions", port);
        let result = provider_for(url).generate("hello");
        assert!(matches!(result, Err(BaziError::RemoteService(_))));
    }
}

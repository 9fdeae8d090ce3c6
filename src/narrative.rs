use serde::Serialize;
use serde_json::{Map, Value};

use crate::game_mode::{GameMode, GameModeRegistry, default_registry};
use crate::model::{
    AgendaItem, AgendaStatus, Capability, CapabilityPayload, CapabilityResult, Confidence,
    DataPoint, Insight, InsightsResult, MacroReviewResult, PredictionResult, Severity,
    StrategicRecommendation, UNKNOWN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Critical,
    Warning,
    Info,
    Positive,
    Neutral,
}

impl Tone {
    pub fn icon(self) -> &'static str {
        match self {
            Tone::Critical => "🔴",
            Tone::Warning => "🟠",
            Tone::Info => "🟡",
            Tone::Positive => "🟢",
            Tone::Neutral => "•",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    DataPoints,
    Insights,
    Recommendations,
    Commentary,
    MatchInfo,
    Agenda,
    Summary,
    Scenario,
    GameState,
    PrimaryOption,
    AlternativeOption,
    Recommendation,
    Analysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Inline(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail {
    pub label: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// 1-based position for enumerated lists.
    pub ordinal: Option<usize>,
    pub tone: Option<Tone>,
    pub badge: Option<String>,
    pub headline: String,
    pub details: Vec<Detail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Paragraph {
        text: String,
    },
    Field {
        label: String,
        value: FieldValue,
        tone: Option<Tone>,
    },
    Entry(Entry),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: String,
    pub icon: &'static str,
    pub tone: Tone,
    pub items: Vec<Item>,
}

impl Section {
    fn new(kind: SectionKind, icon: &'static str, heading: impl Into<String>) -> Self {
        Self {
            kind,
            heading: heading.into(),
            icon,
            tone: Tone::Neutral,
            items: Vec::new(),
        }
    }

    fn toned(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.items.push(Item::Paragraph { text: text.into() });
        self
    }

    fn push_field(&mut self, label: impl Into<String>, value: FieldValue, tone: Option<Tone>) {
        self.items.push(Item::Field {
            label: label.into(),
            value,
            tone,
        });
    }
}

/// Card tree for one capability result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub capability: Capability,
    pub game_mode: GameMode,
    pub icon: &'static str,
    pub title: String,
    pub sections: Vec<Section>,
}

impl Narrative {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }
}

pub fn render(result: &CapabilityResult) -> Narrative {
    render_with(result, default_registry())
}

pub fn render_with(result: &CapabilityResult, registry: &GameModeRegistry) -> Narrative {
    let (icon, title, sections) = match &result.payload {
        CapabilityPayload::Insights(data) => (
            "🎯",
            format!("Personalized Insights for {}", data.player_name),
            insights_sections(data),
        ),
        CapabilityPayload::MacroReview(data) => (
            "📊",
            "Automated Macro Review".to_string(),
            macro_review_sections(data),
        ),
        CapabilityPayload::Prediction(data) => (
            "🔮",
            "Hypothetical Scenario Analysis".to_string(),
            prediction_sections(data, &result.game_mode, registry),
        ),
    };

    Narrative {
        capability: result.capability(),
        game_mode: result.game_mode.clone(),
        icon,
        title,
        sections,
    }
}

fn insights_sections(data: &InsightsResult) -> Vec<Section> {
    let mut sections = Vec::new();

    if !data.data_points.is_empty() {
        let mut section = Section::new(SectionKind::DataPoints, "📊", "Key Data Points");
        section
            .items
            .extend(data.data_points.iter().map(data_point_entry));
        sections.push(section);
    }

    if !data.insights.is_empty() {
        let mut section = Section::new(SectionKind::Insights, "💡", "Insights");
        section.items.extend(data.insights.iter().map(insight_entry));
        sections.push(section);
    }

    if !data.strategic_recommendations.is_empty() {
        let mut section = Section::new(SectionKind::Recommendations, "🎯", "Recommendations");
        section.items.extend(
            data.strategic_recommendations
                .iter()
                .map(recommendation_entry),
        );
        sections.push(section);
    }

    if let Some(commentary) = &data.ai_commentary {
        sections.push(
            Section::new(SectionKind::Commentary, "🤖", "AI Analysis").paragraph(commentary),
        );
    }

    sections
}

fn data_point_entry(dp: &DataPoint) -> Item {
    Item::Entry(Entry {
        ordinal: None,
        tone: None,
        badge: None,
        headline: format!("{}: {}", dp.metric, display_value(&dp.value)),
        details: optional_detail(None, dp.context.as_deref()),
    })
}

fn insight_entry(insight: &Insight) -> Item {
    Item::Entry(Entry {
        ordinal: None,
        tone: Some(severity_tone(insight.severity.as_ref())),
        badge: insight.severity.as_ref().map(Severity::badge),
        headline: insight.finding.clone(),
        details: optional_detail(None, insight.explanation.as_deref()),
    })
}

fn recommendation_entry(rec: &StrategicRecommendation) -> Item {
    Item::Entry(Entry {
        ordinal: None,
        tone: None,
        badge: rec
            .priority
            .as_ref()
            .map(|p| format!("{} PRIORITY", p.badge())),
        headline: rec.recommendation.clone(),
        details: optional_detail(Some("Action"), rec.action.as_deref()),
    })
}

pub fn severity_tone(severity: Option<&Severity>) -> Tone {
    match severity {
        Some(Severity::Critical) => Tone::Critical,
        Some(Severity::High) => Tone::Warning,
        _ => Tone::Info,
    }
}

fn macro_review_sections(data: &MacroReviewResult) -> Vec<Section> {
    let mut sections = Vec::new();

    let mut info = Section::new(SectionKind::MatchInfo, "📋", "Match Info");
    info.push_field(
        "Tournament",
        FieldValue::Inline(data.tournament.clone().unwrap_or_else(|| UNKNOWN.to_string())),
        None,
    );
    info.push_field("Match", FieldValue::Inline(data.match_id.clone()), None);
    if !data.teams.is_empty() {
        info.push_field("Teams", FieldValue::Inline(data.teams.join(" vs ")), None);
    }
    if let Some(map) = &data.map {
        info.push_field("Map", FieldValue::Inline(map.clone()), None);
    }
    if let Some(score) = &data.final_score {
        info.push_field("Score", FieldValue::Inline(score.clone()), None);
    }
    sections.push(info);

    if !data.agenda_items.is_empty() {
        let mut agenda = Section::new(SectionKind::Agenda, "📝", "Review Agenda");
        agenda.items.extend(
            data.agenda_items
                .iter()
                .enumerate()
                .map(|(idx, item)| agenda_entry(idx + 1, item)),
        );
        sections.push(agenda);
    }

    if let Some(summary) = &data.ai_summary {
        sections.push(
            Section::new(SectionKind::Summary, "🤖", "AI Summary").paragraph(summary),
        );
    }

    sections
}

fn agenda_entry(ordinal: usize, item: &AgendaItem) -> Item {
    let mut details = Vec::new();
    details.extend(optional_detail(Some("Time"), item.timestamp.as_deref()));
    details.extend(optional_detail(Some("Issue"), item.issue.as_deref()));
    details.extend(optional_detail(Some("Details"), item.detail.as_deref()));
    details.extend(optional_detail(Some("Notes"), item.notes.as_deref()));

    Item::Entry(Entry {
        ordinal: Some(ordinal),
        tone: Some(status_tone(item.status.as_ref())),
        badge: item.status.as_ref().map(AgendaStatus::badge),
        headline: item.category.clone(),
        details,
    })
}

/// Total: anything that is not critical or concern reads as fine.
pub fn status_tone(status: Option<&AgendaStatus>) -> Tone {
    match status {
        Some(AgendaStatus::Critical) => Tone::Critical,
        Some(AgendaStatus::Concern) => Tone::Warning,
        _ => Tone::Positive,
    }
}

fn prediction_sections(
    data: &PredictionResult,
    mode: &GameMode,
    registry: &GameModeRegistry,
) -> Vec<Section> {
    let mut sections = Vec::new();

    sections.push(
        Section::new(SectionKind::Scenario, "❓", "Scenario").paragraph(&data.scenario),
    );

    if !data.game_state.is_empty() {
        sections.push(game_state_section(&data.game_state));
    }

    let profile = registry.profile(mode);
    let (primary, alternative) = data.comparison.sides();
    if let Some(entries) = primary {
        sections.push(comparison_section(
            SectionKind::PrimaryOption,
            "❌",
            &profile.primary_label,
            Tone::Critical,
            &entries,
        ));
    }
    if let Some(entries) = alternative {
        sections.push(comparison_section(
            SectionKind::AlternativeOption,
            "✅",
            &profile.alternative_label,
            Tone::Positive,
            &entries,
        ));
    }

    if data.recommendation.is_some() || data.confidence.is_some() {
        let tone = data
            .confidence
            .as_ref()
            .map(confidence_tone)
            .unwrap_or(Tone::Info);
        let mut section =
            Section::new(SectionKind::Recommendation, "💡", "Recommendation").toned(tone);
        if let Some(text) = &data.recommendation {
            section = section.paragraph(text);
        }
        if let Some(confidence) = &data.confidence {
            section.push_field(
                "Confidence Level",
                FieldValue::Inline(confidence.badge()),
                Some(tone),
            );
        }
        sections.push(section);
    }

    if let Some(analysis) = &data.ai_analysis {
        sections.push(
            Section::new(SectionKind::Analysis, "🤖", "AI Analysis").paragraph(analysis),
        );
    }

    sections
}

fn game_state_section(state: &Map<String, Value>) -> Section {
    let mut section = Section::new(SectionKind::GameState, "🎮", "Game State");
    for (key, value) in state {
        section.push_field(humanize(key), FieldValue::Inline(display_value(value)), None);
    }
    section
}

fn comparison_section(
    kind: SectionKind,
    icon: &'static str,
    heading: &str,
    tone: Tone,
    entries: &[(String, Value)],
) -> Section {
    let mut section = Section::new(kind, icon, heading).toned(tone);
    for (key, value) in entries {
        let rendered = match value {
            Value::Array(items) => FieldValue::List(items.iter().map(display_value).collect()),
            other => FieldValue::Inline(display_value(other)),
        };
        section.push_field(humanize(key), rendered, None);
    }
    section
}

/// High confidence reads as positive, anything else (including unknown) as a warning.
pub fn confidence_tone(confidence: &Confidence) -> Tone {
    match confidence {
        Confidence::High => Tone::Positive,
        _ => Tone::Warning,
    }
}

fn optional_detail(label: Option<&str>, text: Option<&str>) -> Vec<Detail> {
    text.map(|text| Detail {
        label: label.map(str::to_string),
        text: text.to_string(),
    })
    .into_iter()
    .collect()
}

/// `gold_diff` -> `gold diff`. Underscores only; case is untouched.
pub fn humanize(key: &str) -> String {
    key.replace('_', " ")
}

/// Inline text for a JSON value. Integral numbers print without a fraction
/// and arrays or objects print as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or_default();
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
                    (f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn humanize_replaces_underscores_only() {
        assert_eq!(humanize("gold_diff"), "gold diff");
        assert_eq!(humanize("first_dragon"), "first dragon");
        assert_eq!(humanize("Soul__Point"), "Soul  Point");
    }

    #[test]
    fn display_value_prints_scalars_plainly() {
        assert_eq!(display_value(&json!(-2500)), "-2500");
        assert_eq!(display_value(&json!(-1.5)), "-1.5");
        assert_eq!(display_value(&json!(1.45)), "1.45");
        assert_eq!(display_value(&json!(3.0)), "3");
        assert_eq!(display_value(&json!(false)), "false");
        assert_eq!(display_value(&json!(null)), "null");
        assert_eq!(display_value(&json!("mid T2")), "mid T2");
        assert_eq!(
            display_value(&json!(["mid T2", "bot T2"])),
            r#"["mid T2","bot T2"]"#
        );
        assert_eq!(display_value(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn tone_tables_are_total() {
        assert_eq!(severity_tone(Some(&Severity::Critical)), Tone::Critical);
        assert_eq!(severity_tone(Some(&Severity::High)), Tone::Warning);
        assert_eq!(severity_tone(Some(&Severity::Medium)), Tone::Info);
        assert_eq!(severity_tone(Some(&Severity::parse("extreme"))), Tone::Info);
        assert_eq!(severity_tone(None), Tone::Info);

        assert_eq!(status_tone(Some(&AgendaStatus::Critical)), Tone::Critical);
        assert_eq!(status_tone(Some(&AgendaStatus::Concern)), Tone::Warning);
        assert_eq!(status_tone(Some(&AgendaStatus::parse("won_both"))), Tone::Positive);
        assert_eq!(status_tone(None), Tone::Positive);

        assert_eq!(confidence_tone(&Confidence::High), Tone::Positive);
        assert_eq!(confidence_tone(&Confidence::Medium), Tone::Warning);
    }
}

use crate::narrative::{Detail, Entry, FieldValue, Item, Narrative, Section};

/// Title block followed by one text block per section.
pub fn blocks(narrative: &Narrative) -> Vec<String> {
    let mut out = Vec::with_capacity(narrative.sections.len() + 1);
    out.push(format!("**{} {}**", narrative.icon, narrative.title));
    out.extend(narrative.sections.iter().map(section_block));
    out
}

pub fn message(narrative: &Narrative) -> String {
    blocks(narrative).join("\n\n")
}

fn section_block(section: &Section) -> String {
    let mut lines = vec![format!("**{} {}:**", section.icon, section.heading)];
    for item in &section.items {
        push_item(&mut lines, item);
    }
    lines.join("\n")
}

fn push_item(lines: &mut Vec<String>, item: &Item) {
    match item {
        Item::Paragraph { text } => lines.push(text.clone()),
        Item::Field { label, value, .. } => match value {
            FieldValue::Inline(text) => lines.push(format!("• {label}: {text}")),
            FieldValue::List(values) => {
                lines.push(format!("• {label}:"));
                lines.extend(values.iter().map(|v| format!("  - {v}")));
            }
        },
        Item::Entry(entry) => push_entry(lines, entry),
    }
}

fn push_entry(lines: &mut Vec<String>, entry: &Entry) {
    let marker = entry.tone.map(|t| t.icon()).unwrap_or("•");
    let badge = entry
        .badge
        .as_ref()
        .map(|b| format!("[{b}] "))
        .unwrap_or_default();

    match entry.ordinal {
        Some(n) => {
            lines.push(format!("{n}. {marker} {badge}**{}**", entry.headline));
            lines.extend(entry.details.iter().map(|d| format!("   {}", detail_text(d))));
        }
        None => {
            lines.push(format!("{marker} {badge}{}", entry.headline));
            lines.extend(entry.details.iter().map(|d| format!("  ↳ {}", detail_text(d))));
        }
    }
}

fn detail_text(detail: &Detail) -> String {
    match &detail.label {
        Some(label) => format!("{label}: {}", detail.text),
        None => detail.text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_mode::GameMode;
    use crate::model::{Capability, parse_result};
    use crate::narrative::render;

    #[test]
    fn recommendation_detail_carries_action_label() {
        let raw = r#"{
            "player_name": "OXY",
            "strategic_recommendations": [
                {"recommendation": "Review opening pathing", "priority": "High", "action": "Use utility first"}
            ]
        }"#;
        let result =
            parse_result(Capability::Insights, &GameMode::valorant(), raw).expect("valid payload");
        let text = message(&render(&result));
        assert!(text.contains("• [HIGH PRIORITY] Review opening pathing"));
        assert!(text.contains("  ↳ Action: Use utility first"));
    }

    #[test]
    fn agenda_entries_are_numbered() {
        let raw = r#"{
            "match_id": "m1",
            "agenda_items": [
                {"category": "Pistol Rounds", "status": "won_both", "detail": "Won 2/2"},
                {"category": "Mid-Round Calls", "status": "critical"}
            ]
        }"#;
        let result =
            parse_result(Capability::MacroReview, &GameMode::valorant(), raw).expect("valid");
        let text = message(&render(&result));
        assert!(text.contains("1. 🟢 [WON_BOTH] **Pistol Rounds**\n   Details: Won 2/2"));
        assert!(text.contains("2. 🔴 [CRITICAL] **Mid-Round Calls**"));
    }

    #[test]
    fn list_values_render_as_bullets() {
        let raw = r#"{
            "scenario": "Contest drake?",
            "concede_analysis": {"other_objectives": ["mid T2", "bot T2"]}
        }"#;
        let result = parse_result(
            Capability::Prediction,
            &GameMode::league_of_legends(),
            raw,
        )
        .expect("valid");
        let text = message(&render(&result));
        assert!(text.contains("**✅ Concede Drake:**\n• other objectives:\n  - mid T2\n  - bot T2"));
    }
}

use serde_json::{Value, json};

use crate::analysis_fetch::{AnalysisService, CapabilityRequest, decode_response};
use crate::error::RequestError;
use crate::game_mode::{GameMode, LEAGUE_OF_LEGENDS, VALORANT, default_registry};
use crate::model::{Capability, CapabilityResult};

struct DemoSet {
    mode: &'static str,
    request: fn(Capability) -> Value,
    response: fn(Capability) -> Value,
}

// First entry backs any mode without its own set.
const DEMO_SETS: &[DemoSet] = &[
    DemoSet {
        mode: LEAGUE_OF_LEGENDS,
        request: lol_request,
        response: lol_response,
    },
    DemoSet {
        mode: VALORANT,
        request: valorant_request,
        response: valorant_response,
    },
];

fn demo_set(mode: &GameMode) -> &'static DemoSet {
    let id = default_registry().profile(mode).id.as_str();
    DEMO_SETS
        .iter()
        .find(|set| set.mode == id)
        .unwrap_or(&DEMO_SETS[0])
}

/// Request payload the assistant sends when a capability is triggered from the UI.
pub fn demo_request(capability: Capability, mode: &GameMode) -> CapabilityRequest {
    let payload = (demo_set(mode).request)(capability);
    CapabilityRequest::new(capability, mode.clone(), payload)
}

/// What the analysis service would answer for the demo request.
pub fn canned_response(capability: Capability, mode: &GameMode) -> Value {
    (demo_set(mode).response)(capability)
}

fn valorant_request(capability: Capability) -> Value {
    match capability {
        Capability::Insights => json!({
            "player_name": "OXY",
            "match_data": {
                "rounds": [
                    {"round_num": 1, "attackers": [{"name": "OXY", "kast": true, "deaths": 0, "kills": 2}], "defenders": [], "won_by": "attackers"},
                    {"round_num": 2, "attackers": [{"name": "OXY", "kast": false, "deaths": 1, "kills": 0, "first_death": true}], "defenders": [], "won_by": "defenders"}
                ]
            }
        }),
        Capability::MacroReview => json!({
            "match_data": {
                "match_id": "demo_match_001",
                "map": "Ascent",
                "final_score": "13-11",
                "rounds": [
                    {"round_num": 1, "team_won": true},
                    {"round_num": 2, "buy_type": "force", "team_won": false}
                ]
            }
        }),
        Capability::Prediction => json!({
            "scenario": {
                "question": "On Round 22 (score 10-11) on Haven, we attempted a 3v5 retake on C-site and lost. Would it have been better to save?",
                "round": 22,
                "score": "10-11",
                "situation": "3v5 retake",
                "site": "C",
                "time": "15s",
                "weapons": "3 rifles",
                "enemy_utility": "full"
            }
        }),
    }
}

fn lol_request(capability: Capability) -> Value {
    match capability {
        Capability::Insights => json!({
            "player_name": "Berserker",
            "match_data": {
                "games": [{
                    "blue_team": {"players": [{"summonerName": "Berserker", "role": "ADC", "stats": {"kills": 8, "deaths": 2, "assists": 12, "totalDamageDealtToChampions": 25000}}]},
                    "duration": 1800
                }]
            }
        }),
        Capability::MacroReview => json!({
            "match_data": {
                "series_id": "demo_series_001",
                "games": [{"duration": 2100}],
                "events": {"first_drake": {"secured": false}}
            }
        }),
        Capability::Prediction => json!({
            "scenario": {
                "question": "C9 contested Drake at 24:15 and everybody died. Would it have been better to not contest?",
                "timestamp": "24:15",
                "gold_diff": -2500,
                "level_diff": -1.5,
                "vision": "poor",
                "soul_point": false,
                "other_objectives": ["mid T2", "bot T2"]
            }
        }),
    }
}

fn valorant_response(capability: Capability) -> Value {
    match capability {
        Capability::Insights => json!({
            "player_name": "OXY",
            "game": "valorant",
            "data_points": [
                {"metric": "KAST Impact", "value": "1/2 rounds with KAST (50%)", "context": "Team won 100% of rounds where OXY had KAST"},
                {"metric": "Opening Duel Performance", "value": "1/2 rounds first death (50%)", "context": "OXY dies first in 50% of rounds"}
            ],
            "insights": [
                {"severity": "critical", "finding": "Team loses every round where OXY dies without KAST", "explanation": "Deaths without a trade, kill or assist leave the team in a numbers disadvantage"},
                {"severity": "high", "finding": "High first death rate (50%) indicates risky opening positioning", "explanation": "Dying first puts immediate pressure on team and often leads to round loss"}
            ],
            "strategic_recommendations": [
                {"priority": "high", "recommendation": "Strategy must ensure OXY is always positioned for KAST", "action": "If death occurs, it must be for a trade, kill, or assist. Review positioning in opening duels."},
                {"priority": "high", "recommendation": "Review opening pathing and strategy", "action": "Avoid predictable angles. Use utility before peeking. Request teammate support for opening duels."}
            ]
        }),
        Capability::MacroReview => json!({
            "match_id": "demo_match_001",
            "match_type": "BO1",
            "opponent": "Unknown",
            "map": "Ascent",
            "final_score": "13-11",
            "agenda_items": [
                {"category": "Pistol Rounds", "status": "split", "detail": "Won 1/2 pistol rounds", "notes": "Review pistol round setups and compositions"},
                {"category": "Eco Management", "status": "concern", "detail": "Unsuccessful force-buy on Round 2 led to bonus round loss (Round 3)", "notes": "Review force-buy vs. save criteria. Consider full save after lost pistol."}
            ]
        }),
        Capability::Prediction => json!({
            "scenario": "On Round 22 (score 10-11) on Haven, we attempted a 3v5 retake on C-site and lost. Would it have been better to save?",
            "game_state": {
                "players_alive": "3v5 disadvantage",
                "site": "C",
                "time_remaining": "15s",
                "weapons": "3 rifles",
                "enemy_utility": "full"
            },
            "original_action": {
                "action": "Attempt 3v5 retake",
                "success_probability": "15%",
                "expected_value": "Low - likely lose round and weapons",
                "outcome": "Lost round, lost 3 rifles"
            },
            "alternative_action": {
                "action": "Save 3 rifles",
                "success_probability": "60%",
                "expected_value": "High - 60% chance to win next gun round vs 35% on eco",
                "outcome": "Concede round, maintain weapon economy for next"
            },
            "recommendation": "Saving was the superior strategic choice. The 3v5 retake had only 15% probability of success. Saving 3 rifles (8,700 credits) gives a 60% chance to win the following gun round, versus 35% on a broken buy. Expected value strongly favors the save.",
            "confidence": "high"
        }),
    }
}

fn lol_response(capability: Capability) -> Value {
    match capability {
        Capability::Insights => json!({
            "player_name": "Berserker",
            "game": "lol",
            "data_points": [
                {"metric": "KDA", "value": 10.0, "context": "8/2/12 over 30 minutes"},
                {"metric": "Damage per Minute", "value": 833, "context": "25,000 damage to champions"}
            ],
            "insights": [
                {"severity": "medium", "finding": "Strong damage output with low deaths", "explanation": "Berserker converts safe positioning into sustained teamfight damage"}
            ],
            "strategic_recommendations": [
                {"priority": "medium", "recommendation": "Keep funnelling resources to the bot lane", "action": "Prioritise dragon-side vision so Berserker can farm safely"}
            ]
        }),
        Capability::MacroReview => json!({
            "match_id": "demo_series_001",
            "tournament": "Unknown",
            "teams": [],
            "agenda_items": [
                {"category": "First Drake Setup", "timestamp": "~5:00", "issue": "Inadequate deep vision, teleport wards not swept", "notes": "Lost vision control allowed enemy to secure drake. Ward deeper at 4:00."},
                {"category": "Vision Control", "timestamp": "Game-wide", "issue": "Low team vision score (avg 0.0 per player)", "notes": "Increase ward placement frequency. Support and Jungle need 50+ vision score."}
            ]
        }),
        Capability::Prediction => json!({
            "scenario": "C9 contested Drake at 24:15 and everybody died. Would it have been better to not contest?",
            "game_state": {
                "timestamp": "24:15",
                "gold_difference": -2500,
                "level_difference": -1.5,
                "vision_control": "poor",
                "dragon_soul_point": false,
                "available_objectives": ["mid T2", "bot T2"]
            },
            "contest_analysis": {
                "fight_win_probability": "18%",
                "objective_secure_probability": "16%",
                "risk": "High - likely team wipe with no objective",
                "outcome_if_lost": "All 5 dead, enemy secures drake + 2 towers, +200 XP/player, baron setup"
            },
            "concede_analysis": {
                "tower_gold_probability": "85%",
                "expected_outcome": [
                    "Take mid T2 tower (500g + map control)",
                    "Take bot T2 tower (500g)",
                    "Maintain team positioning",
                    "Farm safely, reduce gold gap"
                ],
                "risk": "Low - enemy gets drake but team gains towers and safety",
                "gold_swing": "+1000g from towers vs -500g from lost fight"
            },
            "recommendation": "Conceding the drake was the correct strategic choice. With 18% win probability, contesting risks a team wipe for minimal gain. Trading for 2 towers maintains gold pace and prevents a snowball.",
            "confidence": "high"
        }),
    }
}

/// Offline stand-in for the analysis service.
pub struct OfflineAnalysisService;

impl AnalysisService for OfflineAnalysisService {
    fn invoke(&self, request: &CapabilityRequest) -> Result<CapabilityResult, RequestError> {
        let body = canned_response(request.capability, &request.game_mode).to_string();
        decode_response(request, 200, &body)
    }

    fn describe(&self) -> String {
        "offline demo".to_string()
    }
}

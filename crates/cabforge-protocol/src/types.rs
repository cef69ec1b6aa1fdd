//! Core protocol types for Cabforge's wire format.
//!
//! Every type here travels "on the wire": the server serializes it to a
//! JSON text frame and browsers parse it on the other side. The field
//! names are camelCase because that's what the web client reads.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's identifier, also called their "plate".
///
/// Newtype over `String` so a plate can't be confused with a collectible
/// id or a display name. `#[serde(transparent)]` keeps it a bare string
/// on the wire, which also lets it key a JSON object.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps a raw plate string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the plate as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What a session announced itself as.
///
/// Admins get the extra `playersInfo` channel on top of every general
/// broadcast; they are never excluded from the general ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Interprets an announced role string. `"admin"` in any letter case
    /// is [`Role::Admin`]; everything else is [`Role::User`].
    pub fn from_announcement(role: &str) -> Self {
        if role.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// Returns `true` for [`Role::Admin`].
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot entries
// ---------------------------------------------------------------------------

/// One collectible in an `availablePersons` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonView {
    pub id: String,
    pub x: i32,
    pub y: i32,
    /// Sprite file the client draws for this person.
    pub file: String,
}

/// One player in a `positions` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionView {
    pub x: f64,
    pub y: f64,
    pub direction: String,
}

/// One player in a player-state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStateView {
    pub x: f64,
    pub y: f64,
    pub direction: String,
    pub has_person: String,
}

/// One row of the admin roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub plate: PlayerId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// ServerMessage — typed outbound frames
// ---------------------------------------------------------------------------

/// Frames the server sends, tagged by a `type` field.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{"type":"personStateUpdate","personId":"p1","active":false}`. The
/// tag strings are the ones the web client already switches on, which is
/// why they don't follow a single naming convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Unicast on connect: the plate this connection was assigned.
    #[serde(rename = "PLAYER_ID", rename_all = "camelCase")]
    AssignId { player_id: PlayerId },

    /// The full collectible catalog, keyed by collectible id.
    #[serde(rename = "availablePersons")]
    AvailablePersons {
        persons: BTreeMap<String, PersonView>,
    },

    /// One collectible's availability changed.
    #[serde(rename = "personStateUpdate", rename_all = "camelCase")]
    PersonStateUpdate { person_id: String, active: bool },

    /// Every player's position, keyed by plate.
    #[serde(rename = "positions")]
    Positions {
        players: BTreeMap<PlayerId, PositionView>,
    },

    /// One player's carrying flag changed.
    #[serde(rename = "personUpdate", rename_all = "camelCase")]
    PersonUpdate {
        player_id: PlayerId,
        has_person: String,
    },

    /// Admin-only: player count and roster.
    #[serde(rename = "playersInfo")]
    PlayersInfo {
        count: usize,
        players: Vec<RosterEntry>,
    },

    /// Something about the sender's last frame was wrong.
    #[serde(rename = "error")]
    Error { message: String },
}

/// The player-state snapshot sent on connect and disconnect.
///
/// Unlike every other frame it carries no `type` tag; clients recognize
/// it by the top-level `players` object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerStates {
    pub players: BTreeMap<PlayerId, PlayerStateView>,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The web client parses these exact JSON shapes, so the tests check
    //! field names and tags rather than round-tripping every variant.

    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&pid("123ABC")).unwrap();
        assert_eq!(json, "\"123ABC\"");
    }

    #[test]
    fn test_player_id_display_is_raw_plate() {
        assert_eq!(pid("007XYZ").to_string(), "007XYZ");
    }

    #[test]
    fn test_role_from_announcement_is_case_insensitive() {
        assert_eq!(Role::from_announcement("admin"), Role::Admin);
        assert_eq!(Role::from_announcement("ADMIN"), Role::Admin);
        assert_eq!(Role::from_announcement("Admin"), Role::Admin);
        assert_eq!(Role::from_announcement("user"), Role::User);
        assert_eq!(Role::from_announcement("moderator"), Role::User);
    }

    #[test]
    fn test_role_default_is_user() {
        assert_eq!(Role::default(), Role::User);
        assert!(!Role::default().is_admin());
    }

    #[test]
    fn test_assign_id_json_format() {
        let msg = ServerMessage::AssignId {
            player_id: pid("123ABC"),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "PLAYER_ID", "playerId": "123ABC"})
        );
    }

    #[test]
    fn test_available_persons_json_format() {
        let mut persons = BTreeMap::new();
        persons.insert(
            "p1".to_string(),
            PersonView {
                id: "p1".into(),
                x: 4,
                y: 6,
                file: "PersonaCorbata.png".into(),
            },
        );
        let msg = ServerMessage::AvailablePersons { persons };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "availablePersons");
        assert_eq!(json["persons"]["p1"]["id"], "p1");
        assert_eq!(json["persons"]["p1"]["x"], 4);
        assert_eq!(json["persons"]["p1"]["y"], 6);
        assert_eq!(json["persons"]["p1"]["file"], "PersonaCorbata.png");
    }

    #[test]
    fn test_person_state_update_json_format() {
        let msg = ServerMessage::PersonStateUpdate {
            person_id: "p1".into(),
            active: false,
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "personStateUpdate",
                "personId": "p1",
                "active": false
            })
        );
    }

    #[test]
    fn test_positions_json_format() {
        let mut players = BTreeMap::new();
        players.insert(
            pid("111AAA"),
            PositionView {
                x: 20.0,
                y: 30.5,
                direction: "east".into(),
            },
        );
        let msg = ServerMessage::Positions { players };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "positions");
        assert_eq!(json["players"]["111AAA"]["x"], 20.0);
        assert_eq!(json["players"]["111AAA"]["y"], 30.5);
        assert_eq!(json["players"]["111AAA"]["direction"], "east");
    }

    #[test]
    fn test_person_update_json_format() {
        let msg = ServerMessage::PersonUpdate {
            player_id: pid("111AAA"),
            has_person: "1".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "personUpdate",
                "playerId": "111AAA",
                "hasPerson": "1"
            })
        );
    }

    #[test]
    fn test_players_info_json_format() {
        let msg = ServerMessage::PlayersInfo {
            count: 1,
            players: vec![RosterEntry {
                plate: pid("111AAA"),
                name: "Ana".into(),
            }],
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "playersInfo",
                "count": 1,
                "players": [{"plate": "111AAA", "name": "Ana"}]
            })
        );
    }

    #[test]
    fn test_error_json_format() {
        let msg = ServerMessage::Error {
            message: "Error processing message".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "Error processing message");
    }

    #[test]
    fn test_player_states_has_no_type_tag() {
        let mut players = BTreeMap::new();
        players.insert(
            pid("111AAA"),
            PlayerStateView {
                x: 0.0,
                y: 0.0,
                direction: "right".into(),
                has_person: "0".into(),
            },
        );
        let json: serde_json::Value =
            serde_json::to_value(PlayerStates { players }).unwrap();

        assert!(json.get("type").is_none());
        assert_eq!(json["players"]["111AAA"]["hasPerson"], "0");
        assert_eq!(json["players"]["111AAA"]["direction"], "right");
    }

    #[test]
    fn test_server_message_decodes_from_client_view() {
        // Integration tests decode frames back into ServerMessage.
        let text = r#"{"type":"personUpdate","playerId":"X","hasPerson":"1"}"#;
        let msg: ServerMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ServerMessage::PersonUpdate {
                player_id: pid("X"),
                has_person: "1".into(),
            }
        );
    }

    #[test]
    fn test_unknown_type_tag_fails_to_decode() {
        let result: Result<ServerMessage, _> =
            serde_json::from_str(r#"{"type":"FlyToMoon"}"#);
        assert!(result.is_err());
    }
}

//! Classification of inbound client frames.
//!
//! Clients don't send a discriminated envelope. A frame is a flat JSON
//! object and its meaning is decided by which fields are present, checked
//! in a fixed order where the first match wins:
//!
//! ```text
//! 1. role                          → Inbound::Role
//!    (anything else)               → Inbound::Game { name, action }, where action is:
//! 2. personId + active             → Action::TogglePerson
//! 3. type == "collectPerson" + personId → Action::CollectPerson
//! 4. (id | playerId) + hasPerson   → Action::SetCarrying
//! 5. otherwise                     → Action::Move (x / y / direction, any subset)
//! ```
//!
//! The order matters: a frame may legitimately satisfy several shapes
//! (a position update with a stray `hasPerson` key is a carrying update
//! once it also names a player). Reordering these checks changes
//! behavior.
//!
//! Classification also validates the types of every field it reads, so a
//! frame that comes back `Ok` can be applied without further checks. The
//! one exception is `name`: it only matters on the frame that creates the
//! sender's player, so it is kept raw and checked by [`Inbound::display_name`]
//! at that point. Later frames carrying a bad `name` are still applied.

use serde_json::{Map, Value};

use crate::{Codec, JsonCodec, PlayerId, ProtocolError, Role};

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// The session announces its role. Never creates a player.
    Role(Role),

    /// Anything else. `name` is the raw display name, used only if this
    /// frame is the one that creates the sender's player.
    Game {
        name: Option<Value>,
        action: Action,
    },
}

/// What a game frame asks the engine to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Mark a collectible active or inactive. Inactive removes it.
    TogglePerson { person_id: String, active: bool },

    /// The sender picked up a collectible.
    CollectPerson { person_id: String },

    /// Set a player's carrying flag. `has_person` is already normalized
    /// to its string form.
    SetCarrying {
        target: PlayerId,
        has_person: String,
    },

    /// Update some subset of the sender's position fields.
    Move(PositionUpdate),
}

/// The position fields present on a frame. Absent fields stay untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub direction: Option<String>,
}

impl PositionUpdate {
    /// Returns `true` when the frame carried none of the position fields.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.direction.is_none()
    }
}

impl Inbound {
    /// Parses and classifies one text frame.
    ///
    /// # Errors
    /// - [`ProtocolError::Decode`] — not JSON
    /// - [`ProtocolError::InvalidMessage`] — JSON, but not an object
    /// - [`ProtocolError::InvalidField`] — a matched field has the wrong type
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = JsonCodec.decode(text.as_bytes())?;
        match value {
            Value::Object(fields) => Self::classify(&fields),
            other => Err(ProtocolError::InvalidMessage(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Classifies an already-parsed JSON object.
    pub fn classify(fields: &Map<String, Value>) -> Result<Self, ProtocolError> {
        if let Some(role) = fields.get("role") {
            let role = string_field(role, "role")?;
            return Ok(Self::Role(Role::from_announcement(role)));
        }

        let action = Action::classify(fields)?;
        Ok(Self::Game {
            name: fields.get("name").cloned(),
            action,
        })
    }

    /// Checks a raw `name` field from a [`Inbound::Game`] frame.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidField`] if the name is not a string.
    pub fn display_name(name: &Value) -> Result<&str, ProtocolError> {
        string_field(name, "name")
    }
}

impl Action {
    fn classify(fields: &Map<String, Value>) -> Result<Self, ProtocolError> {
        if let (Some(person), Some(active)) =
            (fields.get("personId"), fields.get("active"))
        {
            let active = active.as_bool().ok_or(ProtocolError::InvalidField {
                field: "active",
                expected: "a boolean",
            })?;
            return Ok(Self::TogglePerson {
                person_id: string_field(person, "personId")?.to_owned(),
                active,
            });
        }

        if fields.get("type").and_then(Value::as_str) == Some("collectPerson") {
            if let Some(person) = fields.get("personId") {
                return Ok(Self::CollectPerson {
                    person_id: string_field(person, "personId")?.to_owned(),
                });
            }
        }

        // `id` wins over `playerId` when both are present.
        let target = match (fields.get("id"), fields.get("playerId")) {
            (Some(id), _) => Some((id, "id")),
            (None, Some(id)) => Some((id, "playerId")),
            (None, None) => None,
        };
        if let (Some((target, field)), Some(flag)) =
            (target, fields.get("hasPerson"))
        {
            return Ok(Self::SetCarrying {
                target: PlayerId::new(string_field(target, field)?),
                has_person: normalize_flag(flag)?,
            });
        }

        Ok(Self::Move(PositionUpdate {
            x: fields.get("x").map(|v| number_field(v, "x")).transpose()?,
            y: fields.get("y").map(|v| number_field(v, "y")).transpose()?,
            direction: fields
                .get("direction")
                .map(|v| string_field(v, "direction").map(str::to_owned))
                .transpose()?,
        }))
    }
}

/// Normalizes a `hasPerson` value: strings pass through, integers become
/// their decimal string. Floats, booleans and the rest are rejected.
fn normalize_flag(value: &Value) -> Result<String, ProtocolError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        _ => Err(ProtocolError::InvalidField {
            field: "hasPerson",
            expected: "a string or an integer",
        }),
    }
}

fn string_field<'a>(
    value: &'a Value,
    field: &'static str,
) -> Result<&'a str, ProtocolError> {
    value.as_str().ok_or(ProtocolError::InvalidField {
        field,
        expected: "a string",
    })
}

fn number_field(value: &Value, field: &'static str) -> Result<f64, ProtocolError> {
    value.as_f64().ok_or(ProtocolError::InvalidField {
        field,
        expected: "a number",
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who authored a conversation turn. Serialized lowercase to match the
/// chat-completion wire format, so transcripts pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of the running conversation. The browser replays the full
/// transcript each request; the server never stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Age information nested inside the intake form. Only the primary age band
/// is used for the prompt; the front end may send more that we ignore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FamilyAges {
    #[serde(default)]
    pub main: Option<String>,
}

/// The hearing-form payload from the widget. Every field is optional:
/// an absent field means "the customer did not provide this", never an error.
/// Unknown fields are ignored so the form can evolve ahead of the backend.
///
/// `pets` uses a BTreeMap so the rendered pet list is deterministic for a
/// given form, which the prompt builder relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    #[serde(default)]
    pub family_members: Vec<String>,
    #[serde(default)]
    pub family_ages: FamilyAges,
    #[serde(default)]
    pub current_address: Option<String>,
    #[serde(default)]
    pub building_type: Option<String>,
    #[serde(default)]
    pub building_age: Option<String>,
    #[serde(default)]
    pub pets: BTreeMap<String, bool>,
    #[serde(default)]
    pub current_issues: Vec<String>,
    #[serde(default)]
    pub lifestyle: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub interior_styles: Vec<String>,
    #[serde(default)]
    pub reform_areas: Vec<String>,
    #[serde(default)]
    pub reform_reasons: Vec<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub other_requests: Option<String>,
}

impl IntakeForm {
    /// Pet kinds the customer actually owns, in map (sorted) order.
    pub fn owned_pets(&self) -> Vec<&str> {
        self.pets
            .iter()
            .filter(|(_, owned)| **owned)
            .map(|(kind, _)| kind.as_str())
            .collect()
    }
}

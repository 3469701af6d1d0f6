use crate::model::{Gender, Role, RoleQuery};

/// Where a user is in the profile-then-browse flow, together with the data
/// collected so far.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    WaitingAge,
    WaitingGender {
        age: i32,
    },
    WaitingHeight {
        age: i32,
        gender: Gender,
    },
    /// Profile complete; the last search produced nothing to browse.
    Searching {
        query: RoleQuery,
    },
    Browsing {
        query: RoleQuery,
        roles: Vec<Role>,
        index: usize,
    },
}

impl ConversationState {
    pub fn tag(&self) -> &'static str {
        match self {
            ConversationState::WaitingAge => "waiting_age",
            ConversationState::WaitingGender { .. } => "waiting_gender",
            ConversationState::WaitingHeight { .. } => "waiting_height",
            ConversationState::Searching { .. } => "searching",
            ConversationState::Browsing { .. } => "browsing",
        }
    }
}

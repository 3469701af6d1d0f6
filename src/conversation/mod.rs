mod action;
mod render;
mod session;
mod state;

use crate::db::CastingDb;
use crate::model::{ActorProfile, Role, RoleQuery};
use anyhow::Result;
use async_trait::async_trait;
pub use action::Action;
pub use render::{Button, ButtonTone, Keyboard, Reply};
pub use session::SessionStore;
pub use state::ConversationState;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

const AGE_RANGE: RangeInclusive<i64> = 1..=100;
const HEIGHT_RANGE: RangeInclusive<i64> = 100..=250;

const NO_SESSION: &str = "Start a role search with /start";
const SESSION_EXPIRED: &str = "Session expired. Start a new search with /start";
const STALE_BUTTON: &str = "This button is no longer active. Use /start for a new search.";
const USE_BUTTONS: &str = "Use the buttons to navigate or /start for a new search";
const CHOOSE_GENDER: &str = "Choose your gender with the buttons above.";
const SEARCH_UNAVAILABLE: &str =
    "⚠️ Role search is unavailable right now. Please try again later with /start";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Role index {index} is outside the result list of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Store operations the conversation needs.
#[async_trait]
pub trait CastingDirectory: Send + Sync {
    async fn upsert_actor(&self, actor: &ActorProfile) -> Result<()>;
    async fn find_matching_roles(&self, query: &RoleQuery) -> Result<Vec<Role>>;
}

#[async_trait]
impl CastingDirectory for CastingDb {
    async fn upsert_actor(&self, actor: &ActorProfile) -> Result<()> {
        CastingDb::upsert_actor(self, actor).await
    }

    async fn find_matching_roles(&self, query: &RoleQuery) -> Result<Vec<Role>> {
        CastingDb::find_matching_roles(self, query).await
    }
}

/// The user behind an event.
#[derive(Debug, Clone, Default)]
pub struct Participant {
    pub user_id: u64,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    Text(String),
    Action(Action),
}

enum NumberInput {
    Valid(i32),
    OutOfRange,
    NotANumber,
}

fn parse_bounded(text: &str, range: RangeInclusive<i64>) -> NumberInput {
    match text.trim().parse::<i64>() {
        Ok(n) if range.contains(&n) => NumberInput::Valid(n as i32),
        Ok(_) => NumberInput::OutOfRange,
        Err(_) => NumberInput::NotANumber,
    }
}

/// Drives every user's conversation. Events are handled one at a time:
/// the session lock is held until the reply is built.
pub struct Conversation {
    directory: Arc<dyn CastingDirectory>,
    sessions: Mutex<SessionStore>,
}

impl Conversation {
    pub fn new(directory: Arc<dyn CastingDirectory>, session_ttl: Duration) -> Self {
        Self {
            directory,
            sessions: Mutex::new(SessionStore::new(session_ttl)),
        }
    }

    pub async fn handle(
        &self,
        who: &Participant,
        event: Event,
    ) -> Result<Reply, ConversationError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        let purged = sessions.purge_expired(now);
        if purged > 0 {
            debug!("Purged {} idle sessions", purged);
        }

        match event {
            Event::Start => {
                sessions.start(who.user_id, now);
                info!("Session started for user {}", who.user_id);
                Ok(Reply::text(render::welcome()))
            }
            Event::Text(text) => {
                let Some(state) = sessions.get_mut(who.user_id, now) else {
                    return Ok(Reply::text(NO_SESSION));
                };
                Ok(self.on_text(who, state, text.trim()).await)
            }
            Event::Action(Action::NewSearch) => {
                if sessions.get_mut(who.user_id, now).is_none() {
                    return Ok(Reply::text(SESSION_EXPIRED));
                }
                sessions.start(who.user_id, now);
                Ok(Reply::text(render::restart()))
            }
            Event::Action(action) => {
                let Some(state) = sessions.get_mut(who.user_id, now) else {
                    return Ok(Reply::text(SESSION_EXPIRED));
                };
                on_action(state, action)
            }
        }
    }

    async fn on_text(&self, who: &Participant, state: &mut ConversationState, text: &str) -> Reply {
        match state {
            ConversationState::WaitingAge => match parse_bounded(text, AGE_RANGE) {
                NumberInput::Valid(age) => {
                    *state = ConversationState::WaitingGender { age };
                    Reply::with_keyboard(
                        format!("✅ Age {age} saved.\n\nNow choose your **gender**:"),
                        render::gender_keyboard(),
                    )
                }
                NumberInput::OutOfRange => Reply::text("Please enter a real age (1-100):"),
                NumberInput::NotANumber => Reply::text("❌ Please enter your age as a number:"),
            },
            ConversationState::WaitingHeight { age, gender } => {
                match parse_bounded(text, HEIGHT_RANGE) {
                    NumberInput::Valid(height) => {
                        let query = RoleQuery {
                            age: *age,
                            gender: *gender,
                            height,
                        };
                        *state = ConversationState::Searching { query };
                        self.search(who, state, query).await
                    }
                    NumberInput::OutOfRange => {
                        Reply::text("Please enter a real height (100-250 cm):")
                    }
                    NumberInput::NotANumber => {
                        Reply::text("❌ Please enter your height as a number:")
                    }
                }
            }
            ConversationState::WaitingGender { .. } => Reply::text(CHOOSE_GENDER),
            ConversationState::Searching { .. } | ConversationState::Browsing { .. } => {
                Reply::text(USE_BUTTONS)
            }
        }
    }

    /// Saves the actor profile and runs the role search. Leaves the state at
    /// `Searching` unless there is something to browse.
    async fn search(
        &self,
        who: &Participant,
        state: &mut ConversationState,
        query: RoleQuery,
    ) -> Reply {
        let actor = ActorProfile {
            user_id: who.user_id,
            first_name: who.display_name.clone(),
            last_name: None,
            username: who.username.clone(),
            age: query.age,
            gender: query.gender,
            height: query.height,
        };
        if let Err(e) = self.directory.upsert_actor(&actor).await {
            error!("Failed to save actor {}: {:#}", who.user_id, e);
        }

        let roles = match self.directory.find_matching_roles(&query).await {
            Ok(roles) => roles,
            Err(e) => {
                error!("Role search failed for user {}: {:#}", who.user_id, e);
                return Reply::text(SEARCH_UNAVAILABLE);
            }
        };

        info!(
            "Found {} roles for user {} (age={}, gender={}, height={})",
            roles.len(),
            who.user_id,
            query.age,
            query.gender,
            query.height
        );

        if roles.is_empty() {
            return Reply::text(render::no_matches(&query));
        }

        let reply = Reply::with_keyboard(
            render::role_card(&roles[0], 0, roles.len()),
            render::browse_keyboard(0, roles.len()),
        );
        *state = ConversationState::Browsing {
            query,
            roles,
            index: 0,
        };
        reply
    }
}

fn on_action(state: &mut ConversationState, action: Action) -> Result<Reply, ConversationError> {
    match state {
        ConversationState::WaitingGender { age } => match action {
            Action::Gender(gender) => {
                let age = *age;
                *state = ConversationState::WaitingHeight { age, gender };
                Ok(Reply::text(format!(
                    "✅ Gender: {}\n\nNow enter your **height** (in cm):",
                    gender.label()
                )))
            }
            _ => Ok(Reply::Notice(STALE_BUTTON.to_string())),
        },
        ConversationState::Browsing {
            query,
            roles,
            index,
        } => browse(query, roles, index, action),
        _ => Ok(Reply::Notice(STALE_BUTTON.to_string())),
    }
}

fn checked(roles: &[Role], index: usize) -> Result<&Role, ConversationError> {
    roles.get(index).ok_or(ConversationError::IndexOutOfRange {
        index,
        len: roles.len(),
    })
}

fn browse(
    query: &RoleQuery,
    roles: &[Role],
    current: &mut usize,
    action: Action,
) -> Result<Reply, ConversationError> {
    let total = roles.len();
    match action {
        Action::Show(index) => {
            let role = checked(roles, index)?;
            *current = index;
            Ok(Reply::with_keyboard(
                render::role_card(role, index, total),
                render::browse_keyboard(index, total),
            ))
        }
        Action::Accept(index) => {
            let role = checked(roles, index)?;
            *current = index;
            Ok(Reply::text(render::accepted(role)))
        }
        Action::Reject(index) => {
            checked(roles, index)?;
            match roles.get(index + 1) {
                Some(next) => {
                    *current = index + 1;
                    Ok(Reply::with_keyboard(
                        render::role_card(next, index + 1, total),
                        render::browse_keyboard(index + 1, total),
                    ))
                }
                None => {
                    *current = index;
                    Ok(Reply::with_keyboard(
                        render::exhausted(query),
                        render::exhausted_keyboard(),
                    ))
                }
            }
        }
        Action::ShowIndex => Ok(Reply::Notice(format!(
            "Role {} of {}",
            *current + 1,
            total
        ))),
        Action::Gender(_) | Action::NewSearch => Ok(Reply::Notice(STALE_BUTTON.to_string())),
    }
}

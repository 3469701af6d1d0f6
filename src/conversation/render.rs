use super::action::Action;
use crate::model::{Gender, Role, RoleQuery};
use crate::utils::format_amount;
use std::fmt::Write;

const BOT_NAME: &str = "Find Your Role Bot";
const FEE_UNIT: &str = "RUB per shift";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTone {
    Primary,
    Secondary,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
    pub tone: ButtonTone,
}

impl Button {
    fn new(label: impl Into<String>, action: Action, tone: ButtonTone) -> Self {
        Self {
            label: label.into(),
            action,
            tone,
        }
    }
}

/// Rows of buttons attached under a message.
pub type Keyboard = Vec<Vec<Button>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A full message. Shown as a new message for text input and as an
    /// in-place edit for button presses.
    Screen { text: String, keyboard: Keyboard },
    /// A short transient acknowledgement visible only to the user.
    Notice(String),
}

impl Reply {
    pub(super) fn text(text: impl Into<String>) -> Self {
        Reply::Screen {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    pub(super) fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Reply::Screen {
            text: text.into(),
            keyboard,
        }
    }
}

pub(super) fn welcome() -> String {
    format!(
        "🎭 **{BOT_NAME}**\nI'll help you find acting roles that fit you!\n\nTo begin, enter your **age**:"
    )
}

pub(super) fn restart() -> String {
    format!("🎭 **{BOT_NAME}**\n\nTo begin, enter your **age**:")
}

pub(super) fn gender_keyboard() -> Keyboard {
    vec![vec![
        Button::new("👨 Male", Action::Gender(Gender::Male), ButtonTone::Primary),
        Button::new("👩 Female", Action::Gender(Gender::Female), ButtonTone::Primary),
    ]]
}

fn new_search_row() -> Vec<Button> {
    vec![Button::new(
        "🔄 New search",
        Action::NewSearch,
        ButtonTone::Secondary,
    )]
}

pub(super) fn browse_keyboard(index: usize, total: usize) -> Keyboard {
    let mut nav = Vec::with_capacity(3);
    if index > 0 {
        nav.push(Button::new(
            "⬅️ Back",
            Action::Show(index - 1),
            ButtonTone::Secondary,
        ));
    }
    nav.push(Button::new(
        format!("{}/{}", index + 1, total),
        Action::ShowIndex,
        ButtonTone::Secondary,
    ));
    if index + 1 < total {
        nav.push(Button::new(
            "Forward ➡️",
            Action::Show(index + 1),
            ButtonTone::Secondary,
        ));
    }

    vec![
        nav,
        vec![
            Button::new("✅ Suitable", Action::Accept(index), ButtonTone::Success),
            Button::new("❌ Not suitable", Action::Reject(index), ButtonTone::Danger),
        ],
        new_search_row(),
    ]
}

pub(super) fn exhausted_keyboard() -> Keyboard {
    vec![new_search_row()]
}

fn range_text(min: Option<i32>, max: Option<i32>, unit: &str) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{min}-{max} {unit}"),
        (Some(min), None) => format!("from {min} {unit}"),
        (None, Some(max)) => format!("up to {max} {unit}"),
        (None, None) => "not specified".to_string(),
    }
}

fn fee_text(fee: Option<f64>) -> String {
    match fee {
        Some(fee) if fee != 0.0 => format!("{} {FEE_UNIT}", format_amount(fee)),
        _ => "not specified".to_string(),
    }
}

pub(super) fn role_card(role: &Role, index: usize, total: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🎬 **{}**", role.title);
    let _ = writeln!(out, "🏙️ **City:** {}", role.city);
    let _ = writeln!(out, "📅 **Dates:** {}", role.dates);
    let _ = writeln!(out, "📝 **Description:** {}", role.description);
    out.push('\n');
    out.push_str("👤 **Requirements:**\n");
    let _ = writeln!(out, "• Age: {}", range_text(role.age_min, role.age_max, "years"));
    let _ = writeln!(
        out,
        "• Height: {}",
        range_text(role.height_min, role.height_max, "cm")
    );
    let _ = writeln!(out, "• Gender: {}", role.gender.label());
    if !role.requirements.is_empty() {
        let _ = writeln!(out, "• Other: {}", role.requirements);
    }
    out.push('\n');
    let _ = writeln!(out, "💰 **Fee:** {}", fee_text(role.fee));
    out.push('\n');
    let _ = write!(out, "📋 {} of {} roles", index + 1, total);
    out
}

pub(super) fn accepted(role: &Role) -> String {
    let contact = if role.contact_info.trim().is_empty() {
        "Contact information not provided"
    } else {
        role.contact_info.as_str()
    };

    format!(
        "✅ **You marked this role as suitable!**\n\n\
         **{title}**\n\n\
         📞 **To apply:** {contact}\n\
         📋 **Role number:** #{id}\n\n\
         **When you get in touch, mention:**\n\
         • Role number #{id}\n\
         • That you are applying through {BOT_NAME}",
        title = role.title,
        id = role.id,
    )
}

pub(super) fn exhausted(query: &RoleQuery) -> String {
    format!(
        "🤔 You have seen all matching roles.\n\n{}\n\nTry a new search with different parameters!",
        parameters(query)
    )
}

pub(super) fn no_matches(query: &RoleQuery) -> String {
    format!(
        "😔 No roles match your parameters.\n\n{}\n\nTry different criteria with /start",
        parameters(query)
    )
}

fn parameters(query: &RoleQuery) -> String {
    format!(
        "**Your parameters:**\n\
         • Age: {} years\n\
         • Gender: {}\n\
         • Height: {} cm",
        query.age,
        query.gender.label(),
        query.height
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;

    fn role() -> Role {
        Role {
            id: 17,
            external_id: "r-17".to_string(),
            title: "Barista".to_string(),
            dates: "1 June".to_string(),
            description: "Cafe scene".to_string(),
            gender: Gender::Any,
            age_min: Some(18),
            age_max: Some(40),
            height_min: None,
            height_max: None,
            fee: Some(4500.0),
            city: "Moscow".to_string(),
            contact_info: String::new(),
            requirements: String::new(),
            category: String::new(),
        }
    }

    fn actions(keyboard: &Keyboard) -> Vec<Action> {
        keyboard.iter().flatten().map(|b| b.action).collect()
    }

    #[test]
    fn first_card_has_no_back_button() {
        let kb = browse_keyboard(0, 3);
        let actions = actions(&kb);
        assert!(actions.contains(&Action::Show(1)));
        assert!(!actions.iter().any(|a| matches!(a, Action::Show(i) if *i != 1)));
    }

    #[test]
    fn last_card_has_no_forward_button() {
        let actions = actions(&browse_keyboard(2, 3));
        assert!(actions.contains(&Action::Show(1)));
        assert!(!actions.contains(&Action::Show(3)));
        assert!(actions.contains(&Action::Accept(2)));
        assert!(actions.contains(&Action::Reject(2)));
        assert!(actions.contains(&Action::NewSearch));
    }

    #[test]
    fn card_shows_unspecified_height_and_grouped_fee() {
        let card = role_card(&role(), 1, 4);
        assert!(card.contains("Height: not specified"));
        assert!(card.contains("Age: 18-40 years"));
        assert!(card.contains("4,500 RUB per shift"));
        assert!(card.contains("2 of 4 roles"));
    }

    #[test]
    fn acceptance_reveals_contact_and_number() {
        let mut role = role();
        let text = accepted(&role);
        assert!(text.contains("Contact information not provided"));
        assert!(text.contains("#17"));

        role.contact_info = "+7 900 000-00-00".to_string();
        assert!(accepted(&role).contains("+7 900 000-00-00"));
    }
}

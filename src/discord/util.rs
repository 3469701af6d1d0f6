use crate::conversation::{Action, ButtonTone, Keyboard, Participant};
use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, Message, User, UserId};

pub(super) fn participant(user: &User) -> Participant {
    Participant {
        user_id: user.id.get(),
        username: Some(user.name.clone()),
        display_name: user.global_name.clone(),
    }
}

fn button_style(tone: ButtonTone) -> ButtonStyle {
    match tone {
        ButtonTone::Primary => ButtonStyle::Primary,
        ButtonTone::Secondary => ButtonStyle::Secondary,
        ButtonTone::Success => ButtonStyle::Success,
        ButtonTone::Danger => ButtonStyle::Danger,
    }
}

/// Buttons for a screen that belongs to `owner`. Every custom id carries the
/// owner so presses from other users can be turned away.
pub(super) fn action_rows(keyboard: &Keyboard, owner: UserId) -> Vec<CreateActionRow> {
    keyboard
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            CreateActionRow::Buttons(
                row.iter()
                    .map(|b| {
                        CreateButton::new(owned_custom_id(&b.action, owner))
                            .label(&b.label)
                            .style(button_style(b.tone))
                    })
                    .collect(),
            )
        })
        .collect()
}

fn owned_custom_id(action: &Action, owner: UserId) -> String {
    format!("{}:{}", action.custom_id(), owner)
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Press {
    Own(Action),
    Foreign,
    Unknown,
}

pub(super) fn classify_press(custom_id: &str, presser: UserId) -> Press {
    let Some((action, owner)) = custom_id.rsplit_once(':') else {
        return Press::Unknown;
    };
    let Some(owner) = owner.parse::<u64>().ok().filter(|&id| id != 0) else {
        return Press::Unknown;
    };
    let Some(action) = Action::parse(action) else {
        return Press::Unknown;
    };

    if UserId::new(owner) == presser {
        Press::Own(action)
    } else {
        Press::Foreign
    }
}

/// Message text with the bot mention stripped.
pub(super) fn extract_content(msg: &Message, bot_id: UserId) -> String {
    strip_mentions(&msg.content, bot_id)
}

fn strip_mentions(content: &str, bot_id: UserId) -> String {
    content
        .replace(&format!("<@{}>", bot_id), "")
        .replace(&format!("<@!{}>", bot_id), "")
        .trim()
        .to_string()
}

/// Typed fallbacks for the slash command, for clients that send it as text.
pub(super) fn is_start_text(content: &str) -> bool {
    matches!(content, "/start" | "!start")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;

    #[test]
    fn mentions_are_stripped() {
        let bot = UserId::new(1234);
        assert_eq!(strip_mentions("<@1234> 25", bot), "25");
        assert_eq!(strip_mentions("<@!1234>   170 ", bot), "170");
        assert_eq!(strip_mentions("<@999> hi", bot), "<@999> hi");
    }

    #[test]
    fn start_fallbacks() {
        assert!(is_start_text("/start"));
        assert!(is_start_text("!start"));
        assert!(!is_start_text("start over"));
    }

    #[test]
    fn empty_rows_are_dropped() {
        let keyboard = vec![
            vec![],
            vec![crate::conversation::Button {
                label: "Male".to_string(),
                action: Action::Gender(Gender::Male),
                tone: ButtonTone::Primary,
            }],
        ];
        assert_eq!(action_rows(&keyboard, UserId::new(42)).len(), 1);
    }

    #[test]
    fn button_ids_carry_the_owner() {
        let owner = UserId::new(42);
        assert_eq!(owned_custom_id(&Action::Show(2), owner), "role_2:42");
        assert_eq!(classify_press("role_2:42", owner), Press::Own(Action::Show(2)));
        assert_eq!(
            classify_press(&owned_custom_id(&Action::NewSearch, owner), owner),
            Press::Own(Action::NewSearch)
        );
    }

    #[test]
    fn presses_on_someone_elses_screen_are_foreign() {
        assert_eq!(classify_press("suitable_0:42", UserId::new(7)), Press::Foreign);
        assert_eq!(classify_press("new_search:42", UserId::new(7)), Press::Foreign);
    }

    #[test]
    fn malformed_button_ids_are_unknown() {
        let presser = UserId::new(42);
        assert_eq!(classify_press("role_2", presser), Press::Unknown);
        assert_eq!(classify_press("role_2:0", presser), Press::Unknown);
        assert_eq!(classify_press("role_2:abc", presser), Press::Unknown);
        assert_eq!(classify_press("dance:42", presser), Press::Unknown);
    }
}

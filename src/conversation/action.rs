use crate::model::Gender;

/// A button press, encoded into the platform's component identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Gender(Gender),
    Show(usize),
    Accept(usize),
    Reject(usize),
    NewSearch,
    ShowIndex,
}

impl Action {
    pub fn custom_id(&self) -> String {
        match self {
            Action::Gender(gender) => format!("gender_{}", gender.as_str()),
            Action::Show(index) => format!("role_{index}"),
            Action::Accept(index) => format!("suitable_{index}"),
            Action::Reject(index) => format!("notsuitable_{index}"),
            Action::NewSearch => "new_search".to_string(),
            Action::ShowIndex => "show_index".to_string(),
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "new_search" => return Some(Action::NewSearch),
            "show_index" => return Some(Action::ShowIndex),
            "gender_male" => return Some(Action::Gender(Gender::Male)),
            "gender_female" => return Some(Action::Gender(Gender::Female)),
            _ => {}
        }

        let (prefix, index) = id.rsplit_once('_')?;
        let index = index.parse().ok()?;
        match prefix {
            "role" => Some(Action::Show(index)),
            "suitable" => Some(Action::Accept(index)),
            "notsuitable" => Some(Action::Reject(index)),
            _ => None,
        }
    }
}

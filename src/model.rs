use crate::entity::roles;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Any,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Any => "any",
        }
    }

    /// Reads the stored column value; unknown values widen to `Any`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Any,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Any => "Any",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized role record ready to be written to the `roles` table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRole {
    pub external_id: String,
    pub title: String,
    pub dates: String,
    pub description: String,
    pub gender: Gender,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub height_min: Option<i32>,
    pub height_max: Option<i32>,
    pub fee: Option<f64>,
    pub city: String,
    pub contact_info: String,
    pub requirements: String,
    pub category: String,
    pub source: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: i64,
    pub external_id: String,
    pub title: String,
    pub dates: String,
    pub description: String,
    pub gender: Gender,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub height_min: Option<i32>,
    pub height_max: Option<i32>,
    pub fee: Option<f64>,
    pub city: String,
    pub contact_info: String,
    pub requirements: String,
    pub category: String,
}

impl From<roles::Model> for Role {
    fn from(r: roles::Model) -> Self {
        Self {
            id: r.id,
            external_id: r.role_id,
            title: r.title,
            dates: r.dates,
            description: r.description,
            gender: Gender::from_db(&r.gender),
            age_min: r.age_min,
            age_max: r.age_max,
            height_min: r.height_min,
            height_max: r.height_max,
            fee: r.fee,
            city: r.city,
            contact_info: r.contact_info,
            requirements: r.requirements,
            category: r.category,
        }
    }
}

/// Search criteria collected from the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleQuery {
    pub age: i32,
    pub gender: Gender,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorProfile {
    pub user_id: u64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub age: i32,
    pub gender: Gender,
    pub height: i32,
}

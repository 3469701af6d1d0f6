use crate::entity::{actors, categories, role_categories, roles};
use crate::model::{ActorProfile, Gender, NewRole, Role, RoleQuery};
use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::path::Path;
use tracing::{debug, info};

const DB_FILE: &str = "casting.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Shared relational store for roles, categories and actors.
///
/// Each operation opens its own connection on a blocking thread and drops it
/// when the unit of work finishes, whatever the outcome.
pub struct CastingDb {
    db_url: String,
}

impl CastingDb {
    pub async fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data dir: {}", data_dir.display()))?;
        let db_path = data_dir.join(DB_FILE);
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        tokio::task::spawn_blocking({
            let db_url = db_url.clone();
            move || -> Result<()> {
                let db = Database::connect(&db_url)?;

                db.get_schema_builder()
                    .register(roles::Entity)
                    .register(categories::Entity)
                    .register(role_categories::Entity)
                    .register(actors::Entity)
                    .apply(&db)?;

                Ok(())
            }
        })
        .await??;

        info!("Casting database ready at {}", db_path.display());
        Ok(Self { db_url })
    }

    /// Fails when the database cannot be reached or queried.
    pub async fn ping(&self) -> Result<()> {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let db = Database::connect(&db_url)?;
            roles::Entity::find().one(&db)?;
            Ok(())
        })
        .await?
    }

    /// Inserts the role, or overwrites every mutable field of the row that
    /// already carries the same external id.
    pub async fn upsert_role(&self, role: &NewRole) -> Result<UpsertOutcome> {
        let db_url = self.db_url.clone();
        let role = role.clone();

        tokio::task::spawn_blocking(move || -> Result<UpsertOutcome> {
            let db = Database::connect(&db_url)?;
            let existing = roles::Entity::find()
                .filter(roles::Column::RoleId.eq(role.external_id.as_str()))
                .one(&db)?;

            let mut record = role_record(&role, chrono::Utc::now().timestamp_micros());

            match existing {
                Some(row) => {
                    record.id = Set(row.id);
                    roles::Entity::update(record).exec(&db)?;
                    debug!("Updated role {}", role.external_id);
                    Ok(UpsertOutcome::Updated)
                }
                None => {
                    roles::Entity::insert(record).exec(&db)?;
                    debug!("Inserted role {}", role.external_id);
                    Ok(UpsertOutcome::Inserted)
                }
            }
        })
        .await?
    }

    /// Ensures the category exists and is linked to the role. Returns `true`
    /// when a new link row was written.
    pub async fn link_category(&self, external_role_id: &str, name: &str) -> Result<bool> {
        let db_url = self.db_url.clone();
        let external_role_id = external_role_id.to_string();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || -> Result<bool> {
            let db = Database::connect(&db_url)?;

            categories::Entity::insert(categories::ActiveModel {
                id: NotSet,
                name: Set(name.clone()),
            })
            .on_conflict(
                OnConflict::column(categories::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&db)?;

            let role = roles::Entity::find()
                .filter(roles::Column::RoleId.eq(external_role_id.as_str()))
                .one(&db)?
                .with_context(|| format!("Role {} not found", external_role_id))?;
            let category = categories::Entity::find()
                .filter(categories::Column::Name.eq(name.as_str()))
                .one(&db)?
                .with_context(|| format!("Category '{}' not found", name))?;

            let inserted = role_categories::Entity::insert(role_categories::ActiveModel {
                role_id: Set(role.id),
                category_id: Set(category.id),
            })
            .on_conflict(
                OnConflict::columns([
                    role_categories::Column::RoleId,
                    role_categories::Column::CategoryId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&db)?;

            debug!("Linked role {} to category '{}'", external_role_id, name);
            Ok(inserted > 0)
        })
        .await?
    }

    /// Registers the actor, overwriting age, gender and height on re-registration.
    pub async fn upsert_actor(&self, actor: &ActorProfile) -> Result<()> {
        let db_url = self.db_url.clone();
        let user_id = i64::try_from(actor.user_id)
            .with_context(|| format!("User id {} out of range", actor.user_id))?;

        let record = actors::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            first_name: Set(actor.first_name.clone()),
            last_name: Set(actor.last_name.clone()),
            username: Set(actor.username.clone()),
            age: Set(actor.age),
            gender: Set(actor.gender.as_str().to_string()),
            height: Set(actor.height),
            updated_at_us: Set(chrono::Utc::now().timestamp_micros()),
        };

        tokio::task::spawn_blocking(move || -> Result<()> {
            let db = Database::connect(&db_url)?;
            actors::Entity::insert(record)
                .on_conflict(
                    OnConflict::column(actors::Column::UserId)
                        .update_columns([
                            actors::Column::Age,
                            actors::Column::Gender,
                            actors::Column::Height,
                            actors::Column::UpdatedAtUs,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&db)?;
            Ok(())
        })
        .await??;

        Ok(())
    }

    /// Active roles the actor qualifies for, highest fee first.
    ///
    /// Age must fall inside both bounds, so roles without an age range never
    /// match. Height must fall inside the range unless the role has no
    /// height floor at all.
    pub async fn find_matching_roles(&self, query: &RoleQuery) -> Result<Vec<Role>> {
        let db_url = self.db_url.clone();
        let query = *query;

        tokio::task::spawn_blocking(move || -> Result<Vec<Role>> {
            let db = Database::connect(&db_url)?;
            let rows = roles::Entity::find()
                .filter(roles::Column::IsActive.eq(true))
                .filter(
                    Condition::any()
                        .add(roles::Column::Gender.eq(query.gender.as_str()))
                        .add(roles::Column::Gender.eq(Gender::Any.as_str())),
                )
                .filter(roles::Column::AgeMin.lte(query.age))
                .filter(roles::Column::AgeMax.gte(query.age))
                .filter(
                    Condition::any()
                        .add(
                            Condition::all()
                                .add(roles::Column::HeightMin.lte(query.height))
                                .add(roles::Column::HeightMax.gte(query.height)),
                        )
                        .add(roles::Column::HeightMin.is_null()),
                )
                .order_by_desc(roles::Column::Fee)
                .order_by_asc(roles::Column::Id)
                .all(&db)?;

            Ok(rows.into_iter().map(Role::from).collect())
        })
        .await?
    }

    #[cfg(test)]
    pub(crate) async fn role_by_external_id(&self, external_id: &str) -> Result<Option<Role>> {
        let db_url = self.db_url.clone();
        let external_id = external_id.to_string();

        tokio::task::spawn_blocking(move || -> Result<Option<Role>> {
            let db = Database::connect(&db_url)?;
            let row = roles::Entity::find()
                .filter(roles::Column::RoleId.eq(external_id.as_str()))
                .one(&db)?;
            Ok(row.map(Role::from))
        })
        .await?
    }

    #[cfg(test)]
    pub(crate) async fn count_roles(&self) -> Result<u64> {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<u64> {
            let db = Database::connect(&db_url)?;
            Ok(roles::Entity::find().count(&db)?)
        })
        .await?
    }

    #[cfg(test)]
    pub(crate) async fn count_role_links(&self) -> Result<u64> {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<u64> {
            let db = Database::connect(&db_url)?;
            Ok(role_categories::Entity::find().count(&db)?)
        })
        .await?
    }

    #[cfg(test)]
    async fn actor(&self, user_id: i64) -> Result<Option<actors::Model>> {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<actors::Model>> {
            let db = Database::connect(&db_url)?;
            Ok(actors::Entity::find()
                .filter(actors::Column::UserId.eq(user_id))
                .one(&db)?)
        })
        .await?
    }

    #[cfg(test)]
    async fn count_actors(&self) -> Result<u64> {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<u64> {
            let db = Database::connect(&db_url)?;
            Ok(actors::Entity::find().count(&db)?)
        })
        .await?
    }
}

fn role_record(role: &NewRole, now_us: i64) -> roles::ActiveModel {
    roles::ActiveModel {
        id: NotSet,
        role_id: Set(role.external_id.clone()),
        title: Set(role.title.clone()),
        dates: Set(role.dates.clone()),
        description: Set(role.description.clone()),
        gender: Set(role.gender.as_str().to_string()),
        age_min: Set(role.age_min),
        age_max: Set(role.age_max),
        height_min: Set(role.height_min),
        height_max: Set(role.height_max),
        fee: Set(role.fee),
        city: Set(role.city.clone()),
        contact_info: Set(role.contact_info.clone()),
        requirements: Set(role.requirements.clone()),
        category: Set(role.category.clone()),
        source: Set(role.source.clone()),
        is_active: Set(role.is_active),
        updated_at_us: Set(now_us),
    }
}

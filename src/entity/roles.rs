use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub role_id: String,
    pub title: String,
    pub dates: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub gender: String,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub height_min: Option<i32>,
    pub height_max: Option<i32>,
    pub fee: Option<f64>,
    pub city: String,
    #[sea_orm(column_type = "Text")]
    pub contact_info: String,
    #[sea_orm(column_type = "Text")]
    pub requirements: String,
    pub category: String,
    pub source: String,
    pub is_active: bool,
    pub updated_at_us: i64,
}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM Entity for the entries table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One uploaded image plus the submitter's details.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Filename as supplied by the uploading client
    pub image_name: String,
    /// Server-relative path (local storage) or absolute URL (remote storage)
    pub image_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub image: String,

    // Denormalized set of owned place ids (JSON array of strings). Maintained
    // in the same transaction as the places table.
    pub places: String,

    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the owned-places column into a list of place ids
    pub fn place_ids(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.places)
    }
}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blocked_numbers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub phone_number: String,
    /// The number is blocked while block_until > now. Expired rows are
    /// garbage; they are never extended or resurrected.
    pub block_until: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

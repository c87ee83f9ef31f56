use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: String,
    pub cuisine_types: String,
    /// 两人均价(分)
    pub price_for_two: i64,
    pub rating: Option<f64>,
    /// 预计配送时长(分钟)
    pub delivery_time: i32,
    pub is_open: bool,
    pub owner_id: Option<i64>,
}

impl Model {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

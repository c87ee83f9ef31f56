use crate::entities::{
    UserRole, menu_item_entity as menu_items, restaurant_entity as restaurants,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{MenuItemResponse, RestaurantResponse, UserResponse};
use crate::services::Actor;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// 餐厅 / 菜单 / 用户资料的只读查询
#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 营业中的餐厅
    pub async fn list_restaurants(&self) -> AppResult<Vec<RestaurantResponse>> {
        let list = restaurants::Entity::find()
            .filter(restaurants::Column::IsOpen.eq(true))
            .order_by_asc(restaurants::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get_restaurant(&self, restaurant_id: i64) -> AppResult<RestaurantResponse> {
        restaurants::Entity::find_by_id(restaurant_id)
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Restaurant {restaurant_id} not found")))
    }

    pub async fn get_menu(&self, restaurant_id: i64) -> AppResult<Vec<MenuItemResponse>> {
        // 餐厅不存在时返回 404 而不是空菜单
        self.get_restaurant(restaurant_id).await?;

        let items = menu_items::Entity::find()
            .filter(menu_items::Column::RestaurantId.eq(restaurant_id))
            .order_by_asc(menu_items::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    /// 仅餐厅管理员可查看配送员列表
    pub async fn list_delivery_partners(&self, actor: &Actor) -> AppResult<Vec<UserResponse>> {
        actor.require_role(UserRole::RestaurantAdmin)?;

        let partners = users::Entity::find()
            .filter(users::Column::Role.eq(UserRole::DeliveryPartner))
            .order_by_asc(users::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(partners.into_iter().map(Into::into).collect())
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_menu_item, create_restaurant, create_user, setup_db};
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn test_lists_only_open_restaurants() {
        let db = setup_db().await;
        let owner = create_user(&db, UserRole::RestaurantAdmin).await;
        let open = create_restaurant(&db, owner.id).await;
        let closed = create_restaurant(&db, owner.id).await;
        let mut am: restaurants::ActiveModel = closed.clone().into();
        am.is_open = Set(false);
        am.update(&db).await.unwrap();

        let svc = CatalogService::new(db.clone());
        let ids: Vec<i64> = svc
            .list_restaurants()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![open.id]);

        // 直接访问仍可查看
        assert_eq!(svc.get_restaurant(closed.id).await.unwrap().id, closed.id);
    }

    #[tokio::test]
    async fn test_menu_of_missing_restaurant_is_not_found() {
        let db = setup_db().await;
        let owner = create_user(&db, UserRole::RestaurantAdmin).await;
        let restaurant = create_restaurant(&db, owner.id).await;
        create_menu_item(&db, restaurant.id, 1200).await;
        create_menu_item(&db, restaurant.id, 800).await;

        let svc = CatalogService::new(db.clone());
        assert_eq!(svc.get_menu(restaurant.id).await.unwrap().len(), 2);
        assert!(matches!(svc.get_menu(404).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delivery_partners_for_admins_only() {
        let db = setup_db().await;
        let admin = create_user(&db, UserRole::RestaurantAdmin).await;
        let customer = create_user(&db, UserRole::Customer).await;
        let partner = create_user(&db, UserRole::DeliveryPartner).await;

        let svc = CatalogService::new(db.clone());
        let list = svc
            .list_delivery_partners(&Actor::new(admin.id, admin.role))
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, partner.id);

        assert!(matches!(
            svc.list_delivery_partners(&Actor::new(customer.id, customer.role)).await,
            Err(AppError::Forbidden(_))
        ));
    }
}

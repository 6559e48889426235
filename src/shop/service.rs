use std::sync::Arc;

use tracing::info;

use super::models::{CreateShopRequest, NewShop, Shop, ShopPatch};
use super::repository::ShopRepository;
use crate::account::Role;
use crate::auth::AuthenticatedUser;
use crate::core_types::ShopId;
use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventPublisher};

pub struct ShopService {
    repo: Arc<dyn ShopRepository>,
    events: EventPublisher,
}

impl ShopService {
    pub fn new(repo: Arc<dyn ShopRepository>, events: EventPublisher) -> Self {
        Self { repo, events }
    }

    /// The caller becomes the owner. A second shop for the same user is a conflict.
    pub async fn create_shop(
        &self,
        caller: &AuthenticatedUser,
        req: CreateShopRequest,
    ) -> AppResult<Shop> {
        caller.require_role(Role::Shop)?;
        if self.repo.find_by_owner(caller.user_id).await?.is_some() {
            return Err(AppError::Conflict(
                "shop for this user already exists".to_string(),
            ));
        }

        let shop = self
            .repo
            .create(NewShop {
                owner_id: caller.user_id,
                name: req.name,
                address: req.address,
            })
            .await?;
        info!(shop_id = shop.id, user_id = caller.user_id, "shop created");
        self.events.publish(DomainEvent::ShopCreated {
            shop_id: shop.id,
            owner_id: shop.owner_id,
        });
        Ok(shop)
    }

    pub async fn get_shop(&self, id: ShopId) -> AppResult<Shop> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("shop"))
    }

    pub async fn list_shops(&self) -> AppResult<Vec<Shop>> {
        self.repo.list().await
    }

    pub async fn update_shop(
        &self,
        caller: &AuthenticatedUser,
        id: ShopId,
        patch: ShopPatch,
    ) -> AppResult<Shop> {
        let shop = self.get_shop(id).await?;
        if shop.owner_id != caller.user_id {
            return Err(AppError::forbidden("not the owner of this shop"));
        }
        let shop = self
            .repo
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("shop"))?;
        info!(shop_id = id, "shop updated");
        self.events.publish(DomainEvent::ShopUpdated { shop_id: id });
        Ok(shop)
    }
}

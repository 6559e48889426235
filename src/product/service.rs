use std::sync::Arc;

use tracing::info;

use super::models::{CreateProductRequest, NewProduct, Product, ProductPatch};
use super::repository::ProductRepository;
use crate::account::Role;
use crate::auth::AuthenticatedUser;
use crate::core_types::{ProductId, ShopId, ensure_money};
use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventPublisher};
use crate::shop::ShopRepository;

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    shops: Arc<dyn ShopRepository>,
    events: EventPublisher,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        shops: Arc<dyn ShopRepository>,
        events: EventPublisher,
    ) -> Self {
        Self {
            products,
            shops,
            events,
        }
    }

    /// Create a product in the caller's own shop.
    pub async fn create_product(
        &self,
        caller: &AuthenticatedUser,
        req: CreateProductRequest,
    ) -> AppResult<Product> {
        caller.require_role(Role::Shop)?;
        ensure_money(req.price, "price")?;
        let shop = self
            .shops
            .find_by_owner(caller.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("shop"))?;

        let product = self
            .products
            .create(NewProduct {
                shop_id: shop.id,
                name: req.name,
                price: req.price,
                stock: req.stock,
            })
            .await?;
        info!(product_id = product.id, shop_id = shop.id, "product created");
        self.events.publish(DomainEvent::ProductCreated {
            product_id: product.id,
            shop_id: shop.id,
        });
        Ok(product)
    }

    pub async fn get_product(&self, id: ProductId) -> AppResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("product"))
    }

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.products.list().await
    }

    pub async fn list_by_shop(&self, shop_id: ShopId) -> AppResult<Vec<Product>> {
        if self.shops.find_by_id(shop_id).await?.is_none() {
            return Err(AppError::not_found("shop"));
        }
        self.products.list_by_shop(shop_id).await
    }

    pub async fn update_product(
        &self,
        caller: &AuthenticatedUser,
        id: ProductId,
        patch: ProductPatch,
    ) -> AppResult<Product> {
        if let Some(price) = patch.price {
            ensure_money(price, "price")?;
        }
        self.owned_product(caller, id).await?;

        let product = self
            .products
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("product"))?;
        info!(product_id = id, shop_id = product.shop_id, "product updated");
        self.events
            .publish(DomainEvent::ProductUpdated { product_id: id });
        Ok(product)
    }

    pub async fn delete_product(&self, caller: &AuthenticatedUser, id: ProductId) -> AppResult<()> {
        self.owned_product(caller, id).await?;
        if !self.products.delete(id).await? {
            return Err(AppError::not_found("product"));
        }
        info!(product_id = id, "product deleted");
        self.events
            .publish(DomainEvent::ProductDeleted { product_id: id });
        Ok(())
    }

    /// Load `id` and check that the caller owns its shop.
    async fn owned_product(&self, caller: &AuthenticatedUser, id: ProductId) -> AppResult<Product> {
        caller.require_role(Role::Shop)?;
        let product = self.get_product(id).await?;
        let shop = self
            .shops
            .find_by_id(product.shop_id)
            .await?
            .ok_or_else(|| AppError::not_found("shop"))?;
        if shop.owner_id != caller.user_id {
            return Err(AppError::forbidden("product belongs to another shop"));
        }
        Ok(product)
    }
}

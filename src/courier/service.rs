use std::sync::Arc;

use tracing::info;

use super::models::{Courier, CourierPatch, CreateCourierRequest};
use super::repository::CourierRepository;
use crate::account::Role;
use crate::auth::AuthenticatedUser;
use crate::core_types::{CourierId, ensure_money};
use crate::error::{AppError, AppResult};

/// Reads are public; every mutation requires an admin.
pub struct CourierService {
    repo: Arc<dyn CourierRepository>,
}

impl CourierService {
    pub fn new(repo: Arc<dyn CourierRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_courier(
        &self,
        caller: &AuthenticatedUser,
        req: CreateCourierRequest,
    ) -> AppResult<Courier> {
        caller.require_role(Role::Admin)?;
        ensure_money(req.shipping_cost, "shipping_cost")?;
        let courier = self.repo.create(req).await?;
        info!(courier_id = courier.id, brand = %courier.brand, "courier created");
        Ok(courier)
    }

    pub async fn get_courier(&self, id: CourierId) -> AppResult<Courier> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("courier"))
    }

    pub async fn list_couriers(&self) -> AppResult<Vec<Courier>> {
        self.repo.list().await
    }

    pub async fn update_courier(
        &self,
        caller: &AuthenticatedUser,
        id: CourierId,
        patch: CourierPatch,
    ) -> AppResult<Courier> {
        caller.require_role(Role::Admin)?;
        if let Some(cost) = patch.shipping_cost {
            ensure_money(cost, "shipping_cost")?;
        }
        let courier = self
            .repo
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("courier"))?;
        info!(courier_id = id, "courier updated");
        Ok(courier)
    }

    pub async fn delete_courier(&self, caller: &AuthenticatedUser, id: CourierId) -> AppResult<()> {
        caller.require_role(Role::Admin)?;
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("courier"));
        }
        info!(courier_id = id, "courier deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestWorld;
    use rust_decimal::Decimal;

    fn req(cost: Decimal) -> CreateCourierRequest {
        CreateCourierRequest {
            brand: "Flash".into(),
            employer_name: "Flash Express".into(),
            phone: String::new(),
            shipping_cost: cost,
        }
    }

    #[tokio::test]
    async fn test_admin_manages_couriers() {
        let world = TestWorld::new();
        let admin = world.add_user(Role::Admin).await;

        let courier = world
            .couriers
            .create_courier(&admin, req(Decimal::new(2000, 2)))
            .await
            .unwrap();
        let patch = CourierPatch {
            shipping_cost: Some(Decimal::new(3500, 2)),
            ..Default::default()
        };
        let updated = world
            .couriers
            .update_courier(&admin, courier.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.shipping_cost, Decimal::new(35, 0));

        world.couriers.delete_courier(&admin, courier.id).await.unwrap();
        assert!(world.couriers.list_couriers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let world = TestWorld::new();
        let (owner, _) = world.add_shop().await;
        let err = world
            .couriers
            .create_courier(&owner, req(Decimal::ONE))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_negative_shipping_cost_rejected() {
        let world = TestWorld::new();
        let admin = world.add_user(Role::Admin).await;
        let err = world
            .couriers
            .create_courier(&admin, req(Decimal::new(-500, 2)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

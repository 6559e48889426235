use std::sync::Arc;

use tracing::{info, warn};

use super::cache::UserCache;
use super::models::{
    AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, User, UserPatch, UserView,
};
use super::repository::UserRepository;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{AuthenticatedUser, TokenService};
use crate::core_types::{Address, UserId};
use crate::db::Patch;
use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventPublisher};

const INVALID_CREDENTIALS: &str = "invalid email or password";

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    cache: Arc<UserCache>,
    events: EventPublisher,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        cache: Arc<UserCache>,
        events: EventPublisher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            repo,
            cache,
            events,
            tokens,
        }
    }

    /// Register a `general` or `shop` account.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<UserView> {
        let role = req.role.unwrap_or(Role::General);
        if role == Role::Admin {
            return Err(AppError::validation("admin role cannot be self-assigned"));
        }

        let email = normalize_email(&req.email);
        if self.repo.find_by_email(&email).await?.is_some() {
            warn!("Registration attempt for existing email");
            return Err(AppError::Conflict("email already in use".to_string()));
        }

        let password_hash = hash_blocking(req.password).await?;
        let user = self
            .repo
            .create(NewUser {
                first_name: req.first_name,
                last_name: req.last_name,
                email,
                phone: req.phone,
                address: req.address,
                password_hash,
                role,
            })
            .await?;

        info!(user_id = user.id, role = %user.role, "user registered");
        self.events
            .publish(DomainEvent::UserRegistered { user_id: user.id });
        Ok(user.into())
    }

    /// Check credentials and issue a token. Unknown email and wrong
    /// password fail the same way.
    pub async fn login(&self, req: LoginRequest) -> AppResult<AuthResponse> {
        let user = self
            .repo
            .find_by_email(&normalize_email(&req.email))
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let stored = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&req.password, &stored))
            .await
            .map_err(|e| AppError::Internal(format!("password check task failed: {e}")))?;
        if !verified {
            warn!(user_id = user.id, "login failed");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.tokens.issue(&user)?;
        info!(user_id = user.id, "login succeeded");
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Create the configured admin account unless the email is taken.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<()> {
        let email = normalize_email(email);
        if let Some(existing) = self.repo.find_by_email(&email).await? {
            if existing.role != Role::Admin {
                warn!(user_id = existing.id, "bootstrap admin email belongs to a non-admin user");
            }
            return Ok(());
        }

        let password_hash = hash_blocking(password.to_string()).await?;
        let user = self
            .repo
            .create(NewUser {
                first_name: "Admin".to_string(),
                last_name: "Admin".to_string(),
                email,
                phone: String::new(),
                address: Address::default(),
                password_hash,
                role: Role::Admin,
            })
            .await?;
        info!(user_id = user.id, "bootstrap admin created");
        Ok(())
    }

    /// Cache-first lookup. A miss reads the store and asks the event
    /// worker to cache the result.
    pub async fn get_user(&self, id: UserId) -> AppResult<User> {
        if let Some(user) = self.cache.get(id) {
            return Ok(user);
        }
        let generation = self.cache.generation(id);
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user"))?;
        self.events.publish(DomainEvent::UserLoaded {
            user: user.clone(),
            generation,
        });
        Ok(user)
    }

    pub async fn profile(&self, caller: &AuthenticatedUser) -> AppResult<UserView> {
        Ok(self.get_user(caller.user_id).await?.into())
    }

    /// Self or admin.
    pub async fn view_user(&self, caller: &AuthenticatedUser, id: UserId) -> AppResult<UserView> {
        ensure_self_or_admin(caller, id)?;
        Ok(self.get_user(id).await?.into())
    }

    pub async fn list_users(&self, caller: &AuthenticatedUser) -> AppResult<Vec<UserView>> {
        caller.require_role(Role::Admin)?;
        let users = self.repo.list().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// Self or admin; only an admin may change `role`.
    pub async fn update_user(
        &self,
        caller: &AuthenticatedUser,
        id: UserId,
        patch: UserPatch,
    ) -> AppResult<UserView> {
        ensure_self_or_admin(caller, id)?;
        if patch.role.is_some() && !caller.is_admin() {
            return Err(AppError::forbidden("only an admin may change roles"));
        }
        if patch.is_empty() {
            return Err(AppError::validation("no fields to update"));
        }

        let user = self
            .repo
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("user"))?;
        self.cache.evict(id);
        self.events.publish(DomainEvent::UserUpdated { user_id: id });
        info!(user_id = id, "user updated");
        Ok(user.into())
    }

    pub async fn delete_user(&self, caller: &AuthenticatedUser, id: UserId) -> AppResult<()> {
        caller.require_role(Role::Admin)?;
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("user"));
        }
        self.cache.evict(id);
        self.events
            .publish(DomainEvent::UserDeleted { user_id: id });
        info!(user_id = id, "user deleted");
        Ok(())
    }
}

fn ensure_self_or_admin(caller: &AuthenticatedUser, id: UserId) -> AppResult<()> {
    if caller.user_id == id || caller.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("cannot access another user's account"))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

async fn hash_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
}

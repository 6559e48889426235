//! Data models for user accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::{Address, UserId};
use crate::db::patch::{Patch, PatchValue, push_text};
use crate::error::AppError;

/// Account role. Decides which endpoints a caller may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Buyer
    General,
    /// Shop owner
    Shop,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::General => "general",
            Role::Shop => "shop",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Role::General),
            "shop" => Ok(Role::Shop),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// Stored user account
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    /// Argon2 PHC string
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of [`User`]; never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    #[schema(example = 1)]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "buyer@example.com")]
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            address: u.address,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub password_hash: String,
    pub role: Role,
}

/// User registration request
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Somchai")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Jaidee")]
    pub last_name: String,
    #[validate(email)]
    #[schema(example = "buyer@example.com")]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    #[schema(example = "password123")]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone: String,
    #[serde(default)]
    #[validate(nested)]
    pub address: Address,
    /// `general` (default) or `shop`
    #[serde(default)]
    pub role: Option<Role>,
}

/// User login request
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    #[schema(example = "buyer@example.com")]
    pub email: String,
    #[validate(length(min = 1))]
    #[schema(example = "password123")]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

/// Partial profile update. Only admins may set `role`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub province: Option<String>,
    #[validate(length(max = 100))]
    pub district: Option<String>,
    #[validate(length(max = 100))]
    pub subdistrict: Option<String>,
    #[validate(length(max = 16))]
    pub zip_code: Option<String>,
    pub detail_address: Option<String>,
    pub role: Option<Role>,
}

impl Patch for UserPatch {
    fn fields(&self) -> Vec<(&'static str, PatchValue)> {
        let mut fields = Vec::new();
        push_text(&mut fields, "first_name", &self.first_name);
        push_text(&mut fields, "last_name", &self.last_name);
        push_text(&mut fields, "phone", &self.phone);
        push_text(&mut fields, "province", &self.province);
        push_text(&mut fields, "district", &self.district);
        push_text(&mut fields, "subdistrict", &self.subdistrict);
        push_text(&mut fields, "zip_code", &self.zip_code);
        push_text(&mut fields, "detail_address", &self.detail_address);
        if let Some(role) = self.role {
            fields.push(("role", PatchValue::Text(role.as_str().to_string())));
        }
        fields
    }
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        let set = |target: &mut String, value: &Option<String>| {
            if let Some(v) = value {
                target.clone_from(v);
            }
        };
        set(&mut user.first_name, &self.first_name);
        set(&mut user.last_name, &self.last_name);
        set(&mut user.phone, &self.phone);
        set(&mut user.address.province, &self.province);
        set(&mut user.address.district, &self.district);
        set(&mut user.address.subdistrict, &self.subdistrict);
        set(&mut user.address.zip_code, &self.zip_code);
        set(&mut user.address.detail_address, &self.detail_address);
        if let Some(role) = self.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_str() {
        for role in [Role::General, Role::Shop, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Shop).unwrap(), "\"shop\"");
        let role: Role = serde_json::from_str("\"general\"").unwrap();
        assert_eq!(role, Role::General);
    }

    #[test]
    fn test_user_patch_fields_in_column_order() {
        let patch = UserPatch {
            first_name: Some("Ann".into()),
            zip_code: Some("10110".into()),
            role: Some(Role::Shop),
            ..Default::default()
        };
        let columns: Vec<_> = patch.fields().into_iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["first_name", "zip_code", "role"]);
    }

    #[test]
    fn test_register_request_validation() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"first_name":"A","last_name":"B","email":"not-an-email","password":"short"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_user_view_hides_password_hash() {
        let now = Utc::now();
        let view = UserView::from(User {
            id: 1,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.co".into(),
            phone: String::new(),
            address: Address::default(),
            password_hash: "$argon2id$secret".into(),
            role: Role::General,
            created_at: now,
            updated_at: now,
        });
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}

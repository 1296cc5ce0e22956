use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::models::role::Role;

/// Claims of the bearer tokens issued by the loyalty platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,     // Subject (email or username)
    pub user_id: String, // Platform user id, equals the customer id for customers
    pub roles: Vec<Role>,
    // Business the user owns or works for; absent for customers and admins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at (as UTC timestamp)
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.is_admin() || self.roles.iter().any(|role| roles.contains(role))
    }

    /// `true` for admins, and for owners or staff whose business claim
    /// matches `business_id`.
    pub fn acts_for_business(&self, business_id: Option<&str>) -> bool {
        if self.is_admin() {
            return true;
        }
        let Some(business_id) = business_id else {
            return false;
        };
        self.has_any_role(&[Role::BusinessOwner, Role::Staff])
            && self.business_id.as_deref() == Some(business_id)
    }

    /// `true` for admins and for the customer `customer_id` itself.
    pub fn owns_customer(&self, customer_id: Option<&str>) -> bool {
        self.is_admin() || customer_id.is_some_and(|id| id == self.user_id)
    }
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT")?;

    Ok(token_data.claims)
}

#[cfg(test)]
pub fn create_token(
    user_id: &str,
    roles: &[Role],
    business_id: Option<&str>,
    jwt_secret: &str,
) -> Result<String> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = chrono::Utc::now();
    let expiry = now + chrono::Duration::days(1);

    let claims = Claims {
        sub: format!("user-{}", user_id),
        user_id: user_id.to_string(),
        roles: roles.to_vec(),
        business_id: business_id.map(String::from),
        exp: expiry.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .context("Failed to encode JWT")
}

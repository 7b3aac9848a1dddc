//! Password-grant auth against the Supabase GoTrue endpoints.

use crate::{Config, Error, expect_ok};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default)]
    pub app_metadata: AppMetadata,
}

/// Display fields captured at sign-up. GoTrue stores these verbatim under
/// `raw_user_meta_data` and echoes them back on every session.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct UserMetadata {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// Server-controlled claims. Unlike `user_metadata` this is not writable by
/// the user themselves, which is what makes `role` usable for admin checks.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct AppMetadata {
    pub role: Option<String>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.app_metadata.role.as_deref() == Some(role)
    }
}

pub async fn sign_in_with_password(
    config: &Config,
    email: &str,
    password: &str,
) -> Result<Session, Error> {
    let client = fetch_happen::Client;
    let url = format!(
        "{}/auth/v1/token?grant_type=password",
        config.supabase_url
    );

    let response = client
        .post(&url)
        .header("apikey", &config.supabase_anon_key)
        .json(&serde_json::json!({ "email": email, "password": password }))
        .map_err(Error::Request)?
        .send()
        .await
        .map_err(Error::Request)?;

    let response = expect_ok(response, "sign-in").await?;
    response.json().await.map_err(|source| Error::Decode {
        context: "sign-in",
        source,
    })
}

pub async fn sign_up(
    config: &Config,
    email: &str,
    password: &str,
    metadata: UserMetadata,
) -> Result<Session, Error> {
    let client = fetch_happen::Client;
    let url = format!("{}/auth/v1/signup", config.supabase_url);

    let response = client
        .post(&url)
        .header("apikey", &config.supabase_anon_key)
        .json(&serde_json::json!({
            "email": email,
            "password": password,
            "data": metadata,
        }))
        .map_err(Error::Request)?
        .send()
        .await
        .map_err(Error::Request)?;

    let response = expect_ok(response, "sign-up").await?;
    response.json().await.map_err(|source| Error::Decode {
        context: "sign-up",
        source,
    })
}

/// Revokes the session's refresh token server-side. The caller is expected to
/// drop its local session either way.
pub async fn sign_out(config: &Config, access_token: &str) -> Result<(), Error> {
    let client = fetch_happen::Client;
    let url = format!("{}/auth/v1/logout", config.supabase_url);

    let response = client
        .post(&url)
        .header("apikey", &config.supabase_anon_key)
        .header("Authorization", format!("Bearer {access_token}"))
        .send()
        .await
        .map_err(Error::Request)?;

    expect_ok(response, "sign-out").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_decodes_gotrue_payload() {
        let body = serde_json::json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r",
            "user": {
                "id": "5f3c",
                "email": "rider@example.com",
                "user_metadata": { "first_name": "Ana", "username": "ana" },
                "app_metadata": { "provider": "email", "role": "admin" }
            }
        });

        let session: Session = serde_json::from_value(body).unwrap();
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.user.id, "5f3c");
        assert_eq!(session.user.user_metadata.first_name.as_deref(), Some("Ana"));
        assert_eq!(session.user.user_metadata.last_name, None);
        assert!(session.user.has_role("admin"));
        assert!(!session.user.has_role("moderator"));
    }

    #[test]
    fn missing_metadata_defaults_to_empty() {
        let body = serde_json::json!({
            "access_token": "jwt",
            "user": { "id": "5f3c", "email": null }
        });

        let session: Session = serde_json::from_value(body).unwrap();
        assert_eq!(session.user.user_metadata.username, None);
        assert!(!session.user.has_role("admin"));
    }
}

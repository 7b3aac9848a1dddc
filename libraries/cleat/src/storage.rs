//! Storage-object upload and public URL construction.

use crate::{Config, Error, expect_ok};

/// Upload raw bytes to `bucket/path`. The object is created, not upserted;
/// callers are expected to pick collision-free paths.
pub async fn upload(
    config: &Config,
    access_token: &str,
    bucket: &str,
    path: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<(), Error> {
    let client = fetch_happen::Client;
    let url = format!("{}/storage/v1/object/{bucket}/{path}", config.supabase_url);

    let response = client
        .post(&url)
        .header("apikey", &config.supabase_anon_key)
        .header("Authorization", format!("Bearer {access_token}"))
        .header("Content-Type", content_type)
        .body(bytes)
        .send()
        .await
        .map_err(Error::Request)?;

    expect_ok(response, "upload").await?;
    Ok(())
}

/// The stable public URL for an object in a public bucket. Pure string
/// assembly; no request is made and nothing checks the object exists.
pub fn public_url(config: &Config, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{bucket}/{path}",
        config.supabase_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_matches_supabase_layout() {
        let config = Config {
            supabase_url: "https://proj.supabase.co".to_string(),
            supabase_anon_key: "anon".to_string(),
        };
        assert_eq!(
            public_url(&config, "spots", "public/1700000000_ab12cd.jpg"),
            "https://proj.supabase.co/storage/v1/object/public/spots/public/1700000000_ab12cd.jpg"
        );
    }
}

//! A very small PostgREST query layer. Only the operators Updock needs:
//! `eq` filters, one `order` clause, and the four row verbs. Everything else
//! (row-level security, cascades, defaults) is the backend's job.

use crate::{Config, Error, expect_ok};

impl Config {
    /// Start a query against `table`. When `access_token` is `None` the anon
    /// key is used as the bearer, so reads still work for logged-out viewers
    /// under whatever RLS policy the table carries.
    pub fn from<'a>(&'a self, table: &'static str, access_token: Option<&'a str>) -> Table<'a> {
        Table {
            config: self,
            access_token,
            table,
            filters: Vec::new(),
            order: None,
        }
    }
}

pub struct Table<'a> {
    config: &'a Config,
    access_token: Option<&'a str>,
    table: &'static str,
    filters: Vec<(&'static str, String)>,
    order: Option<(&'static str, bool)>,
}

impl<'a> Table<'a> {
    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order = Some((column, true));
        self
    }

    pub fn order_asc(mut self, column: &'static str) -> Self {
        self.order = Some((column, false));
        self
    }

    fn bearer(&self) -> &str {
        self.access_token
            .unwrap_or(&self.config.supabase_anon_key)
    }

    fn url(&self, select: Option<&str>) -> String {
        let mut params = Vec::new();
        if let Some(columns) = select {
            params.push(format!("select={columns}"));
        }
        for (column, value) in &self.filters {
            params.push(format!("{column}=eq.{value}"));
        }
        if let Some((column, descending)) = self.order {
            let direction = if descending { "desc" } else { "asc" };
            params.push(format!("order={column}.{direction}"));
        }

        let base = format!("{}/rest/v1/{}", self.config.supabase_url, self.table);
        if params.is_empty() {
            base
        } else {
            format!("{base}?{}", params.join("&"))
        }
    }

    pub async fn select<T: serde::de::DeserializeOwned>(
        self,
        columns: &str,
    ) -> Result<Vec<T>, Error> {
        let client = fetch_happen::Client;
        let bearer = format!("Bearer {}", self.bearer());

        let response = client
            .get(&self.url(Some(columns)))
            .header("apikey", &self.config.supabase_anon_key)
            .header("Authorization", bearer)
            .send()
            .await
            .map_err(Error::Request)?;

        let response = expect_ok(response, "select").await?;
        response.json().await.map_err(|source| Error::Decode {
            context: "select",
            source,
        })
    }

    /// Insert one row and return it as the backend stored it, defaults and
    /// generated id included.
    pub async fn insert_returning<T: serde::de::DeserializeOwned>(
        self,
        row: &impl serde::Serialize,
    ) -> Result<T, Error> {
        let client = fetch_happen::Client;
        let bearer = format!("Bearer {}", self.bearer());

        let response = client
            .post(&self.url(None))
            .header("apikey", &self.config.supabase_anon_key)
            .header("Authorization", bearer)
            .header("Prefer", "return=representation")
            .json(row)
            .map_err(Error::Request)?
            .send()
            .await
            .map_err(Error::Request)?;

        let response = expect_ok(response, "insert").await?;
        // PostgREST always returns an array, even for a single-row insert
        let mut rows: Vec<T> = response.json().await.map_err(|source| Error::Decode {
            context: "insert",
            source,
        })?;
        if rows.is_empty() {
            return Err(Error::Empty { context: "insert" });
        }
        Ok(rows.remove(0))
    }

    pub async fn insert(self, row: &impl serde::Serialize) -> Result<(), Error> {
        let client = fetch_happen::Client;
        let bearer = format!("Bearer {}", self.bearer());

        let response = client
            .post(&self.url(None))
            .header("apikey", &self.config.supabase_anon_key)
            .header("Authorization", bearer)
            .json(row)
            .map_err(Error::Request)?
            .send()
            .await
            .map_err(Error::Request)?;

        expect_ok(response, "insert").await?;
        Ok(())
    }

    pub async fn update(self, changes: &impl serde::Serialize) -> Result<(), Error> {
        let client = fetch_happen::Client;
        let bearer = format!("Bearer {}", self.bearer());

        let response = client
            .patch(&self.url(None))
            .header("apikey", &self.config.supabase_anon_key)
            .header("Authorization", bearer)
            .json(changes)
            .map_err(Error::Request)?
            .send()
            .await
            .map_err(Error::Request)?;

        expect_ok(response, "update").await?;
        Ok(())
    }

    pub async fn delete(self) -> Result<(), Error> {
        let client = fetch_happen::Client;
        let bearer = format!("Bearer {}", self.bearer());

        let response = client
            .delete(&self.url(None))
            .header("apikey", &self.config.supabase_anon_key)
            .header("Authorization", bearer)
            .send()
            .await
            .map_err(Error::Request)?;

        expect_ok(response, "delete").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            supabase_url: "https://proj.supabase.co".to_string(),
            supabase_anon_key: "anon".to_string(),
        }
    }

    #[test]
    fn bare_table_url_has_no_query_string() {
        let config = config();
        let table = config.from("spots", None);
        assert_eq!(table.url(None), "https://proj.supabase.co/rest/v1/spots");
    }

    #[test]
    fn select_with_order_and_filter() {
        let config = config();
        let table = config
            .from("spots", None)
            .eq("user_id", "u1")
            .order_desc("created_at");
        assert_eq!(
            table.url(Some("*")),
            "https://proj.supabase.co/rest/v1/spots?select=*&user_id=eq.u1&order=created_at.desc"
        );
    }

    #[test]
    fn multiple_eq_filters_compose() {
        let config = config();
        let table = config
            .from("favorites", Some("token"))
            .eq("spot_id", "s1")
            .eq("user_id", "u1");
        assert_eq!(
            table.url(None),
            "https://proj.supabase.co/rest/v1/favorites?spot_id=eq.s1&user_id=eq.u1"
        );
        assert_eq!(table.bearer(), "token");
    }

    #[test]
    fn anon_key_is_the_fallback_bearer() {
        let config = config();
        assert_eq!(config.from("spots", None).bearer(), "anon");
    }
}

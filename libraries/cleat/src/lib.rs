//! This is a thin client for a Supabase backend: password auth, PostgREST row
//! access, and storage-object uploads, all over plain REST.
//! It was created for Updock, so it doesn't include much that was not needed
//! for that project. In particular there is no realtime channel support and no
//! token refresh loop; the UI shell re-authenticates when a token expires.

pub mod auth;
pub mod rows;
pub mod storage;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request error: {0:?}")]
    Request(#[source] fetch_happen::Error),

    #[error("{context} failed with status {status}: {body}")]
    Status {
        context: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to parse {context} response: {source:?}")]
    Decode {
        context: &'static str,
        #[source]
        source: fetch_happen::Error,
    },

    #[error("{context} returned no rows")]
    Empty { context: &'static str },
}

/// Turn a non-2xx response into an [`Error::Status`], keeping the response
/// body because Supabase puts the useful constraint/RLS detail there.
pub(crate) async fn expect_ok(
    response: fetch_happen::Response,
    context: &'static str,
) -> Result<fetch_happen::Response, Error> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(Error::Status {
        context,
        status,
        body,
    })
}

use crate::language::Language;

/// The launch techniques a spot supports. A spot carries at least one tag;
/// the first one drives the map badge color, so order is meaningful.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum StartType {
    Dockstart,
    Rockstart,
    Dropstart,
    Deadstart,
    Rampstart,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Spot {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub start_types: Vec<StartType>,
    /// `[lat, lng]` in decimal degrees.
    pub position: [f64; 2],
    pub description: String,
    pub description_fr: Option<String>,
    pub difficulty: Difficulty,
    /// Drop height in meters, mostly relevant for dropstart spots.
    pub height: Option<f64>,
    pub image_urls: Option<Vec<String>>,
    pub is_approved: bool,
    /// Km from the viewer. Computed client-side, never persisted.
    pub distance: Option<f64>,
}

impl Spot {
    /// The description to display for `language`, falling back to the default
    /// (English) text when no localized variant exists.
    pub fn description_for(&self, language: Language) -> &str {
        match language {
            Language::French => self.description_fr.as_deref().unwrap_or(&self.description),
            Language::English => &self.description,
        }
    }
}

/// A `spots` row as the backend returns it: `lat`/`lng` as separate columns,
/// and `type` as whatever a given writer stored there over the app's history
/// (native json array, json-encoded string, or a bare tag).
#[derive(Clone, Debug, serde::Deserialize)]
pub struct SpotRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub start_types: Option<serde_json::Value>,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    #[serde(default)]
    pub description_fr: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl SpotRow {
    pub fn into_spot(self) -> Spot {
        Spot {
            start_types: normalize_start_types(self.start_types.as_ref()),
            id: self.id,
            name: self.name,
            position: [self.lat, self.lng],
            description: self.description,
            description_fr: self.description_fr,
            difficulty: self.difficulty,
            height: self.height,
            image_urls: self.image_urls,
            is_approved: self.is_approved,
            distance: None,
        }
    }
}

/// Insert payload for a new spot. `is_approved` is deliberately absent so the
/// backend default (false) applies and submissions always enter review.
#[derive(Debug, serde::Serialize)]
pub struct NewSpotRow {
    pub name: String,
    pub description: String,
    pub description_fr: Option<String>,
    #[serde(rename = "type")]
    pub start_types: String,
    pub lat: f64,
    pub lng: f64,
    pub difficulty: Difficulty,
    pub height: Option<f64>,
    pub image_urls: Option<Vec<String>>,
    pub user_id: String,
}

/// The fields the edit flow may change. Position and photos are fixed once a
/// spot is submitted.
#[derive(Debug, serde::Serialize)]
pub struct SpotChanges {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub start_types: String,
    pub difficulty: Difficulty,
}

/// What the submission form hands over; id and ownership are assigned later.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct SpotDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub start_types: Vec<StartType>,
    pub position: [f64; 2],
    pub description: String,
    pub description_fr: Option<String>,
    pub difficulty: Difficulty,
    pub height: Option<f64>,
}

/// An image picked in the submission form, already read into memory by the
/// shell (the core never touches `File` handles directly).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Decode the heterogeneous `type` column into a non-empty tag list. This is
/// a total function: any shape we don't recognize degrades to `[Dockstart]`
/// instead of failing the row. The same column has historically held a native
/// json array, a json-encoded array string, and a bare tag string, so all
/// three must keep decoding forever.
pub fn normalize_start_types(raw: Option<&serde_json::Value>) -> Vec<StartType> {
    let tags = match raw {
        Some(value @ serde_json::Value::Array(_)) => {
            serde_json::from_value::<Vec<StartType>>(value.clone()).ok()
        }
        Some(serde_json::Value::String(text)) => {
            match serde_json::from_str::<serde_json::Value>(text) {
                Ok(parsed @ serde_json::Value::Array(_)) => {
                    serde_json::from_value::<Vec<StartType>>(parsed).ok()
                }
                // A bare tag is not valid json and lands here, as does a
                // json-encoded single string.
                _ => serde_json::from_value::<StartType>(serde_json::Value::String(text.clone()))
                    .ok()
                    .map(|tag| vec![tag]),
            }
        }
        _ => None,
    };

    match tags {
        Some(tags) if !tags.is_empty() => tags,
        _ => vec![StartType::Dockstart],
    }
}

/// `type` is stored as json text on write (the reader accepts more shapes
/// than the writer produces, see [`normalize_start_types`]).
pub fn start_types_json(tags: &[StartType]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[\"Dockstart\"]".to_string())
}

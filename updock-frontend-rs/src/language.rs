//! Display language preference. Only the spot descriptions are localized in
//! the core; the UI string tables live in the shell.

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Language {
    French,
    English,
}

pub(crate) const LANGUAGE_STORAGE_KEY: &str = "updock_language";

impl Language {
    /// The two-letter code persisted in localStorage, shared with the shell's
    /// translation tables.
    pub fn code(self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        match code {
            "fr" => Some(Language::French),
            "en" => Some(Language::English),
            _ => None,
        }
    }
}

/// French is the default: the app's community skews French-speaking.
pub(crate) fn load_language_preference() -> Language {
    #[cfg(target_arch = "wasm32")]
    {
        crate::utils::local_storage()
            .and_then(|storage| storage.get_item(LANGUAGE_STORAGE_KEY).ok().flatten())
            .and_then(|code| Language::from_code(&code))
            .unwrap_or(Language::French)
    }
    #[cfg(not(target_arch = "wasm32"))]
    Language::French
}

pub(crate) fn save_language_preference(language: Language) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(storage) = crate::utils::local_storage() else {
            return;
        };
        if let Err(e) = storage.set_item(LANGUAGE_STORAGE_KEY, language.code()) {
            log::warn!("Failed to persist language preference: {e:?}");
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = language;
}

//! Saved options: descriptors, storage and accessors.
//!
//! Only the names in [`OPTION_DATA`] are recognized. Values are plain
//! strings and are never validated; an absent value and an empty value
//! both mean "not set".

mod data;
mod store;

pub use data::{
    API_KEY_NAME, ControlKind, Description, EMPTY_VOICE_LABEL, OPTION_DATA, OptionDescriptor,
    OptionsSource, SelectOption, VOICE_NAME, VOICES_DOC_URL, descriptor, option_names,
    produce_options, voice_options,
};
pub use store::{FileStore, MemoryStore, OPTIONS_FILE_ENV_VAR, OptionsStore, SavedOptions};

use crate::errors::StoreError;

/// Returns every recognized option that has a stored value.
pub async fn saved_options<S: OptionsStore>(store: &S) -> Result<SavedOptions, StoreError> {
    store.get(&option_names()).await
}

/// Returns the stored value for `key`, or `default_value` when it is
/// absent or empty.
///
/// ## Examples
///
/// ```rust,ignore
/// let voice = saved_option(&store, "voice", "x").await?;
/// ```
pub async fn saved_option<S: OptionsStore>(
    store: &S,
    key: &str,
    default_value: &str,
) -> Result<String, StoreError> {
    let mut values = store.get(&[key]).await?;
    Ok(values
        .remove(key)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default_value.to_string()))
}

/// The saved API key, or `""`.
pub async fn api_key<S: OptionsStore>(store: &S) -> Result<String, StoreError> {
    saved_option(store, API_KEY_NAME, "").await
}

/// The saved voice name, or `""`.
pub async fn voice<S: OptionsStore>(store: &S) -> Result<String, StoreError> {
    saved_option(store, VOICE_NAME, "").await
}

/// Stores values for recognized options.
///
/// ## Errors
///
/// Returns `StoreError::UnknownOption` for a name outside [`OPTION_DATA`];
/// nothing is written in that case.
pub async fn save_options<S: OptionsStore>(
    store: &S,
    values: SavedOptions,
) -> Result<(), StoreError> {
    if let Some(unknown) = values.keys().find(|name| descriptor(name).is_none()) {
        return Err(StoreError::UnknownOption(unknown.clone()));
    }
    store.set(values).await
}

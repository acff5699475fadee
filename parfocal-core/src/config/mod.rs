//! Configuration persistence
//!
//! The focuser settings record and its flash storage, stored as postcard
//! binary data.

pub mod persistence;
pub mod settings;

pub use persistence::{
    clear_settings, load_settings, save_settings, try_load_settings, PersistenceError,
    MAX_SETTINGS_SIZE,
};
pub use settings::{FocuserSettings, SETTINGS_MAGIC, SETTINGS_VERSION};

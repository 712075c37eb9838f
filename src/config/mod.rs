//! Configuration module for semcube.
//!
//! Handles compiler settings: target dialect, variation policy, allowed
//! grains, and plan cache limits.

mod settings;

pub use settings::{
    CacheSettings, CompilerSettings, GrainSettings, Settings, SettingsError, VariationEnforcement,
    VariationPolicy, VariationSettings, CONFIG_ENV_VAR,
};

//! Start-up loading for the demo viewer.

/// Annotation settings JSON loading with fallback to defaults.
pub mod settings_loader;

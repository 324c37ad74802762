//! `--init-config` - write a default settings file.

use anyhow::Result;
use limitbar_store::{SettingsStore, default_settings_path};

/// Creates a default config file, refusing to overwrite an existing one.
pub async fn run() -> Result<()> {
    let path = default_settings_path();
    if SettingsStore::init_default_file(path.clone()).await? {
        println!("✓ Default config written to {}", path.display());
        println!("Enable providers by setting \"enabled\": true, then run `limitbar`.");
    } else {
        println!("Config already exists at {} — leaving it untouched.", path.display());
    }
    Ok(())
}

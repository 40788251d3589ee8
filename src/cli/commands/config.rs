//! Config Command
//!
//! Shows, locates, and initializes configuration files.

use crate::config::ConfigLoader;
use crate::types::Result;

pub fn show(format: &str) -> Result<()> {
    ConfigLoader::show_config(format == "json")
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(force: bool) -> Result<()> {
    let path = ConfigLoader::init_project(force)?;
    println!("✓ Project config: {}", path.display());
    Ok(())
}

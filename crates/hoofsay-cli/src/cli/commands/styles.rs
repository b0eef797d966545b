//! Balloon style listing.

use anyhow::Result;

pub fn list() -> Result<()> {
    for style in hoofsay_assets::BALLOON_STYLES {
        println!("{}", style.name);
    }
    Ok(())
}

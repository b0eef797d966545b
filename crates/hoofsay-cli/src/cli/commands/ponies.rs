//! Embedded pony listing.

use anyhow::Result;

pub fn list() -> Result<()> {
    for pony in hoofsay_assets::PONIES {
        println!("{}", pony.name);
    }
    Ok(())
}

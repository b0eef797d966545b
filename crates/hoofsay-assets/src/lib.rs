//! Embedded balloon styles and demo pony templates.
//!
//! Everything ships inside the binary via `include_str!`; the CLI resolves
//! names here before falling back to the filesystem.

/// A named embedded asset.
#[derive(Debug, Clone, Copy)]
pub struct NamedAsset {
    pub name: &'static str,
    pub contents: &'static str,
}

/// Embedded balloon styles.
pub const BALLOON_STYLES: &[NamedAsset] = &[
    NamedAsset {
        name: "round",
        contents: include_str!("../assets/balloons/round.say"),
    },
    NamedAsset {
        name: "ascii",
        contents: include_str!("../assets/balloons/ascii.say"),
    },
    NamedAsset {
        name: "think",
        contents: include_str!("../assets/balloons/think.say"),
    },
];

/// Embedded demo pony templates.
pub const PONIES: &[NamedAsset] = &[
    NamedAsset {
        name: "sparkle",
        contents: include_str!("../assets/ponies/sparkle.pony"),
    },
    NamedAsset {
        name: "mini",
        contents: include_str!("../assets/ponies/mini.pony"),
    },
];

/// Looks up an embedded balloon style by name.
pub fn balloon_style(name: &str) -> Option<&'static str> {
    BALLOON_STYLES
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.contents)
}

/// Looks up an embedded pony template by name.
pub fn pony(name: &str) -> Option<&'static str> {
    PONIES.iter().find(|a| a.name == name).map(|a| a.contents)
}

use crate::catalog::Category;

/// Platform table: (id, label, accepted extensions)
const PLATFORMS: &[(&str, &str, &[&str])] = &[
    ("nes", "NES", &["7z", "zip", "nes"]),
    ("snes", "SNES", &["7z", "zip", "smc", "sfc"]),
    ("genesis", "Genesis", &["7z", "zip", "md", "gen"]),
    ("gb", "Game Boy", &["7z", "zip", "gb"]),
    ("gba", "GBA", &["7z", "zip", "gba"]),
    ("gbc", "GBC", &["7z", "zip", "gbc"]),
    ("gamegear", "Game Gear", &["7z", "zip", "gg"]),
    ("ngp", "Neo Geo Pocket", &["7z", "zip", "ngp", "ngc"]),
    ("sms", "Sega Master System", &["7z", "zip", "sms"]),
    ("segacd", "Sega CD", &["7z", "zip", "chd", "cue", "bin", "iso"]),
    ("sega32x", "Sega 32X", &["7z", "zip", "32x"]),
    ("saturn", "Sega Saturn", &["7z", "zip", "chd", "cue", "bin", "iso"]),
    ("tg16", "TurboGrafx-16", &["7z", "zip", "pce"]),
    ("ps1", "PlayStation", &["7z", "zip", "chd", "cue", "bin", "iso"]),
    ("n64", "Nintendo 64", &["7z", "zip", "z64", "n64", "v64"]),
    ("dreamcast", "Dreamcast", &["7z", "zip", "chd", "cdi", "gdi"]),
];

/// Returns the built-in platform categories in declaration order
///
/// None of them has a root URL; those come from configuration.
pub fn builtin_categories() -> Vec<Category> {
    PLATFORMS
        .iter()
        .map(|(id, label, extensions)| Category::new(*id, *label, extensions.iter()))
        .collect()
}

//! Category aliasing shared by scoring, composition and gap detection.
//!
//! Catalog data spells the same coarse category several ways ("Footwear" vs
//! "Shoes", "Tops" vs "Topwear"). Every comparison between categories goes
//! through [`canonical`] so the spellings never drift apart between components.

pub const TOPWEAR: &str = "Topwear";
pub const BOTTOMWEAR: &str = "Bottomwear";
pub const FOOTWEAR: &str = "Footwear";
pub const ACCESSORIES: &str = "Accessories";
pub const OUTERWEAR: &str = "Outerwear";
pub const ONE_PIECE: &str = "One-Piece";

/// Declared category assumed for photos the user did not label.
pub const UNLABELLED: &str = "Apparel";

/// alias (lowercase) -> canonical key (lowercase)
const ALIASES: &[(&str, &str)] = &[
    ("topwear", "topwear"),
    ("tops", "topwear"),
    ("top", "topwear"),
    ("bottomwear", "bottomwear"),
    ("bottoms", "bottomwear"),
    ("bottom", "bottomwear"),
    ("footwear", "footwear"),
    ("shoes", "footwear"),
    ("shoe", "footwear"),
    ("accessories", "accessories"),
    ("accessory", "accessories"),
    ("outerwear", "outerwear"),
    ("outwear", "outerwear"),
    ("one-piece", "one-piece"),
    ("one piece", "one-piece"),
    ("onepiece", "one-piece"),
];

/// Canonical comparison key for a category name.
///
/// Known aliases collapse onto one key; anything else is trimmed and lowercased.
pub fn canonical(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, key)| (*key).to_string())
        .unwrap_or(lowered)
}

pub fn same_category(a: &str, b: &str) -> bool {
    canonical(a) == canonical(b)
}

/// Maps a free-form, user-declared category ("jeans", "sneakers", "Tote bag")
/// onto one of the four core outfit categories.
///
/// Unrecognised input counts as topwear.
pub fn classify_declared(raw: &str) -> &'static str {
    let s = raw.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| s.contains(n));

    if has(&["top", "shirt", "jacket"]) {
        TOPWEAR
    } else if has(&["bottom", "pant", "jean", "skirt"]) {
        BOTTOMWEAR
    } else if has(&["foot", "shoe", "sock"]) {
        FOOTWEAR
    } else if has(&["access", "watch", "belt", "bag", "wallet"]) {
        ACCESSORIES
    } else {
        TOPWEAR
    }
}

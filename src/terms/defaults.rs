//! Built-in search terms used when none are configured.

pub const DEFAULT_SEARCH_TERMS: &[&str] = &[
    "Asia",
    "Britain",
    "Egypt",
    "France",
    "Japan",
    "China",
    "Persia",
    "India",
    "Italy",
    "tapestry",
    "sculpture",
    "silver",
    "ceramics",
    "glass",
    "furniture",
    "jewellery",
    "textiles",
    "fashion",
    "portrait",
    "miniature",
    "watercolour",
    "photograph",
    "poster",
    "theatre",
    "illustration",
    "architecture",
    "armour",
    "enamel",
    "embroidery",
    "porcelain",
    "woodcut",
    "manuscript",
];

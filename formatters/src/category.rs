use once_cell::sync::Lazy;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use strum_macros::IntoStaticStr;
use thiserror::Error;

/// Glyph returned for labels missing from the emoji table.
pub const FALLBACK_EMOJI: &str = "🏷️";

/// Icon returned for labels missing from the icon table.
pub const FALLBACK_ICON: Icon = Icon::Store;

/// The closed set of vendor categories.
///
/// Adding a member requires an entry in [`Category::emoji`] and
/// [`Category::icon`]; the lookup tables are derived from those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Category {
    #[serde(rename = "Pool Service")]
    PoolService,
    #[serde(rename = "HVAC")]
    Hvac,
    #[serde(rename = "Landscaping")]
    Landscaping,
    #[serde(rename = "Plumbing")]
    Plumbing,
    #[serde(rename = "Electrical")]
    Electrical,
    #[serde(rename = "Pest Control")]
    PestControl,
    #[serde(rename = "Roofing")]
    Roofing,
    #[serde(rename = "Handyman")]
    Handyman,
    #[serde(rename = "House Cleaning")]
    HouseCleaning,
}

impl Category {
    /// Label as stored in the `vendors.category` column.
    pub fn label(self) -> &'static str {
        match self {
            Category::PoolService => "Pool Service",
            Category::Hvac => "HVAC",
            Category::Landscaping => "Landscaping",
            Category::Plumbing => "Plumbing",
            Category::Electrical => "Electrical",
            Category::PestControl => "Pest Control",
            Category::Roofing => "Roofing",
            Category::Handyman => "Handyman",
            Category::HouseCleaning => "House Cleaning",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::PoolService => "🏊",
            Category::Hvac => "❄️",
            Category::Landscaping => "🌳",
            Category::Plumbing => "🚰",
            Category::Electrical => "⚡",
            Category::PestControl => "🐜",
            Category::Roofing => "🏠",
            Category::Handyman => "🔨",
            Category::HouseCleaning => "🧹",
        }
    }

    pub fn icon(self) -> Icon {
        match self {
            Category::PoolService => Icon::Waves,
            Category::Hvac => Icon::Wind,
            Category::Landscaping => Icon::Trees,
            Category::Plumbing => Icon::Droplets,
            Category::Electrical => Icon::Zap,
            Category::PestControl => Icon::Bug,
            Category::Roofing => Icon::House,
            Category::Handyman => Icon::Hammer,
            Category::HouseCleaning => Icon::Sparkles,
        }
    }

    pub fn all() -> impl Iterator<Item = Category> {
        Category::iter()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::iter()
            .find(|category| category.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Graphical icon handle; `name()` is the icon-library identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Bug,
    Droplets,
    Hammer,
    House,
    Paintbrush,
    PawPrint,
    Sparkles,
    Store,
    Trees,
    Waves,
    Wind,
    Zap,
}

impl Icon {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

// Free-form and legacy labels still found in older rows.
const LEGACY_EMOJI: &[(&str, &str)] = &[
    ("Pool", "🏊"),
    ("Pool Maintenance", "🏊"),
    ("AC", "❄️"),
    ("Air Conditioning", "❄️"),
    ("Lawn Care", "🌳"),
    ("Landscaping & Lawn", "🌳"),
    ("Plumber", "🚰"),
    ("Electrician", "⚡"),
    ("Pest", "🐜"),
    ("Exterminator", "🐜"),
    ("Roofer", "🏠"),
    ("General Contractor", "🏗️"),
    ("Cleaning", "🧹"),
    ("Maid Service", "🧹"),
    ("Painting", "🎨"),
    ("Pet Care", "🐾"),
];

const LEGACY_ICONS: &[(&str, Icon)] = &[
    ("Pool", Icon::Waves),
    ("Lawn Care", Icon::Trees),
    ("Cleaning", Icon::Sparkles),
    ("Painting", Icon::Paintbrush),
    ("Pet Care", Icon::PawPrint),
];

static EMOJI_BY_LABEL: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    Category::iter()
        .map(|category| (category.label(), category.emoji()))
        .chain(LEGACY_EMOJI.iter().copied())
        .collect()
});

static ICON_BY_LABEL: Lazy<HashMap<&'static str, Icon>> = Lazy::new(|| {
    Category::iter()
        .map(|category| (category.label(), category.icon()))
        .chain(LEGACY_ICONS.iter().copied())
        .collect()
});

/// Emoji for a stored category label, or [`FALLBACK_EMOJI`].
pub fn category_emoji(label: &str) -> &'static str {
    EMOJI_BY_LABEL
        .get(label.trim())
        .copied()
        .unwrap_or(FALLBACK_EMOJI)
}

/// Icon for a stored category label, or [`FALLBACK_ICON`].
pub fn category_icon(label: &str) -> Icon {
    ICON_BY_LABEL
        .get(label.trim())
        .copied()
        .unwrap_or(FALLBACK_ICON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_category_has_its_own_emoji_and_icon() {
        assert_eq!(Category::all().count(), 9);
        for category in Category::all() {
            assert_ne!(category_emoji(category.label()), FALLBACK_EMOJI, "{category}");
            assert_ne!(category_icon(category.label()), FALLBACK_ICON, "{category}");
            assert_eq!(category_emoji(category.label()), category.emoji());
            assert_eq!(category_icon(category.label()), category.icon());
        }
    }

    #[test]
    fn unknown_labels_fall_back() {
        assert_eq!(category_emoji("Underwater Basket Weaving"), FALLBACK_EMOJI);
        assert_eq!(category_icon("Underwater Basket Weaving"), FALLBACK_ICON);
        assert_eq!(category_emoji(""), FALLBACK_EMOJI);
    }

    #[test]
    fn legacy_labels_resolve() {
        assert_eq!(category_emoji("Lawn Care"), "🌳");
        assert_eq!(category_icon("Pet Care"), Icon::PawPrint);
        assert_eq!(category_icon("Maid Service"), FALLBACK_ICON);
    }

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("pool service".parse::<Category>(), Ok(Category::PoolService));
        assert_eq!("HVAC".parse::<Category>(), Ok(Category::Hvac));
        assert_eq!(
            "Carpentry".parse::<Category>(),
            Err(ParseCategoryError("Carpentry".to_string()))
        );
    }

    #[test]
    fn icon_names_are_kebab_case() {
        assert_eq!(Icon::PawPrint.name(), "paw-print");
        assert_eq!(Icon::Store.name(), "store");
    }

    #[test]
    fn display_uses_stored_label() {
        assert_eq!(Category::PestControl.to_string(), "Pest Control");
    }
}

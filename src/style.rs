//! @ai:module:intent Injectable style table: display colors per observation code and derived categories
//! @ai:module:layer domain
//! @ai:module:public_api StyleTable, Decoration, LineStyle, CategorySet, HEADER_LINE
//! @ai:module:depends_on grammar
//! @ai:module:stateless true

use crate::grammar::FormatVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category of epoch lines, header labels and satellite-list continuations
pub const HEADER_LINE: &str = "header line";

const RINEX2_COLORS: &[(&str, &str)] = &[
    ("C1", "#8000ff"),
    ("C2", "#4062fa"),
    ("C5", "#00b5eb"),
    ("C6", "#40ecd4"),
    ("C7", "#80ffb4"),
    ("C8", "#c0eb8d"),
    ("P1", "#ffb360"),
    ("P2", "#ff5f30"),
];

// Code observables only; L/D/S categories are derived.
const RINEX3_COLORS: &[(&str, &str)] = &[
    ("C1A", "#8000ff"),
    ("C1B", "#780dff"),
    ("C1C", "#7019ff"),
    ("C1D", "#6826fe"),
    ("C1L", "#6032fe"),
    ("C1M", "#583efd"),
    ("C1P", "#504afc"),
    ("C1S", "#4856fb"),
    ("C1W", "#4062fa"),
    ("C1X", "#386df9"),
    ("C1Y", "#3079f7"),
    ("C1Z", "#2884f6"),
    ("C2C", "#208ef4"),
    ("C2D", "#1898f2"),
    ("C2I", "#10a2f0"),
    ("C2L", "#08acee"),
    ("C2M", "#02b7eb"),
    ("C2P", "#0ac0e8"),
    ("C2Q", "#12c8e6"),
    ("C2S", "#1acfe3"),
    ("C2W", "#22d6e0"),
    ("C2X", "#2adddd"),
    ("C2Y", "#32e3da"),
    ("C3I", "#3ae8d6"),
    ("C3Q", "#42edd3"),
    ("C3X", "#4af2cf"),
    ("C4A", "#52f5cb"),
    ("C4B", "#5af8c8"),
    ("C4X", "#62fbc4"),
    ("C5A", "#6afdc0"),
    ("C5B", "#72febb"),
    ("C5C", "#7affb7"),
    ("C5D", "#84ffb2"),
    ("C5I", "#8cfead"),
    ("C5P", "#94fda8"),
    ("C5Q", "#9cfba4"),
    ("C5X", "#a4f89f"),
    ("C5Z", "#acf59a"),
    ("C6A", "#b4f295"),
    ("C6B", "#bced8f"),
    ("C6C", "#c4e88a"),
    ("C6E", "#cce385"),
    ("C6I", "#d4dd80"),
    ("C6L", "#dcd67a"),
    ("C6Q", "#e4cf74"),
    ("C6S", "#ecc86f"),
    ("C6X", "#f4c069"),
    ("C6Z", "#fcb763"),
    ("C7D", "#ffac5c"),
    ("C7I", "#ffa256"),
    ("C7P", "#ff9850"),
    ("C7Q", "#ff8e4a"),
    ("C7X", "#ff8444"),
    ("C7Z", "#ff793e"),
    ("C8D", "#ff6d38"),
    ("C8I", "#ff6232"),
    ("C8P", "#ff562c"),
    ("C8Q", "#ff4a26"),
    ("C8X", "#ff3e1f"),
    ("C9A", "#ff3219"),
    ("C9B", "#ff2613"),
    ("C9C", "#ff190d"),
    ("C9X", "#ff0d06"),
];

/// @ai:intent Base-code colors for both layout families
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleTable {
    #[serde(default = "default_rinex2")]
    pub rinex2: BTreeMap<String, String>,
    #[serde(default = "default_rinex3")]
    pub rinex3: BTreeMap<String, String>,
}

/// @ai:intent How a category is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    /// Code / pseudo-range
    Solid,
    /// Carrier phase
    Double,
    /// Doppler
    Dotted,
    /// Signal strength
    Dashed,
    Bold,
}

/// @ai:intent Color and line style of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoration {
    pub color: Option<String>,
    pub style: LineStyle,
}

/// @ai:intent Every category a parse can emit spans for, with its decoration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorySet {
    categories: BTreeMap<String, Decoration>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            rinex2: default_rinex2(),
            rinex3: default_rinex3(),
        }
    }
}

fn default_rinex2() -> BTreeMap<String, String> {
    to_map(RINEX2_COLORS)
}

fn default_rinex3() -> BTreeMap<String, String> {
    to_map(RINEX3_COLORS)
}

fn to_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(code, color)| (code.to_string(), color.to_string()))
        .collect()
}

impl StyleTable {
    /// @ai:intent Base-code colors of one layout family
    pub fn colors(&self, version: FormatVersion) -> &BTreeMap<String, String> {
        match version {
            FormatVersion::V2 => &self.rinex2,
            FormatVersion::V3 => &self.rinex3,
        }
    }

    /// @ai:intent Expand base codes into the full category set, synthesizing L/D/S siblings
    /// @ai:post codes starting with `P` get no siblings
    /// @ai:post the header-line category is always present
    /// @ai:example (V2, {C1}) -> {C1, L1, D1, S1, header line}
    /// @ai:example (V3, {C1C}) -> {C1C, L1C, D1C, S1C, header line}
    /// @ai:effects pure
    pub fn categories(&self, version: FormatVersion) -> CategorySet {
        let mut set = CategorySet::default();

        for (code, color) in self.colors(version) {
            set.add(code, Some(color), LineStyle::Solid);

            if code.starts_with('P') {
                continue;
            }
            let Some(suffix) = code.get(1..) else {
                continue;
            };

            for (family, style) in [
                ('L', LineStyle::Double),
                ('D', LineStyle::Dotted),
                ('S', LineStyle::Dashed),
            ] {
                set.add(&format!("{}{}", family, suffix), Some(color), style);
            }
        }

        set.add(HEADER_LINE, None, LineStyle::Bold);
        set
    }
}

impl CategorySet {
    /// Keeps the first decoration registered for a category.
    fn add(&mut self, category: &str, color: Option<&String>, style: LineStyle) {
        self.categories
            .entry(category.to_string())
            .or_insert_with(|| Decoration {
                color: color.cloned(),
                style,
            });
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn decoration(&self, category: &str) -> Option<&Decoration> {
        self.categories.get(category)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

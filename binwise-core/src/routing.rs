//! Pure mapping from classifier labels to bins.

use crate::model::{Bin, Category};

/// Categories that go into the recycle bin.
pub const RECYCLABLE: [Category; 9] = [
    Category::Cardboard,
    Category::Paper,
    Category::Metal,
    Category::Plastic,
    Category::BrownGlass,
    Category::WhiteGlass,
    Category::GreenGlass,
    Category::Clothes,
    Category::Shoes,
];

/// Trim surrounding whitespace and lowercase a raw classifier label.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Route a normalized label to its bin.
///
/// Total over all strings: anything outside the recyclable set, including labels
/// that are not categories at all, lands in [`Bin::General`].
#[must_use]
pub fn route(label: &str) -> Bin {
    if RECYCLABLE.iter().any(|category| category.as_str() == label) {
        Bin::Recycle
    } else {
        Bin::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recyclable_categories_route_to_recycle() {
        for category in RECYCLABLE {
            assert_eq!(route(category.as_str()), Bin::Recycle, "{category}");
        }
    }

    #[test]
    fn remaining_categories_route_to_general() {
        let general: Vec<_> = Category::ALL
            .into_iter()
            .filter(|category| !RECYCLABLE.contains(category))
            .collect();
        assert_eq!(
            general,
            [Category::Battery, Category::Biological, Category::Trash]
        );
        for category in general {
            assert_eq!(route(category.as_str()), Bin::General, "{category}");
        }
    }

    #[test]
    fn unknown_labels_fall_back_to_general() {
        for label in ["", "unknown-item", "glass", "Plastic", " paper", "paper and plastic"] {
            assert_eq!(route(label), Bin::General, "{label:?}");
        }
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_label(" Plastic \n"), "plastic");
        assert_eq!(normalize_label("\tBROWN-GLASS"), "brown-glass");
        assert_eq!(normalize_label("   "), "");
    }

    #[test]
    fn routing_is_deterministic() {
        for label in ["metal", "trash", "???"] {
            assert_eq!(route(label), route(label));
        }
    }
}

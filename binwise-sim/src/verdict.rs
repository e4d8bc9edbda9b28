//! Comparison of a prediction with the ground-truth category.

use clap::ValueEnum;

/// Comparison between the dataset category and the predicted class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum MatchMode {
    /// Prediction must equal the category.
    Exact,
    /// Category only has to occur somewhere in the prediction. Lenient: a
    /// prediction of `brown-glass` counts as correct for a `glass` category.
    Contains,
}

pub(crate) fn is_correct(mode: MatchMode, category: &str, predicted: &str) -> bool {
    match mode {
        MatchMode::Exact => predicted == category,
        MatchMode::Contains => predicted.contains(category),
    }
}

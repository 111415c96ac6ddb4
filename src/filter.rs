use crate::types::Recipe;

/// Display filter over a loaded recipe collection. Unset or blank criteria
/// match everything.
///
/// - `difficulty`: exact, case-sensitive equality with the recipe's level.
/// - `time`: substring containment against the raw cooking-time text, so
///   `"30"` matches `"30 minutes"` and also `"130 minutes"`. This is the
///   legacy behavior and is kept for compatibility.
/// - `max_minutes`: structured alternative to `time`; keeps recipes whose
///   parsed duration is at most this many minutes, as read by
///   [`crate::types::parse_minutes`] (ranges count at their larger end).
///   Recipes whose time cannot be parsed never match it.
/// - `search`: case-insensitive substring of the title or any ingredient.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub difficulty: Option<String>,
    pub time: Option<String>,
    pub max_minutes: Option<u32>,
    pub search: Option<String>,
}

fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl RecipeFilter {
    pub fn is_empty(&self) -> bool {
        criterion(&self.difficulty).is_none()
            && criterion(&self.time).is_none()
            && criterion(&self.search).is_none()
            && self.max_minutes.is_none()
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(difficulty) = criterion(&self.difficulty) {
            if recipe.difficulty.as_str() != difficulty {
                return false;
            }
        }

        if let Some(time) = criterion(&self.time) {
            if !recipe.cooking_time.contains(time) {
                return false;
            }
        }

        if let Some(limit) = self.max_minutes {
            match recipe.cooking_minutes() {
                Some(minutes) if minutes <= limit => {}
                _ => return false,
            }
        }

        if let Some(search) = criterion(&self.search) {
            let needle = search.to_lowercase();
            let in_title = recipe.title.to_lowercase().contains(&needle);
            let in_ingredients = recipe
                .ingredients
                .iter()
                .any(|i| i.to_lowercase().contains(&needle));
            if !in_title && !in_ingredients {
                return false;
            }
        }

        true
    }

    /// Matching recipes in their original order.
    pub fn apply<'a>(&self, recipes: impl IntoIterator<Item = &'a Recipe>) -> Vec<Recipe> {
        recipes
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

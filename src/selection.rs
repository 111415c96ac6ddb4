/// Ordered ingredient picks: the fixed choices first, then custom additions.
/// Entries are trimmed, blanks are dropped and duplicates ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngredientSelection {
    items: Vec<String>,
}

impl IngredientSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the ingredient was added.
    pub fn add(&mut self, ingredient: &str) -> bool {
        let ingredient = ingredient.trim();
        if ingredient.is_empty() || self.items.iter().any(|i| i == ingredient) {
            return false;
        }
        self.items.push(ingredient.to_string());
        true
    }

    pub fn remove(&mut self, ingredient: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != ingredient.trim());
        self.items.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl<S: AsRef<str>> FromIterator<S> for IngredientSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for item in iter {
            selection.add(item.as_ref());
        }
        selection
    }
}

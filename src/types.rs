//! Domain types shared by the session store, the recipe cache and the wire
//! layer.
//!
//! Everything here is already normalized: the [`crate::wire`] module is the
//! only place that knows about the server's inconsistent response shapes.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-issued user identifier. Kept opaque; the server's representation
/// (number or string) is preserved so it round-trips unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        UserId::Number(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId::Text(value.to_string())
    }
}

/// The authenticated identity of this client. Both fields are always set;
/// absence is modelled as `Option<Session>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(alias = "id")]
    pub user_id: UserId,
    pub username: String,
}

impl Session {
    pub fn new(user_id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub i64);

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecipeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecipeId)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    /// Anything the generator produced outside the three known levels.
    Other(String),
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Other(s) => s,
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        // Case-sensitive on purpose: "easy" is not "Easy".
        match value.as_str() {
            "Easy" => Difficulty::Easy,
            "Medium" => Difficulty::Medium,
            "Hard" => Difficulty::Hard,
            _ => Difficulty::Other(value),
        }
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Other(String::new())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_ingredients")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub instructions: String,
    #[serde(default, deserialize_with = "difficulty_or_null")]
    pub difficulty: Difficulty,
    #[serde(default, alias = "cookingTime", deserialize_with = "string_or_null")]
    pub cooking_time: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text_or_number"
    )]
    pub servings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Recipe {
    /// Instruction text split into steps, with leading "1." / "2)" numbering
    /// stripped. Text without line breaks yields a single step.
    pub fn steps(&self) -> Vec<String> {
        let numbering = Regex::new(r"^\s*\d+\s*[.)]\s*").ok();
        self.instructions
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match &numbering {
                Some(re) => re.replace(line, "").into_owned(),
                None => line.to_string(),
            })
            .collect()
    }

    /// Cooking time as whole minutes, when the display text can be parsed.
    pub fn cooking_minutes(&self) -> Option<u32> {
        parse_minutes(&self.cooking_time)
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        let raw = self.created_at.as_deref()?.trim();
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }
}

/// Parse a free-form duration such as "30 minutes", "1 hour 15 mins",
/// "1h30m", "1.5 hours" or "25-30 minutes" into minutes. A range joined by
/// `-` or `to` counts once, at its larger end, even across units
/// ("45 minutes to 1 hour" is 60). Bare numbers without a unit only serve as
/// the lower end of a range.
pub fn parse_minutes(text: &str) -> Option<u32> {
    let re = Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(hours?|hrs?|h|minutes?|mins?|m)?").ok()?;

    let mut terms: Vec<f64> = Vec::new();
    let mut last_end = 0;
    let mut prev_was_term = false;
    for caps in re.captures_iter(text) {
        let whole = caps.get(0)?;
        let gap = text[last_end..whole.start()].trim();
        let joins_range = gap == "-" || gap == "–" || gap.eq_ignore_ascii_case("to");
        last_end = whole.end();

        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        let Some(unit) = caps.get(2) else {
            prev_was_term = false;
            continue;
        };
        let minutes = if unit.as_str().to_ascii_lowercase().starts_with('h') {
            value * 60.0
        } else {
            value
        };

        match terms.last_mut() {
            Some(last) if joins_range && prev_was_term => *last = last.max(minutes),
            _ => terms.push(minutes),
        }
        prev_was_term = true;
    }

    if terms.is_empty() {
        None
    } else {
        Some(terms.iter().sum::<f64>().round() as u32)
    }
}

/// Split a delimited ingredient string into the canonical list form.
pub fn split_ingredients(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return clean_ingredients(list);
        }
    }
    clean_ingredients(trimmed.split([',', '\n']).map(str::to_string))
}

fn clean_ingredients(items: impl IntoIterator<Item = String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIngredients {
    List(Vec<String>),
    Text(String),
    Missing(()),
}

fn deserialize_ingredients<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawIngredients::deserialize(deserializer)? {
        RawIngredients::List(list) => clean_ingredients(list),
        RawIngredients::Text(text) => split_ingredients(&text),
        RawIngredients::Missing(()) => Vec::new(),
    })
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn difficulty_or_null<'de, D>(deserializer: D) -> Result<Difficulty, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(Difficulty::from)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ingredients_accept_list_or_delimited_string() {
        let from_list: Recipe = serde_json::from_value(json!({
            "id": 1, "title": "Soup", "ingredients": ["carrot", " onion "],
            "instructions": "Boil", "difficulty": "Easy", "cooking_time": "20 minutes"
        }))
        .unwrap();
        let from_text: Recipe = serde_json::from_value(json!({
            "id": 2, "title": "Soup", "ingredients": "carrot, onion,",
            "instructions": "Boil", "difficulty": "Easy", "cooking_time": "20 minutes"
        }))
        .unwrap();

        assert_eq!(from_list.ingredients, vec!["carrot", "onion"]);
        assert_eq!(from_text.ingredients, from_list.ingredients);
    }

    #[test]
    fn json_encoded_ingredient_column_is_decoded() {
        assert_eq!(split_ingredients(r#"["rice","egg"]"#), vec!["rice", "egg"]);
    }

    #[test]
    fn nullable_columns_default_to_empty() {
        let recipe: Recipe = serde_json::from_value(json!({
            "id": 3, "title": "Toast", "ingredients": "bread",
            "instructions": "Toast it", "difficulty": null, "cooking_time": null
        }))
        .unwrap();
        assert_eq!(recipe.cooking_time, "");
        assert_eq!(recipe.difficulty.as_str(), "");
    }

    #[test]
    fn difficulty_is_case_sensitive() {
        assert_eq!(Difficulty::from("Hard".to_string()), Difficulty::Hard);
        assert_eq!(
            Difficulty::from("hard".to_string()),
            Difficulty::Other("hard".to_string())
        );
    }

    #[test]
    fn user_id_keeps_its_wire_form() {
        let numeric: Session = serde_json::from_value(json!({"id": 7, "username": "ana"})).unwrap();
        assert_eq!(numeric.user_id, UserId::Number(7));
        assert_eq!(serde_json::to_value(&numeric).unwrap()["user_id"], json!(7));

        let text: Session =
            serde_json::from_value(json!({"user_id": "u-7", "username": "ana"})).unwrap();
        assert_eq!(text.user_id.to_string(), "u-7");
    }

    #[test]
    fn parses_common_duration_texts() {
        assert_eq!(parse_minutes("30 minutes"), Some(30));
        assert_eq!(parse_minutes("1 hour"), Some(60));
        assert_eq!(parse_minutes("1 hour 15 mins"), Some(75));
        assert_eq!(parse_minutes("1.5 hours"), Some(90));
        assert_eq!(parse_minutes("25-30 minutes"), Some(30));
        assert_eq!(parse_minutes("25 to 30 mins"), Some(30));
        assert_eq!(parse_minutes("1h30m"), Some(90));
        assert_eq!(parse_minutes("1 hr 5 min"), Some(65));
        assert_eq!(parse_minutes("45 minutes to 1 hour"), Some(60));
        assert_eq!(parse_minutes("1 - 1.5 hours"), Some(90));
        assert_eq!(parse_minutes("overnight"), None);
    }

    #[test]
    fn steps_strip_numbering() {
        let recipe = Recipe {
            id: RecipeId(1),
            title: "Stir fry".into(),
            ingredients: vec![],
            instructions: "1. Heat oil\n2) Add rice\n\n3. Serve".into(),
            difficulty: Difficulty::Easy,
            cooking_time: "15 minutes".into(),
            servings: None,
            created_at: Some("2024-05-01 12:30:00".into()),
        };
        assert_eq!(recipe.steps(), vec!["Heat oil", "Add rice", "Serve"]);
        assert!(recipe.created_at().is_some());
    }
}

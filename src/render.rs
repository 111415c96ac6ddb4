//! Terminal rendering of notices, recipe cards and recipe details.

use colored::{ColoredString, Colorize};

use crate::notice::{Notice, NoticeLevel};
use crate::session::AuthState;
use crate::types::{Difficulty, Recipe, Session};
use crate::wire::HealthReport;

const PREVIEW_CHARS: usize = 150;

pub fn notice(notice: &Notice) -> String {
    let (icon, message) = match notice.level {
        NoticeLevel::Success => ("✔", notice.message.green()),
        NoticeLevel::Info => ("ℹ", notice.message.normal()),
        NoticeLevel::Warning => ("⚠", notice.message.yellow()),
        NoticeLevel::Error => ("✖", notice.message.red()),
    };
    format!("{icon} {message}")
}

fn difficulty(difficulty: &Difficulty) -> ColoredString {
    let label = difficulty.as_str();
    match difficulty {
        Difficulty::Easy => label.green(),
        Difficulty::Medium => label.yellow(),
        Difficulty::Hard => label.red(),
        Difficulty::Other(_) => label.normal(),
    }
}

fn meta_line(recipe: &Recipe) -> String {
    let mut parts = Vec::new();
    if !recipe.cooking_time.is_empty() {
        parts.push(format!("⏱ {}", recipe.cooking_time));
    }
    if let Some(servings) = &recipe.servings {
        parts.push(format!("{servings} servings"));
    }
    if !recipe.difficulty.as_str().is_empty() {
        parts.push(difficulty(&recipe.difficulty).to_string());
    }
    parts.join("  ·  ")
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

pub fn recipe_card(recipe: &Recipe) -> String {
    format!(
        "{} {}\n  {}\n  {} {}\n  {} {}",
        format!("#{}", recipe.id).dimmed(),
        recipe.title.bold(),
        meta_line(recipe),
        "Ingredients:".bold(),
        recipe.ingredients.join(", "),
        "Instructions:".bold(),
        preview(&recipe.instructions),
    )
}

pub fn recipe_list(recipes: &[Recipe], filtered: bool) -> String {
    if recipes.is_empty() {
        return if filtered {
            "No recipes found. Try adjusting your filters or generate new recipes!".to_string()
        } else {
            "No recipes yet. Generate some from your ingredients!".to_string()
        };
    }
    recipes
        .iter()
        .map(recipe_card)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn recipe_detail(recipe: &Recipe) -> String {
    let mut out = vec![
        recipe.title.bold().underline().to_string(),
        meta_line(recipe),
    ];
    if let Some(created) = recipe.created_at() {
        out.push(format!("Created {}", created.format("%Y-%m-%d %H:%M")).dimmed().to_string());
    }

    out.push(String::new());
    out.push("Ingredients".bold().to_string());
    out.extend(recipe.ingredients.iter().map(|i| format!("  • {i}")));

    out.push(String::new());
    out.push("Instructions".bold().to_string());
    out.extend(
        recipe
            .steps()
            .iter()
            .enumerate()
            .map(|(n, step)| format!("  {}. {step}", n + 1)),
    );
    out.join("\n")
}

pub fn session_status(state: AuthState, session: Option<&Session>) -> String {
    match (state, session) {
        (_, Some(session)) => format!(
            "Logged in as {} (user {})",
            session.username.bold(),
            session.user_id
        ),
        (AuthState::Authenticating, None) => "Logging in...".to_string(),
        _ => "Not logged in".to_string(),
    }
}

pub fn health(report: &HealthReport) -> String {
    let mut out = vec![format!("status: {}", report.status)];
    if let Some(database) = &report.database {
        out.push(format!("database: {database}"));
    }
    if let Some(openai) = report.openai_available {
        out.push(format!("generator available: {openai}"));
    }
    if let Some(timestamp) = &report.timestamp {
        out.push(format!("timestamp: {timestamp}"));
    }
    if let Some(error) = &report.error {
        out.push(format!("error: {error}"));
    }
    out.join("\n")
}

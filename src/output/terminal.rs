// Colored terminal output for moderation results.
//
// The main.rs commands delegate here so all terminal formatting (colors,
// section headers) lives in one place.

use colored::Colorize;

use super::truncate_chars;
use crate::moderation::models::{
    Category, FeedbackSource, ModerationRequest, ModerationResult, SafetyAnalysis,
};

/// Display the full result of moderating one post.
pub fn display_result(request: &ModerationRequest, result: &ModerationResult) {
    println!(
        "\n{}",
        format!("=== {} ===", truncate_chars(&request.title, 60)).bold()
    );
    println!("  Category: {}", request.category);
    println!("  Browse:   {}", request.category.reference_link().dimmed());

    display_analysis(&result.analysis);

    println!(
        "\n{} {}",
        "Feedback".bold(),
        format!("(via {})", colorize_source(result.feedback.source)).dimmed()
    );
    for line in result.feedback.text.lines() {
        println!("  {line}");
    }

    println!("\n{}", "Suggested post".bold());
    if result.suggestion.is_empty() {
        println!("  {}", "No suggestion could be generated.".yellow());
    } else {
        println!("  Title: {}", result.suggestion.new_title.cyan());
        println!();
        for line in result.suggestion.new_content.lines() {
            println!("  {line}");
        }
    }
    println!();
}

/// Display the safety flags, highlighting any issues.
pub fn display_analysis(analysis: &SafetyAnalysis) {
    let issues = analysis.issues();
    if issues.is_empty() {
        println!("\n  {} No issues detected", "ok".green().bold());
        return;
    }

    println!(
        "\n  {} Post issue detected: {}",
        "!!".red().bold(),
        issues.join(", ")
    );
}

/// Display the category table.
pub fn display_categories() {
    println!("\n{}", "=== Categories ===".bold());
    for category in Category::ALL {
        println!(
            "  {:<16} {}",
            category.label(),
            category.reference_link().dimmed()
        );
    }
    println!();
}

fn colorize_source(source: FeedbackSource) -> colored::ColoredString {
    match source {
        FeedbackSource::Primary => "primary".green(),
        FeedbackSource::Secondary => "secondary".cyan(),
        FeedbackSource::Fallback => "fallback".yellow(),
    }
}

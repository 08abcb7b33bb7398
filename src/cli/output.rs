//! CLI output formatting utilities.

use crate::analysis::AnalysisResult;
use crate::research::ResearchSnippet;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a suitability verdict.
    pub fn verdict(product: &str, result: &AnalysisResult) {
        let badge = if result.is_suitable {
            style("SUITABLE").green().bold()
        } else {
            style("NOT SUITABLE").red().bold()
        };

        Output::header(product);
        println!(
            "  {} (score: {})",
            badge,
            style(format_score(result.suitability_score)).bold()
        );
        println!();
        println!("{}", result.summary);

        Output::header("Recommendation");
        println!("{}", result.recommendation);

        Output::header("Explanation");
        println!("{}", result.explanation);

        Output::header("Allergies");
        println!("{}", result.allergy_notes);

        Output::header("Skin conditions");
        println!("{}", result.condition_notes);

        if !result.key_ingredients.is_empty() {
            Output::header("Key ingredients");
            for ingredient in &result.key_ingredients {
                match ingredient {
                    serde_json::Value::String(name) => Output::list_item(name),
                    other => Output::list_item(&other.to_string()),
                }
            }
        }
    }

    /// Print one research snippet.
    pub fn search_result(snippet: &ResearchSnippet) {
        let title = snippet.title.as_deref().unwrap_or(&snippet.source);
        let year = snippet
            .year
            .as_deref()
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();

        println!(
            "\n{} {}{} (score: {:.2})",
            style(">>").green(),
            style(title).bold(),
            style(year).dim(),
            snippet.score
        );
        println!("   {}", content_preview(&snippet.text, 200));
        println!("   {}", style(&snippet.source).dim());
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(bar_style);
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Whole scores print without a decimal point.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{:.1}", score)
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_len {
        content
    } else {
        let truncated: String = content.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

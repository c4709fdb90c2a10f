//! Prompt construction for generation calls.
//!
//! All prompts used by the summarization pipeline and the recommender are
//! built here so the wording lives in one place and can be tested without
//! touching a backend.

use tome_core::models::UserPreferences;

/// Prompt for summarizing a block of extracted book content.
pub fn summarize_content(text: &str) -> String {
    format!(
        "You are an expert summarizer. Summarize the following book content clearly and concisely, \
         preserving the main ideas, plot, or concepts. Highlight the core message and important \
         takeaways.\n\n{}",
        text
    )
}

/// Prompt for one refine step: fold the next chunk into the running summary.
pub fn refine_step(running_summary: &str, chunk: &str) -> String {
    format!(
        "You are an expert summarizer. Below is an existing summary of a book so far, followed by \
         the next section of the book. Refine the summary to incorporate the new section, keeping \
         it clear and concise.\n\nExisting summary:\n{}\n\nNext section:\n{}",
        running_summary, chunk
    )
}

/// Prompt for combining per-chunk summaries into one final summary.
pub fn combine_summaries(partials: &[String]) -> String {
    format!(
        "You are an expert summarizer. The following are summaries of consecutive sections of a \
         book. Combine them into a single clear and concise summary, preserving the main ideas, \
         plot, or concepts. Highlight the core message and important takeaways.\n\n{}",
        partials.join("\n\n")
    )
}

/// Prompt for the on-demand summary endpoint, which works from the stored
/// summary rather than the full text.
pub fn on_demand_summary(title: &str, summary: &str) -> String {
    format!(
        "Summarize the following book content:\n\nTitle: {}\n\nSummary: {}",
        title, summary
    )
}

/// Prompt for the one-line recommendation blurb.
///
/// Absent preference fields are rendered as "Any" so the model always sees a
/// complete preference block.
pub fn recommendation_blurb(prefs: &UserPreferences, book_titles: &[String]) -> String {
    let genre = prefs.genre.as_deref().unwrap_or("Any");
    let author = prefs.author.as_deref().unwrap_or("Any");
    let min_year = prefs
        .min_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Any".to_string());
    let max_year = prefs
        .max_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Any".to_string());

    format!(
        "You are an intelligent and friendly book recommender. A user has the following preferences:\n\
         - Genre: {}\n\
         - Favorite Author: {}\n\
         - Preferred Year Range: {} to {}\n\n\
         Based on these preferences, you matched the following books from the library database: {}.\n\n\
         Write a friendly and insightful one-line recommendation summary that encourages the user \
         to explore these books. Focus on variety, relevance, and appeal.",
        genre,
        author,
        min_year,
        max_year,
        book_titles.join(", ")
    )
}

/// Reduce a model response to its first non-empty line.
///
/// The blurb prompt asks for one line but models routinely pad their answers,
/// so everything past the first line of content is dropped.
pub fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string()
}

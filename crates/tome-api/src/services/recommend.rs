//! Rule-based recommendation scoring.
//!
//! A book's match score against a preference tuple is the sum of fixed
//! weights: 0.4 for a genre substring match, 0.3 for an author substring
//! match, and 0.15 each for clearing the min/max year bounds. Books scoring
//! zero are excluded.

use tome_core::models::{Book, RecommendedBook, UserPreferences};

/// Score all books against the preferences and return the matches sorted by
/// rating, highest first. The sort is stable, so equal-rated books keep
/// their catalog order.
pub fn score_books(books: &[Book], prefs: &UserPreferences) -> Vec<RecommendedBook> {
    let mut matched: Vec<RecommendedBook> = books
        .iter()
        .filter_map(|book| score_book(book, prefs))
        .collect();

    matched.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
    matched
}

/// Score a single book; None when nothing matches.
fn score_book(book: &Book, prefs: &UserPreferences) -> Option<RecommendedBook> {
    let mut score = 0.0_f64;

    if let Some(genre) = &prefs.genre {
        if !genre.is_empty() && book.genre.to_lowercase().contains(&genre.to_lowercase()) {
            score += 0.4;
        }
    }
    if let Some(author) = &prefs.author {
        if !author.is_empty() && book.author.to_lowercase().contains(&author.to_lowercase()) {
            score += 0.3;
        }
    }
    if let Some(min_year) = prefs.min_year {
        if book.year_published >= min_year {
            score += 0.15;
        }
    }
    if let Some(max_year) = prefs.max_year {
        if book.year_published <= max_year {
            score += 0.15;
        }
    }

    if score <= 0.0 {
        return None;
    }

    Some(RecommendedBook {
        title: book.title.clone(),
        author: book.author.clone(),
        year_published: book.year_published,
        summary: book.summary.clone(),
        rating: (score * 5.0 * 10.0).round() / 10.0,
        confidence: confidence_label(score),
    })
}

/// Map a match score to a confidence label.
fn confidence_label(score: f64) -> String {
    if score >= 0.8 {
        "High"
    } else if score >= 0.5 {
        "Medium"
    } else {
        "Low"
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64, title: &str, author: &str, genre: &str, year: i32) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            year_published: year,
            summary: Some("A summary.".to_string()),
        }
    }

    fn prefs(
        genre: Option<&str>,
        author: Option<&str>,
        min_year: Option<i32>,
        max_year: Option<i32>,
    ) -> UserPreferences {
        UserPreferences {
            genre: genre.map(String::from),
            author: author.map(String::from),
            min_year,
            max_year,
        }
    }

    #[test]
    fn test_full_match_is_top_rating_high_confidence() {
        let books = vec![book(1, "Dune", "Frank Herbert", "Science Fiction", 1965)];
        let p = prefs(Some("science fiction"), Some("herbert"), Some(1960), Some(1970));

        let matched = score_books(&books, &p);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].rating, 5.0);
        assert_eq!(matched[0].confidence, "High");
    }

    #[test]
    fn test_zero_score_books_are_excluded() {
        let books = vec![book(1, "Dune", "Frank Herbert", "Science Fiction", 1965)];
        let p = prefs(Some("romance"), Some("austen"), None, None);
        assert!(score_books(&books, &p).is_empty());
    }

    #[test]
    fn test_genre_match_is_case_insensitive_substring() {
        let books = vec![book(1, "Dune", "Frank Herbert", "Science Fiction", 1965)];
        let p = prefs(Some("FICTION"), None, None, None);

        let matched = score_books(&books, &p);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].rating, 2.0);
        assert_eq!(matched[0].confidence, "Low");
    }

    #[test]
    fn test_year_bounds_contribute_separately() {
        let books = vec![book(1, "Dune", "Frank Herbert", "Science Fiction", 1965)];

        // Only min_year clears: 0.15 -> rating 0.8
        let matched = score_books(&books, &prefs(None, None, Some(1960), Some(1950)));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].rating, 0.8);

        // Both bounds clear: 0.3 -> rating 1.5
        let matched = score_books(&books, &prefs(None, None, Some(1960), Some(1970)));
        assert_eq!(matched[0].rating, 1.5);
    }

    #[test]
    fn test_medium_confidence_band() {
        // genre + two year bounds = 0.7 -> Medium
        let books = vec![book(1, "Dune", "Frank Herbert", "Science Fiction", 1965)];
        let p = prefs(Some("science"), None, Some(1960), Some(1970));

        let matched = score_books(&books, &p);
        assert_eq!(matched[0].rating, 3.5);
        assert_eq!(matched[0].confidence, "Medium");
    }

    #[test]
    fn test_results_sorted_by_rating_descending() {
        let books = vec![
            book(1, "Weak Match", "Nobody", "Science Fiction", 1900),
            book(2, "Strong Match", "Frank Herbert", "Science Fiction", 1965),
        ];
        let p = prefs(Some("science fiction"), Some("herbert"), Some(1960), None);

        let matched = score_books(&books, &p);
        assert_eq!(matched[0].title, "Strong Match");
        assert_eq!(matched[1].title, "Weak Match");
    }

    #[test]
    fn test_equal_ratings_keep_catalog_order() {
        let books = vec![
            book(1, "First", "A", "Fantasy", 2000),
            book(2, "Second", "B", "Fantasy", 2001),
        ];
        let p = prefs(Some("fantasy"), None, None, None);

        let matched = score_books(&books, &p);
        assert_eq!(matched[0].title, "First");
        assert_eq!(matched[1].title, "Second");
    }

    #[test]
    fn test_empty_preference_strings_do_not_match_everything() {
        let books = vec![book(1, "Dune", "Frank Herbert", "Science Fiction", 1965)];
        let p = prefs(Some(""), Some(""), None, None);
        assert!(score_books(&books, &p).is_empty());
    }
}

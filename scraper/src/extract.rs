use scraper::{Html, Selector};
use thiserror::Error;

pub const POST_SELECTOR: &str = "div.pulse-posts-by-ticker__ffTK6Z.pulse-posts-by-ticker__ifTK6Z";
pub const DATE_SELECTOR: &str = "div.pulse-posts-by-ticker__cSULlZ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub raw_text: String,
    pub raw_date_token: String,
    pub ticker: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("found {posts} posts but {dates} date labels; refusing to pair them")]
    CountMismatch { posts: usize, dates: usize },
}

/// Finds every post body and date label on the page and pairs them in document order.
pub fn extract_posts(markup: &str, ticker: &str) -> Result<Vec<PostRecord>, ExtractError> {
    let document = Html::parse_document(markup);

    let post_selector = Selector::parse(POST_SELECTOR).unwrap();
    let date_selector = Selector::parse(DATE_SELECTOR).unwrap();

    let posts: Vec<String> = document
        .select(&post_selector)
        .map(|element| element.text().collect())
        .collect();
    let dates: Vec<String> = document
        .select(&date_selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .collect();

    if posts.len() != dates.len() {
        return Err(ExtractError::CountMismatch {
            posts: posts.len(),
            dates: dates.len(),
        });
    }

    let ticker = ticker.to_uppercase();
    Ok(posts
        .into_iter()
        .zip(dates)
        .map(|(raw_text, raw_date_token)| PostRecord {
            raw_text,
            raw_date_token,
            ticker: ticker.clone(),
        })
        .collect())
}

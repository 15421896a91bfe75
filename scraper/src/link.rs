/// Base of the live Pulse pages, one per ticker.
pub const PULSE_BASE_URL: &str = "https://www.tinkoff.ru/invest/stocks";

/// Builds the Pulse page URL for a ticker. The ticker is case-insensitive.
pub fn pulse_link(ticker: &str) -> String {
    pulse_link_with_base(PULSE_BASE_URL, ticker)
}

/// Same as [`pulse_link`] but against another base, e.g. a web-archive prefix.
pub fn pulse_link_with_base(base: &str, ticker: &str) -> String {
    format!(
        "{}/{}/pulse/",
        base.trim_end_matches('/'),
        ticker.trim().to_uppercase()
    )
}

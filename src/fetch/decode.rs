use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

static RE_EDGE_FOLLOWED_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""edge_followed_by"\s*:\s*\{\s*"count"\s*:\s*(\d+)"#)
        .expect("valid edge_followed_by regex")
});
static RE_FOLLOWER_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""follower_count"\s*:\s*(\d+)"#).expect("valid follower_count regex")
});

/// Coerce raw provider output into a follower count.
///
/// Thousands separators and whitespace are stripped, negatives clamp to zero, and anything
/// unparseable (including `Error: ...` sentinels) becomes zero.
pub fn normalize_count(raw: &str) -> u64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    match cleaned.parse::<i64>() {
        Ok(value) if value > 0 => value as u64,
        _ => 0,
    }
}

/// Expand a display token such as `1,523`, `12.4K` or `2M` into a whole number.
pub fn parse_abbreviated(token: &str) -> Option<u64> {
    let token = token.trim().replace(',', "");
    let (digits, multiplier) = match token.chars().last()? {
        'k' | 'K' => (&token[..token.len() - 1], 1_000f64),
        'm' | 'M' => (&token[..token.len() - 1], 1_000_000f64),
        'b' | 'B' => (&token[..token.len() - 1], 1_000_000_000f64),
        _ => (token.as_str(), 1f64),
    };

    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Content of the first `<meta name="description">` tag, if any.
pub fn meta_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("meta[name='description']").ok()?;
    let element = document.select(&selector).next()?;
    let content = element.value().attr("content")?.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

/// Pull the follower figure out of a description like `1,523 Followers, 210 Following, 87 Posts - ...`.
pub fn followers_from_description(description: &str) -> Option<u64> {
    let head = description.split(" Followers").next()?;
    if head.len() == description.len() {
        return None;
    }
    let token = head.split_whitespace().last()?;
    parse_abbreviated(token)
}

/// Exact follower count embedded in the page's inline JSON, available to signed-in sessions.
pub fn exact_count_from_body(body: &str) -> Option<u64> {
    [&*RE_EDGE_FOLLOWED_BY, &*RE_FOLLOWER_COUNT]
        .iter()
        .find_map(|re| re.captures(body))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub mod listing;
pub mod search_page;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use scraper::{ElementRef, Selector};

/// Compile a CSS selector, keeping the offending text in the error
pub fn compile_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector(format!("{}: {}", css, e)))
}

/// Text content of an element with whitespace runs collapsed to single spaces.
/// Text nodes are concatenated as-is, so inline markup never splits a word.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first element under `scope` matching `selector`
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(element_text)
}

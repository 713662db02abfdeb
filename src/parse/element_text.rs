use scraper::ElementRef;

use super::remove_excess_whitespace;

const INGREDIENT_MARKERS: [&str; 2] = [" Ingredients:", " Allergens:"];

/// Every descendant text node, trimmed, joined by single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for text in element.text().map(str::trim).filter(|t| !t.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
    }
    remove_excess_whitespace(&out).into_owned()
}

/// Drops the ingredient and allergen detail that some templates render
/// inline after the dish name.
pub fn strip_ingredient_info(text: &str) -> &str {
    let mut text = text;
    for marker in INGREDIENT_MARKERS {
        if let Some(idx) = text.find(marker) {
            text = &text[..idx];
        }
    }
    text.trim()
}

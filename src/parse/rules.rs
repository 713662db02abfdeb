//! The heuristics used to recognise menu items. Each origin template marks
//! items up differently, so every rule targets one tag and decides on its own
//! whether an element's text is a dish name.

use scraper::ElementRef;

use super::element_text::{element_text, strip_ingredient_info};

const HEADING_PREFIXES: [&str; 6] = ["menu", "breakfast", "lunch", "dinner", "brunch", "dining hall"];
const NAVIGATION_WORDS: [&str; 4] = ["select", "choose", "location", "date"];
const LEFTOVER_WORDS: [&str; 4] = ["ingredient", "allergen", "allergy", "made on shared"];
const STRUCTURAL_CHARS: [char; 9] = ['{', '}', '[', ']', '(', ')', '|', '\\', '/'];
const TD_CLASS_HINTS: [&str; 5] = ["menu", "item", "food", "dish", "entry"];

/// Text that is nothing but an ingredient or allergen label.
pub fn looks_like_ingredient_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    matches!(lower.as_str(), "ingredients" | "allergens" | "allergy")
        || lower.starts_with("made on shared")
}

fn is_heading(lower: &str) -> bool {
    HEADING_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Checks layered on top of the baseline every candidate has to pass.
#[derive(Debug, Clone, Copy)]
pub struct Filter {
    /// Candidates this many bytes or longer are rejected.
    max_len: Option<usize>,
    navigation: bool,
    leftovers: bool,
    structural: bool,
}

impl Filter {
    const NONE: Self = Self {
        max_len: None,
        navigation: false,
        leftovers: false,
        structural: false,
    };

    pub fn accepts(&self, text: &str) -> bool {
        if text.len() <= 2 {
            return false;
        }
        let lower = text.to_lowercase();
        if is_heading(&lower) || looks_like_ingredient_text(text) {
            return false;
        }
        if self.max_len.is_some_and(|max| text.len() >= max) {
            return false;
        }
        if self.navigation && NAVIGATION_WORDS.iter().any(|w| lower.contains(w)) {
            return false;
        }
        if self.leftovers && LEFTOVER_WORDS.iter().any(|w| lower.contains(w)) {
            return false;
        }
        !(self.structural && text.contains(STRUCTURAL_CHARS))
    }
}

#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    tag: &'static str,
    class_matches: fn(Option<&str>) -> bool,
    strip_ingredients: bool,
    filter: Filter,
}

impl Rule {
    /// The candidate text when the rule applies to `element` and accepts it.
    pub fn apply(&self, element: ElementRef<'_>) -> Option<String> {
        let value = element.value();
        if value.name() != self.tag || !(self.class_matches)(value.attr("class")) {
            return None;
        }
        let text = element_text(element);
        let text = if self.strip_ingredients {
            strip_ingredient_info(&text)
        } else {
            text.trim()
        };
        self.filter.accepts(text).then(|| text.to_owned())
    }
}

fn td_class(class: Option<&str>) -> bool {
    class.is_some_and(|c| {
        let lower = c.to_lowercase();
        TD_CLASS_HINTS.iter().any(|hint| lower.contains(hint))
    })
}

fn div_class(class: Option<&str>) -> bool {
    class.is_some_and(|c| {
        let lower = c.to_lowercase();
        c.contains("MenuItem") || lower.contains("menu-item") || lower.contains("food-item")
    })
}

fn span_class(class: Option<&str>) -> bool {
    class.is_some_and(|c| c.to_lowercase().contains("item"))
}

fn h3_class(class: Option<&str>) -> bool {
    class.is_some_and(|c| c.contains("clsLabel_Name"))
}

const fn any_class(_: Option<&str>) -> bool {
    true
}

/// Evaluated in this order against every element.
pub static RULES: [Rule; 5] = [
    Rule {
        name: "table cell",
        tag: "td",
        class_matches: td_class,
        strip_ingredients: true,
        filter: Filter {
            max_len: Some(100),
            navigation: true,
            leftovers: true,
            structural: false,
        },
    },
    Rule {
        name: "menu item div",
        tag: "div",
        class_matches: div_class,
        strip_ingredients: false,
        filter: Filter::NONE,
    },
    Rule {
        name: "item span",
        tag: "span",
        class_matches: span_class,
        strip_ingredients: false,
        filter: Filter::NONE,
    },
    Rule {
        name: "name label",
        tag: "h3",
        class_matches: h3_class,
        strip_ingredients: true,
        filter: Filter {
            max_len: None,
            navigation: true,
            leftovers: true,
            structural: false,
        },
    },
    Rule {
        name: "list item",
        tag: "li",
        class_matches: any_class,
        strip_ingredients: true,
        filter: Filter {
            max_len: Some(100),
            navigation: true,
            leftovers: false,
            structural: true,
        },
    },
];

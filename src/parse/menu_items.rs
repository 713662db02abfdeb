use std::{collections::HashSet, sync::OnceLock};

use scraper::{Html, Selector};

use super::rules::{Rule, RULES};

/// Accumulates accepted items in first-seen order, ignoring repeats.
#[derive(Debug, Default)]
struct MenuItems {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl MenuItems {
    fn push(&mut self, item: String, rule: &Rule, debug: bool) {
        if self.seen.contains(&item) {
            return;
        }
        if debug {
            log::debug!("Found food item via {}: {item}", rule.name);
        }
        self.seen.insert(item.clone());
        self.items.push(item);
    }
}

/// Extracts dish names from a menu page.
///
/// Pages that don't match any known template yield an empty list rather than
/// an error, since the origin legitimately serves days with no menu.
pub fn extract_menu_items(html: &str, debug: bool) -> Vec<String> {
    static CANDIDATES: OnceLock<Selector> = OnceLock::new();
    let candidates = CANDIDATES.get_or_init(|| {
        Selector::parse("td, div, span, h3, li").expect("selector should be valid")
    });

    let document = Html::parse_document(html);
    let mut found = MenuItems::default();
    // `select` walks the tree depth first, in document order
    for element in document.select(candidates) {
        for rule in &RULES {
            if let Some(item) = rule.apply(element) {
                found.push(item, rule, debug);
            }
        }
    }
    if debug {
        log::debug!("Found {} food items", found.items.len());
    }
    found.items
}

mod element_text;
mod hidden_field;
mod menu_items;
mod remove_excess_whitespace;
mod rules;

pub use hidden_field::{
    extract_event_validation, extract_view_state, extract_view_state_generator,
};
pub use menu_items::extract_menu_items;
pub use remove_excess_whitespace::remove_excess_whitespace;

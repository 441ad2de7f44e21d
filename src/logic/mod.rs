//! Tournament business logic: bracket building, result application, visibility.

mod applier;
mod builder;
mod lifecycle;
mod visibility;

pub use applier::apply_match_result;
pub use builder::build_bracket;
pub use lifecycle::{generate_bracket, match_stats, record_match_stats, set_match_result};
pub use visibility::bracket_visible;

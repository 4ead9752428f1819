//! Pure transformations for mirror retrieval.

mod schedule;
mod template;

pub use schedule::{Attempt, schedule};
pub use template::render_template;

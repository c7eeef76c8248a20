mod builder;
mod engine;

pub use builder::{
    HISTORY_TURN_LIMIT, PAGE_TEXT_BUDGET, PromptComposer, PromptPair, TRUNCATION_MARKER,
    recent_turns,
};
pub use engine::TeraEngine;

pub mod broker;
pub mod normalize;
pub mod reconcile;
pub mod types;

pub use broker::GuidanceBroker;
pub use normalize::normalize;
pub use reconcile::{fallback, reconcile};
pub use types::{
    ChatReply, ChatRequest, ConversationTurn, FieldKind, FieldQuery, GuidanceResult, PageContext,
    QuestionOption, TurnRole,
};

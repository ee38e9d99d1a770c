use quotable_db::models::QuoteRow;
use quotable_types::models::{Actor, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

/// Mutation rule: the owner or an admin, nobody else. The row's
/// public/private flag plays no part here, and the rule is the same for
/// updates and deletes.
pub fn authorize(actor: &Actor, _action: Action, quote: &QuoteRow) -> Decision {
    match *actor {
        Actor::Anonymous => Decision::Deny("not authenticated"),
        Actor::User { role: Role::Admin, .. } => Decision::Allow,
        Actor::User { id, .. } => {
            if quote.user_id == Some(id) {
                Decision::Allow
            } else {
                Decision::Deny("not the owner")
            }
        }
    }
}

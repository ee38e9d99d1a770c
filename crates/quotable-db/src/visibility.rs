use quotable_types::models::{Actor, Role};
use rusqlite::types::Value;

/// Filters that apply regardless of who is asking. All values end up as
/// bound parameters, never interpolated into the SQL text.
#[derive(Debug, Default, Clone)]
pub struct QuoteFilter {
    /// Case-insensitive substring match over text and author.
    pub search: Option<String>,
    pub topic_id: Option<i64>,
    /// Restricts to rows with the favorite flag set. The flag is global
    /// to the row, not scoped to the requesting actor.
    pub favorite_only: bool,
}

impl QuoteFilter {
    pub(crate) fn push_predicates(&self, clauses: &mut Vec<String>, params: &mut Vec<Value>) {
        if let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", q);
            params.push(Value::Text(pattern.clone()));
            params.push(Value::Text(pattern));
            clauses.push(format!(
                "(q.text LIKE ?{} OR q.author LIKE ?{})",
                params.len() - 1,
                params.len()
            ));
        }

        if let Some(topic_id) = self.topic_id {
            params.push(Value::Integer(topic_id));
            clauses.push(format!("q.topic_id = ?{}", params.len()));
        }

        if self.favorite_only {
            clauses.push("q.is_favorite = 1".to_string());
        }
    }
}

/// Which quote rows an actor may read. One variant per branch of the
/// visibility rules — the branches are mutually exclusive, and resolving
/// them up front keeps each case auditable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Anonymous browsing: public rows only.
    PublicOnly,
    /// Admin: no visibility restriction, optionally narrowed to one owner.
    All { owner: Option<i64> },
    /// An authenticated user's own rows, public and private.
    Own(i64),
    /// Another user's rows, public only.
    PublicOf(i64),
    /// The default feed: public rows plus the actor's own private ones.
    PublicOrOwn(i64),
}

impl Visibility {
    /// Resolve the branch for a read request. Identity-dependent filters
    /// (`only_my`, `target_user`) are ignored for anonymous actors.
    pub fn resolve(actor: &Actor, only_my: bool, target_user: Option<i64>) -> Self {
        match *actor {
            Actor::Anonymous => Visibility::PublicOnly,
            Actor::User {
                role: Role::Admin, ..
            } => Visibility::All { owner: target_user },
            Actor::User { id, .. } => {
                if only_my {
                    Visibility::Own(id)
                } else if let Some(target) = target_user {
                    if target == id {
                        Visibility::Own(id)
                    } else {
                        Visibility::PublicOf(target)
                    }
                } else {
                    Visibility::PublicOrOwn(id)
                }
            }
        }
    }

    pub(crate) fn push_predicate(&self, clauses: &mut Vec<String>, params: &mut Vec<Value>) {
        match *self {
            Visibility::PublicOnly => clauses.push("q.is_public = 1".to_string()),
            Visibility::All { owner: None } => {}
            Visibility::All { owner: Some(owner) } => {
                params.push(Value::Integer(owner));
                clauses.push(format!("q.user_id = ?{}", params.len()));
            }
            Visibility::Own(owner) => {
                params.push(Value::Integer(owner));
                clauses.push(format!("q.user_id = ?{}", params.len()));
            }
            Visibility::PublicOf(owner) => {
                params.push(Value::Integer(owner));
                clauses.push(format!("q.user_id = ?{} AND q.is_public = 1", params.len()));
            }
            Visibility::PublicOrOwn(me) => {
                params.push(Value::Integer(me));
                clauses.push(format!("(q.is_public = 1 OR q.user_id = ?{})", params.len()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> Actor {
        Actor::User {
            id,
            role: Role::User,
        }
    }

    fn admin(id: i64) -> Actor {
        Actor::User {
            id,
            role: Role::Admin,
        }
    }

    #[test]
    fn test_anonymous_is_public_only() {
        // Identity-dependent filters mean nothing without an identity.
        let vis = Visibility::resolve(&Actor::Anonymous, true, Some(7));
        assert_eq!(vis, Visibility::PublicOnly);
    }

    #[test]
    fn test_admin_sees_everything() {
        assert_eq!(
            Visibility::resolve(&admin(1), false, None),
            Visibility::All { owner: None }
        );
        assert_eq!(
            Visibility::resolve(&admin(1), false, Some(9)),
            Visibility::All { owner: Some(9) }
        );
    }

    #[test]
    fn test_only_my_wins_over_target_user() {
        let vis = Visibility::resolve(&user(4), true, Some(9));
        assert_eq!(vis, Visibility::Own(4));
    }

    #[test]
    fn test_target_user_self_is_own() {
        assert_eq!(Visibility::resolve(&user(4), false, Some(4)), Visibility::Own(4));
        assert_eq!(
            Visibility::resolve(&user(4), false, Some(9)),
            Visibility::PublicOf(9)
        );
    }

    #[test]
    fn test_default_feed_mixes_public_and_own() {
        assert_eq!(
            Visibility::resolve(&user(4), false, None),
            Visibility::PublicOrOwn(4)
        );
    }

    #[test]
    fn test_predicates_use_placeholders() {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        let filter = QuoteFilter {
            search: Some("stars".to_string()),
            topic_id: Some(2),
            favorite_only: true,
        };
        filter.push_predicates(&mut clauses, &mut params);
        Visibility::PublicOrOwn(4).push_predicate(&mut clauses, &mut params);

        assert_eq!(
            clauses,
            vec![
                "(q.text LIKE ?1 OR q.author LIKE ?2)".to_string(),
                "q.topic_id = ?3".to_string(),
                "q.is_favorite = 1".to_string(),
                "(q.is_public = 1 OR q.user_id = ?4)".to_string(),
            ]
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_blank_search_adds_no_predicate() {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        let filter = QuoteFilter {
            search: Some("   ".to_string()),
            ..QuoteFilter::default()
        };
        filter.push_predicates(&mut clauses, &mut params);

        assert!(clauses.is_empty());
        assert!(params.is_empty());
    }
}

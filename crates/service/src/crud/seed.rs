//! Demo rows the users tiers start with.

use serde_json::json;

use super::policy::Variant;
use super::record::Record;

fn user(id: &str, name: &str, email: &str) -> (String, Record) {
    let mut rec = Record::new();
    rec.insert("user_id".into(), json!(id));
    rec.insert("name".into(), json!(name));
    rec.insert("email".into(), json!(email));
    (id.to_string(), rec)
}

/// The two users the intermediate and advanced users tiers ship with.
pub fn demo_users() -> Vec<(String, Record)> {
    vec![
        user("1", "John Doe", "j@j.com"),
        user("2", "Jane Smith", "jane@x.com"),
    ]
}

/// Seed rows for `variant`, empty for tiers that start blank.
pub fn demo_users_for(variant: Variant) -> Vec<(String, Record)> {
    match variant {
        Variant::UsersIntermediate | Variant::UsersAdvanced => demo_users(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stricter_users_tiers_are_seeded() {
        assert_eq!(demo_users_for(Variant::UsersAdvanced).len(), 2);
        assert_eq!(demo_users_for(Variant::UsersIntermediate).len(), 2);
        assert!(demo_users_for(Variant::UsersBasic).is_empty());
        assert!(demo_users_for(Variant::ItemsAdvanced).is_empty());
    }

    #[test]
    fn seeded_users_carry_their_own_id() {
        for (id, rec) in demo_users() {
            assert_eq!(rec["user_id"], id.as_str());
        }
    }
}

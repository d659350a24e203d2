//! Authorization predicates.
//!
//! Identity is established upstream (the reverse proxy injects the user id
//! and admin flag); these functions answer the ownership questions each
//! handler asks explicitly before touching a record.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// The authenticated caller, as asserted by the front proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUser {
    pub id: DbId,
    pub is_admin: bool,
}

/// Whether `user` may modify (edit, delete, restart) a simulation owned by
/// `author_id`. Owners and admins only.
pub fn can_edit(author_id: DbId, user: &RequestUser) -> bool {
    user.is_admin || user.id == author_id
}

/// Whether `user` may read a simulation owned by `author_id`.
///
/// Same rule as editing: simulations are private to their author.
pub fn can_view(author_id: DbId, user: &RequestUser) -> bool {
    can_edit(author_id, user)
}

/// Whether `user` may see a cell model in the catalog.
///
/// Predefined models are public; uploaded models are visible to their
/// author and to admins.
pub fn can_view_model(predefined: bool, author_id: Option<DbId>, user: &RequestUser) -> bool {
    predefined || user.is_admin || author_id == Some(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: RequestUser = RequestUser { id: 7, is_admin: false };
    const OTHER: RequestUser = RequestUser { id: 8, is_admin: false };
    const ADMIN: RequestUser = RequestUser { id: 9, is_admin: true };

    #[test]
    fn owner_can_edit_and_view() {
        assert!(can_edit(7, &OWNER));
        assert!(can_view(7, &OWNER));
    }

    #[test]
    fn non_owner_cannot_edit_or_view() {
        assert!(!can_edit(7, &OTHER));
        assert!(!can_view(7, &OTHER));
    }

    #[test]
    fn admin_can_edit_anything() {
        assert!(can_edit(7, &ADMIN));
        assert!(can_view(7, &ADMIN));
    }

    #[test]
    fn predefined_models_are_public() {
        assert!(can_view_model(true, None, &OTHER));
        assert!(can_view_model(true, Some(7), &OTHER));
    }

    #[test]
    fn uploaded_models_private_to_author_and_admin() {
        assert!(can_view_model(false, Some(7), &OWNER));
        assert!(!can_view_model(false, Some(7), &OTHER));
        assert!(can_view_model(false, Some(7), &ADMIN));
        assert!(!can_view_model(false, None, &OTHER));
    }
}

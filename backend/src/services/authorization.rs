//! Authorization guard
//!
//! Runs after the session gate has resolved the caller. Role checks read the
//! user's flags; ownership checks are membership tests against the stored
//! relations (book authors, loan patron, review patron).

use crate::db::{AuthorRecord, BookRecord, Database, PatronRecord, UserRecord};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Patron,
    Author,
}

impl Role {
    pub fn granted_to(&self, user: &UserRecord) -> bool {
        match self {
            Role::Admin => user.is_admin,
            Role::Patron => user.is_patron,
            Role::Author => user.is_author,
        }
    }

    fn denial(&self) -> &'static str {
        match self {
            Role::Admin => "User is not an admin",
            Role::Patron => "User is not a patron",
            Role::Author => "User is not an author",
        }
    }
}

/// Fail with `Forbidden` unless `user` holds `role`
pub fn require_role(user: &UserRecord, role: Role) -> Result<()> {
    if role.granted_to(user) {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, role = ?role, "Role check failed");
        Err(Error::forbidden(role.denial()))
    }
}

/// Role plus ownership checks that need the store
#[derive(Clone)]
pub struct Authorizer {
    db: Database,
}

impl Authorizer {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The caller's author profile; requires the author role
    pub async fn author(&self, user: &UserRecord) -> Result<AuthorRecord> {
        require_role(user, Role::Author)?;
        self.db
            .profiles()
            .get_author_by_user(&user.id)
            .await?
            .ok_or_else(|| Error::forbidden(Role::Author.denial()))
    }

    /// The caller's patron profile; requires the patron role
    pub async fn patron(&self, user: &UserRecord) -> Result<PatronRecord> {
        require_role(user, Role::Patron)?;
        self.db
            .profiles()
            .get_patron_by_user(&user.id)
            .await?
            .ok_or_else(|| Error::forbidden(Role::Patron.denial()))
    }

    /// Author role plus membership of the caller in the book's authors
    pub async fn book_author(
        &self,
        user: &UserRecord,
        book_id: &str,
    ) -> Result<(AuthorRecord, BookRecord)> {
        let author = self.author(user).await?;
        let books = self.db.books();
        let book = books.get(book_id).await?.ok_or(Error::NotFound("Book"))?;

        if !books.has_author(&book.book_id, &author.author_id).await? {
            tracing::debug!(
                user_id = %user.id,
                book_id = %book.book_id,
                "Ownership check failed"
            );
            return Err(Error::forbidden("User not the author of Book"));
        }
        Ok((author, book))
    }
}

/// Fail with `Forbidden` unless `owner_patron_id` is the caller's patron id
pub fn require_patron_owner(
    patron: &PatronRecord,
    owner_patron_id: &str,
    what: &str,
) -> Result<()> {
    if patron.patron_id == owner_patron_id {
        Ok(())
    } else {
        Err(Error::forbidden(format!("User is not the patron of this {}", what)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn user(is_admin: bool, is_patron: bool, is_author: bool) -> UserRecord {
        UserRecord {
            id: "u1".to_string(),
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            password_hash: String::new(),
            is_active: true,
            is_admin,
            is_patron,
            is_author,
            token: None,
            last_login_at: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_role_flags_are_independent() {
        let both = user(false, true, true);
        assert!(require_role(&both, Role::Patron).is_ok());
        assert!(require_role(&both, Role::Author).is_ok());
        assert_matches!(
            require_role(&both, Role::Admin),
            Err(Error::Forbidden(msg)) if msg == "User is not an admin"
        );
    }

    #[test]
    fn test_denial_messages() {
        let nobody = user(false, false, false);
        assert_matches!(
            require_role(&nobody, Role::Author),
            Err(Error::Forbidden(msg)) if msg == "User is not an author"
        );
        assert_matches!(
            require_role(&nobody, Role::Patron),
            Err(Error::Forbidden(msg)) if msg == "User is not a patron"
        );
    }

    #[test]
    fn test_patron_owner() {
        let patron = PatronRecord {
            patron_id: "p1".to_string(),
            user_id: "u1".to_string(),
            address: String::new(),
            phone_number: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(require_patron_owner(&patron, "p1", "transaction").is_ok());
        assert_matches!(
            require_patron_owner(&patron, "p2", "review"),
            Err(Error::Forbidden(msg)) if msg == "User is not the patron of this review"
        );
    }
}

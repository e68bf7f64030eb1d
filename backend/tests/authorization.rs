//! Integration tests for role and ownership checks

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use libris::Error;
use libris::db::UpdateBook;

use common::{date, new_book, setup};

// ============================================================================
// Role flags
// ============================================================================

mod roles {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_non_author_cannot_create_book() {
        let app = setup().await;
        let (user, _) = app.login_new("a@x.com", "a").await;

        assert_matches!(
            app.services.catalog.create_book(&user, new_book("Dune", "", 1)).await,
            Err(Error::Forbidden(msg)) if msg == "User is not an author"
        );
        assert_matches!(
            app.services.catalog.author_books(&user).await,
            Err(Error::Forbidden(_))
        );
    }

    #[tokio::test]
    async fn test_non_patron_cannot_borrow_or_review() {
        let app = setup().await;
        let (author, _) = app.login_new("a@x.com", "a").await;
        let (author, _) = app.make_author(&author).await;
        let book = app.create_book(&author, "Dune", 2).await;

        assert_matches!(
            app.services
                .circulation
                .checkout(&author, &book.book_id, date(2999, 1, 1), date(2000, 1, 1))
                .await,
            Err(Error::Forbidden(msg)) if msg == "User is not a patron"
        );
        assert_matches!(
            app.services.reviews.create_review(&author, &book.book_id, 4, "ok").await,
            Err(Error::Forbidden(msg)) if msg == "User is not a patron"
        );
    }

    #[tokio::test]
    async fn test_user_can_hold_both_roles() {
        let app = setup().await;
        let (user, _) = app.login_new("a@x.com", "a").await;
        let (user, _) = app.make_author(&user).await;
        let (user, _) = app.make_patron(&user).await;

        assert!(user.is_author && user.is_patron && !user.is_admin);
        let book = app.create_book(&user, "Dune", 1).await;
        app.services
            .circulation
            .checkout(&user, &book.book_id, date(2999, 1, 1), date(2000, 1, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_profiles_cannot_be_created_twice() {
        let app = setup().await;
        let (user, _) = app.login_new("a@x.com", "a").await;
        let (user, _) = app.make_patron(&user).await;
        let (user, _) = app.make_author(&user).await;

        assert_matches!(
            app.services.auth.become_patron(&user, "elsewhere", "555").await,
            Err(Error::Validation(_))
        );
        assert_matches!(
            app.services.auth.become_author(&user, date(1980, 2, 2), "Irish").await,
            Err(Error::Validation(_))
        );
    }
}

// ============================================================================
// Book ownership
// ============================================================================

mod ownership {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_other_author_cannot_touch_book() {
        let app = setup().await;
        let (owner, _) = app.login_new("a@x.com", "a").await;
        let (owner, _) = app.make_author(&owner).await;
        let (other, _) = app.login_new("b@x.com", "b").await;
        let (other, other_author) = app.make_author(&other).await;
        let book = app.create_book(&owner, "Dune", 1).await;

        let catalog = &app.services.catalog;
        let update = UpdateBook {
            title: Some("Stolen".to_string()),
            ..Default::default()
        };

        assert_matches!(
            catalog.edit_book(&other, &book.book_id, update).await,
            Err(Error::Forbidden(msg)) if msg == "User not the author of Book"
        );
        assert_matches!(
            catalog.delete_book(&other, &book.book_id).await,
            Err(Error::Forbidden(_))
        );
        assert_matches!(
            catalog
                .add_author_to_book(&other, &book.book_id, &other_author.author_id)
                .await,
            Err(Error::Forbidden(_))
        );

        let unchanged = catalog.book(&book.book_id).await.unwrap();
        assert_eq!(unchanged.title, "Dune");
    }

    #[tokio::test]
    async fn test_owner_can_edit_and_delete() {
        let app = setup().await;
        let (owner, _) = app.login_new("a@x.com", "a").await;
        let (owner, _) = app.make_author(&owner).await;
        let book = app.create_book(&owner, "Dune", 1).await;

        let edited = app
            .services
            .catalog
            .edit_book(
                &owner,
                &book.book_id,
                UpdateBook {
                    title: Some("Dune Messiah".to_string()),
                    available_copies: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.title, "Dune Messiah");
        assert_eq!(edited.available_copies, 7);
        assert_eq!(edited.isbn, book.isbn);

        app.services.catalog.delete_book(&owner, &book.book_id).await.unwrap();
        assert_matches!(
            app.services.catalog.book(&book.book_id).await,
            Err(Error::NotFound("Book"))
        );
    }

    #[tokio::test]
    async fn test_missing_book_is_not_found() {
        let app = setup().await;
        let (owner, _) = app.login_new("a@x.com", "a").await;
        let (owner, _) = app.make_author(&owner).await;

        assert_matches!(
            app.services.catalog.delete_book(&owner, "no-such-book").await,
            Err(Error::NotFound("Book"))
        );
    }

    #[tokio::test]
    async fn test_co_author_gains_ownership() {
        let app = setup().await;
        let (owner, _) = app.login_new("a@x.com", "a").await;
        let (owner, _) = app.make_author(&owner).await;
        let (co, _) = app.login_new("b@x.com", "b").await;
        let (co, co_author) = app.make_author(&co).await;
        let book = app.create_book(&owner, "Good Omens", 1).await;

        app.services
            .catalog
            .add_author_to_book(&owner, &book.book_id, &co_author.author_id)
            .await
            .unwrap();

        let edited = app
            .services
            .catalog
            .edit_book(
                &co,
                &book.book_id,
                UpdateBook {
                    description: Some("Nice and accurate".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.description, "Nice and accurate");
    }
}

// ============================================================================
// Relation idempotence
// ============================================================================

mod relations {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_author_relation_add_and_remove_are_idempotent() {
        let app = setup().await;
        let (owner, _) = app.login_new("a@x.com", "a").await;
        let (owner, owner_author) = app.make_author(&owner).await;
        let (co, _) = app.login_new("b@x.com", "b").await;
        let (_, co_author) = app.make_author(&co).await;
        let book = app.create_book(&owner, "Dune", 1).await;
        let catalog = &app.services.catalog;

        // already present
        catalog
            .add_author_to_book(&owner, &book.book_id, &owner_author.author_id)
            .await
            .unwrap();
        assert_eq!(app.db.books().authors_of(&book.book_id).await.unwrap().len(), 1);

        // absent
        catalog
            .remove_author_from_book(&owner, &book.book_id, &co_author.author_id)
            .await
            .unwrap();
        assert_eq!(app.db.books().authors_of(&book.book_id).await.unwrap().len(), 1);

        catalog
            .add_author_to_book(&owner, &book.book_id, &co_author.author_id)
            .await
            .unwrap();
        catalog
            .add_author_to_book(&owner, &book.book_id, &co_author.author_id)
            .await
            .unwrap();
        assert_eq!(app.db.books().authors_of(&book.book_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_genre_relation_add_and_remove_are_idempotent() {
        let app = setup().await;
        let (owner, _) = app.login_new("a@x.com", "a").await;
        let (owner, _) = app.make_author(&owner).await;
        let scifi = app.services.catalog.create_genre("Sci-Fi", "Space").await.unwrap();
        let book = app.create_book(&owner, "Dune", 1).await;
        let catalog = &app.services.catalog;

        catalog
            .remove_genre_from_book(&owner, &book.book_id, &scifi.genre_id)
            .await
            .unwrap();
        assert!(app.db.books().genres_of(&book.book_id).await.unwrap().is_empty());

        for _ in 0..2 {
            catalog
                .add_genre_to_book(&owner, &book.book_id, &scifi.genre_id)
                .await
                .unwrap();
        }
        let genres = app.db.books().genres_of(&book.book_id).await.unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].name, "Sci-Fi");

        assert_matches!(
            catalog.add_genre_to_book(&owner, &book.book_id, "no-such-genre").await,
            Err(Error::NotFound("Genre"))
        );
    }
}

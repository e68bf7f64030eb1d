//! Integration tests for genres, books, personal libraries and reviews

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use libris::Error;
use libris::db::sqlite_helpers::TextMatch;
use libris::db::{BookFilter, GenreFilter, ReadingState, UpdateBook, UpdateGenre};

use common::{new_book, setup};

// ============================================================================
// Genres
// ============================================================================

mod genres {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_crud() {
        let app = setup().await;
        let catalog = &app.services.catalog;

        let genre = catalog.create_genre("Horror", "Scary").await.unwrap();
        let edited = catalog
            .edit_genre(
                &genre.genre_id,
                UpdateGenre {
                    description: Some("Very scary".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.name, "Horror");
        assert_eq!(edited.description, "Very scary");

        catalog.delete_genre(&genre.genre_id).await.unwrap();
        assert_matches!(
            catalog.genre(&genre.genre_id).await,
            Err(Error::NotFound("Genre"))
        );
        assert_matches!(
            catalog.delete_genre(&genre.genre_id).await,
            Err(Error::NotFound("Genre"))
        );
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let app = setup().await;
        let catalog = &app.services.catalog;
        catalog.create_genre("Horror", "Scary").await.unwrap();
        let drama = catalog.create_genre("Drama", "Tears").await.unwrap();

        assert_matches!(
            catalog.create_genre("Horror", "Again").await,
            Err(Error::Validation(_))
        );
        assert_matches!(
            catalog.create_genre("hORROR", "Again").await,
            Err(Error::Validation(_))
        );
        assert_eq!(
            catalog
                .genres(&GenreFilter {
                    name: vec![(TextMatch::Exact, "horror".to_string())],
                    ..Default::default()
                })
                .await
                .unwrap()
                .len(),
            1
        );
        assert_matches!(
            catalog
                .edit_genre(
                    &drama.genre_id,
                    UpdateGenre {
                        name: Some("Horror".to_string()),
                        ..Default::default()
                    },
                )
                .await,
            Err(Error::Validation(_))
        );
    }

    #[tokio::test]
    async fn test_filters() {
        let app = setup().await;
        let catalog = &app.services.catalog;
        catalog.create_genre("Science Fiction", "Rockets and robots").await.unwrap();
        catalog.create_genre("Horror", "Ghosts and ghouls").await.unwrap();
        catalog.create_genre("Romance", "Love stories").await.unwrap();

        let names = |genres: Vec<libris::db::GenreRecord>| {
            genres.into_iter().map(|g| g.name).collect::<Vec<_>>()
        };

        let by_prefix = catalog
            .genres(&GenreFilter {
                name: vec![(TextMatch::StartsWith, "sci".to_string())],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(by_prefix), vec!["Science Fiction"]);

        let by_suffix = catalog
            .genres(&GenreFilter {
                description: vec![(TextMatch::EndsWith, "GHOULS".to_string())],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(by_suffix), vec!["Horror"]);

        let by_contains = catalog
            .genres(&GenreFilter {
                name: vec![(TextMatch::Contains, "C".to_string())],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(names(by_contains), vec!["Romance", "Science Fiction"]);

        let all = catalog.genres(&GenreFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}

// ============================================================================
// Books
// ============================================================================

mod books {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_with_genres() {
        let app = setup().await;
        let (user, _) = app.login_new("a@x.com", "a").await;
        let (user, author) = app.make_author(&user).await;
        app.services.catalog.create_genre("Sci-Fi", "Space").await.unwrap();
        app.services.catalog.create_genre("Drama", "Tears").await.unwrap();

        let book = app
            .services
            .catalog
            .create_book(&user, new_book("Dune", " sci-fi , DRAMA ", 3))
            .await
            .unwrap();

        assert_eq!(book.available_copies, 3);
        assert_eq!(book.no_of_reviews, 0);
        let genres = app.db.books().genres_of(&book.book_id).await.unwrap();
        assert_eq!(
            genres.into_iter().map(|g| g.name).collect::<Vec<_>>(),
            vec!["Drama", "Sci-Fi"]
        );
        let authors = app.db.books().authors_of(&book.book_id).await.unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].author_id, author.author_id);
    }

    #[tokio::test]
    async fn test_unknown_genre_rejected_without_writing() {
        let app = setup().await;
        let (user, _) = app.login_new("a@x.com", "a").await;
        let (user, _) = app.make_author(&user).await;
        app.services.catalog.create_genre("Sci-Fi", "Space").await.unwrap();

        assert_matches!(
            app.services
                .catalog
                .create_book(&user, new_book("Dune", "Sci-Fi,Westerns", 3))
                .await,
            Err(Error::Validation(msg)) if msg.contains("Westerns")
        );
        assert!(app.services.catalog.books(&BookFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filters_and_author_books() {
        let app = setup().await;
        let (a, _) = app.login_new("a@x.com", "a").await;
        let (a, _) = app.make_author(&a).await;
        let (b, _) = app.login_new("b@x.com", "b").await;
        let (b, _) = app.make_author(&b).await;

        let dune = app.create_book(&a, "Dune", 1).await;
        app.create_book(&a, "Dune Messiah", 1).await;
        app.create_book(&b, "Emma", 1).await;

        let by_isbn = app
            .services
            .catalog
            .books(&BookFilter {
                isbn: Some(dune.isbn.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_isbn.len(), 1);
        assert_eq!(by_isbn[0].book_id, dune.book_id);

        let by_title = app
            .services
            .catalog
            .books(&BookFilter {
                title: vec![(TextMatch::StartsWith, "dune".to_string())],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_title.len(), 2);

        let mine = app.services.catalog.author_books(&b).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Emma");
    }

    #[tokio::test]
    async fn test_rating_must_be_in_range() {
        let app = setup().await;
        let (user, _) = app.login_new("a@x.com", "a").await;
        let (user, _) = app.make_author(&user).await;

        let mut input = new_book("Dune", "", 1);
        input.rating = Some(7.0);
        assert_matches!(
            app.services.catalog.create_book(&user, input).await,
            Err(Error::Validation(_))
        );
    }
}

// ============================================================================
// Personal library
// ============================================================================

mod library {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_reading_flow() {
        let app = setup().await;
        let (author, _) = app.login_new("a@x.com", "a").await;
        let (author, _) = app.make_author(&author).await;
        let book = app.create_book(&author, "Dune", 1).await;
        let (reader, _) = app.login_new("r@x.com", "r").await;
        let reading = &app.services.reading;

        let status = reading.add_to_library(&reader, &book.book_id).await.unwrap();
        assert_eq!(status.status, ReadingState::Unread);
        assert_eq!(status.total_pages, 320);
        assert_eq!(status.present_page, 0);

        let status = reading.read_book(&reader, &book.book_id).await.unwrap();
        assert_eq!(status.status, ReadingState::Incomplete);

        let status = reading.close_book(&reader, &book.book_id, 100).await.unwrap();
        assert_eq!(status.status, ReadingState::Incomplete);
        assert_eq!(status.present_page, 100);

        assert_matches!(
            reading.close_book(&reader, &book.book_id, 321).await,
            Err(Error::Validation(_))
        );

        let status = reading.close_book(&reader, &book.book_id, 320).await.unwrap();
        assert_eq!(status.status, ReadingState::Read);

        let shelf = reading.library(&reader).await.unwrap();
        assert_eq!(shelf.len(), 1);

        reading.remove_from_library(&reader, &book.book_id).await.unwrap();
        assert!(reading.library(&reader).await.unwrap().is_empty());
        assert_matches!(
            reading.read_book(&reader, &book.book_id).await,
            Err(Error::NotFound(_))
        );
    }

    #[tokio::test]
    async fn test_close_uses_current_page_count() {
        let app = setup().await;
        let (author, _) = app.login_new("a@x.com", "a").await;
        let (author, _) = app.make_author(&author).await;
        let book = app.create_book(&author, "Dune", 1).await;
        let reading = &app.services.reading;
        reading.add_to_library(&author, &book.book_id).await.unwrap();

        app.services
            .catalog
            .edit_book(
                &author,
                &book.book_id,
                UpdateBook {
                    book_pages: Some(100),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_matches!(
            reading.close_book(&author, &book.book_id, 300).await,
            Err(Error::Validation(_))
        );
        let status = reading.close_book(&author, &book.book_id, 100).await.unwrap();
        assert_eq!(status.status, ReadingState::Read);
        assert_eq!(status.total_pages, 100);
        assert_eq!(status.present_page, 100);
    }

    #[tokio::test]
    async fn test_adding_twice_keeps_progress() {
        let app = setup().await;
        let (author, _) = app.login_new("a@x.com", "a").await;
        let (author, _) = app.make_author(&author).await;
        let book = app.create_book(&author, "Dune", 1).await;
        let reading = &app.services.reading;

        reading.add_to_library(&author, &book.book_id).await.unwrap();
        reading.close_book(&author, &book.book_id, 50).await.unwrap();
        let again = reading.add_to_library(&author, &book.book_id).await.unwrap();

        assert_eq!(again.present_page, 50);
        assert_eq!(reading.statuses(&author).await.unwrap().len(), 1);
    }
}

// ============================================================================
// Reviews
// ============================================================================

mod reviews {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_rating_aggregate_follows_reviews() {
        let app = setup().await;
        let (author, _) = app.login_new("a@x.com", "a").await;
        let (author, _) = app.make_author(&author).await;
        let book = app.create_book(&author, "Dune", 1).await;
        let (p1, _) = app.login_new("p1@x.com", "p1").await;
        let (p1, _) = app.make_patron(&p1).await;
        let (p2, _) = app.login_new("p2@x.com", "p2").await;
        let (p2, _) = app.make_patron(&p2).await;
        let reviews = &app.services.reviews;

        reviews.create_review(&p1, &book.book_id, 5, "Great").await.unwrap();
        let zero = reviews.create_review(&p2, &book.book_id, 0, "Meh").await.unwrap();

        let book_now = app.services.catalog.book(&book.book_id).await.unwrap();
        assert_eq!(book_now.rating, 2.5);
        assert_eq!(book_now.no_of_reviews, 1);

        reviews.delete_review(&p2, &zero.review_id).await.unwrap();
        let book_now = app.services.catalog.book(&book.book_id).await.unwrap();
        assert_eq!(book_now.rating, 5.0);
        assert_eq!(book_now.no_of_reviews, 1);
        assert_eq!(reviews.reviews_for_book(&book.book_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_rating() {
        let app = setup().await;
        let (author, _) = app.login_new("a@x.com", "a").await;
        let (author, _) = app.make_author(&author).await;
        let (author, _) = app.make_patron(&author).await;
        let book = app.create_book(&author, "Dune", 1).await;

        assert_matches!(
            app.services.reviews.create_review(&author, &book.book_id, 6, "!").await,
            Err(Error::Validation(msg)) if msg == "Rating should be within 0 and 5"
        );
    }

    #[tokio::test]
    async fn test_only_reviewer_can_delete() {
        let app = setup().await;
        let (author, _) = app.login_new("a@x.com", "a").await;
        let (author, _) = app.make_author(&author).await;
        let book = app.create_book(&author, "Dune", 1).await;
        let (p1, _) = app.login_new("p1@x.com", "p1").await;
        let (p1, _) = app.make_patron(&p1).await;
        let (p2, _) = app.login_new("p2@x.com", "p2").await;
        let (p2, _) = app.make_patron(&p2).await;

        let review = app
            .services
            .reviews
            .create_review(&p1, &book.book_id, 4, "Good")
            .await
            .unwrap();
        assert_matches!(
            app.services.reviews.delete_review(&p2, &review.review_id).await,
            Err(Error::Forbidden(_))
        );
    }
}

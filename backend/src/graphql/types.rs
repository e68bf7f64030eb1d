//! GraphQL object types
//!
//! Thin views over the repository records. Relations (a book's authors, a
//! profile's user, ...) are resolved lazily through `ComplexObject`.

use async_graphql::{ComplexObject, Context, Result, ResultExt, SimpleObject};
use chrono::NaiveDate;

use crate::db::{
    AuthorRecord, BookRecord, BookStatusRecord, Database, GenreRecord, PatronRecord, ReadingState,
    ReviewRecord, TransactionRecord, TransactionStatus, UserRecord,
};
use crate::error::Error;

fn db<'a>(ctx: &Context<'a>) -> &'a Database {
    ctx.data_unchecked::<Database>()
}

// ============================================================================
// Accounts
// ============================================================================

/// A registered user. The session token is never exposed here.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_patron: bool,
    pub is_author: bool,
    pub last_login_at: Option<String>,
    pub created_at: String,
}

#[ComplexObject]
impl User {
    async fn patron(&self, ctx: &Context<'_>) -> Result<Option<Patron>> {
        let patron = db(ctx)
            .profiles()
            .get_patron_by_user(&self.id)
            .await
            .map_err(Error::from)
            .extend()?;
        Ok(patron.map(Patron::from))
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<Option<Author>> {
        let author = db(ctx)
            .profiles()
            .get_author_by_user(&self.id)
            .await
            .map_err(Error::from)
            .extend()?;
        Ok(author.map(Author::from))
    }
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            email: r.email,
            username: r.username,
            first_name: r.first_name,
            last_name: r.last_name,
            is_active: r.is_active,
            is_admin: r.is_admin,
            is_patron: r.is_patron,
            is_author: r.is_author,
            last_login_at: r.last_login_at,
            created_at: r.created_at,
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone, SimpleObject)]
pub struct LoginPayload {
    pub user: User,
    /// Send as the raw `Authorization` header value
    pub token: String,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Patron {
    pub patron_id: String,
    pub user_id: String,
    pub address: String,
    pub phone_number: String,
    pub created_at: String,
}

#[ComplexObject]
impl Patron {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        load_user(ctx, &self.user_id).await
    }
}

impl From<PatronRecord> for Patron {
    fn from(r: PatronRecord) -> Self {
        Self {
            patron_id: r.patron_id,
            user_id: r.user_id,
            address: r.address,
            phone_number: r.phone_number,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Author {
    pub author_id: String,
    pub user_id: String,
    pub birthdate: NaiveDate,
    pub nationality: String,
    pub created_at: String,
}

#[ComplexObject]
impl Author {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        load_user(ctx, &self.user_id).await
    }

    async fn books(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let books = db(ctx)
            .books()
            .list_by_author(&self.author_id)
            .await
            .map_err(Error::from)
            .extend()?;
        Ok(books.into_iter().map(Book::from).collect())
    }
}

impl From<AuthorRecord> for Author {
    fn from(r: AuthorRecord) -> Self {
        Self {
            author_id: r.author_id,
            user_id: r.user_id,
            birthdate: r.birthdate,
            nationality: r.nationality,
            created_at: r.created_at,
        }
    }
}

async fn load_user(ctx: &Context<'_>, user_id: &str) -> Result<Option<User>> {
    let user = db(ctx)
        .users()
        .get_by_id(user_id)
        .await
        .map_err(Error::from)
        .extend()?;
    Ok(user.map(User::from))
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
pub struct Genre {
    pub genre_id: String,
    pub name: String,
    pub description: String,
}

impl From<GenreRecord> for Genre {
    fn from(r: GenreRecord) -> Self {
        Self {
            genre_id: r.genre_id,
            name: r.name,
            description: r.description,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Book {
    pub book_id: String,
    pub title: String,
    pub isbn: String,
    pub description: String,
    /// Mean review rating
    pub rating: f64,
    pub publish_year: NaiveDate,
    pub available_copies: i64,
    /// Reviews with a rating above zero
    pub no_of_reviews: i64,
    pub book_pages: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[ComplexObject]
impl Book {
    async fn authors(&self, ctx: &Context<'_>) -> Result<Vec<Author>> {
        let authors = db(ctx)
            .books()
            .authors_of(&self.book_id)
            .await
            .map_err(Error::from)
            .extend()?;
        Ok(authors.into_iter().map(Author::from).collect())
    }

    async fn genres(&self, ctx: &Context<'_>) -> Result<Vec<Genre>> {
        let genres = db(ctx)
            .books()
            .genres_of(&self.book_id)
            .await
            .map_err(Error::from)
            .extend()?;
        Ok(genres.into_iter().map(Genre::from).collect())
    }

    async fn reviews(&self, ctx: &Context<'_>) -> Result<Vec<Review>> {
        let reviews = db(ctx)
            .reviews()
            .list_for_book(&self.book_id)
            .await
            .map_err(Error::from)
            .extend()?;
        Ok(reviews.into_iter().map(Review::from).collect())
    }
}

impl From<BookRecord> for Book {
    fn from(r: BookRecord) -> Self {
        Self {
            book_id: r.book_id,
            title: r.title,
            isbn: r.isbn,
            description: r.description,
            rating: r.rating,
            publish_year: r.publish_year,
            available_copies: r.available_copies,
            no_of_reviews: r.no_of_reviews,
            book_pages: r.book_pages,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

async fn load_book(ctx: &Context<'_>, book_id: &str) -> Result<Option<Book>> {
    let book = db(ctx)
        .books()
        .get(book_id)
        .await
        .map_err(Error::from)
        .extend()?;
    Ok(book.map(Book::from))
}

// ============================================================================
// Library, Loans, Reviews
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct ReadingStatus {
    pub book_status_id: String,
    pub book_id: String,
    pub total_pages: i64,
    pub present_page: i64,
    pub status: ReadingState,
    pub updated_at: String,
}

#[ComplexObject]
impl ReadingStatus {
    async fn book(&self, ctx: &Context<'_>) -> Result<Option<Book>> {
        load_book(ctx, &self.book_id).await
    }
}

impl From<BookStatusRecord> for ReadingStatus {
    fn from(r: BookStatusRecord) -> Self {
        Self {
            book_status_id: r.book_status_id,
            book_id: r.book_id,
            total_pages: r.total_pages,
            present_page: r.present_page,
            status: r.status,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Transaction {
    pub transaction_id: String,
    pub book_id: String,
    pub patron_id: String,
    pub checkout_date: NaiveDate,
    /// Due date
    pub return_date: NaiveDate,
    pub returned_at: Option<String>,
    pub fine_amount: i64,
    pub fine_paid: bool,
    pub status: TransactionStatus,
}

#[ComplexObject]
impl Transaction {
    async fn book(&self, ctx: &Context<'_>) -> Result<Option<Book>> {
        load_book(ctx, &self.book_id).await
    }
}

impl From<TransactionRecord> for Transaction {
    fn from(r: TransactionRecord) -> Self {
        Self {
            transaction_id: r.transaction_id,
            book_id: r.book_id,
            patron_id: r.patron_id,
            checkout_date: r.checkout_date,
            return_date: r.return_date,
            returned_at: r.returned_at,
            fine_amount: r.fine_amount,
            fine_paid: r.fine_paid,
            status: r.status,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Review {
    pub review_id: String,
    pub book_id: String,
    pub patron_id: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
}

impl From<ReviewRecord> for Review {
    fn from(r: ReviewRecord) -> Self {
        Self {
            review_id: r.review_id,
            book_id: r.book_id,
            patron_id: r.patron_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

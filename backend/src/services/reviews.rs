//! Book reviews

use crate::db::{CreateReview, Database, ReviewRecord, UserRecord};
use crate::error::{Error, Result};
use crate::services::authorization::{Authorizer, require_patron_owner};

pub const MIN_RATING: i64 = 0;
pub const MAX_RATING: i64 = 5;

pub fn validate_rating(rating: i64) -> Result<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(Error::validation("Rating should be within 0 and 5"))
    }
}

#[derive(Clone)]
pub struct ReviewService {
    db: Database,
    guard: Authorizer,
}

impl ReviewService {
    pub fn new(db: Database) -> Self {
        let guard = Authorizer::new(db.clone());
        Self { db, guard }
    }

    pub async fn create_review(
        &self,
        user: &UserRecord,
        book_id: &str,
        rating: i64,
        comment: &str,
    ) -> Result<ReviewRecord> {
        let patron = self.guard.patron(user).await?;
        validate_rating(rating)?;

        let book = self
            .db
            .books()
            .get(book_id)
            .await?
            .ok_or(Error::NotFound("Book"))?;

        let review = self
            .db
            .reviews()
            .create(&CreateReview {
                book_id: book.book_id,
                patron_id: patron.patron_id,
                rating,
                comment: comment.trim().to_string(),
            })
            .await?;

        tracing::info!(
            review_id = %review.review_id,
            book_id = %review.book_id,
            rating,
            "Review created"
        );
        Ok(review)
    }

    pub async fn delete_review(&self, user: &UserRecord, review_id: &str) -> Result<()> {
        let patron = self.guard.patron(user).await?;
        let reviews = self.db.reviews();
        let review = reviews
            .get(review_id)
            .await?
            .ok_or(Error::NotFound("Review"))?;
        require_patron_owner(&patron, &review.patron_id, "review")?;

        if !reviews.delete(&review.review_id).await? {
            return Err(Error::NotFound("Review"));
        }
        tracing::info!(review_id = %review.review_id, book_id = %review.book_id, "Review deleted");
        Ok(())
    }

    pub async fn reviews_for_book(&self, book_id: &str) -> Result<Vec<ReviewRecord>> {
        Ok(self.db.reviews().list_for_book(book_id).await?)
    }
}

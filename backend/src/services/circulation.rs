//! Circulation: loans, returns, losses and fines
//!
//! All loan operations need the patron role; operations on an existing loan
//! also need the caller to be the loan's patron.

use chrono::{NaiveDate, Utc};

use crate::db::{Database, TransactionRecord, TransactionStatus, UserRecord};
use crate::error::{Error, Result};
use crate::services::authorization::{Authorizer, require_patron_owner};

/// Fine rules, parameterised by the configured amount
#[derive(Debug, Clone, Copy)]
pub struct FinePolicy {
    pub overdue_fine: i64,
}

impl FinePolicy {
    pub fn new(overdue_fine: i64) -> Self {
        Self { overdue_fine }
    }

    /// Fine for a return on `returned_on` of a loan due on `due`
    pub fn for_return(&self, due: NaiveDate, returned_on: NaiveDate) -> i64 {
        if returned_on > due { self.overdue_fine } else { 0 }
    }

    pub fn for_loss(&self) -> i64 {
        self.overdue_fine
    }
}

#[derive(Clone)]
pub struct CirculationService {
    db: Database,
    guard: Authorizer,
    policy: FinePolicy,
}

impl CirculationService {
    pub fn new(db: Database, policy: FinePolicy) -> Self {
        let guard = Authorizer::new(db.clone());
        Self { db, guard, policy }
    }

    pub fn policy(&self) -> FinePolicy {
        self.policy
    }

    /// Lend one copy of the book to the caller until `return_date`
    pub async fn checkout(
        &self,
        user: &UserRecord,
        book_id: &str,
        return_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<TransactionRecord> {
        let patron = self.guard.patron(user).await?;
        if return_date < today {
            return Err(Error::validation("Return date cannot be in the past"));
        }

        let book = self
            .db
            .books()
            .get(book_id)
            .await?
            .ok_or(Error::NotFound("Book"))?;

        let loan = self
            .db
            .transactions()
            .checkout(&book.book_id, &patron.patron_id, today, return_date)
            .await?
            .ok_or_else(|| Error::validation("No copies of this book are available"))?;

        tracing::info!(
            transaction_id = %loan.transaction_id,
            book_id = %book.book_id,
            patron_id = %patron.patron_id,
            "Book checked out"
        );
        Ok(loan)
    }

    pub async fn return_book(
        &self,
        user: &UserRecord,
        transaction_id: &str,
        today: NaiveDate,
    ) -> Result<TransactionRecord> {
        let loan = self.owned_open_loan(user, transaction_id).await?;
        let fine = self.policy.for_return(loan.return_date, today);
        let returned_at = Utc::now().to_rfc3339();

        let loan = self
            .db
            .transactions()
            .close(
                &loan.transaction_id,
                TransactionStatus::Returned,
                Some(&returned_at),
                fine,
                true,
            )
            .await?
            .ok_or_else(not_checked_out)?;

        tracing::info!(transaction_id = %loan.transaction_id, fine, "Book returned");
        Ok(loan)
    }

    /// Close the loan as lost; the copy is not restored
    pub async fn report_lost(
        &self,
        user: &UserRecord,
        transaction_id: &str,
    ) -> Result<TransactionRecord> {
        let loan = self.owned_open_loan(user, transaction_id).await?;

        let loan = self
            .db
            .transactions()
            .close(
                &loan.transaction_id,
                TransactionStatus::Lost,
                None,
                self.policy.for_loss(),
                false,
            )
            .await?
            .ok_or_else(not_checked_out)?;

        tracing::info!(transaction_id = %loan.transaction_id, "Book reported lost");
        Ok(loan)
    }

    pub async fn pay_fine(
        &self,
        user: &UserRecord,
        transaction_id: &str,
    ) -> Result<TransactionRecord> {
        let loan = self.owned_loan(user, transaction_id).await?;
        if loan.fine_amount <= 0 {
            return Err(Error::validation("There is no fine on this transaction"));
        }
        if loan.fine_paid {
            return Err(Error::validation("Fine has already been paid"));
        }

        let loan = self
            .db
            .transactions()
            .pay_fine(&loan.transaction_id)
            .await?
            .ok_or(Error::NotFound("Transaction"))?;

        tracing::info!(
            transaction_id = %loan.transaction_id,
            amount = loan.fine_amount,
            "Fine paid"
        );
        Ok(loan)
    }

    /// The caller's loans, newest first
    pub async fn my_transactions(&self, user: &UserRecord) -> Result<Vec<TransactionRecord>> {
        let patron = self.guard.patron(user).await?;
        Ok(self.db.transactions().list_for_patron(&patron.patron_id).await?)
    }

    async fn owned_loan(
        &self,
        user: &UserRecord,
        transaction_id: &str,
    ) -> Result<TransactionRecord> {
        let patron = self.guard.patron(user).await?;
        let loan = self
            .db
            .transactions()
            .get(transaction_id)
            .await?
            .ok_or(Error::NotFound("Transaction"))?;
        require_patron_owner(&patron, &loan.patron_id, "transaction")?;
        Ok(loan)
    }

    async fn owned_open_loan(
        &self,
        user: &UserRecord,
        transaction_id: &str,
    ) -> Result<TransactionRecord> {
        let loan = self.owned_loan(user, transaction_id).await?;
        if loan.status != TransactionStatus::CheckedOut {
            return Err(not_checked_out());
        }
        Ok(loan)
    }
}

fn not_checked_out() -> Error {
    Error::validation("Transaction is not checked out")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_on_time_return_is_free() {
        let policy = FinePolicy::new(400);
        assert_eq!(policy.for_return(date(2024, 3, 10), date(2024, 3, 9)), 0);
        assert_eq!(policy.for_return(date(2024, 3, 10), date(2024, 3, 10)), 0);
    }

    #[test]
    fn test_late_return_is_fined() {
        let policy = FinePolicy::new(400);
        assert_eq!(policy.for_return(date(2024, 3, 10), date(2024, 3, 11)), 400);
        assert_eq!(policy.for_return(date(2024, 3, 10), date(2024, 6, 1)), 400);
    }

    #[test]
    fn test_loss_uses_configured_amount() {
        assert_eq!(FinePolicy::new(250).for_loss(), 250);
    }
}

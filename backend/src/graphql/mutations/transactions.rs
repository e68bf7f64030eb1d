use chrono::NaiveDate;

use super::prelude::*;
use crate::db::sqlite_helpers::today;

#[derive(Default)]
pub struct TransactionMutations;

#[Object]
impl TransactionMutations {
    /// Borrow a copy until `return_date`
    async fn checkout_book(
        &self,
        ctx: &Context<'_>,
        book_id: String,
        return_date: NaiveDate,
    ) -> Result<Transaction> {
        let user = verify_header(ctx).await?;
        let loan = ctx
            .services()
            .circulation
            .checkout(&user, &book_id, return_date, today())
            .await
            .extend()?;
        Ok(Transaction::from(loan))
    }

    async fn return_book(&self, ctx: &Context<'_>, transaction_id: String) -> Result<Transaction> {
        let user = verify_header(ctx).await?;
        let loan = ctx
            .services()
            .circulation
            .return_book(&user, &transaction_id, today())
            .await
            .extend()?;
        Ok(Transaction::from(loan))
    }

    async fn report_lost(&self, ctx: &Context<'_>, transaction_id: String) -> Result<Transaction> {
        let user = verify_header(ctx).await?;
        let loan = ctx
            .services()
            .circulation
            .report_lost(&user, &transaction_id)
            .await
            .extend()?;
        Ok(Transaction::from(loan))
    }

    async fn pay_fine(&self, ctx: &Context<'_>, transaction_id: String) -> Result<Transaction> {
        let user = verify_header(ctx).await?;
        let loan = ctx
            .services()
            .circulation
            .pay_fine(&user, &transaction_id)
            .await
            .extend()?;
        Ok(Transaction::from(loan))
    }
}

use super::prelude::*;

#[derive(Default)]
pub struct TransactionQueries;

#[Object]
impl TransactionQueries {
    /// Loans of the signed-in patron
    async fn my_transactions(&self, ctx: &Context<'_>) -> Result<Vec<Transaction>> {
        let user = verify_header(ctx).await?;
        let loans = ctx
            .services()
            .circulation
            .my_transactions(&user)
            .await
            .extend()?;
        Ok(loans.into_iter().map(Transaction::from).collect())
    }
}

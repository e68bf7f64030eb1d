pub mod accounts;
pub mod books;
pub mod genres;
pub mod library;
pub mod reviews;
pub mod transactions;

pub use accounts::AccountMutations;
pub use books::BookMutations;
pub use genres::GenreMutations;
pub use library::LibraryMutations;
pub use reviews::ReviewMutations;
pub use transactions::TransactionMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result, ResultExt};

    pub(crate) use crate::graphql::auth::{AuthExt, verify_header};
    pub(crate) use crate::graphql::types::*;
}

pub mod accounts;
pub mod books;
pub mod genres;
pub mod library;
pub mod reviews;
pub mod transactions;

pub use accounts::AccountQueries;
pub use books::BookQueries;
pub use genres::GenreQueries;
pub use library::LibraryQueries;
pub use reviews::ReviewQueries;
pub use transactions::TransactionQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result, ResultExt};

    pub(crate) use crate::graphql::auth::{AuthExt, verify_header};
    pub(crate) use crate::graphql::types::*;
}

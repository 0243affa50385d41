//! MySQL repository implementations

pub mod identity_repository_impl;
pub mod verification_store_impl;

pub use identity_repository_impl::MySqlIdentityRepository;
pub use verification_store_impl::MySqlVerificationStore;

/// Whether a database error is a duplicate key violation (MySQL error 1062)
pub(crate) fn is_duplicate_key(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}

use loyalty_domain::shared::DomainError;

/// Extension trait mapping sqlx results into domain errors
pub trait ResultExt<T> {
    /// Usage: `query.execute(pool).await.map_repo_error("Save user")?`
    fn map_repo_error(self, context: &str) -> Result<T, DomainError>;
}

impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn map_repo_error(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| map_sqlx_error(e, context))
    }
}

/// Unique violations become `ConstraintViolation` so callers can tell a
/// duplicate apart from a broken store.
pub fn map_sqlx_error(err: sqlx::Error, context: &str) -> DomainError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return DomainError::ConstraintViolation(format!("{}: {}", context, db_err));
        }
    }

    match err {
        sqlx::Error::RowNotFound => DomainError::NotFound(format!("{}: row not found", context)),
        other => DomainError::Repository(format!("{}: {}", context, other)),
    }
}

//! Translation of sqlx errors into the application taxonomy.

use foldertree_core::error::{AppError, ErrorKind};

/// SQLite result codes meaning another writer holds the database.
///
/// `SQLITE_BUSY`, `SQLITE_LOCKED`, `SQLITE_BUSY_RECOVERY`,
/// `SQLITE_LOCKED_SHAREDCACHE`, `SQLITE_BUSY_SNAPSHOT`.
const CONTENTION_CODES: &[&str] = &["5", "6", "261", "262", "517"];

/// Map a sqlx error raised while performing `action`.
///
/// Unique violations and lock contention surface as `Conflict`; the
/// transaction that hit them is rolled back by the caller dropping it.
pub fn map_sqlx(action: &str, err: sqlx::Error) -> AppError {
    let conflict = match &err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                || db_err
                    .code()
                    .is_some_and(|code| CONTENTION_CODES.contains(&code.as_ref()))
        }
        _ => false,
    };

    if conflict {
        AppError::with_source(
            ErrorKind::Conflict,
            format!("{action}: conflicting concurrent write ({err})"),
            err,
        )
    } else {
        AppError::with_source(ErrorKind::Database, format!("{action}: {err}"), err)
    }
}

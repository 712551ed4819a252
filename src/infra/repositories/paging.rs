//! Paging and error-mapping helpers shared by the stores.

use sea_orm::{
    sea_query::LikeExpr,
    ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, RuntimeErr, Select,
    SqlErr,
};

use crate::errors::{AppError, AppResult};
use crate::types::{Page, PaginationParams};

/// Run `query` as one page plus a total row count.
pub(crate) async fn fetch_page<C, E>(
    db: &C,
    query: Select<E>,
    params: &PaginationParams,
) -> AppResult<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let paginator = query.paginate(db, params.limit());
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(params.page_index()).await?;
    Ok(Page::new(items, total))
}

/// `%term%` for a LIKE filter, with wildcards inside `term` matched literally.
pub(crate) fn contains_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

/// Map a unique-constraint violation to 409, anything else to a database error.
pub(crate) fn unique_violation(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(message),
        _ => AppError::Database(err),
    }
}

/// Postgres aborted a serializable transaction (SQLSTATE 40001).
pub fn is_serialization_failure(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Exec(e) | DbErr::Query(e) | DbErr::Conn(e) => e,
        _ => return false,
    };
    match runtime {
        RuntimeErr::SqlxError(e) => e
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == "40001"),
        // drivers that only surface the server message
        RuntimeErr::Internal(msg) => msg.contains("could not serialize access"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Alias, Expr, PostgresQueryBuilder, Query};

    fn rendered(term: &str) -> (String, sea_orm::sea_query::Values) {
        Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("villas"))
            .and_where(Expr::col(Alias::new("location")).like(contains_pattern(term)))
            .build(PostgresQueryBuilder)
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        let (sql, values) = rendered("50%_off\\");
        assert!(sql.contains("ESCAPE"));
        assert_eq!(
            values.0,
            vec![sea_orm::Value::String(Some(Box::new("%50\\%\\_off\\\\%".to_string())))]
        );
    }

    #[test]
    fn plain_terms_pass_through() {
        let (_, values) = rendered("crete");
        assert_eq!(
            values.0,
            vec![sea_orm::Value::String(Some(Box::new("%crete%".to_string())))]
        );
    }

    #[test]
    fn serialization_failure_matches_server_message() {
        let aborted = DbErr::Query(RuntimeErr::Internal(
            "could not serialize access due to concurrent update".to_string(),
        ));
        let other = DbErr::Query(RuntimeErr::Internal("deadlock detected".to_string()));
        assert!(is_serialization_failure(&aborted));
        assert!(!is_serialization_failure(&other));
        assert!(!is_serialization_failure(&DbErr::RecordNotFound("x".to_string())));
    }
}

use crate::db::{DbPool, OrmConn};

/// Shared handles for every request: the raw sqlx pool (joins, search,
/// audit log) and the SeaORM connection (entity mutations, transactions).
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn) -> Self {
        Self { pool, orm }
    }
}

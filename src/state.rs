use axum::extract::FromRef;

use crate::{db::DbPool, token::TokenCodec};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub tokens: TokenCodec,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for TokenCodec {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

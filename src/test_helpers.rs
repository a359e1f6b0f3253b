//! In-memory [`GridApi`] double shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::net::api::{ApiError, GridApi};
use crate::net::types::{BrandIcon, GenericIcon, Grid, IconResponse};

#[derive(Default)]
struct FakeState {
    searches: Vec<(String, u32)>,
    saves: Vec<Grid>,
    responses: HashMap<String, IconResponse>,
    search_delays: HashMap<String, Duration>,
    save_delay: Duration,
    failing_saves: usize,
    failing_searches: bool,
}

/// Records every call and answers from canned data.
#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn respond(&self, query: &str, response: IconResponse) {
        self.state().responses.insert(query.to_owned(), response);
    }

    pub(crate) fn delay_search(&self, query: &str, delay: Duration) {
        self.state().search_delays.insert(query.to_owned(), delay);
    }

    pub(crate) fn fail_searches(&self, fail: bool) {
        self.state().failing_searches = fail;
    }

    pub(crate) fn delay_saves(&self, delay: Duration) {
        self.state().save_delay = delay;
    }

    /// Make the next `count` saves fail with HTTP 500.
    pub(crate) fn fail_saves(&self, count: usize) {
        self.state().failing_saves = count;
    }

    pub(crate) fn searches(&self) -> Vec<(String, u32)> {
        self.state().searches.clone()
    }

    /// Grids that were accepted, in landing order.
    pub(crate) fn saves(&self) -> Vec<Grid> {
        self.state().saves.clone()
    }
}

#[async_trait]
impl GridApi for FakeApi {
    async fn search_icons(&self, query: &str, limit: u32) -> Result<IconResponse, ApiError> {
        let delay = {
            let mut state = self.state();
            state.searches.push((query.to_owned(), limit));
            state.search_delays.get(query).copied().unwrap_or_default()
        };
        tokio::time::sleep(delay).await;

        let state = self.state();
        if state.failing_searches {
            return Err(ApiError::Transport("connection reset".to_owned()));
        }
        Ok(state.responses.get(query).cloned().unwrap_or_default())
    }

    async fn update_grid(&self, grid: &Grid) -> Result<(), ApiError> {
        let delay = self.state().save_delay;
        tokio::time::sleep(delay).await;

        let mut state = self.state();
        if state.failing_saves > 0 {
            state.failing_saves -= 1;
            return Err(ApiError::Status { endpoint: "update_grid", status: 500 });
        }
        state.saves.push(grid.clone());
        Ok(())
    }
}

pub(crate) fn brand(slug: &str, hex: &str) -> BrandIcon {
    BrandIcon { slug: slug.to_owned(), hex: hex.to_owned(), title: None }
}

pub(crate) fn generic(name: &str) -> GenericIcon {
    GenericIcon { name: name.to_owned() }
}

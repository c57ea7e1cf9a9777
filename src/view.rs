use crate::error::FetchError;
use crate::models::SearchCategory;

/// Per-view fetch lifecycle. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Loaded(T),
    Errored(String),
}

/// Handle for one issued request. Results are only applied when the ticket
/// still matches the newest issued sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer query superseded this request; its result was discarded.
    Stale,
}

/// Query parameters for a list view. Empty filter with the default category
/// means "fetch the unfiltered list".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: String,
    pub category: SearchCategory,
}

impl ViewQuery {
    pub fn new(filter: impl Into<String>, category: SearchCategory) -> Self {
        Self {
            filter: filter.into(),
            category,
        }
    }
}

/// State machine for a named list view:
/// `Idle -> Loading -> {Loaded | Errored} -> Loading (next query)`.
///
/// Every `begin` bumps a monotonically increasing sequence number; a slow
/// response from an earlier query can therefore never overwrite the result of
/// a later one. Superseded results are discarded on arrival, not cancelled
/// in flight. Errors are terminal for their query; nothing retries here.
#[derive(Debug)]
pub struct ListView<T> {
    state: ViewState<T>,
    issued: u64,
    query: ViewQuery,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ListView<T> {
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
            issued: 0,
            query: ViewQuery::default(),
        }
    }

    /// Starts a new fetch, superseding any request still in flight.
    pub fn begin(&mut self, query: ViewQuery) -> RequestTicket {
        self.issued += 1;
        self.state = ViewState::Loading;
        self.query = query;
        RequestTicket(self.issued)
    }

    /// Applies a fetch outcome if `ticket` is still the newest request.
    pub fn resolve(&mut self, ticket: RequestTicket, result: Result<T, FetchError>) -> Resolution {
        if ticket.0 != self.issued {
            tracing::debug!(
                ticket = ticket.0,
                newest = self.issued,
                "discarding stale view result"
            );
            return Resolution::Stale;
        }
        self.state = match result {
            Ok(data) => ViewState::Loaded(data),
            Err(err) => ViewState::Errored(err.to_string()),
        };
        Resolution::Applied
    }

    /// Like `resolve`, additionally invoking the render or error callback
    /// when the result is applied.
    pub fn resolve_with<R, E>(
        &mut self,
        ticket: RequestTicket,
        result: Result<T, FetchError>,
        mut on_render: R,
        mut on_error: E,
    ) -> Resolution
    where
        R: FnMut(&T),
        E: FnMut(&str),
    {
        let resolution = self.resolve(ticket, result);
        if resolution == Resolution::Applied {
            match &self.state {
                ViewState::Loaded(data) => on_render(data),
                ViewState::Errored(message) => on_error(message),
                _ => {}
            }
        }
        resolution
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match &self.state {
            ViewState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewState::Errored(message) => Some(message),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = ViewState::Idle;
        self.query = ViewQuery::default();
    }
}

use tokio_util::sync::CancellationToken;

///
/// ExecOptions
///
/// Per-call options. `T` is the connection's transaction type.
///

#[derive(Debug)]
pub struct ExecOptions<'a, T> {
    /// Cache key for the prepared statement. `None` or empty compiles the
    /// statement on every call.
    pub prepared: Option<&'a str>,

    /// Caller-owned transaction to run through instead of the connection.
    pub transaction: Option<&'a T>,

    /// Routing hint for drivers that distinguish primaries from replicas.
    /// Opaque to the executor; logged only.
    pub use_primary: bool,

    pub cancel: Option<CancellationToken>,
}

impl<'a, T> ExecOptions<'a, T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prepared: None,
            transaction: None,
            use_primary: false,
            cancel: None,
        }
    }

    #[must_use]
    pub const fn prepared(mut self, name: &'a str) -> Self {
        self.prepared = Some(name);
        self
    }

    #[must_use]
    pub const fn transaction(mut self, tx: &'a T) -> Self {
        self.transaction = Some(tx);
        self
    }

    #[must_use]
    pub const fn use_primary(mut self) -> Self {
        self.use_primary = true;
        self
    }

    #[must_use]
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Cache key, when the call asked for one.
    pub(crate) fn cache_key(&self) -> Option<&'a str> {
        self.prepared.filter(|name| !name.is_empty())
    }

    pub(crate) fn is_canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

impl<T> Default for ExecOptions<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

use smol_str::SmolStr;

use super::controller::StashController;
use super::retry::RetryConfig;
use crate::db::StashBackend;
use crate::db::types::validate_key_part;
use crate::error::StashError;
use crate::stash_value::Document;

pub const DEFAULT_FIELD_NAME: &str = "stash";

/// Setup-time configuration of one stash field on a host record type.
#[derive(Debug, Clone, PartialEq)]
pub struct StashColumn {
    field_name: SmolStr,
    initial_value: Document,
    retry: RetryConfig,
}

impl Default for StashColumn {
    fn default() -> Self {
        Self {
            field_name: SmolStr::new_static(DEFAULT_FIELD_NAME),
            initial_value: Document::new(),
            retry: RetryConfig::default(),
        }
    }
}

impl StashColumn {
    /// The field name becomes part of the storage key and may not be empty
    /// or contain ':'.
    pub fn new(field_name: impl Into<SmolStr>) -> Result<Self, StashError> {
        let field_name = field_name.into();
        validate_key_part(&field_name)?;
        Ok(Self {
            field_name,
            ..Default::default()
        })
    }

    /// Document given to each new record whose field is unset.
    pub fn with_initial_value(mut self, initial_value: Document) -> Self {
        self.initial_value = initial_value;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn initial_value(&self) -> &Document {
        &self.initial_value
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Bind this column to one host record.
    pub fn controller<'a, B: StashBackend>(
        &'a self,
        backend: &'a B,
        record_id: impl Into<SmolStr>,
    ) -> Result<StashController<'a, B>, StashError> {
        StashController::new(backend, self, record_id)
    }

    /// Record-creation hook. Materialises the initial value if the field is
    /// unset and reports whether it did.
    pub fn on_create<B: StashBackend>(
        &self,
        backend: &B,
        record_id: impl Into<SmolStr>,
    ) -> Result<bool, StashError> {
        self.controller(backend, record_id)?.initialize_on_create()
    }
}

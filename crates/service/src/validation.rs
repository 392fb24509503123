//! Field-level input checks collected into a single `ServiceError::Validation`.

use crate::errors::{FieldError, ServiceError};

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self { Self::default() }

    /// Record `message` for `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn non_empty(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, message)
    }

    /// Character count must fall within `min..=max`.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize, message: &str) -> &mut Self {
        let n = value.chars().count();
        self.check(n >= min && n <= max, field, message)
    }

    pub fn push(&mut self, error: FieldError) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Hand back the collected field errors, if any.
    pub fn fields(&mut self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    pub fn finish(&mut self) -> Result<(), ServiceError> {
        self.fields().map_err(ServiceError::Validation)
    }
}

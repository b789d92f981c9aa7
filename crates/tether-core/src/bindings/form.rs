// # Form Binding
//
// Field values, validation errors and a submit gate for one form.
//
// ## Behavior
//
// - Change: replaces one named field, every other field is kept. The
//   merge goes through JSON objects, so a value that does not fit the
//   field's type is rejected and `values` stays as it was.
// - Submit: always prevents the default submission. Runs the validator
//   on the current values; an empty result clears `errors` and calls the
//   submit callback, anything else replaces `errors` and skips it.
// - Reset: restores the initial values and clears `errors`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::lifecycle::Lifecycle;
use crate::state::StateCell;
use crate::{Error, Result};

/// Field name to message
pub type FormErrors = BTreeMap<String, String>;

/// A single field edit
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub name: String,
    pub value: Value,
}

impl FieldChange {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Submission event handed to [`Form::handle_submit`]
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

struct FormInner<T> {
    initial: T,
    values: StateCell<T>,
    errors: StateCell<FormErrors>,
    validate: Box<dyn Fn(&T) -> FormErrors>,
    on_submit: Box<dyn Fn(&T)>,
}

impl<T: Serialize + DeserializeOwned + Clone> FormInner<T> {
    fn handle_change(&self, change: &FieldChange) -> Result<()> {
        let mut fields = match serde_json::to_value(self.values.get())? {
            Value::Object(fields) => fields,
            _ => return Err(Error::invalid_input("form values must serialize to an object")),
        };
        if !fields.contains_key(&change.name) {
            return Err(Error::invalid_input(format!("unknown form field `{}`", change.name)));
        }
        fields.insert(change.name.clone(), change.value.clone());

        let merged: T = serde_json::from_value(Value::Object(fields)).map_err(|e| {
            Error::invalid_input(format!("invalid value for field `{}`: {}", change.name, e))
        })?;
        self.values.set(merged);
        Ok(())
    }

    fn handle_submit(&self, event: &mut SubmitEvent) -> bool {
        event.prevent_default();
        let values = self.values.get();
        let errors = (self.validate)(&values);

        if errors.is_empty() {
            self.errors.set_if_changed(FormErrors::new());
            (self.on_submit)(&values);
            true
        } else {
            tracing::debug!(fields = errors.len(), "form submission rejected by validation");
            self.errors.set(errors);
            false
        }
    }

    fn reset(&self) {
        self.values.set(self.initial.clone());
        self.errors.set_if_changed(FormErrors::new());
    }
}

/// Form state with validation
pub struct Form<T> {
    inner: Rc<FormInner<T>>,
}

impl<T: Serialize + DeserializeOwned + Clone + 'static> Form<T> {
    /// Create a form
    ///
    /// # Parameters
    ///
    /// - `initial`: starting values, restored by [`Form::reset`]
    /// - `validate`: returns an empty map when `values` may be submitted
    /// - `on_submit`: called with the values of every accepted submission
    pub fn new(
        initial: T,
        validate: impl Fn(&T) -> FormErrors + 'static,
        on_submit: impl Fn(&T) + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(FormInner {
                values: StateCell::new(initial.clone()),
                initial,
                errors: StateCell::new(FormErrors::new()),
                validate: Box::new(validate),
                on_submit: Box::new(on_submit),
            }),
        }
    }

    pub fn values(&self) -> T {
        self.inner.values.get()
    }

    pub fn errors(&self) -> FormErrors {
        self.inner.errors.get()
    }

    /// Change counter covering both `values` and `errors`
    pub fn version(&self) -> u64 {
        self.inner.values.version() + self.inner.errors.version()
    }

    /// Merge one field into the values
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` for an unknown field or a value of the
    /// wrong shape.
    pub fn handle_change(&self, change: &FieldChange) -> Result<()> {
        self.inner.handle_change(change)
    }

    /// Validate and, if clean, submit
    ///
    /// # Returns
    ///
    /// Whether the submit callback ran.
    pub fn handle_submit(&self, event: &mut SubmitEvent) -> bool {
        self.inner.handle_submit(event)
    }

    pub fn reset(&self) {
        self.inner.reset();
    }

    /// Cloneable controls for event handlers
    pub fn handle(&self) -> FormHandle<T> {
        FormHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T> Lifecycle for Form<T> {
    fn activate(&mut self) -> Result<()> {
        Ok(())
    }

    fn deactivate(&mut self) {}
}

impl<T: fmt::Debug> fmt::Debug for Form<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("values", &self.inner.values)
            .field("errors", &self.inner.errors)
            .finish()
    }
}

/// Form controls that outlive nothing
///
/// Every call fails with `Error::Disposed` once the form is gone.
pub struct FormHandle<T> {
    inner: Weak<FormInner<T>>,
}

impl<T> Clone for FormHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Serialize + DeserializeOwned + Clone> FormHandle<T> {
    fn live(&self) -> Result<Rc<FormInner<T>>> {
        self.inner.upgrade().ok_or_else(|| {
            tracing::warn!("form handle used after the form was disposed");
            Error::disposed("form")
        })
    }

    pub fn handle_change(&self, change: &FieldChange) -> Result<()> {
        self.live()?.handle_change(change)
    }

    pub fn handle_submit(&self, event: &mut SubmitEvent) -> Result<bool> {
        Ok(self.live()?.handle_submit(event))
    }

    pub fn reset(&self) -> Result<()> {
        self.live()?.reset();
        Ok(())
    }
}

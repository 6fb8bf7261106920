// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converted field views cached on their owning value.
//!
//! Reading a field whose type needs conversion yields a [`ConvertedView`]
//! that is cached on the owning [`Value`] instance: a second read returns
//! the same view, so edits made through one handle are visible through the
//! other. Edits stay in the rich form (and mark the view dirty) until
//! [`Value::apply_changes_from_converted_types`] writes them back.

use crate::convert::{ConversionRegistry, RichValue};
use crate::error::Result;
use crate::value::Value;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct ViewInner {
    field: String,
    rich: Mutex<RichValue>,
    dirty: AtomicBool,
}

/// Shared handle on a cached rich value.
#[derive(Clone)]
pub struct ConvertedView {
    inner: Arc<ViewInner>,
}

impl ConvertedView {
    fn new(field: impl Into<String>, rich: RichValue) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                field: field.into(),
                rich: Mutex::new(rich),
                dirty: AtomicBool::new(false),
            }),
        }
    }

    /// Name of the field this view was read from.
    pub fn field(&self) -> &str {
        &self.inner.field
    }

    /// Snapshot of the rich value.
    pub fn get(&self) -> RichValue {
        self.inner.rich.lock().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&RichValue) -> R) -> R {
        f(&self.inner.rich.lock())
    }

    /// Mutate the rich value in place; marks the view dirty.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut RichValue) -> R) -> R {
        let result = f(&mut self.inner.rich.lock());
        self.inner.dirty.store(true, Ordering::Release);
        result
    }

    /// Replace the rich value; marks the view dirty.
    pub fn set(&self, rich: RichValue) {
        self.with_mut(|slot| *slot = rich);
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::Acquire)
    }

    /// Same cached object (not merely equal content).
    pub fn same_view(&self, other: &ConvertedView) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ConvertedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertedView")
            .field("field", &self.inner.field)
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}

/// A field read through a conversion registry.
#[derive(Debug)]
pub enum FieldValue {
    /// No converter applies: a plain sub-view.
    Raw(Value),
    /// A cached converted view.
    Converted(ConvertedView),
}

impl FieldValue {
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            FieldValue::Raw(value) => Some(value),
            FieldValue::Converted(_) => None,
        }
    }

    pub fn as_converted(&self) -> Option<&ConvertedView> {
        match self {
            FieldValue::Converted(view) => Some(view),
            FieldValue::Raw(_) => None,
        }
    }
}

impl Value {
    /// Read a compound field, converting it when its type (or anything it
    /// contains) has a converter. Converted views are cached per instance.
    pub fn read_field(&self, name: &str, conversions: &ConversionRegistry) -> Result<FieldValue> {
        let field = self.field(name)?;
        if !conversions.needs_conversion(field.descriptor()) {
            return Ok(FieldValue::Raw(field));
        }
        if let Some(view) = self.converted_cache().lock().get(name) {
            return Ok(FieldValue::Converted(view.clone()));
        }

        // Converters run without the cache lock held; they may read fields
        // of this same value.
        let rich = conversions.to_rich(&field)?;
        let view = self
            .converted_cache()
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| ConvertedView::new(name, rich))
            .clone();
        log::trace!(
            "[Value::read_field] cached converted view {}.{}",
            self.type_name(),
            name
        );
        Ok(FieldValue::Converted(view))
    }

    /// Cached converted views of this value.
    pub fn converted_views(&self) -> Vec<ConvertedView> {
        self.converted_cache().lock().values().cloned().collect()
    }

    /// Write every dirty cached view back into the native bytes.
    ///
    /// Until this is called, edits made through converted views are not
    /// visible in the raw representation.
    pub fn apply_changes_from_converted_types(&self, conversions: &ConversionRegistry) -> Result<()> {
        let views = self.converted_views();
        let mut applied = 0usize;
        for view in views.iter().filter(|view| view.is_dirty()) {
            let field = self.field(view.field())?;
            conversions.write_rich(&view.get(), &field)?;
            view.inner.dirty.store(false, Ordering::Release);
            applied += 1;
        }
        log::debug!(
            "[Value::apply_changes_from_converted_types] {}: {} of {} views written back",
            self.type_name(),
            applied,
            views.len()
        );
        Ok(())
    }
}

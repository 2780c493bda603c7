//! Scope guard over a host session that always rolls back.
//!
//! Exporting requires an open session, but nothing done inside it may be
//! persisted to the document. [`ScopedSession`] opens the session on
//! creation and rolls it back on drop, on every exit path including early
//! returns and unwinding. The exported file is outside the document and is
//! unaffected.

use std::ops::{Deref, DerefMut};

use crate::host::{HostDocument, HostError};

pub struct ScopedSession<'a, D: HostDocument + ?Sized> {
    doc: &'a mut D,
    name: String,
}

impl<'a, D: HostDocument + ?Sized> ScopedSession<'a, D> {
    pub fn open(doc: &'a mut D, name: &str) -> Result<Self, HostError> {
        doc.begin_session(name)?;
        tracing::debug!(session = name, "Host session opened");
        Ok(Self {
            doc,
            name: name.to_string(),
        })
    }
}

impl<D: HostDocument + ?Sized> Deref for ScopedSession<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.doc
    }
}

impl<D: HostDocument + ?Sized> DerefMut for ScopedSession<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.doc
    }
}

impl<D: HostDocument + ?Sized> Drop for ScopedSession<'_, D> {
    fn drop(&mut self) {
        self.doc.rollback_session();
        tracing::debug!(session = %self.name, "Host session rolled back");
    }
}

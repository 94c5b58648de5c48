use std::{io::Read, sync::Arc};

use super::Reader;
use crate::{ReferenceSource, ValidationStringency};

/// A CRAM reader builder.
#[derive(Default)]
pub struct Builder {
    reference_source: Option<Arc<dyn ReferenceSource>>,
    validation_stringency: ValidationStringency,
}

impl Builder {
    /// Sets the reference source used to restore read bases.
    pub fn set_reference_source<S>(mut self, reference_source: S) -> Self
    where
        S: ReferenceSource + 'static,
    {
        self.reference_source = Some(Arc::new(reference_source));
        self
    }

    /// Sets how strictly decoded data is validated.
    ///
    /// The default is [`ValidationStringency::Strict`].
    pub fn set_validation_stringency(
        mut self,
        validation_stringency: ValidationStringency,
    ) -> Self {
        self.validation_stringency = validation_stringency;
        self
    }

    /// Builds a reader from a byte stream.
    pub fn build_from_reader<R>(self, inner: R) -> Reader<R>
    where
        R: Read,
    {
        Reader::with(inner, self.reference_source, self.validation_stringency)
    }
}

//! Splitting text elements into characters, words or sentences.

use crate::error::Result;
use crate::sink::Sink;
use crate::stage::Stage;
use std::marker::PhantomData;
use unicode_segmentation::UnicodeSegmentation;

/// Kind of text boundary to split on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// User-perceived characters (extended grapheme clusters)
    Grapheme,
    Word,
    Sentence,
}

/// Finds segment boundaries in a string.
///
/// `locale` is a BCP 47 tag such as `"en-US"`, or `None` for the root locale.
/// Implementations that do not tailor their rules may ignore it.
pub trait Segmenter: Send + Sync {
    fn segments<'a>(
        &self,
        text: &'a str,
        boundary: Boundary,
        locale: Option<&str>,
    ) -> Box<dyn Iterator<Item = &'a str> + 'a>;
}

/// Default boundaries from Unicode Standard Annex #29. Locale independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl Segmenter for UnicodeSegmenter {
    fn segments<'a>(
        &self,
        text: &'a str,
        boundary: Boundary,
        _locale: Option<&str>,
    ) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match boundary {
            Boundary::Grapheme => Box::new(text.graphemes(true)),
            Boundary::Word => Box::new(text.split_word_bounds()),
            Boundary::Sentence => Box::new(text.split_sentence_bounds()),
        }
    }
}

/// Pushes the segments of every incoming string as separate elements.
///
/// Segments made only of whitespace are skipped in word mode and kept
/// otherwise, unless [`Segmenting::skip_blanks`] says differently.
pub struct Segmenting<T, G = UnicodeSegmenter> {
    boundary: Boundary,
    locale: Option<String>,
    skip_blanks: bool,
    segmenter: G,
    _marker: PhantomData<fn(T)>,
}

impl<T> Segmenting<T, UnicodeSegmenter> {
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            locale: None,
            skip_blanks: boundary == Boundary::Word,
            segmenter: UnicodeSegmenter,
            _marker: PhantomData,
        }
    }

    pub fn graphemes() -> Self {
        Self::new(Boundary::Grapheme)
    }

    pub fn words() -> Self {
        Self::new(Boundary::Word)
    }

    pub fn sentences() -> Self {
        Self::new(Boundary::Sentence)
    }
}

impl<T, G> Segmenting<T, G> {
    /// Locale tag handed to the segmenter
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Whether whitespace-only segments are dropped
    pub fn skip_blanks(mut self, skip: bool) -> Self {
        self.skip_blanks = skip;
        self
    }

    /// Find boundaries with `segmenter` instead of the Unicode default rules
    pub fn with_segmenter<H: Segmenter>(self, segmenter: H) -> Segmenting<T, H> {
        Segmenting {
            boundary: self.boundary,
            locale: self.locale,
            skip_blanks: self.skip_blanks,
            segmenter,
            _marker: PhantomData,
        }
    }

    /// Get the kind of segment this stage emits
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }
}

impl<T, G> Stage for Segmenting<T, G>
where
    T: AsRef<str>,
    G: Segmenter,
{
    type Input = T;
    type Output = String;
    type State = ();

    fn name(&self) -> &str {
        match self.boundary {
            Boundary::Grapheme => "graphemes",
            Boundary::Word => "words",
            Boundary::Sentence => "sentences",
        }
    }

    fn initializer(&self) {}

    fn integrate(&self, _: &mut (), element: T, sink: &mut dyn Sink<String>) -> Result<bool> {
        let segments = self
            .segmenter
            .segments(element.as_ref(), self.boundary, self.locale.as_deref());
        for segment in segments {
            if self.skip_blanks && segment.trim().is_empty() {
                continue;
            }
            if !sink.push(segment.to_string()) {
                return Ok(false);
            }
        }
        Ok(!sink.is_rejecting())
    }

    fn is_combinable(&self) -> bool {
        true
    }

    fn combine(&self, _: (), _: ()) -> Result<()> {
        Ok(())
    }
}

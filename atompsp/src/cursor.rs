use types::{PawError, Result};

/// Forward-only reader over a text payload delimited by fixed markers.
///
/// Every read starts at the current position and looks for the first
/// occurrence of a marker after it, so a marker that repeats later in the
/// payload can never pull the cursor backwards.
pub struct MarkerCursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> MarkerCursor<'a> {
    pub fn new(text: &'a str) -> MarkerCursor<'a> {
        MarkerCursor { text, pos: 0 }
    }

    /// Text between the cursor and `marker`; the cursor moves past the marker.
    pub fn take_until(&mut self, marker: &str) -> Result<&'a str> {
        match self.text[self.pos..].find(marker) {
            Some(offset) => {
                let start = self.pos;

                self.pos += offset + marker.len();

                Ok(&self.text[start..start + offset])
            }

            None => Err(PawError::format(
                marker,
                format!("marker '{}' not found", marker),
            )),
        }
    }

    /// Like `take_until`, but a missing marker yields the rest of the text.
    pub fn take_until_or_rest(&mut self, marker: &str) -> &'a str {
        match self.take_until(marker) {
            Ok(s) => s,
            Err(_) => self.take_rest(),
        }
    }

    pub fn take_rest(&mut self) -> &'a str {
        let start = self.pos;

        self.pos = self.text.len();

        &self.text[start..]
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.text[self.pos..].contains(marker)
    }
}

/// Whitespace-separated floats; `context` names the section in errors.
pub fn make_nums(s: &str, context: &str) -> Result<Vec<f64>> {
    s.split_whitespace()
        .map(|t| {
            t.parse::<f64>().map_err(|_| {
                PawError::format(context, format!("token '{}' is not a number", t))
            })
        })
        .collect()
}

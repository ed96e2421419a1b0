use std::fmt;

/// A backend path as a list of segments. Dynamic segments are percent-encoded
/// when the URL is built, so ids like Stripe subscription ids are safe to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    /// Split a literal path such as `/v1/reports/budget` on `/`.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Append one segment verbatim (it may contain `/`).
    #[must_use]
    pub fn push(mut self, segment: impl fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl From<&str> for ApiPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Ordered query parameters. Optional parameters are dropped when `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.pairs.push((name, value.to_string()));
        self
    }

    #[must_use]
    pub fn with_opt<T: fmt::Display>(self, name: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Like [`with_opt`](Self::with_opt) but also drops blank strings.
    #[must_use]
    pub fn with_text(self, name: &'static str, value: Option<&str>) -> Self {
        self.with_opt(name, value.map(str::trim).filter(|v| !v.is_empty()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs.iter().map(|(name, value)| (*name, value.as_str()))
    }
}

/// Limit/offset paging shared by the list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    #[must_use]
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    pub(crate) fn apply(self, query: Query) -> Query {
        query.with("limit", self.limit).with("offset", self.offset)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

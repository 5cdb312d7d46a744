use serde::Serialize;

/// A news headline, most recent first when returned in a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headline {
    pub title: String,
    pub url: String,
}

/// A regulatory filing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filing {
    pub title: String,
    pub url: String,
}

#[cfg(test)]
#[path = "query_type_test.rs"]
mod tests;

use std::fmt;

/// Query types the chat service ships prompt templates for. Any other value is
/// passed through untouched and left to the service to interpret.
pub const QUERY_TYPE_PRESETS: [&str; 4] = ["qa", "technical", "code", "report"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryType(String);

impl Default for QueryType {
    fn default() -> QueryType {
        return QueryType::new(QUERY_TYPE_PRESETS[0]);
    }
}

impl QueryType {
    pub fn new(value: &str) -> QueryType {
        let value = value.trim();
        if value.is_empty() {
            return QueryType::default();
        }

        return QueryType(value.to_string());
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}

/// The "Query type" selector shown in the chat header.
pub struct QuerySelector {
    options: Vec<String>,
    selected: QueryType,
}

impl Default for QuerySelector {
    fn default() -> QuerySelector {
        return QuerySelector::new(QueryType::default());
    }
}

impl QuerySelector {
    pub fn new(selected: QueryType) -> QuerySelector {
        return QuerySelector {
            options: QUERY_TYPE_PRESETS.iter().map(|e| return e.to_string()).collect(),
            selected,
        };
    }

    pub fn options(&self) -> &[String] {
        return &self.options;
    }

    pub fn selected(&self) -> &QueryType {
        return &self.selected;
    }

    pub fn select(&mut self, query_type: QueryType) {
        self.selected = query_type;
    }

    /// Moves to the next preset. A custom query type moves back to the first
    /// preset.
    pub fn next(&mut self) {
        let idx = self
            .options
            .iter()
            .position(|e| return e == self.selected.as_str())
            .map(|idx| return (idx + 1) % self.options.len())
            .unwrap_or(0);

        self.selected = QueryType::new(&self.options[idx]);
    }
}

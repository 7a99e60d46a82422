use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::trace;

use crate::ast::Node;
use crate::error::Result;
use crate::parser::{Parser, Variables};

/// A [`Parser`] that remembers its results per query text and variables.
///
/// Failed parses are not cached.
#[derive(Debug)]
pub struct CachedParser {
    parser: Parser,
    cache: Mutex<AHashMap<String, Node>>,
}

impl CachedParser {
    pub fn new(parser: Parser) -> Self {
        CachedParser {
            parser,
            cache: Mutex::new(AHashMap::new()),
        }
    }

    pub fn parse(&self, query: &str, variables: &Variables) -> Result<Node> {
        let key = cache_key(query, variables);
        if let Some(hit) = self.cache.lock().get(&key) {
            trace!(query, "parser cache hit");
            return Ok(hit.clone());
        }

        let node = self.parser.parse(query, variables)?;
        self.cache.lock().insert(key, node.clone());
        Ok(node)
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn reset(&self) {
        self.cache.lock().clear();
    }
}

fn cache_key(query: &str, variables: &Variables) -> String {
    if variables.is_empty() {
        return query.to_string();
    }
    let variables = serde_json::to_string(variables).unwrap_or_default();
    format!("{query}\u{0}{variables}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{FieldType, TypeConfig};

    fn parser() -> CachedParser {
        CachedParser::new(Parser::new(
            TypeConfig::new().with_field("age", FieldType::Integer),
        ))
    }

    #[test]
    fn test_caches_by_query_and_variables() {
        let parser = parser();
        let first = parser.parse("age:1", &Variables::new()).unwrap();
        let again = parser.parse("age:1", &Variables::new()).unwrap();
        assert_eq!(first, again);
        assert_eq!(parser.len(), 1);

        let mut variables = Variables::new();
        variables.insert("a".into(), json!(2));
        parser.parse("age:$a", &variables).unwrap();
        variables.insert("a".into(), json!(3));
        parser.parse("age:$a", &variables).unwrap();
        assert_eq!(parser.len(), 3);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let parser = parser();
        assert!(parser.parse("age:abc", &Variables::new()).is_err());
        assert!(parser.is_empty());
    }

    #[test]
    fn test_reset() {
        let parser = parser();
        parser.parse("age:1", &Variables::new()).unwrap();
        parser.reset();
        assert!(parser.is_empty());
    }
}

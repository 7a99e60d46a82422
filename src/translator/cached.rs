use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::trace;

use crate::ast::Node;
use crate::translator::{ElasticsearchDsl, Translator, TranslatorOptions};

/// Memoizes translations per query text and options.
///
/// The AST passed alongside the query text must be the parse of that text;
/// the cache never looks at it on a hit.
#[derive(Debug, Default)]
pub struct CachedTranslator {
    cache: Mutex<AHashMap<String, ElasticsearchDsl>>,
}

impl CachedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(
        &self,
        query: &str,
        ast: &Node,
        options: &TranslatorOptions,
    ) -> ElasticsearchDsl {
        let key = format!("{}\u{0}{}", query, options.cache_key());
        if let Some(hit) = self.cache.lock().get(&key) {
            trace!(query, "translator cache hit");
            return hit.clone();
        }

        let dsl = Translator::new(options.clone()).translate(ast);
        self.cache.lock().insert(key, dsl.clone());
        dsl
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Drop every cached translation.
    pub fn reset(&self) {
        self.cache.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Scalar, Term};
    use crate::types::FieldType;

    #[test]
    fn test_cache_and_reset() {
        let translator = CachedTranslator::new();
        let ast = Node::Term(Term::new(Some("a"), FieldType::Integer, Scalar::Integer(1)));
        let options = TranslatorOptions::default();

        let first = translator.translate("a:1", &ast, &options);
        // a different AST under the same key proves the hit
        let second = translator.translate("a:1", &Node::Empty, &options);
        assert_eq!(first, second);
        assert_eq!(translator.len(), 1);

        translator.reset();
        assert!(translator.is_empty());
        let third = translator.translate("a:1", &Node::Empty, &options);
        assert_ne!(first, third);
    }
}

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::client::{AccessChecker, AccessError};
use crate::context::AccessContext;
use crate::types::document::ScoredDocument;

use super::Retriever;

/// Wraps a delegate retriever and keeps only documents the requesting user
/// may access.
///
/// Retrieval without an access context fails with
/// [`AccessError::MissingContext`]; it never proceeds with an unfiltered or
/// default identity. Documents the permission service marks `false` or omits
/// from its results are dropped silently.
pub struct FilteringRetriever {
    checker: Arc<dyn AccessChecker>,
    delegate: Box<dyn Retriever>,
}

impl FilteringRetriever {
    pub fn new(checker: Arc<dyn AccessChecker>, delegate: Box<dyn Retriever>) -> Self {
        Self { checker, delegate }
    }
}

#[async_trait]
impl Retriever for FilteringRetriever {
    async fn retrieve(
        &self,
        query: &str,
        ctx: Option<&AccessContext>,
    ) -> Result<Vec<ScoredDocument>> {
        let candidates = self.delegate.retrieve(query, ctx).await?;

        let ctx = match ctx {
            Some(ctx) => ctx,
            None => return Err(AccessError::MissingContext.into()),
        };

        let ids: Vec<String> = candidates.iter().map(|doc| doc.file_id.clone()).collect();
        let allowed = self.checker.check_access(&ids, &ctx.user_email).await?;

        let mut filtered = Vec::with_capacity(candidates.len());
        for doc in candidates {
            // Absent from the results and explicit false are both "denied".
            match allowed.get(&doc.file_id) {
                Some(true) => filtered.push(doc),
                _ => debug!(
                    "Dropping document '{}' denied for '{}'",
                    doc.file_id, ctx.user_email
                ),
            }
        }

        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    struct StaticRetriever {
        docs: Vec<ScoredDocument>,
    }

    #[async_trait]
    impl Retriever for StaticRetriever {
        async fn retrieve(
            &self,
            _query: &str,
            _ctx: Option<&AccessContext>,
        ) -> Result<Vec<ScoredDocument>> {
            Ok(self.docs.clone())
        }
    }

    struct StaticChecker {
        allowed: HashMap<String, bool>,
        calls: Mutex<Vec<(Vec<String>, String)>>,
    }

    impl StaticChecker {
        fn new(entries: &[(&str, bool)]) -> Self {
            Self {
                allowed: entries
                    .iter()
                    .map(|(id, ok)| (id.to_string(), *ok))
                    .collect(),
                calls: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl AccessChecker for StaticChecker {
        async fn check_access(
            &self,
            document_ids: &[String],
            user_email: &str,
        ) -> Result<HashMap<String, bool>, AccessError> {
            self.calls
                .lock()
                .unwrap()
                .push((document_ids.to_vec(), user_email.to_string()));
            Ok(self.allowed.clone())
        }
    }

    struct FailingChecker;

    #[async_trait]
    impl AccessChecker for FailingChecker {
        async fn check_access(
            &self,
            _document_ids: &[String],
            _user_email: &str,
        ) -> Result<HashMap<String, bool>, AccessError> {
            Err(AccessError::Transport {
                code: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    fn docs(ids: &[&str]) -> Vec<ScoredDocument> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| ScoredDocument::new(*id, format!("chunk {id}"), 1.0 - i as f64 * 0.1))
            .collect()
    }

    fn filtering(checker: Arc<dyn AccessChecker>, ids: &[&str]) -> FilteringRetriever {
        FilteringRetriever::new(checker, Box::new(StaticRetriever { docs: docs(ids) }))
    }

    #[tokio::test]
    async fn test_keeps_only_permitted_in_order() {
        let checker = Arc::new(StaticChecker::new(&[
            ("a", true),
            ("b", false),
            ("c", true),
            ("d", true),
        ]));
        let retriever = filtering(checker.clone(), &["d", "b", "a", "c"]);
        let ctx = AccessContext::new("alice@example.com");

        let result = retriever.retrieve("query", Some(&ctx)).await.unwrap();
        let ids: Vec<&str> = result.iter().map(|d| d.file_id.as_str()).collect();
        assert_eq!(ids, vec!["d", "a", "c"]);
        // Scores pass through untouched.
        assert_eq!(result[0].score, 1.0);

        let calls = checker.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec!["d", "b", "a", "c"]);
        assert_eq!(calls[0].1, "alice@example.com");
    }

    #[tokio::test]
    async fn test_omitted_documents_are_denied() {
        // Service reports a and b only; c must be dropped.
        let checker = Arc::new(StaticChecker::new(&[("a", true), ("b", false)]));
        let retriever = filtering(checker, &["a", "b", "c"]);
        let ctx = AccessContext::new("alice@example.com");

        let result = retriever.retrieve("query", Some(&ctx)).await.unwrap();
        let ids: Vec<&str> = result.iter().map(|d| d.file_id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[tokio::test]
    async fn test_missing_context_fails() {
        let checker = Arc::new(StaticChecker::new(&[("a", true)]));
        let retriever = filtering(checker.clone(), &["a"]);

        let err = retriever.retrieve("query", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AccessError>(),
            Some(AccessError::MissingContext)
        ));
        // The permission service must not be consulted without an identity.
        assert!(checker.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checker_error_propagates() {
        let retriever = filtering(Arc::new(FailingChecker), &["a"]);
        let ctx = AccessContext::new("alice@example.com");

        let err = retriever.retrieve("query", Some(&ctx)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AccessError>(),
            Some(AccessError::Transport { code: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let checker = Arc::new(StaticChecker::new(&[]));
        let retriever = filtering(checker, &[]);
        let ctx = AccessContext::new("alice@example.com");

        let result = retriever.retrieve("query", Some(&ctx)).await.unwrap();
        assert!(result.is_empty());
    }
}

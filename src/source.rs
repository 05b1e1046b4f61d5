use std::future::Future;

use log::info;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use url::Url;

use crate::bank::Question;
use crate::error::GameError;

/// External supplier of question sets. A run cannot start unless a fetch
/// succeeds with a usable set.
pub trait QuestionSource: Send + Sync + 'static {
    fn fetch(
        &self,
        category: &str,
    ) -> impl Future<Output = Result<Vec<Question>, GameError>> + Send;
}

/// Fetches question sets from a remote JSON endpoint, retrying transient
/// failures with backoff before giving up.
pub struct HttpQuestionSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpQuestionSource {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

impl QuestionSource for HttpQuestionSource {
    async fn fetch(&self, category: &str) -> Result<Vec<Question>, GameError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("category", category);

        let retry_strategy = ExponentialBackoff::from_millis(100).map(jitter).take(3);
        let questions: Vec<Question> = Retry::spawn(retry_strategy, || async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await?
                .error_for_status()?;
            response.json::<Vec<Question>>().await
        })
        .await
        .map_err(|e| GameError::SourceUnavailable(e.to_string()))?;

        if questions.is_empty() {
            return Err(GameError::SourceUnavailable(format!(
                "source returned no questions for category '{category}'"
            )));
        }
        info!(
            "Fetched {} questions for category '{category}'",
            questions.len()
        );
        Ok(questions)
    }
}

/// In-process question set, used in local mode and by tests. Fails like the
/// remote source would when the set is empty.
pub struct StaticQuestionSource {
    questions: Vec<Question>,
}

impl StaticQuestionSource {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

impl QuestionSource for StaticQuestionSource {
    async fn fetch(&self, category: &str) -> Result<Vec<Question>, GameError> {
        if self.questions.is_empty() {
            return Err(GameError::SourceUnavailable(format!(
                "no questions available for category '{category}'"
            )));
        }
        Ok(self.questions.clone())
    }
}

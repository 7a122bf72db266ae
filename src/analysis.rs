//! Search, filter, and score tweets through the classification collaborator.

// crates.io
use tracing::warn;
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	sentiment::{SentimentClient, SentimentError},
};

/// One scored tweet projected out of a search result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScoredTweet {
	/// Tweet identifier, in the string form the provider reports.
	pub id: String,
	/// Display name of the author.
	pub user: String,
	/// Tweet text handed to the classifier.
	pub text: String,
	/// Canonical link to the tweet.
	pub url: String,
	/// Label returned by the classifier (`positive`, `negative`, or `neutral`).
	pub sentiment: String,
}

/// Pipeline pairing the REST client with the classification collaborator.
pub struct SentimentPipeline {
	twitter: ApiClient,
	classifier: SentimentClient,
}
impl SentimentPipeline {
	/// Builds a pipeline from an authenticated REST client and a classifier.
	pub fn new(twitter: ApiClient, classifier: SentimentClient) -> Self {
		Self { twitter, classifier }
	}

	/// Runs `search/tweets` with `search_args` and scores the English-language results.
	///
	/// Tweets the classifier rejects are skipped with a warning; transport failures
	/// reaching the classifier abort the run.
	pub fn analyze(&mut self, search_args: &[(&str, Value)]) -> Result<Vec<ScoredTweet>> {
		let tweets = self.twitter.call("search/tweets", search_args, "GET")?;
		let Some(statuses) = tweets.get("statuses").and_then(Value::as_array) else {
			return Ok(Vec::new());
		};
		let mut results = Vec::with_capacity(statuses.len());

		for tweet in statuses {
			if tweet.pointer("/metadata/iso_language_code").and_then(Value::as_str) != Some("en") {
				continue;
			}

			let Some(text) = tweet.get("text").and_then(Value::as_str) else {
				continue;
			};

			match self.classifier.twitter_sentiment(text) {
				Ok(sentiment) => results.push(project(tweet, text, sentiment)),
				Err(SentimentError::Transport(source)) => return Err(source.into()),
				Err(err) => warn!(error = %err, "classifier skipped tweet"),
			}
		}

		Ok(results)
	}
}

fn project(tweet: &Value, text: &str, sentiment: String) -> ScoredTweet {
	let id = tweet.get("id_str").and_then(Value::as_str).unwrap_or_default().to_owned();
	let user =
		tweet.pointer("/user/name").and_then(Value::as_str).unwrap_or_default().to_owned();

	ScoredTweet {
		url: format!("https://twitter.com/{user}/status/{id}"),
		id,
		user,
		text: text.to_owned(),
		sentiment,
	}
}

//! Glossary source that fetches a YAML document over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::base::{config::Config, types::Res};

use super::{GenericGlossarySource, Glossary, GlossaryClient};

// Extra methods on `GlossaryClient` applied by the http implementation.

impl GlossaryClient {
    /// Creates a glossary client that fetches from the configured URL.
    pub fn http(config: &Config) -> Self {
        Self {
            inner: Arc::new(HttpGlossarySource::new(&config.glossary_url)),
        }
    }
}

// Structs.

/// HTTP glossary source.
struct HttpGlossarySource {
    url: String,
    client: reqwest::Client,
}

impl HttpGlossarySource {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GenericGlossarySource for HttpGlossarySource {
    #[instrument(name = "HttpGlossarySource::fetch", skip(self))]
    async fn fetch(&self) -> Res<Glossary> {
        let text = self.client.get(&self.url).send().await?.error_for_status()?.text().await?;
        let glossary = Glossary::from_yaml(&text)?;

        info!("Fetched {} glossary entries.", glossary.entries.len());

        Ok(glossary)
    }
}

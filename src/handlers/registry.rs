use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::traits::{HandlerError, RequestGenerator, ResponseParser};
use super::types::HandledResponse;
use crate::queue::Response;

/// Dispatch table from response type to one parser and any number of generators
#[derive(Clone, Default)]
pub struct ResponseHandler {
    parsers: BTreeMap<String, Arc<dyn ResponseParser>>,
    generators: BTreeMap<String, Vec<Arc<dyn RequestGenerator>>>,
}

impl ResponseHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the parser for `kind`, replacing any previous one
    pub fn register_parser(
        &mut self,
        kind: impl Into<String>,
        parser: impl ResponseParser + 'static,
    ) {
        self.parsers.insert(kind.into(), Arc::new(parser));
    }

    pub fn register_generator(
        &mut self,
        kind: impl Into<String>,
        generator: impl RequestGenerator + 'static,
    ) {
        self.generators
            .entry(kind.into())
            .or_default()
            .push(Arc::new(generator));
    }

    pub fn with_parser(
        mut self,
        kind: impl Into<String>,
        parser: impl ResponseParser + 'static,
    ) -> Self {
        self.register_parser(kind, parser);
        self
    }

    pub fn with_generator(
        mut self,
        kind: impl Into<String>,
        generator: impl RequestGenerator + 'static,
    ) -> Self {
        self.register_generator(kind, generator);
        self
    }

    pub fn has_parser(&self, kind: &str) -> bool {
        self.parsers.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    /// Run generators for the response's type, then its parser
    pub fn handle(&self, response: &Response) -> Result<HandledResponse, HandlerError> {
        let kind = response.item.kind.as_str();

        let mut new_requests = Vec::new();
        for generator in self.generators.get(kind).into_iter().flatten() {
            new_requests.extend(generator.generate(response)?);
        }

        let parser = self
            .parsers
            .get(kind)
            .ok_or_else(|| HandlerError::NoParser(kind.to_string()))?;
        let parsed = parser.parse(response)?;

        debug!(
            kind,
            storage_key = %parsed.storage_key,
            new_requests = new_requests.len(),
            "Response handled"
        );

        Ok(HandledResponse::new(parsed, new_requests))
    }
}

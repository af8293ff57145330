use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct TokenMetrics {
    registry: Registry,
    tokens_issued: IntCounter,
    verifications: IntCounterVec,
}

impl TokenMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let tokens_issued =
            IntCounter::new("tokens_issued_total", "Count of tokens issued successfully")?;
        registry.register(Box::new(tokens_issued.clone()))?;

        let verifications = IntCounterVec::new(
            Opts::new(
                "token_verifications_total",
                "Count of token verifications grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(verifications.clone()))?;

        Ok(Self {
            registry,
            tokens_issued,
            verifications,
        })
    }

    pub fn token_issued(&self) {
        self.tokens_issued.inc();
    }

    pub fn verification(&self, outcome: &str) {
        self.verifications.with_label_values(&[outcome]).inc();
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_by_outcome() {
        let metrics = TokenMetrics::new().expect("metrics");
        metrics.token_issued();
        metrics.verification("valid");
        metrics.verification("Expired");
        metrics.verification("Expired");

        assert_eq!(metrics.tokens_issued.get(), 1);
        assert_eq!(metrics.verifications.with_label_values(&["Expired"]).get(), 2);
        assert_eq!(metrics.verifications.with_label_values(&["valid"]).get(), 1);
    }
}

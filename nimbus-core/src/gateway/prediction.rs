use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::GatewayResult,
    model::{Prediction, PredictionRequest, PredictionResult},
};

use super::read_body;

/// Client for the remote hail prediction model.
#[derive(Debug, Clone)]
pub struct PredictionGateway {
    predict_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    probabilidad_granizo: Option<f64>,
    alerta: Option<String>,
}

impl PredictionGateway {
    pub fn new(predict_url: impl Into<String>) -> Self {
        Self::with_client(predict_url, Client::new())
    }

    pub fn with_client(predict_url: impl Into<String>, http: Client) -> Self {
        Self {
            predict_url: predict_url.into(),
            http,
        }
    }

    /// Ask the model for a hail probability.
    ///
    /// An answer without a probability is [`Prediction::Unavailable`];
    /// only transport, status and decode problems are errors.
    pub async fn predict_hail(&self, request: &PredictionRequest) -> GatewayResult<Prediction> {
        tracing::debug!(url = %self.predict_url, "requesting hail prediction");

        let res = self
            .http
            .post(&self.predict_url)
            .json(request)
            .send()
            .await?;

        let body = read_body(res, "Error del servidor:").await?;
        let parsed: PredictResponse = serde_json::from_str(&body)?;

        let Some(probability) = parsed.probabilidad_granizo else {
            tracing::warn!("prediction response carried no probability");
            return Ok(Prediction::Unavailable);
        };

        Ok(Prediction::Available(PredictionResult {
            probability,
            advisory: parsed.alerta.filter(|a| !a.is_empty()),
        }))
    }
}

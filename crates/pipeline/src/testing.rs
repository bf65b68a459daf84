//! Shared test helpers for pipeline tests.

use ledgerchat_core::{
    Ledger, LedgerRecord, Message, Provider, ProviderError, ProviderRequest, ProviderResponse,
    Usage,
};
use std::sync::Mutex;
use std::time::Duration;

/// A mock provider that returns scripted replies in sequence and records
/// every request it receives.
pub struct ScriptedProvider {
    replies: Vec<String>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        requests.push(request);
        let reply = self.replies.get(call).unwrap_or_else(|| {
            panic!(
                "ScriptedProvider exhausted: call #{call}, have {}",
                self.replies.len()
            )
        });
        Ok(text_response(reply))
    }
}

/// A provider whose every call fails with the same error.
pub struct FailingProvider {
    error: ProviderError,
    calls: Mutex<usize>,
}

impl FailingProvider {
    pub fn new(error: ProviderError) -> Self {
        Self {
            error,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        Err(self.error.clone())
    }
}

/// A provider that answers only after `delay`.
pub struct SlowProvider {
    delay: Duration,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl Provider for SlowProvider {
    fn name(&self) -> &str {
        "slow_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(text_response("tarde"))
    }
}

pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

pub fn record(year: i64, order: &str, amount: f64, provider: &str, department: &str) -> LedgerRecord {
    LedgerRecord {
        year: Some(year),
        purchase_order: Some(order.into()),
        date: Some(format!("{year}-03-01")),
        amount: Some(amount),
        provider: Some(provider.into()),
        department: Some(department.into()),
        file_reference: Some(format!("EXP-{order}")),
    }
}

/// Fifteen Salud purchases in 2022 interleaved with other departments and
/// years, plus rows with non-finite and missing amounts.
pub fn sample_ledger() -> Ledger {
    let mut records = Vec::new();
    for i in 0..15 {
        records.push(record(2022, &format!("S{i}"), 1000.0 + i as f64, "Farmacia Sur", "Salud"));
        records.push(record(2022, &format!("C{i}"), 50.0, "Libreria Norte", "Cultura"));
        records.push(record(2021, &format!("V{i}"), 75.5, "Farmacia Sur", "Salud"));
    }
    records.push(record(2023, "INF", f64::INFINITY, "Proveedor X", "Obras"));
    records.push(record(2023, "NEG", f64::NEG_INFINITY, "Proveedor X", "Obras"));
    records.push(record(2023, "NAN", f64::NAN, "Proveedor X", "Obras"));
    records.push(LedgerRecord {
        year: Some(2023),
        purchase_order: Some("NONE".into()),
        department: Some("Obras".into()),
        ..LedgerRecord::default()
    });
    Ledger::new(records)
}

// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Wires one source to one sink through the decoration mini-language (spec
//! §4.5): a `PipelineRunner` is the production `ManagedComponent` the
//! lifecycle manager actually drives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use tapline_domain::entities::Envelope;
use tapline_domain::error::AgentResult;
use tapline_domain::expression::{evaluate, parse_decoration, EvaluationContext, FunctionBinder, KeyValuePairNode, Value};
use tapline_domain::ports::{Sink, Source};

use crate::application::lifecycle::ManagedComponent;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Renders one decorated output field per envelope and re-serializes the
/// record as a `field=value` line; a pipe with no decoration forwards the
/// record unchanged.
fn decorate(
    decoration: &[KeyValuePairNode],
    binder: &FunctionBinder,
    global_fields: &HashMap<String, String>,
    raw: &str,
) -> String {
    if decoration.is_empty() {
        return raw.to_string();
    }
    let mut ctx = EvaluationContext::new(binder);
    ctx.local_fields.insert("Message".to_string(), Value::String(raw.to_string()));
    for (key, value) in global_fields {
        ctx.global_fields.insert(key.clone(), Value::String(value.clone()));
    }

    decoration
        .iter()
        .map(|pair| format!("{}={}", pair.key, evaluate(&pair.value, &ctx)))
        .collect::<Vec<_>>()
        .join(" ")
}

async fn run_loop(
    name: String,
    source: Arc<dyn Source>,
    sink: Arc<dyn Sink>,
    binder: Arc<FunctionBinder>,
    decoration: Arc<Vec<KeyValuePairNode>>,
    global_fields: Arc<HashMap<String, String>>,
    stopping: Arc<AtomicBool>,
) {
    while !stopping.load(Ordering::SeqCst) {
        match source.poll().await {
            Ok(envelopes) if envelopes.is_empty() => {}
            Ok(envelopes) => {
                let decorated: Vec<Envelope<String>> = envelopes
                    .into_iter()
                    .map(|e| {
                        let text = decorate(&decoration, &binder, &global_fields, e.data());
                        Envelope::new(e.timestamp(), text)
                    })
                    .collect();
                if let Err(err) = sink.send(&decorated).await {
                    tracing::warn!(pipe = %name, error = %err, "sink send failed");
                }
            }
            Err(err) => {
                tracing::warn!(pipe = %name, error = %err, "source poll failed");
            }
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

pub struct PipelineRunner {
    name: String,
    source: Arc<dyn Source>,
    sink: Arc<dyn Sink>,
    binder: Arc<FunctionBinder>,
    decoration: Arc<Vec<KeyValuePairNode>>,
    global_fields: Arc<HashMap<String, String>>,
    stopping: Arc<AtomicBool>,
    task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl PipelineRunner {
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn Source>,
        sink: Arc<dyn Sink>,
        binder: Arc<FunctionBinder>,
        decoration_templates: &[(String, String)],
        global_fields: HashMap<String, String>,
    ) -> AgentResult<Self> {
        let decoration = parse_decoration(decoration_templates)?;
        Ok(Self {
            name: name.into(),
            source,
            sink,
            binder,
            decoration: Arc::new(decoration),
            global_fields: Arc::new(global_fields),
            stopping: Arc::new(AtomicBool::new(false)),
            task: parking_lot::Mutex::new(None),
        })
    }

    #[cfg(test)]
    fn decorate(&self, raw: &str) -> String {
        decorate(&self.decoration, &self.binder, &self.global_fields, raw)
    }
}

#[async_trait]
impl ManagedComponent for PipelineRunner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> AgentResult<()> {
        self.stopping.store(false, Ordering::SeqCst);
        let handle = tokio::spawn(run_loop(
            self.name.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.sink),
            Arc::clone(&self.binder),
            Arc::clone(&self.decoration),
            Arc::clone(&self.global_fields),
            Arc::clone(&self.stopping),
        ));
        *self.task.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self) -> AgentResult<()> {
        self.stopping.store(true, Ordering::SeqCst);
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use tapline_domain::expression::register_builtins;

    struct OnceSource {
        served: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl Source for OnceSource {
        fn name(&self) -> &str {
            "once"
        }
        async fn poll(&self) -> AgentResult<Vec<Envelope<String>>> {
            if self.served.swap(true, Ordering::SeqCst) {
                Ok(Vec::new())
            } else {
                Ok(vec![Envelope::new(Utc::now(), "hello world".to_string())])
            }
        }
    }

    struct CapturingSink {
        captured: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Sink for CapturingSink {
        fn name(&self) -> &str {
            "capturing"
        }
        async fn send(&self, records: &[Envelope<String>]) -> AgentResult<()> {
            let mut captured = self.captured.lock().unwrap();
            captured.extend(records.iter().map(|e| e.data().clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn decoration_renders_templated_fields_from_the_record() {
        let mut binder = FunctionBinder::new();
        register_builtins(&mut binder);
        let binder = Arc::new(binder);

        let source = Arc::new(OnceSource {
            served: std::sync::atomic::AtomicBool::new(false),
        });
        let sink = Arc::new(CapturingSink {
            captured: Mutex::new(Vec::new()),
        });

        let runner = PipelineRunner::new(
            "pipe1",
            source.clone(),
            sink.clone(),
            binder,
            &[("Upper".to_string(), "${to_upper($Message)}".to_string())],
            HashMap::new(),
        )
        .unwrap();

        let envelopes = source.poll().await.unwrap();
        let decorated = runner.decorate(envelopes[0].data());
        assert_eq!(decorated, "Upper=HELLO WORLD");
    }
}

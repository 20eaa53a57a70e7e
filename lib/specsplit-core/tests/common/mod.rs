#![allow(dead_code)]

use std::sync::Mutex;

use rstest::fixture;
use specsplit_core::io::load_document;
use specsplit_core::{
    ComponentId, Document, Node, Reporter, SplitEvent, collect_operation_references,
    collect_path_item_references, collect_references, collect_security_requirements,
};
use tracing::info;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// Builds a document from a JSON value.
pub fn document(value: serde_json::Value) -> anyhow::Result<Document> {
    let node: Node = serde_json::from_value(value)?;
    let document = Document::try_from(node)?;
    Ok(document)
}

#[fixture]
pub fn shop() -> Document {
    init_tracing();
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/shop.yaml");
    match load_document(path) {
        Ok(document) => document,
        Err(error) => panic!("fail to load {path}: {error}"),
    }
}

/// Component names of a document, as pointers, in document order.
pub fn component_pointers(document: &Document) -> Vec<String> {
    document
        .components()
        .iter()
        .map(|(id, _)| id.pointer())
        .collect()
}

/// Every referenced component missing from the document itself.
pub fn dangling_references(document: &Document) -> Vec<ComponentId> {
    let mut found = Vec::new();
    let mut sink = |id: ComponentId| {
        if document.component(&id).is_none() {
            found.push(id);
        }
    };

    for value in document.metadata().values() {
        collect_references(value, &mut sink);
    }
    if let Some(security) = document.security() {
        collect_security_requirements(security, &mut sink);
    }
    for item in document.paths().values() {
        collect_path_item_references(item, &mut sink);
        for operation in item.operations().values() {
            collect_operation_references(operation, &mut sink);
        }
    }
    for (_, definition) in document.components().iter() {
        collect_references(definition, &mut sink);
    }

    found
}

/// Keeps every reported event.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<SplitEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<SplitEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: SplitEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

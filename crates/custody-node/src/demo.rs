//! # Demo Scenario
//!
//! A widget is registered for a manufacturer, handed to a carrier and
//! marked delivered. Notifications travel over the event bus and are
//! collected by a subscriber task.

use std::sync::Arc;

use anyhow::{Context, Result};
use custody_registry::prelude::*;
use shared_bus::{EventFilter, InMemoryEventBus};
use tracing::info;

use crate::script::{run_script, Command, Outcome};

/// Fixed principals used by the demo.
pub mod principals {
    use shared_types::Identity;

    /// Registry admin.
    pub const ADMIN: Identity = Identity::from_low_byte(0xAD);
    /// Manufacturer of the widget.
    pub const MANUFACTURER: Identity = Identity::from_low_byte(0xA0);
    /// Carrier receiving the widget.
    pub const CARRIER: Identity = Identity::from_low_byte(0xB0);
    /// Principal with no rights.
    pub const OUTSIDER: Identity = Identity::from_low_byte(0xEE);
}

/// What the demo did.
#[derive(Debug, Clone)]
pub struct DemoReport {
    /// One outcome per scripted operation.
    pub outcomes: Vec<Outcome>,
    /// Notifications received by the bus subscriber, in order.
    pub events: Vec<LedgerEvent>,
}

/// The scripted operations, one JSON object per line.
///
/// # Errors
///
/// Only if a command fails to serialize.
pub fn demo_script() -> Result<String> {
    use principals::{ADMIN, CARRIER, MANUFACTURER, OUTSIDER};

    let widget = ProductId::FIRST;
    let commands = [
        Command::Register {
            caller: OUTSIDER,
            name: "Widget".into(),
            manufacturer: OUTSIDER,
        },
        Command::Register {
            caller: ADMIN,
            name: "Widget".into(),
            manufacturer: MANUFACTURER,
        },
        Command::Transfer {
            caller: MANUFACTURER,
            id: widget,
            new_owner: CARRIER,
            status: "InTransit".into(),
        },
        Command::Details { id: widget },
        Command::UpdateStatus {
            caller: CARRIER,
            id: widget,
            status: "Delivered".into(),
        },
        Command::Details { id: widget },
        Command::Verify { id: widget },
        Command::Verify { id: widget.next() },
        Command::Total,
    ];

    let mut script = String::new();
    for command in &commands {
        script.push_str(&serde_json::to_string(command).context("serializing demo command")?);
        script.push('\n');
    }
    Ok(script)
}

/// Run the demo on a fresh registry.
///
/// # Errors
///
/// If the registry or the subscriber task cannot be set up.
pub async fn run_demo() -> Result<DemoReport> {
    let bus = Arc::new(InMemoryEventBus::new());
    let mut subscription = bus.subscribe(EventFilter::all());
    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = subscription.recv().await {
            events.push(event);
        }
        events
    });

    let registry = Registry::new(principals::ADMIN).context("creating demo registry")?;
    let service = CustodyService::new(registry, LogicalClock::new(), BusEventSink::new(bus));

    let outcomes = run_script(&service, &demo_script()?).await;
    info!(
        operations = outcomes.len(),
        succeeded = outcomes.iter().filter(|o| o.is_ok()).count(),
        "Demo finished"
    );

    // Dropping the service drops the last bus handle and ends the collector.
    drop(service);
    let events = collector.await.context("joining event collector")?;

    Ok(DemoReport { outcomes, events })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_demo_scenario() {
        let report = run_demo().await.unwrap();
        assert_eq!(report.outcomes.len(), 9);

        // The outsider is refused and does not consume id 1.
        assert!(matches!(
            report.outcomes[0],
            Outcome::Error { kind: ErrorKind::PermissionDenied, .. }
        ));
        assert!(matches!(
            &report.outcomes[1],
            Outcome::Ok { value, .. } if *value == json!({ "id": 1 })
        ));

        match &report.outcomes[3] {
            Outcome::Ok { value, .. } => {
                assert_eq!(value["record"]["current_owner"], principals::CARRIER.to_string());
                assert_eq!(value["history"].as_array().unwrap().len(), 2);
            }
            other => panic!("Expected details, got {other:?}"),
        }
        match &report.outcomes[5] {
            Outcome::Ok { value, .. } => {
                assert_eq!(value["record"]["current_status"], "Delivered");
                assert_eq!(value["record"]["current_owner"], principals::CARRIER.to_string());
                assert_eq!(value["history"].as_array().unwrap().len(), 3);
            }
            other => panic!("Expected details, got {other:?}"),
        }
        assert!(matches!(
            &report.outcomes[6],
            Outcome::Ok { value, .. } if *value == json!({ "exists": true })
        ));
        assert!(matches!(
            &report.outcomes[7],
            Outcome::Ok { value, .. } if *value == json!({ "exists": false })
        ));
        assert!(matches!(
            &report.outcomes[8],
            Outcome::Ok { value, .. } if *value == json!({ "total": 1 })
        ));

        let kinds: Vec<_> = report.events.iter().map(LedgerEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "Registered",
                "StatusChanged",
                "Transferred",
                "StatusChanged",
                "StatusChanged"
            ]
        );
    }
}

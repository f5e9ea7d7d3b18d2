//! # Registry Property Tests
//!
//! Random operation sequences against the pure registry. Whatever mix of
//! valid and invalid calls is applied, ids stay sequential, failed calls
//! change nothing, and every record keeps a consistent history.

use custody_registry::prelude::*;
use proptest::prelude::*;

const ADMIN: Identity = Identity::from_low_byte(0xAD);

#[derive(Debug, Clone)]
enum Op {
    Register { caller: u8, manufacturer: u8, name: String },
    Transfer { caller: u8, id: u64, to: u8, status: String },
    UpdateStatus { caller: u8, id: u64, status: String },
    SetAuthorized { caller: u8, who: u8, flag: bool },
}

/// Small identity space so callers often match owners. 0 is the null identity.
fn ident(tag: u8) -> Identity {
    if tag == 0 {
        Identity::ZERO
    } else {
        Identity::from_low_byte(tag)
    }
}

fn arb_tag() -> impl Strategy<Value = u8> {
    prop_oneof![Just(0u8), Just(0xADu8), 1u8..5]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[A-Za-z]{1,8}"]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (arb_tag(), arb_tag(), arb_text()).prop_map(|(caller, manufacturer, name)| Op::Register {
            caller,
            manufacturer,
            name
        }),
        (arb_tag(), 0u64..6, arb_tag(), arb_text())
            .prop_map(|(caller, id, to, status)| Op::Transfer { caller, id, to, status }),
        (arb_tag(), 0u64..6, arb_text())
            .prop_map(|(caller, id, status)| Op::UpdateStatus { caller, id, status }),
        (arb_tag(), arb_tag(), any::<bool>())
            .prop_map(|(caller, who, flag)| Op::SetAuthorized { caller, who, flag }),
    ]
}

fn apply(reg: &mut Registry, op: &Op, now: Timestamp) -> Result<Vec<LedgerEvent>, RegistryError> {
    match op {
        Op::Register {
            caller,
            manufacturer,
            name,
        } => reg
            .register(ident(*caller), name, ident(*manufacturer), now)
            .map(|r| r.events),
        Op::Transfer {
            caller,
            id,
            to,
            status,
        } => reg
            .transfer(ident(*caller), ProductId(*id), ident(*to), status, now)
            .map(|r| r.events),
        Op::UpdateStatus { caller, id, status } => reg
            .update_status(ident(*caller), ProductId(*id), status, now)
            .map(|r| r.events),
        Op::SetAuthorized { caller, who, flag } => reg
            .set_authorized(ident(*caller), ident(*who), *flag)
            .map(|()| Vec::new()),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_random_sequences_preserve_invariants(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut reg = Registry::new(ADMIN).unwrap();
        let mut issued: Vec<ProductId> = Vec::new();

        for (step, op) in ops.iter().enumerate() {
            let before = reg.snapshot();
            let now = step as Timestamp + 1;

            match apply(&mut reg, op, now) {
                Ok(events) => {
                    if matches!(op, Op::Register { .. }) {
                        let id = events[0].product_id();
                        prop_assert_eq!(id.get(), issued.len() as u64 + 1, "ids must be sequential");
                        issued.push(id);
                    }
                    for event in &events {
                        prop_assert!(reg.verify(event.product_id()));
                    }
                }
                Err(_) => {
                    prop_assert_eq!(reg.snapshot(), before, "failed call mutated state");
                }
            }
        }

        prop_assert_eq!(reg.total_count(), issued.len() as u64);
        for id in &issued {
            let details = reg.details(*id).unwrap();
            prop_assert!(check_record_invariants(&details.record, &details.history).is_valid());
        }
        prop_assert!(!reg.verify(ProductId(issued.len() as u64 + 1)));
        prop_assert!(!reg.verify(ProductId(0)));

        // The full state always survives a snapshot round trip.
        let restored = Registry::restore(reg.snapshot()).unwrap();
        prop_assert_eq!(restored.snapshot(), reg.snapshot());
    }

    #[test]
    fn test_update_status_never_moves_custody(statuses in prop::collection::vec("[A-Za-z]{1,8}", 1..10)) {
        let owner = Identity::from_low_byte(1);
        let mut reg = Registry::new(ADMIN).unwrap();
        let id = reg.register(ADMIN, "Widget", owner, 1).unwrap().value;

        for (i, status) in statuses.iter().enumerate() {
            reg.update_status(owner, id, status, i as Timestamp + 2).unwrap();
            let details = reg.details(id).unwrap();
            prop_assert_eq!(details.record.current_owner, owner);
            prop_assert_eq!(&details.record.current_status, status);
            let last = details.history.last().unwrap();
            prop_assert_eq!(last.from, Some(owner));
            prop_assert_eq!(last.to, owner);
        }
        prop_assert_eq!(reg.history(id).unwrap().len(), statuses.len() + 1);
    }
}

use ev_modules_api::default_context::DefaultContext;
use ev_modules_api::{Address, Context, Module, WorkingSet};
use ev_state::{InMemoryStorage, Storage};
use ev_voter_registry::{CallMessage, RegistryError, VoterRegistry, VoterRegistryConfig};
use proptest::prelude::*;

type C = DefaultContext;

const ADMIN: Address = Address::new([1; 32]);

fn deployed() -> (VoterRegistry<C>, InMemoryStorage) {
    let registry = VoterRegistry::<C>::default();
    let mut storage = InMemoryStorage::new();
    let mut working_set = WorkingSet::new(storage.clone());
    registry
        .genesis(&VoterRegistryConfig { admin: ADMIN }, &mut working_set)
        .unwrap();
    storage.commit(working_set.checkpoint().freeze());
    (registry, storage)
}

#[test]
fn failed_registration_leaves_first_record_untouched() {
    let (registry, mut storage) = deployed();
    let admin = C::new(ADMIN, 0);
    let voter = Address::from([7; 32]);

    let mut working_set = WorkingSet::new(storage.clone());
    registry
        .call(
            CallMessage::RegisterVoter {
                voter,
                personal_id: "CIN123".to_owned(),
                full_name: "John Doe".to_owned(),
            },
            &admin,
            &mut working_set,
        )
        .unwrap();
    storage.commit(working_set.checkpoint().freeze());

    let mut working_set = WorkingSet::new(storage.clone());
    let err = registry
        .call(
            CallMessage::RegisterVoter {
                voter,
                personal_id: "CIN999".to_owned(),
                full_name: "Somebody Else".to_owned(),
            },
            &admin,
            &mut working_set,
        )
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<RegistryError>(),
        Some(&RegistryError::AlreadyRegistered)
    );
    working_set.revert();

    let mut working_set = WorkingSet::new(storage);
    let details = registry.get_voter_details(&voter, &mut working_set);
    assert_eq!(details.personal_id, "CIN123");
    assert_eq!(details.full_name, "John Doe");
}

#[test]
fn call_messages_round_trip_through_json() {
    let message = CallMessage::<C>::RegisterVoter {
        voter: Address::from([7; 32]),
        personal_id: "CIN123".to_owned(),
        full_name: "John Doe".to_owned(),
    };

    let json = serde_json::to_string(&message).unwrap();
    assert!(json.contains("register_voter"));
    assert_eq!(serde_json::from_str::<CallMessage<C>>(&json).unwrap(), message);
}

proptest! {
    #[test]
    fn second_registration_of_same_identity_fails(
        seed in any::<[u8; 32]>(),
        first_id in "[A-Z]{2}[0-9]{6}",
        second_id in "[A-Z]{2}[0-9]{6}",
    ) {
        let (registry, storage) = deployed();
        let admin = C::new(ADMIN, 0);
        let voter = Address::from(seed);
        let mut working_set = WorkingSet::new(storage);

        let register = |personal_id: String| CallMessage::RegisterVoter {
            voter,
            personal_id,
            full_name: "Jane Roe".to_owned(),
        };

        registry.call(register(first_id.clone()), &admin, &mut working_set).unwrap();
        let err = registry.call(register(second_id), &admin, &mut working_set).unwrap_err();

        prop_assert_eq!(err.downcast_ref::<RegistryError>(), Some(&RegistryError::AlreadyRegistered));
        prop_assert_eq!(registry.get_voter_details(&voter, &mut working_set).personal_id, first_id);
        prop_assert_eq!(registry.voter_count(&mut working_set), 1);
    }
}

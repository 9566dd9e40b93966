//! Keychain persistence against the real platform backend
//!
//! Ignored by default: it needs an unlocked keychain (Keychain Services,
//! Windows Credential Manager or a Secret Service daemon). Run with
//! `cargo test -p lapi-infra --test keychain_persistence -- --ignored`.

use keyring::Entry;
use lapi_core::CredentialStore;
use lapi_domain::Environment;
use lapi_infra::KeychainCredentialStore;

#[test]
#[ignore = "requires a platform keychain"]
fn stored_fields_survive_a_new_store_instance() {
    let writer = KeychainCredentialStore::new(Environment::Dev).expect("keychain should open");
    writer.store_machine_id("persisted-machine").expect("machine id should be stored");
    writer.store_scenarios(&["crowdsecurity/ssh-bf".to_string()]).expect("scenarios should be stored");
    drop(writer);

    let reader = KeychainCredentialStore::new(Environment::Dev).expect("keychain should reopen");
    let machine_id = reader.retrieve_machine_id();
    let scenarios = reader.retrieve_scenarios();

    for key in ["machine-id", "scenarios"] {
        if let Ok(entry) = Entry::new(reader.service_name(), key) {
            let _ = entry.delete_credential();
        }
    }

    assert_eq!(machine_id.unwrap().as_deref(), Some("persisted-machine"));
    assert_eq!(scenarios.unwrap(), Some(vec!["crowdsecurity/ssh-bf".to_string()]));
}

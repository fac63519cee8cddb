use avm_ledger::{ChainConfig, ChainError};
use avm_types::Name;

#[test]
fn default_config_is_valid() {
    let config = ChainConfig::default();
    config.validate().expect("default validates");
    assert_eq!(config.max_inline_action_depth, 4);
    assert_eq!(config.max_inline_action_size, 4096);
    assert!(!config.authorization.allow_unused_keys);
}

#[test]
fn devnet_relaxes_limits() {
    let config = ChainConfig::devnet();
    config.validate().expect("devnet validates");
    assert!(config.max_inline_action_depth > ChainConfig::default().max_inline_action_depth);
    assert!(config.authorization.allow_unused_keys);
}

#[test]
fn zero_limits_are_rejected() {
    let mut config = ChainConfig::default();
    config.max_inline_action_size = 0;
    assert!(matches!(config.validate(), Err(ChainError::InvalidConfig(_))));

    let mut config = ChainConfig::default();
    config.authorization.max_authority_depth = 0;
    assert!(matches!(config.validate(), Err(ChainError::InvalidConfig(_))));

    let mut config = ChainConfig::default();
    config.authorization.active_permission = Name::EMPTY;
    assert!(matches!(config.validate(), Err(ChainError::InvalidConfig(_))));

    let mut config = ChainConfig::default();
    config.session.row_cache_capacity = 0;
    assert!(matches!(config.validate(), Err(ChainError::InvalidConfig(_))));
}

#[test]
fn config_loads_from_json() {
    let json = serde_json::to_string(&ChainConfig::devnet()).expect("serialize");
    assert!(json.contains("\"active_permission\":\"active\""));
    let back: ChainConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, ChainConfig::devnet());
}

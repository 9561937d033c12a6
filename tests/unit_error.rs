use std::path::PathBuf;

use todo_list::error::{exit_codes, Error};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let config = Error::InvalidConfig("store.key cannot be empty".to_string());
    assert_eq!(config.exit_code(), exit_codes::USER_ERROR);

    let lock = Error::LockFailed(PathBuf::from("/tmp/store.json.lock"));
    assert_eq!(lock.exit_code(), exit_codes::OPERATION_FAILED);

    let save = Error::SaveFailed("disk full".to_string());
    assert_eq!(save.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn messages_name_the_failure() {
    let err = Error::InvalidConfig("ui.poll_ms must be between 10 and 2000".to_string());
    assert_eq!(
        err.to_string(),
        "Invalid configuration: ui.poll_ms must be between 10 and 2000"
    );

    let lock = Error::LockFailed(PathBuf::from("/tmp/store.json.lock"));
    assert!(lock.to_string().contains("/tmp/store.json.lock"));

    let io: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
    assert_eq!(io.exit_code(), exit_codes::OPERATION_FAILED);
}

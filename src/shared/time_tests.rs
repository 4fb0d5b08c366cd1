use crate::shared::time::{instant_epoch_seconds, wallclock_instant};

#[test]
fn parses_plain_integers_as_epoch_seconds() {
    assert_eq!(instant_epoch_seconds("100"), Some(100));
    assert_eq!(instant_epoch_seconds("0"), Some(0));
    assert_eq!(instant_epoch_seconds("1700000000"), Some(1_700_000_000));
}

#[test]
fn parses_wallclock_format() {
    // 2024-01-02 03:04:05.678 UTC
    let secs = instant_epoch_seconds("20240102030405678").unwrap();
    assert_eq!(secs, 1_704_164_645);
}

#[test]
fn rejects_non_numeric_timestamps() {
    assert_eq!(instant_epoch_seconds(""), None);
    assert_eq!(instant_epoch_seconds("abc"), None);
    assert_eq!(instant_epoch_seconds("100x"), None);
}

#[test]
fn wallclock_instants_are_sortable_and_parseable() {
    let a = wallclock_instant();
    assert_eq!(a.len(), 17);
    assert!(instant_epoch_seconds(&a).is_some());
    let b = wallclock_instant();
    assert!(a <= b);
}

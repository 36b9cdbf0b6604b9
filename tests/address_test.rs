extern crate rosc_rt;

use rosc_rt::address::pattern_match;

#[test]
fn matches_plain_path() {
    assert!(pattern_match(
        "/oscillator/1/frequency",
        "/oscillator/1/frequency"
    ));
    assert!(!pattern_match(
        "/oscillator/1/frequency",
        "/oscillator/1/phase"
    ));
    assert!(!pattern_match(
        "/oscillator/1/frequency",
        "/oscillator/1/frequencyfoo"
    ));
    assert!(!pattern_match(
        "/oscillator/1/frequency",
        "/prefix/oscillator/1/frequency"
    ));
}

#[test]
fn choice() {
    assert!(pattern_match("/foo{bar,baz}", "/foobar"));
    assert!(pattern_match("/foo{bar,baz}", "/foobaz"));
    assert!(pattern_match("/foo{bar,baz,tron}", "/footron"));
}

#[test]
fn character_class_ranges() {
    assert!(pattern_match("/oscillator/[0-9]", "/oscillator/0"));
    assert!(pattern_match("/oscillator/[0-9]", "/oscillator/6"));
    assert!(pattern_match("/oscillator/[0-9]", "/oscillator/9"));

    // an inverted range endpoint pair is tolerated the same as a sorted one
    assert!(pattern_match("/oscillator/[9-0]", "/oscillator/0"));
    assert!(pattern_match("/oscillator/[9-0]", "/oscillator/6"));

    assert!(pattern_match("/oscillator/[a-zA-Z0-9]", "/oscillator/0"));
    assert!(pattern_match("/oscillator/[a-zA-Z0-9]", "/oscillator/a"));
    assert!(pattern_match("/oscillator/[a-zA-Z0-9]", "/oscillator/A"));

    assert!(!pattern_match("/oscillator/[!0-9]", "/oscillator/1"));
    assert!(pattern_match("/oscillator/[!0-9]", "/oscillator/a"));
}

#[test]
fn single_wildcard_matches_one_character_not_a_slash() {
    assert!(pattern_match(
        "/oscillator/?/frequency",
        "/oscillator/1/frequency"
    ));
    assert!(pattern_match(
        "/oscillator/?/frequency",
        "/oscillator/F/frequency"
    ));
    assert!(!pattern_match(
        "/oscillator/?/frequency",
        "/oscillator//frequency"
    ));
    assert!(!pattern_match(
        "/oscillator/?/frequency",
        "/oscillator/10/frequency"
    ));

    assert!(pattern_match(
        "/oscillator/??/frequency",
        "/oscillator/10/frequency"
    ));
    assert!(!pattern_match(
        "/oscillator/??/frequency",
        "/oscillator/1/frequency"
    ));
}

#[test]
fn star_wildcard_stops_at_path_boundary() {
    assert!(pattern_match(
        "/oscillator/*/frequency",
        "/oscillator/anything123/frequency"
    ));
    assert!(!pattern_match(
        "/oscillator/*/frequency",
        "/oscillator/extra/part/frequency"
    ));
    assert!(!pattern_match(
        "/oscillator/*/frequency",
        "/oscillator//frequency"
    ));

    assert!(pattern_match(
        "/oscillator/*bar/frequency",
        "/oscillator/foobar/frequency"
    ));
    assert!(pattern_match(
        "/oscillator/*bar/frequency",
        "/oscillator/foobarbar/frequency"
    ));
}

#[test]
fn star_mixed_with_class_and_choice() {
    assert!(pattern_match(
        "/oscillator/*[a-d]/frequency",
        "/oscillator/a/frequency"
    ));
    assert!(pattern_match(
        "/oscillator/*[a-d]/frequency",
        "/oscillator/fooa/frequency"
    ));
    assert!(!pattern_match(
        "/oscillator/*[a-d]/frequency",
        "/oscillator/foox/frequency"
    ));

    assert!(pattern_match(
        "/oscillator/*{bar,baz}/frequency",
        "/oscillator/foobar/frequency"
    ));
    assert!(pattern_match(
        "/oscillator/*{bar,baz}/frequency",
        "/oscillator/baz/frequency"
    ));
    assert!(!pattern_match(
        "/oscillator/*{bar,baz}/frequency",
        "/oscillator/something/frequency"
    ));
}

#[test]
fn allowed_literal_characters_pass_through_untouched() {
    let literal =
        "/!\"$%&'()+-./0123456789:;<=>@ABCDEFGHIJKLMNOPQRSTUVWXYZ^_`abcdefghijklmnopqrstuvwxyz|~";
    assert!(pattern_match(literal, literal));
}

#[test]
fn malformed_pattern_fails_closed_rather_than_panicking() {
    assert!(!pattern_match("/unclosed/[range-", "/unclosed/a"));
    assert!(!pattern_match("/{unclosed,alternative", "/unclosed"));
}

use super::*;

fn scrubber() -> Scrubber {
    Scrubber::new().unwrap()
}

const PATCH_NA: ScrubOptions = ScrubOptions {
    patch_na: true,
    accept_unit_moves: false,
};

#[test]
fn normalize_line_trims_and_collapses_runs() {
    let scrubber = scrubber();
    assert_eq!(
        scrubber.normalize_line("  Tribe 0987,\t\t,  Current Hex =   QQ 0909 \r"),
        "Tribe 0987, , Current Hex = QQ 0909"
    );
}

#[test]
fn scrub_keeps_only_mapping_lines() {
    let lines = vec![
        "Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)",
        "Current Turn 899-12 (#0), Winter, FINE",
        "Goods: 100 provisions",
        "Tribe Movement: Move N-GH",
        "Tribe Follows 0987e1",
        "Scout 1:Scout N-PR, Nothing of interest found",
        "Scout 9:Scout N-PR",
        "0987 Status: PRAIRIE, 0987",
        "0987c1 Status: PRAIRIE, 0987c1",
        "",
    ];

    let scrubbed = scrubber().scrub(lines, &ScrubOptions::default());
    assert_eq!(
        scrubbed,
        vec![
            "Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)",
            "Current Turn 899-12 (#0), Winter, FINE",
            "Tribe Movement: Move N-GH",
            "Scout 1:Scout N-PR, Nothing of interest found",
            "0987 Status: PRAIRIE, 0987",
            "0987c1 Status: PRAIRIE, 0987c1",
        ]
    );
}

#[test]
fn unit_moves_are_kept_on_request() {
    let options = ScrubOptions {
        patch_na: false,
        accept_unit_moves: true,
    };
    let lines = vec![
        "Tribe Follows 0987e1",
        "Tribe Goes to QQ 1010",
        "CALM NE Fleet Movement: Move NE-O",
        "HURRICANE NE Fleet Movement: Move NE-O",
    ];

    let scrubbed = scrubber().scrub(lines, &options);
    assert_eq!(scrubbed.len(), 3);
}

#[test]
fn patch_na_copies_the_current_hex() {
    let scrubbed = scrubber().scrub(
        ["Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = N/A)"],
        &PATCH_NA,
    );
    assert_eq!(
        scrubbed,
        vec!["Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 0909)"]
    );
}

#[test]
fn patch_na_is_off_by_default() {
    let line = "Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = N/A)";
    let scrubbed = scrubber().scrub([line], &ScrubOptions::default());
    assert_eq!(scrubbed, vec![line]);
}

#[test]
fn patch_na_leaves_units_that_moved_alone() {
    let lines = [
        "Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = N/A)",
        "Tribe Movement: Move N-GH, \\N-JH",
        "Tribe 1987, , Current Hex = QQ 0505, (Previous Hex = N/A)",
        "Tribe Movement: Move \\",
    ];

    let scrubbed = scrubber().scrub(lines, &PATCH_NA);
    assert_eq!(
        scrubbed[0],
        "Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = N/A)"
    );
    assert_eq!(
        scrubbed[2],
        "Tribe 1987, , Current Hex = QQ 0505, (Previous Hex = QQ 0505)"
    );
}

#[test]
fn scrubbing_twice_changes_nothing() {
    let lines = [
        "\tTribe 0987,  ,\tCurrent Hex = QQ 0909, (Previous Hex = N/A)  ",
        "CALM NE Fleet Movement: Move NE-O",
        "Fleet 0987f1, , Current Hex = QQ 0303, (Previous Hex = N/A)",
        "CALM NE Fleet Movement: Move NE-O, \\NE-O",
        "Scout 1:Scout  N-PR,\t\tNothing of interest found",
        "random chatter",
    ];

    for options in [
        ScrubOptions::default(),
        PATCH_NA,
        ScrubOptions {
            patch_na: true,
            accept_unit_moves: true,
        },
    ] {
        let scrubber = scrubber();
        let once = scrubber.scrub(lines, &options);
        let twice = scrubber.scrub(once.iter().map(String::as_str), &options);
        assert_eq!(once, twice);
    }
}

#[test]
fn render_lines_terminates_every_line() {
    let lines = vec!["a".to_string(), "b".to_string()];
    assert_eq!(render_lines(&lines), b"a\nb\n");
    assert!(render_lines(&[]).is_empty());
}

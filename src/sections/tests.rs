use super::*;

const TWO_UNITS: &str = "\
Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)
Current Turn 899-12 (#0), Winter, FINE Next Turn 900-01 (#1), 28/11/2025
Goods: 100 provisions
Tribe Movement: Move N-GH, \\N-JH, LJm NW
Scout 1:Scout N-PR, , L SW,River N NE\\,No Ford on River to N of HEX, Nothing of interest found
0987 Status: PRAIRIE, 0987
Weather report that belongs to nobody
Courier 0987c1, , Current Hex = QQ 0808, (Previous Hex = QQ 0808)
Current Turn 899-12 (#0), Winter, FINE
0987c1 Scry: something
0987c1 Status: PRAIRIE, 0987c1
";

fn splitter() -> Splitter {
    Splitter::new().unwrap()
}

#[test]
fn split_buckets_relevant_lines_by_unit_in_input_order() {
    let report = splitter().split(TWO_UNITS, &SplitOptions::default()).unwrap();

    assert_eq!(report.turn, TurnStamp::new(899, 12).unwrap());
    let ids: Vec<&str> = report.sections.iter().map(|s| s.unit_id.as_str()).collect();
    assert_eq!(ids, vec!["0987", "0987c1"]);

    let clan = &report.sections[0];
    assert_eq!(clan.kind, UnitKind::Clan);
    assert_eq!(clan.lines.len(), 5);
    assert!(clan.lines.iter().all(|line| !line.starts_with("Goods")));
    assert!(clan.lines[4].starts_with("0987 Status:"));

    let courier = &report.sections[1];
    assert_eq!(courier.kind, UnitKind::Courier);
    assert_eq!(courier.lines.len(), 4);
    assert_eq!(courier.lines[2], "0987c1 Scry: something");
}

#[test]
fn tribes_without_a_leading_zero_are_tribes() {
    let text = "Tribe 1987, , Current Hex = QQ 0909, (Previous Hex = QQ 0909)\n\
                Current Turn 900-01 (#1), Spring, FINE\n";
    let report = splitter().split(text, &SplitOptions::default()).unwrap();
    assert_eq!(report.sections[0].kind, UnitKind::Tribe);
}

#[test]
fn scry_lines_can_be_dropped() {
    let options = SplitOptions {
        keep_scry_lines: false,
    };
    let report = splitter().split(TWO_UNITS, &options).unwrap();
    assert_eq!(report.sections[1].lines.len(), 3);
}

#[test]
fn lines_after_a_status_line_are_ignored_until_the_next_header() {
    let text = "Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)\n\
                Current Turn 899-12 (#0), Winter, FINE\n\
                0987 Status: PRAIRIE, 0987\n\
                Tribe Movement: Move N-GH\n";
    let report = splitter().split(text, &SplitOptions::default()).unwrap();
    assert_eq!(report.sections[0].lines.len(), 3);
}

#[test]
fn differing_turns_are_rejected() {
    let text = "Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)\n\
                Current Turn 899-12 (#0), Winter, FINE\n\
                Tribe 1987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)\n\
                Current Turn 900-01 (#1), Spring, FINE\n";
    let err = splitter().split(text, &SplitOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "invalid report: multiple turns");
}

#[test]
fn text_without_headers_has_no_sections() {
    let err = splitter()
        .split("Current Turn 899-12 (#0), Winter, FINE\n", &SplitOptions::default())
        .unwrap_err();
    assert_eq!(err, SplitError::NoSections);
    assert_eq!(err.to_string(), "invalid report: no sections");
}

#[test]
fn a_section_without_a_turn_line_has_no_turn_info() {
    let text = "Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)\n\
                Current Turn 899-12 (#0), Winter, FINE\n\
                Element 0987e1, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)\n";
    let err = splitter().split(text, &SplitOptions::default()).unwrap_err();
    assert_eq!(err, SplitError::NoTurnInfo);
}

#[test]
fn report_lines_concatenate_sections() {
    let report = splitter().split(TWO_UNITS, &SplitOptions::default()).unwrap();
    assert_eq!(report.lines().count(), 9);
}

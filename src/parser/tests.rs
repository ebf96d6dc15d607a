use super::*;
use crate::hexes::{Direction, Edge};
use crate::model::{
    Blocker, MoveMode, ObservationKind, Patrol, Sighting, StepOutcome, Thing, TurnStamp, UnitId,
    UnitKind, Water, Wind,
};
use crate::terrain::Terrain;

fn parser() -> ReportParser {
    ReportParser::new(ParseOptions::default()).unwrap()
}

fn grid(text: &str) -> Coords {
    Coords::parse(text).unwrap()
}

fn unit(text: &str) -> UnitId {
    UnitId::parse(text).unwrap()
}

const SCENARIO_ONE: &str = "Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)\n\
Current Turn 899-12 (#0), Winter, FINE\n";

#[test]
fn parses_a_single_section_report() {
    let (report, stats) = parser().parse_report(SCENARIO_ONE).unwrap();

    assert_eq!(report.turn, TurnStamp::new(899, 12).unwrap());
    assert_eq!(report.sections.len(), 1);
    let section = &report.sections[0];
    assert_eq!(section.unit_id.as_str(), "0987");
    assert_eq!(section.kind, UnitKind::Clan);
    assert_eq!(section.current_location.grid(), Some("QQ"));
    assert_eq!(section.current_location.column(), Some(9));
    assert_eq!(section.current_location.row(), Some(9));
    assert_eq!(section.starting_location, grid("QQ 1010"));

    assert_eq!(stats.get("location/clan"), 1);
    assert_eq!(stats.get("coords/grid"), 2);
    assert_eq!(stats.get("turn/current_only"), 1);
    assert_eq!(stats.get("report/section"), 1);
}

#[test]
fn parses_a_movement_with_three_steps() {
    let movement = parser()
        .parse_move(r"Tribe Movement: Move N-GH, \N-JH, LJm NW,\N-JH, LJm SW, N,,River N NE\")
        .unwrap();

    assert_eq!(movement.mode, MoveMode::Land);
    let directions: Vec<Option<Direction>> =
        movement.steps.iter().map(|step| step.direction).collect();
    assert_eq!(directions, vec![Some(Direction::N); 3]);
    assert!(movement
        .steps
        .iter()
        .all(|step| step.outcome == StepOutcome::Moved));

    let second = &movement.steps[1];
    assert_eq!(second.here().unwrap().terrain, Some(Terrain::JungleHills));
    assert_eq!(second.observations[1].offset, vec![Direction::NW]);
    assert_eq!(second.observations[1].terrain, Some(Terrain::LowJungleMountains));

    let third = &movement.steps[2];
    let here = third.here().unwrap();
    assert_eq!(here.edges.get(&Direction::N), Some(&vec![Edge::River]));
    assert_eq!(here.edges.get(&Direction::NE), Some(&vec![Edge::River]));
    let neighbors: Vec<(Vec<Direction>, Option<Terrain>)> = third.observations[1..]
        .iter()
        .map(|o| (o.offset.clone(), o.terrain))
        .collect();
    assert_eq!(
        neighbors,
        vec![
            (vec![Direction::SW], Some(Terrain::LowJungleMountains)),
            (vec![Direction::N], Some(Terrain::LowJungleMountains)),
        ]
    );
}

#[test]
fn parses_turn_lines_with_and_without_next_turn() {
    let header = parser()
        .parse_turn("Current Turn 900-01 (#1), Spring, FINE Next Turn 900-02 (#2), 28/11/2025")
        .unwrap();
    assert_eq!(header.current, TurnStamp::new(900, 1).unwrap());
    assert_eq!(header.number, 1);
    let next = header.next.unwrap();
    assert_eq!(next.turn, TurnStamp::new(900, 2).unwrap());
    assert_eq!(next.number, 2);
    assert_eq!(header.report_date.as_deref(), Some("28/11/2025"));

    let header = parser()
        .parse_turn("Current Turn 899-12 (#0), Winter, FINE\n")
        .unwrap();
    assert!(header.next.is_none());
    assert!(header.report_date.is_none());
}

#[test]
fn rejects_an_impossible_turn() {
    let err = parser()
        .parse_turn("Current Turn 899-01 (#0), Winter, FINE")
        .unwrap_err();
    let syntax = err.syntax().unwrap();
    assert!(syntax.inner.contains("899"), "{syntax}");
}

#[test]
fn parses_location_lines() {
    let location = parser()
        .parse_location("Courier 0987c1, Scouting party, Current Hex = ## 0909, (Previous Hex = N/A)")
        .unwrap();
    assert_eq!(location.kind, UnitKind::Courier);
    assert_eq!(location.unit_id, unit("0987c1"));
    assert_eq!(location.note.as_deref(), Some("Scouting party"));
    assert_eq!(location.current, Coords::Obscured { column: 9, row: 9 });
    assert_eq!(location.previous, Coords::NotApplicable);
}

#[test]
fn rejects_a_header_that_does_not_match_the_unit() {
    let err = parser()
        .parse_location("Fleet 0987c1, , Current Hex = QQ 0909, (Previous Hex = QQ 0909)")
        .unwrap_err();
    let syntax = err.syntax().unwrap();
    assert_eq!(syntax.prefix, "location");
    assert!(syntax.inner.contains("0987c1"), "{syntax}");
}

#[test]
fn parse_errors_carry_the_farthest_position() {
    let err = parser()
        .parse_location("Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 10)")
        .unwrap_err();
    let syntax = err.syntax().unwrap();
    assert_eq!(syntax.prefix, "location/coords");
    assert_eq!((syntax.line, syntax.column, syntax.offset), (1, 57, 56));
    assert_eq!(syntax.expected, vec!["column and row".to_string()]);
    assert_eq!(
        err.to_string(),
        "location/coords: 1:57 (56): no match found, expected one of [column and row]"
    );
}

#[test]
fn parses_follows_and_goes_to_lines() {
    let follows = parser().parse_follows("Tribe Follows 0987e1").unwrap();
    assert_eq!(follows.target, unit("0987e1"));

    let destination = parser().parse_goes_to("Tribe Goes to QQ 1010").unwrap();
    assert_eq!(destination, grid("QQ 1010"));
}

#[test]
fn goes_to_accepts_every_coordinate_form() {
    let parsed = parser()
        .parse(Production::GoesTo, "Tribe Goes to ## 1010")
        .unwrap();
    assert_eq!(parsed.stats.get("coords/obscured"), 1);
    assert_eq!(
        parsed.value.into_goes_to().unwrap(),
        Coords::Obscured { column: 10, row: 10 }
    );

    let destination = parser().parse_goes_to("Tribe Goes to N/A").unwrap();
    assert_eq!(destination, Coords::NotApplicable);

    let destination = parser().parse_goes_to("Tribe Goes to QQ 0102").unwrap();
    assert_eq!(destination.grid(), Some("QQ"));
    assert_eq!(destination.column(), Some(1));
    assert_eq!(destination.row(), Some(2));

    assert!(parser().parse_goes_to("Tribe Goes to QQ 10").is_err());
}

#[test]
fn parses_a_scout_that_stays_and_is_blocked() {
    let scout = parser()
        .parse_scout(
            r"Scout 1:Scout SE-PR, \SE-PR, \SE-PR, \-, 0987, 1987\SE-PR, \SE-PR, \,Not enough M.P's to move to SE into PRAIRIE, Nothing of interest found",
        )
        .unwrap();

    assert_eq!(scout.number, 1);
    assert_eq!(scout.patrol, Some(Patrol::NothingOfInterest));
    assert_eq!(scout.steps.len(), 7);

    let stayed = &scout.steps[3];
    assert_eq!(stayed.outcome, StepOutcome::Stayed);
    assert_eq!(stayed.direction, None);
    assert_eq!(
        stayed.here().unwrap().things,
        vec![Thing::Unit(unit("0987")), Thing::Unit(unit("1987"))]
    );

    let blocked = &scout.steps[6];
    assert_eq!(
        blocked.outcome,
        StepOutcome::Blocked(Blocker::NotEnoughMovePoints {
            direction: Direction::SE,
            terrain: Terrain::Prairie,
        })
    );
    assert_eq!(blocked.observations[0].kind, ObservationKind::UnitNextToLocation);
    assert_eq!(blocked.observations[0].terrain, Some(Terrain::Prairie));
    assert_eq!(scout.steps[0].here().unwrap().kind, ObservationKind::ScoutInLocation);
}

#[test]
fn parses_a_scout_patrol_that_found_units() {
    let scout = parser()
        .parse_scout(
            r"Scout 8:Scout SE-PR, \S-GH, \S-CH, Lcm SE,\-, 1520, 0520\,Not enough M.P's to move to S into CONIFER HILLS, Patrolled and found 1987, 0987",
        )
        .unwrap();
    assert_eq!(scout.number, 8);
    assert_eq!(scout.steps.len(), 5);
    assert_eq!(
        scout.patrol,
        Some(Patrol::Found(vec![unit("1987"), unit("0987")]))
    );
    assert_eq!(scout.id(&unit("0987")), "0987s8");
}

#[test]
fn records_what_blocked_steps_reveal() {
    let scout = parser()
        .parse_scout(
            r"Scout 1:Scout N-LCM, Lcm NW,, O NE, SE, N,Find Copper Ore\,Can't Move on Ocean to N of HEX, Nothing of interest found",
        )
        .unwrap();

    let first = &scout.steps[0];
    let here = first.here().unwrap();
    assert_eq!(here.terrain, Some(Terrain::LowConiferMountains));
    assert_eq!(here.resources, vec!["Copper Ore".to_string()]);
    let oceans: Vec<Direction> = first
        .observations
        .iter()
        .filter(|o| o.terrain == Some(Terrain::Ocean))
        .map(|o| o.offset[0])
        .collect();
    assert_eq!(oceans, vec![Direction::NE, Direction::SE, Direction::N]);

    let blocked = &scout.steps[1];
    assert_eq!(
        blocked.outcome,
        StepOutcome::Blocked(Blocker::Water {
            water: Water::Ocean,
            direction: Direction::N,
        })
    );

    let scout = parser()
        .parse_scout(r"Scout 1:Scout N-PR, , L SW,River N NE\,No Ford on River to N of HEX, Nothing of interest found")
        .unwrap();
    let blocked = &scout.steps[1];
    assert_eq!(blocked.outcome, StepOutcome::Blocked(Blocker::NoFord { direction: Direction::N }));
    assert_eq!(
        blocked.here().unwrap().edges.get(&Direction::N),
        Some(&vec![Edge::River])
    );
}

#[test]
fn labels_special_hexes_from_options() {
    let line = r"Scout 2:Scout N-RH, \NE-BF, , O NE, Mysterious NPC\,Can't Move on Ocean to NE of HEX, Nothing of interest found";

    let scout = parser().parse_scout(line).unwrap();
    assert_eq!(
        scout.steps[1].here().unwrap().things,
        vec![Thing::Settlement("Mysterious NPC".to_string())]
    );

    let options = ParseOptions {
        special_hexes: vec!["Mysterious NPC".to_string()],
    };
    let scout = ReportParser::new(options).unwrap().parse_scout(line).unwrap();
    assert_eq!(
        scout.steps[1].here().unwrap().things,
        vec![Thing::SpecialHex("Mysterious NPC".to_string())]
    );
}

#[test]
fn garbled_labels_fail_the_line() {
    let status = parser()
        .parse_status("0987 Status: PRAIRIE, St. Mary's Landing, 0987")
        .unwrap();
    assert_eq!(
        status.observations[0].things,
        vec![
            Thing::Settlement("St. Mary's Landing".to_string()),
            Thing::Unit(unit("0987")),
        ]
    );

    let err = parser()
        .parse_status("0987 Status: PRAIRIE, Garbled ### text, 0987")
        .unwrap_err();
    assert!(err.to_string().contains("not a place name"), "{err}");

    assert!(parser().parse_move(r"Tribe Movement: Move N-GH, Hex 42\").is_err());
}

#[test]
fn rejects_scout_numbers_outside_one_to_eight() {
    let err = parser().parse_scout(r"Scout 9:Scout N-PR, \").unwrap_err();
    assert!(err.to_string().contains("scout number 9"), "{err}");
}

#[test]
fn parses_status_lines() {
    let status = parser()
        .parse_status("0987 Status: PRAIRIE, O NE, SE, L SW 0987")
        .unwrap();
    assert_eq!(status.unit_id, unit("0987"));

    let here = &status.observations[0];
    assert_eq!(here.kind, ObservationKind::UnitInLocation);
    assert_eq!(here.terrain, Some(Terrain::Prairie));
    assert_eq!(here.things, vec![Thing::Unit(unit("0987"))]);

    let around: Vec<(Direction, Option<Terrain>)> = status.observations[1..]
        .iter()
        .map(|o| (o.offset[0], o.terrain))
        .collect();
    assert_eq!(
        around,
        vec![
            (Direction::NE, Some(Terrain::Ocean)),
            (Direction::SE, Some(Terrain::Ocean)),
            (Direction::SW, Some(Terrain::Lake)),
        ]
    );

    let status = parser()
        .parse_status("0987 Status: GRASSY HILLS PLATEAU, 0987")
        .unwrap();
    assert_eq!(status.observations[0].terrain, Some(Terrain::GrassyHillsPlateau));
}

#[test]
fn parses_fleet_movement_with_sightings() {
    let movement = parser()
        .parse_move(r"MILD NE Fleet Movement: Move NE-O, (Sight Land - N/NE, Sight Water - NE/SE)\")
        .unwrap();
    assert_eq!(
        movement.mode,
        MoveMode::Fleet {
            wind: Wind::Mild,
            heading: Direction::NE,
        }
    );
    let step = &movement.steps[0];
    assert_eq!(step.here().unwrap().terrain, Some(Terrain::Ocean));
    let rings: Vec<(Vec<Direction>, Option<Sighting>, ObservationKind)> = step.observations[1..]
        .iter()
        .map(|o| (o.offset.clone(), o.sighting, o.kind))
        .collect();
    assert_eq!(
        rings,
        vec![
            (
                vec![Direction::N, Direction::NE],
                Some(Sighting::Land),
                ObservationKind::FleetNextToRing
            ),
            (
                vec![Direction::NE, Direction::SE],
                Some(Sighting::Water),
                ObservationKind::FleetNextToRing
            ),
        ]
    );
}

#[test]
fn parses_a_failed_movement() {
    let movement = parser()
        .parse_move("Tribe Movement: Move failed due to Insufficient capacity to carry")
        .unwrap();
    assert_eq!(
        movement.steps,
        vec![crate::model::Step {
            direction: None,
            outcome: StepOutcome::Failed("Insufficient capacity to carry".to_string()),
            location: None,
            observations: Vec::new(),
        }]
    );
}

#[test]
fn resolves_step_and_observation_locations() {
    let text = "Tribe 0987, , Current Hex = QQ 1009, (Previous Hex = QQ 1010)\n\
Current Turn 900-01 (#1), Spring, FINE\n\
Tribe Movement: Move N-PR, O N\\\n\
Scout 1:Scout NE-PR, \\N-PR, Nothing of interest found\n\
0987 Status: PRAIRIE, O N 0987\n";

    let (report, _) = parser().parse_report(text).unwrap();
    let section = &report.sections[0];

    let movement = section.movement.as_ref().unwrap();
    assert_eq!(movement.origin, Some(grid("QQ 1010")));
    assert_eq!(movement.steps[0].location, Some(grid("QQ 1009")));
    assert_eq!(movement.steps[0].observations[1].location, Some(grid("QQ 1008")));

    let scout = &section.scouts[0];
    assert_eq!(scout.origin, Some(grid("QQ 1009")));
    assert_eq!(scout.steps[0].location, Some(grid("QQ 1109")));
    assert_eq!(scout.steps[1].location, Some(grid("QQ 1108")));

    let status = section.status.as_ref().unwrap();
    assert_eq!(status.location, Some(grid("QQ 1009")));
    assert_eq!(status.observations[1].location, Some(grid("QQ 1008")));
}

#[test]
fn goes_to_moves_the_movement_origin() {
    let text = "Tribe 0987, , Current Hex = QQ 0504, (Previous Hex = QQ 1010)\n\
Current Turn 900-01 (#1), Spring, FINE\n\
Tribe Goes to QQ 0505\n\
Tribe Movement: Move N-PR\\\n";

    let (report, _) = parser().parse_report(text).unwrap();
    let movement = report.sections[0].movement.as_ref().unwrap();
    assert_eq!(movement.origin, Some(grid("QQ 0505")));
    assert_eq!(movement.steps[0].location, Some(grid("QQ 0504")));
}

#[test]
fn unresolvable_origins_leave_locations_empty() {
    let text = "Tribe 0987, , Current Hex = ## 0909, (Previous Hex = N/A)\n\
Current Turn 900-01 (#1), Spring, FINE\n\
Tribe Movement: Move N-PR\\\n";

    let (report, _) = parser().parse_report(text).unwrap();
    let movement = report.sections[0].movement.as_ref().unwrap();
    assert_eq!(movement.steps[0].location, None);
}

#[test]
fn sections_inherit_the_report_turn() {
    let text = format!(
        "{SCENARIO_ONE}\nElement 0987e1, , Current Hex = QQ 0909, (Previous Hex = QQ 0909)\n"
    );
    let (report, stats) = parser().parse_report(&text).unwrap();
    let ids: Vec<&str> = report
        .sections
        .iter()
        .map(|section| section.unit_id.as_str())
        .collect();
    assert_eq!(ids, vec!["0987", "0987e1"]);
    assert_eq!(stats.get("report/section"), 2);
}

#[test]
fn rejects_reports_with_two_turns() {
    let text = format!(
        "{SCENARIO_ONE}Element 0987e1, , Current Hex = QQ 0909, (Previous Hex = QQ 0909)\n\
Current Turn 900-01 (#1), Spring, FINE\n"
    );
    let err = parser().parse_report(&text).unwrap_err();
    let syntax = err.syntax().unwrap();
    assert_eq!(syntax.prefix, "report");
    assert_eq!(syntax.inner, "multiple turns");
    assert_eq!(syntax.line, 4);
}

#[test]
fn rejects_reports_without_sections_or_turns() {
    let err = parser().parse_report("\n\n").unwrap_err();
    assert_eq!(err.syntax().unwrap().inner, "no sections");

    let err = parser()
        .parse_report("Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)\n")
        .unwrap_err();
    assert_eq!(err.syntax().unwrap().inner, "no turn info");
}

#[test]
fn line_productions_must_consume_all_input() {
    let err = parser()
        .parse_follows("Tribe Follows 0987e1\nTribe Follows 0987e2\n")
        .unwrap_err();
    assert!(
        err.syntax()
            .unwrap()
            .expected
            .contains(&"end of input".to_string())
    );
}

#[test]
fn narrowing_to_the_wrong_kind_is_a_distinct_failure() {
    let parsed = parser()
        .parse(Production::GoesTo, "Tribe Goes to QQ 1010")
        .unwrap();
    let err = parsed.value.into_move().unwrap_err();
    assert!(matches!(
        err,
        ParseFailure::Unexpected {
            expected: "move",
            found: "goes_to"
        }
    ));
    assert!(err.syntax().is_none());
}

use super::*;

#[test]
fn turn_stamp_accepts_setup_turn_and_rejects_out_of_range_values() {
    let setup = TurnStamp::parse("899-12").unwrap();
    assert_eq!(setup.year, 899);
    assert_eq!(setup.month, 12);
    assert_eq!(setup.to_string(), "0899-12");

    assert_eq!(TurnStamp::parse("0900-1").unwrap(), TurnStamp::new(900, 1).unwrap());
    assert!(TurnStamp::parse("899-11").is_err());
    assert!(TurnStamp::parse("898-12").is_err());
    assert!(TurnStamp::parse("900-13").is_err());
    assert!(TurnStamp::parse("900-00").is_err());
    assert!(TurnStamp::parse("90-01").is_err());
    assert!(TurnStamp::parse("900/01").is_err());
}

#[test]
fn clan_numbers_are_one_through_nine_hundred_ninety_nine() {
    assert!(ClanNo::new(0).is_err());
    assert!(ClanNo::new(1000).is_err());
    assert_eq!(ClanNo::parse("0987").unwrap().value(), 987);
    assert_eq!(ClanNo::new(42).unwrap().to_string(), "0042");
    assert!(ClanNo::parse("1987").is_err());
    assert!(ClanNo::parse("0000").is_err());
}

#[test]
fn game_ids_are_four_digits() {
    assert_eq!(GameId::parse("0300").unwrap().as_str(), "0300");
    assert!(GameId::parse("300").is_err());
    assert!(GameId::parse("03a0").is_err());
}

#[test]
fn unit_ids_report_kind_and_owning_clan() {
    let clan = UnitId::parse("0987").unwrap();
    assert_eq!(clan.kind(), UnitKind::Clan);
    assert_eq!(clan.clan_no(), 987);

    let tribe = UnitId::parse("2987").unwrap();
    assert_eq!(tribe.kind(), UnitKind::Tribe);
    assert_eq!(tribe.clan_no(), 987);

    assert_eq!(UnitId::parse("0987c1").unwrap().kind(), UnitKind::Courier);
    assert_eq!(UnitId::parse("1987e2").unwrap().kind(), UnitKind::Element);
    assert_eq!(UnitId::parse("0987f9").unwrap().kind(), UnitKind::Fleet);
    assert_eq!(UnitId::parse("0987g1").unwrap().kind(), UnitKind::Garrison);

    assert!(UnitId::parse("0987c0").is_err());
    assert!(UnitId::parse("0987x1").is_err());
    assert!(UnitId::parse("987").is_err());
}

#[test]
fn coords_parse_all_three_forms() {
    assert_eq!(Coords::parse("N/A").unwrap(), Coords::NotApplicable);
    assert_eq!(
        Coords::parse("## 1203").unwrap(),
        Coords::Obscured { column: 12, row: 3 }
    );

    let grid = Coords::parse("QQ 0909").unwrap();
    assert_eq!(grid.grid(), Some("QQ"));
    assert_eq!(grid.column(), Some(9));
    assert_eq!(grid.row(), Some(9));
    assert_eq!(grid.to_string(), "QQ 0909");

    assert!(Coords::parse("Qq 0909").is_err());
    assert!(Coords::parse("QQ 909").is_err());
}

#[test]
fn observation_edges_do_not_repeat() {
    let mut observation = Observation::new(ObservationKind::UnitInLocation, Vec::new());
    observation.add_edge(Direction::N, Edge::River);
    observation.add_edge(Direction::N, Edge::River);
    observation.add_edge(Direction::N, Edge::Ford);
    assert_eq!(observation.edges[&Direction::N], vec![Edge::River, Edge::Ford]);
}

#[test]
fn reports_serialize_turns_and_terrain_as_codes() {
    let mut observation = Observation::new(ObservationKind::UnitInLocation, Vec::new());
    observation.terrain = Some(Terrain::GrassyHills);
    let json = serde_json::to_value(&observation).unwrap();
    assert_eq!(json["terrain"], "GH");
    assert_eq!(json["kind"], "UnitInLocation");

    let report = TurnReport {
        turn: TurnStamp::new(900, 1).unwrap(),
        sections: Vec::new(),
    };
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["turn"], "0900-01");
}
